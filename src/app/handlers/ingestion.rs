use log::{info, warn};

use crate::app::app_core::EyeDiagApp;
use crate::pipeline::IngestionExit;

pub struct IngestionHandler;

impl IngestionHandler {
    /// 处理采集线程的退出消息；失败时保留最后一帧曲线
    pub fn handle_exit(app: &mut EyeDiagApp) {
        if let Ok(exit) = app.state.channels.exit_receiver.try_recv() {
            match &exit {
                IngestionExit::Stopped(summary) => {
                    info!("Ingestion finished after {} frames", summary.frames)
                }
                IngestionExit::Failed(cause) => warn!("Ingestion terminated: {}", cause),
            }
            app.state.apply_exit(exit);
        }
    }
}
