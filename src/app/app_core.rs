use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Receiver;
use eframe::{egui, Frame};
use log::info;

use crate::config::AppConfig;
use crate::pipeline::{IngestionExit, TraceCoordinator};

use super::handlers::{IngestionHandler, RedrawHandler};
use super::state::AppState;

pub struct EyeDiagApp {
    // 统一的状态管理
    pub state: AppState,

    pub config: AppConfig,
}

impl EyeDiagApp {
    pub fn new(
        config: AppConfig,
        coordinator: Arc<TraceCoordinator>,
        exit_receiver: Receiver<IngestionExit>,
    ) -> Self {
        let state = AppState::new(config.server.address(), coordinator, exit_receiver);

        info!(
            "Viewer started: {} eye, {} samples window",
            config.plot.plotted_eye, config.plot.buffer_capacity
        );

        Self { state, config }
    }
}

impl eframe::App for EyeDiagApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        ctx.set_visuals(egui::Visuals::light());

        // 先处理数据，再渲染
        IngestionHandler::handle_exit(self);
        RedrawHandler::handle_redraw(self);

        crate::app::ui::render_status_bar(self, ctx);
        crate::app::ui::render_bottom_status_bar(self, ctx);
        crate::app::ui::render_main_panel(self, ctx);

        // 采集线程停止后不会再有重绘请求，保留周期刷新
        ctx.request_repaint_after(Duration::from_millis(self.config.plot.repaint_interval_ms));
    }
}
