use crate::app::app_core::EyeDiagApp;

pub struct RedrawHandler;

impl RedrawHandler {
    /// Dirty → 取快照更新曲线并回到 Clean；Clean 时什么也不做
    pub fn handle_redraw(app: &mut EyeDiagApp) -> bool {
        let state = &mut app.state;
        if !state.trace_plot.refresh(&state.coordinator) {
            return false;
        }
        state.refresh_session_info(&app.config.validation);
        true
    }
}
