use eframe::egui;

use crate::app::app_core::EyeDiagApp;

pub fn render_main_panel(app: &EyeDiagApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading(&app.config.window.title);
        app.state.trace_plot.ui(ui, &app.config.plot);
    });
}
