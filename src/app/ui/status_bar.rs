use eframe::egui;

use crate::app::app_core::EyeDiagApp;
use crate::app::state::IngestionStatus;

pub fn render_status_bar(app: &EyeDiagApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("status_bar")
        .min_height(32.0)
        .show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.label("Status:");

                let status_color = match app.state.session.status {
                    IngestionStatus::Running => egui::Color32::from_rgb(0, 150, 0), // 绿色
                    IngestionStatus::Stopped(_) => egui::Color32::from_rgb(255, 165, 0), // 橙色
                    IngestionStatus::Failed(_) => egui::Color32::from_rgb(150, 0, 0), // 红色
                };
                ui.colored_label(status_color, app.state.get_status_summary());

                ui.separator();
                ui.label(format!("Server: {}", app.state.session.server));

                ui.separator();
                ui.label(format!("Eye: {}", app.config.plot.plotted_eye));

                ui.separator();
                ui.label(format!("Frames: {}", app.state.session.frames));
                if let Some(frame) = app.state.session.last_frame_number {
                    ui.label(format!("(last #{})", frame));
                }
            });
            ui.add_space(4.0);
        });
}

pub fn render_bottom_status_bar(app: &EyeDiagApp, ctx: &egui::Context) {
    egui::TopBottomPanel::bottom("bottom_status_bar")
        .min_height(22.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                // 失败原因优先显示
                if let IngestionStatus::Failed(cause) = &app.state.session.status {
                    ui.colored_label(egui::Color32::from_rgb(200, 0, 0), cause);
                    ui.separator();
                }

                let summary = &app.state.session.detection_summary;
                if summary.is_empty() {
                    ui.colored_label(egui::Color32::from_rgb(0, 150, 0), "Detection OK");
                } else {
                    ui.colored_label(egui::Color32::from_rgb(200, 120, 0), summary);
                }
            });
        });
}
