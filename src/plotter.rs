use egui::Color32;
use egui_plot::{Legend, Line, Plot, PlotBounds, PlotPoints};

use crate::config::PlotConfig;
use crate::pipeline::{TraceCoordinator, TraceSnapshot};
use crate::types::Eye;

/// 格式化 y 轴标签（像素坐标，固定宽度）
fn format_pixel_label(value: f64) -> String {
    if value.abs() >= 10000.0 {
        format!("{:-6.1e}", value)
    } else {
        format!("{:-6.0}", value)
    }
}

fn color(rgb: [u8; 3]) -> Color32 {
    Color32::from_rgb(rgb[0], rgb[1], rgb[2])
}

/// 瞳孔 X/Y 随帧号变化的滚动曲线
///
/// 保存从 [`TraceCoordinator`] 取到的最后一个快照。egui 每帧都重绘，
/// 但只有 [`refresh`](Self::refresh) 取到 Dirty 状态时曲线数据才会变。
#[derive(Debug)]
pub struct EyeTracePlot {
    eye: Eye,
    snapshot: Option<TraceSnapshot>,
    updates: u64,
}

impl EyeTracePlot {
    pub fn new(eye: Eye) -> Self {
        Self {
            eye,
            snapshot: None,
            updates: 0,
        }
    }

    /// 重绘处理：Dirty 时取快照，Clean 时保持原样。返回曲线是否更新。
    pub fn refresh(&mut self, coordinator: &TraceCoordinator) -> bool {
        match coordinator.take_if_dirty() {
            Some(snapshot) => {
                self.apply(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn apply(&mut self, snapshot: TraceSnapshot) {
        self.snapshot = Some(snapshot);
        self.updates += 1;
    }

    /// 实际更新过多少次曲线
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn snapshot(&self) -> Option<&TraceSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn ui(&self, ui: &mut egui::Ui, config: &PlotConfig) {
        let title = format!("{} eye pupil", self.eye);

        Plot::new("eye_trace")
            .height(config.plot_height)
            .legend(Legend::default())
            .x_axis_formatter(|v, _| format!("{:.0}", v.value))
            .y_axis_formatter(|v, _| format_pixel_label(v.value))
            .allow_drag(false)
            .allow_zoom(false)
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                let (x_bounds, y_bounds, x_points, y_points) = match &self.snapshot {
                    Some(snap) => (
                        snap.x_range,
                        snap.y_range,
                        xy_points(&snap.index, &snap.x),
                        xy_points(&snap.index, &snap.y),
                    ),
                    None => (
                        (0.0, config.buffer_capacity as f64),
                        (config.y_min, config.y_max),
                        Vec::new(),
                        Vec::new(),
                    ),
                };

                plot_ui.set_plot_bounds(PlotBounds::from_min_max(
                    [x_bounds.0, y_bounds.0],
                    [x_bounds.1, y_bounds.1],
                ));

                if !x_points.is_empty() {
                    plot_ui.line(
                        Line::new(format!("{} X", title), PlotPoints::from(x_points))
                            .color(color(config.colors.x_trace))
                            .width(1.0),
                    );
                    plot_ui.line(
                        Line::new(format!("{} Y", title), PlotPoints::from(y_points))
                            .color(color(config.colors.y_trace))
                            .width(1.0),
                    );
                }
            });
    }
}

fn xy_points(index: &[i64], values: &[f64]) -> Vec<[f64; 2]> {
    index
        .iter()
        .zip(values.iter())
        .map(|(&i, &v)| [i as f64, v])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> TraceCoordinator {
        TraceCoordinator::new(&PlotConfig {
            buffer_capacity: 5,
            ..Default::default()
        })
    }

    #[test]
    fn test_two_appends_one_repaint_with_latest_contents() {
        let coord = coordinator();
        let mut plot = EyeTracePlot::new(Eye::Left);

        coord.append(10, 300.0, 200.0);
        coord.append(11, 305.0, 210.0);

        assert!(plot.refresh(&coord));
        assert!(!plot.refresh(&coord));
        assert!(!plot.refresh(&coord));
        assert_eq!(plot.updates(), 1);

        let snap = plot.snapshot().unwrap();
        assert_eq!(snap.index, vec![10, 11]);
        assert_eq!(snap.x, vec![300.0, 305.0]);
        assert_eq!(snap.x_range, (10.0, 15.0));
    }

    #[test]
    fn test_refresh_while_clean_keeps_last_frame() {
        let coord = coordinator();
        let mut plot = EyeTracePlot::new(Eye::Left);
        assert!(!plot.refresh(&coord));
        assert!(plot.snapshot().is_none());

        coord.append(1, 1.0, 1.0);
        plot.refresh(&coord);
        coord.append(2, 2.0, 2.0);
        plot.refresh(&coord);
        assert_eq!(plot.updates(), 2);
        assert_eq!(plot.snapshot().unwrap().last_index(), Some(2));
    }

    #[test]
    fn test_xy_points_pairs_index_with_values() {
        assert_eq!(xy_points(&[3, 4], &[1.5, 2.5]), vec![[3.0, 1.5], [4.0, 2.5]]);
        assert_eq!(format_pixel_label(250.0), "   250");
    }
}
