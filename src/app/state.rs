//! 应用状态管理模块

use std::sync::Arc;

use crossbeam_channel::Receiver;

use crate::config::ValidationConfig;
use crate::pipeline::{IngestionExit, IngestionSummary, TraceCoordinator};
use crate::plotter::EyeTracePlot;
use crate::telemetry::describe_errors;

/// 采集线程状态
#[derive(Debug, Clone, PartialEq)]
pub enum IngestionStatus {
    Running,
    Stopped(IngestionSummary),
    Failed(String),
}

/// 会话状态
#[derive(Debug, Clone)]
pub struct SessionState {
    pub server: String,
    pub status: IngestionStatus,
    /// 最新一帧的 `describe_errors` 文本，空字符串表示没有问题
    pub detection_summary: String,
    pub frames: u64,
    pub last_frame_number: Option<i64>,
}

/// 数据通道状态
#[derive(Debug)]
pub struct DataChannels {
    pub exit_receiver: Receiver<IngestionExit>,
}

/// 统一的应用状态管理
#[derive(Debug)]
pub struct AppState {
    pub session: SessionState,
    pub channels: DataChannels,
    pub coordinator: Arc<TraceCoordinator>,
    pub trace_plot: EyeTracePlot,
}

impl AppState {
    pub fn new(
        server: String,
        coordinator: Arc<TraceCoordinator>,
        exit_receiver: Receiver<IngestionExit>,
    ) -> Self {
        let trace_plot = EyeTracePlot::new(coordinator.eye());
        Self {
            session: SessionState {
                server,
                status: IngestionStatus::Running,
                detection_summary: String::new(),
                frames: 0,
                last_frame_number: None,
            },
            channels: DataChannels { exit_receiver },
            coordinator,
            trace_plot,
        }
    }

    /// 获取当前状态摘要
    pub fn get_status_summary(&self) -> String {
        match &self.session.status {
            IngestionStatus::Running => "Running".to_string(),
            IngestionStatus::Stopped(_) => "Stopped".to_string(),
            IngestionStatus::Failed(_) => "Failed".to_string(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.session.status == IngestionStatus::Running
    }

    pub fn apply_exit(&mut self, exit: IngestionExit) {
        self.session.status = match exit {
            IngestionExit::Stopped(summary) => IngestionStatus::Stopped(summary),
            IngestionExit::Failed(cause) => IngestionStatus::Failed(cause),
        };
    }

    /// 用最新一帧刷新状态栏信息
    pub fn refresh_session_info(&mut self, validation: &ValidationConfig) {
        self.session.frames = self.coordinator.frames_recorded();
        self.session.last_frame_number = self.trace_plot.snapshot().and_then(|s| s.last_index());
        if let Some(sample) = self.coordinator.latest_sample() {
            self.session.detection_summary = describe_errors(
                &sample,
                validation.require_p4_left,
                validation.require_p4_right,
            );
        }
    }
}
