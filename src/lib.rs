//! OpenIris 眼动遥测服务器的实时诊断查看器
//!
//! 数据流：[`client::OpenIrisClient`] → [`telemetry::decode`] →
//! [`pipeline::TraceCoordinator`]（三个对齐的 [`ring::RingBuffer`] 加一个 dirty 标记）
//! → 界面线程上的 [`plotter::EyeTracePlot`]。

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod logger;
pub mod pipeline;
pub mod plotter;
pub mod ring;
pub mod telemetry;
pub mod types;
