use chrono::Local;
use env_logger::{Builder, Env};
use log::Level;
use std::io::Write;
use std::thread;

const RESET: &str = "\x1b[0m";

fn level_style(level: Level) -> &'static str {
    match level {
        Level::Error => "\x1b[31m\x1b[1m", // 红色
        Level::Warn => "\x1b[33m\x1b[1m",  // 黄色
        Level::Info => "\x1b[32m\x1b[1m",  // 绿色
        Level::Debug => "\x1b[36m\x1b[1m", // 青色
        Level::Trace => "\x1b[90m\x1b[1m", // 灰色
    }
}

/// 初始化日志；`RUST_LOG` 优先于 `default_level`
///
/// 每行带上线程名，方便区分采集线程（`ingestion`）和界面线程（`main`）。
pub fn init_logger(default_level: &str) {
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let current = thread::current();
            writeln!(
                buf,
                "{} {}{:<5}{} ({}) [{}:{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                level_style(record.level()),
                record.level(),
                RESET,
                current.name().unwrap_or("-"),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args(),
            )
        })
        .init();
}
