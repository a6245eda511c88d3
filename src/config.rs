use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::pipeline::RetryPolicy;
use crate::types::Eye;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// 应用配置管理模块
/// 集中管理所有配置项，提供默认值和配置验证

/// 主配置结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub plot: PlotConfig,
    pub validation: ValidationConfig,
    pub retry: RetryConfig,
    pub window: WindowConfig,
}

/// 遥测服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub timeout_seconds: f64,
    pub request_token: String,
    pub max_datagram_bytes: usize,
}

/// 绘图配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    pub buffer_capacity: usize,
    pub plotted_eye: Eye,
    pub y_min: f64,
    pub y_max: f64,
    pub plot_height: f32,
    pub repaint_interval_ms: u64,
    pub colors: PlotColors,
}

/// 绘图颜色配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotColors {
    pub x_trace: [u8; 3],
    pub y_trace: [u8; 3],
}

/// 哪只眼必须检测到第四浦肯野反射，状态栏才认为该帧完整
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub require_p4_left: bool,
    pub require_p4_right: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetryMode {
    #[default]
    FailFast,
    Backoff,
}

/// 拉取失败后的重试策略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub policy: RetryMode,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

/// 窗口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: f32,
    pub height: f32,
    pub title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 9003,
            timeout_seconds: 1.0, // 200 Hz 数据源
            request_token: "WAITFORDATA".to_string(),
            max_datagram_bytes: 8192,
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 1000,
            plotted_eye: Eye::Left,
            y_min: 100.0,
            y_max: 600.0,
            plot_height: 400.0,
            repaint_interval_ms: 150,
            colors: PlotColors::default(),
        }
    }
}

impl Default for PlotColors {
    fn default() -> Self {
        Self {
            x_trace: [255, 0, 0], // 红色
            y_trace: [0, 0, 255], // 蓝色
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            require_p4_left: true,
            require_p4_right: true,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            policy: RetryMode::FailFast,
            max_retries: 5,
            initial_backoff_ms: 100,
            max_backoff_ms: 2000,
        }
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
            title: "Eye Trace".to_string(),
        }
    }
}

impl ServerConfig {
    /// 读超时；未通过 `validate` 的值退回 1 秒
    pub fn timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout_seconds).unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        match self.policy {
            RetryMode::FailFast => RetryPolicy::FailFast,
            RetryMode::Backoff => RetryPolicy::Backoff {
                max_retries: self.max_retries,
                initial: Duration::from_millis(self.initial_backoff_ms),
                max: Duration::from_millis(self.max_backoff_ms),
            },
        }
    }
}

impl AppConfig {
    /// 从文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::IoError)?;

        let config: AppConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;

        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::SerializeError)?;

        std::fs::write(path, content).map_err(ConfigError::IoError)?;

        Ok(())
    }

    /// 用 `EDIAG_HOST`、`EDIAG_PORT`、`EDIAG_TIMEOUT_SECONDS` 覆盖服务器配置，
    /// 存在 `.env` 文件时一并读取
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        dotenv::dotenv().ok(); // 加载 .env 文件

        if let Ok(host) = env::var("EDIAG_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("EDIAG_PORT") {
            self.server.port = port
                .parse::<u16>()
                .map_err(|e| ConfigError::EnvError(format!("EDIAG_PORT={}: {}", port, e)))?;
        }
        if let Ok(timeout) = env::var("EDIAG_TIMEOUT_SECONDS") {
            self.server.timeout_seconds = timeout
                .parse::<f64>()
                .map_err(|e| ConfigError::EnvError(format!("EDIAG_TIMEOUT_SECONDS={}: {}", timeout, e)))?;
        }
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError("Server host must not be empty".to_string()));
        }

        if self.server.timeout_seconds <= 0.0 {
            return Err(ConfigError::ValidationError("Timeout must be a positive number of seconds".to_string()));
        }
        // NaN、无穷大和超出 Duration 范围的值都在这里拒绝；零超时会被 socket 拒绝
        let timeout = Duration::try_from_secs_f64(self.server.timeout_seconds).map_err(|e| {
            ConfigError::ValidationError(format!("Timeout {} s is out of range: {}", self.server.timeout_seconds, e))
        })?;
        if timeout.is_zero() {
            return Err(ConfigError::ValidationError("Timeout rounds down to zero".to_string()));
        }

        if self.server.request_token.is_empty() {
            return Err(ConfigError::ValidationError("Request token must not be empty".to_string()));
        }

        if self.server.max_datagram_bytes == 0 {
            return Err(ConfigError::ValidationError("Datagram buffer size must be positive".to_string()));
        }

        if self.plot.buffer_capacity == 0 {
            return Err(ConfigError::ValidationError("Buffer capacity must be positive".to_string()));
        }

        if !self.plot.y_min.is_finite() || !self.plot.y_max.is_finite() || self.plot.y_min >= self.plot.y_max {
            return Err(ConfigError::ValidationError("y_min must be below y_max".to_string()));
        }

        if self.retry.max_backoff_ms < self.retry.initial_backoff_ms {
            return Err(ConfigError::ValidationError("max_backoff_ms must be >= initial_backoff_ms".to_string()));
        }

        if self.window.width <= 0.0 || self.window.height <= 0.0 {
            return Err(ConfigError::ValidationError("Window dimensions must be positive".to_string()));
        }

        Ok(())
    }
}

/// 配置错误类型
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(toml::ser::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Environment error: {0}")]
    EnvError(String),
}
