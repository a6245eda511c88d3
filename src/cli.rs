use std::path::PathBuf;

use clap::Parser;

use crate::config::{AppConfig, ConfigError};

#[derive(Parser, Debug)]
#[command(
    name = "ediag",
    version,
    about = "DPI tracker diagnostic tool.",
    long_about = "Polls an OpenIris telemetry server over UDP and plots the pupil \
                  position of one eye in real time."
)]
pub struct Cli {
    /// ip addr of tracker host [default = localhost]
    #[arg(long)]
    pub ip: Option<String>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the effective configuration to PATH and exit
    #[arg(long, value_name = "PATH")]
    pub write_config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// 默认值 → 配置文件 → 环境变量 → `--ip`
    pub fn resolve_config(&self) -> Result<AppConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load_from_file(path)?,
            None => AppConfig::default(),
        };
        config.apply_env_overrides()?;
        if let Some(ip) = &self.ip {
            config.server.host = ip.clone();
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip_flag() {
        let cli = Cli::try_parse_from(["ediag", "--ip", "192.168.1.20"]).unwrap();
        assert_eq!(cli.ip.as_deref(), Some("192.168.1.20"));
        assert_eq!(cli.log_level(), "info");
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["ediag", "-vv"]).unwrap();
        assert_eq!(cli.log_level(), "trace");
    }

    #[test]
    fn test_ip_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ediag.toml");
        std::fs::write(&path, "[server]\nhost = \"10.1.1.1\"\nport = 9100\n").unwrap();

        let cli = Cli::try_parse_from([
            "ediag",
            "--config",
            path.to_str().unwrap(),
            "--ip",
            "127.0.0.1",
        ])
        .unwrap();
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_unknown_flag_rejected() {
        assert!(Cli::try_parse_from(["ediag", "--update"]).is_err());
    }
}
