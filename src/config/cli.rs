use crate::config::{NameStyle, TomlConfig, WatchConfig};
use crate::utils::error::{Result, WatchError};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "sigcatch")]
#[command(version, about = "Print every signal this process receives, plus a heartbeat")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Signals to watch (names, numbers or "all")
    #[arg(long, value_delimiter = ',')]
    pub signals: Vec<String>,

    /// Signals to leave at their default disposition
    #[arg(long, value_delimiter = ',')]
    pub ignore: Vec<String>,

    /// Heartbeat interval in seconds
    #[arg(long)]
    pub interval: Option<f64>,

    /// Heartbeat line text
    #[arg(long)]
    pub message: Option<String>,

    /// Word printed before the signal name
    #[arg(long)]
    pub prefix: Option<String>,

    /// Print signal names (SIGTERM) instead of descriptions
    #[arg(long)]
    pub names: bool,

    /// Prefix every line with an RFC 3339 timestamp
    #[arg(long)]
    pub timestamps: bool,

    /// Log process CPU and memory with every heartbeat
    #[arg(long)]
    pub monitor: bool,

    /// Print the catchable signals and exit
    #[arg(long)]
    pub list: bool,

    /// With --list, print JSON instead of a table
    #[arg(long, requires = "list")]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs on stderr as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl CliConfig {
    /// 合併預設值、設定檔與命令列參數
    pub fn resolve(&self) -> Result<WatchConfig> {
        let mut config = WatchConfig::default();

        if let Some(path) = &self.config {
            tracing::debug!("📁 Loading configuration from: {}", path.display());
            let file = TomlConfig::from_file(path)?;
            config.apply_toml(&file);
        }

        if !self.signals.is_empty() {
            config.include = self.signals.clone();
        }
        if !self.ignore.is_empty() {
            config.exclude = self.ignore.clone();
        }
        if let Some(secs) = self.interval {
            config.interval = parse_interval(secs)?;
        }
        if let Some(message) = &self.message {
            config.heartbeat_message = message.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.caught_prefix = prefix.clone();
        }
        if self.names {
            config.name_style = NameStyle::Name;
        }
        if self.timestamps {
            config.timestamps = true;
        }
        if self.monitor {
            config.monitor = true;
        }

        Ok(config)
    }
}

fn parse_interval(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| WatchError::InvalidConfigValueError {
        field: "--interval".to_string(),
        value: secs.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validation::Validate;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_no_flags_gives_defaults() {
        let cli = CliConfig::parse_from(["sigcatch"]);
        assert_eq!(cli.resolve().unwrap(), WatchConfig::default());
    }

    #[test]
    fn test_comma_delimited_lists() {
        let cli =
            CliConfig::parse_from(["sigcatch", "--signals", "TERM,INT", "--ignore", "INT"]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.include, vec!["TERM", "INT"]);
        assert_eq!(config.exclude, vec!["INT"]);
    }

    #[test]
    fn test_fractional_interval() {
        let cli = CliConfig::parse_from(["sigcatch", "--interval", "0.25"]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.interval, Duration::from_millis(250));
    }

    #[test]
    fn test_negative_interval_is_rejected() {
        let cli = CliConfig::parse_from(["sigcatch", "--interval=-1"]);
        assert!(cli.resolve().is_err());
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[heartbeat]
interval_ms = 2000
message = "from file"

[output]
caught_prefix = "Got"
"#,
            )
            .unwrap();

        let path = temp_file.path().to_str().unwrap().to_string();
        let cli =
            CliConfig::parse_from(["sigcatch", "--config", &path, "--message", "from flag"]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.interval, Duration::from_secs(2));
        assert_eq!(config.heartbeat_message, "from flag");
        assert_eq!(config.caught_prefix, "Got");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_names_flag_overrides_description_default() {
        let config = CliConfig::parse_from(["sigcatch"]).resolve().unwrap();
        assert_eq!(config.name_style, NameStyle::Description);

        let config = CliConfig::parse_from(["sigcatch", "--names"]).resolve().unwrap();
        assert_eq!(config.name_style, NameStyle::Name);
    }

    #[test]
    fn test_json_requires_list() {
        assert!(CliConfig::try_parse_from(["sigcatch", "--json"]).is_err());
        assert!(CliConfig::try_parse_from(["sigcatch", "--list", "--json"]).is_ok());
    }
}
