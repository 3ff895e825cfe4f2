#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use toml_config::TomlConfig;

use crate::core::format::LineFormat;
use crate::domain::signals::SignalSet;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_duration, validate_non_empty_list, validate_non_empty_string, validate_single_line,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_HEARTBEAT_MESSAGE: &str = "Still here";
pub const DEFAULT_CAUGHT_PREFIX: &str = "Caught";
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);
pub const MAX_INTERVAL: Duration = Duration::from_secs(3600);

/// How a caught signal is named on the output line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    /// `SIGTERM`
    Name,
    /// `terminated`
    #[default]
    Description,
}

/// Resolved runtime configuration: defaults, then the TOML file, then CLI
/// flags.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub interval: Duration,
    pub heartbeat_message: String,
    pub caught_prefix: String,
    pub name_style: NameStyle,
    pub timestamps: bool,
    pub monitor: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            include: vec!["all".to_string()],
            exclude: Vec::new(),
            interval: DEFAULT_INTERVAL,
            heartbeat_message: DEFAULT_HEARTBEAT_MESSAGE.to_string(),
            caught_prefix: DEFAULT_CAUGHT_PREFIX.to_string(),
            name_style: NameStyle::default(),
            timestamps: false,
            monitor: false,
        }
    }
}

impl WatchConfig {
    /// 套用 TOML 檔案中有設定的欄位
    pub fn apply_toml(&mut self, file: &TomlConfig) {
        if let Some(signals) = &file.signals {
            if let Some(include) = &signals.include {
                self.include = include.clone();
            }
            if let Some(exclude) = &signals.exclude {
                self.exclude = exclude.clone();
            }
        }
        if let Some(heartbeat) = &file.heartbeat {
            if let Some(ms) = heartbeat.interval_ms {
                self.interval = Duration::from_millis(ms);
            }
            if let Some(message) = &heartbeat.message {
                self.heartbeat_message = message.clone();
            }
        }
        if let Some(output) = &file.output {
            if let Some(prefix) = &output.caught_prefix {
                self.caught_prefix = prefix.clone();
            }
            if let Some(style) = output.name_style {
                self.name_style = style;
            }
            if let Some(timestamps) = output.timestamps {
                self.timestamps = timestamps;
            }
        }
        if file.monitoring.is_some() {
            self.monitor = file.monitoring_enabled();
        }
    }

    pub fn signal_set(&self) -> Result<SignalSet> {
        SignalSet::resolve(&self.include, &self.exclude)
    }

    pub fn line_format(&self) -> LineFormat {
        LineFormat {
            caught_prefix: self.caught_prefix.clone(),
            name_style: self.name_style,
            timestamps: self.timestamps,
        }
    }
}

impl Validate for WatchConfig {
    fn validate(&self) -> Result<()> {
        validate_duration("heartbeat.interval", self.interval, MIN_INTERVAL, MAX_INTERVAL)?;
        validate_non_empty_string("heartbeat.message", &self.heartbeat_message)?;
        validate_single_line("heartbeat.message", &self.heartbeat_message)?;
        validate_non_empty_string("output.caught_prefix", &self.caught_prefix)?;
        validate_single_line("output.caught_prefix", &self.caught_prefix)?;
        validate_non_empty_list("signals.include", &self.include)?;
        self.signal_set()?;
        Ok(())
    }
}
