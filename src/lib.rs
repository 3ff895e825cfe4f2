pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{MemorySink, StdoutSink};
pub use config::{NameStyle, TomlConfig, WatchConfig};
pub use self::core::{format::LineFormat, watcher::WatchHandle, watcher::Watcher};
pub use domain::signals::SignalSet;
pub use utils::error::{Result, WatchError};
