pub mod catcher;
#[cfg(target_os = "linux")]
pub mod fault;
pub mod format;
pub mod heartbeat;
pub mod watcher;

pub use crate::domain::model::{CaughtSignal, WatchReport};
pub use crate::domain::ports::LineSink;
pub use crate::utils::error::Result;
