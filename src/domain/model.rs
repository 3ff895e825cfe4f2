use chrono::{DateTime, Local};
use libc::c_int;
use serde::Serialize;
use std::time::Duration;

use crate::domain::signals;

/// One delivery observed by the catcher.
#[derive(Debug, Clone, Serialize)]
pub struct CaughtSignal {
    pub number: c_int,
    pub name: String,
    pub received_at: DateTime<Local>,
}

impl CaughtSignal {
    pub fn new(number: c_int) -> Self {
        Self {
            number,
            name: signals::name_of(number),
            received_at: Local::now(),
        }
    }

    pub fn description(&self) -> String {
        signals::describe(self.number)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct WatchReport {
    pub signals_caught: u64,
    pub heartbeats: u64,
    pub elapsed: Duration,
}
