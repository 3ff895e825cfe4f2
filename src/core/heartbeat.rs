use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Fixed-interval liveness ticker.
#[derive(Debug, Clone)]
pub struct Heartbeat {
    interval: Duration,
    message: String,
}

impl Heartbeat {
    pub fn new(interval: Duration, message: impl Into<String>) -> Self {
        Self {
            interval,
            message: message.into(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Calls `on_beat` with the 1-based beat number and the message, first
    /// after one full interval and then once per interval, forever.
    pub async fn run<F>(self, mut on_beat: F)
    where
        F: FnMut(u64, &str) + Send,
    {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        // 延遲而非補發，避免暫停後一次噴出多行
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut beat = 0u64;
        loop {
            ticker.tick().await;
            beat += 1;
            on_beat(beat, &self.message);
        }
    }
}
