use crate::config::{NameStyle, DEFAULT_CAUGHT_PREFIX};
use crate::domain::model::CaughtSignal;
use chrono::{DateTime, Local, SecondsFormat};

/// Turns events into the lines written to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFormat {
    pub caught_prefix: String,
    pub name_style: NameStyle,
    pub timestamps: bool,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            caught_prefix: DEFAULT_CAUGHT_PREFIX.to_string(),
            name_style: NameStyle::default(),
            timestamps: false,
        }
    }
}

impl LineFormat {
    pub fn caught(&self, signal: &CaughtSignal) -> String {
        let name = match self.name_style {
            NameStyle::Name => signal.name.clone(),
            NameStyle::Description => signal.description(),
        };
        self.stamp(
            signal.received_at,
            format!("{} {}", self.caught_prefix, name),
        )
    }

    pub fn heartbeat(&self, message: &str) -> String {
        self.stamp(Local::now(), message.to_string())
    }

    fn stamp(&self, at: DateTime<Local>, body: String) -> String {
        if self.timestamps {
            format!("{} {}", at.to_rfc3339_opts(SecondsFormat::Millis, false), body)
        } else {
            body
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_matches_plain_output() {
        let format = LineFormat::default();
        let signal = CaughtSignal::new(libc::SIGTERM);
        assert_eq!(format.caught(&signal), "Caught terminated");
        assert_eq!(format.heartbeat("Still here"), "Still here");
    }

    #[test]
    fn test_name_style() {
        let format = LineFormat {
            name_style: NameStyle::Name,
            ..LineFormat::default()
        };
        let signal = CaughtSignal::new(libc::SIGINT);
        assert_eq!(format.caught(&signal), "Caught SIGINT");
    }

    #[test]
    fn test_timestamp_prefix() {
        let format = LineFormat {
            timestamps: true,
            ..LineFormat::default()
        };
        let signal = CaughtSignal::new(libc::SIGHUP);
        let line = format.caught(&signal);
        let (stamp, body) = line.split_once(' ').unwrap();
        assert_eq!(body, "Caught hangup");
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    }
}
