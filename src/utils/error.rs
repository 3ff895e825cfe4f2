use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration parse error in {field}: {message}")]
    ConfigParseError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown signal: {name}")]
    UnknownSignal { name: String },

    #[error("Signal {name} cannot be caught")]
    ForbiddenSignal { name: String },

    #[error("Failed to register handler for {signal}: {source}")]
    Registration {
        signal: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output error: {message}")]
    OutputError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Signal,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl WatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WatchError::ConfigParseError { .. } | WatchError::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            WatchError::UnknownSignal { .. }
            | WatchError::ForbiddenSignal { .. }
            | WatchError::Registration { .. } => ErrorCategory::Signal,
            WatchError::OutputError { .. } => ErrorCategory::Output,
            WatchError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            WatchError::OutputError { .. } => ErrorSeverity::Low,
            WatchError::ConfigParseError { .. }
            | WatchError::InvalidConfigValueError { .. }
            | WatchError::UnknownSignal { .. }
            | WatchError::ForbiddenSignal { .. } => ErrorSeverity::High,
            WatchError::Registration { .. } | WatchError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// 根據嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            WatchError::ConfigParseError { .. } => {
                "Check the TOML syntax of the configuration file".to_string()
            }
            WatchError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of '{}' and try again", field)
            }
            WatchError::UnknownSignal { .. } => {
                "Run with --list to see the signals this platform knows".to_string()
            }
            WatchError::ForbiddenSignal { .. } => {
                "SIGKILL, SIGSTOP and fault signals cannot be observed; remove them from the list"
                    .to_string()
            }
            WatchError::Registration { .. } => {
                "Another component may own this signal; try a narrower --signals list".to_string()
            }
            WatchError::OutputError { .. } => "Check that stdout is still open".to_string(),
            WatchError::IoError(_) => "Check file paths and permissions".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Signal => format!("Signal setup problem: {}", self),
            ErrorCategory::Output => format!("Output problem: {}", self),
            ErrorCategory::System => format!("System problem: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, WatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_severity() {
        let config_err = WatchError::InvalidConfigValueError {
            field: "heartbeat.interval".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        };
        assert_eq!(config_err.category(), ErrorCategory::Configuration);
        assert_eq!(config_err.exit_code(), 1);

        let reg_err = WatchError::Registration {
            signal: "SIGUSR1".to_string(),
            source: std::io::Error::other("boom"),
        };
        assert_eq!(reg_err.category(), ErrorCategory::Signal);
        assert_eq!(reg_err.exit_code(), 3);
    }

    #[test]
    fn test_user_friendly_message_mentions_cause() {
        let err = WatchError::UnknownSignal {
            name: "SIGFOO".to_string(),
        };
        assert!(err.user_friendly_message().contains("SIGFOO"));
        assert!(err.recovery_suggestion().contains("--list"));
    }
}
