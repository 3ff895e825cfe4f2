use crate::domain::ports::LineSink;
use crate::utils::error::{Result, WatchError};
use std::io::{ErrorKind, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Writes each line to stdout and flushes immediately.
#[derive(Debug, Default)]
pub struct StdoutSink {
    // Set once stdout reports a broken pipe. With SIGPIPE watched, every
    // further write would raise another SIGPIPE and feed the printer.
    closed: AtomicBool,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Relaxed)
    }
}

impl LineSink for StdoutSink {
    fn write_line(&self, line: &str) -> Result<()> {
        if self.is_closed() {
            return Err(WatchError::OutputError {
                message: "stdout is closed".to_string(),
            });
        }

        let mut stdout = std::io::stdout().lock();
        let result = writeln!(stdout, "{}", line).and_then(|_| stdout.flush());
        if let Err(e) = result {
            if e.kind() == ErrorKind::BrokenPipe {
                self.closed.store(true, Ordering::Relaxed);
            }
            return Err(WatchError::OutputError {
                message: e.to_string(),
            });
        }
        Ok(())
    }
}

/// Collects lines in memory. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn count_matching(&self, line: &str) -> usize {
        self.lines().iter().filter(|l| l.as_str() == line).count()
    }
}

impl LineSink for MemorySink {
    fn write_line(&self, line: &str) -> Result<()> {
        let mut lines = self.lines.lock().map_err(|_| WatchError::OutputError {
            message: "memory sink poisoned".to_string(),
        })?;
        lines.push(line.to_string());
        Ok(())
    }
}
