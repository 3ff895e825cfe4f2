use crate::utils::error::Result;

/// Destination for the observable output lines.
pub trait LineSink: Send + Sync {
    fn write_line(&self, line: &str) -> Result<()>;
}

impl<T: LineSink + ?Sized> LineSink for std::sync::Arc<T> {
    fn write_line(&self, line: &str) -> Result<()> {
        (**self).write_line(line)
    }
}
