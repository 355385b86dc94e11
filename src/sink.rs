use std::fmt;
use std::sync::Arc;

use crate::hexdump;

/// Consumer of diagnostic text.
///
/// Every call delivers one or more complete lines, each terminated by CRLF.
pub trait LogSink: Send + Sync {
    fn write(&self, text: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn write(&self, text: &str) {
        self(text)
    }
}

/// A [`LogSink`] forwarding to the `log` crate at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogForward;

impl LogSink for LogForward {
    fn write(&self, text: &str) {
        debug!("{}", text.trim_end_matches("\r\n"));
    }
}

/// Line writer over an optional [`LogSink`].
///
/// Without a sink every call is a no-op, and nothing is formatted.
#[derive(Clone, Default)]
pub struct Logger {
    sink: Option<Arc<dyn LogSink>>,
}

impl Logger {
    pub fn new(sink: Option<Arc<dyn LogSink>>) -> Self {
        Self { sink }
    }

    /// Whether a sink is bound.
    #[inline(always)]
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Write `message` followed by CRLF.
    pub fn line(&self, message: &str) {
        if let Some(sink) = &self.sink {
            sink.write(&format!("{}\r\n", message));
        }
    }

    /// Write a line produced by `f`, only calling `f` when a sink is bound.
    pub fn line_with(&self, f: impl FnOnce() -> String) {
        if self.is_enabled() {
            self.line(&f());
        }
    }

    /// Write `bytes` as a hex dump.
    pub fn hex(&self, bytes: &[u8]) {
        self.line_with(|| hexdump::format(bytes));
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
