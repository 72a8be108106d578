//! logway-test: Test support for logway
//!
//! Provides a [`CaptureSink`] that records printer output in memory, a
//! `tracing` capture layer for asserting on [`TracingSink`](logway::TracingSink)
//! events, and (with the `fixtures` feature) the YAML conformance runner.
//!
//! # Example
//!
//! ```
//! use logway_test::prelude::*;
//! use std::sync::Arc;
//!
//! let sink = CaptureSink::new();
//! let printer = Printer::new(Arc::new(PrinterConfig::new(sink.clone())));
//!
//! printer.info(&LogContext::new(), "paid {}", vec![Arg::value(42)]).unwrap();
//! assert!(sink.has_line(Level::INFO, "paid 42"));
//! ```

use logway::{Level, LogContext, LogSink};
use std::sync::{Arc, Mutex, MutexGuard};

pub mod capture;
#[cfg(feature = "fixtures")]
pub mod fixture;

/// One line written to a [`CaptureSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    /// The level it was written at.
    pub level: Level,
    /// The full rendered message, prefix and hint included.
    pub message: String,
    /// The context passed with it.
    pub context: LogContext,
}

/// A [`LogSink`] that keeps every line in memory.
///
/// Clones share the same storage, so hand one clone to the printer and keep
/// another for assertions.
#[derive(Debug, Clone, Default)]
pub struct CaptureSink {
    debug: bool,
    lines: Arc<Mutex<Vec<CapturedLine>>>,
}

impl CaptureSink {
    /// A sink with the debug channel disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink with the debug channel switched as given.
    #[must_use]
    pub fn with_debug(debug: bool) -> Self {
        Self {
            debug,
            lines: Arc::default(),
        }
    }

    // Stays readable after a panic on another thread.
    fn guard(&self) -> MutexGuard<'_, Vec<CapturedLine>> {
        self.lines
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Every captured line, oldest first.
    pub fn lines(&self) -> Vec<CapturedLine> {
        self.guard().clone()
    }

    /// `(level, message)` pairs, oldest first.
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.guard()
            .iter()
            .map(|line| (line.level, line.message.clone()))
            .collect()
    }

    /// Check if any line at `level` contains `needle`.
    pub fn has_line(&self, level: Level, needle: &str) -> bool {
        self.guard()
            .iter()
            .any(|line| line.level == level && line.message.contains(needle))
    }

    /// Count lines at a specific level.
    pub fn count_at_level(&self, level: Level) -> usize {
        self.guard().iter().filter(|line| line.level == level).count()
    }

    /// Forget every captured line.
    pub fn clear(&self) {
        self.guard().clear();
    }
}

impl LogSink for CaptureSink {
    fn log(&self, level: Level, ctx: &LogContext, message: &str) {
        self.guard().push(CapturedLine {
            level,
            message: message.to_owned(),
            context: ctx.clone(),
        });
    }

    fn debug_enabled(&self) -> bool {
        self.debug
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::capture::{capture_tracing, CapturedEvent, CapturedEvents};
    pub use super::{CaptureSink, CapturedLine};
    pub use logway::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;
    use logway::Field;

    #[test]
    fn clones_share_storage() {
        let sink = CaptureSink::new();
        let other = sink.clone();
        other.info(&LogContext::new().with(Field::User, "u1"), "hello");

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].level, Level::INFO);
        assert_eq!(lines[0].context.get(Field::User), "u1");
    }

    #[test]
    fn debug_switch() {
        assert!(!CaptureSink::new().debug_enabled());
        assert!(CaptureSink::with_debug(true).debug_enabled());
    }

    #[test]
    fn queries() {
        let sink = CaptureSink::with_debug(true);
        let ctx = LogContext::new();
        sink.info(&ctx, "one");
        sink.debug(&ctx, "two");
        sink.info(&ctx, "three");

        assert_eq!(sink.count_at_level(Level::INFO), 2);
        assert!(sink.has_line(Level::DEBUG, "tw"));
        assert!(!sink.has_line(Level::INFO, "two"));

        sink.clear();
        assert!(sink.messages().is_empty());
    }
}
