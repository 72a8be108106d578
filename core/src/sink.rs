//! Log sinks: where rendered lines go.

use crate::{Field, LogContext};
use tracing::Level;

/// The `tracing` target of service lines written by [`TracingSink`].
///
/// Filter on it to route service output separately from the crate's own
/// diagnostics, e.g. `RUST_LOG=logway::service=debug`.
pub const SERVICE_TARGET: &str = "logway::service";

/// A destination for rendered log lines.
///
/// Implementations receive a finished message plus the call's context fields.
/// [`debug_enabled`](Self::debug_enabled) lets the printer skip rendering (and
/// argument evaluation) for a debug channel nobody listens to.
pub trait LogSink: Send + Sync {
    /// Write one line.
    fn log(&self, level: Level, ctx: &LogContext, message: &str);

    /// Returns `true` if debug lines would be kept.
    fn debug_enabled(&self) -> bool;

    /// Write at [`Level::INFO`].
    fn info(&self, ctx: &LogContext, message: &str) {
        self.log(Level::INFO, ctx, message);
    }

    /// Write at [`Level::DEBUG`].
    fn debug(&self, ctx: &LogContext, message: &str) {
        self.log(Level::DEBUG, ctx, message);
    }

    /// Write at [`Level::WARN`].
    fn warn(&self, ctx: &LogContext, message: &str) {
        self.log(Level::WARN, ctx, message);
    }

    /// Write at [`Level::ERROR`].
    fn error(&self, ctx: &LogContext, message: &str) {
        self.log(Level::ERROR, ctx, message);
    }
}

/// A shared sink writes through to the sink it points at.
impl<S: LogSink + ?Sized> LogSink for std::sync::Arc<S> {
    fn log(&self, level: Level, ctx: &LogContext, message: &str) {
        (**self).log(level, ctx, message);
    }

    fn debug_enabled(&self) -> bool {
        (**self).debug_enabled()
    }
}

/// Emits every line as a `tracing` event on [`SERVICE_TARGET`], with the
/// context fields attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

macro_rules! service_event {
    ($level:expr, $ctx:expr, $message:expr) => {
        tracing::event!(
            target: SERVICE_TARGET,
            $level,
            traceID = $ctx.get(Field::TraceId),
            path = $ctx.get(Field::Path),
            groupID = $ctx.get(Field::GroupId),
            shopID = $ctx.get(Field::ShopId),
            user = $ctx.get(Field::User),
            orderKey = $ctx.get(Field::OrderKey),
            extension = $ctx.get(Field::Extension),
            "{}",
            $message
        )
    };
}

impl LogSink for TracingSink {
    fn log(&self, level: Level, ctx: &LogContext, message: &str) {
        if level == Level::ERROR {
            service_event!(Level::ERROR, ctx, message);
        } else if level == Level::WARN {
            service_event!(Level::WARN, ctx, message);
        } else if level == Level::INFO {
            service_event!(Level::INFO, ctx, message);
        } else if level == Level::DEBUG {
            service_event!(Level::DEBUG, ctx, message);
        } else {
            service_event!(Level::TRACE, ctx, message);
        }
    }

    fn debug_enabled(&self) -> bool {
        tracing::enabled!(target: SERVICE_TARGET, Level::DEBUG)
    }
}

#[cfg(test)]
pub(crate) use memory::MemorySink;
