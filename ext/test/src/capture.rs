//! Capturing `tracing` events for assertions.
//!
//! [`capture_tracing`] installs a thread-local subscriber that records every
//! event, so tests can check what [`TracingSink`](logway::TracingSink) and the
//! crate's own diagnostics emit.

use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// A captured tracing event.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    /// The log level.
    pub level: Level,
    /// The event target.
    pub target: String,
    /// The formatted message.
    pub message: String,
    /// Field key-value pairs, in recording order.
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    /// Value of the field `name`, if recorded.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Thread-safe store of captured events.
#[derive(Clone, Default)]
pub struct CapturedEvents {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedEvents {
    /// All captured events.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events whose target starts with `prefix`.
    pub fn for_target(&self, prefix: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.target.starts_with(prefix))
            .collect()
    }

    /// Check if any event at `level` contains `needle` in its message.
    pub fn has_event(&self, level: Level, needle: &str) -> bool {
        self.events()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }
}

struct CaptureLayer {
    events: CapturedEvents,
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let value = format!("{value:?}");
        if field.name() == "message" {
            self.message = value;
        } else {
            self.fields.push((field.name().to_owned(), value));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.message);
        } else {
            self.fields.push((field.name().to_owned(), value.to_owned()));
        }
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let metadata = event.metadata();
        if let Ok(mut events) = self.events.events.lock() {
            events.push(CapturedEvent {
                level: *metadata.level(),
                target: metadata.target().to_owned(),
                message: visitor.message,
                fields: visitor.fields,
            });
        }
    }
}

/// Install a capturing subscriber for the current thread.
///
/// `max_level` bounds what is enabled, so `LevelFilter::INFO` makes
/// `tracing::enabled!(Level::DEBUG)` false. Keep the guard alive for the
/// duration of the test.
pub fn capture_tracing(
    max_level: LevelFilter,
) -> (CapturedEvents, tracing::subscriber::DefaultGuard) {
    let events = CapturedEvents::default();
    let layer = CaptureLayer {
        events: events.clone(),
    };
    let guard = tracing_subscriber::registry()
        .with(layer)
        .with(max_level)
        .set_default();
    (events, guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_message_and_fields() {
        let (events, _guard) = capture_tracing(LevelFilter::TRACE);
        tracing::info!(target: "logway::service", user = "u1", "hello");

        let captured = events.for_target("logway::service");
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].message, "hello");
        assert_eq!(captured[0].field("user"), Some("u1"));
    }

    #[test]
    fn level_filter_applies() {
        let (events, _guard) = capture_tracing(LevelFilter::INFO);
        tracing::debug!("hidden");
        tracing::warn!("shown");
        assert!(!events.has_event(Level::DEBUG, "hidden"));
        assert!(events.has_event(Level::WARN, "shown"));
        assert!(!tracing::enabled!(Level::DEBUG));
    }
}
