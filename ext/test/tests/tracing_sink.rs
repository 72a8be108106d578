//! TracingSink emits service lines as `tracing` events.

use logway::{Field, LogContext, LogSink, Printer, PrinterConfig, TracingSink, Var, SERVICE_TARGET};
use logway_test::capture::capture_tracing;
use std::sync::Arc;
use tracing::level_filters::LevelFilter;
use tracing::Level;

fn ctx() -> LogContext {
    LogContext::new()
        .with(Field::TraceId, "t-1")
        .with(Field::User, "alice")
        .with(Field::OrderKey, "o-9")
}

#[test]
fn event_carries_context_fields() {
    let (events, _guard) = capture_tracing(LevelFilter::TRACE);
    TracingSink.log(Level::WARN, &ctx(), "slow order");

    let captured = events.for_target(SERVICE_TARGET);
    assert_eq!(captured.len(), 1);
    let event = &captured[0];
    assert_eq!(event.level, Level::WARN);
    assert_eq!(event.message, "slow order");
    assert_eq!(event.field("traceID"), Some("t-1"));
    assert_eq!(event.field("user"), Some("alice"));
    assert_eq!(event.field("orderKey"), Some("o-9"));
    assert_eq!(event.field("shopID"), Some(""));
}

#[test]
fn debug_follows_the_subscriber() {
    {
        let (_events, _guard) = capture_tracing(LevelFilter::INFO);
        assert!(!TracingSink.debug_enabled());
    }
    let (_events, _guard) = capture_tracing(LevelFilter::DEBUG);
    assert!(TracingSink.debug_enabled());
}

#[test]
fn printer_through_tracing() {
    let (events, _guard) = capture_tracing(LevelFilter::INFO);
    let printer = Printer::new(Arc::new(PrinterConfig::new(TracingSink).with_delimiter("|")))
        .with_var(&Var::ACTION, "pay");

    printer
        .info(&ctx(), "paid {}", vec![logway::Arg::value(42)])
        .unwrap();
    printer
        .debug(&ctx(), "never {}", vec![logway::Arg::lazy(|| panic!("resolved"))])
        .unwrap();

    let captured = events.for_target(SERVICE_TARGET);
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].message, "pay|||paid 42");
}
