//! Binder, policy and printer working together the way a service wires them.

use logway_test::prelude::*;
use logway::{LogwayConfig, MatcherConfig};
use std::sync::Arc;

fn rule(when: MatcherConfig, verbosity: Verbosity) -> PolicyRule {
    PolicyRule { when, verbosity }
}

fn tag(name: &str) -> MatcherConfig {
    MatcherConfig::Tag { name: name.into() }
}

#[test]
fn reload_changes_what_gets_printed() {
    let sink = CaptureSink::with_debug(true);
    let config = Arc::new(PrinterConfig::new(sink.clone()).with_delimiter("|"));
    let policy = Arc::new(Policy::new("orders"));
    let binder = PolicyBinder::new(Arc::clone(&policy), Arc::clone(&config));
    let printer = Printer::new(Arc::clone(&config)).with_var(&Var::ACTION, "pay");
    let ctx = LogContext::new();

    let emit = |facts: &[Fact]| {
        printer
            .print_by_verbosity(
                &ctx,
                policy.resolve(facts),
                "paid",
                "paid in full",
                "body {}",
                vec![Arg::value("{}")],
            )
            .unwrap();
    };

    let rules = vec![rule(tag("REQUEST"), Verbosity::Silent)];
    assert!(binder.init(Some(rules.as_slice())).is_applied());
    sink.clear();

    emit(&[Fact::from("REQUEST")]);
    assert!(sink.lines().is_empty());

    let rules = vec![rule(tag("REQUEST"), Verbosity::InfoOnly)];
    assert!(binder.update(Some(rules.as_slice())).is_applied());
    assert!(sink.has_line(Level::INFO, "update by "));
    sink.clear();

    emit(&[Fact::from("REQUEST")]);
    assert_eq!(
        sink.messages(),
        vec![(Level::INFO, "pay|||paid in full".to_owned())]
    );
    sink.clear();

    // No rule matches: default is easy info with debug appended
    emit(&[Fact::from("OTHER")]);
    assert_eq!(
        sink.messages(),
        vec![(Level::INFO, "pay|||paid body {}".to_owned())]
    );
}

#[test]
fn rejected_reload_keeps_rules_and_logs_nothing() {
    let sink = CaptureSink::new();
    let policy = Arc::new(Policy::new("orders"));
    let binder = PolicyBinder::new(
        Arc::clone(&policy),
        Arc::new(PrinterConfig::new(sink.clone())),
    );

    let good = vec![rule(tag("A"), Verbosity::DebugOnly)];
    binder.init(Some(good.as_slice()));
    sink.clear();

    let bad = vec![rule(MatcherConfig::Or { matchers: vec![] }, Verbosity::Silent)];
    let reload = binder.update(Some(bad.as_slice()));
    assert!(matches!(reload, Reload::Rejected(ConfigError::EmptyCompound { .. })));
    assert_eq!(policy.resolve(&[Fact::from("A")]), Verbosity::DebugOnly);
    assert!(sink.lines().is_empty());
}

#[test]
fn rejected_reload_warns_through_tracing() {
    let (events, _guard) = capture_tracing(tracing::level_filters::LevelFilter::DEBUG);
    let policy = Arc::new(Policy::new("orders"));
    let binder = PolicyBinder::new(policy, Arc::new(PrinterConfig::new(CaptureSink::new())));

    let bad = vec![rule(tag(""), Verbosity::Silent)];
    binder.init(Some(bad.as_slice()));
    binder.init(None::<&[PolicyRule]>);

    assert!(events.has_event(Level::WARN, "policy reload rejected"));
    assert!(events.has_event(Level::DEBUG, "no policy records"));
}

#[test]
fn config_document_to_running_policy() {
    let json = r#"{
        "name": "checkout",
        "default": "info_only",
        "delimiter": "|",
        "rules": [
            { "when": { "type": "prefix", "prefix": "CHECKOUT_PAY" }, "verbosity": "silent" },
            { "when": { "type": "number", "value": 500, "op": "ge" }, "verbosity": "info_and_debug" }
        ]
    }"#;
    let config = LogwayConfig::from_json(json).unwrap();
    let policy = config.build_policy().unwrap();

    assert_eq!(policy.name(), "checkout");
    assert_eq!(policy.resolve(&[Fact::from("CHECKOUT")]), Verbosity::Silent);
    assert_eq!(policy.resolve(&[Fact::from(503)]), Verbosity::InfoAndDebug);
    assert_eq!(policy.resolve(&[Fact::from("OTHER")]), Verbosity::InfoOnly);

    assert_eq!(config.printer_config().delimiter(), "|");
}

#[test]
fn context_backup_survives_a_reset() {
    let mut ctx = LogContext::new()
        .with(Field::TraceId, "t-1")
        .with(Field::User, "alice");
    let backup = ctx.backup();

    ctx.reset();
    ctx.record(Field::User, "bob");
    backup.recover(&mut ctx);

    assert_eq!(ctx.get(Field::TraceId), "t-1");
    assert_eq!(ctx.get(Field::User), "bob");
}
