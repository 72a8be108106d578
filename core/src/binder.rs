//! Dynamic binder: turns declarative records into a new policy table.
//!
//! The binder never schedules anything. An external scheduler (or
//! [`spawn_refresh`](crate::refresh::spawn_refresh) with the `refresh`
//! feature) calls [`PolicyBinder::on_refresh`] with whatever it fetched.

use crate::{
    Arg, ConfigError, LogContext, Policy, PolicyRecord, PolicyTable, Printer, PrinterConfig, Var,
};
use std::sync::Arc;

/// What a reload did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reload {
    /// The table was replaced.
    Applied {
        /// Rules in the new table.
        rules: usize,
    },
    /// No records were supplied; the table is unchanged.
    SkippedEmpty,
    /// A record failed to convert; the table is unchanged.
    Rejected(ConfigError),
}

impl Reload {
    /// Returns `true` if the table was replaced.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Converts record lists into bindings and publishes them on a [`Policy`].
///
/// Reloads are fail-open: empty input or a bad record keeps the current
/// table. Every applied reload writes one audit line with the input and the
/// resulting table (and, for updates, the previous table).
///
/// # Example
///
/// ```
/// use logway::prelude::*;
/// use logway::MatcherConfig;
/// use std::sync::Arc;
///
/// let policy = Arc::new(Policy::new("orders"));
/// let binder = PolicyBinder::new(Arc::clone(&policy), Arc::new(PrinterConfig::default()));
///
/// let rules = vec![PolicyRule {
///     when: MatcherConfig::Tag { name: "REQUEST".into() },
///     verbosity: Verbosity::InfoOnly,
/// }];
/// assert!(binder.init(Some(rules.as_slice())).is_applied());
/// assert_eq!(policy.resolve(&[Fact::from("REQUEST")]), Verbosity::InfoOnly);
///
/// assert_eq!(binder.update(Some(&[] as &[PolicyRule])), Reload::SkippedEmpty);
/// assert_eq!(policy.resolve(&[Fact::from("REQUEST")]), Verbosity::InfoOnly);
/// ```
#[derive(Debug, Clone)]
pub struct PolicyBinder {
    policy: Arc<Policy>,
    printer: Arc<PrinterConfig>,
    source: String,
}

impl PolicyBinder {
    /// Bind `policy`, auditing through `printer`. The source label is `"config"`.
    pub fn new(policy: Arc<Policy>, printer: Arc<PrinterConfig>) -> Self {
        Self {
            policy,
            printer,
            source: "config".to_owned(),
        }
    }

    /// Label written as the `action` var of audit lines.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn policy(&self) -> &Arc<Policy> {
        &self.policy
    }

    /// First load.
    pub fn init<R: PolicyRecord>(&self, records: Option<&[R]>) -> Reload {
        self.reload(records, true)
    }

    /// Subsequent loads; the audit line also carries the previous table.
    pub fn update<R: PolicyRecord>(&self, records: Option<&[R]>) -> Reload {
        self.reload(records, false)
    }

    /// The scheduler callback: [`init`](Self::init) when `initial`, else
    /// [`update`](Self::update).
    pub fn on_refresh<R: PolicyRecord>(&self, records: Option<&[R]>, initial: bool) -> Reload {
        self.reload(records, initial)
    }

    fn reload<R: PolicyRecord>(&self, records: Option<&[R]>, initial: bool) -> Reload {
        let Some(records) = records.filter(|r| !r.is_empty()) else {
            tracing::debug!(
                policy = self.policy.name(),
                "no policy records; keeping current rules"
            );
            return Reload::SkippedEmpty;
        };

        let table = match PolicyTable::from_records(records) {
            Ok(table) => table,
            Err(err) => {
                tracing::warn!(
                    policy = self.policy.name(),
                    error = %err,
                    "policy reload rejected; keeping current rules"
                );
                return Reload::Rejected(err);
            }
        };

        let rules = table.len();
        let result = table.describe();
        let previous = self.policy.update_policies(table);
        self.audit(records, initial, &previous.describe(), result);
        Reload::Applied { rules }
    }

    fn audit<R: PolicyRecord>(&self, records: &[R], initial: bool, before: &str, result: String) {
        let input = serde_json::to_string(records)
            .unwrap_or_else(|err| format!("<unserializable records: {err}>"));
        let printer = Printer::new(Arc::clone(&self.printer))
            .with_var(&Var::ACTION, &self.source)
            .with_var(&Var::TOPIC, self.policy.name());
        let ctx = LogContext::new();
        let written = if initial {
            printer.info(
                &ctx,
                "init by {}, result -> {}",
                vec![Arg::Value(input), Arg::Value(result)],
            )
        } else {
            printer.info(
                &ctx,
                "update by {}, before {}, result -> {}",
                vec![Arg::Value(input), Arg::value(before), Arg::Value(result)],
            )
        };
        if let Err(err) = written {
            tracing::warn!(error = %err, "policy audit line not written");
        }
    }
}
