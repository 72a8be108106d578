//! Policy: Ordered bindings with first-match-wins semantics
//!
//! A [`PolicyTable`] is an immutable list of bindings, newest first. A
//! [`Policy`] names one table, publishes it through [`ArcSwap`], and falls back
//! to a default verbosity when no binding matches.

use crate::trace::{ResolveTrace, RuleStep};
use crate::{Binding, ConfigError, Fact, Matcher, PolicyRecord, Verbosity, MAX_RULES};
use arc_swap::ArcSwap;
use std::fmt;
use std::sync::Arc;

/// Immutable, ordered bindings.
///
/// # INV: First-match-wins
///
/// Bindings are checked in order. The first matching binding terminates the
/// resolution, even if later bindings would also match.
pub struct PolicyTable<R> {
    bindings: Vec<Binding<R>>,
}

impl<R> PolicyTable<R> {
    /// Create a table from bindings in resolution order.
    pub fn new(bindings: Vec<Binding<R>>) -> Self {
        Self { bindings }
    }

    /// Create an empty table.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    /// Returns the number of bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if there are no bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate bindings in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = &Binding<R>> {
        self.bindings.iter()
    }

    /// Maximum matcher depth across all bindings (0 for an empty table).
    pub fn depth(&self) -> usize {
        self.bindings
            .iter()
            .map(|b| b.matcher().depth())
            .max()
            .unwrap_or(0)
    }
}

impl<R: Clone> PolicyTable<R> {
    /// A new table with `binding` in front of the existing ones.
    #[must_use]
    pub fn with_prepended(&self, binding: Binding<R>) -> Self {
        let mut bindings = Vec::with_capacity(self.bindings.len() + 1);
        bindings.push(binding);
        bindings.extend(self.bindings.iter().cloned());
        Self { bindings }
    }

    /// Resolve facts to the outcome of the first matching binding.
    ///
    /// Deferred outcomes are invoked once, for the winning binding only.
    pub fn resolve(&self, facts: &[Fact]) -> Option<R> {
        self.bindings
            .iter()
            .find(|b| b.matches(facts))
            .map(Binding::then)
    }

    /// Resolve with full trace, falling back to `default`.
    ///
    /// Every binding up to and including the winner is traced; later bindings
    /// are not evaluated.
    pub fn resolve_with_trace(&self, facts: &[Fact], default: R) -> ResolveTrace<R> {
        let mut steps = Vec::new();
        for (index, binding) in self.bindings.iter().enumerate() {
            let trace = binding.matcher().matches_with_trace(facts);
            let matched = trace.matched();
            steps.push(RuleStep {
                index,
                rule: binding.matcher().describe(),
                trace,
            });
            if matched {
                return ResolveTrace {
                    result: binding.then(),
                    steps,
                    used_default: false,
                };
            }
        }
        ResolveTrace {
            result: default,
            steps,
            used_default: true,
        }
    }
}

impl<R: fmt::Display> PolicyTable<R> {
    /// Comma-joined `"<matcher> then <outcome>"`, in table order.
    pub fn describe(&self) -> String {
        self.bindings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl PolicyTable<Verbosity> {
    /// Build a table from declarative records, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns the first record's conversion error, or
    /// [`ConfigError::TooManyRules`] when there are more than [`MAX_RULES`].
    pub fn from_records<T: PolicyRecord>(records: &[T]) -> Result<Self, ConfigError> {
        if records.len() > MAX_RULES {
            return Err(ConfigError::TooManyRules {
                count: records.len(),
                max: MAX_RULES,
            });
        }
        let bindings = records
            .iter()
            .map(PolicyRecord::to_binding)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { bindings })
    }
}

impl<R> Default for PolicyTable<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R: Clone> Clone for PolicyTable<R> {
    fn clone(&self) -> Self {
        Self {
            bindings: self.bindings.clone(),
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for PolicyTable<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.bindings).finish()
    }
}

/// A named, hot-swappable verbosity policy.
///
/// Readers never lock: [`resolve`](Self::resolve) loads the current table
/// snapshot, and writers publish a whole new table.
///
/// # Example
///
/// ```
/// use logway::{Fact, Matcher, Policy, Verbosity};
///
/// let policy = Policy::new("orders").with_default(Verbosity::Silent);
/// policy.add_policy(Matcher::number(1).or([Matcher::number(3)]), Verbosity::InfoOnly);
///
/// assert_eq!(policy.resolve(&[Fact::from(3)]), Verbosity::InfoOnly);
/// assert_eq!(policy.resolve(&[Fact::from(2)]), Verbosity::Silent);
/// ```
pub struct Policy {
    name: String,
    default: Verbosity,
    table: ArcSwap<PolicyTable<Verbosity>>,
}

impl Policy {
    /// Create an empty policy with the [`Verbosity::default`] fallback.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Verbosity::default(),
            table: ArcSwap::from_pointee(PolicyTable::empty()),
        }
    }

    /// Override the fallback verbosity.
    #[must_use]
    pub fn with_default(mut self, default: Verbosity) -> Self {
        self.default = default;
        self
    }

    /// The policy name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fallback verbosity.
    pub fn default_verbosity(&self) -> Verbosity {
        self.default
    }

    /// Add a rule ahead of all existing ones. Chainable.
    pub fn add_policy(&self, matcher: Matcher, verbosity: Verbosity) -> &Self {
        self.add_binding(Binding::new(matcher, verbosity))
    }

    /// Add a binding ahead of all existing ones. Chainable.
    pub fn add_binding(&self, binding: Binding<Verbosity>) -> &Self {
        self.table.rcu(|table| table.with_prepended(binding.clone()));
        self
    }

    /// Resolve facts against the current table.
    pub fn resolve(&self, facts: &[Fact]) -> Verbosity {
        self.table.load().resolve(facts).unwrap_or(self.default)
    }

    /// Resolve with full trace for debugging.
    ///
    /// `result` always equals what [`resolve`](Self::resolve) returns for the
    /// same table snapshot.
    pub fn resolve_with_trace(&self, facts: &[Fact]) -> ResolveTrace<Verbosity> {
        self.table.load().resolve_with_trace(facts, self.default)
    }

    /// The current table.
    pub fn snapshot(&self) -> Arc<PolicyTable<Verbosity>> {
        self.table.load_full()
    }

    /// Atomically replace the table, returning the previous one.
    pub fn update_policies(&self, table: PolicyTable<Verbosity>) -> Arc<PolicyTable<Verbosity>> {
        self.table.swap(Arc::new(table))
    }

    /// Description of the current table.
    pub fn describe(&self) -> String {
        self.table.load().describe()
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("name", &self.name)
            .field("default", &self.default)
            .field("rules", &self.table.load().len())
            .finish()
    }
}
