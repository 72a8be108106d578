//! `Binding`: Matcher + outcome combination
//!
//! A `Binding` pairs a [`Matcher`] with what a policy yields when it matches.
//! A [`PolicyTable`](crate::PolicyTable) is an ordered list of bindings.

use crate::{Fact, Matcher};
use std::fmt;
use std::sync::Arc;

/// What a binding yields when its matcher accepts the facts.
///
/// `Deferred` providers run at decision time, once per decision, so the
/// outcome can follow state that changes between log calls.
pub enum Outcome<R> {
    /// A fixed value.
    Value(R),
    /// A provider invoked on every decision.
    Deferred(Arc<dyn Fn() -> R + Send + Sync>),
}

impl<R: Clone> Outcome<R> {
    /// Produce the outcome value, invoking the provider if deferred.
    pub fn get(&self) -> R {
        match self {
            Self::Value(value) => value.clone(),
            Self::Deferred(provider) => provider(),
        }
    }
}

impl<R: Clone> Clone for Outcome<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Value(value) => Self::Value(value.clone()),
            Self::Deferred(provider) => Self::Deferred(Arc::clone(provider)),
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Outcome<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(<fn>)"),
        }
    }
}

/// Deferred outcomes are not evaluated for display.
impl<R: fmt::Display> fmt::Display for Outcome<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "{value}"),
            Self::Deferred(_) => f.write_str("<deferred>"),
        }
    }
}

/// A binding: matcher + outcome.
///
/// # Example
///
/// ```
/// use logway::{Fact, Matcher, Verbosity};
///
/// let binding = Matcher::tag("REQUEST").on_match(Verbosity::InfoOnly);
/// assert!(binding.matches(&[Fact::from("REQUEST")]));
/// assert_eq!(binding.then(), Verbosity::InfoOnly);
/// assert_eq!(binding.to_string(), "REQUEST then info_only");
/// ```
pub struct Binding<R> {
    matcher: Matcher,
    outcome: Outcome<R>,
}

impl<R> Binding<R> {
    /// Bind a fixed value.
    pub fn new(matcher: Matcher, value: R) -> Self {
        Self {
            matcher,
            outcome: Outcome::Value(value),
        }
    }

    /// Bind a provider invoked on every decision.
    pub fn deferred(matcher: Matcher, provider: impl Fn() -> R + Send + Sync + 'static) -> Self {
        Self {
            matcher,
            outcome: Outcome::Deferred(Arc::new(provider)),
        }
    }

    /// The bound matcher.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// The bound outcome.
    pub fn outcome(&self) -> &Outcome<R> {
        &self.outcome
    }

    /// Any-of match of the bound matcher.
    pub fn matches(&self, facts: &[Fact]) -> bool {
        self.matcher.matches(facts)
    }
}

impl<R: Clone> Binding<R> {
    /// The outcome value, invoking a deferred provider if needed.
    pub fn then(&self) -> R {
        self.outcome.get()
    }
}

impl<R: Clone> Clone for Binding<R> {
    fn clone(&self) -> Self {
        Self {
            matcher: self.matcher.clone(),
            outcome: self.outcome.clone(),
        }
    }
}

impl<R: fmt::Debug> fmt::Debug for Binding<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("matcher", &self.matcher)
            .field("outcome", &self.outcome)
            .finish()
    }
}

impl<R: fmt::Display> fmt::Display for Binding<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} then {}", self.matcher, self.outcome)
    }
}

impl Matcher {
    /// Bind this matcher to a fixed value.
    pub fn on_match<R>(self, value: R) -> Binding<R> {
        Binding::new(self, value)
    }

    /// Bind this matcher to a provider invoked on every decision.
    pub fn on_match_with<R>(self, provider: impl Fn() -> R + Send + Sync + 'static) -> Binding<R> {
        Binding::deferred(self, provider)
    }
}
