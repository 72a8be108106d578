//! Resolution trace types for debugging policy decisions.
//!
//! Trace types mirror the runtime types ([`Matcher`](crate::Matcher),
//! [`PolicyTable`](crate::PolicyTable)) but capture evaluation results instead
//! of inputs. Use `resolve_with_trace()` to see why a log call got the
//! verbosity it got.
//!
//! # Two Levels of Trace
//!
//! - [`MatchTrace`]: Per-matcher: which sub-expressions matched, on which fact?
//! - [`ResolveTrace`]: Per-table: which rules were checked, was the default used?
//!
//! # Example
//!
//! ```
//! use logway::prelude::*;
//!
//! let policy = Policy::new("orders");
//! policy.add_policy(Matcher::tag("REQUEST"), Verbosity::InfoOnly);
//!
//! let trace = policy.resolve_with_trace(&[Fact::from("REQUEST")]);
//! assert_eq!(trace.result, Verbosity::InfoOnly);
//! assert!(!trace.used_default);
//! assert_eq!(trace.steps.len(), 1);
//! ```

use std::fmt;

/// Trace of a matcher evaluation.
///
/// Mirrors [`Matcher`](crate::Matcher) structure but captures results.
///
/// In And/Or, ALL children are evaluated (no short-circuit) for maximum
/// debugging value. The `matched` result is still correct.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchTrace {
    /// A leaf evaluation.
    Leaf {
        /// Whether any fact satisfied the leaf.
        matched: bool,
        /// Description of the leaf (e.g. `"REQUEST"`, `">=12"`).
        matcher: String,
        /// The first fact that satisfied the leaf, if any.
        hit: Option<String>,
    },
    /// AND: all children must match.
    And {
        /// Whether all children matched.
        matched: bool,
        /// Trace of each child (all evaluated, no short-circuit).
        children: Vec<MatchTrace>,
    },
    /// OR: any child must match.
    Or {
        /// Whether any child matched.
        matched: bool,
        /// Trace of each child (all evaluated, no short-circuit).
        children: Vec<MatchTrace>,
    },
    /// NOT: inverts inner result.
    Not {
        /// Whether the NOT matched (i.e., inner did NOT match).
        matched: bool,
        /// Trace of the inner matcher.
        inner: Box<MatchTrace>,
    },
}

impl MatchTrace {
    /// Get the overall match result.
    #[must_use]
    pub fn matched(&self) -> bool {
        match self {
            Self::Leaf { matched, .. }
            | Self::And { matched, .. }
            | Self::Or { matched, .. }
            | Self::Not { matched, .. } => *matched,
        }
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let mark = if self.matched() { "+" } else { "-" };
        let pad = "  ".repeat(indent);
        match self {
            Self::Leaf { matcher, hit, .. } => match hit {
                Some(hit) => writeln!(f, "{pad}{mark} {matcher} (hit {hit})"),
                None => writeln!(f, "{pad}{mark} {matcher}"),
            },
            Self::And { children, .. } | Self::Or { children, .. } => {
                let op = if matches!(self, Self::And { .. }) { "and" } else { "or" };
                writeln!(f, "{pad}{mark} {op}")?;
                children
                    .iter()
                    .try_for_each(|c| c.write_indented(f, indent + 1))
            }
            Self::Not { inner, .. } => {
                writeln!(f, "{pad}{mark} not")?;
                inner.write_indented(f, indent + 1)
            }
        }
    }
}

/// Indented tree, `+` for matched nodes and `-` for the rest.
impl fmt::Display for MatchTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

/// Trace of a full policy resolution.
///
/// # INV: `result` == `resolve()` result
///
/// The `result` field always equals what [`Policy::resolve()`](crate::Policy::resolve)
/// would return for the same facts.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveTrace<R> {
    /// The final result (identical to what `resolve()` returns).
    pub result: R,
    /// Trace of each rule that was evaluated (in table order).
    /// Stops after the first match (preserves first-match-wins).
    pub steps: Vec<RuleStep>,
    /// Whether the policy default was used.
    pub used_default: bool,
}

/// One rule's evaluation in a trace.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleStep {
    /// Index in the table (0 is the newest rule).
    pub index: usize,
    /// Description of the rule's matcher.
    pub rule: String,
    /// Full matcher evaluation trace.
    pub trace: MatchTrace,
}

impl RuleStep {
    /// Did this rule's matcher accept the facts?
    #[must_use]
    pub fn matched(&self) -> bool {
        self.trace.matched()
    }
}
