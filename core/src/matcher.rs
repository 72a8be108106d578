//! Matcher: Boolean algebra over [`Fact`]s
//!
//! Leaves test a single fact (tag equality, prefix, number, enum variant, or a
//! user-supplied [`FactMatcher`]); `And`, `Or` and `Not` compose them.
//!
//! # Two ways to match
//!
//! - [`Matcher::matches_one`]: the type-guarded match of one fact. A fact of a
//!   kind the leaf does not accept is a non-match, never an error.
//! - [`Matcher::matches`]: the "any-of" match used by policies. A leaf succeeds
//!   when **any** supplied fact satisfies it; combinators pass the whole fact
//!   list to each child.

use crate::{ConfigError, Fact, FactKind, MatchTrace, MAX_CHILDREN, MAX_DEPTH};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// A user-defined leaf predicate.
///
/// Use this when tag, prefix, number, and enum matching do not cover the rule,
/// e.g. an age bracket or a set lookup. The matcher is only called with facts
/// whose kind equals [`kind`](Self::kind).
///
/// # Example
///
/// ```
/// use logway::{Fact, FactKind, FactMatcher, Matcher};
///
/// #[derive(Debug)]
/// struct OneOf(Vec<&'static str>);
///
/// impl FactMatcher for OneOf {
///     fn kind(&self) -> FactKind {
///         FactKind::Str
///     }
///
///     fn matches(&self, fact: &Fact) -> bool {
///         fact.as_str().is_some_and(|s| self.0.contains(&s))
///     }
///
///     fn describe(&self) -> String {
///         format!("{{{}}}", self.0.join(","))
///     }
/// }
///
/// let m = Matcher::custom(OneOf(vec!["pay", "refund"]));
/// assert!(m.matches(&[Fact::from("refund")]));
/// assert!(!m.matches(&[Fact::from(1)]));
/// ```
pub trait FactMatcher: Send + Sync + Debug {
    /// The fact kind this matcher accepts.
    fn kind(&self) -> FactKind;

    /// Check a fact already known to be of [`kind`](Self::kind).
    fn matches(&self, fact: &Fact) -> bool;

    /// Human-readable description for audit logs.
    fn describe(&self) -> String;
}

/// Comparison used by [`Matcher::Number`].
///
/// `Eq` is numeric equality; the others turn the leaf into an inequality, with
/// the candidate on the left (`Ge` means `candidate >= configured`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberOp {
    /// `candidate == configured`
    #[default]
    Eq,
    /// `candidate != configured`
    Ne,
    /// `candidate > configured`
    Gt,
    /// `candidate >= configured`
    Ge,
    /// `candidate < configured`
    Lt,
    /// `candidate <= configured`
    Le,
}

impl NumberOp {
    #[allow(clippy::float_cmp)]
    fn apply(self, candidate: f64, configured: f64) -> bool {
        match self {
            Self::Eq => candidate == configured,
            Self::Ne => candidate != configured,
            Self::Gt => candidate > configured,
            Self::Ge => candidate >= configured,
            Self::Lt => candidate < configured,
            Self::Le => candidate <= configured,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        }
    }
}

/// A composable predicate over facts.
///
/// # Variants
///
/// - `Always`: Matches any fact (the identity of an empty combination)
/// - `Tag`: String fact equal to the name
/// - `Prefix`: String fact that the configured prefix starts with
/// - `Number`: Numeric fact compared with [`NumberOp`]
/// - `Enum`: Enum fact of the same type and variant name
/// - `Custom`: A user-supplied [`FactMatcher`]
/// - `And`: Every child matches
/// - `Or`: Some child matches
/// - `Not`: The inner matcher does not match
///
/// # Example
///
/// ```
/// use logway::{Fact, Matcher};
///
/// let a = Matcher::tag("A");
/// let b = Matcher::tag("B");
///
/// assert!(a.matches(&["A".into()]));
/// assert!(a.matches(&["A".into(), "B".into()]));
/// assert!(!a.matches(&["B".into()]));
///
/// let both = a.clone().and([b.clone()]);
/// assert!(!both.matches(&["B".into()]));
/// assert!(both.matches(&["A".into(), "B".into()]));
///
/// assert_eq!(a.or([b]).to_string(), "[A | B]");
/// ```
#[derive(Clone)]
pub enum Matcher {
    /// Matches every fact.
    Always,

    /// Exact string equality.
    Tag(String),

    /// The configured prefix starts with the candidate string.
    ///
    /// Note the direction: `Prefix("order-refund")` matches `"order"`, not
    /// `"order-refund-42"`.
    Prefix(String),

    /// Numeric comparison.
    Number {
        /// The configured number.
        value: f64,
        /// How the candidate is compared with `value`.
        op: NumberOp,
    },

    /// Enum variant equality within one enum type.
    Enum {
        /// The enum type name.
        type_name: Cow<'static, str>,
        /// The variant name.
        variant: Cow<'static, str>,
    },

    /// User-supplied leaf.
    Custom(Arc<dyn FactMatcher>),

    /// All children must match (short-circuits on the first `false`).
    And(Vec<Matcher>),

    /// Any child must match (short-circuits on the first `true`).
    Or(Vec<Matcher>),

    /// Inverts the inner matcher.
    Not(Box<Matcher>),
}

impl Matcher {
    // ═══════════════════════════════════════════════════════════════════════
    // Leaves
    // ═══════════════════════════════════════════════════════════════════════

    /// Tag matcher: string fact equal to `name`.
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    /// Prefix matcher: string fact that `prefix` starts with.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(prefix.into())
    }

    /// Number matcher with equality semantics.
    pub fn number(value: impl Into<f64>) -> Self {
        Self::Number {
            value: value.into(),
            op: NumberOp::Eq,
        }
    }

    /// Number matcher with an explicit comparison.
    pub fn number_with(value: impl Into<f64>, op: NumberOp) -> Self {
        Self::Number {
            value: value.into(),
            op,
        }
    }

    /// Enum matcher for one variant of `type_name`.
    pub fn variant(
        type_name: impl Into<Cow<'static, str>>,
        variant: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Enum {
            type_name: type_name.into(),
            variant: variant.into(),
        }
    }

    /// Wrap a user-supplied leaf.
    pub fn custom(matcher: impl FactMatcher + 'static) -> Self {
        Self::Custom(Arc::new(matcher))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Combinators
    // ═══════════════════════════════════════════════════════════════════════

    /// Combine with further matchers under AND.
    ///
    /// An existing `And` is widened instead of nested; `Always` drops out.
    #[must_use]
    pub fn and(self, others: impl IntoIterator<Item = Matcher>) -> Self {
        match self {
            Self::And(mut children) => {
                children.extend(others);
                Self::And(children)
            }
            Self::Always => Self::all(others.into_iter().collect()),
            other => {
                let mut children = vec![other];
                children.extend(others);
                Self::And(children)
            }
        }
    }

    /// Combine with further matchers under OR.
    ///
    /// An existing `Or` is widened instead of nested; `Always` drops out.
    #[must_use]
    pub fn or(self, others: impl IntoIterator<Item = Matcher>) -> Self {
        match self {
            Self::Or(mut children) => {
                children.extend(others);
                Self::Or(children)
            }
            Self::Always => Self::any(others.into_iter().collect()),
            other => {
                let mut children = vec![other];
                children.extend(others);
                Self::Or(children)
            }
        }
    }

    /// Negate. Negating a `Not` returns its inner matcher.
    #[must_use]
    #[allow(clippy::should_implement_trait)] // also implemented as `std::ops::Not`
    pub fn not(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    /// Compose with AND semantics, optimizing for common cases.
    ///
    /// - Empty → `Always`
    /// - Single → unwrapped
    /// - Multiple → `And(matchers)`
    #[must_use]
    pub fn all(mut matchers: Vec<Self>) -> Self {
        match matchers.len() {
            0 => Self::Always,
            1 => matchers.swap_remove(0),
            _ => Self::And(matchers),
        }
    }

    /// Compose with OR semantics. Symmetric with [`all`](Self::all).
    #[must_use]
    pub fn any(mut matchers: Vec<Self>) -> Self {
        match matchers.len() {
            0 => Self::Always,
            1 => matchers.swap_remove(0),
            _ => Self::Or(matchers),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Evaluation
    // ═══════════════════════════════════════════════════════════════════════

    /// The fact kind a leaf accepts, or `None` for `Always` and combinators.
    #[must_use]
    pub fn accepts(&self) -> Option<FactKind> {
        match self {
            Self::Tag(_) | Self::Prefix(_) => Some(FactKind::Str),
            Self::Number { .. } => Some(FactKind::Number),
            Self::Enum { .. } => Some(FactKind::Enum),
            Self::Custom(m) => Some(m.kind()),
            Self::Always | Self::And(_) | Self::Or(_) | Self::Not(_) => None,
        }
    }

    /// Type-guarded match of a single fact.
    ///
    /// A fact whose kind the leaf does not accept is a non-match.
    pub fn matches_one(&self, fact: &Fact) -> bool {
        match self {
            Self::Always => true,
            Self::Tag(name) => fact.as_str().is_some_and(|s| s == name),
            Self::Prefix(prefix) => fact.as_str().is_some_and(|s| prefix.starts_with(s)),
            Self::Number { value, op } => fact.as_number().is_some_and(|n| op.apply(n, *value)),
            Self::Enum { type_name, variant } => fact
                .as_variant()
                .is_some_and(|(t, v)| t == type_name && v == variant),
            Self::Custom(m) => fact.kind() == m.kind() && m.matches(fact),
            Self::And(children) => children.iter().all(|c| c.matches_one(fact)),
            Self::Or(children) => children.iter().any(|c| c.matches_one(fact)),
            Self::Not(inner) => !inner.matches_one(fact),
        }
    }

    /// Any-of match over a list of facts.
    ///
    /// # Returns
    ///
    /// - `false` if `facts` is empty
    /// - for a leaf, `true` if any fact passes [`matches_one`](Self::matches_one)
    /// - for `And`/`Or`/`Not`, the combination of each child's any-of match
    pub fn matches(&self, facts: &[Fact]) -> bool {
        if facts.is_empty() {
            return false;
        }
        match self {
            Self::And(children) => children.iter().all(|c| c.matches(facts)),
            Self::Or(children) => children.iter().any(|c| c.matches(facts)),
            Self::Not(inner) => !inner.matches(facts),
            leaf => facts.iter().any(|f| leaf.matches_one(f)),
        }
    }

    /// Evaluate with full trace for debugging.
    ///
    /// Unlike [`matches()`](Self::matches), this does NOT short-circuit
    /// And/Or. The `matched` result is still the same.
    #[must_use]
    pub fn matches_with_trace(&self, facts: &[Fact]) -> MatchTrace {
        if facts.is_empty() {
            return MatchTrace::Leaf {
                matched: false,
                matcher: self.to_string(),
                hit: None,
            };
        }
        match self {
            Self::And(children) => {
                let children: Vec<MatchTrace> =
                    children.iter().map(|c| c.matches_with_trace(facts)).collect();
                let matched = children.iter().all(MatchTrace::matched);
                MatchTrace::And { matched, children }
            }
            Self::Or(children) => {
                let children: Vec<MatchTrace> =
                    children.iter().map(|c| c.matches_with_trace(facts)).collect();
                let matched = children.iter().any(MatchTrace::matched);
                MatchTrace::Or { matched, children }
            }
            Self::Not(inner) => {
                let inner = inner.matches_with_trace(facts);
                MatchTrace::Not {
                    matched: !inner.matched(),
                    inner: Box::new(inner),
                }
            }
            leaf => {
                let hit = facts.iter().find(|f| leaf.matches_one(f));
                MatchTrace::Leaf {
                    matched: hit.is_some(),
                    matcher: leaf.to_string(),
                    hit: hit.map(ToString::to_string),
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Shape
    // ═══════════════════════════════════════════════════════════════════════

    /// Human-readable boolean expression: `(a & b)`, `[a | b]`, `!a`.
    ///
    /// Audit logging only; never used for matching.
    #[must_use]
    pub fn describe(&self) -> String {
        self.to_string()
    }

    /// Depth of this matcher tree; a leaf has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::And(children) | Self::Or(children) => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Not(inner) => 1 + inner.depth(),
            _ => 1,
        }
    }

    /// Validate against [`MAX_DEPTH`] and [`MAX_CHILDREN`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DepthExceeded`] or [`ConfigError::TooManyChildren`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let depth = self.depth();
        if depth > MAX_DEPTH {
            return Err(ConfigError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        self.validate_width()
    }

    fn validate_width(&self) -> Result<(), ConfigError> {
        match self {
            Self::And(children) | Self::Or(children) => {
                if children.len() > MAX_CHILDREN {
                    return Err(ConfigError::TooManyChildren {
                        count: children.len(),
                        max: MAX_CHILDREN,
                    });
                }
                children.iter().try_for_each(Self::validate_width)
            }
            Self::Not(inner) => inner.validate_width(),
            _ => Ok(()),
        }
    }
}

fn join(f: &mut fmt::Formatter<'_>, children: &[Matcher], sep: &str) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{child}")?;
    }
    Ok(())
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("default"),
            Self::Tag(name) => f.write_str(name),
            Self::Prefix(prefix) => f.write_str(prefix),
            Self::Number { value, op } => write!(f, "{}{value}", op.symbol()),
            Self::Enum { variant, .. } => f.write_str(variant),
            Self::Custom(m) => f.write_str(&m.describe()),
            Self::And(children) => {
                f.write_str("(")?;
                join(f, children, " & ")?;
                f.write_str(")")
            }
            Self::Or(children) => {
                f.write_str("[")?;
                join(f, children, " | ")?;
                f.write_str("]")
            }
            Self::Not(inner) => write!(f, "!{inner}"),
        }
    }
}

impl Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("Always"),
            Self::Tag(name) => f.debug_tuple("Tag").field(name).finish(),
            Self::Prefix(prefix) => f.debug_tuple("Prefix").field(prefix).finish(),
            Self::Number { value, op } => f
                .debug_struct("Number")
                .field("value", value)
                .field("op", op)
                .finish(),
            Self::Enum { type_name, variant } => f
                .debug_struct("Enum")
                .field("type_name", type_name)
                .field("variant", variant)
                .finish(),
            Self::Custom(m) => f.debug_tuple("Custom").field(m).finish(),
            Self::And(children) => f.debug_tuple("And").field(children).finish(),
            Self::Or(children) => f.debug_tuple("Or").field(children).finish(),
            Self::Not(inner) => f.debug_tuple("Not").field(inner).finish(),
        }
    }
}

// Custom leaves compare by allocation, like any other trait object.
impl PartialEq for Matcher {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Always, Self::Always) => true,
            (Self::Tag(a), Self::Tag(b)) | (Self::Prefix(a), Self::Prefix(b)) => a == b,
            (
                Self::Number { value: a, op: oa },
                Self::Number { value: b, op: ob },
            ) => a == b && oa == ob,
            (
                Self::Enum {
                    type_name: ta,
                    variant: va,
                },
                Self::Enum {
                    type_name: tb,
                    variant: vb,
                },
            ) => ta == tb && va == vb,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            (Self::And(a), Self::And(b)) | (Self::Or(a), Self::Or(b)) => a == b,
            (Self::Not(a), Self::Not(b)) => a == b,
            _ => false,
        }
    }
}

impl std::ops::BitAnd for Matcher {
    type Output = Matcher;

    fn bitand(self, rhs: Matcher) -> Matcher {
        self.and([rhs])
    }
}

impl std::ops::BitOr for Matcher {
    type Output = Matcher;

    fn bitor(self, rhs: Matcher) -> Matcher {
        self.or([rhs])
    }
}

impl std::ops::Not for Matcher {
    type Output = Matcher;

    fn not(self) -> Matcher {
        Matcher::not(self)
    }
}
