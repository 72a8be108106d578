//! `Fact`: Kind-tagged values that policies match against
//!
//! A log call describes itself with a handful of facts: a request tag, a
//! method name, a numeric level, an enum variant. Every fact carries its kind
//! explicitly, so a matcher can reject a fact of a foreign kind without any
//! runtime type inspection.

use std::borrow::Cow;
use std::fmt;

/// The kind tag of a [`Fact`].
///
/// Leaf matchers accept exactly one kind; facts of any other kind are a
/// non-match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactKind {
    /// String data (tags, names, paths).
    Str,
    /// Numeric data, compared as `f64`.
    Number,
    /// An enum variant, identified by enum type name and variant name.
    Enum,
}

impl fmt::Display for FactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Str => "string",
            Self::Number => "number",
            Self::Enum => "enum",
        })
    }
}

/// A single typed fact supplied by a log call.
///
/// # Example
///
/// ```
/// use logway::{Fact, FactKind};
///
/// let tag = Fact::from("REQUEST");
/// assert_eq!(tag.kind(), FactKind::Str);
/// assert_eq!(tag.as_str(), Some("REQUEST"));
///
/// let level = Fact::from(3);
/// assert_eq!(level.as_number(), Some(3.0));
///
/// let method = Fact::variant("Method", "Refund");
/// assert_eq!(method.kind(), FactKind::Enum);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Fact {
    /// String data.
    Str(String),

    /// Numeric data. Integers are widened to `f64`, matching on numeric value.
    Number(f64),

    /// Enum variant. `type_name` plays the role of the declaring enum type.
    Enum {
        /// The enum type the variant belongs to.
        type_name: Cow<'static, str>,
        /// The variant name.
        variant: Cow<'static, str>,
    },
}

impl Fact {
    /// Create a string fact.
    pub fn str(value: impl Into<String>) -> Self {
        Self::Str(value.into())
    }

    /// Create a numeric fact.
    pub fn number(value: impl Into<f64>) -> Self {
        Self::Number(value.into())
    }

    /// Create an enum-variant fact.
    pub fn variant(
        type_name: impl Into<Cow<'static, str>>,
        variant: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Enum {
            type_name: type_name.into(),
            variant: variant.into(),
        }
    }

    /// Returns the kind tag of this fact.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> FactKind {
        match self {
            Self::Str(_) => FactKind::Str,
            Self::Number(_) => FactKind::Number,
            Self::Enum { .. } => FactKind::Enum,
        }
    }

    /// Try to get the value as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get the value as a number.
    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as `(type_name, variant)`.
    #[inline]
    #[must_use]
    pub fn as_variant(&self) -> Option<(&str, &str)> {
        match self {
            Self::Enum { type_name, variant } => Some((type_name.as_ref(), variant.as_ref())),
            _ => None,
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Enum { type_name, variant } => write!(f, "{type_name}::{variant}"),
        }
    }
}

impl From<&str> for Fact {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for Fact {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<f64> for Fact {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<f32> for Fact {
    fn from(n: f32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i32> for Fact {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<u32> for Fact {
    fn from(n: u32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Fact {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<u64> for Fact {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: u64) -> Self {
        Self::Number(n as f64)
    }
}
