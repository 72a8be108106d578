//! logway - matcher-driven verbosity policies for structured logging
//!
//! A log call describes itself with a few typed [`Fact`]s. A [`Policy`] holds an
//! ordered table of [`Binding`]s (matcher → [`Verbosity`]) and resolves those
//! facts to the verbosity of the first matching rule. A [`Printer`] then routes
//! the call's arguments to the info and debug channels of a [`LogSink`]
//! according to that verbosity, resolving deferred arguments only when their
//! channel actually renders.
//!
//! # Architecture
//!
//! - [`Fact`] — Kind-tagged value (string, number, enum variant)
//! - [`Matcher`] — Boolean algebra over facts (leaves + And, Or, Not)
//! - [`Binding<R>`] — Matcher paired with an eager or deferred outcome
//! - [`PolicyTable<R>`] — Immutable, ordered bindings with first-match-wins
//! - [`Policy`] — Named, atomically swappable table with a default verbosity
//! - [`PolicyBinder`] — Converts declarative records into a new table (hot reload)
//! - [`LogContext`] — Explicit per-call structured fields with backup/recover
//! - [`Printer`] — Verbosity-driven, dual-channel emission
//!
//! # Key Design Insights
//!
//! 1. **Any-of matching**: `matches(&facts)` succeeds when any fact satisfies a
//!    leaf. Combinators hand the whole fact list to every child, so
//!    `tag("A").and([tag("B")])` matches `[A, B]`.
//!
//! 2. **Kind mismatch → false**: A number never matches a tag matcher. Safe
//!    matching compares [`FactKind`]s instead of failing.
//!
//! 3. **Newest rule wins**: [`Policy::add_policy`] prepends, so later rules
//!    shadow earlier ones.
//!
//! 4. **Readers never lock**: tables are immutable and published through
//!    `arc_swap`, so a resolution sees the whole old table or the whole new one.
//!
//! # Example
//!
//! ```
//! use logway::prelude::*;
//!
//! let policy = Policy::new("orders");
//! policy
//!     .add_policy(Matcher::tag("REQUEST"), Verbosity::InfoOnly)
//!     .add_policy(
//!         Matcher::tag("REQUEST").and([Matcher::tag("refund")]),
//!         Verbosity::InfoAndDebug,
//!     );
//!
//! let facts = [Fact::from("REQUEST"), Fact::from("refund")];
//! assert_eq!(policy.resolve(&facts), Verbosity::InfoAndDebug);
//! assert_eq!(policy.resolve(&[Fact::from("REQUEST")]), Verbosity::InfoOnly);
//! assert_eq!(policy.resolve(&[Fact::from("other")]), Verbosity::EasyInfoAndDebug);
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod binder;
mod binding;
mod config;
mod context;
mod fact;
mod hint;
mod matcher;
mod policy;
mod printer;
mod sink;
mod template;
mod trace;
mod var;
mod verbosity;

#[cfg(feature = "refresh")]
pub mod refresh;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Matching
pub use fact::{Fact, FactKind};
pub use matcher::{FactMatcher, Matcher, NumberOp};

// Policies
pub use binder::{PolicyBinder, Reload};
pub use binding::{Binding, Outcome};
pub use config::{LogwayConfig, MatcherConfig, PolicyRecord, PolicyRule};
pub use policy::{Policy, PolicyTable};
pub use verbosity::Verbosity;

// Emission
pub use context::{ContextBackup, Field, LogContext};
pub use hint::{grep_hint, FixedLogFile, HintInput, LatestLogFile, LogFileLocator, NoLogFile};
pub use printer::{Printer, PrinterConfig, DEFAULT_DELIMITER};
pub use sink::{LogSink, TracingSink, SERVICE_TARGET};
pub use template::{partition, placeholder_count, render, Arg, Slices, PLACEHOLDER};
pub use var::Var;

// Trace types
pub use trace::{MatchTrace, ResolveTrace, RuleStep};

/// Severity levels used by sinks and [`Var`] level sets.
pub use tracing::Level;

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use logway::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Arg, Binding, ConfigError, EmitError, Fact, FactKind, FactMatcher, Field, Level,
        LogContext, LogSink, Matcher, NumberOp, Policy, PolicyBinder, PolicyRule, PolicyTable,
        Printer, PrinterConfig, Reload, TracingSink, Var, Verbosity,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed depth of a matcher tree built from config.
///
/// Evaluation is recursive; validate at load time via [`Matcher::validate`].
pub const MAX_DEPTH: usize = 32;

/// Maximum number of children in a single `And` or `Or` matcher built from config.
pub const MAX_CHILDREN: usize = 256;

/// Maximum number of rules accepted in one policy reload.
pub const MAX_RULES: usize = 256;

/// Maximum length of a tag, prefix, or enum name in config.
pub const MAX_NAME_LENGTH: usize = 8192;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from matcher and policy construction.
///
/// These surface at config load or reload time, never while resolving.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Matcher nesting exceeds [`MAX_DEPTH`].
    #[error(
        "matcher nesting depth is {depth}, but maximum allowed is {max}; flatten the matcher tree"
    )]
    DepthExceeded {
        /// Actual depth of the matcher tree.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },
    /// Too many children in a compound matcher.
    #[error("compound matcher has {count} children, but maximum allowed is {max}")]
    TooManyChildren {
        /// Actual count of children.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// An `and` or `or` matcher was configured without children.
    #[error("`{kind}` matcher needs at least one child")]
    EmptyCompound {
        /// `"and"` or `"or"`.
        kind: &'static str,
    },
    /// Too many rules in one policy.
    #[error("policy has {count} rules, but maximum allowed is {max}")]
    TooManyRules {
        /// Actual count of rules.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },
    /// A configured name exceeds [`MAX_NAME_LENGTH`].
    #[error("{what} length is {len}, but maximum allowed is {max}")]
    TooLong {
        /// Which value was too long.
        what: &'static str,
        /// Actual length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },
    /// A configured name is empty.
    #[error("{what} must not be empty")]
    Empty {
        /// Which value was empty.
        what: &'static str,
    },
    /// Deserialization failed.
    #[error("invalid config: {message}")]
    Parse {
        /// The underlying parser message.
        message: String,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            message: err.to_string(),
        }
    }
}

/// Errors raised while rendering a message.
///
/// A template with more placeholders than supplied arguments is a caller bug;
/// the printer reports it instead of emitting a partial line.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    /// Fewer arguments than placeholders.
    #[error(
        "template \"{template}\" has {expected} placeholders but only {supplied} arguments were supplied"
    )]
    MissingArguments {
        /// The offending template.
        template: String,
        /// Placeholder count.
        expected: usize,
        /// Arguments available for this template.
        supplied: usize,
    },
}
