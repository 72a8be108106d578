//! Prefix variables: named values printed ahead of a message at chosen levels.

use std::borrow::Cow;
use std::fmt;
use tracing::Level;

const ALL_LEVELS: &[Level] = &[Level::INFO, Level::DEBUG, Level::WARN, Level::ERROR];
const SUMMARY_LEVELS: &[Level] = &[Level::INFO, Level::ERROR];

/// A prefix variable rendered in front of printed messages.
///
/// Each var has a priority `order` (lower renders first) and the set of
/// severities at which it appears. The printer writes `value + delimiter` for
/// each applicable var, then the message.
///
/// # Example
///
/// ```
/// use logway::{Level, Var};
///
/// assert!(Var::COST.applies_at(Level::ERROR));
/// assert!(!Var::COST.applies_at(Level::DEBUG));
///
/// let tenant = Var::new("tenant", 0, vec![Level::INFO]);
/// assert!(tenant.order() < Var::ACTION.order());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Var {
    name: Cow<'static, str>,
    order: u32,
    levels: Cow<'static, [Level]>,
}

impl Var {
    /// What the call is doing.
    pub const ACTION: Var = Var::fixed("action", 1, ALL_LEVELS);
    /// What the call is about.
    pub const TOPIC: Var = Var::fixed("topic", 2, ALL_LEVELS);
    /// Elapsed time or other cost; only on info and error lines.
    pub const COST: Var = Var::fixed("cost", 3, SUMMARY_LEVELS);

    const fn fixed(name: &'static str, order: u32, levels: &'static [Level]) -> Self {
        Self {
            name: Cow::Borrowed(name),
            order,
            levels: Cow::Borrowed(levels),
        }
    }

    /// Declare a custom var.
    pub fn new(name: impl Into<Cow<'static, str>>, order: u32, levels: Vec<Level>) -> Self {
        Self {
            name: name.into(),
            order,
            levels: Cow::Owned(levels),
        }
    }

    /// The built-in group: `ACTION`, `TOPIC`, `COST`.
    #[must_use]
    pub fn defaults() -> Vec<Var> {
        vec![Self::ACTION, Self::TOPIC, Self::COST]
    }

    /// The var's name, e.g. `"ACTION"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render priority; lower values print first.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Returns `true` if this var renders at `level`.
    pub fn applies_at(&self, level: Level) -> bool {
        self.levels.contains(&level)
    }
}

impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
