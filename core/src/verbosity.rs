//! The verbosity scale a policy resolves to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How verbosely a log call is emitted.
///
/// The printer reads the verbosity to decide which channels render and which
/// arguments are evaluated.
/// See [`Printer::print_by_verbosity`](crate::Printer::print_by_verbosity).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    /// Emit nothing.
    Silent,
    /// Info channel only.
    InfoOnly,
    /// Debug channel only, and only when debug is enabled.
    DebugOnly,
    /// One info line with the short template, extended with debug detail when
    /// debug is enabled.
    #[default]
    EasyInfoAndDebug,
    /// Info line plus a separate debug line when debug is enabled.
    InfoAndDebug,
}

impl Verbosity {
    /// All verbosities, quietest first.
    pub const ALL: [Verbosity; 5] = [
        Self::Silent,
        Self::InfoOnly,
        Self::DebugOnly,
        Self::EasyInfoAndDebug,
        Self::InfoAndDebug,
    ];

    /// The config name (`"info_only"`, ...).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::InfoOnly => "info_only",
            Self::DebugOnly => "debug_only",
            Self::EasyInfoAndDebug => "easy_info_and_debug",
            Self::InfoAndDebug => "info_and_debug",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
