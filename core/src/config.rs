//! Config types for declarative policy construction.
//!
//! These types mirror the runtime types but are serde-(de)serializable, so a
//! policy can live in a JSON or YAML file and be reloaded while running.
//!
//! # Relationship to runtime types
//!
//! | Config type | Runtime type | Conversion |
//! |-------------|-------------|------------|
//! | [`MatcherConfig`] | [`Matcher`] | [`MatcherConfig::build`] |
//! | [`PolicyRule`] | [`Binding<Verbosity>`] | [`PolicyRecord::to_binding`] |
//! | [`LogwayConfig`] | [`Policy`] + [`PrinterConfig`] | [`LogwayConfig::build_policy`] |

use crate::{
    Binding, ConfigError, Matcher, NumberOp, Policy, PolicyTable, PrinterConfig, Verbosity,
    DEFAULT_DELIMITER, MAX_CHILDREN, MAX_DEPTH, MAX_NAME_LENGTH,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a [`Matcher`].
///
/// Uses `#[serde(tag = "type")]` for discriminated union deserialization:
///
/// ```json
/// { "type": "tag", "name": "REQUEST" }
/// { "type": "prefix", "prefix": "order-refund" }
/// { "type": "number", "value": 12, "op": "ge" }
/// { "type": "enum", "enum": "Level", "variant": "High" }
/// { "type": "and", "matchers": [...] }
/// { "type": "or", "matchers": [...] }
/// { "type": "not", "matcher": { ... } }
/// { "type": "always" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatcherConfig {
    /// Matches every fact.
    Always,

    /// String fact equal to `name`.
    Tag {
        /// The tag name.
        name: String,
    },

    /// String fact that `prefix` starts with.
    Prefix {
        /// The configured prefix.
        prefix: String,
    },

    /// Numeric comparison.
    Number {
        /// The configured number.
        value: f64,
        /// Comparison, `eq` when omitted.
        #[serde(default, skip_serializing_if = "is_eq")]
        op: NumberOp,
    },

    /// Enum variant of one enum type.
    Enum {
        /// The enum type name.
        #[serde(rename = "enum")]
        type_name: String,
        /// The variant name.
        variant: String,
    },

    /// All matchers must match (logical AND).
    And {
        /// Child matchers (all must match).
        matchers: Vec<MatcherConfig>,
    },

    /// Any matcher must match (logical OR).
    Or {
        /// Child matchers (any must match).
        matchers: Vec<MatcherConfig>,
    },

    /// Inverts the inner matcher (logical NOT).
    Not {
        /// The matcher to negate.
        matcher: Box<MatcherConfig>,
    },
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_eq(op: &NumberOp) -> bool {
    *op == NumberOp::Eq
}

fn check_name(what: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Empty { what });
    }
    check_length(what, value)
}

fn check_length(what: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.len() > MAX_NAME_LENGTH {
        return Err(ConfigError::TooLong {
            what,
            len: value.len(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

impl MatcherConfig {
    /// Build and validate the runtime matcher.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::DepthExceeded`] past [`MAX_DEPTH`] levels
    /// - [`ConfigError::TooManyChildren`] past [`MAX_CHILDREN`] children
    /// - [`ConfigError::EmptyCompound`] for `and`/`or` without children
    /// - [`ConfigError::Empty`] / [`ConfigError::TooLong`] for bad names
    pub fn build(&self) -> Result<Matcher, ConfigError> {
        self.build_at(1)
    }

    fn build_at(&self, depth: usize) -> Result<Matcher, ConfigError> {
        if depth > MAX_DEPTH {
            return Err(ConfigError::DepthExceeded {
                depth,
                max: MAX_DEPTH,
            });
        }
        match self {
            Self::Always => Ok(Matcher::Always),
            Self::Tag { name } => {
                check_name("tag name", name)?;
                Ok(Matcher::tag(name.as_str()))
            }
            Self::Prefix { prefix } => {
                check_length("prefix", prefix)?;
                Ok(Matcher::prefix(prefix.as_str()))
            }
            Self::Number { value, op } => Ok(Matcher::number_with(*value, *op)),
            Self::Enum { type_name, variant } => {
                check_name("enum type name", type_name)?;
                check_name("enum variant", variant)?;
                Ok(Matcher::variant(type_name.clone(), variant.clone()))
            }
            Self::And { matchers } => {
                Self::build_children("and", matchers, depth).map(Matcher::all)
            }
            Self::Or { matchers } => Self::build_children("or", matchers, depth).map(Matcher::any),
            Self::Not { matcher } => Ok(matcher.build_at(depth + 1)?.not()),
        }
    }

    fn build_children(
        kind: &'static str,
        matchers: &[MatcherConfig],
        depth: usize,
    ) -> Result<Vec<Matcher>, ConfigError> {
        if matchers.is_empty() {
            return Err(ConfigError::EmptyCompound { kind });
        }
        if matchers.len() > MAX_CHILDREN {
            return Err(ConfigError::TooManyChildren {
                count: matchers.len(),
                max: MAX_CHILDREN,
            });
        }
        matchers.iter().map(|m| m.build_at(depth + 1)).collect()
    }
}

/// A declarative record convertible into a verbosity binding.
///
/// The binder serializes the records it applied into its audit line, hence the
/// [`Serialize`] bound.
pub trait PolicyRecord: Serialize + Send + Sync {
    /// Convert this record into a binding.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the record does not describe a valid rule.
    fn to_binding(&self) -> Result<Binding<Verbosity>, ConfigError>;
}

/// The stock policy record: a matcher and the verbosity it selects.
///
/// ```json
/// { "when": { "type": "tag", "name": "REQUEST" }, "verbosity": "info_only" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyRule {
    /// When this rule applies.
    pub when: MatcherConfig,
    /// The verbosity it selects.
    pub verbosity: Verbosity,
}

impl PolicyRecord for PolicyRule {
    fn to_binding(&self) -> Result<Binding<Verbosity>, ConfigError> {
        Ok(Binding::new(self.when.build()?, self.verbosity))
    }
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_owned()
}

/// A complete policy file.
///
/// ```yaml
/// name: orders
/// default: silent
/// delimiter: "$$"
/// refresh_secs: 30
/// rules:
///   - when: { type: tag, name: REQUEST }
///     verbosity: info_only
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogwayConfig {
    /// The policy name.
    pub name: String,

    /// Verbosity when no rule matches.
    #[serde(default)]
    pub default: Verbosity,

    /// Separator appended after each prefix variable.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// How often a watcher re-reads the file, in seconds. See
    /// [`refresh_interval`](Self::refresh_interval).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_secs: Option<u64>,

    /// Rules in resolution order (first match wins).
    #[serde(default)]
    pub rules: Vec<PolicyRule>,
}

impl LogwayConfig {
    /// Parse a JSON policy file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the JSON does not match the shape.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build the policy, rules in file order.
    ///
    /// # Errors
    ///
    /// Returns the first rule's [`ConfigError`], or an error for an empty name.
    pub fn build_policy(&self) -> Result<Policy, ConfigError> {
        check_name("policy name", &self.name)?;
        let table = PolicyTable::from_records(&self.rules)?;
        let policy = Policy::new(self.name.as_str()).with_default(self.default);
        policy.update_policies(table);
        Ok(policy)
    }

    /// The configured re-read interval. `None` when unset or zero.
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.refresh_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// A printer configuration using this file's delimiter.
    pub fn printer_config(&self) -> PrinterConfig {
        PrinterConfig::default().with_delimiter(self.delimiter.as_str())
    }
}
