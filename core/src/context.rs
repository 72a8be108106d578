//! Per-call structured fields.
//!
//! A [`LogContext`] carries the fields of the current logical operation (trace
//! id, request path, user, ...) and is passed explicitly into every printer
//! call. Handing work to another task means taking a [`ContextBackup`] and
//! recovering it on the other side.

use std::collections::BTreeMap;
use std::fmt;

/// The fixed set of context fields, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Correlates every line of one request.
    TraceId,
    /// Request path.
    Path,
    /// Tenant group.
    GroupId,
    /// Shop within the group.
    ShopId,
    /// Acting user.
    User,
    /// Business key of the order being handled.
    OrderKey,
    /// Free-form extra data.
    Extension,
}

impl Field {
    /// All fields, in output order.
    pub const ALL: [Field; 7] = [
        Self::TraceId,
        Self::Path,
        Self::GroupId,
        Self::ShopId,
        Self::User,
        Self::OrderKey,
        Self::Extension,
    ];

    /// The structured-log key (`"traceID"`, `"shopID"`, ...).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::TraceId => "traceID",
            Self::Path => "path",
            Self::GroupId => "groupID",
            Self::ShopId => "shopID",
            Self::User => "user",
            Self::OrderKey => "orderKey",
            Self::Extension => "extension",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Structured fields of the current logical operation.
///
/// # Example
///
/// ```
/// use logway::{Field, LogContext};
///
/// let mut ctx = LogContext::new();
/// ctx.record(Field::TraceId, "t-1").record(Field::User, 42);
///
/// assert_eq!(ctx.get(Field::User), "42");
/// assert_eq!(ctx.get(Field::Path), "");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    fields: BTreeMap<Field, String>,
}

impl LogContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`record`](Self::record).
    #[must_use]
    pub fn with(mut self, field: Field, value: impl fmt::Display) -> Self {
        self.record(field, value);
        self
    }

    /// Store `value.to_string()` under `field`. Chainable.
    pub fn record(&mut self, field: Field, value: impl fmt::Display) -> &mut Self {
        self.fields.insert(field, value.to_string());
        self
    }

    /// Like [`record`](Self::record), storing `""` for `None`.
    pub fn record_opt<T: fmt::Display>(&mut self, field: Field, value: Option<T>) -> &mut Self {
        let value = value.map(|v| v.to_string()).unwrap_or_default();
        self.fields.insert(field, value);
        self
    }

    /// The value of `field`, or `""` when unset.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        self.fields.get(&field).map_or("", String::as_str)
    }

    /// Returns `true` if `field` has been recorded (even as `""`).
    #[must_use]
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(&field)
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        self.fields.clear();
    }

    /// Snapshot the current fields.
    #[must_use]
    pub fn backup(&self) -> ContextBackup {
        ContextBackup {
            fields: self.fields.clone(),
        }
    }

    /// Recorded fields in output order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Returns `true` if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An immutable snapshot taken by [`LogContext::backup`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBackup {
    fields: BTreeMap<Field, String>,
}

impl ContextBackup {
    /// Merge the snapshot into `ctx`. Values already present in `ctx` win.
    pub fn recover(&self, ctx: &mut LogContext) {
        for (field, value) in &self.fields {
            ctx.fields.entry(*field).or_insert_with(|| value.clone());
        }
    }

    /// The snapshot value of `field`, or `""` when unset.
    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        self.fields.get(&field).map_or("", String::as_str)
    }
}
