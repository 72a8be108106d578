//! Templates and arguments
//!
//! A template is a string with `{}` placeholders. A log call supplies one
//! argument list for up to three templates; [`partition`] cuts that list into
//! the slice each template consumes, and [`render`] fills a template in order.

use crate::EmitError;
use std::fmt;

/// The placeholder token.
pub const PLACEHOLDER: &str = "{}";

/// Number of `{}` placeholders in `template`.
#[must_use]
pub fn placeholder_count(template: &str) -> usize {
    template.matches(PLACEHOLDER).count()
}

/// One emission argument.
///
/// `Deferred` arguments are resolved only when the slice they belong to is
/// actually rendered, so expensive debug detail costs nothing when the debug
/// channel is off.
pub enum Arg<'a> {
    /// An already-rendered value.
    Value(String),
    /// Rendered on demand.
    Deferred(Box<dyn FnOnce() -> String + 'a>),
}

impl<'a> Arg<'a> {
    /// An eager argument.
    pub fn value(value: impl fmt::Display) -> Self {
        Self::Value(value.to_string())
    }

    /// A deferred argument.
    pub fn lazy(f: impl FnOnce() -> String + 'a) -> Self {
        Self::Deferred(Box::new(f))
    }

    /// Render the argument, invoking it if deferred.
    pub fn resolve(self) -> String {
        match self {
            Self::Value(value) => value,
            Self::Deferred(f) => f(),
        }
    }

    /// Returns `true` for a not-yet-resolved argument.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Deferred(_) => f.write_str("Deferred(<fn>)"),
        }
    }
}

impl From<String> for Arg<'_> {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for Arg<'_> {
    fn from(value: &str) -> Self {
        Self::Value(value.to_owned())
    }
}

/// The three argument slices of one log call.
#[derive(Debug, Default)]
pub struct Slices<T> {
    /// Arguments of the short info template.
    pub easy: Vec<T>,
    /// Arguments of the full info template.
    pub info: Vec<T>,
    /// Arguments of the debug template, plus any surplus.
    pub debug: Vec<T>,
}

/// Split `args` into `[0, easy)`, `[easy, easy + info)` and the rest.
///
/// Counts past the end of `args` clamp; surplus arguments land in `debug`.
///
/// ```
/// use logway::partition;
///
/// let s = partition((0..6).collect(), 2, 1);
/// assert_eq!(s.easy, [0, 1]);
/// assert_eq!(s.info, [2]);
/// assert_eq!(s.debug, [3, 4, 5]);
/// ```
pub fn partition<T>(mut args: Vec<T>, easy: usize, info: usize) -> Slices<T> {
    let easy_end = easy.min(args.len());
    let info_end = easy.saturating_add(info).min(args.len());
    let debug = args.split_off(info_end);
    let info = args.split_off(easy_end);
    Slices {
        easy: args,
        info,
        debug,
    }
}

/// Fill each `{}` in `template` with the next value.
///
/// Placeholders without a value are kept literally; values without a
/// placeholder are dropped. Use [`render_args`] to reject a short list.
#[must_use]
pub fn render<S: AsRef<str>>(template: &str, values: &[S]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut values = values.iter();
    let mut rest = template;
    while let Some(at) = rest.find(PLACEHOLDER) {
        out.push_str(&rest[..at]);
        match values.next() {
            Some(value) => out.push_str(value.as_ref()),
            None => out.push_str(PLACEHOLDER),
        }
        rest = &rest[at + PLACEHOLDER.len()..];
    }
    out.push_str(rest);
    out
}

/// Resolve exactly as many arguments as `template` has placeholders and
/// render it.
///
/// Arguments past the placeholder count are neither resolved nor rendered.
///
/// # Errors
///
/// [`EmitError::MissingArguments`] if `args` is shorter than the placeholder
/// count. No argument is resolved in that case.
pub(crate) fn render_args(template: &str, args: Vec<Arg<'_>>) -> Result<String, EmitError> {
    let expected = placeholder_count(template);
    if args.len() < expected {
        return Err(EmitError::MissingArguments {
            template: template.to_owned(),
            expected,
            supplied: args.len(),
        });
    }
    let values: Vec<String> = args.into_iter().take(expected).map(Arg::resolve).collect();
    Ok(render(template, &values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn counts_placeholders() {
        assert_eq!(placeholder_count("x={} y={}"), 2);
        assert_eq!(placeholder_count("none"), 0);
        assert_eq!(placeholder_count("{}{}{}"), 3);
        assert_eq!(placeholder_count("{ }"), 0);
    }

    #[test]
    fn partition_two_one_three() {
        let s = partition(vec!['a', 'b', 'c', 'd', 'e', 'f'], 2, 1);
        assert_eq!(s.easy, ['a', 'b']);
        assert_eq!(s.info, ['c']);
        assert_eq!(s.debug, ['d', 'e', 'f']);
    }

    #[test]
    fn partition_clamps_short_lists() {
        let s = partition(vec![1, 2], 1, 3);
        assert_eq!(s.easy, [1]);
        assert_eq!(s.info, [2]);
        assert!(s.debug.is_empty());

        let s = partition(Vec::<i32>::new(), 2, 2);
        assert!(s.easy.is_empty() && s.info.is_empty() && s.debug.is_empty());
    }

    #[test]
    fn render_fills_in_order() {
        assert_eq!(render("x={} y={}", &["1", "2"]), "x=1 y=2");
        assert_eq!(render("plain", &["1"]), "plain");
        assert_eq!(render("x={} y={}", &["1"]), "x=1 y={}");
        assert_eq!(render::<&str>("{}", &[]), "{}");
    }

    #[test]
    fn render_does_not_rescan_values() {
        assert_eq!(render("{} {}", &["{}", "b"]), "{} b");
    }

    #[test]
    fn render_args_reports_missing() {
        let err = render_args("a={} b={}", vec![Arg::value(1)]).unwrap_err();
        assert_eq!(
            err,
            EmitError::MissingArguments {
                template: "a={} b={}".into(),
                expected: 2,
                supplied: 1,
            }
        );
    }

    #[test]
    fn render_args_leaves_surplus_unresolved() {
        let called = Cell::new(false);
        let out = render_args(
            "a={}",
            vec![
                Arg::value(1),
                Arg::lazy(|| {
                    called.set(true);
                    "2".into()
                }),
            ],
        )
        .unwrap();
        assert_eq!(out, "a=1");
        assert!(!called.get());
    }

    #[test]
    fn lazy_args_stay_deferred_until_resolved() {
        let eager = Arg::value("x");
        let lazy = Arg::lazy(|| "y".to_owned());
        assert!(!eager.is_deferred());
        assert!(lazy.is_deferred());
        assert_eq!(lazy.resolve(), "y");
    }
}
