//! Lookup hints: a grep command appended to summary lines so an operator
//! can jump from one line to every line of the same request.

use crate::Var;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

/// Finds the log file that currently receives output.
pub trait LogFileLocator: Send + Sync + Debug {
    /// File name to grep, or `None` when unknown.
    fn current_file(&self) -> Option<String>;
}

/// No log file; hints are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLogFile;

impl LogFileLocator for NoLogFile {
    fn current_file(&self) -> Option<String> {
        None
    }
}

/// A fixed file. The hint names its base name.
#[derive(Debug, Clone)]
pub struct FixedLogFile(pub PathBuf);

impl LogFileLocator for FixedLogFile {
    fn current_file(&self) -> Option<String> {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }
}

/// The most recently modified file in a rotation directory whose name starts
/// with `prefix`.
#[derive(Debug, Clone)]
pub struct LatestLogFile {
    /// Directory holding the rotated files.
    pub dir: PathBuf,
    /// File name prefix, e.g. `"service.log"`.
    pub prefix: String,
}

impl LatestLogFile {
    /// Look in `dir` for files whose names start with `prefix`.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }
}

impl LogFileLocator for LatestLogFile {
    fn current_file(&self) -> Option<String> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::debug!(
                    dir = %self.dir.display(),
                    error = %err,
                    "log directory unreadable"
                );
                return None;
            }
        };
        entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().into_owned();
                if !name.starts_with(&self.prefix) {
                    return None;
                }
                let meta = entry.metadata().ok()?;
                if !meta.is_file() {
                    return None;
                }
                Some((meta.modified().ok()?, name))
            })
            .max()
            .map(|(_, name)| name)
    }
}

/// What a hint function gets to work with.
#[derive(Debug, Clone, Copy)]
pub struct HintInput<'a> {
    /// The call's trace id (`""` when unset).
    pub trace_id: &'a str,
    /// The current log file.
    pub file: &'a str,
    /// The printer's vars and their values.
    pub vars: &'a [(Var, String)],
}

impl HintInput<'_> {
    /// Value of the var called `name`, or `""`.
    pub fn var(&self, name: &str) -> &str {
        self.vars
            .iter()
            .find(|(var, _)| var.name() == name)
            .map_or("", |(_, value)| value.as_str())
    }
}

/// Builds the hint suffix.
pub type HintFn = Arc<dyn Fn(&HintInput<'_>) -> String + Send + Sync>;

/// The default hint:
/// `" grep <traceID> <file> | grep <action> | grep <topic> |less"`, with the
/// action and topic stages present only when those vars are set.
///
/// ```
/// use logway::{grep_hint, HintInput, Var};
///
/// let vars = [(Var::ACTION, "pay".to_owned()), (Var::TOPIC, String::new())];
/// let hint = grep_hint(&HintInput { trace_id: "t1", file: "app.log", vars: &vars });
/// assert_eq!(hint, " grep t1 app.log | grep pay |less");
/// ```
pub fn grep_hint(input: &HintInput<'_>) -> String {
    let mut hint = format!(" grep {} {}", input.trace_id, input.file);
    for var in [&Var::ACTION, &Var::TOPIC] {
        let value = input.var(var.name());
        if !value.is_empty() {
            hint.push_str(" | grep ");
            hint.push_str(value);
        }
    }
    hint.push_str(" |less");
    hint
}
