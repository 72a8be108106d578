//! Printer: verbosity-driven, dual-channel emission
//!
//! A [`Printer`] holds the values of the prefix [`Var`]s for one logical
//! operation and writes lines through the sink of a shared [`PrinterConfig`].
//! [`Printer::print_by_verbosity`] is where a policy decision turns into
//! output: it splits one argument list across three templates and renders
//! only what the verbosity and the sink's debug switch call for.

use crate::hint::{grep_hint, HintFn, HintInput, LogFileLocator, NoLogFile};
use crate::template::{partition, placeholder_count, render_args};
use crate::{Arg, EmitError, Field, LogContext, LogSink, TracingSink, Var, Verbosity};
use std::fmt;
use std::sync::Arc;
use tracing::Level;

/// Separator written after each prefix var value.
pub const DEFAULT_DELIMITER: &str = "$$";

/// Emission settings shared by every printer of a service.
///
/// Construct once and share through an `Arc`.
///
/// # Example
///
/// ```
/// use logway::{FixedLogFile, PrinterConfig};
/// use std::sync::Arc;
///
/// let config = Arc::new(
///     PrinterConfig::default()
///         .with_delimiter("|")
///         .with_locator(FixedLogFile("/var/log/orders.log".into())),
/// );
/// assert_eq!(config.delimiter(), "|");
/// ```
#[derive(Clone)]
pub struct PrinterConfig {
    sink: Arc<dyn LogSink>,
    delimiter: String,
    vars: Vec<Var>,
    hint: HintFn,
    locator: Arc<dyn LogFileLocator>,
}

impl PrinterConfig {
    /// Defaults with the given sink.
    pub fn new(sink: impl LogSink + 'static) -> Self {
        Self::with_shared_sink(Arc::new(sink))
    }

    /// Defaults with a sink that is also held elsewhere (e.g. by a test).
    pub fn with_shared_sink(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            delimiter: DEFAULT_DELIMITER.to_owned(),
            vars: Var::defaults(),
            hint: Arc::new(grep_hint),
            locator: Arc::new(NoLogFile),
        }
    }

    /// Replace the separator written after each var value.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Replace the var group.
    #[must_use]
    pub fn with_vars(mut self, vars: Vec<Var>) -> Self {
        self.vars = vars;
        self
    }

    /// Replace the hint function. It only runs when the locator finds a file.
    #[must_use]
    pub fn with_hint(
        mut self,
        hint: impl Fn(&HintInput<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        self.hint = Arc::new(hint);
        self
    }

    /// Replace how the current log file is found for hints.
    #[must_use]
    pub fn with_locator(mut self, locator: impl LogFileLocator + 'static) -> Self {
        self.locator = Arc::new(locator);
        self
    }

    /// Where lines go.
    pub fn sink(&self) -> &dyn LogSink {
        self.sink.as_ref()
    }

    /// The separator written after each var value.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// The declared var group, in declaration order.
    pub fn vars(&self) -> &[Var] {
        &self.vars
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::new(TracingSink)
    }
}

impl fmt::Debug for PrinterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrinterConfig")
            .field("delimiter", &self.delimiter)
            .field("vars", &self.vars)
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}

/// Writes prefixed lines for one logical operation.
///
/// # Example
///
/// ```
/// use logway::prelude::*;
/// use std::sync::Arc;
///
/// let config = Arc::new(PrinterConfig::default());
/// let printer = Printer::new(config).with_var(&Var::ACTION, "refund");
///
/// assert_eq!(printer.prefix("done", Level::INFO), "refund$$$$$$done");
/// assert_eq!(printer.prefix("done", Level::WARN), "refund$$$$done");
/// ```
#[derive(Debug, Clone)]
pub struct Printer {
    config: Arc<PrinterConfig>,
    vars: Vec<(Var, String)>,
}

impl Printer {
    /// A printer with every var of the config's group set to `""`.
    pub fn new(config: Arc<PrinterConfig>) -> Self {
        let mut group = config.vars.clone();
        group.sort_by_key(Var::order);
        let mut vars: Vec<(Var, String)> = Vec::with_capacity(group.len());
        for var in group {
            // A later declaration with the same name replaces the earlier one
            if let Some(slot) = vars.iter_mut().find(|(v, _)| v.name() == var.name()) {
                slot.0 = var;
            } else {
                vars.push((var, String::new()));
            }
        }
        Self { config, vars }
    }

    /// Builder form of [`set_var`](Self::set_var).
    #[must_use]
    pub fn with_var(mut self, var: &Var, value: impl fmt::Display) -> Self {
        self.set_var(var, value);
        self
    }

    /// Set a var's value. A var outside the group joins it at its order.
    pub fn set_var(&mut self, var: &Var, value: impl fmt::Display) -> &mut Self {
        let value = value.to_string();
        if let Some(slot) = self.vars.iter_mut().find(|(v, _)| v.name() == var.name()) {
            slot.1 = value;
        } else {
            let at = self.vars.partition_point(|(v, _)| v.order() <= var.order());
            self.vars.insert(at, (var.clone(), value));
        }
        self
    }

    /// The value of the var called `name`, or `""`.
    pub fn var(&self, name: &str) -> &str {
        self.vars
            .iter()
            .find(|(v, _)| v.name() == name)
            .map_or("", |(_, value)| value.as_str())
    }

    /// Use `sink` for this printer only; other printers of the config keep
    /// theirs.
    #[must_use]
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        Arc::make_mut(&mut self.config).sink = Arc::new(sink);
        self
    }

    /// Use `hint` for this printer only.
    #[must_use]
    pub fn with_hint(
        mut self,
        hint: impl Fn(&HintInput<'_>) -> String + Send + Sync + 'static,
    ) -> Self {
        Arc::make_mut(&mut self.config).hint = Arc::new(hint);
        self
    }

    /// The settings this printer writes with.
    pub fn config(&self) -> &PrinterConfig {
        &self.config
    }

    /// `value + delimiter` for each var rendered at `level`, in order, then
    /// `message`.
    pub fn prefix(&self, message: &str, level: Level) -> String {
        let mut out = String::new();
        for (var, value) in &self.vars {
            if var.applies_at(level) {
                out.push_str(value);
                out.push_str(&self.config.delimiter);
            }
        }
        out.push_str(message);
        out
    }

    /// The lookup-hint suffix for `ctx`, or `""` when no log file is known.
    pub fn lookup_hint(&self, ctx: &LogContext) -> String {
        match self.config.locator.current_file() {
            Some(file) => (self.config.hint)(&HintInput {
                trace_id: ctx.get(Field::TraceId),
                file: &file,
                vars: &self.vars,
            }),
            None => String::new(),
        }
    }

    fn emit(
        &self,
        level: Level,
        ctx: &LogContext,
        template: &str,
        args: Vec<Arg<'_>>,
    ) -> Result<(), EmitError> {
        let message = render_args(template, args)?;
        self.config
            .sink
            .log(level, ctx, &self.prefix(&message, level));
        Ok(())
    }

    /// Info line.
    ///
    /// # Errors
    ///
    /// [`EmitError::MissingArguments`] when `args` is shorter than the
    /// template's placeholder count. Nothing is written in that case.
    pub fn info(
        &self,
        ctx: &LogContext,
        template: &str,
        args: Vec<Arg<'_>>,
    ) -> Result<(), EmitError> {
        self.emit(Level::INFO, ctx, template, args)
    }

    /// Debug line. Arguments are not resolved when the sink has debug off.
    ///
    /// # Errors
    ///
    /// See [`info`](Self::info).
    pub fn debug(
        &self,
        ctx: &LogContext,
        template: &str,
        args: Vec<Arg<'_>>,
    ) -> Result<(), EmitError> {
        if !self.config.sink.debug_enabled() {
            return Ok(());
        }
        self.emit(Level::DEBUG, ctx, template, args)
    }

    /// Warn line.
    ///
    /// # Errors
    ///
    /// See [`info`](Self::info).
    pub fn warn(
        &self,
        ctx: &LogContext,
        template: &str,
        args: Vec<Arg<'_>>,
    ) -> Result<(), EmitError> {
        self.emit(Level::WARN, ctx, template, args)
    }

    /// Error line.
    ///
    /// # Errors
    ///
    /// See [`info`](Self::info).
    pub fn error(
        &self,
        ctx: &LogContext,
        template: &str,
        args: Vec<Arg<'_>>,
    ) -> Result<(), EmitError> {
        self.emit(Level::ERROR, ctx, template, args)
    }

    /// Info line followed by the lookup hint.
    ///
    /// # Errors
    ///
    /// See [`info`](Self::info).
    pub fn print_with_hint(
        &self,
        ctx: &LogContext,
        template: &str,
        args: Vec<Arg<'_>>,
    ) -> Result<(), EmitError> {
        let message = render_args(template, args)?;
        let line = self.prefix(&message, Level::INFO) + &self.lookup_hint(ctx);
        self.config.sink.info(ctx, &line);
        Ok(())
    }

    /// Emit according to `verbosity`.
    ///
    /// `args` holds the arguments of `easy`, `info` and `debug` back to back,
    /// in that order; the placeholder counts of `easy` and `info` decide where
    /// each slice starts. Surplus arguments belong to the debug slice.
    ///
    /// | Verbosity | Output |
    /// |-----------|--------|
    /// | `Silent` | nothing |
    /// | `InfoOnly` | `info` on the info channel |
    /// | `DebugOnly` | `debug` on the debug channel, if enabled |
    /// | `EasyInfoAndDebug` | one info line: `easy`, then `" " + debug` if debug is enabled, then the hint |
    /// | `InfoAndDebug` | `info` on the info channel, `debug` on the debug channel if enabled |
    ///
    /// Deferred arguments resolve only when their slice renders.
    ///
    /// # Errors
    ///
    /// [`EmitError::MissingArguments`] when a slice that renders has fewer
    /// arguments than its template's placeholders. `Silent` never fails.
    pub fn print_by_verbosity(
        &self,
        ctx: &LogContext,
        verbosity: Verbosity,
        easy: &str,
        info: &str,
        debug: &str,
        args: Vec<Arg<'_>>,
    ) -> Result<(), EmitError> {
        let slices = partition(args, placeholder_count(easy), placeholder_count(info));
        let debug_on = || self.config.sink.debug_enabled();

        match verbosity {
            Verbosity::Silent => Ok(()),
            Verbosity::InfoOnly => self.emit(Level::INFO, ctx, info, slices.info),
            Verbosity::DebugOnly => {
                if debug_on() {
                    self.emit(Level::DEBUG, ctx, debug, slices.debug)?;
                }
                Ok(())
            }
            Verbosity::EasyInfoAndDebug => {
                let mut message = render_args(easy, slices.easy)?;
                if debug_on() {
                    let detail = render_args(debug, slices.debug)?;
                    if !detail.is_empty() {
                        message.push(' ');
                        message.push_str(&detail);
                    }
                }
                let line = self.prefix(&message, Level::INFO) + &self.lookup_hint(ctx);
                self.config.sink.info(ctx, &line);
                Ok(())
            }
            Verbosity::InfoAndDebug => {
                self.emit(Level::INFO, ctx, info, slices.info)?;
                if debug_on() {
                    self.emit(Level::DEBUG, ctx, debug, slices.debug)?;
                }
                Ok(())
            }
        }
    }
}
