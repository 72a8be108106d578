//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs them against the logway engine. Two shapes:
//!
//! - [`PolicyFixture`]: rules in the [`PolicyRule`] config format plus cases
//!   of facts and the verbosity they must resolve to.
//! - [`EmitFixture`]: one `print_by_verbosity` call and the exact lines it
//!   must write.

use crate::CaptureSink;
use logway::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;

// ═══════════════════════════════════════════════════════════════════════════════
// Policy fixtures
// ═══════════════════════════════════════════════════════════════════════════════

/// A policy test fixture.
///
/// `rules` stays raw YAML so a fixture can also assert that a rule set is
/// rejected (`expect_error: true`).
#[derive(Debug, Deserialize)]
pub struct PolicyFixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default: Verbosity,
    pub rules: Vec<serde_yaml::Value>,
    #[serde(default)]
    pub cases: Vec<PolicyCase>,
    #[serde(default)]
    pub expect_error: bool,
}

/// A fact as written in YAML: a number, `{ enum, variant }`, or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FactSpec {
    Number(f64),
    Variant {
        #[serde(rename = "enum")]
        type_name: String,
        variant: String,
    },
    Str(String),
}

impl FactSpec {
    pub fn build(&self) -> Fact {
        match self {
            Self::Number(n) => Fact::number(*n),
            Self::Variant { type_name, variant } => {
                Fact::variant(type_name.clone(), variant.clone())
            }
            Self::Str(s) => Fact::str(s.as_str()),
        }
    }
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct PolicyCase {
    pub name: String,
    pub facts: Vec<FactSpec>,
    pub expect: Verbosity,
}

impl PolicyCase {
    pub fn build_facts(&self) -> Vec<Fact> {
        self.facts.iter().map(FactSpec::build).collect()
    }
}

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    pub passed: bool,
    pub expected: Verbosity,
    pub actual: Verbosity,
}

impl PolicyFixture {
    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        serde_yaml::Deserializer::from_str(yaml)
            .map(Self::deserialize)
            .collect()
    }

    /// Decode and build the rules into a policy.
    pub fn build(&self) -> Result<Policy, String> {
        let rules = self
            .rules
            .iter()
            .map(|raw| {
                serde_yaml::from_value::<PolicyRule>(raw.clone()).map_err(|e| e.to_string())
            })
            .collect::<Result<Vec<_>, _>>()?;
        let table = PolicyTable::from_records(&rules).map_err(|e| e.to_string())?;
        let policy = Policy::new(self.name.as_str()).with_default(self.default);
        policy.update_policies(table);
        Ok(policy)
    }

    /// Run all test cases and return results
    pub fn run(&self) -> Result<Vec<CaseResult>, String> {
        let policy = self.build()?;
        Ok(self
            .cases
            .iter()
            .map(|case| {
                let actual = policy.resolve(&case.build_facts());
                CaseResult {
                    case_name: case.name.clone(),
                    passed: actual == case.expect,
                    expected: case.expect,
                    actual,
                }
            })
            .collect())
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        match (self.run(), self.expect_error) {
            (Err(_), true) => {}
            (Ok(_), true) => panic!("Fixture '{}' expected a config error", self.name),
            (Err(e), false) => panic!("Fixture '{}' failed to build: {e}", self.name),
            (Ok(results), false) => {
                for result in results {
                    assert!(
                        result.passed,
                        "Fixture '{}' case '{}' failed: expected {}, got {}",
                        self.name, result.case_name, result.expected, result.actual
                    );
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Emission fixtures
// ═══════════════════════════════════════════════════════════════════════════════

/// An emission test fixture.
#[derive(Debug, Deserialize)]
pub struct EmitFixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub verbosity: Verbosity,
    #[serde(default)]
    pub debug_enabled: bool,
    #[serde(default)]
    pub delimiter: Option<String>,
    /// Var name → value; unset vars stay empty.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    #[serde(default)]
    pub trace_id: String,
    /// Log file name for the lookup hint; no hint when absent.
    #[serde(default)]
    pub log_file: Option<String>,
    pub templates: Templates,
    #[serde(default)]
    pub args: Vec<String>,
    pub expect: Vec<ExpectedLine>,
}

/// The three templates of one call.
#[derive(Debug, Deserialize)]
pub struct Templates {
    #[serde(default)]
    pub easy: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub debug: String,
}

/// A line the call must write.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExpectedLine {
    pub level: String,
    pub message: String,
}

fn level_name(level: Level) -> String {
    level.as_str().to_ascii_lowercase()
}

impl EmitFixture {
    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        serde_yaml::Deserializer::from_str(yaml)
            .map(Self::deserialize)
            .collect()
    }

    /// Perform the call and return the lines written.
    pub fn run(&self) -> Result<Vec<ExpectedLine>, EmitError> {
        let sink = CaptureSink::with_debug(self.debug_enabled);
        let mut config = PrinterConfig::new(sink.clone());
        if let Some(delimiter) = &self.delimiter {
            config = config.with_delimiter(delimiter.as_str());
        }
        if let Some(file) = &self.log_file {
            config = config.with_locator(logway::FixedLogFile(file.into()));
        }
        let config = Arc::new(config);

        let mut printer = Printer::new(Arc::clone(&config));
        for var in config.vars() {
            if let Some(value) = self.vars.get(var.name()) {
                printer.set_var(var, value);
            }
        }

        let ctx = LogContext::new().with(Field::TraceId, &self.trace_id);
        let args = self.args.iter().map(|a| Arg::value(a)).collect();
        printer.print_by_verbosity(
            &ctx,
            self.verbosity,
            &self.templates.easy,
            &self.templates.info,
            &self.templates.debug,
            args,
        )?;

        Ok(sink
            .messages()
            .into_iter()
            .map(|(level, message)| ExpectedLine {
                level: level_name(level),
                message,
            })
            .collect())
    }

    /// Run and panic on mismatch
    pub fn run_and_assert(&self) {
        let lines = self
            .run()
            .unwrap_or_else(|e| panic!("Fixture '{}' failed to emit: {e}", self.name));
        assert_eq!(
            lines, self.expect,
            "Fixture '{}' wrote unexpected lines",
            self.name
        );
    }
}
