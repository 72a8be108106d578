//! logway CLI: driving adapter for the logway policy engine.
//!
//! Subcommands:
//! - `resolve <config> <fact>...`: print the verbosity the facts resolve to
//! - `explain <config> <fact>...`: print the rule-by-rule trace
//! - `check <config>`: validate config loads without errors
//! - `emit <config> [options]`: resolve and print one message through `tracing`
//! - `watch <config> [--name N] [--every SECS]`: hot-reload the config's rules until Ctrl-C

use std::path::Path;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use logway::refresh::{FileSource, Parser, RefreshTask};
use logway::{
    Arg, ConfigError, Fact, LogContext, LogwayConfig, Policy, PolicyBinder, PolicyRule, Printer,
    Verbosity,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_EVERY_SECS: u64 = 30;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "resolve" => cmd_resolve(&args[2..]),
        "explain" => cmd_explain(&args[2..]),
        "check" => cmd_check(&args[2..]),
        "emit" => cmd_emit(&args[2..]),
        "watch" => cmd_watch(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("error: unknown command \"{other}\"");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_resolve(args: &[String]) -> Result<(), String> {
    let (path, facts) = args
        .split_first()
        .ok_or("resolve requires a config file path")?;

    let policy = build_policy(&load_config(path)?)?;
    println!("{}", policy.resolve(&parse_facts(facts)));
    Ok(())
}

fn cmd_explain(args: &[String]) -> Result<(), String> {
    let (path, facts) = args
        .split_first()
        .ok_or("explain requires a config file path")?;

    let policy = build_policy(&load_config(path)?)?;
    let trace = policy.resolve_with_trace(&parse_facts(facts));

    for step in &trace.steps {
        let mark = if step.matched() { "+" } else { "-" };
        println!("{mark} #{} {}", step.index, step.rule);
        println!("{}", step.trace);
    }
    if trace.used_default {
        println!("(no match, default)");
    }
    println!("=> {}", trace.result);
    Ok(())
}

fn cmd_check(args: &[String]) -> Result<(), String> {
    let path = args.first().ok_or("check requires a config file path")?;

    let policy = build_policy(&load_config(path)?)?;
    println!(
        "Config valid: {} ({} rules)",
        policy.name(),
        policy.snapshot().len()
    );
    Ok(())
}

fn cmd_emit(args: &[String]) -> Result<(), String> {
    let (path, rest) = args
        .split_first()
        .ok_or("emit requires a config file path")?;
    let opts = parse_emit(rest)?;

    init_tracing();
    let config = load_config(path)?;
    let policy = build_policy(&config)?;
    let verbosity = opts
        .verbosity
        .unwrap_or_else(|| policy.resolve(&parse_facts(&opts.facts)));

    let mut ctx = LogContext::new();
    if let Some(trace_id) = &opts.trace_id {
        ctx.record(logway::Field::TraceId, trace_id);
    }

    let printer = Printer::new(Arc::new(config.printer_config()));
    printer
        .print_by_verbosity(
            &ctx,
            verbosity,
            &opts.easy,
            &opts.info,
            &opts.debug,
            opts.args.iter().map(Arg::value).collect(),
        )
        .map_err(|e| e.to_string())
}

fn cmd_watch(args: &[String]) -> Result<(), String> {
    let opts = parse_watch(args)?;
    let config = load_config(&opts.path)?;

    init_tracing();
    let every = opts
        .every
        .map(Duration::from_secs)
        .or_else(|| config.refresh_interval())
        .unwrap_or(Duration::from_secs(DEFAULT_EVERY_SECS));
    let name = opts.name.as_deref().unwrap_or(&config.name);
    let policy = Arc::new(Policy::new(name).with_default(config.default));
    let binder = PolicyBinder::new(policy, Arc::new(config.printer_config()))
        .with_source(opts.path.as_str());

    let source = FileSource::with_parser(&opts.path, rules_parser_for(&opts.path));
    let task = RefreshTask::new(Arc::new(binder), source, every);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;

    runtime.block_on(task.run(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
        }
    }));
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Logging
// ═══════════════════════════════════════════════════════════════════════════════

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("logway=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn is_json(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn load_config(path: &str) -> Result<LogwayConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read \"{path}\": {e}"))?;

    if is_json(path) {
        serde_json::from_str(&content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(&content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

fn build_policy(config: &LogwayConfig) -> Result<Policy, String> {
    config
        .build_policy()
        .map_err(|e| format!("config invalid: {e}"))
}

// The watcher re-reads the whole policy file and keeps only its rules.

fn json_config_rules(text: &str) -> Result<Vec<PolicyRule>, ConfigError> {
    Ok(LogwayConfig::from_json(text)?.rules)
}

fn yaml_config_rules(text: &str) -> Result<Vec<PolicyRule>, ConfigError> {
    serde_yaml::from_str::<LogwayConfig>(text)
        .map(|config| config.rules)
        .map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
}

fn rules_parser_for(path: &str) -> Parser<PolicyRule> {
    if is_json(path) {
        json_config_rules
    } else {
        yaml_config_rules
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

/// `42` is a number, `Tier::Gold` an enum variant, anything else a string.
fn parse_fact(raw: &str) -> Fact {
    if let Ok(n) = raw.parse::<f64>() {
        return Fact::from(n);
    }
    match raw.split_once("::") {
        Some((type_name, variant)) if !type_name.is_empty() && !variant.is_empty() => {
            Fact::variant(type_name.to_owned(), variant.to_owned())
        }
        _ => Fact::from(raw),
    }
}

fn parse_facts(raw: &[String]) -> Vec<Fact> {
    raw.iter().map(|f| parse_fact(f)).collect()
}

fn parse_verbosity(raw: &str) -> Result<Verbosity, String> {
    Verbosity::ALL
        .into_iter()
        .find(|v| v.as_str() == raw)
        .ok_or_else(|| format!("unknown verbosity \"{raw}\""))
}

#[derive(Debug, Default)]
struct EmitOpts {
    facts: Vec<String>,
    verbosity: Option<Verbosity>,
    trace_id: Option<String>,
    easy: String,
    info: String,
    debug: String,
    args: Vec<String>,
}

fn parse_emit(args: &[String]) -> Result<EmitOpts, String> {
    let mut opts = EmitOpts::default();
    let mut iter = args.iter();

    while let Some(flag) = iter.next() {
        let mut value = || {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag.as_str() {
            "--fact" => opts.facts.push(value()?),
            "--verbosity" => opts.verbosity = Some(parse_verbosity(&value()?)?),
            "--trace-id" => opts.trace_id = Some(value()?),
            "--easy" => opts.easy = value()?,
            "--info" => opts.info = value()?,
            "--debug" => opts.debug = value()?,
            "--arg" => opts.args.push(value()?),
            other => return Err(format!("unexpected argument \"{other}\"")),
        }
    }

    Ok(opts)
}

#[derive(Debug)]
struct WatchOpts {
    path: String,
    name: Option<String>,
    every: Option<u64>,
}

fn parse_watch(args: &[String]) -> Result<WatchOpts, String> {
    let (path, rest) = args
        .split_first()
        .ok_or("watch requires a config file path")?;
    let mut opts = WatchOpts {
        path: path.clone(),
        name: None,
        every: None,
    };
    let mut iter = rest.iter();

    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .ok_or_else(|| format!("{flag} requires a value"))?;
        match flag.as_str() {
            "--name" => opts.name = Some(value.clone()),
            "--every" => {
                let secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| format!("invalid --every \"{value}\", expected seconds > 0"))?;
                opts.every = Some(secs);
            }
            other => return Err(format!("unexpected argument \"{other}\"")),
        }
    }

    Ok(opts)
}

fn print_usage() {
    eprintln!(
        "Usage: logway <command> [options]

Commands:
  resolve <config> <fact>...            Print the verbosity for the facts
  explain <config> <fact>...            Print the rule-by-rule trace
  check <config>                        Validate config
  emit <config> [--fact F]... [--verbosity V] [--trace-id T]
       [--easy T] [--info T] [--debug T] [--arg A]...
                                        Print one message through tracing
  watch <config> [--name N] [--every SECS]
                                        Reload the config's rules until Ctrl-C
  help                                  Show this help

Facts: 42 is a number, Type::Variant an enum variant, anything else a string.
Config files ending in .json are JSON, anything else YAML."
    );
}
