//! Command line front end for the binding evaluator.
//!
//! Usage:
//!   toolpad-eval eval "a + 1" "a * 2" --scope scope.json
//!   toolpad-eval bindings page.json
//!   toolpad-eval parse "user?.name ?? 'anonymous'"

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::Level;

use toolpad_eval::parser::parse_to_token_tree;
use toolpad_eval::runner::api::{eval_bindings_with_report, evaluate_expressions};
use toolpad_eval::runner::binding::{BindingGraph, ParsedBinding};
use toolpad_eval::runner::ds::error::{EvalError, JErrorType};
use toolpad_eval::runner::ds::object::JsObject;
use toolpad_eval::runner::ds::value::JsValue;
use toolpad_eval::runner::eval::types::EvalOutcome;
use toolpad_eval::runner::plugin::config::SandboxConfig;
use toolpad_eval::runner::sandbox::Sandbox;

#[derive(ClapParser)]
#[command(name = "toolpad-eval")]
#[command(about = "Evaluate page binding expressions in a sandbox")]
struct Cli {
    /// Sandbox configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log verbosity, repeat for more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate independent expressions against a scope
    Eval {
        /// Expressions to evaluate
        #[arg(required = true)]
        expressions: Vec<String>,
        /// JSON file holding the scope object
        #[arg(long)]
        scope: Option<PathBuf>,
    },
    /// Run a binding pass over a page file
    Bindings {
        /// JSON file with `scope` and `bindings`
        file: PathBuf,
    },
    /// Print the parse tree of an expression
    Parse {
        /// The expression to parse
        expression: String,
    },
}

/// Page file layout: `{ "scope": {...}, "bindings": { id: {...} } }`.
#[derive(Deserialize)]
struct PageFile {
    #[serde(default)]
    scope: Map<String, Value>,
    #[serde(default)]
    bindings: BTreeMap<String, BindingRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BindingRecord {
    scope_path: Option<String>,
    expression: Option<String>,
    /// `None` when the key is absent; an explicit `null` is a value.
    #[serde(default, deserialize_with = "present")]
    value: Option<Value>,
    error: Option<String>,
    #[serde(default)]
    loading: bool,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl BindingRecord {
    fn into_parsed(self) -> ParsedBinding {
        let result = if self.loading {
            Some(EvalOutcome::Loading)
        } else if let Some(message) = self.error {
            Some(EvalOutcome::Error(EvalError::new(JErrorType::Error(message))))
        } else {
            self.value.map(|v| EvalOutcome::Value(JsValue::from(v)))
        };
        ParsedBinding {
            scope_path: self.scope_path,
            expression: self.expression,
            result,
        }
    }
}

#[derive(Serialize)]
struct ErrorRecord {
    name: String,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stack: Vec<String>,
}

#[derive(Serialize)]
struct OutcomeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorRecord>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    loading: bool,
}

impl From<&EvalError> for ErrorRecord {
    fn from(e: &EvalError) -> Self {
        ErrorRecord {
            name: e.name().to_string(),
            message: e.message(),
            stack: e.stack.clone(),
        }
    }
}

impl From<&EvalOutcome> for OutcomeRecord {
    fn from(outcome: &EvalOutcome) -> Self {
        match outcome {
            EvalOutcome::Value(v) => OutcomeRecord {
                value: v.to_json(),
                error: None,
                loading: false,
            },
            EvalOutcome::Error(e) => OutcomeRecord {
                value: None,
                error: Some(ErrorRecord::from(e)),
                loading: false,
            },
            EvalOutcome::Loading => OutcomeRecord {
                value: None,
                error: None,
                loading: true,
            },
        }
    }
}

#[derive(Serialize)]
struct PassRecord {
    results: BTreeMap<String, OutcomeRecord>,
    dependencies: BTreeMap<String, BTreeSet<String>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => SandboxConfig::load(path)
            .with_context(|| format!("loading sandbox config {}", path.display()))?,
        None => SandboxConfig::default(),
    };
    let sandbox = Sandbox::with_config(config);

    match cli.command {
        Commands::Eval { expressions, scope } => {
            let scope = match scope {
                Some(path) => read_object(&path)?,
                None => JsObject::new(),
            };
            let sources: Vec<&str> = expressions.iter().map(String::as_str).collect();
            for record in eval_records(&sandbox, &sources, &scope) {
                println!("{}", serde_json::to_string(&record)?);
            }
        }
        Commands::Bindings { file } => {
            let text = fs::read_to_string(&file)
                .with_context(|| format!("reading page file {}", file.display()))?;
            let page: PageFile = serde_json::from_str(&text)
                .with_context(|| format!("parsing page file {}", file.display()))?;

            let record = run_bindings(&sandbox, page);
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Parse { expression } => {
            let tree = parse_to_token_tree(&expression)
                .map_err(|e| anyhow::anyhow!("{}", e))
                .context("parsing expression")?;
            println!("{}", tree);
        }
    }
    Ok(())
}

fn eval_records(sandbox: &Sandbox, sources: &[&str], scope: &JsObject) -> Vec<OutcomeRecord> {
    evaluate_expressions(sandbox, sources, scope)
        .into_iter()
        .map(|result| {
            let outcome = match result {
                Ok(v) => EvalOutcome::Value(v),
                Err(e) => EvalOutcome::Error(e),
            };
            OutcomeRecord::from(&outcome)
        })
        .collect()
}

fn run_bindings(sandbox: &Sandbox, page: PageFile) -> PassRecord {
    let scope = object_from_map(page.scope);
    let bindings: BTreeMap<String, ParsedBinding> = page
        .bindings
        .into_iter()
        .map(|(id, record)| (id, record.into_parsed()))
        .collect();
    let graph = BindingGraph::from_parsed(&bindings);
    let report = eval_bindings_with_report(sandbox, &scope, &graph);
    PassRecord {
        results: report
            .results
            .iter()
            .map(|(id, outcome)| (id.clone(), OutcomeRecord::from(outcome)))
            .collect(),
        dependencies: report.dependencies,
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn read_object(path: &Path) -> Result<JsObject> {
    let text = fs::read_to_string(path).with_context(|| format!("reading scope {}", path.display()))?;
    let map: Map<String, Value> =
        serde_json::from_str(&text).with_context(|| format!("parsing scope {}", path.display()))?;
    Ok(object_from_map(map))
}

fn object_from_map(map: Map<String, Value>) -> JsObject {
    map.into_iter().map(|(k, v)| (k, JsValue::from(v))).collect()
}
