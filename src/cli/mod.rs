//! CLI module for navix.
//!
//! Every command runs one query through the dispatcher. Human mode (the
//! default) prints one finding per line; `--json` prints the full result
//! envelope instead. Error envelopes always go to stderr as JSON so that
//! stdout stays clean for pipelines, and the exit code tells scripts
//! which outcome it was.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::config::NavConfig;
use crate::index::IndexLocator;
use crate::query::{capabilities, capability, Dispatcher, Envelope, QueryKind, QueryRequest};

#[derive(Parser)]
#[command(name = "navix")]
#[command(about = "Navigate a precomputed code-structure index", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Print the full JSON result envelope instead of human-readable lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Query timeout in seconds (overrides config)
    #[arg(long)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // ─── Impact Analysis ─────────────────────────────────────────────
    /// Find everything that transitively depends on a function
    BlastRadius {
        /// Function name to analyze
        target: String,

        /// Max traversal depth (default: unbounded)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Max results
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },

    /// List the direct callers of a function
    Callers {
        /// Function name
        target: String,
    },

    /// List the functions a target directly calls
    Calls {
        /// Function name
        target: String,
    },

    // ─── Architecture ────────────────────────────────────────────────
    /// Detect circular call chains
    Cycles,

    /// List functions with no recorded callers
    DeadCode,

    /// Rank functions by call-site count
    Hotspots {
        /// How many to return
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Measure how coupled a domain is to the rest of the codebase
    CrossDomain {
        /// Domain name, e.g. 'auth'
        domain: String,
    },

    /// Summarize every domain (files, functions, edges)
    Domains,

    // ─── Debugging ───────────────────────────────────────────────────
    /// Enumerate call paths reaching a file:line from entry points
    Trace {
        /// File path or suffix, e.g. src/csv/parser.ts
        file: String,

        /// Line number from the error or stack trace
        line: usize,
    },

    // ─── Meta ────────────────────────────────────────────────────────
    /// Run a free-text query, e.g. "who calls `parseDate`"
    Query {
        /// Natural-language request
        text: String,
    },

    /// List supported query types with their schemas
    Capabilities {
        /// Show only one query type, e.g. 'blast-radius'
        #[arg(long, value_name = "TYPE")]
        query: Option<QueryKind>,
    },
}

/// Execute one CLI invocation. Returns whether the query succeeded so the
/// caller can pick the exit code.
pub fn run(cli: Cli) -> Result<bool> {
    let root = cli.root.canonicalize().unwrap_or(cli.root);
    let config = NavConfig::load(&root);
    let locator = IndexLocator::from_env(&root);

    let mut dispatcher = Dispatcher::new(locator, &config);
    if let Some(secs) = cli.timeout {
        dispatcher = dispatcher.with_timeout(Duration::from_secs(secs));
    }

    let envelope = match cli.command {
        Commands::BlastRadius {
            target,
            depth,
            limit,
        } => dispatcher.dispatch(QueryRequest::BlastRadius {
            target,
            depth,
            limit: Some(limit),
        }),
        Commands::Callers { target } => dispatcher.dispatch(QueryRequest::FindCallers { target }),
        Commands::Calls { target } => dispatcher.dispatch(QueryRequest::FindCalls { target }),
        Commands::Cycles => dispatcher.dispatch(QueryRequest::Cycles),
        Commands::DeadCode => dispatcher.dispatch(QueryRequest::DeadCode),
        Commands::Hotspots { limit } => {
            dispatcher.dispatch(QueryRequest::Hotspots { limit: Some(limit) })
        }
        Commands::CrossDomain { domain } => {
            dispatcher.dispatch(QueryRequest::CrossDomain { domain })
        }
        Commands::Domains => dispatcher.dispatch(QueryRequest::Domains),
        Commands::Trace { file, line } => {
            dispatcher.dispatch(QueryRequest::TraceToError { file, line })
        }
        Commands::Query { text } => dispatcher.dispatch_text(&text),
        Commands::Capabilities { query } => {
            let payload = match query {
                Some(kind) => {
                    let cap = capability(kind)
                        .ok_or_else(|| anyhow::anyhow!("no capability entry for {kind}"))?;
                    serde_json::to_value(cap)?
                }
                None => serde_json::to_value(capabilities())?,
            };
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(true);
        }
    };

    if !envelope.is_success() {
        // Error envelopes go to the error channel, as JSON.
        eprintln!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if cli.json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else {
        println!("{}", render_human(&envelope));
    }
    Ok(envelope.is_success())
}

// ─── Human Rendering ─────────────────────────────────────────────────

fn joined(value: &Value, separator: &str) -> String {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(separator)
        })
        .unwrap_or_default()
}

fn context_str<'a>(envelope: &'a Envelope, key: &str) -> &'a str {
    envelope
        .context
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or("?")
}

/// One finding per line. Headers summarize, indented lines enumerate.
fn render_human(envelope: &Envelope) -> String {
    let empty = Vec::new();
    let rows = envelope
        .results
        .as_ref()
        .and_then(Value::as_array)
        .unwrap_or(&empty);
    let mut lines = Vec::new();

    match envelope.query {
        Some(QueryKind::BlastRadius) => {
            lines.push(format!(
                "{} function(s) affected by a change to {}",
                rows.len(),
                context_str(envelope, "target"),
            ));
            for row in rows {
                lines.push(format!(
                    "  [depth {}] {} ({})",
                    row["depth"],
                    row["function"].as_str().unwrap_or("?"),
                    row["type"].as_str().unwrap_or("?"),
                ));
            }
        }
        Some(QueryKind::FindCallers) | Some(QueryKind::FindCalls) => {
            let relation = if envelope.query == Some(QueryKind::FindCallers) {
                "direct caller(s) of"
            } else {
                "function(s) called by"
            };
            lines.push(format!(
                "{} {relation} {}",
                rows.len(),
                context_str(envelope, "target"),
            ));
            for row in rows {
                lines.push(format!("  {}", row.as_str().unwrap_or("?")));
            }
        }
        Some(QueryKind::Cycles) => {
            lines.push(format!("{} circular call chain(s)", rows.len()));
            for row in rows {
                lines.push(format!("  {}", joined(&row["cycle"], " -> ")));
            }
        }
        Some(QueryKind::DeadCode) => {
            lines.push(format!("{} function(s) with no recorded callers", rows.len()));
            for row in rows {
                lines.push(format!(
                    "  {}  {}:{}",
                    row["name"].as_str().unwrap_or("?"),
                    row["file"].as_str().unwrap_or("?"),
                    row["line"],
                ));
            }
        }
        Some(QueryKind::Hotspots) => {
            lines.push(format!("{} most-called function(s)", rows.len()));
            for row in rows {
                lines.push(format!(
                    "  {:>5}  {}",
                    row["callers"].as_u64().unwrap_or(0),
                    row["function"].as_str().unwrap_or("?"),
                ));
            }
        }
        Some(QueryKind::TraceToError) => {
            lines.push(format!(
                "{} path(s) from entry points reach {} ({}:{})",
                rows.len(),
                context_str(envelope, "function_at_line"),
                context_str(envelope, "file"),
                envelope.context.get("line").cloned().unwrap_or_default(),
            ));
            for row in rows {
                lines.push(format!("  {}", joined(&row["path"], " -> ")));
            }
        }
        Some(QueryKind::CrossDomain) => {
            lines.push(format!(
                "{} coupled to {} other domain(s)",
                context_str(envelope, "domain"),
                rows.len(),
            ));
            for row in rows {
                lines.push(format!(
                    "  {} ({}): {}",
                    row["from_domain"].as_str().unwrap_or("?"),
                    row["coupling_strength"],
                    joined(&row["functions"], ", "),
                ));
            }
        }
        Some(QueryKind::Domains) => {
            lines.push(format!("{} domain(s)", rows.len()));
            for row in rows {
                lines.push(format!(
                    "  {}: {} file(s), {} function(s), {} edge(s)",
                    row["domain"].as_str().unwrap_or("?"),
                    row["files"],
                    row["functions"],
                    row["edges"],
                ));
            }
        }
        None => return serde_json::to_string_pretty(envelope).unwrap_or_default(),
    }

    lines.join("\n")
}
