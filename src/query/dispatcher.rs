//! Query dispatcher — executes a structured request with strict error and
//! timeout handling.
//!
//! Each dispatch runs the traversal as an isolated worker thread over its
//! own freshly-loaded, immutable index snapshot, bounded by a wall-clock
//! deadline. Past the deadline the result is abandoned and a `Timeout`
//! error is surfaced — never retried, since a timeout usually means a
//! pathological or corrupt graph rather than a transient condition. Every
//! outcome is normalized into the same [`Envelope`] shape; no query can
//! hang the caller indefinitely or return ambiguous partial output.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, warn};

use super::parser::classify;
use super::{parse_query, Envelope, QueryKind, QueryRequest};
use crate::config::NavConfig;
use crate::domain::{self, DomainRules};
use crate::error::{NavError, Result};
use crate::graph::{resolve_function_at, CallGraph, MAX_CALL_STACKS};
use crate::index::{IndexLocator, ProjectIndex};

/// Default result cap for blast-radius traversals.
pub const DEFAULT_BLAST_LIMIT: usize = 100;

/// Default number of ranked hotspots.
pub const DEFAULT_HOTSPOT_LIMIT: usize = 10;

/// Executes queries against whatever index the locator resolves to.
/// Stateless across invocations: the index is re-read per dispatch and
/// discarded, so concurrent dispatchers never share mutable state.
pub struct Dispatcher {
    locator: IndexLocator,
    rules: DomainRules,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(locator: IndexLocator, config: &NavConfig) -> Self {
        Self {
            locator,
            rules: config.domain_rules(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Parse a free-text request and execute it. When classification
    /// succeeded but argument extraction failed, the error envelope still
    /// names the matched query type.
    pub fn dispatch_text(&self, input: &str) -> Envelope {
        match parse_query(input) {
            Ok(request) => self.dispatch(request),
            Err(e) => Envelope::failure(classify(input), &e),
        }
    }

    /// Execute a structured request. Always returns an envelope; failures
    /// of any kind are normalized, not propagated.
    pub fn dispatch(&self, request: QueryRequest) -> Envelope {
        let kind = request.kind();
        debug!(query = %kind, "dispatching");

        let locator = self.locator.clone();
        let rules = self.rules.clone();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let outcome = run_query(&locator, &rules, request);
            // Receiver may have given up on a timeout; that's fine.
            let _ = tx.send(outcome);
        });

        let outcome = match rx.recv_timeout(self.timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                warn!(query = %kind, timeout_secs = self.timeout.as_secs(), "query timed out");
                return Envelope::failure(Some(kind), &NavError::Timeout(self.timeout.as_secs()));
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Envelope::failure(
                    Some(kind),
                    &NavError::ExecutionError("query worker terminated unexpectedly".to_string()),
                );
            }
        };

        match outcome {
            Ok(envelope) => match validate(envelope) {
                Ok(envelope) => envelope,
                Err(e) => Envelope::failure(Some(kind), &e),
            },
            Err(e) => Envelope::failure(Some(kind), &e),
        }
    }
}

/// A success envelope with no results payload is an output defect, not a
/// success: every query arm must attach one, even when it is an empty
/// list. Error envelopes carry no results and pass through untouched.
fn validate(envelope: Envelope) -> Result<Envelope> {
    if envelope.is_success() && envelope.results.is_none() {
        let mut preview = format!("{envelope:?}");
        preview.truncate(500);
        return Err(NavError::OutputError {
            reason: "query produced no results payload".to_string(),
            preview,
        });
    }
    Ok(envelope)
}

/// Load the index, build the graph, run one traversal, shape the envelope.
/// Pure with respect to everything outside the locator's filesystem view.
fn run_query(
    locator: &IndexLocator,
    rules: &DomainRules,
    request: QueryRequest,
) -> Result<Envelope> {
    let index = ProjectIndex::discover(locator)?;
    let graph = CallGraph::from_edges(&index.edges());
    let kind = request.kind();

    let envelope = match request {
        QueryRequest::BlastRadius {
            target,
            depth,
            limit,
        } => {
            let hits = graph.blast_radius(&target, depth, limit.unwrap_or(DEFAULT_BLAST_LIMIT));
            let max_depth = hits.iter().map(|h| h.depth).max().unwrap_or(0);
            let mut by_depth = serde_json::Map::new();
            for hit in &hits {
                let count = by_depth
                    .entry(hit.depth.to_string())
                    .or_insert_with(|| json!(0));
                if let Some(n) = count.as_u64() {
                    *count = json!(n + 1);
                }
            }
            Envelope::success(kind)
                .with_context("target", json!(target))
                .with_summary(json!({
                    "total": hits.len(),
                    "max_depth": max_depth,
                    "by_depth": by_depth,
                }))
                .with_results(serde_json::to_value(hits)?)
        }

        QueryRequest::FindCallers { target } => {
            let callers = graph.direct_callers(&target);
            Envelope::success(kind)
                .with_context("target", json!(target))
                .with_summary(json!({ "total": callers.len() }))
                .with_results(json!(callers))
        }

        QueryRequest::FindCalls { target } => {
            let callees = graph.direct_callees(&target);
            Envelope::success(kind)
                .with_context("target", json!(target))
                .with_summary(json!({ "total": callees.len() }))
                .with_results(json!(callees))
        }

        QueryRequest::Cycles => {
            let cycles = graph.find_cycles();
            let min = cycles.iter().map(|c| c.length).min().unwrap_or(0);
            let max = cycles.iter().map(|c| c.length).max().unwrap_or(0);
            Envelope::success(kind)
                .with_summary(json!({
                    "total_cycles": cycles.len(),
                    "min_length": min,
                    "max_length": max,
                }))
                .with_results(serde_json::to_value(cycles)?)
        }

        QueryRequest::DeadCode => {
            let dead = graph.dead_code(&index.functions());
            Envelope::success(kind)
                .with_summary(json!({
                    "total": dead.len(),
                    "note": "candidate list — dynamic dispatch and external entry points are invisible to the index",
                }))
                .with_results(serde_json::to_value(dead)?)
        }

        QueryRequest::Hotspots { limit } => {
            let ranked = graph.hotspots(limit.unwrap_or(DEFAULT_HOTSPOT_LIMIT));
            Envelope::success(kind)
                .with_summary(json!({ "total": ranked.len() }))
                .with_results(serde_json::to_value(ranked)?)
        }

        QueryRequest::TraceToError { file, line } => {
            let decl = resolve_function_at(&index, &file, line)?;
            let stacks = graph.call_stacks_to(&decl.name, MAX_CALL_STACKS);
            let min = stacks.iter().map(|s| s.depth).min().unwrap_or(0);
            let max = stacks.iter().map(|s| s.depth).max().unwrap_or(0);
            Envelope::success(kind)
                .with_context("file", json!(file))
                .with_context("line", json!(line))
                .with_context("function_at_line", json!(decl.name))
                .with_summary(json!({
                    "total_paths": stacks.len(),
                    "min_depth": min,
                    "max_depth": max,
                }))
                .with_results(serde_json::to_value(stacks)?)
        }

        QueryRequest::CrossDomain { domain: target } => {
            let report = domain::cross_domain(&index, &graph, rules, &target);
            let coupled: Vec<&str> = report
                .couplings
                .iter()
                .map(|c| c.from_domain.as_str())
                .collect();
            Envelope::success(kind)
                .with_context("domain", json!(target))
                .with_summary(json!({
                    "total_external_deps": report.coupling_score,
                    "coupled_domains": coupled,
                    "coupling_score": report.coupling_score,
                }))
                .with_results(serde_json::to_value(&report.couplings)?)
        }

        QueryRequest::Domains => {
            let stats = domain::domain_summary(&index, &graph, rules);
            Envelope::success(kind)
                .with_summary(json!({ "total_domains": stats.len() }))
                .with_results(serde_json::to_value(stats)?)
        }
    };

    Ok(envelope)
}
