//! Query module — turns loosely-structured requests into traversals.
//!
//! Two entry paths: structured [`QueryRequest`]s (used by automated
//! workflows chaining traversals) and free-text parsing (`parser`). Either
//! way, execution runs through the [`Dispatcher`] which bounds it with a
//! timeout and normalizes every outcome — success or failure — into the
//! same [`Envelope`] shape.

pub mod capabilities;
pub mod dispatcher;
pub mod parser;

pub use capabilities::{capabilities, capability, QueryCapability};
pub use dispatcher::Dispatcher;
pub use parser::{classify, parse_query};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::NavError;

/// Every query type the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryKind {
    BlastRadius,
    FindCallers,
    FindCalls,
    Cycles,
    DeadCode,
    Hotspots,
    TraceToError,
    CrossDomain,
    Domains,
}

impl QueryKind {
    pub const ALL: [QueryKind; 9] = [
        QueryKind::BlastRadius,
        QueryKind::FindCallers,
        QueryKind::FindCalls,
        QueryKind::Cycles,
        QueryKind::DeadCode,
        QueryKind::Hotspots,
        QueryKind::TraceToError,
        QueryKind::CrossDomain,
        QueryKind::Domains,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::BlastRadius => "blast-radius",
            QueryKind::FindCallers => "find-callers",
            QueryKind::FindCalls => "find-calls",
            QueryKind::Cycles => "cycles",
            QueryKind::DeadCode => "dead-code",
            QueryKind::Hotspots => "hotspots",
            QueryKind::TraceToError => "trace-to-error",
            QueryKind::CrossDomain => "cross-domain",
            QueryKind::Domains => "domains",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QueryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        QueryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                let supported: Vec<&str> = QueryKind::ALL.iter().map(|k| k.as_str()).collect();
                format!(
                    "unknown query type '{s}' (supported: {})",
                    supported.join(", ")
                )
            })
    }
}

/// A fully structured query, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "kebab-case")]
pub enum QueryRequest {
    BlastRadius {
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        depth: Option<usize>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },
    FindCallers {
        target: String,
    },
    FindCalls {
        target: String,
    },
    Cycles,
    DeadCode,
    Hotspots {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },
    TraceToError {
        file: String,
        line: usize,
    },
    CrossDomain {
        domain: String,
    },
    Domains,
}

impl QueryRequest {
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryRequest::BlastRadius { .. } => QueryKind::BlastRadius,
            QueryRequest::FindCallers { .. } => QueryKind::FindCallers,
            QueryRequest::FindCalls { .. } => QueryKind::FindCalls,
            QueryRequest::Cycles => QueryKind::Cycles,
            QueryRequest::DeadCode => QueryKind::DeadCode,
            QueryRequest::Hotspots { .. } => QueryKind::Hotspots,
            QueryRequest::TraceToError { .. } => QueryKind::TraceToError,
            QueryRequest::CrossDomain { .. } => QueryKind::CrossDomain,
            QueryRequest::Domains => QueryKind::Domains,
        }
    }
}

/// The uniform result envelope every query produces, success or error.
/// Created fresh per invocation, never persisted.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryKind>,
    /// Query-specific echo fields (target, file, line, domain, ...).
    #[serde(flatten)]
    pub context: serde_json::Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl Envelope {
    pub fn success(kind: QueryKind) -> Self {
        Self {
            status: "success",
            query: Some(kind),
            context: serde_json::Map::new(),
            results: None,
            summary: None,
            error: None,
            hint: None,
        }
    }

    /// Normalize any [`NavError`] into an error envelope, carrying the
    /// remediation hint when one exists.
    pub fn failure(kind: Option<QueryKind>, err: &NavError) -> Self {
        Self {
            status: "error",
            query: kind,
            context: serde_json::Map::new(),
            results: None,
            summary: None,
            error: Some(err.to_string()),
            hint: err.hint().map(str::to_string),
        }
    }

    pub fn with_context(mut self, key: &str, value: Value) -> Self {
        self.context.insert(key.to_string(), value);
        self
    }

    pub fn with_results(mut self, results: Value) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_summary(mut self, summary: Value) -> Self {
        self.summary = Some(summary);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
