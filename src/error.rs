//! Error types for navix.
//!
//! The taxonomy mirrors the failure modes of the query pipeline: the index
//! artifact can be missing or undecodable, a trace target can fail to
//! resolve, a free-text request can fail to classify, and a dispatched
//! operation can time out or misbehave. Unknown traversal targets are NOT
//! errors — they produce an empty success result.

use std::path::PathBuf;
use thiserror::Error;

/// All errors navix can produce.
#[derive(Debug, Error)]
pub enum NavError {
    /// PROJECT_INDEX.json could not be found anywhere.
    #[error("PROJECT_INDEX.json not found in {searched} or any parent directory")]
    IndexNotFound {
        /// Directory the upward search started from.
        searched: PathBuf,
    },

    /// The index artifact exists but could not be decoded. A corrupt index
    /// aborts the whole invocation — no partial graph is ever built.
    #[error("failed to decode index at {path}: {source}")]
    IndexMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Trace target did not resolve to a declared function.
    #[error("no function found at {file}:{line}")]
    NoFunctionAtLocation { file: String, line: usize },

    /// A free-text request could not be classified, or a required target
    /// could not be extracted from it.
    #[error("could not parse query: {reason}")]
    ParseError { reason: String },

    /// The underlying operation failed (e.g. its worker panicked).
    #[error("query execution failed: {0}")]
    ExecutionError(String),

    /// The operation exceeded its wall-clock deadline. Never retried —
    /// a timeout usually means a pathological or corrupt graph, not a
    /// transient condition.
    #[error("query timed out after {0} seconds")]
    Timeout(u64),

    /// The operation completed but produced empty or unusable output.
    #[error("query produced invalid output: {reason}")]
    OutputError {
        reason: String,
        /// Truncated raw output for diagnosis.
        preview: String,
    },

    /// Filesystem error while reading the index or a rules file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A traversal result failed to serialize into the envelope.
    #[error("failed to serialize result: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NavError {
    /// A remediation hint for the user, where one is useful.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            NavError::IndexNotFound { .. } => {
                Some("Generate PROJECT_INDEX.json in your project root, or set NAVIX_PROJECT_DIR")
            }
            NavError::IndexMalformed { .. } => {
                Some("Regenerate PROJECT_INDEX.json — the file is not valid JSON")
            }
            NavError::NoFunctionAtLocation { .. } => Some("Check the file path and line number"),
            NavError::ParseError { .. } => Some(
                "Wrap the function name in backticks like `parseDate`, or use 'function X' syntax",
            ),
            NavError::Timeout(_) => {
                Some("The index may be corrupted or extremely large")
            }
            _ => None,
        }
    }
}

/// Convenience result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NavError>;
