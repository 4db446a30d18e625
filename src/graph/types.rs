//! Result types produced by the traversal engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a blast-radius hit calls the target directly or transitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallerKind {
    #[serde(rename = "direct-caller")]
    Direct,
    #[serde(rename = "transitive-caller")]
    Transitive,
}

impl fmt::Display for CallerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallerKind::Direct => write!(f, "direct-caller"),
            CallerKind::Transitive => write!(f, "transitive-caller"),
        }
    }
}

/// One function discovered by a blast-radius traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerHit {
    /// The affected function.
    pub function: String,
    /// BFS depth: 1 = direct caller, 2+ = transitive.
    pub depth: usize,
    #[serde(rename = "type")]
    pub kind: CallerKind,
}

/// A circular dependency chain. The first and last node are the same
/// function, so `length` is one less than the node count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cycle {
    pub cycle: Vec<String>,
    pub length: usize,
}

/// One complete call path from an entry point down to a trace target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallStack {
    /// First function on the path — a graph source (called by nothing).
    pub entry_point: String,
    /// Entry point first, target last.
    pub path: Vec<String>,
    /// Number of calls along the path.
    pub depth: usize,
}

/// A function ranked by how many call edges point at it. Counts raw edge
/// multiplicity: the same caller calling twice counts twice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hotspot {
    pub function: String,
    pub callers: usize,
}
