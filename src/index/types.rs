//! Typed records extracted from the raw index payload.

use serde::{Deserialize, Serialize};

/// A function declaration: name, declaring file, and declaration line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    /// Bare function name. Names are treated as globally unique within one
    /// index; two files declaring the same name are conflated. That is a
    /// limitation of the source format, not something navix tries to fix.
    pub name: String,
    /// Path of the declaring file, as recorded in the index.
    pub file: String,
    /// 1-indexed declaration line.
    pub line: usize,
}

/// A caller→callee edge. Duplicates are permitted: reachability traversals
/// de-duplicate via their visited sets, while ranking counts raw multiplicity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
}

impl CallEdge {
    pub fn new(caller: impl Into<String>, callee: impl Into<String>) -> Self {
        Self {
            caller: caller.into(),
            callee: callee.into(),
        }
    }
}
