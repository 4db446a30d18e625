//! Call graph module — the structural backbone of navix.
//!
//! Provides the graph data model built from the index edge list and the
//! traversal operations that answer impact-analysis queries over it.

pub mod builder;
pub mod engine;
pub mod types;

pub use builder::CallGraph;
pub use engine::{resolve_function_at, LINE_TOLERANCE, MAX_CALL_STACKS};
pub use types::{CallStack, CallerHit, CallerKind, Cycle, Hotspot};
