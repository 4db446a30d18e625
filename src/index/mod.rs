//! Index module — the read-only view over PROJECT_INDEX.json.
//!
//! Provides discovery of the index artifact (env override, then upward
//! directory search) and typed accessors over its payload. The index is
//! never written to; everything downstream treats it as an immutable
//! snapshot for the duration of one query.

pub mod store;
pub mod types;

pub use store::{IndexLocator, ProjectIndex, INDEX_FILE_NAME, PROJECT_DIR_ENV};
pub use types::{CallEdge, FunctionDecl};
