//! Index store — locates and loads PROJECT_INDEX.json.
//!
//! Discovery mirrors version-control root discovery: an explicit override
//! directory wins, otherwise walk upward from a start directory until the
//! index file or the filesystem root is reached. Loading is strict: a
//! present-but-undecodable index is a hard error, never a best-effort
//! partial load. Per-record malformation inside a decodable payload is
//! tolerated — the index is machine-generated and may contain partial
//! entries.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::types::{CallEdge, FunctionDecl};
use crate::error::{NavError, Result};

/// Fixed filename of the index artifact.
pub const INDEX_FILE_NAME: &str = "PROJECT_INDEX.json";

/// Environment variable naming an explicit project directory override.
pub const PROJECT_DIR_ENV: &str = "NAVIX_PROJECT_DIR";

/// Where to look for the index. An explicit configuration value rather than
/// implicit process-wide state: callers thread this into [`ProjectIndex`]
/// loading, tests construct it directly.
#[derive(Debug, Clone)]
pub struct IndexLocator {
    /// Checked first when set. No fallback to the upward search happens
    /// from inside this directory — it either contains the index or the
    /// search continues from `start_dir`.
    pub override_dir: Option<PathBuf>,
    /// Directory the upward search starts from.
    pub start_dir: PathBuf,
}

impl IndexLocator {
    pub fn new(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: None,
            start_dir: start_dir.into(),
        }
    }

    pub fn with_override(mut self, dir: impl Into<PathBuf>) -> Self {
        self.override_dir = Some(dir.into());
        self
    }

    /// Build a locator that starts the upward search at `start_dir` and
    /// honors the `NAVIX_PROJECT_DIR` override when set.
    pub fn from_env(start_dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: std::env::var_os(PROJECT_DIR_ENV).map(PathBuf::from),
            start_dir: start_dir.into(),
        }
    }

    /// Find the index file, or fail with `IndexNotFound`.
    pub fn locate(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.override_dir {
            let candidate = dir.join(INDEX_FILE_NAME);
            if candidate.exists() {
                debug!(path = %candidate.display(), "index found via override dir");
                return Ok(candidate);
            }
        }

        let mut current = self.start_dir.clone();
        loop {
            let candidate = current.join(INDEX_FILE_NAME);
            if candidate.exists() {
                debug!(path = %candidate.display(), "index found via upward search");
                return Ok(candidate);
            }
            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => {
                    return Err(NavError::IndexNotFound {
                        searched: self.start_dir.clone(),
                    })
                }
            }
        }
    }
}

/// Raw payload shape of PROJECT_INDEX.json. Field values stay loosely typed
/// (`Value`) so that partially malformed records can be skipped during
/// extraction instead of failing the whole decode.
#[derive(Debug, Default, Deserialize)]
struct RawIndex {
    /// File path → record whose second element lists function declarations
    /// as `"name:line[:...]"` descriptors.
    #[serde(default, alias = "files")]
    f: BTreeMap<String, Value>,
    /// Ordered `[caller, callee]` pairs.
    #[serde(default, alias = "edges")]
    g: Vec<Value>,
}

/// A loaded, immutable index snapshot.
#[derive(Debug)]
pub struct ProjectIndex {
    path: PathBuf,
    raw: RawIndex,
}

impl ProjectIndex {
    /// Load the index from an explicit path. Fails hard on undecodable JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let raw: RawIndex =
            serde_json::from_str(&text).map_err(|source| NavError::IndexMalformed {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(
            path = %path.display(),
            files = raw.f.len(),
            edges = raw.g.len(),
            "index loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            raw,
        })
    }

    /// Locate and load in one step.
    pub fn discover(locator: &IndexLocator) -> Result<Self> {
        let path = locator.locate()?;
        Self::load(&path)
    }

    /// Where this index was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All file paths recorded in the index.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.raw.f.keys().map(String::as_str)
    }

    pub fn file_count(&self) -> usize {
        self.raw.f.len()
    }

    /// All declared functions, in file order then declaration order.
    /// Records with the wrong shape are skipped.
    pub fn functions(&self) -> Vec<FunctionDecl> {
        let mut decls = Vec::new();
        for (file, record) in &self.raw.f {
            for (name, line) in decls_in_record(record) {
                decls.push(FunctionDecl {
                    name,
                    file: file.clone(),
                    line,
                });
            }
        }
        decls
    }

    /// Declared functions for a single file record.
    pub fn functions_in_file(&self, file: &str) -> Vec<FunctionDecl> {
        self.raw
            .f
            .get(file)
            .map(|record| {
                decls_in_record(record)
                    .into_iter()
                    .map(|(name, line)| FunctionDecl {
                        name,
                        file: file.to_string(),
                        line,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All well-formed call edges. Entries with the wrong arity or
    /// non-string endpoints are dropped, not escalated.
    pub fn edges(&self) -> Vec<CallEdge> {
        let mut edges = Vec::with_capacity(self.raw.g.len());
        let mut dropped = 0usize;
        for entry in &self.raw.g {
            match entry.as_array() {
                Some(pair) if pair.len() >= 2 => {
                    if let (Some(caller), Some(callee)) = (pair[0].as_str(), pair[1].as_str()) {
                        edges.push(CallEdge::new(caller, callee));
                        continue;
                    }
                    dropped += 1;
                }
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(dropped, "dropped malformed edge entries");
        }
        edges
    }
}

/// Pull `(name, line)` pairs out of a file record. The record is an array
/// whose second element is the declaration list; anything else yields
/// nothing.
fn decls_in_record(record: &Value) -> Vec<(String, usize)> {
    let Some(items) = record
        .as_array()
        .filter(|arr| arr.len() > 1)
        .and_then(|arr| arr[1].as_array())
    else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let descriptor = item.as_str()?;
            let mut parts = descriptor.split(':');
            let name = parts.next()?;
            let line: usize = parts.next()?.parse().ok()?;
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), line))
        })
        .collect()
}
