//! # navix
//!
//! Read-only impact analysis over a precomputed code-structure index.
//!
//! navix consumes a `PROJECT_INDEX.json` artifact (produced separately by
//! an indexer) containing per-file function declarations and a
//! caller→callee edge list, and answers structural questions about the
//! indexed codebase without ever touching its source: what breaks if a
//! function changes, which call chains are circular, which paths lead
//! from entry points to an error location, where domains couple.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use navix::config::NavConfig;
//! use navix::index::IndexLocator;
//! use navix::query::{Dispatcher, QueryRequest};
//!
//! let locator = IndexLocator::from_env(std::path::Path::new("."));
//! let dispatcher = Dispatcher::new(locator, &NavConfig::default());
//!
//! let envelope = dispatcher.dispatch(QueryRequest::BlastRadius {
//!     target: "parseDate".to_string(),
//!     depth: None,
//!     limit: None,
//! });
//! // Uniform JSON envelope: status, query, results, summary.
//! println!("{}", serde_json::to_string_pretty(&envelope).unwrap());
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod graph;
pub mod index;
pub mod query;

// Re-exports for convenience
pub use error::{NavError, Result};

pub use domain::{DomainRule, DomainRules};
pub use graph::{CallGraph, CallStack, CallerHit, CallerKind, Cycle, Hotspot};
pub use index::{FunctionDecl, IndexLocator, ProjectIndex};
pub use query::{Dispatcher, Envelope, QueryKind, QueryRequest};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NavConfig;
    use std::fs;

    // A small but complete project: two entry points, a shared utility,
    // a cycle, a dead function, and two domains.
    const INDEX: &str = r#"{
        "f": {
            "src/main.ts": ["ts", ["main:1", "startup:20"]],
            "src/auth/login.ts": ["ts", ["handleLogin:10", "checkPassword:40"]],
            "src/auth/session.ts": ["ts", ["refreshSession:5", "expireSession:30"]],
            "src/lib/util.ts": ["ts", ["sanitize:3", "unusedHelper:50"]]
        },
        "g": [
            ["main", "handleLogin"],
            ["main", "refreshSession"],
            ["startup", "sanitize"],
            ["handleLogin", "checkPassword"],
            ["handleLogin", "sanitize"],
            ["refreshSession", "expireSession"],
            ["expireSession", "refreshSession"],
            ["checkPassword", "sanitize"]
        ]
    }"#;

    fn dispatcher() -> (tempfile::TempDir, Dispatcher) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(index::INDEX_FILE_NAME), INDEX).unwrap();
        let locator = IndexLocator::new(dir.path());
        let config = NavConfig {
            domains: vec![DomainRule {
                pattern: "src/auth/".to_string(),
                domain: "auth".to_string(),
            }],
            ..NavConfig::default()
        };
        (dir, Dispatcher::new(locator, &config))
    }

    #[test]
    fn test_end_to_end_blast_radius() {
        let (_dir, dispatcher) = dispatcher();
        let envelope = dispatcher.dispatch(QueryRequest::BlastRadius {
            target: "sanitize".to_string(),
            depth: None,
            limit: None,
        });
        assert!(envelope.is_success());

        // sanitize <- startup, handleLogin, checkPassword <- main
        let results = envelope.results.unwrap();
        let hits = results.as_array().unwrap();
        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0]["depth"], 1);
        assert_eq!(hits[0]["type"], "direct-caller");
        let summary = envelope.summary.unwrap();
        assert_eq!(summary["max_depth"], 2);
        assert_eq!(summary["by_depth"]["1"], 3);
    }

    #[test]
    fn test_end_to_end_cycles() {
        let (_dir, dispatcher) = dispatcher();
        let envelope = dispatcher.dispatch(QueryRequest::Cycles);
        assert!(envelope.is_success());

        let results = envelope.results.unwrap();
        let cycles = results.as_array().unwrap();
        assert_eq!(cycles.len(), 1);
        let path = cycles[0]["cycle"].as_array().unwrap();
        assert_eq!(path.first(), path.last());
        assert_eq!(cycles[0]["length"], 2);
    }

    #[test]
    fn test_end_to_end_dead_code() {
        let (_dir, dispatcher) = dispatcher();
        let envelope = dispatcher.dispatch(QueryRequest::DeadCode);
        let results = envelope.results.unwrap();
        let names: Vec<&str> = results
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        // Entry points count as dead: nothing calls main or startup.
        assert!(names.contains(&"unusedHelper"));
        assert!(names.contains(&"main"));
        assert!(!names.contains(&"sanitize"));
    }

    #[test]
    fn test_end_to_end_hotspots() {
        let (_dir, dispatcher) = dispatcher();
        let envelope = dispatcher.dispatch(QueryRequest::Hotspots { limit: Some(3) });
        let results = envelope.results.unwrap();
        let top = &results.as_array().unwrap()[0];
        assert_eq!(top["function"], "sanitize");
        assert_eq!(top["callers"], 3);
    }

    #[test]
    fn test_end_to_end_trace() {
        let (_dir, dispatcher) = dispatcher();
        let envelope = dispatcher.dispatch(QueryRequest::TraceToError {
            file: "auth/login.ts".to_string(),
            line: 45,
        });
        assert!(envelope.is_success());
        assert_eq!(envelope.context["function_at_line"], "checkPassword");

        let results = envelope.results.unwrap();
        let stacks = results.as_array().unwrap();
        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0]["entry_point"], "main");
        let path: Vec<&str> = stacks[0]["path"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(path, vec!["main", "handleLogin", "checkPassword"]);
    }

    #[test]
    fn test_end_to_end_cross_domain() {
        let (_dir, dispatcher) = dispatcher();
        let envelope = dispatcher.dispatch(QueryRequest::CrossDomain {
            domain: "auth".to_string(),
        });
        assert!(envelope.is_success());
        let summary = envelope.summary.unwrap();
        // auth's only external callee is sanitize, owned by core.
        assert_eq!(summary["coupling_score"], 1);
        assert_eq!(summary["coupled_domains"][0], "core");

        let results = envelope.results.unwrap();
        let couplings = results.as_array().unwrap();
        assert_eq!(couplings[0]["functions"][0], "sanitize");
    }

    #[test]
    fn test_end_to_end_free_text() {
        let (_dir, dispatcher) = dispatcher();
        let envelope = dispatcher.dispatch_text("what breaks if I change `checkPassword`?");
        assert!(envelope.is_success());
        assert_eq!(envelope.query, Some(QueryKind::BlastRadius));
        assert_eq!(envelope.summary.unwrap()["total"], 2);
    }

    #[test]
    fn test_envelope_serializes_flat_context() {
        let (_dir, dispatcher) = dispatcher();
        let envelope = dispatcher.dispatch(QueryRequest::FindCallers {
            target: "sanitize".to_string(),
        });
        let value = serde_json::to_value(&envelope).unwrap();
        // Context fields are flattened into the envelope, not nested.
        assert_eq!(value["target"], "sanitize");
        assert_eq!(value["status"], "success");
        assert_eq!(value["query"], "find-callers");
    }
}
