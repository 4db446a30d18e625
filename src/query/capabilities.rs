//! Capability discovery — a machine-readable catalog of every query type.
//!
//! Lets automated callers enumerate what the engine can answer before
//! constructing requests, instead of probing by trial and error.

use serde::Serialize;
use serde_json::{json, Value};

use super::QueryKind;

/// Self-description of one query type: what it answers, what it takes,
/// and what comes back.
#[derive(Debug, Clone, Serialize)]
pub struct QueryCapability {
    pub query_type: QueryKind,
    pub category: &'static str,
    pub description: &'static str,
    pub use_cases: Vec<&'static str>,
    pub input_schema: Value,
    pub output_schema: Value,
    pub examples: Vec<&'static str>,
}

/// Return the catalog of all supported query types with their schemas.
pub fn capabilities() -> Vec<QueryCapability> {
    vec![
        QueryCapability {
            query_type: QueryKind::BlastRadius,
            category: "impact-analysis",
            description: "Find every function that transitively depends on a target. \
                Answers 'what breaks if I change this?' — direct callers at depth 1, \
                their callers at depth 2, and so on, nearest first.",
            use_cases: vec![
                "Assess the risk of changing a function's signature or behavior",
                "Decide how much regression testing a change needs",
            ],
            input_schema: json!({
                "type": "object",
                "properties": {
                    "target": { "type": "string", "description": "Function name to analyze" },
                    "depth": { "type": "integer", "description": "Optional depth cap (default: unbounded)" },
                    "limit": { "type": "integer", "description": "Maximum results (default: 100)", "default": 100 }
                },
                "required": ["target"]
            }),
            output_schema: json!({
                "results": [{ "function": "string", "depth": "integer", "type": "direct-caller | transitive-caller" }],
                "summary": { "total": "integer", "max_depth": "integer", "by_depth": "object" }
            }),
            examples: vec![
                "what breaks if I change `parseDate`",
                "blast radius of sanitizeEmail",
            ],
        },
        QueryCapability {
            query_type: QueryKind::FindCallers,
            category: "impact-analysis",
            description: "List the direct callers of a function (depth 1 only).",
            use_cases: vec!["Quickly see who invokes a function before editing it"],
            input_schema: json!({
                "type": "object",
                "properties": {
                    "target": { "type": "string", "description": "Function name" }
                },
                "required": ["target"]
            }),
            output_schema: json!({ "results": ["string"], "summary": { "total": "integer" } }),
            examples: vec!["who calls `handleLogin`"],
        },
        QueryCapability {
            query_type: QueryKind::FindCalls,
            category: "impact-analysis",
            description: "List the functions a target directly calls.",
            use_cases: vec!["Understand a function's forward dependencies"],
            input_schema: json!({
                "type": "object",
                "properties": {
                    "target": { "type": "string", "description": "Function name" }
                },
                "required": ["target"]
            }),
            output_schema: json!({ "results": ["string"], "summary": { "total": "integer" } }),
            examples: vec!["what does `processOrder` call"],
        },
        QueryCapability {
            query_type: QueryKind::Cycles,
            category: "architecture",
            description: "Detect circular call chains in the whole graph. Each cycle is \
                reported as a closed path; one representative per strongly-entangled \
                region, not every rotation.",
            use_cases: vec![
                "Find mutual recursion and architectural tangles",
                "Check that layering rules hold",
            ],
            input_schema: json!({ "type": "object", "properties": {} }),
            output_schema: json!({
                "results": [{ "cycle": ["string"], "length": "integer" }],
                "summary": { "total_cycles": "integer", "min_length": "integer", "max_length": "integer" }
            }),
            examples: vec!["find circular dependencies"],
        },
        QueryCapability {
            query_type: QueryKind::DeadCode,
            category: "hygiene",
            description: "List declared functions that no edge points at. Candidates \
                only: dynamic dispatch, reflection, and external entry points are \
                invisible to the index.",
            use_cases: vec!["Identify removal candidates before a cleanup pass"],
            input_schema: json!({ "type": "object", "properties": {} }),
            output_schema: json!({
                "results": [{ "name": "string", "file": "string", "line": "integer" }],
                "summary": { "total": "integer", "note": "string" }
            }),
            examples: vec!["find unused functions"],
        },
        QueryCapability {
            query_type: QueryKind::Hotspots,
            category: "architecture",
            description: "Rank functions by how many call sites reference them. Raw \
                call-site multiplicity, so a function called twice from one caller \
                counts twice.",
            use_cases: vec![
                "Find the load-bearing functions that deserve the most test coverage",
                "Spot utility functions that have become de-facto APIs",
            ],
            input_schema: json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "integer", "description": "How many to return (default: 10)", "default": 10 }
                }
            }),
            output_schema: json!({
                "results": [{ "function": "string", "callers": "integer" }],
                "summary": { "total": "integer" }
            }),
            examples: vec!["top 10 most called functions"],
        },
        QueryCapability {
            query_type: QueryKind::TraceToError,
            category: "debugging",
            description: "Given a file and line (e.g. from a stack trace), resolve the \
                enclosing function and enumerate the call paths that reach it from \
                entry points, shortest first.",
            use_cases: vec![
                "Work backwards from a production error location to its triggers",
                "See which entry points can reach a suspicious line",
            ],
            input_schema: json!({
                "type": "object",
                "properties": {
                    "file": { "type": "string", "description": "File path or suffix, e.g. 'src/csv/parser.ts'" },
                    "line": { "type": "integer", "description": "Line number from the error" }
                },
                "required": ["file", "line"]
            }),
            output_schema: json!({
                "results": [{ "entry_point": "string", "path": ["string"], "depth": "integer" }],
                "summary": { "total_paths": "integer", "min_depth": "integer", "max_depth": "integer" }
            }),
            examples: vec!["trace src/csv/parser.ts:127"],
        },
        QueryCapability {
            query_type: QueryKind::CrossDomain,
            category: "architecture",
            description: "Measure how entangled one domain is with the rest of the \
                codebase: which foreign domains it calls into and through which \
                functions.",
            use_cases: vec![
                "Estimate the cost of extracting a domain into its own module or service",
            ],
            input_schema: json!({
                "type": "object",
                "properties": {
                    "domain": { "type": "string", "description": "Domain name, e.g. 'auth'" }
                },
                "required": ["domain"]
            }),
            output_schema: json!({
                "results": [{ "from_domain": "string", "functions": ["string"], "coupling_strength": "integer" }],
                "summary": { "total_external_deps": "integer", "coupled_domains": ["string"], "coupling_score": "integer" }
            }),
            examples: vec!["how coupled is the auth domain"],
        },
        QueryCapability {
            query_type: QueryKind::Domains,
            category: "architecture",
            description: "Summarize every domain in the project: file count, function \
                count, and internal edge count per domain.",
            use_cases: vec!["Get an architectural overview of an unfamiliar codebase"],
            input_schema: json!({ "type": "object", "properties": {} }),
            output_schema: json!({
                "results": [{ "domain": "string", "files": "integer", "functions": "integer", "edges": "integer" }],
                "summary": { "total_domains": "integer" }
            }),
            examples: vec!["list domains"],
        },
    ]
}

/// Look up the capability entry for one query type.
pub fn capability(kind: QueryKind) -> Option<QueryCapability> {
    capabilities().into_iter().find(|c| c.query_type == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_query_kind() {
        let catalog = capabilities();
        assert_eq!(catalog.len(), QueryKind::ALL.len());
        for kind in QueryKind::ALL {
            assert!(catalog.iter().any(|c| c.query_type == kind), "missing {kind}");
        }
    }

    #[test]
    fn test_lookup_by_kind() {
        let cap = capability(QueryKind::TraceToError).unwrap();
        assert_eq!(cap.category, "debugging");
        assert!(cap.input_schema["required"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("file")));
    }

    #[test]
    fn test_catalog_serializes() {
        let text = serde_json::to_string(&capabilities()).unwrap();
        assert!(text.contains("blast-radius"));
        assert!(text.contains("trace-to-error"));
    }
}
