//! Free-text query parser — best-effort classification of a natural
//! language request into a structured [`QueryRequest`].
//!
//! The classifier is inherently heuristic, so it lives behind this one
//! function returning a request-or-parse-error: the traversal engine never
//! sees natural language. Classification scans an ordered keyword table,
//! first match wins. Target extraction tries, in priority order: a
//! backtick-quoted token, an explicit "function X"/"X function" phrase,
//! then the first token shaped like a camelCase or PascalCase identifier.
//! A required target that cannot be extracted is a terminal parse error,
//! never silently defaulted.

use std::sync::OnceLock;

use regex::Regex;

use super::{QueryKind, QueryRequest};
use crate::error::{NavError, Result};

/// Ordered keyword table: first rule whose keyword appears in the
/// lowercased input decides the query type.
const KEYWORD_RULES: &[(QueryKind, &[&str], bool)] = &[
    (
        QueryKind::Hotspots,
        &[
            "hotspot",
            "most connected",
            "high risk",
            "change risk",
            "maintenance burden",
        ],
        false,
    ),
    (
        QueryKind::FindCallers,
        &["who calls", "find caller", "what calls", "reverse dep", "called by"],
        true,
    ),
    (
        QueryKind::FindCalls,
        &["what does", "calls what", "forward dep", "depends on", "invokes"],
        true,
    ),
    (
        QueryKind::DeadCode,
        &["dead code", "unused", "never called", "orphan"],
        false,
    ),
    (
        QueryKind::BlastRadius,
        &["blast radius", "impact", "transitive caller", "what breaks"],
        true,
    ),
    (
        QueryKind::Cycles,
        &["cycle", "circular", "loop"],
        false,
    ),
];

fn backtick_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"`([^`]+)`").expect("valid regex"))
}

fn function_phrase_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)function\s+(\w+)|(\w+)\s+function").expect("valid regex"))
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // camelCase (internal capital) or PascalCase.
    RE.get_or_init(|| {
        Regex::new(r"^(?:[a-z][a-z0-9]*[A-Z][A-Za-z0-9]*|[A-Z][A-Za-z0-9]*)$")
            .expect("valid regex")
    })
}

fn limit_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:top|limit|first)\s+(\d+)").expect("valid regex"))
}

/// Classify free text against the keyword table without extracting any
/// arguments. Lets error reporting name the query type even when argument
/// extraction later fails.
pub fn classify(input: &str) -> Option<QueryKind> {
    let lowered = input.to_lowercase();
    KEYWORD_RULES
        .iter()
        .find(|(_, keywords, _)| keywords.iter().any(|keyword| lowered.contains(keyword)))
        .map(|&(kind, _, _)| kind)
}

/// Extract a function name from free text, or None.
fn extract_target(input: &str) -> Option<String> {
    if let Some(captures) = backtick_re().captures(input) {
        return Some(captures[1].to_string());
    }

    if let Some(captures) = function_phrase_re().captures(input) {
        let name = captures.get(1).or_else(|| captures.get(2));
        if let Some(name) = name {
            return Some(name.as_str().to_string());
        }
    }

    input
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .find(|word| identifier_re().is_match(word))
        .map(str::to_string)
}

fn extract_limit(lowered: &str) -> Option<usize> {
    limit_re()
        .captures(lowered)
        .and_then(|c| c[1].parse().ok())
}

/// Parse a free-text request into a structured query.
pub fn parse_query(input: &str) -> Result<QueryRequest> {
    let lowered = input.to_lowercase();

    let matched = KEYWORD_RULES.iter().find(|(_, keywords, _)| {
        keywords.iter().any(|keyword| lowered.contains(keyword))
    });

    let Some(&(kind, _, requires_target)) = matched else {
        let supported: Vec<&str> = KEYWORD_RULES.iter().map(|(k, _, _)| k.as_str()).collect();
        return Err(NavError::ParseError {
            reason: format!(
                "could not determine query type from '{input}' (supported: {})",
                supported.join(", ")
            ),
        });
    };

    let target = if requires_target {
        match extract_target(input) {
            Some(target) => Some(target),
            None => {
                return Err(NavError::ParseError {
                    reason: format!("could not extract a function name from '{input}'"),
                })
            }
        }
    } else {
        None
    };

    let limit = extract_limit(&lowered);

    let request = match (kind, target) {
        (QueryKind::Hotspots, _) => QueryRequest::Hotspots { limit },
        (QueryKind::FindCallers, Some(target)) => QueryRequest::FindCallers { target },
        (QueryKind::FindCalls, Some(target)) => QueryRequest::FindCalls { target },
        (QueryKind::DeadCode, _) => QueryRequest::DeadCode,
        (QueryKind::BlastRadius, Some(target)) => QueryRequest::BlastRadius {
            target,
            depth: None,
            limit,
        },
        (QueryKind::Cycles, _) => QueryRequest::Cycles,
        // requires_target guarantees Some for the target-taking kinds.
        _ => {
            return Err(NavError::ParseError {
                reason: format!("query type {kind} requires a target"),
            })
        }
    };

    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_who_calls_with_backticks() {
        let request = parse_query("who calls `parseDate`").unwrap();
        assert_eq!(
            request,
            QueryRequest::FindCallers {
                target: "parseDate".to_string()
            }
        );
    }

    #[test]
    fn test_dead_code_no_target_needed() {
        let request = parse_query("find dead code").unwrap();
        assert_eq!(request, QueryRequest::DeadCode);
    }

    #[test]
    fn test_blast_radius_camel_case_target() {
        let request = parse_query("blast radius of sanitizeEmail").unwrap();
        assert_eq!(
            request,
            QueryRequest::BlastRadius {
                target: "sanitizeEmail".to_string(),
                depth: None,
                limit: None,
            }
        );
    }

    #[test]
    fn test_function_phrase_target() {
        let request = parse_query("what breaks if I change function validate_input?").unwrap();
        assert_eq!(
            request,
            QueryRequest::BlastRadius {
                target: "validate_input".to_string(),
                depth: None,
                limit: None,
            }
        );
    }

    #[test]
    fn test_hotspots_with_limit() {
        let request = parse_query("show top 5 hotspots").unwrap();
        assert_eq!(request, QueryRequest::Hotspots { limit: Some(5) });
    }

    #[test]
    fn test_classify_ignores_missing_target() {
        assert_eq!(classify("who calls it"), Some(QueryKind::FindCallers));
        assert_eq!(classify("hello there"), None);
    }

    #[test]
    fn test_missing_target_is_terminal() {
        let err = parse_query("who calls it").unwrap_err();
        assert!(matches!(err, NavError::ParseError { .. }));
    }

    #[test]
    fn test_unclassifiable_input() {
        let err = parse_query("hello there").unwrap_err();
        assert!(matches!(err, NavError::ParseError { .. }));
        assert!(err.to_string().contains("supported"));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "impact" (blast-radius) and "cycle" (cycles) both appear;
        // blast-radius is earlier in the table.
        let request = parse_query("impact of `tick` on the cycle").unwrap();
        assert!(matches!(request, QueryRequest::BlastRadius { .. }));
    }

    #[test]
    fn test_pascal_case_target() {
        let request = parse_query("who calls UserService").unwrap();
        assert_eq!(
            request,
            QueryRequest::FindCallers {
                target: "UserService".to_string()
            }
        );
    }
}
