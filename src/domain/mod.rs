//! Domain aggregator — maps functions to architectural domains and
//! measures coupling between them.
//!
//! A domain is a label derived from a function's declaring file path via an
//! ordered rule list: first matching case-insensitive substring wins,
//! unmatched paths fall back to a default label. The rule list is plain
//! configuration passed in by the caller (see [`crate::config`]) — swapped
//! by dependency injection, never inferred at runtime.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::CallGraph;
use crate::index::ProjectIndex;

/// Label applied to paths no rule matches.
pub const DEFAULT_DOMAIN: &str = "core";

/// One ordered classification rule: paths containing `pattern`
/// (case-insensitive) belong to `domain`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainRule {
    pub pattern: String,
    pub domain: String,
}

/// The ordered, first-match rule set plus its fallback label.
#[derive(Debug, Clone)]
pub struct DomainRules {
    rules: Vec<DomainRule>,
    default: String,
}

impl DomainRules {
    pub fn new(rules: Vec<DomainRule>, default: impl Into<String>) -> Self {
        Self {
            rules,
            default: default.into(),
        }
    }

    /// Generic rules covering common repository layouts. Projects with
    /// their own conventions should supply a rules file instead.
    pub fn defaults() -> Self {
        let rules = [
            ("commands/", "commands"),
            ("lib/services/", "services"),
            ("lib/config/", "configuration"),
            ("lib/validation/", "validation"),
            ("lib/utils/", "utilities"),
            ("lib/errors/", "error-handling"),
            ("tests/", "tests"),
            ("test/", "tests"),
            ("src/components/", "ui-components"),
            ("src/pages/", "pages-routes"),
            ("src/api/", "api-endpoints"),
            ("src/hooks/", "hooks"),
            ("src/utils/", "utilities"),
        ]
        .into_iter()
        .map(|(pattern, domain)| DomainRule {
            pattern: pattern.to_string(),
            domain: domain.to_string(),
        })
        .collect();
        Self::new(rules, DEFAULT_DOMAIN)
    }

    /// Classify a file path. First matching rule wins; fallback otherwise.
    pub fn classify(&self, path: &str) -> &str {
        let normalized = path.replace('\\', "/").to_lowercase();
        for rule in &self.rules {
            if normalized.contains(&rule.pattern.to_lowercase()) {
                return &rule.domain;
            }
        }
        &self.default
    }

    pub fn default_domain(&self) -> &str {
        &self.default
    }
}

/// Map every declared function to its domain. Functions declared in
/// multiple files conflate to whichever file the index lists last — the
/// same global-name limitation the rest of the engine accepts.
pub fn function_domains(index: &ProjectIndex, rules: &DomainRules) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for decl in index.functions() {
        let domain = rules.classify(&decl.file).to_string();
        map.insert(decl.name, domain);
    }
    map
}

/// External functions one domain calls in another, with how many distinct
/// functions it touches there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainCoupling {
    pub from_domain: String,
    pub functions: Vec<String>,
    /// Number of distinct external functions called in `from_domain`.
    pub coupling_strength: usize,
}

/// Full cross-domain dependency report for one domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossDomainReport {
    pub domain: String,
    pub couplings: Vec<DomainCoupling>,
    /// Sum of coupling strengths across all external domains.
    pub coupling_score: usize,
}

/// Compute which functions outside `domain` its functions call.
///
/// Walks forward edges from every function in the domain, classifies each
/// distinct callee, and groups callees owned by other domains. Callees not
/// declared anywhere in the index have no domain and are skipped.
pub fn cross_domain(
    index: &ProjectIndex,
    graph: &CallGraph,
    rules: &DomainRules,
    domain: &str,
) -> CrossDomainReport {
    let ownership = function_domains(index, rules);

    let members: HashSet<&str> = ownership
        .iter()
        .filter(|(_, d)| d.as_str() == domain)
        .map(|(name, _)| name.as_str())
        .collect();

    let mut called: HashSet<String> = HashSet::new();
    for member in &members {
        for callee in graph.direct_callees(member) {
            called.insert(callee);
        }
    }

    // BTreeMap keeps the per-domain groups sorted by name.
    let mut grouped: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for callee in &called {
        if let Some(owner) = ownership.get(callee) {
            if owner.as_str() != domain {
                grouped.entry(owner.as_str()).or_default().push(callee.clone());
            }
        }
    }

    let mut coupling_score = 0;
    let couplings: Vec<DomainCoupling> = grouped
        .into_iter()
        .map(|(from_domain, mut functions)| {
            functions.sort_unstable();
            let coupling_strength = functions.len();
            coupling_score += coupling_strength;
            DomainCoupling {
                from_domain: from_domain.to_string(),
                functions,
                coupling_strength,
            }
        })
        .collect();

    debug!(
        domain,
        coupled_domains = couplings.len(),
        coupling_score,
        "cross-domain analysis finished"
    );

    CrossDomainReport {
        domain: domain.to_string(),
        couplings,
        coupling_score,
    }
}

/// Per-domain size statistics for the whole index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainStat {
    pub domain: String,
    pub files: usize,
    pub functions: usize,
    /// Edges whose caller belongs to this domain.
    pub edges: usize,
}

/// Aggregate the index into one stat row per domain, sorted by domain name.
pub fn domain_summary(
    index: &ProjectIndex,
    graph: &CallGraph,
    rules: &DomainRules,
) -> Vec<DomainStat> {
    let ownership = function_domains(index, rules);

    let mut stats: BTreeMap<&str, DomainStat> = BTreeMap::new();
    for path in index.file_paths() {
        let domain = rules.classify(path);
        let entry = stats.entry(domain).or_insert_with(|| DomainStat {
            domain: domain.to_string(),
            files: 0,
            functions: 0,
            edges: 0,
        });
        entry.files += 1;
        entry.functions += index.functions_in_file(path).len();
    }

    for (caller, callees) in graph.forward_adjacency() {
        if let Some(domain) = ownership.get(caller) {
            if let Some(entry) = stats.get_mut(domain.as_str()) {
                entry.edges += callees.len();
            }
        }
    }

    stats.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{IndexLocator, ProjectIndex, INDEX_FILE_NAME};
    use std::io::Write;

    fn rules() -> DomainRules {
        DomainRules::new(
            vec![
                DomainRule {
                    pattern: "lib/csv/".into(),
                    domain: "csv".into(),
                },
                DomainRule {
                    pattern: "lib/db/".into(),
                    domain: "db".into(),
                },
                DomainRule {
                    pattern: "lib/log/".into(),
                    domain: "logging".into(),
                },
            ],
            DEFAULT_DOMAIN,
        )
    }

    fn coupling_index() -> (tempfile::TempDir, ProjectIndex) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INDEX_FILE_NAME);
        let mut file = std::fs::File::create(&path).unwrap();
        // a, b live in csv; c in db; d in logging.
        // a calls c twice, b calls c once, a calls d once.
        write!(
            file,
            r#"{{
                "f": {{
                    "src/lib/csv/reader.ts": ["ts", ["a:1", "b:20"]],
                    "src/lib/db/client.ts": ["ts", ["c:1"]],
                    "src/lib/log/logger.ts": ["ts", ["d:1"]]
                }},
                "g": [["a", "c"], ["a", "c"], ["b", "c"], ["a", "d"]]
            }}"#
        )
        .unwrap();
        let index = ProjectIndex::discover(&IndexLocator::new(dir.path())).unwrap();
        (dir, index)
    }

    #[test]
    fn test_classify_first_match_wins() {
        let r = DomainRules::new(
            vec![
                DomainRule {
                    pattern: "lib/csv/adapters/".into(),
                    domain: "adapters".into(),
                },
                DomainRule {
                    pattern: "lib/csv/".into(),
                    domain: "csv".into(),
                },
            ],
            DEFAULT_DOMAIN,
        );
        assert_eq!(r.classify("src/lib/csv/adapters/x.ts"), "adapters");
        assert_eq!(r.classify("src/lib/csv/parser.ts"), "csv");
        assert_eq!(r.classify("SRC/LIB/CSV/Parser.ts"), "csv");
        assert_eq!(r.classify("src/main.ts"), DEFAULT_DOMAIN);
    }

    #[test]
    fn test_cross_domain_distinct_coupling() {
        let (_dir, index) = coupling_index();
        let graph = CallGraph::from_edges(&index.edges());
        let report = cross_domain(&index, &graph, &rules(), "csv");

        // c called twice still counts once; d once.
        assert_eq!(report.couplings.len(), 2);
        let db = report
            .couplings
            .iter()
            .find(|c| c.from_domain == "db")
            .unwrap();
        assert_eq!(db.coupling_strength, 1);
        assert_eq!(db.functions, vec!["c"]);
        let logging = report
            .couplings
            .iter()
            .find(|c| c.from_domain == "logging")
            .unwrap();
        assert_eq!(logging.coupling_strength, 1);
        assert_eq!(report.coupling_score, 2);
    }

    #[test]
    fn test_cross_domain_no_external_deps() {
        let (_dir, index) = coupling_index();
        let graph = CallGraph::from_edges(&index.edges());
        // logging calls nothing outside itself.
        let report = cross_domain(&index, &graph, &rules(), "logging");
        assert!(report.couplings.is_empty());
        assert_eq!(report.coupling_score, 0);
    }

    #[test]
    fn test_domain_summary_counts() {
        let (_dir, index) = coupling_index();
        let graph = CallGraph::from_edges(&index.edges());
        let stats = domain_summary(&index, &graph, &rules());

        let csv = stats.iter().find(|s| s.domain == "csv").unwrap();
        assert_eq!(csv.files, 1);
        assert_eq!(csv.functions, 2);
        assert_eq!(csv.edges, 4); // raw multiplicity

        let db = stats.iter().find(|s| s.domain == "db").unwrap();
        assert_eq!(db.edges, 0);
    }
}
