//! Traversal engine — the algorithms behind every query.
//!
//! All operations here are pure functions of the graph and their
//! parameters; nothing mutates shared state. Reachability traversals
//! de-duplicate through visited sets, while the hotspot ranking counts raw
//! edge multiplicity — a deliberate asymmetry inherited from the index
//! format, preserved rather than unified.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::NodeIndex;
use tracing::debug;

use super::builder::CallGraph;
use super::types::{CallStack, CallerHit, CallerKind, Cycle, Hotspot};
use crate::error::{NavError, Result};
use crate::index::{FunctionDecl, ProjectIndex};

/// How far a declared line may sit from the requested line and still
/// resolve during trace-to-error.
pub const LINE_TOLERANCE: usize = 50;

/// Default cap on emitted call stacks for trace-to-error.
pub const MAX_CALL_STACKS: usize = 10;

impl CallGraph {
    /// Blast radius: every function that transitively calls `target`,
    /// discovered by reverse BFS.
    ///
    /// Depths are assigned in discovery order (1 = direct caller), so they
    /// are monotonically non-decreasing across the result list. Nodes past
    /// `max_depth` are not expanded at all. Once `max_results` hits, the
    /// traversal halts — since BFS order is queue order, truncation yields
    /// a deterministic nearest-first prefix. The target itself is never a
    /// result, and a target absent from the graph yields an empty result
    /// set: no known callers is valid information, not an error.
    pub fn blast_radius(
        &self,
        target: &str,
        max_depth: Option<usize>,
        max_results: usize,
    ) -> Vec<CallerHit> {
        let mut results = Vec::new();
        let Some(start) = self.node(target) else {
            return results;
        };

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();
        queue.push_back((start, 0));

        while results.len() < max_results {
            let Some((idx, depth)) = queue.pop_front() else {
                break;
            };
            if max_depth.is_some_and(|max| depth > max) {
                continue;
            }
            if !visited.insert(idx) {
                continue;
            }
            if idx != start {
                results.push(CallerHit {
                    function: self.name(idx).to_string(),
                    depth,
                    kind: if depth == 1 {
                        CallerKind::Direct
                    } else {
                        CallerKind::Transitive
                    },
                });
            }
            for caller in self.in_neighbors_ordered(idx) {
                if !visited.contains(&caller) {
                    queue.push_back((caller, depth + 1));
                }
            }
        }

        debug!(target, total = results.len(), "blast radius computed");
        results
    }

    /// Cycle detection: DFS over every node once, with an explicit
    /// ancestor stack. Revisiting a node already on the stack closes a
    /// cycle — the stack slice from its first occurrence, plus the node
    /// again — and the walk does not descend past that edge.
    ///
    /// A global visited set prevents re-exploring subgraphs already
    /// processed from an earlier root, so the reported set is
    /// traversal-order-dependent: self-consistent, but NOT the canonical
    /// list of all elementary cycles when cycles share structure. Good
    /// enough for a linting aid over near-acyclic code graphs.
    pub fn find_cycles(&self) -> Vec<Cycle> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut cycles = Vec::new();

        for root in self.nodes() {
            if visited.contains(&root) {
                continue;
            }
            visited.insert(root);

            let mut ancestors: Vec<NodeIndex> = vec![root];
            let mut on_stack: HashSet<NodeIndex> = HashSet::from([root]);
            let mut frames = vec![self.out_neighbors_ordered(root).into_iter()];

            while let Some(frame) = frames.last_mut() {
                match frame.next() {
                    Some(next) if on_stack.contains(&next) => {
                        if let Some(pos) = ancestors.iter().position(|&n| n == next) {
                            let mut cycle: Vec<String> = ancestors[pos..]
                                .iter()
                                .map(|&n| self.name(n).to_string())
                                .collect();
                            cycle.push(self.name(next).to_string());
                            let length = cycle.len() - 1;
                            cycles.push(Cycle { cycle, length });
                        }
                    }
                    Some(next) if !visited.contains(&next) => {
                        visited.insert(next);
                        ancestors.push(next);
                        on_stack.insert(next);
                        frames.push(self.out_neighbors_ordered(next).into_iter());
                    }
                    Some(_) => {}
                    None => {
                        frames.pop();
                        if let Some(done) = ancestors.pop() {
                            on_stack.remove(&done);
                        }
                    }
                }
            }
        }

        debug!(total = cycles.len(), "cycle detection finished");
        cycles
    }

    /// Direct callers of `target`, de-duplicated, in first-seen edge order.
    pub fn direct_callers(&self, target: &str) -> Vec<String> {
        self.direct_neighbors(target, true)
    }

    /// Direct callees of `target`, de-duplicated, in first-seen edge order.
    pub fn direct_callees(&self, target: &str) -> Vec<String> {
        self.direct_neighbors(target, false)
    }

    fn direct_neighbors(&self, target: &str, incoming: bool) -> Vec<String> {
        let Some(idx) = self.node(target) else {
            return Vec::new();
        };
        let neighbors = if incoming {
            self.in_neighbors_ordered(idx)
        } else {
            self.out_neighbors_ordered(idx)
        };
        let mut seen = HashSet::new();
        neighbors
            .into_iter()
            .filter(|n| seen.insert(*n))
            .map(|n| self.name(n).to_string())
            .collect()
    }

    /// Top-N functions by raw incoming-edge count, descending; ties break
    /// by name order so rankings are deterministic.
    pub fn hotspots(&self, limit: usize) -> Vec<Hotspot> {
        let mut ranked: Vec<Hotspot> = self
            .nodes()
            .filter_map(|idx| {
                let callers = self.incoming_count(idx);
                (callers > 0).then(|| Hotspot {
                    function: self.name(idx).to_string(),
                    callers,
                })
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.callers
                .cmp(&a.callers)
                .then_with(|| a.function.cmp(&b.function))
        });
        ranked.truncate(limit);
        ranked
    }

    /// Declared functions with no incoming call edge. A candidate list, not
    /// a proof: dynamic dispatch, reflection, and entry points invoked from
    /// outside the index all look "dead" here. Requires human confirmation.
    pub fn dead_code(&self, declared: &[FunctionDecl]) -> Vec<FunctionDecl> {
        declared
            .iter()
            .filter(|decl| {
                self.node(&decl.name)
                    .map_or(true, |idx| self.incoming_count(idx) == 0)
            })
            .cloned()
            .collect()
    }

    /// All call paths from entry points down to `target`, found by reverse
    /// BFS that accumulates the path walked. Whenever the frontier reaches
    /// an entry point (a function that calls others but is never called),
    /// the accumulated path is emitted entry-point-first, target-last.
    ///
    /// Emission is capped at `max_stacks` to bound output. The global
    /// visited set prevents re-walking shared suffixes, which also means
    /// only the first discovered path through any shared node is reported —
    /// an accepted precision/cost trade-off.
    pub fn call_stacks_to(&self, target: &str, max_stacks: usize) -> Vec<CallStack> {
        let mut stacks = Vec::new();
        let Some(start) = self.node(target) else {
            return stacks;
        };

        let entry_points: HashSet<NodeIndex> = self
            .nodes()
            .filter(|&idx| {
                self.incoming_count(idx) == 0 && self.out_neighbors_ordered(idx).first().is_some()
            })
            .collect();

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut queue: VecDeque<Vec<NodeIndex>> = VecDeque::new();
        queue.push_back(vec![start]);

        while stacks.len() < max_stacks {
            let Some(path) = queue.pop_front() else {
                break;
            };
            let Some(&current) = path.last() else {
                continue;
            };

            if entry_points.contains(&current) {
                let named: Vec<String> = path
                    .iter()
                    .rev()
                    .map(|&n| self.name(n).to_string())
                    .collect();
                stacks.push(CallStack {
                    entry_point: named[0].clone(),
                    depth: named.len() - 1,
                    path: named,
                });
                continue;
            }

            if !visited.insert(current) {
                continue;
            }

            for caller in self.in_neighbors_ordered(current) {
                let mut extended = path.clone();
                extended.push(caller);
                queue.push_back(extended);
            }
        }

        stacks
    }

    /// Outgoing neighbors in edge-insertion order. petgraph iterates edges
    /// newest-first, so reverse to keep traversal order aligned with the
    /// edge list.
    fn out_neighbors_ordered(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut v: Vec<NodeIndex> = self.neighbors_out(idx).collect();
        v.reverse();
        v
    }

    fn in_neighbors_ordered(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut v: Vec<NodeIndex> = self.neighbors_in(idx).collect();
        v.reverse();
        v
    }
}

/// Resolve which declared function sits at `file:line`.
///
/// The file spec is matched as a normalized (lowercase, forward-slash)
/// substring against every indexed path, so partial paths like
/// `csv/parser.ts` work. Among matching files, the declaration whose line
/// lies within [`LINE_TOLERANCE`] of the requested line and closest to it
/// wins. No declaration in range is a hard `NoFunctionAtLocation` error.
pub fn resolve_function_at(index: &ProjectIndex, file: &str, line: usize) -> Result<FunctionDecl> {
    let target = normalize_path(file);

    let mut best: Option<(usize, FunctionDecl)> = None;
    for path in index.file_paths() {
        let normalized = normalize_path(path);
        if !normalized.contains(&target) {
            continue;
        }
        for decl in index.functions_in_file(path) {
            let distance = decl.line.abs_diff(line);
            if distance > LINE_TOLERANCE {
                continue;
            }
            let closer = best
                .as_ref()
                .map_or(true, |(best_distance, _)| distance < *best_distance);
            if closer {
                best = Some((distance, decl));
            }
        }
    }

    best.map(|(_, decl)| decl)
        .ok_or_else(|| NavError::NoFunctionAtLocation {
            file: file.to_string(),
            line,
        })
}

fn normalize_path(path: &str) -> String {
    path.replace('\\', "/").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{CallEdge, IndexLocator, ProjectIndex, INDEX_FILE_NAME};
    use std::io::Write;

    fn graph(pairs: &[(&str, &str)]) -> CallGraph {
        let edges: Vec<CallEdge> = pairs
            .iter()
            .map(|(a, b)| CallEdge::new(*a, *b))
            .collect();
        CallGraph::from_edges(&edges)
    }

    // ─── Blast Radius ────────────────────────────────────────────

    #[test]
    fn test_blast_radius_unknown_target_is_empty() {
        let g = graph(&[("a", "b")]);
        assert!(g.blast_radius("missing", None, 100).is_empty());
    }

    #[test]
    fn test_blast_radius_excludes_target_and_assigns_depth() {
        // c -> b -> a, d -> a
        let g = graph(&[("c", "b"), ("b", "a"), ("d", "a")]);
        let hits = g.blast_radius("a", None, 100);

        assert!(hits.iter().all(|h| h.function != "a"));
        let b = hits.iter().find(|h| h.function == "b").unwrap();
        assert_eq!(b.depth, 1);
        assert_eq!(b.kind, CallerKind::Direct);
        let c = hits.iter().find(|h| h.function == "c").unwrap();
        assert_eq!(c.depth, 2);
        assert_eq!(c.kind, CallerKind::Transitive);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_blast_radius_depth_monotonic_in_discovery_order() {
        let g = graph(&[("d", "c"), ("c", "b"), ("b", "a"), ("e", "a"), ("f", "b")]);
        let hits = g.blast_radius("a", None, 100);
        for pair in hits.windows(2) {
            assert!(pair[0].depth <= pair[1].depth);
        }
    }

    #[test]
    fn test_blast_radius_max_depth_stops_expansion() {
        let g = graph(&[("d", "c"), ("c", "b"), ("b", "a")]);
        let hits = g.blast_radius("a", Some(2), 100);
        assert!(hits.iter().all(|h| h.depth <= 2));
        assert!(!hits.iter().any(|h| h.function == "d"));
    }

    #[test]
    fn test_blast_radius_max_results_is_nearest_first_prefix() {
        let g = graph(&[("b", "a"), ("c", "a"), ("d", "b"), ("e", "b")]);
        let hits = g.blast_radius("a", None, 2);
        assert_eq!(hits.len(), 2);
        // Queue-order truncation: direct callers come before transitive.
        assert!(hits.iter().all(|h| h.depth == 1));
    }

    #[test]
    fn test_blast_radius_cycle_terminates() {
        let g = graph(&[("a", "b"), ("b", "a")]);
        let hits = g.blast_radius("a", None, 100);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].function, "b");
    }

    // ─── Cycles ──────────────────────────────────────────────────

    #[test]
    fn test_cycles_acyclic_graph() {
        let g = graph(&[("a", "b"), ("b", "c")]);
        assert!(g.find_cycles().is_empty());
    }

    #[test]
    fn test_cycles_triangle() {
        let g = graph(&[("a", "b"), ("b", "c"), ("c", "a")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].length, 3);
        assert_eq!(cycles[0].cycle, vec!["a", "b", "c", "a"]);
    }

    #[test]
    fn test_cycles_self_loop() {
        let g = graph(&[("a", "a")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].length, 1);
        assert_eq!(cycles[0].cycle, vec!["a", "a"]);
    }

    // ─── Hotspots / Dead Code ────────────────────────────────────

    #[test]
    fn test_hotspots_ranking_and_limit() {
        let g = graph(&[("a", "z"), ("b", "z"), ("c", "z"), ("a", "y")]);
        let top = g.hotspots(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].function, "z");
        assert_eq!(top[0].callers, 3);
        assert_eq!(top[1].function, "y");
        assert_eq!(top[1].callers, 1);
    }

    #[test]
    fn test_hotspots_count_raw_multiplicity() {
        let g = graph(&[("a", "z"), ("a", "z"), ("b", "y")]);
        let top = g.hotspots(10);
        assert_eq!(top[0].function, "z");
        assert_eq!(top[0].callers, 2);
    }

    #[test]
    fn test_hotspots_ties_break_by_name() {
        let g = graph(&[("a", "z"), ("b", "y")]);
        let top = g.hotspots(10);
        assert_eq!(top[0].function, "y");
        assert_eq!(top[1].function, "z");
    }

    #[test]
    fn test_dead_code_zero_indegree() {
        let g = graph(&[("a", "b"), ("b", "c")]);
        let declared: Vec<FunctionDecl> = ["a", "b", "c", "d"]
            .iter()
            .enumerate()
            .map(|(i, name)| FunctionDecl {
                name: name.to_string(),
                file: "src/x.rs".to_string(),
                line: i + 1,
            })
            .collect();

        let dead = g.dead_code(&declared);
        let names: Vec<&str> = dead.iter().map(|d| d.name.as_str()).collect();
        // `a` is a legitimate entry point and still qualifies — documented
        // heuristic limitation, not a bug.
        assert_eq!(names, vec!["a", "d"]);
    }

    // ─── Call Stacks ─────────────────────────────────────────────

    #[test]
    fn test_call_stacks_entry_first_target_last() {
        // main -> handle -> parse
        let g = graph(&[("main", "handle"), ("handle", "parse")]);
        let stacks = g.call_stacks_to("parse", MAX_CALL_STACKS);
        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0].entry_point, "main");
        assert_eq!(stacks[0].path, vec!["main", "handle", "parse"]);
        assert_eq!(stacks[0].depth, 2);
    }

    #[test]
    fn test_call_stacks_capped() {
        // Many entry points into the same target.
        let g = graph(&[
            ("e1", "t"),
            ("e2", "t"),
            ("e3", "t"),
            ("e4", "t"),
        ]);
        let stacks = g.call_stacks_to("t", 2);
        assert_eq!(stacks.len(), 2);
    }

    #[test]
    fn test_call_stacks_unknown_target() {
        let g = graph(&[("a", "b")]);
        assert!(g.call_stacks_to("nope", MAX_CALL_STACKS).is_empty());
    }

    // ─── Trace Resolution ────────────────────────────────────────

    fn sample_index() -> (tempfile::TempDir, ProjectIndex) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(INDEX_FILE_NAME);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "f": {{
                    "src/lib/csv/Parser.ts": ["ts", ["parseDate:100:fn", "parseRow:30:fn"]]
                }},
                "g": []
            }}"#
        )
        .unwrap();
        let locator = IndexLocator::new(dir.path());
        let index = ProjectIndex::discover(&locator).unwrap();
        (dir, index)
    }

    #[test]
    fn test_resolve_within_tolerance() {
        let (_dir, index) = sample_index();
        let decl = resolve_function_at(&index, "csv/parser.ts", 120).unwrap();
        assert_eq!(decl.name, "parseDate");
    }

    #[test]
    fn test_resolve_prefers_closest() {
        let (_dir, index) = sample_index();
        // Line 60 is within 50 of both declarations; parseRow (30) is closer.
        let decl = resolve_function_at(&index, "parser.ts", 60).unwrap();
        assert_eq!(decl.name, "parseRow");
    }

    #[test]
    fn test_resolve_out_of_tolerance() {
        let (_dir, index) = sample_index();
        let err = resolve_function_at(&index, "parser.ts", 200).unwrap_err();
        assert!(matches!(err, NavError::NoFunctionAtLocation { .. }));
    }

    #[test]
    fn test_resolve_unknown_file() {
        let (_dir, index) = sample_index();
        let err = resolve_function_at(&index, "nosuch.ts", 10).unwrap_err();
        assert!(matches!(err, NavError::NoFunctionAtLocation { .. }));
    }
}
