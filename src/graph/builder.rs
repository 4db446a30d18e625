//! Graph builder — derives the in-memory call graph from the edge list.
//!
//! The graph is rebuilt from the index on every invocation; there is no
//! cache or incremental update. Duplicate edges are kept as parallel edges
//! so ranking sees raw multiplicity, while traversals de-duplicate through
//! their visited sets.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::debug;

use crate::index::CallEdge;

/// The caller→callee graph for one query run. Nodes are function names;
/// an edge caller→callee exists per recorded call.
pub struct CallGraph {
    graph: DiGraph<String, ()>,
    node_index: HashMap<String, NodeIndex>,
}

impl CallGraph {
    /// Build the graph from well-formed edges. Pure function of its input:
    /// node order follows first appearance in the edge list.
    pub fn from_edges(edges: &[CallEdge]) -> Self {
        let mut cg = Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        };
        for edge in edges {
            let caller = cg.intern(&edge.caller);
            let callee = cg.intern(&edge.callee);
            cg.graph.add_edge(caller, callee, ());
        }
        debug!(
            nodes = cg.graph.node_count(),
            edges = cg.graph.edge_count(),
            "call graph built"
        );
        cg
    }

    fn intern(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_index.insert(name.to_string(), idx);
        idx
    }

    /// Look up a function's node. Absence simply means the index recorded
    /// no call touching it — valid information, not an error.
    pub fn node(&self, name: &str) -> Option<NodeIndex> {
        self.node_index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    pub fn name(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in first-appearance order.
    pub(crate) fn nodes(&self) -> impl Iterator<Item = NodeIndex> {
        self.graph.node_indices()
    }

    pub(crate) fn neighbors_out(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Outgoing)
    }

    pub(crate) fn neighbors_in(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.neighbors_directed(idx, Direction::Incoming)
    }

    /// Raw number of incoming call edges, duplicates included.
    pub fn incoming_count(&self, idx: NodeIndex) -> usize {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .count()
    }

    fn outgoing_count(&self, idx: NodeIndex) -> usize {
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .count()
    }

    /// Entry points: functions that call others but are themselves never
    /// called — the graph's sources.
    pub fn entry_points(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .filter(|&idx| self.incoming_count(idx) == 0 && self.outgoing_count(idx) > 0)
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// Caller → callees map view, duplicates included. Summing all list
    /// lengths gives the number of well-formed edges.
    pub fn forward_adjacency(&self) -> HashMap<&str, Vec<&str>> {
        self.adjacency(Direction::Outgoing)
    }

    /// Callee → callers map view, duplicates included.
    pub fn reverse_adjacency(&self) -> HashMap<&str, Vec<&str>> {
        self.adjacency(Direction::Incoming)
    }

    fn adjacency(&self, dir: Direction) -> HashMap<&str, Vec<&str>> {
        let mut map: HashMap<&str, Vec<&str>> = HashMap::new();
        for idx in self.graph.node_indices() {
            let neighbors: Vec<&str> = self
                .graph
                .neighbors_directed(idx, dir)
                .map(|n| self.graph[n].as_str())
                .collect();
            if !neighbors.is_empty() {
                map.insert(self.graph[idx].as_str(), neighbors);
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(pairs: &[(&str, &str)]) -> Vec<CallEdge> {
        pairs
            .iter()
            .map(|(a, b)| CallEdge::new(*a, *b))
            .collect()
    }

    #[test]
    fn test_empty_graph() {
        let graph = CallGraph::from_edges(&[]);
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.entry_points().is_empty());
    }

    #[test]
    fn test_duplicate_edges_kept() {
        let graph = CallGraph::from_edges(&edges(&[("a", "b"), ("a", "b")]));
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 2);
        let b = graph.node("b").unwrap();
        assert_eq!(graph.incoming_count(b), 2);
    }

    #[test]
    fn test_adjacency_round_trip() {
        let graph = CallGraph::from_edges(&edges(&[
            ("a", "b"),
            ("b", "c"),
            ("a", "c"),
            ("a", "c"), // duplicate on purpose
        ]));

        let forward: usize = graph.forward_adjacency().values().map(Vec::len).sum();
        let reverse: usize = graph.reverse_adjacency().values().map(Vec::len).sum();
        assert_eq!(forward, 4);
        assert_eq!(reverse, 4);
        assert_eq!(forward, graph.edge_count());
    }

    #[test]
    fn test_entry_points() {
        // a and d call into the graph but are never called themselves.
        let graph = CallGraph::from_edges(&edges(&[("a", "b"), ("b", "c"), ("d", "b")]));
        let mut entries = graph.entry_points();
        entries.sort_unstable();
        assert_eq!(entries, vec!["a", "d"]);
    }
}
