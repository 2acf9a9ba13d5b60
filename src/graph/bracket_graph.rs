//! BracketGraph - parent → child topology of one bracket.
//!
//! Stores resolved edges in petgraph's StableGraph. Node weights are the match
//! ids; edge weights record which slot of the child the parent feeds. Layout
//! placeholders are ordinary nodes flagged in a side set, so a stored match
//! keeps its identity whatever the sign of its id.

use std::collections::{HashMap, HashSet};

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::{Directed, Direction};

use crate::model::{Edge, MatchId, Outcome, Slot};

/// Edge weight: the child slot fed and the parent result that feeds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feed {
    pub slot: Slot,
    pub outcome: Outcome,
}

/// Directed dependency graph over match ids.
pub struct BracketGraph {
    /// Nodes store their MatchId, edges store the fed slot.
    graph: StableGraph<MatchId, Feed, Directed>,

    /// Map from MatchId to petgraph NodeIndex
    index_of: HashMap<MatchId, NodeIndex>,

    /// Nodes added with `add_stub`.
    stubs: HashSet<MatchId>,
}

impl BracketGraph {
    pub fn new() -> Self {
        Self {
            graph: StableGraph::new(),
            index_of: HashMap::new(),
            stubs: HashSet::new(),
        }
    }

    pub fn with_capacity(match_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(match_capacity, edge_capacity),
            index_of: HashMap::with_capacity(match_capacity),
            stubs: HashSet::new(),
        }
    }

    /// Build a graph from stored match ids, placeholder ids and the edges
    /// between them.
    ///
    /// Edges naming an id outside both sets are skipped.
    pub fn from_parts(matches: &[MatchId], stubs: &[MatchId], edges: &[Edge]) -> Self {
        let mut graph = Self::with_capacity(matches.len() + stubs.len(), edges.len());
        for &id in matches {
            graph.add_match(id);
        }
        for &id in stubs {
            graph.add_stub(id);
        }
        for edge in edges {
            graph.add_edge(edge.from, edge.to, edge.slot, edge.outcome);
        }
        graph
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a match. Returns false if it was already present.
    pub fn add_match(&mut self, id: MatchId) -> bool {
        if self.index_of.contains_key(&id) {
            return false;
        }
        let index = self.graph.add_node(id);
        self.index_of.insert(id, index);
        true
    }

    /// Add a layout placeholder. Returns false if the id is already present.
    pub fn add_stub(&mut self, id: MatchId) -> bool {
        let added = self.add_match(id);
        if added {
            self.stubs.insert(id);
        }
        added
    }

    /// True for layout placeholders present in the graph.
    pub fn is_stub(&self, id: MatchId) -> bool {
        self.stubs.contains(&id)
    }

    pub fn match_count(&self) -> usize {
        self.graph.node_count()
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add a parent → child edge. Returns false if either end is missing.
    pub fn add_edge(&mut self, from: MatchId, to: MatchId, slot: Slot, outcome: Outcome) -> bool {
        let (Some(&source), Some(&target)) = (self.index_of.get(&from), self.index_of.get(&to)) else {
            return false;
        };
        self.graph.add_edge(source, target, Feed { slot, outcome });
        true
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All edges as plain records.
    pub fn edges(&self) -> Vec<Edge> {
        self.graph
            .edge_references()
            .filter_map(|e| {
                Some(Edge {
                    from: *self.graph.node_weight(e.source())?,
                    to: *self.graph.node_weight(e.target())?,
                    slot: e.weight().slot,
                    outcome: e.weight().outcome,
                })
            })
            .collect()
    }

    /// Parents of `id` with the slot each feeds, slot A first.
    pub fn parents(&self, id: MatchId) -> Vec<(Slot, MatchId)> {
        let Some(&index) = self.index_of.get(&id) else {
            return Vec::new();
        };
        let mut parents: Vec<(Slot, MatchId)> = self
            .graph
            .edges_directed(index, Direction::Incoming)
            .filter_map(|e| Some((e.weight().slot, *self.graph.node_weight(e.source())?)))
            .collect();
        parents.sort_by_key(|&(slot, _)| slot == Slot::B);
        parents
    }

    /// Matches that `id` feeds.
    pub fn children(&self, id: MatchId) -> Vec<MatchId> {
        self.index_of
            .get(&id)
            .map(|&index| {
                self.graph
                    .neighbors_directed(index, Direction::Outgoing)
                    .filter_map(|n| self.graph.node_weight(n).copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Edges whose endpoints are both stored matches.
    pub fn real_edges(&self) -> Vec<Edge> {
        self.edges()
            .into_iter()
            .filter(|e| !self.is_stub(e.from) && !self.is_stub(e.to))
            .collect()
    }
}

impl Default for BracketGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: i32, to: i32, slot: Slot) -> Edge {
        Edge {
            from: MatchId(from),
            to: MatchId(to),
            slot,
            outcome: Outcome::Win,
        }
    }

    fn ids<const N: usize>(raw: [i32; N]) -> Vec<MatchId> {
        raw.map(MatchId).to_vec()
    }

    #[test]
    fn test_from_parts() {
        let graph = BracketGraph::from_parts(
            &ids([1, 2, 3]),
            &[],
            &[edge(1, 3, Slot::A), edge(2, 3, Slot::B), edge(9, 3, Slot::A)],
        );

        assert_eq!(graph.match_count(), 3);
        assert_eq!(graph.edge_count(), 2, "edge from unknown match skipped");
    }

    #[test]
    fn test_parents_sorted_by_slot() {
        let graph = BracketGraph::from_parts(&ids([1, 2, 3]), &[], &[edge(2, 3, Slot::B), edge(1, 3, Slot::A)]);

        assert_eq!(graph.parents(MatchId(3)), vec![(Slot::A, MatchId(1)), (Slot::B, MatchId(2))]);
        assert_eq!(graph.children(MatchId(1)), vec![MatchId(3)]);
        assert!(graph.parents(MatchId(42)).is_empty());
        assert!(graph.children(MatchId(3)).is_empty());
    }

    #[test]
    fn test_duplicate_match_rejected() {
        let mut graph = BracketGraph::new();
        assert!(graph.add_match(MatchId(1)));
        assert!(!graph.add_match(MatchId(1)));
        assert!(!graph.add_stub(MatchId(1)), "stored match cannot become a stub");
        assert!(!graph.is_stub(MatchId(1)));
        assert_eq!(graph.match_count(), 1);
    }

    #[test]
    fn test_real_edges_skip_stubs() {
        let graph = BracketGraph::from_parts(
            &ids([2, 3]),
            &ids([-1]),
            &[edge(-1, 3, Slot::A), edge(2, 3, Slot::B)],
        );

        let real = graph.real_edges();
        assert!(graph.is_stub(MatchId(-1)));
        assert!(!graph.is_stub(MatchId(2)));
        assert_eq!(real.len(), 1);
        assert_eq!(real[0].from, MatchId(2));
    }

    #[test]
    fn test_negative_stored_id_is_not_a_stub() {
        let graph = BracketGraph::from_parts(
            &ids([-1, 5]),
            &ids([-2]),
            &[edge(-1, 5, Slot::A), edge(-2, 5, Slot::B)],
        );

        assert!(!graph.is_stub(MatchId(-1)));
        assert!(graph.is_stub(MatchId(-2)));
        assert_eq!(graph.real_edges(), vec![edge(-1, 5, Slot::A)]);
    }
}
