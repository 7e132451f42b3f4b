//! # Edge Store
//!
//! The store collaborator the reconciler runs against, and its in-memory
//! implementation.
//!
//! All data structures use `BTreeMap` for deterministic ordering.

use crate::types::{Direction, Edge, EdgeId, EdgeType, LinksetError, MutationOp, NodeId};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// EDGESTORE TRAIT
// =============================================================================

/// The graph operations the reconciler and materializer rely on.
///
/// Every mutation is committed independently by the implementation unless
/// the caller has established a transactional scope around the call.
pub trait EdgeStore {
    /// Create a node carrying the given entity label.
    fn insert_node(&mut self, label: &str) -> Result<NodeId, LinksetError>;

    /// Check if a node exists.
    fn contains_node(&self, node: NodeId) -> Result<bool, LinksetError>;

    /// Entity label of a node, if it exists.
    fn node_label(&self, node: NodeId) -> Result<Option<String>, LinksetError>;

    /// Create one edge between `source` and `target`, oriented by `direction`.
    ///
    /// Fails with `RelationshipMutation` if either node is unknown.
    fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> Result<Edge, LinksetError>;

    /// Delete an edge. Fails with `RelationshipMutation` if it is unknown.
    fn delete_edge(&mut self, edge: &Edge) -> Result<(), LinksetError>;

    /// Edges of `edge_type` incident to `node` in `direction`, ordered by id.
    fn edges(
        &self,
        node: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> Result<Vec<Edge>, LinksetError>;

    /// Every edge incident to `node`, of any type, ordered by id.
    fn incident_edges(&self, node: NodeId) -> Result<Vec<Edge>, LinksetError>;

    /// Get the total number of edges.
    fn edge_count(&self) -> Result<usize, LinksetError>;
}

// =============================================================================
// GRAPH IMPLEMENTATION
// =============================================================================

/// In-memory property graph.
///
/// Uses `BTreeMap` exclusively for deterministic ordering.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Node storage: NodeId -> entity label
    nodes: BTreeMap<NodeId, String>,

    /// Edge storage: EdgeId -> Edge
    edges: BTreeMap<EdgeId, Edge>,

    /// Adjacency: node -> ids of edges touching it (either end)
    adjacency: BTreeMap<NodeId, BTreeSet<EdgeId>>,

    next_node_id: u64,
    next_edge_id: u64,
}

impl Graph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get all edges in deterministic order.
    pub fn all_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    fn incident(&self, node: NodeId) -> impl Iterator<Item = &Edge> + '_ {
        self.adjacency
            .get(&node)
            .into_iter()
            .flat_map(|ids| ids.iter().filter_map(|id| self.edges.get(id)))
    }
}

impl EdgeStore for Graph {
    fn insert_node(&mut self, label: &str) -> Result<NodeId, LinksetError> {
        let node = NodeId(self.next_node_id);
        self.next_node_id = self.next_node_id.saturating_add(1);
        self.nodes.insert(node, label.to_string());
        Ok(node)
    }

    fn contains_node(&self, node: NodeId) -> Result<bool, LinksetError> {
        Ok(self.nodes.contains_key(&node))
    }

    fn node_label(&self, node: NodeId) -> Result<Option<String>, LinksetError> {
        Ok(self.nodes.get(&node).cloned())
    }

    fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> Result<Edge, LinksetError> {
        for missing in [source, target] {
            if !self.nodes.contains_key(&missing) {
                return Err(LinksetError::RelationshipMutation {
                    op: MutationOp::Create,
                    node: source,
                    target,
                    reason: format!("node {} does not exist", missing),
                });
            }
        }

        let (start, end) = direction.orient(source, target);
        let edge = Edge {
            id: EdgeId(self.next_edge_id),
            start,
            end,
            edge_type: edge_type.clone(),
        };
        self.next_edge_id = self.next_edge_id.saturating_add(1);

        self.adjacency.entry(start).or_default().insert(edge.id);
        self.adjacency.entry(end).or_default().insert(edge.id);
        self.edges.insert(edge.id, edge.clone());
        Ok(edge)
    }

    fn delete_edge(&mut self, edge: &Edge) -> Result<(), LinksetError> {
        let Some(stored) = self.edges.remove(&edge.id) else {
            return Err(LinksetError::RelationshipMutation {
                op: MutationOp::Delete,
                node: edge.start,
                target: edge.end,
                reason: format!("edge {:?} does not exist", edge.id),
            });
        };
        for node in [stored.start, stored.end] {
            if let Some(ids) = self.adjacency.get_mut(&node) {
                ids.remove(&stored.id);
                if ids.is_empty() {
                    self.adjacency.remove(&node);
                }
            }
        }
        Ok(())
    }

    fn edges(
        &self,
        node: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> Result<Vec<Edge>, LinksetError> {
        Ok(self
            .incident(node)
            .filter(|e| &e.edge_type == edge_type && direction.matches(node, e.start, e.end))
            .cloned()
            .collect())
    }

    fn incident_edges(&self, node: NodeId) -> Result<Vec<Edge>, LinksetError> {
        Ok(self.incident(node).cloned().collect())
    }

    fn edge_count(&self) -> Result<usize, LinksetError> {
        Ok(self.edges.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================
