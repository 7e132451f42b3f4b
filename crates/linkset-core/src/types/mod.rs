//! # Core Type Definitions
//!
//! This module contains the data model shared by every linkset component:
//! - Graph identifiers (`NodeId`, `EdgeId`)
//! - Edge shape (`EdgeType`, `Direction`, `Edge`)
//! - Error types (`LinksetError`, `MutationOp`)
//!
//! ## Ownership
//!
//! Nodes and edges are owned by the store. This layer only ever holds their
//! identities; it never creates or destroys a node.

use crate::primitives::MAX_EDGE_TYPE_LENGTH;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// GRAPH IDENTIFIERS
// =============================================================================

/// Stable identity of a persisted vertex, issued by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Stable identity of a persisted edge, issued by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

// =============================================================================
// EDGE SHAPE
// =============================================================================

/// The type label of a relationship, e.g. `KNOWS`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EdgeType(String);

impl EdgeType {
    /// Create a new edge type.
    ///
    /// Rejects empty labels and labels longer than `MAX_EDGE_TYPE_LENGTH`.
    pub fn new(label: impl Into<String>) -> Result<Self, LinksetError> {
        let label = label.into();
        if label.is_empty() {
            return Err(LinksetError::InvalidDescriptor(
                "edge type must not be empty".to_string(),
            ));
        }
        if label.len() > MAX_EDGE_TYPE_LENGTH {
            return Err(LinksetError::InvalidDescriptor(format!(
                "edge type exceeds {} bytes",
                MAX_EDGE_TYPE_LENGTH
            )));
        }
        Ok(Self(label))
    }

    /// Get the edge type as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for EdgeType {
    type Error = LinksetError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EdgeType> for String {
    fn from(value: EdgeType) -> Self {
        value.0
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Orientation used to match and create edges relative to a source node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Edges starting at the source node.
    Outgoing,
    /// Edges ending at the source node.
    Incoming,
    /// Edges in either orientation. New edges are written outgoing.
    Both,
}

impl Direction {
    /// Does an edge `start -> end` match this direction relative to `node`?
    #[must_use]
    pub fn matches(self, node: NodeId, start: NodeId, end: NodeId) -> bool {
        match self {
            Self::Outgoing => start == node,
            Self::Incoming => end == node,
            Self::Both => start == node || end == node,
        }
    }

    /// Orient a new edge between `source` and `target` as `(start, end)`.
    #[must_use]
    pub const fn orient(self, source: NodeId, target: NodeId) -> (NodeId, NodeId) {
        match self {
            Self::Incoming => (target, source),
            Self::Outgoing | Self::Both => (source, target),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Outgoing => "outgoing",
            Self::Incoming => "incoming",
            Self::Both => "both",
        };
        f.write_str(s)
    }
}

/// A typed, directed edge as stored: `start -[edge_type]-> end`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub start: NodeId,
    pub end: NodeId,
    pub edge_type: EdgeType,
}

impl Edge {
    /// The node at the opposite end from `node`.
    ///
    /// For a self-loop this is `node` itself.
    #[must_use]
    pub fn other_node(&self, node: NodeId) -> NodeId {
        if self.start == node { self.end } else { self.start }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// The store mutation that was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOp {
    Create,
    Delete,
}

impl fmt::Display for MutationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create => f.write_str("create"),
            Self::Delete => f.write_str("delete"),
        }
    }
}

/// Errors that can occur while reading or reconciling a relationship field.
///
/// Nothing here is recovered locally. A failed write leaves whatever prefix
/// of deletes and creates already completed.
#[derive(Debug, Error)]
pub enum LinksetError {
    /// An element of the desired collection has no backing node.
    #[error("Entity is not bound to a node: {0}")]
    UnboundEntity(String),

    /// The store rejected an edge creation or deletion.
    #[error("Failed to {op} relationship {node} -> {target}: {reason}")]
    RelationshipMutation {
        op: MutationOp,
        node: NodeId,
        target: NodeId,
        reason: String,
    },

    /// A write reached a field declared read-only.
    #[error("Field is read-only: {0}")]
    ReadOnlyField(String),

    /// The requested node was not found in the store.
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// The requested edge was not found in the store.
    #[error("Edge not found: {0:?}")]
    EdgeNotFound(EdgeId),

    /// A relationship declaration is malformed.
    #[error("Invalid relationship descriptor: {0}")]
    InvalidDescriptor(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A configuration file could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_type_rejects_empty() {
        assert!(matches!(
            EdgeType::new(""),
            Err(LinksetError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn edge_type_rejects_oversized() {
        let long = "X".repeat(MAX_EDGE_TYPE_LENGTH + 1);
        assert!(EdgeType::new(long).is_err());
        assert!(EdgeType::new("X".repeat(MAX_EDGE_TYPE_LENGTH)).is_ok());
    }

    #[test]
    fn direction_matching() {
        let (a, b) = (NodeId(1), NodeId(2));
        assert!(Direction::Outgoing.matches(a, a, b));
        assert!(!Direction::Outgoing.matches(b, a, b));
        assert!(Direction::Incoming.matches(b, a, b));
        assert!(!Direction::Incoming.matches(a, a, b));
        assert!(Direction::Both.matches(a, a, b));
        assert!(Direction::Both.matches(b, a, b));
        assert!(!Direction::Both.matches(NodeId(3), a, b));
    }

    #[test]
    fn direction_orientation() {
        let (s, t) = (NodeId(1), NodeId(2));
        assert_eq!(Direction::Outgoing.orient(s, t), (s, t));
        assert_eq!(Direction::Incoming.orient(s, t), (t, s));
        assert_eq!(Direction::Both.orient(s, t), (s, t));
    }

    #[test]
    fn other_node_handles_both_ends_and_loops() {
        let edge_type = EdgeType::new("KNOWS").expect("type");
        let edge = Edge {
            id: EdgeId(0),
            start: NodeId(1),
            end: NodeId(2),
            edge_type: edge_type.clone(),
        };
        assert_eq!(edge.other_node(NodeId(1)), NodeId(2));
        assert_eq!(edge.other_node(NodeId(2)), NodeId(1));

        let looped = Edge {
            id: EdgeId(1),
            start: NodeId(5),
            end: NodeId(5),
            edge_type,
        };
        assert_eq!(looped.other_node(NodeId(5)), NodeId(5));
    }

    #[test]
    fn mutation_error_message() {
        let err = LinksetError::RelationshipMutation {
            op: MutationOp::Delete,
            node: NodeId(1),
            target: NodeId(2),
            reason: "edge vanished".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to delete relationship #1 -> #2: edge vanished"
        );
    }
}
