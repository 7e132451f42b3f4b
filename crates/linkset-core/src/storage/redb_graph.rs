//! # redb-backed Edge Store
//!
//! A disk-backed `EdgeStore` using the redb embedded database.
//!
//! Every mutation runs in its own write transaction and is committed before
//! the call returns. A reconciliation that fails midway therefore leaves the
//! already-committed prefix in place, which is the documented behavior when
//! the caller holds no transactional scope of its own.
//!
//! ## Layout
//!
//! - `nodes`: node id -> entity label
//! - `edges`: edge id -> postcard-encoded `EdgeRecord`
//! - `adjacency`: (node id, edge id) -> other node id, one row per endpoint
//! - `metadata`: id counters and the record format version

use crate::graph::EdgeStore;
use crate::primitives::FORMAT_VERSION;
use crate::types::{Direction, Edge, EdgeId, EdgeType, LinksetError, MutationOp, NodeId};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Table for nodes: NodeId(u64) -> entity label
const NODES: TableDefinition<u64, &str> = TableDefinition::new("nodes");

/// Table for edges: EdgeId(u64) -> serialized EdgeRecord bytes
const EDGES: TableDefinition<u64, &[u8]> = TableDefinition::new("edges");

/// Table for adjacency: (node_id, edge_id) -> other end node_id
/// Keyed by node first so a range scan yields a node's edges in id order.
const ADJACENCY: TableDefinition<(u64, u64), u64> = TableDefinition::new("adjacency");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_NODE_ID: &str = "next_node_id";
const NEXT_EDGE_ID: &str = "next_edge_id";
const FORMAT_KEY: &str = "format_version";

/// Stored form of an edge; the id is the table key.
#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    start: NodeId,
    end: NodeId,
    edge_type: EdgeType,
}

impl EdgeRecord {
    fn into_edge(self, id: u64) -> Edge {
        Edge {
            id: EdgeId(id),
            start: self.start,
            end: self.end,
            edge_type: self.edge_type,
        }
    }
}

fn io_err(e: impl std::fmt::Display) -> LinksetError {
    LinksetError::IoError(e.to_string())
}

fn decode(bytes: &[u8]) -> Result<EdgeRecord, LinksetError> {
    postcard::from_bytes(bytes).map_err(|e| LinksetError::SerializationError(e.to_string()))
}

/// A disk-backed edge store using redb.
pub struct RedbGraph {
    /// The redb database handle.
    db: Database,
}

impl std::fmt::Debug for RedbGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbGraph").finish_non_exhaustive()
    }
}

impl RedbGraph {
    /// Open or create an edge store at the given path.
    ///
    /// Refuses databases written with a different record format version.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LinksetError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        let write_txn = db.begin_write().map_err(io_err)?;
        {
            let _ = write_txn.open_table(NODES).map_err(io_err)?;
            let _ = write_txn.open_table(EDGES).map_err(io_err)?;
            let _ = write_txn.open_table(ADJACENCY).map_err(io_err)?;
            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;

            let stored = meta.get(FORMAT_KEY).map_err(io_err)?.map(|v| v.value());
            match stored {
                None => {
                    meta.insert(FORMAT_KEY, u64::from(FORMAT_VERSION))
                        .map_err(io_err)?;
                }
                Some(version) if version == u64::from(FORMAT_VERSION) => {}
                Some(version) => {
                    return Err(LinksetError::SerializationError(format!(
                        "unsupported format version {} (expected {})",
                        version, FORMAT_VERSION
                    )));
                }
            }
        }
        write_txn.commit().map_err(io_err)?;

        tracing::debug!(path = %path.as_ref().display(), "opened redb edge store");
        Ok(Self { db })
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), LinksetError> {
        self.db.compact().map_err(io_err)?;
        Ok(())
    }

    /// Get the total number of nodes.
    pub fn node_count(&self) -> Result<usize, LinksetError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(NODES).map_err(io_err)?;
        Ok(table.len().map_err(io_err)? as usize)
    }

    fn create_edge_txn(
        &self,
        source: NodeId,
        target: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> Result<Edge, LinksetError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let edge = {
            let nodes = write_txn.open_table(NODES).map_err(io_err)?;
            for node in [source, target] {
                if nodes.get(node.0).map_err(io_err)?.is_none() {
                    return Err(LinksetError::RelationshipMutation {
                        op: MutationOp::Create,
                        node: source,
                        target,
                        reason: format!("node {} does not exist", node),
                    });
                }
            }

            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
            let id = meta
                .get(NEXT_EDGE_ID)
                .map_err(io_err)?
                .map(|v| v.value())
                .unwrap_or(0);
            meta.insert(NEXT_EDGE_ID, id.saturating_add(1))
                .map_err(io_err)?;

            let (start, end) = direction.orient(source, target);
            let record = EdgeRecord {
                start,
                end,
                edge_type: edge_type.clone(),
            };
            let bytes = postcard::to_allocvec(&record)
                .map_err(|e| LinksetError::SerializationError(e.to_string()))?;

            let mut edges = write_txn.open_table(EDGES).map_err(io_err)?;
            edges.insert(id, bytes.as_slice()).map_err(io_err)?;

            let mut adjacency = write_txn.open_table(ADJACENCY).map_err(io_err)?;
            adjacency.insert((start.0, id), end.0).map_err(io_err)?;
            adjacency.insert((end.0, id), start.0).map_err(io_err)?;

            record.into_edge(id)
        };
        write_txn.commit().map_err(io_err)?;
        Ok(edge)
    }

    fn delete_edge_txn(&self, edge: &Edge) -> Result<(), LinksetError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut edges = write_txn.open_table(EDGES).map_err(io_err)?;
            let removed = edges.remove(edge.id.0).map_err(io_err)?;
            let Some(stored) = removed else {
                return Err(LinksetError::RelationshipMutation {
                    op: MutationOp::Delete,
                    node: edge.start,
                    target: edge.end,
                    reason: format!("edge {:?} does not exist", edge.id),
                });
            };
            let record = decode(stored.value())?;
            drop(stored);

            let mut adjacency = write_txn.open_table(ADJACENCY).map_err(io_err)?;
            adjacency
                .remove((record.start.0, edge.id.0))
                .map_err(io_err)?;
            adjacency
                .remove((record.end.0, edge.id.0))
                .map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;
        Ok(())
    }

    /// Edges touching `node`, optionally filtered.
    fn scan<F>(&self, node: NodeId, mut keep: F) -> Result<Vec<Edge>, LinksetError>
    where
        F: FnMut(&EdgeRecord) -> bool,
    {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let adjacency = read_txn.open_table(ADJACENCY).map_err(io_err)?;
        let edges = read_txn.open_table(EDGES).map_err(io_err)?;

        let mut result = Vec::new();
        for entry in adjacency
            .range((node.0, 0u64)..=(node.0, u64::MAX))
            .map_err(io_err)?
        {
            let (key, _) = entry.map_err(io_err)?;
            let (_, edge_id) = key.value();
            let Some(data) = edges.get(edge_id).map_err(io_err)? else {
                continue;
            };
            let record = decode(data.value())?;
            if keep(&record) {
                result.push(record.into_edge(edge_id));
            }
        }
        Ok(result)
    }
}

// =============================================================================
// EDGESTORE TRAIT IMPLEMENTATION
// =============================================================================

impl EdgeStore for RedbGraph {
    fn insert_node(&mut self, label: &str) -> Result<NodeId, LinksetError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        let node = {
            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
            let id = meta
                .get(NEXT_NODE_ID)
                .map_err(io_err)?
                .map(|v| v.value())
                .unwrap_or(0);
            meta.insert(NEXT_NODE_ID, id.saturating_add(1))
                .map_err(io_err)?;

            let mut nodes = write_txn.open_table(NODES).map_err(io_err)?;
            nodes.insert(id, label).map_err(io_err)?;
            NodeId(id)
        };
        write_txn.commit().map_err(io_err)?;
        Ok(node)
    }

    fn contains_node(&self, node: NodeId) -> Result<bool, LinksetError> {
        Ok(self.node_label(node)?.is_some())
    }

    fn node_label(&self, node: NodeId) -> Result<Option<String>, LinksetError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let nodes = read_txn.open_table(NODES).map_err(io_err)?;
        Ok(nodes
            .get(node.0)
            .map_err(io_err)?
            .map(|v| v.value().to_string()))
    }

    fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> Result<Edge, LinksetError> {
        self.create_edge_txn(source, target, edge_type, direction)
            .map_err(|e| match e {
                LinksetError::IoError(reason) => LinksetError::RelationshipMutation {
                    op: MutationOp::Create,
                    node: source,
                    target,
                    reason,
                },
                other => other,
            })
    }

    fn delete_edge(&mut self, edge: &Edge) -> Result<(), LinksetError> {
        self.delete_edge_txn(edge).map_err(|e| match e {
            LinksetError::IoError(reason) => LinksetError::RelationshipMutation {
                op: MutationOp::Delete,
                node: edge.start,
                target: edge.end,
                reason,
            },
            other => other,
        })
    }

    fn edges(
        &self,
        node: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> Result<Vec<Edge>, LinksetError> {
        self.scan(node, |record| {
            &record.edge_type == edge_type && direction.matches(node, record.start, record.end)
        })
    }

    fn incident_edges(&self, node: NodeId) -> Result<Vec<Edge>, LinksetError> {
        self.scan(node, |_| true)
    }

    fn edge_count(&self) -> Result<usize, LinksetError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(EDGES).map_err(io_err)?;
        Ok(table.len().map_err(io_err)? as usize)
    }
}

// =============================================================================
// TESTS
// =============================================================================
