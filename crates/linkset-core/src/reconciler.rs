//! # Edge Reconciler
//!
//! Moves the edges of one relationship field from their current state to a
//! desired target set with the fewest store mutations.
//!
//! ## Algorithm
//!
//! 1. Enumerate current edges of the descriptor's type and direction.
//! 2. Delete every edge whose other end is not in the target set.
//! 3. Create one edge to every target node not already connected.
//!
//! Already-connected nodes are never touched, so edge-local state survives
//! and a repeated call with the same target set performs zero mutations.
//! Removals are applied before additions.
//!
//! ## Failure
//!
//! The first rejected mutation aborts the run and is returned unmodified.
//! Nothing is rolled back: a prefix of the deletes/creates may remain.
//! Atomicity belongs to whatever transactional scope the caller holds.

use crate::descriptor::RelationshipDescriptor;
use crate::graph::EdgeStore;
use crate::resolver::TargetNodeSet;
use crate::types::{Edge, EdgeId, LinksetError, NodeId};
use std::collections::BTreeSet;

/// What a reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Ids of deleted edges, in deletion order.
    pub removed: Vec<EdgeId>,
    /// Edges created, in creation order.
    pub created: Vec<Edge>,
    /// Number of existing edges left untouched.
    pub kept: usize,
}

impl ReconcileReport {
    /// Total store mutations performed.
    #[must_use]
    pub fn mutations(&self) -> usize {
        self.removed.len() + self.created.len()
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.mutations() == 0
    }
}

/// Applies edge-set diffs against an `EdgeStore`.
pub struct EdgeReconciler;

impl EdgeReconciler {
    /// Make the other-end nodes of `source`'s edges equal `targets` exactly.
    ///
    /// Parallel edges to a node that stays in the target set are all kept;
    /// parallel edges to a node that leaves it are all deleted.
    pub fn reconcile<S: EdgeStore + ?Sized>(
        store: &mut S,
        source: NodeId,
        descriptor: &RelationshipDescriptor,
        targets: &TargetNodeSet,
    ) -> Result<ReconcileReport, LinksetError> {
        ensure_writable(descriptor)?;

        let current = store.edges(source, descriptor.edge_type(), descriptor.direction())?;

        let mut connected = BTreeSet::new();
        let mut stale = Vec::new();
        let mut kept = 0;
        for edge in current {
            let other = edge.other_node(source);
            if targets.contains(other) {
                connected.insert(other);
                kept += 1;
            } else {
                stale.push(edge);
            }
        }

        let mut report = ReconcileReport {
            kept,
            ..ReconcileReport::default()
        };

        for edge in &stale {
            store
                .delete_edge(edge)
                .inspect_err(|e| warn_partial(source, descriptor, &report, e))?;
            tracing::trace!(edge = ?edge.id, %source, "deleted relationship");
            report.removed.push(edge.id);
        }

        for target in targets.iter().filter(|t| !connected.contains(t)) {
            let edge = store
                .create_edge(source, target, descriptor.edge_type(), descriptor.direction())
                .inspect_err(|e| warn_partial(source, descriptor, &report, e))?;
            tracing::trace!(edge = ?edge.id, %source, %target, "created relationship");
            report.created.push(edge);
        }

        tracing::debug!(
            %source,
            edge_type = %descriptor.edge_type(),
            direction = %descriptor.direction(),
            removed = report.removed.len(),
            created = report.created.len(),
            kept = report.kept,
            "reconciled relationship field"
        );
        Ok(report)
    }

    /// Connect `source` to a single `target` unless an edge already exists.
    ///
    /// Returns the created edge, or `None` when nothing changed.
    pub fn link<S: EdgeStore + ?Sized>(
        store: &mut S,
        source: NodeId,
        descriptor: &RelationshipDescriptor,
        target: NodeId,
    ) -> Result<Option<Edge>, LinksetError> {
        ensure_writable(descriptor)?;

        let existing = store.edges(source, descriptor.edge_type(), descriptor.direction())?;
        if existing.iter().any(|e| e.other_node(source) == target) {
            return Ok(None);
        }
        let edge =
            store.create_edge(source, target, descriptor.edge_type(), descriptor.direction())?;
        tracing::trace!(edge = ?edge.id, %source, %target, "linked relationship");
        Ok(Some(edge))
    }

    /// Delete every edge between `source` and a single `target`.
    ///
    /// Returns the number of edges deleted.
    pub fn unlink<S: EdgeStore + ?Sized>(
        store: &mut S,
        source: NodeId,
        descriptor: &RelationshipDescriptor,
        target: NodeId,
    ) -> Result<usize, LinksetError> {
        ensure_writable(descriptor)?;

        let existing = store.edges(source, descriptor.edge_type(), descriptor.direction())?;
        let mut removed = 0;
        for edge in existing.iter().filter(|e| e.other_node(source) == target) {
            store.delete_edge(edge)?;
            removed += 1;
        }
        if removed > 0 {
            tracing::trace!(%source, %target, removed, "unlinked relationship");
        }
        Ok(removed)
    }
}

/// Writes must never reach a read-only field, even past the capability check.
fn ensure_writable(descriptor: &RelationshipDescriptor) -> Result<(), LinksetError> {
    if descriptor.is_read_only() {
        return Err(LinksetError::ReadOnlyField(format!(
            "{} ({}) -> {}",
            descriptor.edge_type(),
            descriptor.direction(),
            descriptor.target_type()
        )));
    }
    Ok(())
}

fn warn_partial(
    source: NodeId,
    descriptor: &RelationshipDescriptor,
    report: &ReconcileReport,
    error: &LinksetError,
) {
    tracing::warn!(
        %source,
        edge_type = %descriptor.edge_type(),
        removed = report.removed.len(),
        created = report.created.len(),
        %error,
        "reconciliation aborted; partial changes remain"
    );
}

// =============================================================================
// TESTS
// =============================================================================
