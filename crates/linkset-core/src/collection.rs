//! # Managed Collections
//!
//! The read side of a relationship field: the entities currently related to
//! a source node, wrapped in a write-through collection.
//!
//! A `ManagedCollection` is built fresh for every read or write and carries no
//! state beyond what the store already holds. Its `insert`/`remove` are the
//! only mutation path; each one synchronously links or unlinks a single edge
//! through the `EdgeReconciler`.
//!
//! The collection holds the store's mutable borrow for its whole lifetime, so
//! two live collections can never alias the same store.

use crate::descriptor::RelationshipDescriptor;
use crate::graph::EdgeStore;
use crate::mapper::EntityMapper;
use crate::policy::MappingPolicy;
use crate::reconciler::{EdgeReconciler, ReconcileReport};
use crate::resolver::TargetNodeSet;
use crate::types::{LinksetError, NodeId};
use std::collections::BTreeMap;
use std::fmt;

/// A write-through set of related entities, keyed by node identity.
pub struct ManagedCollection<'s, S: EdgeStore + ?Sized, M: EntityMapper> {
    store: &'s mut S,
    mapper: &'s M,
    source: NodeId,
    descriptor: RelationshipDescriptor,
    policy: MappingPolicy,
    entities: BTreeMap<NodeId, M::Entity>,
}

impl<S: EdgeStore + ?Sized, M: EntityMapper> fmt::Debug for ManagedCollection<'_, S, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedCollection")
            .field("source", &self.source)
            .field("descriptor", &self.descriptor)
            .field("policy", &self.policy)
            .field("nodes", &self.entities.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl<'s, S: EdgeStore + ?Sized, M: EntityMapper> ManagedCollection<'s, S, M> {
    /// Read the entities currently related to `source` under `policy`.
    ///
    /// Re-queries the store on every call.
    pub fn materialize(
        store: &'s mut S,
        mapper: &'s M,
        source: NodeId,
        descriptor: RelationshipDescriptor,
        policy: MappingPolicy,
    ) -> Result<Self, LinksetError> {
        let edges = store.edges(source, descriptor.edge_type(), descriptor.direction())?;
        let mut entities = BTreeMap::new();
        for edge in &edges {
            let node = edge.other_node(source);
            if !entities.contains_key(&node) {
                entities.insert(node, mapper.node_to_entity(node, &policy)?);
            }
        }
        tracing::debug!(
            %source,
            edge_type = %descriptor.edge_type(),
            related = entities.len(),
            "materialized relationship field"
        );
        Ok(Self {
            store,
            mapper,
            source,
            descriptor,
            policy,
            entities,
        })
    }

    /// Wrap caller-supplied entities without re-reading the store.
    ///
    /// Duplicates collapse by node identity; the last occurrence wins.
    pub fn wrap(
        store: &'s mut S,
        mapper: &'s M,
        source: NodeId,
        descriptor: RelationshipDescriptor,
        policy: MappingPolicy,
        values: Vec<M::Entity>,
    ) -> Result<Self, LinksetError> {
        let mut entities = BTreeMap::new();
        for entity in values {
            let node = mapper.entity_to_node(&entity)?;
            entities.insert(node, entity);
        }
        Ok(Self {
            store,
            mapper,
            source,
            descriptor,
            policy,
            entities,
        })
    }

    /// Add an entity, creating its edge if the store has none.
    ///
    /// Returns true if the entity was not already in the collection.
    pub fn insert(&mut self, entity: M::Entity) -> Result<bool, LinksetError> {
        let node = self.mapper.entity_to_node(&entity)?;
        EdgeReconciler::link(&mut *self.store, self.source, &self.descriptor, node)?;
        Ok(self.entities.insert(node, entity).is_none())
    }

    /// Remove an entity, deleting every edge to its node.
    ///
    /// Returns true if the entity was in the collection.
    pub fn remove(&mut self, entity: &M::Entity) -> Result<bool, LinksetError> {
        let node = self.mapper.entity_to_node(entity)?;
        self.remove_node(node)
    }

    /// Remove by node identity.
    pub fn remove_node(&mut self, node: NodeId) -> Result<bool, LinksetError> {
        EdgeReconciler::unlink(&mut *self.store, self.source, &self.descriptor, node)?;
        Ok(self.entities.remove(&node).is_some())
    }

    /// Remove every related entity and edge of this field.
    pub fn clear(&mut self) -> Result<ReconcileReport, LinksetError> {
        let report = EdgeReconciler::reconcile(
            &mut *self.store,
            self.source,
            &self.descriptor,
            &TargetNodeSet::new(),
        )?;
        self.entities.clear();
        Ok(report)
    }

    /// Is the entity a member? Unbound entities never are.
    pub fn contains(&self, entity: &M::Entity) -> bool {
        self.mapper
            .entity_to_node(entity)
            .is_ok_and(|node| self.entities.contains_key(&node))
    }

    #[must_use]
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.entities.contains_key(&node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in node-id order.
    pub fn iter(&self) -> impl Iterator<Item = &M::Entity> {
        self.entities.values()
    }

    /// Member node ids in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entities.keys().copied()
    }

    #[must_use]
    pub const fn source(&self) -> NodeId {
        self.source
    }

    #[must_use]
    pub fn descriptor(&self) -> &RelationshipDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn policy(&self) -> &MappingPolicy {
        &self.policy
    }

    /// Detach the entities, releasing the store.
    #[must_use]
    pub fn into_entities(self) -> Vec<M::Entity> {
        self.entities.into_values().collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
