//! # Entity Mapping
//!
//! The collaborator that converts between graph nodes and domain entities.
//!
//! Scalar-property mapping and persistence of new entities happen elsewhere;
//! this layer only needs the two identity conversions below.

use crate::policy::MappingPolicy;
use crate::types::{LinksetError, NodeId};
use serde::{Deserialize, Serialize};

/// Converts nodes to domain entities and back.
pub trait EntityMapper {
    /// The domain entity type produced for related nodes.
    type Entity;

    /// Map a node to an entity under the given policy.
    fn node_to_entity(
        &self,
        node: NodeId,
        policy: &MappingPolicy,
    ) -> Result<Self::Entity, LinksetError>;

    /// The node backing an entity.
    ///
    /// Fails with `UnboundEntity` when the entity was never persisted.
    fn entity_to_node(&self, entity: &Self::Entity) -> Result<NodeId, LinksetError>;
}

// =============================================================================
// NODE REFERENCES
// =============================================================================

/// The simplest domain entity: a (possibly unbound) reference to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    node: Option<NodeId>,
    /// Policy the reference was materialized under, if it came from the store.
    policy: Option<MappingPolicy>,
}

impl NodeRef {
    /// A reference to a persisted node.
    #[must_use]
    pub const fn bound(node: NodeId) -> Self {
        Self { node: Some(node), policy: None }
    }

    /// A reference to an entity that has not been persisted yet.
    #[must_use]
    pub const fn unbound() -> Self {
        Self { node: None, policy: None }
    }

    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        self.node
    }

    #[must_use]
    pub const fn policy(&self) -> Option<MappingPolicy> {
        self.policy
    }

    /// Was the entity loaded eagerly when it was materialized?
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.policy.is_some_and(|p| p.should_load())
    }
}

/// Maps nodes to `NodeRef`s, recording the policy they were mapped under.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeRefMapper;

impl EntityMapper for NodeRefMapper {
    type Entity = NodeRef;

    fn node_to_entity(
        &self,
        node: NodeId,
        policy: &MappingPolicy,
    ) -> Result<NodeRef, LinksetError> {
        Ok(NodeRef {
            node: Some(node),
            policy: Some(*policy),
        })
    }

    fn entity_to_node(&self, entity: &NodeRef) -> Result<NodeId, LinksetError> {
        entity
            .node
            .ok_or_else(|| LinksetError::UnboundEntity(format!("{:?}", entity)))
    }
}
