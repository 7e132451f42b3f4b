//! # Target Set Resolver
//!
//! Turns a caller's desired collection of domain objects into the set of
//! node identities the relationship should point at.
//!
//! Every element must already be bound to a persisted node. New entities are
//! never persisted implicitly here.

use crate::mapper::EntityMapper;
use crate::types::{LinksetError, NodeId};
use std::collections::BTreeSet;

/// Unordered set of target nodes; duplicates collapse by node identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetNodeSet(BTreeSet<NodeId>);

impl TargetNodeSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.0.contains(&node)
    }

    /// Add a node. Returns false if it was already present.
    pub fn insert(&mut self, node: NodeId) -> bool {
        self.0.insert(node)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<NodeId> for TargetNodeSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Resolve each candidate to its backing node.
///
/// Fails with `UnboundEntity` on the first element that has no node.
pub fn resolve_targets<'a, M, I>(mapper: &M, candidates: I) -> Result<TargetNodeSet, LinksetError>
where
    M: EntityMapper,
    M::Entity: 'a,
    I: IntoIterator<Item = &'a M::Entity>,
{
    candidates
        .into_iter()
        .map(|entity| mapper.entity_to_node(entity))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::{NodeRef, NodeRefMapper};

    #[test]
    fn duplicates_collapse() {
        let candidates = [
            NodeRef::bound(NodeId(1)),
            NodeRef::bound(NodeId(1)),
            NodeRef::bound(NodeId(2)),
        ];
        let set = resolve_targets(&NodeRefMapper, &candidates).expect("resolve");
        assert_eq!(set.len(), 2);
        assert!(set.contains(NodeId(1)));
        assert!(set.contains(NodeId(2)));
    }

    #[test]
    fn empty_input_gives_empty_set() {
        let candidates: Vec<NodeRef> = Vec::new();
        let set = resolve_targets(&NodeRefMapper, &candidates).expect("resolve");
        assert!(set.is_empty());
    }

    #[test]
    fn unbound_element_fails() {
        let candidates = [NodeRef::bound(NodeId(1)), NodeRef::unbound()];
        assert!(matches!(
            resolve_targets(&NodeRefMapper, &candidates),
            Err(LinksetError::UnboundEntity(_))
        ));
    }
}
