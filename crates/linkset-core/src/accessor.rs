//! # Field Accessor
//!
//! Read and write entry points for one to-many relationship field.
//!
//! ## Write contract
//!
//! - `set_value(.., None, ..)` is the absence marker: nothing is read or
//!   written and existing edges are left exactly as they are.
//! - `set_value(.., Some(vec![]), ..)` clears every edge of the field.
//!
//! The asymmetry is deliberate and must be preserved.
//!
//! Concurrent writers to the same field on the same source node are not
//! serialized here; callers must do that themselves.

use crate::collection::ManagedCollection;
use crate::descriptor::RelationshipDescriptor;
use crate::graph::EdgeStore;
use crate::mapper::EntityMapper;
use crate::policy::MappingPolicy;
use crate::reconciler::EdgeReconciler;
use crate::registry::AccessorKind;
use crate::resolver::resolve_targets;
use crate::types::{LinksetError, NodeId};

/// A resolved accessor for one declared field.
///
/// Built once at mapping-setup time by the `AccessorRegistry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccessor {
    name: String,
    kind: AccessorKind,
    descriptor: RelationshipDescriptor,
    default_policy: MappingPolicy,
}

impl FieldAccessor {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        kind: AccessorKind,
        descriptor: RelationshipDescriptor,
        default_policy: MappingPolicy,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            descriptor,
            default_policy,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> AccessorKind {
        self.kind
    }

    #[must_use]
    pub fn descriptor(&self) -> &RelationshipDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn default_policy(&self) -> &MappingPolicy {
        &self.default_policy
    }

    /// Effective policy for a call with an optional caller override.
    #[must_use]
    pub fn effective_policy(&self, caller: Option<&MappingPolicy>) -> MappingPolicy {
        MappingPolicy::resolve(&self.default_policy, caller)
    }

    /// Value of a field that was never set: always empty, never absent.
    #[must_use]
    pub fn default_value<E>(&self) -> Vec<E> {
        Vec::new()
    }

    /// Read the related entities of `source` as a managed collection.
    pub fn get_value<'s, S, M>(
        &self,
        store: &'s mut S,
        mapper: &'s M,
        source: NodeId,
        caller_policy: Option<&MappingPolicy>,
    ) -> Result<ManagedCollection<'s, S, M>, LinksetError>
    where
        S: EdgeStore + ?Sized,
        M: EntityMapper,
    {
        ensure_source(&*store, source)?;
        let policy = self.effective_policy(caller_policy);
        ManagedCollection::materialize(store, mapper, source, self.descriptor.clone(), policy)
    }

    /// Replace the related entities of `source`.
    ///
    /// Returns `None` for the absence marker; otherwise a managed collection
    /// over exactly `new_value` (not a re-read of the store).
    pub fn set_value<'s, S, M>(
        &self,
        store: &'s mut S,
        mapper: &'s M,
        source: NodeId,
        new_value: Option<Vec<M::Entity>>,
        caller_policy: Option<&MappingPolicy>,
    ) -> Result<Option<ManagedCollection<'s, S, M>>, LinksetError>
    where
        S: EdgeStore + ?Sized,
        M: EntityMapper,
    {
        if self.kind == AccessorKind::ReadOnlyToMany {
            return Err(LinksetError::ReadOnlyField(self.name.clone()));
        }
        ensure_source(&*store, source)?;

        let Some(values) = new_value else {
            tracing::debug!(field = %self.name, %source, "absent value; relationships left untouched");
            return Ok(None);
        };

        let targets = resolve_targets(mapper, &values)?;
        EdgeReconciler::reconcile(&mut *store, source, &self.descriptor, &targets)?;

        let policy = self.effective_policy(caller_policy);
        ManagedCollection::wrap(store, mapper, source, self.descriptor.clone(), policy, values)
            .map(Some)
    }
}

fn ensure_source<S: EdgeStore + ?Sized>(store: &S, source: NodeId) -> Result<(), LinksetError> {
    if store.contains_node(source)? {
        Ok(())
    } else {
        Err(LinksetError::NodeNotFound(source))
    }
}

// =============================================================================
// TESTS
// =============================================================================
