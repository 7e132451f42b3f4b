//! # Relationship Descriptors
//!
//! Static, side-effect-free description of a relationship field: which edges
//! it binds to and whether it may be written.
//!
//! Field discovery itself belongs to the surrounding mapping framework. It
//! reports each field through the `FieldCapabilities` collaborator trait;
//! `FieldDecl` is the declarative implementation used by configuration files.

use crate::policy::MappingPolicy;
use crate::types::{Direction, EdgeType, LinksetError};
use serde::{Deserialize, Serialize};

// =============================================================================
// RELATIONSHIP DESCRIPTOR
// =============================================================================

/// Immutable shape of a to-many relationship field.
///
/// Describes the shape, not an instance: the same descriptor serves every
/// source node carrying the field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipDescriptor {
    edge_type: EdgeType,
    direction: Direction,
    target_type: String,
    read_only: bool,
}

impl RelationshipDescriptor {
    #[must_use]
    pub fn new(
        edge_type: EdgeType,
        direction: Direction,
        target_type: impl Into<String>,
        read_only: bool,
    ) -> Self {
        Self {
            edge_type,
            direction,
            target_type: target_type.into(),
            read_only,
        }
    }

    #[must_use]
    pub fn edge_type(&self) -> &EdgeType {
        &self.edge_type
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Name of the entity type at the other end.
    #[must_use]
    pub fn target_type(&self) -> &str {
        &self.target_type
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }
}

// =============================================================================
// CAPABILITY COLLABORATOR
// =============================================================================

/// What the mapping framework knows about a declared field.
pub trait FieldCapabilities {
    /// Qualified field name, used in diagnostics.
    fn field_name(&self) -> String;

    /// Is the field a relationship at all (as opposed to a scalar property)?
    fn is_relationship(&self) -> bool;

    /// Does the relationship have to-many cardinality?
    fn is_multiple(&self) -> bool;

    /// Does it target node-backed entities (not relationship entities)?
    fn targets_nodes(&self) -> bool;

    fn is_readonly(&self) -> bool;

    /// The relationship shape. Only meaningful when `is_relationship` holds.
    fn descriptor(&self) -> Result<RelationshipDescriptor, LinksetError>;

    /// Policy used when a caller supplies none.
    fn default_policy(&self) -> MappingPolicy;
}

/// Does the one-to-many reconciler handle this field?
///
/// True iff the field is a relationship with to-many cardinality targeting
/// nodes and is not read-only.
pub fn accept(field: &impl FieldCapabilities) -> bool {
    if !field.is_relationship() {
        return false;
    }
    field.is_multiple() && field.targets_nodes() && !field.is_readonly()
}

// =============================================================================
// DECLARATIVE FIELD
// =============================================================================

/// A field declaration as written in a mapping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    /// Entity type that owns the field.
    pub owner: String,
    /// Field name on the owner.
    pub name: String,
    /// Edge type label. Absent for scalar properties.
    #[serde(default)]
    pub edge_type: Option<String>,
    #[serde(default = "default_direction")]
    pub direction: Direction,
    /// Entity type at the other end.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default = "default_true")]
    pub multiple: bool,
    #[serde(default = "default_true")]
    pub targets_nodes: bool,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub policy: MappingPolicy,
}

const fn default_direction() -> Direction {
    Direction::Outgoing
}

const fn default_true() -> bool {
    true
}

impl FieldDecl {
    /// Declare a writable to-many relationship with default settings.
    #[must_use]
    pub fn to_many(
        owner: impl Into<String>,
        name: impl Into<String>,
        edge_type: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            edge_type: Some(edge_type.into()),
            direction: default_direction(),
            target: Some(target.into()),
            multiple: true,
            targets_nodes: true,
            readonly: false,
            policy: MappingPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: MappingPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.readonly = true;
        self
    }
}

impl FieldCapabilities for FieldDecl {
    fn field_name(&self) -> String {
        format!("{}.{}", self.owner, self.name)
    }

    fn is_relationship(&self) -> bool {
        self.edge_type.is_some()
    }

    fn is_multiple(&self) -> bool {
        self.multiple
    }

    fn targets_nodes(&self) -> bool {
        self.targets_nodes
    }

    fn is_readonly(&self) -> bool {
        self.readonly
    }

    fn descriptor(&self) -> Result<RelationshipDescriptor, LinksetError> {
        let edge_type = self.edge_type.as_deref().ok_or_else(|| {
            LinksetError::InvalidDescriptor(format!("{} is not a relationship", self.field_name()))
        })?;
        let target = self.target.as_deref().ok_or_else(|| {
            LinksetError::InvalidDescriptor(format!("{} declares no target type", self.field_name()))
        })?;
        Ok(RelationshipDescriptor::new(
            EdgeType::new(edge_type)?,
            self.direction,
            target,
            self.readonly,
        ))
    }

    fn default_policy(&self) -> MappingPolicy {
        self.policy
    }
}

// =============================================================================
// TESTS
// =============================================================================
