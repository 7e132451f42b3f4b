//! # Accessor Registry
//!
//! An explicit, ordered list of accessor strategies. Each declared field is
//! matched once at mapping-setup time; the first strategy that accepts the
//! field wins and the resulting `FieldAccessor` is reused for every access.
//!
//! Fields no strategy accepts (scalars, single-valued relationships,
//! relationship entities) belong to other mapping layers and resolve to
//! `None`.

use crate::accessor::FieldAccessor;
use crate::descriptor::{FieldCapabilities, accept};
use crate::types::LinksetError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The accessor strategies known to this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessorKind {
    /// Writable to-many relationship reconciled against the store.
    OneToMany,
    /// To-many relationship that may be read but never written.
    ReadOnlyToMany,
}

impl AccessorKind {
    /// Does this strategy handle the field?
    pub fn accepts(self, field: &impl FieldCapabilities) -> bool {
        match self {
            Self::OneToMany => accept(field),
            Self::ReadOnlyToMany => {
                field.is_relationship()
                    && field.is_multiple()
                    && field.targets_nodes()
                    && field.is_readonly()
            }
        }
    }
}

impl fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneToMany => f.write_str("one-to-many"),
            Self::ReadOnlyToMany => f.write_str("read-only one-to-many"),
        }
    }
}

/// Ordered registry of accessor strategies.
#[derive(Debug, Clone)]
pub struct AccessorRegistry {
    strategies: Vec<AccessorKind>,
}

impl Default for AccessorRegistry {
    fn default() -> Self {
        Self {
            strategies: vec![AccessorKind::OneToMany, AccessorKind::ReadOnlyToMany],
        }
    }
}

impl AccessorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry consulting only the given strategies, in order.
    #[must_use]
    pub fn with_strategies(strategies: Vec<AccessorKind>) -> Self {
        Self { strategies }
    }

    /// The first strategy accepting the field, if any.
    pub fn strategy_for(&self, field: &impl FieldCapabilities) -> Option<AccessorKind> {
        self.strategies.iter().copied().find(|k| k.accepts(field))
    }

    /// Build the accessor for one field.
    pub fn resolve(
        &self,
        field: &impl FieldCapabilities,
    ) -> Result<Option<FieldAccessor>, LinksetError> {
        let Some(kind) = self.strategy_for(field) else {
            return Ok(None);
        };
        let accessor = FieldAccessor::new(
            field.field_name(),
            kind,
            field.descriptor()?,
            field.default_policy(),
        );
        tracing::debug!(field = %accessor.name(), %kind, "resolved field accessor");
        Ok(Some(accessor))
    }

    /// Resolve every handled field, keyed by qualified field name.
    pub fn resolve_all<'a, F, I>(
        &self,
        fields: I,
    ) -> Result<BTreeMap<String, FieldAccessor>, LinksetError>
    where
        F: FieldCapabilities + 'a,
        I: IntoIterator<Item = &'a F>,
    {
        let mut accessors = BTreeMap::new();
        for field in fields {
            if let Some(accessor) = self.resolve(field)? {
                accessors.insert(accessor.name().to_string(), accessor);
            }
        }
        Ok(accessors)
    }
}

// =============================================================================
// TESTS
// =============================================================================
