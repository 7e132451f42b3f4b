//! # Mapping Policy
//!
//! Controls how eagerly, and how deep, a node is turned into a domain entity.
//!
//! A field declares a default policy; a caller may override it per call.
//! Resolution is a pure function of those two inputs. There is no ambient or
//! thread-local policy.

use crate::primitives::{DEFAULT_LOAD_DEPTH, MAX_LOAD_DEPTH};
use serde::{Deserialize, Serialize};

/// Whether related entities are loaded fully or left as references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Map only the identity; defer loading state.
    #[default]
    Lazy,
    /// Load entity state up to the policy depth.
    Eager,
}

/// Load depth/eagerness used when converting a node into a domain entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawPolicy")]
pub struct MappingPolicy {
    load: LoadMode,
    depth: u32,
}

/// Deserialization shape; routed through `MappingPolicy::new` for clamping.
#[derive(Deserialize)]
struct RawPolicy {
    #[serde(default)]
    load: LoadMode,
    #[serde(default = "default_depth")]
    depth: u32,
}

const fn default_depth() -> u32 {
    DEFAULT_LOAD_DEPTH
}

impl From<RawPolicy> for MappingPolicy {
    fn from(raw: RawPolicy) -> Self {
        Self::new(raw.load, raw.depth)
    }
}

impl Default for MappingPolicy {
    fn default() -> Self {
        Self::lazy()
    }
}

impl MappingPolicy {
    /// Create a policy. Depth is clamped to `MAX_LOAD_DEPTH`.
    #[must_use]
    pub fn new(load: LoadMode, depth: u32) -> Self {
        Self {
            load,
            depth: depth.min(MAX_LOAD_DEPTH),
        }
    }

    /// Identity-only mapping at the default depth.
    #[must_use]
    pub fn lazy() -> Self {
        Self::new(LoadMode::Lazy, DEFAULT_LOAD_DEPTH)
    }

    /// Full loading down to `depth` hops.
    #[must_use]
    pub fn eager(depth: u32) -> Self {
        Self::new(LoadMode::Eager, depth)
    }

    #[must_use]
    pub const fn load(&self) -> LoadMode {
        self.load
    }

    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    /// Should the mapper load entity state rather than a bare reference?
    #[must_use]
    pub fn should_load(&self) -> bool {
        self.load == LoadMode::Eager && self.depth > 0
    }

    /// Effective policy for a call.
    ///
    /// The caller's override wins when present; otherwise the field's
    /// declared default applies.
    #[must_use]
    pub fn resolve(declared: &Self, caller: Option<&Self>) -> Self {
        caller.copied().unwrap_or(*declared)
    }
}

// =============================================================================
// TESTS
// =============================================================================
