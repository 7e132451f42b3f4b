//! # Primitives
//!
//! Hardcoded bounds and constants for linkset-core.
//!
//! These are compiled into the binary and are immutable at runtime.

/// Maximum length of an edge type label in bytes.
///
/// Labels longer than this are rejected when a descriptor is built.
pub const MAX_EDGE_TYPE_LENGTH: usize = 256;

/// Maximum load depth a mapping policy may request.
///
/// Deeper requests are clamped, keeping entity mapping computationally bounded.
pub const MAX_LOAD_DEPTH: u32 = 16;

/// Load depth used when a field declares no policy of its own.
pub const DEFAULT_LOAD_DEPTH: u32 = 1;

/// Current on-disk record format version.
///
/// Increment this when making breaking changes to the record layout.
/// Databases written with a different version are refused on open.
pub const FORMAT_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_depth_within_bound() {
        assert!(DEFAULT_LOAD_DEPTH <= MAX_LOAD_DEPTH);
    }
}
