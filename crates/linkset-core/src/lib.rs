//! # linkset-core
//!
//! Binds a collection-valued relationship field on a domain object to the set
//! of typed, directed edges incident to a node in a property graph.
//!
//! ## Flow
//!
//! ```text
//!  write:  desired entities ──► resolve_targets ──► EdgeReconciler ──► store
//!  read:   store ──► ManagedCollection::materialize ──► entities
//!                         │
//!                         └── insert/remove ──► EdgeReconciler (one edge)
//! ```
//!
//! ## Architectural Constraints
//!
//! - Synchronous: every operation is a request/response call on the store
//! - No caching: every read re-queries the store
//! - No rollback: atomicity belongs to the caller's transactional scope
//! - Absent value preserves edges; empty value clears them
//!
//! ## Example
//!
//! ```
//! use linkset_core::{
//!     AccessorRegistry, EdgeStore, FieldDecl, Graph, NodeRef, NodeRefMapper,
//! };
//!
//! let mut graph = Graph::new();
//! let alice = graph.insert_node("Person").expect("node");
//! let bob = graph.insert_node("Person").expect("node");
//!
//! let field = FieldDecl::to_many("Person", "friends", "KNOWS", "Person");
//! let friends = AccessorRegistry::new()
//!     .resolve(&field)
//!     .expect("resolve")
//!     .expect("handled");
//!
//! friends
//!     .set_value(&mut graph, &NodeRefMapper, alice, Some(vec![NodeRef::bound(bob)]), None)
//!     .expect("set");
//!
//! let read = friends
//!     .get_value(&mut graph, &NodeRefMapper, alice, None)
//!     .expect("get");
//! assert_eq!(read.nodes().collect::<Vec<_>>(), vec![bob]);
//! ```

// =============================================================================
// MODULES
// =============================================================================

pub mod accessor;
pub mod collection;
pub mod descriptor;
pub mod graph;
pub mod mapper;
pub mod policy;
pub mod primitives;
pub mod reconciler;
pub mod registry;
pub mod resolver;
pub mod storage;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{Direction, Edge, EdgeId, EdgeType, LinksetError, MutationOp, NodeId};

// =============================================================================
// RE-EXPORTS: Mapping
// =============================================================================

pub use accessor::FieldAccessor;
pub use collection::ManagedCollection;
pub use descriptor::{FieldCapabilities, FieldDecl, RelationshipDescriptor, accept};
pub use mapper::{EntityMapper, NodeRef, NodeRefMapper};
pub use policy::{LoadMode, MappingPolicy};
pub use registry::{AccessorKind, AccessorRegistry};

// =============================================================================
// RE-EXPORTS: Reconciliation & Storage
// =============================================================================

pub use graph::{EdgeStore, Graph};
pub use reconciler::{EdgeReconciler, ReconcileReport};
pub use resolver::{TargetNodeSet, resolve_targets};
pub use storage::RedbGraph;
