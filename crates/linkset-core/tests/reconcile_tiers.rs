//! # Reconciliation Scenarios
//!
//! End-to-end checks against both stores, a domain mapper of our own, and a
//! store that fails on demand.

use linkset_core::{
    AccessorKind, AccessorRegistry, Direction, Edge, EdgeReconciler, EdgeStore, EdgeType,
    EntityMapper, FieldDecl, Graph, LinksetError, MappingPolicy, MutationOp, NodeId, RedbGraph,
    RelationshipDescriptor, TargetNodeSet,
};
use std::collections::BTreeSet;
use tempfile::tempdir;

// =============================================================================
// DOMAIN FIXTURES
// =============================================================================

/// A domain entity that may or may not have been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Person {
    name: String,
    node: Option<NodeId>,
    loaded: bool,
}

impl Person {
    fn saved(name: &str, node: NodeId) -> Self {
        Self {
            name: name.to_string(),
            node: Some(node),
            loaded: false,
        }
    }

    fn transient(name: &str) -> Self {
        Self {
            name: name.to_string(),
            node: None,
            loaded: false,
        }
    }
}

struct PersonMapper;

impl EntityMapper for PersonMapper {
    type Entity = Person;

    fn node_to_entity(&self, node: NodeId, policy: &MappingPolicy) -> Result<Person, LinksetError> {
        Ok(Person {
            name: format!("person-{}", node.0),
            node: Some(node),
            loaded: policy.should_load(),
        })
    }

    fn entity_to_node(&self, entity: &Person) -> Result<NodeId, LinksetError> {
        entity
            .node
            .ok_or_else(|| LinksetError::UnboundEntity(entity.name.clone()))
    }
}

/// Delegates to a `Graph` but rejects mutations once its budget is spent.
struct FlakyStore {
    inner: Graph,
    budget: usize,
    mutations: usize,
}

impl FlakyStore {
    fn new(inner: Graph) -> Self {
        Self {
            inner,
            budget: usize::MAX,
            mutations: 0,
        }
    }

    fn spend(&mut self, op: MutationOp, node: NodeId, target: NodeId) -> Result<(), LinksetError> {
        if self.budget == 0 {
            return Err(LinksetError::RelationshipMutation {
                op,
                node,
                target,
                reason: "connection lost".to_string(),
            });
        }
        self.budget -= 1;
        self.mutations += 1;
        Ok(())
    }
}

impl EdgeStore for FlakyStore {
    fn insert_node(&mut self, label: &str) -> Result<NodeId, LinksetError> {
        self.inner.insert_node(label)
    }

    fn contains_node(&self, node: NodeId) -> Result<bool, LinksetError> {
        self.inner.contains_node(node)
    }

    fn node_label(&self, node: NodeId) -> Result<Option<String>, LinksetError> {
        self.inner.node_label(node)
    }

    fn create_edge(
        &mut self,
        source: NodeId,
        target: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> Result<Edge, LinksetError> {
        self.spend(MutationOp::Create, source, target)?;
        self.inner.create_edge(source, target, edge_type, direction)
    }

    fn delete_edge(&mut self, edge: &Edge) -> Result<(), LinksetError> {
        self.spend(MutationOp::Delete, edge.start, edge.end)?;
        self.inner.delete_edge(edge)
    }

    fn edges(
        &self,
        node: NodeId,
        edge_type: &EdgeType,
        direction: Direction,
    ) -> Result<Vec<Edge>, LinksetError> {
        self.inner.edges(node, edge_type, direction)
    }

    fn incident_edges(&self, node: NodeId) -> Result<Vec<Edge>, LinksetError> {
        self.inner.incident_edges(node)
    }

    fn edge_count(&self) -> Result<usize, LinksetError> {
        self.inner.edge_count()
    }
}

fn friends_field() -> FieldDecl {
    FieldDecl::to_many("Person", "friends", "KNOWS", "Person")
}

fn related<S: EdgeStore>(store: &S, source: NodeId, d: &RelationshipDescriptor) -> BTreeSet<NodeId> {
    store
        .edges(source, d.edge_type(), d.direction())
        .expect("edges")
        .iter()
        .map(|e| e.other_node(source))
        .collect()
}

fn people<S: EdgeStore>(store: &mut S, n: usize) -> Vec<NodeId> {
    (0..n)
        .map(|_| store.insert_node("Person").expect("insert"))
        .collect()
}

// =============================================================================
// TIER 1: MINIMAL SWAP
// =============================================================================

#[test]
fn swap_b_for_c_touches_two_edges() {
    let mut graph = Graph::new();
    let n = people(&mut graph, 4);
    let (me, a, b, c) = (n[0], n[1], n[2], n[3]);
    let field = AccessorRegistry::new()
        .resolve(&friends_field())
        .expect("resolve")
        .expect("handled");

    field
        .set_value(
            &mut graph,
            &PersonMapper,
            me,
            Some(vec![Person::saved("a", a), Person::saved("b", b)]),
            None,
        )
        .expect("set");
    let edge_to_a = graph
        .edges(me, field.descriptor().edge_type(), Direction::Outgoing)
        .expect("edges")
        .into_iter()
        .find(|e| e.end == a)
        .expect("edge to a");

    let mut store = FlakyStore::new(graph);
    field
        .set_value(
            &mut store,
            &PersonMapper,
            me,
            Some(vec![Person::saved("a", a), Person::saved("c", c)]),
            None,
        )
        .expect("set");

    assert_eq!(store.mutations, 2);
    let remaining = store
        .edges(me, field.descriptor().edge_type(), Direction::Outgoing)
        .expect("edges");
    assert!(remaining.contains(&edge_to_a));
    assert_eq!(
        related(&store, me, field.descriptor()),
        [a, c].into_iter().collect()
    );
}

// =============================================================================
// TIER 2: PARTIAL FAILURE
// =============================================================================

#[test]
fn failure_leaves_completed_prefix() {
    let mut graph = Graph::new();
    let n = people(&mut graph, 5);
    let me = n[0];
    let d = RelationshipDescriptor::new(
        EdgeType::new("KNOWS").expect("edge type"),
        Direction::Outgoing,
        "Person",
        false,
    );
    let initial: TargetNodeSet = [n[1], n[2]].into_iter().collect();
    EdgeReconciler::reconcile(&mut graph, me, &d, &initial).expect("reconcile");

    // Two deletes succeed, then the first create is rejected.
    let mut store = FlakyStore::new(graph);
    store.budget = 2;
    let desired: TargetNodeSet = [n[3], n[4]].into_iter().collect();
    let err = EdgeReconciler::reconcile(&mut store, me, &d, &desired).expect_err("must fail");

    assert!(matches!(
        err,
        LinksetError::RelationshipMutation {
            op: MutationOp::Create,
            ..
        }
    ));
    // Removals ran first and were not rolled back.
    assert!(related(&store, me, &d).is_empty());
}

#[test]
fn failure_mid_create_keeps_earlier_creates() {
    let mut graph = Graph::new();
    let n = people(&mut graph, 4);
    let d = RelationshipDescriptor::new(
        EdgeType::new("KNOWS").expect("edge type"),
        Direction::Outgoing,
        "Person",
        false,
    );

    let mut store = FlakyStore::new(graph);
    store.budget = 1;
    let desired: TargetNodeSet = [n[1], n[2], n[3]].into_iter().collect();
    assert!(EdgeReconciler::reconcile(&mut store, n[0], &d, &desired).is_err());
    assert_eq!(related(&store, n[0], &d).len(), 1);

    // Retrying with a fresh budget converges without duplicating the prefix.
    store.budget = usize::MAX;
    let report = EdgeReconciler::reconcile(&mut store, n[0], &d, &desired).expect("reconcile");
    assert_eq!(report.created.len(), 2);
    assert_eq!(report.kept, 1);
    assert_eq!(related(&store, n[0], &d), desired.iter().collect());
}

// =============================================================================
// TIER 3: ACCESSOR CONTRACT
// =============================================================================

#[test]
fn absent_value_performs_no_store_calls() {
    let mut graph = Graph::new();
    let n = people(&mut graph, 3);
    let field = AccessorRegistry::new()
        .resolve(&friends_field())
        .expect("resolve")
        .expect("handled");
    field
        .set_value(
            &mut graph,
            &PersonMapper,
            n[0],
            Some(vec![Person::saved("b", n[1])]),
            None,
        )
        .expect("set");

    let mut store = FlakyStore::new(graph);
    store.budget = 0;
    let result = field
        .set_value(&mut store, &PersonMapper, n[0], None, None)
        .expect("absent value never reaches the store");
    assert!(result.is_none());
    drop(result);
    assert_eq!(related(&store, n[0], field.descriptor()).len(), 1);
}

#[test]
fn transient_entity_is_rejected_before_any_mutation() {
    let mut graph = Graph::new();
    let n = people(&mut graph, 3);
    let field = AccessorRegistry::new()
        .resolve(&friends_field())
        .expect("resolve")
        .expect("handled");

    let mut store = FlakyStore::new(graph);
    let result = field.set_value(
        &mut store,
        &PersonMapper,
        n[0],
        Some(vec![Person::saved("b", n[1]), Person::transient("ghost")]),
        None,
    );
    assert!(matches!(result, Err(LinksetError::UnboundEntity(ref name)) if name == "ghost"));
    drop(result);
    assert_eq!(store.mutations, 0);
}

#[test]
fn caller_policy_overrides_declared_default() {
    let mut graph = Graph::new();
    let n = people(&mut graph, 2);
    let decl = friends_field().with_policy(MappingPolicy::eager(2));
    let field = AccessorRegistry::new()
        .resolve(&decl)
        .expect("resolve")
        .expect("handled");
    field
        .set_value(
            &mut graph,
            &PersonMapper,
            n[0],
            Some(vec![Person::saved("b", n[1])]),
            None,
        )
        .expect("set");

    {
        let eager = field
            .get_value(&mut graph, &PersonMapper, n[0], None)
            .expect("get");
        assert!(eager.iter().all(|p| p.loaded));
    }
    let lazy = field
        .get_value(&mut graph, &PersonMapper, n[0], Some(&MappingPolicy::lazy()))
        .expect("get");
    assert!(lazy.iter().all(|p| !p.loaded));
    assert_eq!(*lazy.policy(), MappingPolicy::lazy());
}

#[test]
fn incoming_field_sees_reverse_edges() {
    let mut graph = Graph::new();
    let n = people(&mut graph, 3);
    let followers = AccessorRegistry::new()
        .resolve(&FieldDecl::to_many("Person", "followers", "FOLLOWS", "Person").with_direction(Direction::Incoming))
        .expect("resolve")
        .expect("handled");
    let follows = AccessorRegistry::new()
        .resolve(&FieldDecl::to_many("Person", "follows", "FOLLOWS", "Person"))
        .expect("resolve")
        .expect("handled");

    // n1 and n2 both follow n0.
    for follower in [n[1], n[2]] {
        follows
            .set_value(
                &mut graph,
                &PersonMapper,
                follower,
                Some(vec![Person::saved("n0", n[0])]),
                None,
            )
            .expect("set");
    }

    let read = followers
        .get_value(&mut graph, &PersonMapper, n[0], None)
        .expect("get");
    assert_eq!(read.nodes().collect::<Vec<_>>(), vec![n[1], n[2]]);
}

#[test]
fn read_only_field_reads_but_never_writes() {
    let mut graph = Graph::new();
    let n = people(&mut graph, 2);
    let writer = AccessorRegistry::new()
        .resolve(&friends_field())
        .expect("resolve")
        .expect("handled");
    let reader = AccessorRegistry::new()
        .resolve(&friends_field().read_only())
        .expect("resolve")
        .expect("handled");
    assert_eq!(reader.kind(), AccessorKind::ReadOnlyToMany);

    writer
        .set_value(
            &mut graph,
            &PersonMapper,
            n[0],
            Some(vec![Person::saved("b", n[1])]),
            None,
        )
        .expect("set");

    {
        let mut view = reader
            .get_value(&mut graph, &PersonMapper, n[0], None)
            .expect("get");
        assert_eq!(view.len(), 1);
        assert!(matches!(
            view.remove(&Person::saved("b", n[1])),
            Err(LinksetError::ReadOnlyField(_))
        ));
    }
    assert!(matches!(
        reader.set_value(&mut graph, &PersonMapper, n[0], None, None),
        Err(LinksetError::ReadOnlyField(_))
    ));
    assert_eq!(graph.edge_count().expect("count"), 1);
}

// =============================================================================
// TIER 4: PERSISTENT STORE
// =============================================================================

#[test]
fn persistent_store_round_trip() {
    let temp = tempdir().expect("temp dir");
    let db_path = temp.path().join("people.redb");
    let field = AccessorRegistry::new()
        .resolve(&friends_field())
        .expect("resolve")
        .expect("handled");

    let n = {
        let mut store = RedbGraph::open(&db_path).expect("open");
        let n = people(&mut store, 4);
        let mut collection = field
            .set_value(
                &mut store,
                &PersonMapper,
                n[0],
                Some(vec![Person::saved("a", n[1]), Person::saved("b", n[2])]),
                None,
            )
            .expect("set")
            .expect("collection");
        collection.insert(Person::saved("c", n[3])).expect("insert");
        collection.remove(&Person::saved("a", n[1])).expect("remove");
        n
    };

    let mut store = RedbGraph::open(&db_path).expect("reopen");
    let read = field
        .get_value(&mut store, &PersonMapper, n[0], None)
        .expect("get");
    assert_eq!(read.nodes().collect::<Vec<_>>(), vec![n[2], n[3]]);
}
