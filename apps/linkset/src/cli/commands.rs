//! # CLI Command Implementations
//!
//! Every command opens the redb store, performs one operation through
//! linkset-core, and prints either a human summary or JSON.

use crate::config::AppConfig;
use linkset_core::{
    AccessorRegistry, EdgeStore, FieldAccessor, FieldCapabilities, LinksetError, MappingPolicy,
    NodeId, NodeRef, NodeRefMapper, RedbGraph, primitives::DEFAULT_LOAD_DEPTH,
};
use std::path::Path;

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new database.
pub fn cmd_init(db_path: &Path, force: bool) -> Result<(), LinksetError> {
    if db_path.exists() {
        if !force {
            return Err(LinksetError::IoError(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(db_path).map_err(|e| {
            LinksetError::IoError(format!("Cannot remove '{}': {}", db_path.display(), e))
        })?;
    }

    let _store = RedbGraph::open(db_path)?;
    tracing::info!(path = %db_path.display(), "initialized database");
    println!("Initialized new redb database at {:?}", db_path);
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show node and edge counts.
pub fn cmd_status(db_path: &Path, json_mode: bool) -> Result<(), LinksetError> {
    let store = RedbGraph::open(db_path)?;
    let node_count = store.node_count()?;
    let edge_count = store.edge_count()?;

    if json_mode {
        print_json(&serde_json::json!({
            "database": db_path.to_string_lossy(),
            "node_count": node_count,
            "edge_count": edge_count
        }));
        return Ok(());
    }

    println!("Linkset Status");
    println!("==============");
    println!("Database: {:?}", db_path);
    println!();
    println!("Nodes: {}", node_count);
    println!("Edges: {}", edge_count);
    Ok(())
}

// =============================================================================
// NODE COMMAND
// =============================================================================

/// Add a node with the given label.
pub fn cmd_node(db_path: &Path, json_mode: bool, label: &str) -> Result<(), LinksetError> {
    let mut store = RedbGraph::open(db_path)?;
    let node = store.insert_node(label)?;
    tracing::info!(%node, label, "added node");

    if json_mode {
        print_json(&serde_json::json!({ "node": node, "label": label }));
    } else {
        println!("Added node {} ({})", node, label);
    }
    Ok(())
}

// =============================================================================
// FIELDS COMMAND
// =============================================================================

/// List declared fields and the accessor strategy each resolves to.
pub fn cmd_fields(config: &AppConfig, json_mode: bool) -> Result<(), LinksetError> {
    let registry = AccessorRegistry::new();
    let mut rows = Vec::with_capacity(config.fields.len());

    for field in &config.fields {
        let kind = registry.strategy_for(field);
        rows.push(serde_json::json!({
            "field": field.field_name(),
            "accessor": kind,
            "edge_type": field.edge_type,
            "direction": field.direction,
            "target": field.target,
            "policy": field.policy,
        }));
    }

    if json_mode {
        print_json(&serde_json::Value::Array(rows));
        return Ok(());
    }

    if config.fields.is_empty() {
        println!("No fields declared.");
        return Ok(());
    }
    for field in &config.fields {
        let accessor = registry
            .strategy_for(field)
            .map_or_else(|| "unhandled".to_string(), |k| k.to_string());
        println!(
            "{:<32} {:<24} {} ({})",
            field.field_name(),
            accessor,
            field.edge_type.as_deref().unwrap_or("-"),
            field.direction
        );
    }
    Ok(())
}

// =============================================================================
// GET COMMAND
// =============================================================================

/// Read a relationship field.
pub fn cmd_get(
    db_path: &Path,
    config: &AppConfig,
    json_mode: bool,
    node: u64,
    field: &str,
    eager: bool,
    depth: Option<u32>,
) -> Result<(), LinksetError> {
    let accessor = lookup(config, field)?;
    let policy = eager.then(|| MappingPolicy::eager(depth.unwrap_or(DEFAULT_LOAD_DEPTH)));

    let mut store = RedbGraph::open(db_path)?;
    let collection = accessor.get_value(&mut store, &NodeRefMapper, NodeId(node), policy.as_ref())?;
    let effective = *collection.policy();
    let related = collection.into_entities();

    print_related(&store, json_mode, NodeId(node), &accessor, Some(&effective), &related)
}

// =============================================================================
// SET COMMAND
// =============================================================================

/// Replace a relationship field.
///
/// With neither targets nor `clear` the field is left untouched.
pub fn cmd_set(
    db_path: &Path,
    config: &AppConfig,
    json_mode: bool,
    node: u64,
    field: &str,
    targets: Option<Vec<u64>>,
    clear: bool,
) -> Result<(), LinksetError> {
    let accessor = lookup(config, field)?;
    let value = if clear {
        Some(Vec::new())
    } else {
        targets.map(|ids| ids.into_iter().map(|id| NodeRef::bound(NodeId(id))).collect())
    };

    let mut store = RedbGraph::open(db_path)?;
    let written = accessor
        .set_value(&mut store, &NodeRefMapper, NodeId(node), value, None)?
        .map(|collection| collection.into_entities());

    let Some(related) = written else {
        if json_mode {
            print_json(&serde_json::json!({
                "node": node,
                "field": accessor.name(),
                "changed": false
            }));
        } else {
            println!("No value given; {} left untouched", accessor.name());
        }
        return Ok(());
    };

    tracing::info!(field = accessor.name(), node, count = related.len(), "field replaced");
    print_related(&store, json_mode, NodeId(node), &accessor, None, &related)
}

// =============================================================================
// ADD / REMOVE COMMANDS
// =============================================================================

/// Link one target into a field.
pub fn cmd_add(
    db_path: &Path,
    config: &AppConfig,
    json_mode: bool,
    node: u64,
    field: &str,
    target: u64,
) -> Result<(), LinksetError> {
    let accessor = lookup(config, field)?;
    let mut store = RedbGraph::open(db_path)?;
    let mut collection = accessor.get_value(&mut store, &NodeRefMapper, NodeId(node), None)?;
    let added = collection.insert(NodeRef::bound(NodeId(target)))?;

    report_change(json_mode, &accessor, node, target, added, "Linked", "Already linked")
}

/// Unlink one target from a field.
pub fn cmd_remove(
    db_path: &Path,
    config: &AppConfig,
    json_mode: bool,
    node: u64,
    field: &str,
    target: u64,
) -> Result<(), LinksetError> {
    let accessor = lookup(config, field)?;
    let mut store = RedbGraph::open(db_path)?;
    let mut collection = accessor.get_value(&mut store, &NodeRefMapper, NodeId(node), None)?;
    let removed = collection.remove_node(NodeId(target))?;

    report_change(json_mode, &accessor, node, target, removed, "Unlinked", "Not linked")
}

// =============================================================================
// EDGES COMMAND
// =============================================================================

/// List every edge touching a node, across all edge types.
pub fn cmd_edges(db_path: &Path, json_mode: bool, node: u64) -> Result<(), LinksetError> {
    let store = RedbGraph::open(db_path)?;
    let node = NodeId(node);
    if !store.contains_node(node)? {
        return Err(LinksetError::NodeNotFound(node));
    }
    let edges = store.incident_edges(node)?;

    if json_mode {
        print_json(&serde_json::json!({ "node": node, "edges": edges }));
        return Ok(());
    }

    println!("Edges of {}: {}", node, edges.len());
    for edge in &edges {
        println!(
            "  [{}] {} -[{}]-> {}",
            edge.id.0, edge.start, edge.edge_type, edge.end
        );
    }
    Ok(())
}

// =============================================================================
// COMPACT COMMAND
// =============================================================================

/// Compact the database file.
pub fn cmd_compact(db_path: &Path) -> Result<(), LinksetError> {
    let mut store = RedbGraph::open(db_path)?;
    store.compact()?;
    println!("Compacted {:?}", db_path);
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Find the accessor for a qualified field name declared in the mapping file.
fn lookup(config: &AppConfig, field: &str) -> Result<FieldAccessor, LinksetError> {
    let decl = config
        .fields
        .iter()
        .find(|f| f.field_name() == field)
        .ok_or_else(|| LinksetError::ConfigError(format!("Field '{}' is not declared", field)))?;

    AccessorRegistry::new().resolve(decl)?.ok_or_else(|| {
        LinksetError::ConfigError(format!("Field '{}' is not a to-many relationship", field))
    })
}

fn print_related(
    store: &RedbGraph,
    json_mode: bool,
    source: NodeId,
    accessor: &FieldAccessor,
    policy: Option<&MappingPolicy>,
    related: &[NodeRef],
) -> Result<(), LinksetError> {
    if json_mode {
        print_json(&serde_json::json!({
            "node": source,
            "field": accessor.name(),
            "policy": policy,
            "related": related
        }));
        return Ok(());
    }

    println!("{} of {}: {}", accessor.name(), source, related.len());
    for entity in related {
        let Some(node) = entity.node() else { continue };
        let label = store.node_label(node)?.unwrap_or_default();
        println!("  {} {}", node, label);
    }
    Ok(())
}

fn report_change(
    json_mode: bool,
    accessor: &FieldAccessor,
    node: u64,
    target: u64,
    changed: bool,
    done: &str,
    skipped: &str,
) -> Result<(), LinksetError> {
    if json_mode {
        print_json(&serde_json::json!({
            "node": node,
            "field": accessor.name(),
            "target": target,
            "changed": changed
        }));
    } else if changed {
        println!("{} #{} in {} of #{}", done, target, accessor.name(), node);
    } else {
        println!("{} #{} in {} of #{}", skipped, target, accessor.name(), node);
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}
