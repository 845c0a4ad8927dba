//! Graph construction from normalized configuration blocks.
//!
//! Building happens in two passes: every block first becomes a node, then
//! every node's attributes are scanned for dependencies. Explicit
//! `depends_on` entries are recorded before references inferred from
//! interpolations, and the first edge recorded for an ordered node pair wins.

use log::{debug, info, trace, warn};

use terracanvas_core::{
    Value,
    configuration::Configuration,
    graph::{Edge, Graph, Node},
    kind::EdgeKind,
    layout::LayoutOptions,
};

use crate::reference;

/// Attribute holding explicit dependencies.
pub const DEPENDS_ON: &str = "depends_on";

/// Key prefix of attributes that are bookkeeping rather than configuration.
pub const INTERNAL_PREFIX: &str = "__";

/// Whether an attribute key is internal bookkeeping.
pub fn is_internal_key(key: &str) -> bool {
    key.starts_with(INTERNAL_PREFIX)
}

/// Build a graph from configuration blocks.
///
/// Nodes appear in section order (resources, data sources, modules,
/// variables, outputs). Positions are left at the origin; run a layout
/// engine to place them.
pub fn build_graph(configuration: &Configuration, options: LayoutOptions) -> Graph {
    let mut graph = Graph::with_options(options);

    for block in configuration.blocks() {
        let node = Node::new(block.kind, block.resource_type, block.name)
            .with_config(block.attributes.clone());
        if let Some(kept) = graph.node(&node.id) {
            warn!(
                node_id = node.id,
                kept = kept.label,
                skipped = node.label;
                "Two blocks map to the same node, skipping the later one"
            );
            continue;
        }
        if let Err(err) = graph.insert_node(node) {
            debug!(err:% = err; "Skipping block");
        }
    }

    let edges: Vec<Edge> = graph
        .nodes()
        .flat_map(|node| {
            let mut edges = depends_on_edges(&graph, node);
            edges.extend(reference_edges(&graph, node));
            edges
        })
        .collect();

    for edge in edges {
        if graph.edge_between(&edge.source_id, &edge.target_id).is_some() {
            trace!(source = edge.source_id, target = edge.target_id; "Skipping parallel edge");
            continue;
        }
        if let Err(err) = graph.insert_edge(edge) {
            debug!(err:% = err; "Dropping edge");
        }
    }

    info!(
        nodes = graph.nodes_count(),
        edges = graph.edges_count();
        "Graph built from configuration"
    );
    graph
}

/// Edges for the node's explicit `depends_on` list, from each dependency to
/// the node.
///
/// Entries may be node ids (`resource.aws_vpc.main`), addresses
/// (`aws_vpc.main`) or interpolations of either. Entries that do not resolve
/// to a node are dropped.
fn depends_on_edges(graph: &Graph, node: &Node) -> Vec<Edge> {
    let Some(Value::Array(entries)) = node.config.get(DEPENDS_ON) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|entry| {
            let path = reference::unwrap_reference(entry).unwrap_or(entry);
            let resolved = reference::resolve(path, |id| graph.contains_node(id));
            if resolved.is_none() {
                debug!(node = node.id, entry = entry; "Dropping unresolved depends_on entry");
            }
            resolved
        })
        .filter(|dependency| *dependency != node.id)
        .map(|dependency| Edge::new(dependency, &node.id, EdgeKind::DependsOn, DEPENDS_ON))
        .collect()
}

/// Edges for references found in the node's attribute values, from each
/// referenced node to the node, labeled with the top-level attribute key.
fn reference_edges(graph: &Graph, node: &Node) -> Vec<Edge> {
    let mut edges = Vec::new();
    for (key, value) in &node.config {
        if key == DEPENDS_ON || is_internal_key(key) {
            continue;
        }
        let mut paths = Vec::new();
        collect_references(value, &mut paths);
        for path in paths {
            match reference::resolve(&path, |id| graph.contains_node(id)) {
                Some(target) if target != node.id => {
                    edges.push(Edge::new(target, &node.id, EdgeKind::Reference, key.as_str()));
                }
                Some(_) => {}
                None => trace!(node = node.id, path = path; "Reference does not name a node"),
            }
        }
    }
    edges
}

/// Collect reference paths from every string nested in a value.
fn collect_references(value: &Value, paths: &mut Vec<String>) {
    match value {
        Value::String(s) => paths.extend(reference::extract_references(s)),
        Value::Array(items) => {
            for item in items {
                collect_references(item, paths);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                if !is_internal_key(key) {
                    collect_references(item, paths);
                }
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}
