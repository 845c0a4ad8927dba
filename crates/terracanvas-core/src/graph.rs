//! The diagram model: nodes, edges and layout metadata.
//!
//! A [`Graph`] owns its nodes keyed by id and its edges keyed by edge id.
//! Every edge endpoint is checked on insertion and removing a node removes
//! every edge incident to it, so referential integrity holds after every
//! operation rather than being repaired lazily.
//!
//! Graphs serialize to the snapshot shape consumed by renderers:
//! `{ nodes: [...], edges: [...], width, height, layout }`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::{
    Attributes,
    geometry::{Point, Size},
    kind::{EdgeKind, NodeKind},
    layout::LayoutOptions,
};

/// Errors raised when a graph operation would break referential integrity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("edge `{edge}` references missing node `{node}`")]
    MissingEndpoint { edge: String, node: String },

    #[error("node `{0}` already exists")]
    DuplicateNode(String),
}

/// A diagram node representing one configuration block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub config: Attributes,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Node {
    /// Create a node for a block, with its canonical id, label and the
    /// default size of its kind.
    pub fn new(kind: NodeKind, resource_type: Option<&str>, name: &str) -> Self {
        let resource_type = resource_type.filter(|_| kind.has_resource_type());
        let size = kind.default_size();
        Self {
            id: Self::id_for(kind, resource_type, name),
            kind,
            resource_type: resource_type.map(str::to_string),
            name: Some(name.to_string()),
            label: Self::default_label(kind, resource_type, name),
            config: Attributes::new(),
            x: 0.0,
            y: 0.0,
            width: size.width(),
            height: size.height(),
            icon: None,
        }
    }

    /// Set the attribute map (builder style).
    pub fn with_config(mut self, config: Attributes) -> Self {
        self.config = config;
        self
    }

    /// Node id for a block: `<kind>.<type>.<name>`, or `<kind>.<name>` for
    /// kinds without a resource type.
    pub fn id_for(kind: NodeKind, resource_type: Option<&str>, name: &str) -> String {
        match resource_type {
            Some(resource_type) if kind.has_resource_type() => {
                format!("{kind}.{resource_type}.{name}")
            }
            _ => format!("{kind}.{name}"),
        }
    }

    /// Display label for a block, rendered as its configuration address.
    pub fn default_label(kind: NodeKind, resource_type: Option<&str>, name: &str) -> String {
        match (kind, resource_type) {
            (NodeKind::Resource, Some(resource_type)) => format!("{resource_type}.{name}"),
            (NodeKind::Data, Some(resource_type)) => format!("data.{resource_type}.{name}"),
            (NodeKind::Variable, _) => format!("var.{name}"),
            (kind, _) => format!("{kind}.{name}"),
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Fill in the default size of this node's kind for any dimension that
    /// is unset.
    pub fn apply_default_size(&mut self) {
        let size = self.kind.default_size();
        if self.width <= 0.0 {
            self.width = size.width();
        }
        if self.height <= 0.0 {
            self.height = size.height();
        }
    }
}

/// A directed dependency edge between two nodes.
///
/// Edges point from the node being depended upon to the dependent node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(rename = "type", default)]
    pub kind: EdgeKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
}

impl Edge {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        kind: EdgeKind,
        label: impl Into<String>,
    ) -> Self {
        let source_id = source_id.into();
        let target_id = target_id.into();
        Self {
            id: Self::id_for(&source_id, &target_id),
            source_id,
            target_id,
            kind,
            label: label.into(),
            verb: None,
        }
    }

    /// Edge id for an ordered node pair.
    pub fn id_for(source_id: &str, target_id: &str) -> String {
        format!("{source_id}->{target_id}")
    }

    /// Whether this edge touches the given node.
    pub fn is_incident_to(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }
}

/// Layout options together with the bounding box they produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutMeta {
    pub options: LayoutOptions,
    pub width: f32,
    pub height: f32,
}

/// A diagram: nodes keyed by id, edges keyed by edge id, and layout metadata.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Snapshot")]
pub struct Graph {
    nodes: IndexMap<String, Node>,
    edges: IndexMap<String, Edge>,
    layout: LayoutMeta,
}

impl Graph {
    /// Create an empty graph with default layout options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with the given layout options.
    pub fn with_options(options: LayoutOptions) -> Self {
        Self {
            layout: LayoutMeta {
                options,
                ..LayoutMeta::default()
            },
            ..Self::default()
        }
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        self.edges.get_mut(id)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edges_count(&self) -> usize {
        self.edges.len()
    }

    /// The edge connecting an ordered node pair, if any.
    pub fn edge_between(&self, source_id: &str, target_id: &str) -> Option<&Edge> {
        self.edges.get(&Edge::id_for(source_id, target_id))
    }

    pub fn edge_between_mut(&mut self, source_id: &str, target_id: &str) -> Option<&mut Edge> {
        self.edges.get_mut(&Edge::id_for(source_id, target_id))
    }

    /// Edges with the given node as either endpoint.
    pub fn incident_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> {
        self.edges
            .values()
            .filter(move |edge| edge.is_incident_to(node_id))
    }

    /// Insert a node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateNode`] if a node with the same id exists.
    pub fn insert_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    /// Remove a node together with every edge incident to it.
    ///
    /// Returns the removed node and the removed edges, or `None` if the node
    /// does not exist.
    pub fn remove_node(&mut self, id: &str) -> Option<(Node, Vec<Edge>)> {
        let node = self.nodes.shift_remove(id)?;
        let incident: Vec<String> = self
            .edges
            .values()
            .filter(|edge| edge.is_incident_to(id))
            .map(|edge| edge.id.clone())
            .collect();
        let removed = incident
            .iter()
            .filter_map(|edge_id| self.edges.shift_remove(edge_id))
            .collect();
        Some((node, removed))
    }

    /// Insert an edge, replacing any edge for the same ordered pair.
    ///
    /// Returns the replaced edge, if any.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::MissingEndpoint`] if either endpoint is not a
    /// node of this graph. The graph is unchanged in that case.
    pub fn insert_edge(&mut self, edge: Edge) -> Result<Option<Edge>, GraphError> {
        for endpoint in [&edge.source_id, &edge.target_id] {
            if !self.nodes.contains_key(endpoint) {
                return Err(GraphError::MissingEndpoint {
                    edge: edge.id.clone(),
                    node: endpoint.clone(),
                });
            }
        }
        Ok(self.edges.insert(edge.id.clone(), edge))
    }

    /// Remove the edge for an ordered node pair.
    pub fn remove_edge_between(&mut self, source_id: &str, target_id: &str) -> Option<Edge> {
        self.edges.shift_remove(&Edge::id_for(source_id, target_id))
    }

    pub fn layout(&self) -> &LayoutMeta {
        &self.layout
    }

    pub fn options(&self) -> LayoutOptions {
        self.layout.options
    }

    pub fn set_options(&mut self, options: LayoutOptions) {
        self.layout.options = options;
    }

    pub fn width(&self) -> f32 {
        self.layout.width
    }

    pub fn height(&self) -> f32 {
        self.layout.height
    }

    /// Record the bounding box produced by a layout run.
    pub fn set_bounds(&mut self, bounds: Size) {
        self.layout.width = bounds.width();
        self.layout.height = bounds.height();
    }
}

/// Serialized form of a [`Graph`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Snapshot {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    width: f32,
    height: f32,
    layout: LayoutOptions,
}

/// Borrowed serialized form of a [`Graph`].
#[derive(Serialize)]
struct SnapshotRef<'a> {
    nodes: Vec<&'a Node>,
    edges: Vec<&'a Edge>,
    width: f32,
    height: f32,
    layout: &'a LayoutOptions,
}

impl Serialize for Graph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SnapshotRef {
            nodes: self.nodes.values().collect(),
            edges: self.edges.values().collect(),
            width: self.layout.width,
            height: self.layout.height,
            layout: &self.layout.options,
        }
        .serialize(serializer)
    }
}

impl TryFrom<Snapshot> for Graph {
    type Error = GraphError;

    fn try_from(snapshot: Snapshot) -> Result<Self, Self::Error> {
        let mut graph = Graph::with_options(snapshot.layout);
        for node in snapshot.nodes {
            graph.insert_node(node)?;
        }
        for mut edge in snapshot.edges {
            edge.id = Edge::id_for(&edge.source_id, &edge.target_id);
            graph.insert_edge(edge)?;
        }
        graph.set_bounds(Size::new(snapshot.width, snapshot.height));
        Ok(graph)
    }
}
