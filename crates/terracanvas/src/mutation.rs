//! Incremental graph mutations.
//!
//! Every operation takes the current graph by reference and returns a new
//! graph, so a failed operation leaves the caller's graph untouched. Changes
//! that can affect placement re-run the layout engine on the result.

use log::{debug, info};
use serde::Deserialize;

use terracanvas_core::{
    Attributes,
    graph::{Edge, Graph, Node},
    kind::{EdgeKind, NodeKind},
};

use crate::{
    error::TerracanvasError,
    layout::{self, Engine},
};

/// Fields for a new node.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeData {
    pub id: Option<String>,
    pub kind: Option<String>,
    pub resource_type: Option<String>,
    pub name: Option<String>,
    pub label: Option<String>,
    pub config: Option<Attributes>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

/// Partial update for an existing node. Absent fields are left unchanged.
///
/// `id` and `kind` cannot be changed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodePatch {
    pub label: Option<String>,
    pub resource_type: Option<String>,
    pub name: Option<String>,
    pub config: Option<Attributes>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl NodePatch {
    /// Whether the patch places the node explicitly.
    pub fn is_positional(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }
}

/// Fields for a new edge.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    pub source_id: String,
    pub target_id: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

/// Partial update for an existing edge.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EdgePatch {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub label: Option<String>,
}

/// Applies mutations and keeps the layout consistent with them.
pub struct Mutator<'a> {
    engine: &'a dyn Engine,
}

impl<'a> Mutator<'a> {
    pub fn new(engine: &'a dyn Engine) -> Self {
        Self { engine }
    }

    /// Add a node and re-layout.
    ///
    /// The id is derived from kind, type and name unless supplied.
    ///
    /// # Errors
    ///
    /// [`TerracanvasError::Validation`] if the kind is missing or unknown,
    /// if neither id nor name is given, or if the id is already taken.
    pub fn add_node(&self, graph: &Graph, data: NodeData) -> Result<Graph, TerracanvasError> {
        let kind: NodeKind = data
            .kind
            .as_deref()
            .ok_or_else(|| TerracanvasError::Validation("node kind is required".to_string()))?
            .parse()?;

        let resource_type = data.resource_type.as_deref();
        let mut node = match (data.id, data.name.as_deref()) {
            (id, Some(name)) => {
                let mut node = Node::new(kind, resource_type, name);
                if let Some(id) = id {
                    node.id = id;
                }
                node
            }
            (Some(id), None) => {
                let mut node = Node::new(kind, resource_type, &id);
                node.name = None;
                node.id = id;
                node
            }
            (None, None) => {
                return Err(TerracanvasError::Validation(
                    "node needs an id or a name".to_string(),
                ));
            }
        };
        if node.id.is_empty() {
            return Err(TerracanvasError::Validation("node id is empty".to_string()));
        }

        if let Some(label) = data.label {
            node.label = label;
        }
        if let Some(config) = data.config {
            node.config = config;
        }
        if let Some(width) = data.width {
            node.width = width;
        }
        if let Some(height) = data.height {
            node.height = height;
        }
        node.apply_default_size();

        let mut graph = graph.clone();
        let id = node.id.clone();
        graph.insert_node(node)?;
        layout::relayout(&mut graph, self.engine)?;

        info!(node_id = id; "Node added");
        Ok(graph)
    }

    /// Update a node.
    ///
    /// A patch carrying `x` or `y` places the node where given and leaves
    /// every other node alone. Any other patch re-runs the layout, which
    /// discards manual placement.
    ///
    /// # Errors
    ///
    /// [`TerracanvasError::NotFound`] if the node does not exist.
    pub fn update_node(
        &self,
        graph: &Graph,
        id: &str,
        patch: NodePatch,
    ) -> Result<Graph, TerracanvasError> {
        let mut graph = graph.clone();
        let positional = patch.is_positional();
        let node = graph
            .node_mut(id)
            .ok_or_else(|| TerracanvasError::node_not_found(id))?;

        if let Some(label) = patch.label {
            node.label = label;
        }
        if let Some(resource_type) = patch.resource_type {
            if node.kind.has_resource_type() {
                node.resource_type = Some(resource_type);
            } else {
                return Err(TerracanvasError::Validation(format!(
                    "`{}` nodes have no resource type",
                    node.kind
                )));
            }
        }
        if let Some(name) = patch.name {
            node.name = Some(name);
        }
        if let Some(config) = patch.config {
            node.config = config;
        }
        if let Some(width) = patch.width {
            node.width = width;
        }
        if let Some(height) = patch.height {
            node.height = height;
        }
        node.apply_default_size();
        if let Some(x) = patch.x {
            node.x = x;
        }
        if let Some(y) = patch.y {
            node.y = y;
        }

        if positional {
            debug!(node_id = id; "Node placed explicitly, skipping layout");
        } else {
            layout::relayout(&mut graph, self.engine)?;
        }
        info!(node_id = id; "Node updated");
        Ok(graph)
    }

    /// Delete a node together with its incident edges, then re-layout.
    ///
    /// # Errors
    ///
    /// [`TerracanvasError::NotFound`] if the node does not exist.
    pub fn delete_node(&self, graph: &Graph, id: &str) -> Result<Graph, TerracanvasError> {
        let mut graph = graph.clone();
        let (_, removed) = graph
            .remove_node(id)
            .ok_or_else(|| TerracanvasError::node_not_found(id))?;
        layout::relayout(&mut graph, self.engine)?;

        info!(node_id = id, removed_edges = removed.len(); "Node deleted");
        Ok(graph)
    }

    /// Add an edge, replacing any edge for the same ordered pair, then
    /// re-layout.
    ///
    /// The edge type defaults to `reference`.
    ///
    /// # Errors
    ///
    /// [`TerracanvasError::NotFound`] if either endpoint does not exist, or
    /// [`TerracanvasError::Validation`] for an unknown edge type.
    pub fn add_edge(&self, graph: &Graph, data: EdgeData) -> Result<Graph, TerracanvasError> {
        let kind = match data.kind.as_deref() {
            Some(kind) => kind.parse()?,
            None => EdgeKind::default(),
        };
        let label = data.label.unwrap_or_else(|| match kind {
            EdgeKind::DependsOn => kind.as_str().to_string(),
            EdgeKind::Reference => String::new(),
        });
        if data.source_id == data.target_id {
            return Err(TerracanvasError::Validation(format!(
                "edge cannot connect `{}` to itself",
                data.source_id
            )));
        }

        let mut graph = graph.clone();
        let edge = Edge::new(data.source_id, data.target_id, kind, label);
        let edge_id = edge.id.clone();
        if graph.insert_edge(edge)?.is_some() {
            debug!(edge_id = edge_id; "Replaced existing edge for pair");
        }
        layout::relayout(&mut graph, self.engine)?;

        info!(edge_id = edge_id; "Edge added");
        Ok(graph)
    }

    /// Update the type or label of the edge between an ordered pair.
    ///
    /// Ranks depend only on which pairs are connected, so the layout is left
    /// as it is.
    ///
    /// # Errors
    ///
    /// [`TerracanvasError::NotFound`] if there is no such edge, or
    /// [`TerracanvasError::Validation`] for an unknown edge type.
    pub fn update_edge(
        &self,
        graph: &Graph,
        source_id: &str,
        target_id: &str,
        patch: EdgePatch,
    ) -> Result<Graph, TerracanvasError> {
        let kind = patch.kind.as_deref().map(str::parse::<EdgeKind>).transpose()?;

        let mut graph = graph.clone();
        let edge = graph
            .edge_between_mut(source_id, target_id)
            .ok_or_else(|| edge_not_found(source_id, target_id))?;
        if let Some(kind) = kind {
            edge.kind = kind;
        }
        if let Some(label) = patch.label {
            edge.label = label;
        }

        info!(source_id = source_id, target_id = target_id; "Edge updated");
        Ok(graph)
    }

    /// Delete the edge between an ordered pair, then re-layout.
    ///
    /// # Errors
    ///
    /// [`TerracanvasError::NotFound`] if there is no such edge.
    pub fn delete_edge(
        &self,
        graph: &Graph,
        source_id: &str,
        target_id: &str,
    ) -> Result<Graph, TerracanvasError> {
        let mut graph = graph.clone();
        graph
            .remove_edge_between(source_id, target_id)
            .ok_or_else(|| edge_not_found(source_id, target_id))?;
        layout::relayout(&mut graph, self.engine)?;

        info!(source_id = source_id, target_id = target_id; "Edge deleted");
        Ok(graph)
    }

    /// Re-run the layout on a copy of `graph`.
    pub fn relayout(&self, graph: &Graph) -> Result<Graph, TerracanvasError> {
        let mut graph = graph.clone();
        layout::relayout(&mut graph, self.engine)?;
        Ok(graph)
    }
}

fn edge_not_found(source_id: &str, target_id: &str) -> TerracanvasError {
    TerracanvasError::NotFound(format!("edge `{}`", Edge::id_for(source_id, target_id)))
}
