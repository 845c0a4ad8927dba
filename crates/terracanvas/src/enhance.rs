//! Optional label enhancement by an external collaborator.
//!
//! An [`Enhancer`] receives a compact projection of a graph and proposes
//! friendlier labels and icons for nodes and verbs for edges. Proposals are
//! advisory: [`merge`] adopts them only for nodes and edges that exist, and
//! only for those presentation fields. Structure is never changed.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use terracanvas_core::{Value, graph::Graph};

/// Failures reported by an enhancer.
#[derive(Debug, Error)]
pub enum EnhancerError {
    #[error("enhancer unavailable: {0}")]
    Unavailable(String),

    #[error("invalid enhancer response: {0}")]
    InvalidResponse(String),
}

/// A node as seen by an enhancer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeSummary {
    pub id: String,
    /// Resource type, or the node kind for kinds without one.
    #[serde(rename = "type")]
    pub node_type: String,
}

/// An edge as seen by an enhancer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSummary {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
}

/// Compact graph projection sent to an enhancer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EnhancementRequest {
    pub nodes: Vec<NodeSummary>,
    pub edges: Vec<EdgeSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NodeEnhancement {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EdgeEnhancement {
    pub id: String,
    #[serde(default)]
    pub verb: Option<String>,
}

/// Proposals returned by an enhancer.
///
/// `groups` and `annotations` are accepted but not applied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnhancementResponse {
    pub nodes: Vec<NodeEnhancement>,
    pub edges: Vec<EdgeEnhancement>,
    pub groups: Vec<Value>,
    pub annotations: Vec<Value>,
}

/// A source of presentation proposals.
pub trait Enhancer {
    fn enhance(&self, request: &EnhancementRequest) -> Result<EnhancementResponse, EnhancerError>;
}

/// Build the request for `graph`.
pub fn project(graph: &Graph) -> EnhancementRequest {
    EnhancementRequest {
        nodes: graph
            .nodes()
            .map(|node| NodeSummary {
                id: node.id.clone(),
                node_type: node
                    .resource_type
                    .clone()
                    .unwrap_or_else(|| node.kind.to_string()),
            })
            .collect(),
        edges: graph
            .edges()
            .map(|edge| EdgeSummary {
                id: edge.id.clone(),
                source_id: edge.source_id.clone(),
                target_id: edge.target_id.clone(),
            })
            .collect(),
    }
}

/// Apply `response` to a copy of `graph`.
///
/// Only `label` and `icon` of existing nodes and `verb` of existing edges
/// are taken; entries for unknown ids are ignored.
pub fn merge(graph: &Graph, response: &EnhancementResponse) -> Graph {
    let mut graph = graph.clone();
    let mut applied = 0;

    for proposal in &response.nodes {
        let Some(node) = graph.node_mut(&proposal.id) else {
            debug!(node_id = proposal.id; "Ignoring proposal for unknown node");
            continue;
        };
        if let Some(label) = &proposal.label {
            node.label = label.clone();
            applied += 1;
        }
        if let Some(icon) = &proposal.icon {
            node.icon = Some(icon.clone());
            applied += 1;
        }
    }

    for proposal in &response.edges {
        let Some(edge) = graph.edge_mut(&proposal.id) else {
            debug!(edge_id = proposal.id; "Ignoring proposal for unknown edge");
            continue;
        };
        if let Some(verb) = &proposal.verb {
            edge.verb = Some(verb.clone());
            applied += 1;
        }
    }

    if !response.groups.is_empty() || !response.annotations.is_empty() {
        debug!(
            groups = response.groups.len(),
            annotations = response.annotations.len();
            "Ignoring groups and annotations"
        );
    }
    info!(applied = applied; "Enhancements merged");
    graph
}

/// Run `enhancer` on `graph` and merge its proposals.
///
/// A failing enhancer leaves the graph unchanged.
pub fn enhance(graph: &Graph, enhancer: &dyn Enhancer) -> Graph {
    match enhancer.enhance(&project(graph)) {
        Ok(response) => merge(graph, &response),
        Err(err) => {
            warn!(err:% = err; "Enhancer failed, keeping graph unchanged");
            graph.clone()
        }
    }
}
