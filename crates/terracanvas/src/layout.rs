//! Layered graph layout.
//!
//! A layout run maps a [`Graph`] and [`LayoutOptions`] to a position for
//! every node plus the bounding box of the drawing. Runs are pure: they read
//! node ids, node sizes and edges, never the current positions, so laying
//! out an unchanged graph twice yields identical results.
//!
//! Engines only decide *ranks* and the *order* within each rank (a
//! [`Layering`]); turning a layering into coordinates is shared.

mod engines;
mod layering;

pub use engines::{Engine, EngineBuilder};
pub use layering::{Layering, Slot};
pub use terracanvas_core::layout::{Direction, LayoutEngine, LayoutOptions};

use std::collections::BTreeMap;

use log::debug;

use terracanvas_core::{
    geometry::{Point, Size},
    graph::Graph,
};

use crate::error::TerracanvasError;

/// Positions and bounds produced by a layout run.
///
/// Positions are the top-left corner of each node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutResult {
    positions: BTreeMap<String, Point>,
    bounds: Size,
}

impl LayoutResult {
    pub fn new(positions: BTreeMap<String, Point>, bounds: Size) -> Self {
        Self { positions, bounds }
    }

    pub fn positions(&self) -> &BTreeMap<String, Point> {
        &self.positions
    }

    pub fn position(&self, node_id: &str) -> Option<Point> {
        self.positions.get(node_id).copied()
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }
}

/// Lay out a graph with its own layout options.
///
/// # Errors
///
/// Returns [`TerracanvasError::Layout`] when the engine fails.
pub fn layout(graph: &Graph, engine: &dyn Engine) -> Result<LayoutResult, TerracanvasError> {
    let options = graph.options();
    let result = engine.calculate(graph, &options)?;
    debug!(
        nodes = result.positions.len(),
        width = result.bounds.width(),
        height = result.bounds.height();
        "Layout calculated"
    );
    Ok(result)
}

/// Return a copy of `graph` with the positions and bounds of `result`.
pub fn apply(graph: &Graph, result: &LayoutResult) -> Graph {
    let mut graph = graph.clone();
    apply_in_place(&mut graph, result);
    graph
}

/// Write the positions and bounds of `result` into a working copy.
pub(crate) fn apply_in_place(graph: &mut Graph, result: &LayoutResult) {
    for node in graph.nodes_mut() {
        if let Some(position) = result.positions.get(&node.id) {
            node.x = position.x();
            node.y = position.y();
        }
    }
    graph.set_bounds(result.bounds);
}

/// Lay out a working copy and store the result in it.
pub(crate) fn relayout(graph: &mut Graph, engine: &dyn Engine) -> Result<(), TerracanvasError> {
    let result = layout(graph, engine)?;
    apply_in_place(graph, &result);
    Ok(())
}

/// Convert a layering into coordinates.
pub(crate) fn place(graph: &Graph, layering: &Layering, options: &LayoutOptions) -> LayoutResult {
    layering::place(graph, layering, options)
}
