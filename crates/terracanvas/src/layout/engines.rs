//! Layout engine factory.
//!
//! Engines are selected by [`LayoutEngine`] and created through
//! [`EngineBuilder`], which caches one instance per engine type.

mod layered;
mod sugiyama;

use std::collections::HashMap;

use terracanvas_core::{graph::Graph, layout::{LayoutEngine, LayoutOptions}};

use super::LayoutResult;
use crate::error::TerracanvasError;

/// Trait implemented by every layout engine.
pub trait Engine: Send + Sync {
    /// Calculate positions for every node of `graph` and the resulting bounds.
    ///
    /// Implementations must be deterministic: the result depends only on node
    /// ids, node sizes, edges and `options`.
    fn calculate(
        &self,
        graph: &Graph,
        options: &LayoutOptions,
    ) -> Result<LayoutResult, TerracanvasError>;
}

/// Builder for creating and configuring layout engines.
pub struct EngineBuilder {
    // Cache for reusing engines with the same configuration
    engines: HashMap<LayoutEngine, Box<dyn Engine>>,

    crossing_sweeps: usize,
}

impl EngineBuilder {
    /// Create a new engine builder with an empty cache and default settings.
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
            crossing_sweeps: 8,
        }
    }

    /// Set the number of barycenter sweeps used by the layered engine.
    pub fn with_crossing_sweeps(mut self, sweeps: usize) -> Self {
        self.crossing_sweeps = sweeps;
        self
    }

    /// Get an engine of the specified type, creating it on first use.
    pub fn engine(&mut self, engine_type: LayoutEngine) -> &dyn Engine {
        let engine = self
            .engines
            .entry(engine_type)
            .or_insert_with(|| create_engine(engine_type, self.crossing_sweeps));
        &**engine
    }

    /// Take ownership of an engine of the specified type.
    pub fn build(mut self, engine_type: LayoutEngine) -> Box<dyn Engine> {
        self.engines
            .remove(&engine_type)
            .unwrap_or_else(|| create_engine(engine_type, self.crossing_sweeps))
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn create_engine(engine_type: LayoutEngine, crossing_sweeps: usize) -> Box<dyn Engine> {
    match engine_type {
        LayoutEngine::Layered => {
            let mut engine = layered::Layered::new();
            engine.set_sweeps(crossing_sweeps);
            Box::new(engine)
        }
        LayoutEngine::Sugiyama => Box::new(sugiyama::Sugiyama::new()),
    }
}
