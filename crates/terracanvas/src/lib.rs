//! Terracanvas - a bidirectional diagram engine for infrastructure-as-code.
//!
//! Configuration blocks become a node/edge diagram, the diagram is edited
//! through incremental mutations that keep an automatic layered layout
//! consistent, and the diagram is written back out as configuration text.
//!
//! The pieces are usable on their own:
//!
//! - [`builder`] turns a [`Configuration`] into a [`Graph`]
//! - [`layout`] places nodes
//! - [`mutation`] applies add/update/delete operations
//! - [`store`] keeps one graph per diagram id
//! - [`codegen`] writes configuration files
//! - [`enhance`] merges presentation proposals from an external enhancer
//!
//! [`DiagramService`] ties them together behind diagram ids.

pub mod builder;
pub mod codegen;
pub mod config;
pub mod enhance;
pub mod layout;
pub mod mutation;
pub mod reference;
pub mod store;

mod error;

pub use terracanvas_core::{Attributes, Value, configuration, geometry, graph, kind};

pub use error::TerracanvasError;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use log::{debug, info, trace};

use codegen::{CodeGenerator, GeneratedFiles};
use config::AppConfig;
use configuration::Configuration;
use enhance::Enhancer;
use graph::Graph;
use layout::{Engine, EngineBuilder};
use mutation::{EdgeData, EdgePatch, Mutator, NodeData, NodePatch};
use store::{GraphStore, MemoryStore};

/// Diagram-level operations over a [`GraphStore`].
///
/// Every write to a diagram runs under that diagram's writer lock, from
/// reading the current graph to storing the new one, so concurrent
/// mutations of one diagram apply one after another. Different diagrams do
/// not contend. Operations work on a copy and store it only on success.
///
/// Writer locks exist only while some operation on the diagram is in
/// flight; the last holder to finish removes the lock again.
///
/// # Examples
///
/// ```
/// use terracanvas::{DiagramService, config::AppConfig, mutation::NodeData};
///
/// let service = DiagramService::new(AppConfig::default());
/// let source = r#"
///     variable "region" {}
///     resource "aws_s3_bucket" "logs" {
///       region = var.region
///     }
/// "#;
///
/// let graph = service.build_from_source("demo", source)?;
/// assert_eq!(graph.nodes_count(), 2);
/// assert!(graph.edge_between("variable.region", "resource.aws_s3_bucket.logs").is_some());
///
/// let files = service.generate("demo")?;
/// assert!(files["main.tf"].contains("region = var.region"));
/// # Ok::<(), terracanvas::TerracanvasError>(())
/// ```
pub struct DiagramService {
    config: AppConfig,
    store: Box<dyn GraphStore>,
    engine: Box<dyn Engine>,
    generator: CodeGenerator,
    /// In-flight writer locks by diagram id. Entries are created and
    /// removed only while this map is locked.
    writers: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DiagramService {
    /// Create a service backed by a [`MemoryStore`] sized from `config`.
    pub fn new(config: AppConfig) -> Self {
        let store = MemoryStore::new(config.store().capacity());
        Self::with_store(config, Box::new(store))
    }

    /// Create a service backed by the given store.
    pub fn with_store(config: AppConfig, store: Box<dyn GraphStore>) -> Self {
        let engine = EngineBuilder::new().build(config.layout().engine());
        let generator = CodeGenerator::from_config(config.generation());
        Self {
            config,
            store,
            engine,
            generator,
            writers: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build a diagram from configuration blocks, replacing any diagram
    /// stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TerracanvasError::Layout`] if the layout engine fails.
    pub fn build_from_configuration(
        &self,
        id: &str,
        configuration: &Configuration,
    ) -> Result<Graph, TerracanvasError> {
        info!(diagram_id = id; "Building diagram");
        let graph = self.write(id, |_| {
            let mut graph = builder::build_graph(configuration, self.config.layout().options());
            layout::relayout(&mut graph, self.engine.as_ref())?;
            Ok(graph)
        })?;
        trace!(graph:? = graph; "Built diagram");
        Ok(graph)
    }

    /// Parse configuration text and build a diagram from it.
    ///
    /// # Errors
    ///
    /// Returns [`TerracanvasError::Parse`] for invalid source text.
    pub fn build_from_source(&self, id: &str, source: &str) -> Result<Graph, TerracanvasError> {
        let configuration = terracanvas_parser::parse(source)
            .map_err(|err| TerracanvasError::new_parse_error(err, source))?;
        self.build_from_configuration(id, &configuration)
    }

    /// Store an existing snapshot under `id` as is, keeping its positions.
    pub fn import(&self, id: &str, graph: Graph) -> Result<Graph, TerracanvasError> {
        self.write(id, |_| Ok(graph))
    }

    /// The current graph of a diagram.
    ///
    /// # Errors
    ///
    /// Returns [`TerracanvasError::NotFound`] for an unknown diagram.
    pub fn snapshot(&self, id: &str) -> Result<Graph, TerracanvasError> {
        self.store.get(id).ok_or_else(|| diagram_not_found(id))
    }

    pub fn add_node(&self, id: &str, data: NodeData) -> Result<Graph, TerracanvasError> {
        self.mutate(id, |mutator, graph| mutator.add_node(graph, data))
    }

    pub fn update_node(
        &self,
        id: &str,
        node_id: &str,
        patch: NodePatch,
    ) -> Result<Graph, TerracanvasError> {
        self.mutate(id, |mutator, graph| mutator.update_node(graph, node_id, patch))
    }

    pub fn delete_node(&self, id: &str, node_id: &str) -> Result<Graph, TerracanvasError> {
        self.mutate(id, |mutator, graph| mutator.delete_node(graph, node_id))
    }

    pub fn add_edge(&self, id: &str, data: EdgeData) -> Result<Graph, TerracanvasError> {
        self.mutate(id, |mutator, graph| mutator.add_edge(graph, data))
    }

    pub fn update_edge(
        &self,
        id: &str,
        source_id: &str,
        target_id: &str,
        patch: EdgePatch,
    ) -> Result<Graph, TerracanvasError> {
        self.mutate(id, |mutator, graph| {
            mutator.update_edge(graph, source_id, target_id, patch)
        })
    }

    pub fn delete_edge(
        &self,
        id: &str,
        source_id: &str,
        target_id: &str,
    ) -> Result<Graph, TerracanvasError> {
        self.mutate(id, |mutator, graph| {
            mutator.delete_edge(graph, source_id, target_id)
        })
    }

    /// Re-run the layout of a diagram, discarding manual placement.
    pub fn relayout(&self, id: &str) -> Result<Graph, TerracanvasError> {
        self.mutate(id, |mutator, graph| mutator.relayout(graph))
    }

    /// Merge presentation proposals from `enhancer` into a diagram.
    ///
    /// A failing enhancer leaves the diagram unchanged; only an unknown
    /// diagram id is an error.
    pub fn enhance(&self, id: &str, enhancer: &dyn Enhancer) -> Result<Graph, TerracanvasError> {
        self.mutate(id, |_, graph| Ok(enhance::enhance(graph, enhancer)))
    }

    /// Generate configuration files for a diagram.
    ///
    /// # Errors
    ///
    /// Returns [`TerracanvasError::NotFound`] for an unknown diagram, or
    /// [`TerracanvasError::Generation`] if a node cannot be emitted.
    pub fn generate(&self, id: &str) -> Result<GeneratedFiles, TerracanvasError> {
        let graph = self.snapshot(id)?;
        let files = self.generator.generate(&graph)?;
        info!(diagram_id = id, files = files.len(); "Diagram generated");
        Ok(files)
    }

    /// Drop a diagram. Returns whether it existed.
    pub fn evict(&self, id: &str) -> bool {
        let writer = self.acquire(id);
        let removed = {
            let _guard = lock(&writer);
            self.store.delete(id)
        };
        self.release(id, writer);
        debug!(diagram_id = id, removed = removed; "Diagram evicted");
        removed
    }

    /// Number of diagrams currently stored.
    pub fn diagrams_count(&self) -> usize {
        self.store.len()
    }

    /// The writer lock of `id`, created if no operation holds one.
    fn acquire(&self, id: &str) -> Arc<Mutex<()>> {
        Arc::clone(lock(&self.writers).entry(id.to_string()).or_default())
    }

    /// Give back a lock obtained from [`Self::acquire`], removing it once no
    /// other operation holds it.
    ///
    /// Clones are only handed out under the map lock, so a count of one
    /// seen under that lock means nobody can be waiting on the writer.
    fn release(&self, id: &str, writer: Arc<Mutex<()>>) {
        let mut writers = lock(&self.writers);
        drop(writer);
        if writers
            .get(id)
            .is_some_and(|writer| Arc::strong_count(writer) == 1)
        {
            writers.remove(id);
        }
    }

    /// Run `f` on the stored graph (if any) under the diagram's writer lock
    /// and store its result.
    fn write<F>(&self, id: &str, f: F) -> Result<Graph, TerracanvasError>
    where
        F: FnOnce(Option<Graph>) -> Result<Graph, TerracanvasError>,
    {
        let writer = self.acquire(id);
        let result = {
            let _guard = lock(&writer);
            f(self.store.get(id)).inspect(|graph| self.store.set(id, graph.clone()))
        };
        self.release(id, writer);
        result
    }

    fn mutate<F>(&self, id: &str, f: F) -> Result<Graph, TerracanvasError>
    where
        F: FnOnce(&Mutator<'_>, &Graph) -> Result<Graph, TerracanvasError>,
    {
        self.write(id, |current| {
            let current = current.ok_or_else(|| diagram_not_found(id))?;
            f(&Mutator::new(self.engine.as_ref()), &current)
        })
    }
}

impl Default for DiagramService {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

fn diagram_not_found(id: &str) -> TerracanvasError {
    TerracanvasError::NotFound(format!("diagram `{id}`"))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
