//! Configuration text generation from a graph snapshot.
//!
//! Each node becomes one block. Blocks are routed to files by kind and
//! written in graph node order, separated by a blank line:
//!
//! | Kinds                        | File            |
//! |------------------------------|-----------------|
//! | resource, data, module       | `main.<ext>`      |
//! | variable                     | `variables.<ext>` |
//! | output                       | `outputs.<ext>`   |
//!
//! Files without blocks are omitted.

mod emit;
mod format;

pub use emit::emit_node;
pub use format::{format_value, quote};

use std::collections::BTreeMap;

use log::{debug, info};

use terracanvas_core::{graph::Graph, kind::NodeKind};

use crate::{config::GenerationConfig, error::TerracanvasError};

/// Generated files keyed by file name.
pub type GeneratedFiles = BTreeMap<String, String>;

/// Emits configuration files for graphs.
#[derive(Debug, Clone)]
pub struct CodeGenerator {
    extension: String,
}

impl CodeGenerator {
    /// Create a generator writing files with the given extension (without
    /// the leading dot).
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(config.extension())
    }

    /// Name of the file blocks of `kind` are written to.
    pub fn file_name(&self, kind: NodeKind) -> String {
        let stem = match kind {
            NodeKind::Resource | NodeKind::Data | NodeKind::Module => "main",
            NodeKind::Variable => "variables",
            NodeKind::Output => "outputs",
        };
        format!("{stem}.{}", self.extension)
    }

    /// Generate the files for `graph`.
    ///
    /// # Errors
    ///
    /// [`TerracanvasError::Generation`] if any node lacks the fields its
    /// block needs. No partial output is returned.
    pub fn generate(&self, graph: &Graph) -> Result<GeneratedFiles, TerracanvasError> {
        let mut files = GeneratedFiles::new();
        for node in graph.nodes() {
            let block = emit_node(node)?;
            let text = files.entry(self.file_name(node.kind)).or_default();
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&block);
            debug!(node_id = node.id; "Block emitted");
        }

        info!(files = files.len(), blocks = graph.nodes_count(); "Configuration generated");
        Ok(files)
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}
