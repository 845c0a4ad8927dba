//! Error types for Terracanvas operations.
//!
//! This module provides the main error type [`TerracanvasError`]. Every
//! engine operation reports failures through it; the four domain variants
//! (`Validation`, `NotFound`, `Generation`, `Layout`) are the ones callers
//! are expected to branch on.

use std::{fmt, io};

use thiserror::Error;

use terracanvas_core::{graph::GraphError, kind::UnknownKind, layout::UnknownLayoutOption};
use terracanvas_parser::ParseError;

/// The main error type for Terracanvas operations.
///
/// # Diagnostic Variants
///
/// The `Parse` variant keeps the source text next to the parse error so that
/// front ends can render the offending span.
#[derive(Debug, Error)]
pub enum TerracanvasError {
    /// Malformed input to a mutation or build request.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A diagram, node or edge does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A node lacks the fields needed to emit its block.
    #[error("Generation error: {0}")]
    Generation(String),

    /// The layout engine failed.
    #[error("Layout error: {0}")]
    Layout(String),

    #[error("{err}")]
    Parse { err: ParseError, src: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TerracanvasError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
        }
    }

    /// Shorthand for a [`TerracanvasError::NotFound`] naming a node.
    pub(crate) fn node_not_found(id: &str) -> Self {
        Self::NotFound(format!("node `{id}`"))
    }
}

impl From<GraphError> for TerracanvasError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::MissingEndpoint { .. } => Self::NotFound(error.to_string()),
            GraphError::DuplicateNode(_) => Self::Validation(error.to_string()),
        }
    }
}

impl From<fmt::Error> for TerracanvasError {
    fn from(error: fmt::Error) -> Self {
        Self::Generation(error.to_string())
    }
}

impl From<UnknownKind> for TerracanvasError {
    fn from(error: UnknownKind) -> Self {
        Self::Validation(error.to_string())
    }
}

impl From<UnknownLayoutOption> for TerracanvasError {
    fn from(error: UnknownLayoutOption) -> Self {
        Self::Validation(error.to_string())
    }
}
