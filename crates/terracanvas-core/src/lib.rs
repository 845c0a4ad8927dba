//! Terracanvas Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Terracanvas
//! parser, engine and command-line driver. It includes:
//!
//! - **Kinds**: The closed set of block kinds ([`kind::NodeKind`]) and edge kinds ([`kind::EdgeKind`])
//! - **Graph**: The diagram model of nodes, edges and layout metadata ([`graph`] module)
//! - **Configuration**: Normalized configuration blocks consumed by the graph builder ([`configuration`] module)
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Layout**: Layout option types shared by every layout engine ([`layout`] module)

pub mod configuration;
pub mod geometry;
pub mod graph;
pub mod kind;
pub mod layout;

/// An ordered attribute map, as found in a block body.
///
/// Attribute order is significant: the code generator emits attributes in
/// insertion order.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// A single attribute value. Values nest arbitrarily.
pub type Value = serde_json::Value;
