//! Node and edge kinds.
//!
//! Both enums are closed: every component that branches on a kind matches
//! exhaustively instead of comparing strings.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Size;

/// Error returned when a string does not name a known kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown kind `{0}`")]
pub struct UnknownKind(pub String);

/// The kind of configuration block a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Resource,
    Data,
    Module,
    Variable,
    Output,
}

impl NodeKind {
    /// All kinds, in configuration section order.
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Resource,
        NodeKind::Data,
        NodeKind::Module,
        NodeKind::Variable,
        NodeKind::Output,
    ];

    /// The keyword used for this kind in node ids and in configuration text.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Resource => "resource",
            NodeKind::Data => "data",
            NodeKind::Module => "module",
            NodeKind::Variable => "variable",
            NodeKind::Output => "output",
        }
    }

    /// Whether nodes of this kind carry a resource type.
    pub fn has_resource_type(self) -> bool {
        matches!(self, NodeKind::Resource | NodeKind::Data)
    }

    /// Default node size for this kind.
    pub fn default_size(self) -> Size {
        match self {
            NodeKind::Resource | NodeKind::Data => Size::new(180.0, 60.0),
            NodeKind::Module => Size::new(200.0, 70.0),
            NodeKind::Variable | NodeKind::Output => Size::new(160.0, 50.0),
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "resource" => Ok(NodeKind::Resource),
            "data" => Ok(NodeKind::Data),
            "module" => Ok(NodeKind::Module),
            "variable" => Ok(NodeKind::Variable),
            "output" => Ok(NodeKind::Output),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

/// The kind of dependency an edge represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// An explicit `depends_on` entry.
    DependsOn,
    /// A reference inferred from string interpolation.
    #[default]
    Reference,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeKind::DependsOn => "depends_on",
            EdgeKind::Reference => "reference",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EdgeKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "depends_on" => Ok(EdgeKind::DependsOn),
            "reference" => Ok(EdgeKind::Reference),
            other => Err(UnknownKind(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_kind_round_trips_through_str() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.as_str().parse::<NodeKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_node_kind() {
        let err = "provider".parse::<NodeKind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown kind `provider`");
    }

    #[test]
    fn test_resource_type_kinds() {
        assert!(NodeKind::Resource.has_resource_type());
        assert!(NodeKind::Data.has_resource_type());
        assert!(!NodeKind::Module.has_resource_type());
        assert!(!NodeKind::Variable.has_resource_type());
        assert!(!NodeKind::Output.has_resource_type());
    }

    #[test]
    fn test_default_sizes_are_positive() {
        for kind in NodeKind::ALL {
            let size = kind.default_size();
            assert!(size.width() > 0.0 && size.height() > 0.0, "{kind}");
        }
    }

    #[test]
    fn test_edge_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&EdgeKind::DependsOn).unwrap(),
            "\"depends_on\""
        );
        assert_eq!(
            serde_json::from_str::<EdgeKind>("\"reference\"").unwrap(),
            EdgeKind::Reference
        );
    }
}
