//! Normalized configuration blocks.
//!
//! A [`Configuration`] is the structured form of a set of configuration files
//! as produced by a parser: each section maps block labels to the block's
//! attribute map. Resource and data sections are keyed by type and then by
//! name; module, variable and output sections are keyed by name only.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Attributes, kind::NodeKind};

/// Blocks keyed by type, then by name.
pub type TypedBlocks = IndexMap<String, IndexMap<String, Attributes>>;

/// Blocks keyed by name.
pub type NamedBlocks = IndexMap<String, Attributes>;

/// One block of a [`Configuration`], borrowed.
#[derive(Debug, Clone, Copy)]
pub struct BlockRef<'a> {
    pub kind: NodeKind,
    pub resource_type: Option<&'a str>,
    pub name: &'a str,
    pub attributes: &'a Attributes,
}

/// Normalized configuration sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub resource: TypedBlocks,
    pub data: TypedBlocks,
    pub module: NamedBlocks,
    pub variable: NamedBlocks,
    pub output: NamedBlocks,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no section holds any block.
    pub fn is_empty(&self) -> bool {
        self.resource.values().all(IndexMap::is_empty)
            && self.data.values().all(IndexMap::is_empty)
            && self.module.is_empty()
            && self.variable.is_empty()
            && self.output.is_empty()
    }

    /// Iterates over every block in section order: resources, data sources,
    /// modules, variables, outputs.
    pub fn blocks(&self) -> impl Iterator<Item = BlockRef<'_>> {
        typed_blocks(NodeKind::Resource, &self.resource)
            .chain(typed_blocks(NodeKind::Data, &self.data))
            .chain(named_blocks(NodeKind::Module, &self.module))
            .chain(named_blocks(NodeKind::Variable, &self.variable))
            .chain(named_blocks(NodeKind::Output, &self.output))
    }

    /// Inserts a block, replacing any block with the same labels.
    ///
    /// `resource_type` is ignored for kinds that do not carry one.
    pub fn insert(
        &mut self,
        kind: NodeKind,
        resource_type: Option<&str>,
        name: &str,
        attributes: Attributes,
    ) {
        let resource_type = resource_type.unwrap_or_default().to_string();
        let name = name.to_string();
        match kind {
            NodeKind::Resource => {
                self.resource
                    .entry(resource_type)
                    .or_default()
                    .insert(name, attributes);
            }
            NodeKind::Data => {
                self.data
                    .entry(resource_type)
                    .or_default()
                    .insert(name, attributes);
            }
            NodeKind::Module => {
                self.module.insert(name, attributes);
            }
            NodeKind::Variable => {
                self.variable.insert(name, attributes);
            }
            NodeKind::Output => {
                self.output.insert(name, attributes);
            }
        }
    }

    /// Merges all blocks of `other` into `self`. Later blocks win.
    pub fn merge(&mut self, other: Configuration) {
        for (resource_type, named) in other.resource {
            self.resource.entry(resource_type).or_default().extend(named);
        }
        for (resource_type, named) in other.data {
            self.data.entry(resource_type).or_default().extend(named);
        }
        self.module.extend(other.module);
        self.variable.extend(other.variable);
        self.output.extend(other.output);
    }
}

fn typed_blocks(kind: NodeKind, section: &TypedBlocks) -> impl Iterator<Item = BlockRef<'_>> {
    section.iter().flat_map(move |(resource_type, named)| {
        named.iter().map(move |(name, attributes)| BlockRef {
            kind,
            resource_type: Some(resource_type.as_str()),
            name: name.as_str(),
            attributes,
        })
    })
}

fn named_blocks(kind: NodeKind, section: &NamedBlocks) -> impl Iterator<Item = BlockRef<'_>> {
    section.iter().map(move |(name, attributes)| BlockRef {
        kind,
        resource_type: None,
        name: name.as_str(),
        attributes,
    })
}
