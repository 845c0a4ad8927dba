//! Layered layout backed by the `rust-sugiyama` crate.
//!
//! The crate decides ranks and in-rank order; coordinates are assigned by
//! the shared placement so both engines honour the same options.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use rust_sugiyama::configure::Config;

use terracanvas_core::{graph::Graph, layout::LayoutOptions};

use crate::{
    error::TerracanvasError,
    layout::{Layering, LayoutResult, Slot, engines::Engine, place},
};

/// Sugiyama layout engine.
pub struct Sugiyama {
    /// Vertex spacing passed to the crate; only relative positions are used.
    vertex_spacing: f64,
}

impl Sugiyama {
    pub fn new() -> Self {
        Self { vertex_spacing: 3.0 }
    }

    /// Compute ranks and in-rank order for `graph`.
    ///
    /// Nodes without edges are placed in rank 0 after the connected ones.
    pub fn layering(&self, graph: &Graph) -> Result<Layering, TerracanvasError> {
        let mut ids: Vec<&str> = graph.node_ids().collect();
        ids.sort_unstable();

        let mut index = HashMap::new();
        for (i, id) in ids.iter().enumerate() {
            let sequential = u32::try_from(i).map_err(|_| {
                TerracanvasError::Layout(format!("too many nodes for the sugiyama engine: {}", ids.len()))
            })?;
            index.insert(*id, sequential);
        }

        let mut edges: Vec<(u32, u32)> = graph
            .edges()
            .filter_map(|edge| {
                let source = *index.get(edge.source_id.as_str())?;
                let target = *index.get(edge.target_id.as_str())?;
                // Skip self-loops
                (source != target).then_some((source, target))
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();

        let mut ranks: Vec<Vec<Slot>> = Vec::new();
        let mut placed = HashSet::new();

        if !edges.is_empty() {
            debug!(
                nodes = ids.len(),
                edges = edges.len();
                "Applying Sugiyama algorithm"
            );

            let components = self.run(edges.clone())?;
            for levels in components {
                for (rank, level) in levels.into_iter().enumerate() {
                    if ranks.len() <= rank {
                        ranks.push(Vec::new());
                    }
                    for node in level {
                        // Dummy vertices carry indices past the real nodes.
                        let Some(id) = ids.get(node) else {
                            continue;
                        };
                        if placed.insert(node) {
                            ranks[rank].push(Slot::Node((*id).to_string()));
                        }
                    }
                }
            }
        }

        let isolated: Vec<Slot> = (0..ids.len())
            .filter(|node| !placed.contains(node))
            .map(|node| Slot::Node(ids[node].to_string()))
            .collect();
        if !isolated.is_empty() {
            if ranks.is_empty() {
                ranks.push(Vec::new());
            }
            ranks[0].extend(isolated);
        }

        Ok(Layering::new(ranks))
    }

    /// Run the crate and return, per connected component, node indices
    /// grouped into levels ordered along edge direction.
    fn run(&self, edges: Vec<(u32, u32)>) -> Result<Vec<Vec<Vec<usize>>>, TerracanvasError> {
        let vertex_spacing = self.vertex_spacing;
        let oriented_edges = edges.clone();

        // The crate panics on some inputs instead of returning an error.
        let layouts = std::panic::catch_unwind(move || {
            let config = Config {
                minimum_length: 1,
                vertex_spacing,
                ..Default::default()
            };
            rust_sugiyama::from_edges(&edges, &config)
        });

        let results = match layouts {
            Ok(results) if results.is_empty() => {
                return Err(TerracanvasError::Layout(
                    "rust-sugiyama returned empty layout results".to_string(),
                ));
            }
            Ok(results) => results,
            Err(err) => {
                let message = err
                    .downcast_ref::<String>()
                    .cloned()
                    .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
                    .unwrap_or_else(|| "unknown error".to_string());
                return Err(TerracanvasError::Layout(format!(
                    "rust-sugiyama layout engine panicked: {message}"
                )));
            }
        };

        let components = results
            .iter()
            .map(|(coords, _, _)| {
                // Group by y coordinate, ordering each level by x.
                let mut levels: BTreeMap<i64, Vec<(f64, usize)>> = BTreeMap::new();
                for &(id, (x, y)) in coords {
                    let node = id as usize;
                    let level = ((y as f64) * 1000.0).round() as i64;
                    levels.entry(level).or_default().push((x as f64, node));
                }
                let mut levels: Vec<Vec<usize>> = levels
                    .into_values()
                    .map(|mut level| {
                        level.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
                        level.into_iter().map(|(_, node)| node).collect()
                    })
                    .collect();
                orient(&mut levels, &oriented_edges);
                levels
            })
            .collect();
        Ok(components)
    }
}

impl Default for Sugiyama {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Sugiyama {
    fn calculate(
        &self,
        graph: &Graph,
        options: &LayoutOptions,
    ) -> Result<LayoutResult, TerracanvasError> {
        let layering = self.layering(graph)?;
        Ok(place(graph, &layering, options))
    }
}

/// Reverse the level order of a component when its edges point against it.
///
/// The crate's y axis may grow either way; the majority of edges decides.
fn orient(levels: &mut [Vec<usize>], edges: &[(u32, u32)]) {
    let level_of: HashMap<usize, usize> = levels
        .iter()
        .enumerate()
        .flat_map(|(level, nodes)| nodes.iter().map(move |&node| (node, level)))
        .collect();

    let mut balance = 0i64;
    for &(source, target) in edges {
        if let (Some(&s), Some(&t)) = (
            level_of.get(&(source as usize)),
            level_of.get(&(target as usize)),
        ) {
            balance += match s.cmp(&t) {
                std::cmp::Ordering::Less => 1,
                std::cmp::Ordering::Greater => -1,
                std::cmp::Ordering::Equal => 0,
            };
        }
    }
    if balance < 0 {
        levels.reverse();
    }
}
