//! Built-in layered layout.
//!
//! The classic four phases of a layered drawing:
//!
//! 1. Cycle removal: edges closing a cycle in a depth-first search are
//!    reversed.
//! 2. Ranking: each node's rank is its longest path from a source, computed
//!    over a topological order.
//! 3. Normalization: edges spanning more than one rank are split with
//!    virtual nodes so every edge joins adjacent ranks.
//! 4. Ordering: alternating barycenter sweeps reorder each rank, keeping the
//!    ordering with the fewest crossings seen.
//!
//! Nodes are indexed in id order, so the result does not depend on the
//! order nodes were inserted into the graph.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use petgraph::{
    Direction::Incoming,
    algo::toposort,
    graph::{DiGraph, NodeIndex},
};

use terracanvas_core::{graph::Graph, layout::LayoutOptions};

use crate::{
    error::TerracanvasError,
    layout::{Layering, LayoutResult, Slot, engines::Engine, place},
};

/// Layered layout engine.
pub struct Layered {
    sweeps: usize,
}

impl Layered {
    pub fn new() -> Self {
        Self { sweeps: 8 }
    }

    /// Set the number of ordering sweeps.
    pub fn set_sweeps(&mut self, sweeps: usize) -> &mut Self {
        self.sweeps = sweeps;
        self
    }

    /// Compute ranks and in-rank order for `graph`.
    pub fn layering(&self, graph: &Graph) -> Result<Layering, TerracanvasError> {
        let mut ids: Vec<&str> = graph.node_ids().collect();
        ids.sort_unstable();
        let index: HashMap<&str, usize> = ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut edges: Vec<(usize, usize)> = graph
            .edges()
            .filter_map(|edge| {
                let source = *index.get(edge.source_id.as_str())?;
                let target = *index.get(edge.target_id.as_str())?;
                (source != target).then_some((source, target))
            })
            .collect();
        edges.sort_unstable();
        edges.dedup();

        let edges = break_cycles(ids.len(), &edges);
        let ranks = assign_ranks(ids.len(), &edges)?;
        let mut layers = Layers::normalize(&ranks, &edges);
        layers.reduce_crossings(self.sweeps);

        let ranks = layers
            .ranks
            .iter()
            .map(|rank| {
                rank.iter()
                    .map(|&v| match ids.get(v) {
                        Some(id) => Slot::Node((*id).to_string()),
                        None => Slot::Virtual,
                    })
                    .collect()
            })
            .collect();
        Ok(Layering::new(ranks))
    }
}

impl Default for Layered {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Layered {
    fn calculate(
        &self,
        graph: &Graph,
        options: &LayoutOptions,
    ) -> Result<LayoutResult, TerracanvasError> {
        let layering = self.layering(graph)?;
        debug!(ranks = layering.ranks().len(); "Layered ranking complete");
        Ok(place(graph, &layering, options))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Reverse every DFS back edge, returning an acyclic edge list.
fn break_cycles(node_count: usize, edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    let mut successors = vec![Vec::new(); node_count];
    for &(source, target) in edges {
        successors[source].push(target);
    }

    let mut marks = vec![Mark::Unvisited; node_count];
    let mut back_edges = HashSet::new();
    for root in 0..node_count {
        if marks[root] != Mark::Unvisited {
            continue;
        }
        marks[root] = Mark::OnStack;
        let mut stack = vec![(root, 0usize)];
        while let Some(frame) = stack.last_mut() {
            let (node, cursor) = *frame;
            let Some(&next) = successors[node].get(cursor) else {
                marks[node] = Mark::Done;
                stack.pop();
                continue;
            };
            frame.1 += 1;
            match marks[next] {
                Mark::Unvisited => {
                    marks[next] = Mark::OnStack;
                    stack.push((next, 0));
                }
                Mark::OnStack => {
                    back_edges.insert((node, next));
                }
                Mark::Done => {}
            }
        }
    }

    if !back_edges.is_empty() {
        trace!(reversed = back_edges.len(); "Reversed edges to break cycles");
    }

    let mut acyclic: Vec<(usize, usize)> = edges
        .iter()
        .map(|&(source, target)| {
            if back_edges.contains(&(source, target)) {
                (target, source)
            } else {
                (source, target)
            }
        })
        .collect();
    acyclic.sort_unstable();
    acyclic.dedup();
    acyclic
}

/// Longest-path ranking over a topological order.
fn assign_ranks(node_count: usize, edges: &[(usize, usize)]) -> Result<Vec<usize>, TerracanvasError> {
    let mut dag: DiGraph<(), ()> = DiGraph::with_capacity(node_count, edges.len());
    let nodes: Vec<NodeIndex> = (0..node_count).map(|_| dag.add_node(())).collect();
    for &(source, target) in edges {
        dag.add_edge(nodes[source], nodes[target], ());
    }

    let order = toposort(&dag, None).map_err(|cycle| {
        TerracanvasError::Layout(format!(
            "cycle through node index {} remained after cycle removal",
            cycle.node_id().index()
        ))
    })?;

    let mut ranks = vec![0; node_count];
    for node in order {
        let rank = dag
            .neighbors_directed(node, Incoming)
            .map(|pred| ranks[pred.index()] + 1)
            .max()
            .unwrap_or(0);
        ranks[node.index()] = rank;
    }
    Ok(ranks)
}

/// Ranks over real and virtual nodes. Indices below the real node count
/// are graph nodes; the rest are virtual.
struct Layers {
    ranks: Vec<Vec<usize>>,
    rank_of: Vec<usize>,
    /// Edges between adjacent ranks, upper end first.
    edges: Vec<(usize, usize)>,
}

impl Layers {
    /// Build ranks from a ranking, splitting long edges with virtual nodes.
    fn normalize(ranks: &[usize], edges: &[(usize, usize)]) -> Self {
        let rank_count = ranks.iter().max().map_or(0, |max| max + 1);
        let mut layers = Self {
            ranks: vec![Vec::new(); rank_count],
            rank_of: ranks.to_vec(),
            edges: Vec::with_capacity(edges.len()),
        };
        for (node, &rank) in ranks.iter().enumerate() {
            layers.ranks[rank].push(node);
        }

        for &(source, target) in edges {
            let mut previous = source;
            for rank in ranks[source] + 1..ranks[target] {
                let virtual_node = layers.rank_of.len();
                layers.rank_of.push(rank);
                layers.ranks[rank].push(virtual_node);
                layers.edges.push((previous, virtual_node));
                previous = virtual_node;
            }
            layers.edges.push((previous, target));
        }
        layers
    }

    fn positions(&self) -> Vec<usize> {
        let mut positions = vec![0; self.rank_of.len()];
        for rank in &self.ranks {
            for (position, &node) in rank.iter().enumerate() {
                positions[node] = position;
            }
        }
        positions
    }

    /// Number of pairwise edge crossings between adjacent ranks.
    fn crossings(&self, positions: &[usize]) -> usize {
        let mut by_rank = vec![Vec::new(); self.ranks.len()];
        for &(upper, lower) in &self.edges {
            by_rank[self.rank_of[upper]].push((positions[upper], positions[lower]));
        }
        by_rank
            .iter()
            .map(|edges| {
                let mut count = 0;
                for (i, &(u1, l1)) in edges.iter().enumerate() {
                    for &(u2, l2) in &edges[i + 1..] {
                        if (u1 < u2 && l1 > l2) || (u1 > u2 && l1 < l2) {
                            count += 1;
                        }
                    }
                }
                count
            })
            .sum()
    }

    /// Alternate downward and upward barycenter sweeps, keeping the best
    /// ordering found.
    fn reduce_crossings(&mut self, sweeps: usize) {
        if self.ranks.len() < 2 {
            return;
        }

        let node_count = self.rank_of.len();
        let mut above = vec![Vec::new(); node_count];
        let mut below = vec![Vec::new(); node_count];
        for &(upper, lower) in &self.edges {
            above[lower].push(upper);
            below[upper].push(lower);
        }

        let mut positions = self.positions();
        let mut best = self.ranks.clone();
        let mut best_crossings = self.crossings(&positions);

        for sweep in 0..sweeps {
            if best_crossings == 0 {
                break;
            }
            if sweep % 2 == 0 {
                for rank in 1..self.ranks.len() {
                    reorder(&mut self.ranks[rank], &above, &mut positions);
                }
            } else {
                for rank in (0..self.ranks.len() - 1).rev() {
                    reorder(&mut self.ranks[rank], &below, &mut positions);
                }
            }

            let crossings = self.crossings(&positions);
            trace!(sweep = sweep, crossings = crossings; "Ordering sweep");
            if crossings < best_crossings {
                best_crossings = crossings;
                best = self.ranks.clone();
            }
        }

        self.ranks = best;
    }
}

/// Sort one rank by the mean position of each node's neighbours in the
/// fixed adjacent rank. Nodes without neighbours keep their position as key.
fn reorder(rank: &mut Vec<usize>, neighbours: &[Vec<usize>], positions: &mut [usize]) {
    let mut keyed: Vec<(f64, usize, usize)> = rank
        .iter()
        .map(|&node| {
            let adjacent = &neighbours[node];
            let barycenter = if adjacent.is_empty() {
                positions[node] as f64
            } else {
                adjacent.iter().map(|&n| positions[n] as f64).sum::<f64>() / adjacent.len() as f64
            };
            (barycenter, positions[node], node)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

    *rank = keyed.into_iter().map(|(_, _, node)| node).collect();
    for (position, &node) in rank.iter().enumerate() {
        positions[node] = position;
    }
}
