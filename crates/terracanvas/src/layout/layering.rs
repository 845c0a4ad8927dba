//! Ranks and in-rank order, and their conversion to coordinates.

use std::collections::BTreeMap;

use terracanvas_core::{
    geometry::{Point, Size},
    graph::Graph,
    layout::LayoutOptions,
};

use super::LayoutResult;

/// One position within a rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A graph node.
    Node(String),
    /// A placeholder routing an edge that spans several ranks.
    Virtual,
}

/// Nodes grouped into ranks, each rank in drawing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layering {
    ranks: Vec<Vec<Slot>>,
}

impl Layering {
    pub fn new(ranks: Vec<Vec<Slot>>) -> Self {
        Self { ranks }
    }

    pub fn ranks(&self) -> &[Vec<Slot>] {
        &self.ranks
    }

    /// The rank holding a node, if it was placed.
    pub fn rank_of(&self, node_id: &str) -> Option<usize> {
        self.ranks.iter().position(|rank| {
            rank.iter()
                .any(|slot| matches!(slot, Slot::Node(id) if id == node_id))
        })
    }
}

/// Assign coordinates to a layering.
///
/// Ranks advance along the main axis (x for horizontal directions, y
/// otherwise), each rank as thick as its thickest node. Within a rank, nodes
/// are stacked along the cross axis and the rank is centered against the
/// widest rank. Reversed directions mirror the main axis.
pub(super) fn place(graph: &Graph, layering: &Layering, options: &LayoutOptions) -> LayoutResult {
    let horizontal = options.direction.is_horizontal();

    // (main, cross) extent of a slot.
    let extent = |slot: &Slot| -> (f32, f32) {
        let Slot::Node(id) = slot else {
            return (0.0, 0.0);
        };
        let size = graph.node(id).map(|node| node.size()).unwrap_or_default();
        let size = if horizontal { size } else { size.transpose() };
        (size.width(), size.height())
    };

    let ranks = layering.ranks();
    let thickness: Vec<f32> = ranks
        .iter()
        .map(|rank| rank.iter().map(|slot| extent(slot).0).fold(0.0, f32::max))
        .collect();
    let breadth: Vec<f32> = ranks
        .iter()
        .map(|rank| {
            let nodes: f32 = rank.iter().map(|slot| extent(slot).1).sum();
            nodes + options.node_spacing * rank.len().saturating_sub(1) as f32
        })
        .collect();
    let max_breadth = breadth.iter().copied().fold(0.0, f32::max);
    let total_main = thickness.iter().sum::<f32>()
        + options.rank_spacing * ranks.len().saturating_sub(1) as f32;

    let mut positions = BTreeMap::new();
    let mut main_offset = 0.0;
    for (index, rank) in ranks.iter().enumerate() {
        let mut cross = (max_breadth - breadth[index]) / 2.0;
        for slot in rank {
            let (main_extent, cross_extent) = extent(slot);
            if let Slot::Node(id) = slot {
                let mut main = main_offset + (thickness[index] - main_extent) / 2.0;
                if options.direction.is_reversed() {
                    main = total_main - main - main_extent;
                }
                let (x, y) = if horizontal { (main, cross) } else { (cross, main) };
                positions.insert(
                    id.clone(),
                    Point::new(options.margin_x + x, options.margin_y + y),
                );
            }
            cross += cross_extent + options.node_spacing;
        }
        main_offset += thickness[index] + options.rank_spacing;
    }

    let content = if horizontal {
        Size::new(total_main, max_breadth)
    } else {
        Size::new(max_breadth, total_main)
    };
    let bounds = Size::new(
        content.width() + 2.0 * options.margin_x,
        content.height() + 2.0 * options.margin_y,
    );

    LayoutResult::new(positions, bounds)
}

#[cfg(test)]
mod tests {
    use terracanvas_core::{graph::Node, kind::NodeKind, layout::Direction};

    use super::*;

    fn graph_of(names: &[&str]) -> Graph {
        let mut graph = Graph::new();
        for name in names {
            graph
                .insert_node(Node::new(NodeKind::Resource, Some("t"), name))
                .unwrap();
        }
        graph
    }

    fn node(name: &str) -> Slot {
        Slot::Node(format!("resource.t.{name}"))
    }

    #[test]
    fn test_empty_layering_has_margin_bounds() {
        let result = place(&Graph::new(), &Layering::default(), &LayoutOptions::default());
        assert!(result.positions().is_empty());
        assert_eq!(result.bounds(), Size::new(40.0, 40.0));
    }

    #[test]
    fn test_left_to_right_placement() {
        let graph = graph_of(&["a", "b", "c"]);
        let layering = Layering::new(vec![vec![node("a")], vec![node("b"), node("c")]]);
        let options = LayoutOptions::default();
        let result = place(&graph, &layering, &options);

        // Rank 0 is centered against rank 1: (60 + 50 + 60 - 60) / 2.
        assert_eq!(result.position("resource.t.a"), Some(Point::new(20.0, 75.0)));
        assert_eq!(result.position("resource.t.b"), Some(Point::new(280.0, 20.0)));
        assert_eq!(result.position("resource.t.c"), Some(Point::new(280.0, 130.0)));
        assert_eq!(result.bounds(), Size::new(480.0, 210.0));
    }

    #[test]
    fn test_bottom_to_top_mirrors_ranks() {
        let graph = graph_of(&["a", "b"]);
        let layering = Layering::new(vec![vec![node("a")], vec![node("b")]]);
        let options = LayoutOptions::default().with_direction(Direction::BottomToTop);
        let result = place(&graph, &layering, &options);

        let a = result.position("resource.t.a").unwrap();
        let b = result.position("resource.t.b").unwrap();
        assert_eq!(a.x(), b.x());
        assert_eq!(a.y(), 20.0 + 60.0 + 80.0);
        assert_eq!(b.y(), 20.0);
    }

    #[test]
    fn test_virtual_slots_take_spacing_only() {
        let graph = graph_of(&["a", "b"]);
        let layering = Layering::new(vec![vec![node("a"), Slot::Virtual, node("b")]]);
        let result = place(&graph, &layering, &LayoutOptions::default());
        let a = result.position("resource.t.a").unwrap();
        let b = result.position("resource.t.b").unwrap();
        assert_eq!(b.y() - a.y(), 60.0 + 50.0 + 50.0);
        assert_eq!(layering.rank_of("resource.t.b"), Some(0));
        assert_eq!(layering.rank_of("resource.t.z"), None);
    }
}
