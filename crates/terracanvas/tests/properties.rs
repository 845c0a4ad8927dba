use std::{collections::BTreeSet, thread};

use proptest::prelude::*;
use serde_json::{Number, json};

use terracanvas::{
    Attributes, DiagramService, Value,
    builder::build_graph,
    codegen::CodeGenerator,
    configuration::Configuration,
    graph::{Graph, Node},
    kind::NodeKind,
    layout::{self, Direction, EngineBuilder, LayoutEngine, LayoutOptions},
    mutation::{EdgeData, Mutator, NodeData, NodePatch},
};

/// A configuration of `count` resources plus one variable, with references
/// between resources given as index pairs.
fn configuration(count: usize, references: &[(usize, usize)]) -> Configuration {
    let mut configuration = Configuration::new();
    configuration.insert(NodeKind::Variable, None, "region", Attributes::new());
    for i in 0..count {
        let mut attributes = Attributes::new();
        attributes.insert("region".to_string(), json!("${var.region}"));
        for &(source, target) in references {
            if target % count == i {
                attributes.insert(
                    format!("ref_{}", source % count),
                    json!(format!("${{t.r{}.id}}", source % count)),
                );
            }
        }
        configuration.insert(NodeKind::Resource, Some("t"), &format!("r{i}"), attributes);
    }
    configuration
}

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::LeftToRight),
        Just(Direction::RightToLeft),
        Just(Direction::TopToBottom),
        Just(Direction::BottomToTop),
    ]
}

fn graph_strategy() -> impl Strategy<Value = Graph> {
    (
        1usize..8,
        prop::collection::vec((0usize..8, 0usize..8), 0..16),
        direction(),
    )
        .prop_map(|(count, references, direction)| {
            build_graph(
                &configuration(count, &references),
                LayoutOptions::default().with_direction(direction),
            )
        })
}

fn node_ids(graph: &Graph) -> BTreeSet<String> {
    graph.node_ids().map(str::to_string).collect()
}

fn edge_ids(graph: &Graph) -> BTreeSet<String> {
    graph.edges().map(|edge| edge.id.clone()).collect()
}

fn identities(graph: &Graph) -> BTreeSet<(NodeKind, Option<String>, Option<String>)> {
    graph
        .nodes()
        .map(|node| (node.kind, node.resource_type.clone(), node.name.clone()))
        .collect()
}

fn reparse(graph: &Graph) -> Configuration {
    let files = CodeGenerator::default().generate(graph).unwrap();
    terracanvas_parser::parse_files(files.iter().map(|(name, text)| (name.as_str(), text.as_str())))
        .unwrap()
}

fn assert_integrity(graph: &Graph) {
    for edge in graph.edges() {
        assert!(graph.contains_node(&edge.source_id), "dangling {}", edge.id);
        assert!(graph.contains_node(&edge.target_id), "dangling {}", edge.id);
        assert_ne!(edge.source_id, edge.target_id);
    }
}

#[derive(Debug, Clone)]
enum Op {
    AddNode(usize),
    DeleteNode(usize),
    AddEdge(usize, usize),
    DeleteEdge(usize, usize),
    Move(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..10).prop_map(Op::AddNode),
        (0usize..10).prop_map(Op::DeleteNode),
        (0usize..10, 0usize..10).prop_map(|(a, b)| Op::AddEdge(a, b)),
        (0usize..10, 0usize..10).prop_map(|(a, b)| Op::DeleteEdge(a, b)),
        (0usize..10).prop_map(Op::Move),
    ]
}

fn node_data(index: usize) -> NodeData {
    NodeData {
        kind: Some("resource".to_string()),
        resource_type: Some("t".to_string()),
        name: Some(format!("n{index}")),
        ..NodeData::default()
    }
}

fn node_id(index: usize) -> String {
    format!("resource.t.n{index}")
}

fn primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e12..1.0e12f64).prop_map(|f| Value::Number(Number::from_f64(f).unwrap())),
        "(?s)([^\\p{Cc}]|[\n\t\r]){0,24}"
            .prop_filter("interpolation", |s| !s.contains("${"))
            .prop_map(Value::String),
    ]
}

proptest! {
    #[test]
    fn layout_is_idempotent(graph in graph_strategy()) {
        let engine = EngineBuilder::new().build(LayoutEngine::Layered);
        let first = layout::layout(&graph, engine.as_ref()).unwrap();
        let placed = layout::apply(&graph, &first);
        let second = layout::layout(&placed, engine.as_ref()).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(layout::apply(&placed, &second), placed);
        for node in graph.nodes() {
            prop_assert!(first.position(&node.id).is_some());
        }
    }

    #[test]
    fn mutations_keep_referential_integrity(
        graph in graph_strategy(),
        ops in prop::collection::vec(op(), 1..24),
    ) {
        let engine = EngineBuilder::new().build(LayoutEngine::Layered);
        let mutator = Mutator::new(engine.as_ref());
        let mut graph = graph;

        for op in ops {
            let result = match op {
                Op::AddNode(i) => mutator.add_node(&graph, node_data(i)),
                Op::DeleteNode(i) => mutator.delete_node(&graph, &node_id(i)),
                Op::AddEdge(a, b) => mutator.add_edge(
                    &graph,
                    EdgeData {
                        source_id: node_id(a),
                        target_id: node_id(b),
                        ..EdgeData::default()
                    },
                ),
                Op::DeleteEdge(a, b) => mutator.delete_edge(&graph, &node_id(a), &node_id(b)),
                Op::Move(i) => mutator.update_node(
                    &graph,
                    &node_id(i),
                    NodePatch { x: Some(i as f32), y: Some(0.0), ..NodePatch::default() },
                ),
            };
            if let Ok(next) = result {
                graph = next;
            }
            assert_integrity(&graph);
        }
    }

    #[test]
    fn add_then_delete_restores_graph(graph in graph_strategy(), connect in any::<bool>()) {
        let engine = EngineBuilder::new().build(LayoutEngine::Layered);
        let mutator = Mutator::new(engine.as_ref());

        let mut added = mutator.add_node(&graph, node_data(99)).unwrap();
        if connect {
            let edge = EdgeData {
                source_id: "resource.t.r0".to_string(),
                target_id: node_id(99),
                ..EdgeData::default()
            };
            added = mutator.add_edge(&added, edge).unwrap();
        }
        prop_assert_eq!(added.nodes_count(), graph.nodes_count() + 1);

        let restored = mutator.delete_node(&added, &node_id(99)).unwrap();

        prop_assert_eq!(node_ids(&restored), node_ids(&graph));
        prop_assert_eq!(edge_ids(&restored), edge_ids(&graph));
    }

    #[test]
    fn generate_then_parse_preserves_blocks(graph in graph_strategy()) {
        let reparsed = build_graph(&reparse(&graph), graph.options());

        prop_assert_eq!(identities(&reparsed), identities(&graph));
        prop_assert_eq!(edge_ids(&reparsed), edge_ids(&graph));
    }

    #[test]
    fn primitive_defaults_round_trip(value in primitive()) {
        let mut attributes = Attributes::new();
        attributes.insert("default".to_string(), value.clone());
        let mut graph = Graph::new();
        graph
            .insert_node(Node::new(NodeKind::Variable, None, "v").with_config(attributes))
            .unwrap();

        let configuration = reparse(&graph);
        prop_assert_eq!(&configuration.variable["v"]["default"], &value);
    }
}

#[test]
fn test_concurrent_mutations_are_serialized() {
    let service = DiagramService::default();
    service
        .build_from_configuration("shared", &Configuration::new())
        .unwrap();

    thread::scope(|scope| {
        for worker in 0..4 {
            let service = &service;
            scope.spawn(move || {
                for i in 0..5 {
                    service.add_node("shared", node_data(worker * 10 + i)).unwrap();
                }
            });
        }
    });

    let graph = service.snapshot("shared").unwrap();
    assert_eq!(graph.nodes_count(), 20);
    assert!(graph.width() > 0.0);
}

#[test]
fn test_sugiyama_layout_is_idempotent() {
    let graph = build_graph(
        &configuration(5, &[(0, 1), (1, 2), (0, 3), (3, 4), (2, 4)]),
        LayoutOptions::default(),
    );
    let engine = EngineBuilder::new().build(LayoutEngine::Sugiyama);
    let first = layout::layout(&graph, engine.as_ref()).unwrap();
    let second = layout::layout(&layout::apply(&graph, &first), engine.as_ref()).unwrap();
    assert_eq!(first, second);
}
