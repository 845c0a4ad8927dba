//! End-to-end behaviour of the engine through its public API.

use serde_json::json;

use terracanvas::{
    Attributes, DiagramService, TerracanvasError, Value,
    codegen::format_value,
    config::{AppConfig, GenerationConfig, LayoutConfig, StoreConfig},
    configuration::Configuration,
    kind::{EdgeKind, NodeKind},
    layout::{Direction, LayoutEngine, LayoutOptions},
    mutation::{EdgeData, NodeData, NodePatch},
};

fn attrs(value: Value) -> Attributes {
    value.as_object().cloned().unwrap()
}

fn resource(resource_type: &str, name: &str) -> NodeData {
    NodeData {
        kind: Some("resource".to_string()),
        resource_type: Some(resource_type.to_string()),
        name: Some(name.to_string()),
        ..NodeData::default()
    }
}

#[test]
fn test_depends_on_list_yields_one_edge() {
    let mut configuration = Configuration::new();
    configuration.insert(NodeKind::Resource, Some("google_project"), "p", Attributes::new());
    configuration.insert(
        NodeKind::Resource,
        Some("google_storage_bucket"),
        "logs",
        attrs(json!({ "depends_on": ["resource.google_project.p"] })),
    );

    let service = DiagramService::default();
    let graph = service.build_from_configuration("d", &configuration).unwrap();

    assert_eq!(graph.edges_count(), 1);
    let edge = graph.edges().next().unwrap();
    assert_eq!(edge.kind, EdgeKind::DependsOn);
    assert_eq!(edge.source_id, "resource.google_project.p");
    assert_eq!(edge.target_id, "resource.google_storage_bucket.logs");
}

#[test]
fn test_add_node_to_empty_diagram() {
    let service = DiagramService::default();
    service
        .build_from_configuration("d", &Configuration::new())
        .unwrap();

    let graph = service.add_node("d", resource("aws_s3_bucket", "logs")).unwrap();
    assert_eq!(graph.nodes_count(), 1);
    assert!(graph.width() > 0.0);
    assert!(graph.height() > 0.0);
    assert_eq!(service.snapshot("d").unwrap(), graph);
}

#[test]
fn test_delete_node_removes_exactly_incident_edges() {
    let source = r#"
        resource "t" "a" {}
        resource "t" "b" {
          x = t.a.id
        }
        resource "t" "c" {
          y = t.b.id
          z = t.a.id
        }
        resource "t" "d" {
          w = t.a.id
        }
    "#;
    let service = DiagramService::default();
    let before = service.build_from_source("d", source).unwrap();
    assert_eq!(before.edges_count(), 4);

    let after = service.delete_node("d", "resource.t.b").unwrap();
    let expected: Vec<_> = before
        .edges()
        .filter(|edge| !edge.is_incident_to("resource.t.b"))
        .map(|edge| edge.id.clone())
        .collect();
    let remaining: Vec<_> = after.edges().map(|edge| edge.id.clone()).collect();
    assert_eq!(remaining, expected);
    assert_eq!(remaining.len(), 2);
}

#[test]
fn test_module_without_source_gets_local_path() {
    let mut configuration = Configuration::new();
    configuration.insert(
        NodeKind::Module,
        None,
        "network",
        attrs(json!({ "cidr": "10.0.0.0/16" })),
    );

    let service = DiagramService::default();
    service.build_from_configuration("d", &configuration).unwrap();
    let files = service.generate("d").unwrap();

    let mut lines = files["main.tf"].lines();
    assert_eq!(lines.next(), Some("module \"network\" {"));
    assert_eq!(lines.next(), Some("  source = \"./modules/network\""));
}

#[test]
fn test_whole_reference_formats_bare() {
    assert_eq!(
        format_value(&json!("${resource_type.main.id}"), 0),
        "resource_type.main.id"
    );
}

#[test]
fn test_unknown_diagram_is_not_found() {
    let service = DiagramService::default();
    for result in [
        service.snapshot("missing"),
        service.add_node("missing", resource("t", "a")),
        service.delete_node("missing", "resource.t.a"),
        service.relayout("missing"),
    ] {
        assert!(matches!(result, Err(TerracanvasError::NotFound(_))));
    }
    assert!(matches!(
        service.generate("missing"),
        Err(TerracanvasError::NotFound(_))
    ));
}

#[test]
fn test_failed_mutation_leaves_diagram_unchanged() {
    let service = DiagramService::default();
    service
        .build_from_source("d", "resource \"t\" \"a\" {}\n")
        .unwrap();
    let before = service.snapshot("d").unwrap();

    let err = service
        .add_edge(
            "d",
            EdgeData {
                source_id: "resource.t.a".to_string(),
                target_id: "resource.t.ghost".to_string(),
                ..EdgeData::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, TerracanvasError::NotFound(_)));
    assert_eq!(service.snapshot("d").unwrap(), before);
}

#[test]
fn test_parse_errors_keep_source() {
    let service = DiagramService::default();
    let source = "resource \"t\" {\n}\n";
    match service.build_from_source("d", source) {
        Err(TerracanvasError::Parse { err, src }) => {
            assert_eq!(src, source);
            assert!(err.message().contains("label"));
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
    assert!(service.snapshot("d").is_err());
}

#[test]
fn test_configured_layout_and_extension() {
    let config = AppConfig::new(
        LayoutConfig::new(
            LayoutEngine::Sugiyama,
            LayoutOptions::default().with_direction(Direction::TopToBottom),
        ),
        GenerationConfig::new("hcl"),
        StoreConfig::new(2),
    );
    let service = DiagramService::new(config);
    let graph = service
        .build_from_source(
            "d",
            "variable \"v\" {}\nresource \"t\" \"a\" {\n  x = var.v\n}\n",
        )
        .unwrap();

    let variable = graph.node("variable.v").unwrap();
    let resource = graph.node("resource.t.a").unwrap();
    assert!(variable.y < resource.y);
    assert_eq!(graph.options().direction, Direction::TopToBottom);

    let files = service.generate("d").unwrap();
    assert!(files.contains_key("main.hcl"));
    assert!(files.contains_key("variables.hcl"));
}

#[test]
fn test_manual_position_survives_until_next_relayout() {
    let service = DiagramService::default();
    service
        .build_from_source("d", "resource \"t\" \"a\" {}\nresource \"t\" \"b\" {}\n")
        .unwrap();
    let laid_out = service.snapshot("d").unwrap();

    let patch = NodePatch {
        x: Some(1000.0),
        y: Some(1000.0),
        ..NodePatch::default()
    };
    let moved = service.update_node("d", "resource.t.a", patch).unwrap();
    assert_eq!(moved.node("resource.t.a").unwrap().x, 1000.0);

    let relaid = service.relayout("d").unwrap();
    assert_eq!(relaid, laid_out);
}

#[test]
fn test_store_capacity_evicts_oldest_diagram() {
    let config = AppConfig::new(
        LayoutConfig::default(),
        GenerationConfig::default(),
        StoreConfig::new(2),
    );
    let service = DiagramService::new(config);
    for id in ["d1", "d2", "d3"] {
        service.build_from_configuration(id, &Configuration::new()).unwrap();
    }
    assert_eq!(service.diagrams_count(), 2);
    assert!(service.snapshot("d1").is_err());

    assert!(service.evict("d3"));
    assert!(!service.evict("d3"));
    assert_eq!(service.diagrams_count(), 1);
}

#[test]
fn test_blank_and_multiline_interpolations_survive_generation() {
    let service = DiagramService::default();
    service
        .build_from_configuration("d", &Configuration::new())
        .unwrap();
    let config = attrs(json!({
        "blank": "${ }",
        "multiline": "${var.a\n+ var.b}",
        "bare": "${var.a}",
    }));
    service
        .add_node(
            "d",
            NodeData {
                config: Some(config.clone()),
                ..resource("t", "a")
            },
        )
        .unwrap();

    let files = service.generate("d").unwrap();
    let main = &files["main.tf"];
    assert!(main.contains("  blank = \"${ }\"\n"), "{main}");
    assert!(main.contains("  bare = var.a\n"), "{main}");

    let reparsed = terracanvas_parser::parse(main).unwrap();
    assert_eq!(reparsed.resource["t"]["a"], config);
}
