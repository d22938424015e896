use std::path::{Path, PathBuf};

use medgraph::config::load_config;
use medgraph::ir::{Diagram, DiagramKind, parse_diagram};
use medgraph::layout::{
    FlowchartView, SelectionState, ViewTransform, Viewport, compute_flowchart_layout,
    settle_knowledge_graph,
};
use medgraph::layout_dump::LayoutDump;
use medgraph::render::{render_flowchart_svg, render_graph_svg};
use medgraph::theme::Theme;
use medgraph::{Config, InputError};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load_fixture(name: &str) -> Diagram {
    let input = std::fs::read_to_string(fixture_path(name)).expect("fixture read failed");
    parse_diagram(&input, None).expect("parse failed")
}

fn assert_valid_svg(svg: &str, fixture: &str) {
    assert!(svg.contains("<svg"), "{fixture}: missing <svg tag");
    assert!(svg.contains("</svg>"), "{fixture}: missing </svg tag");
    assert!(!svg.contains("NaN"), "{fixture}: non-finite coordinate");
}

#[test]
fn render_all_fixtures() {
    let config = Config::default();
    let viewport = Viewport::new(config.render.width, config.render.height);
    let candidates = [
        ("fever_flu.json", DiagramKind::KnowledgeGraph),
        ("dangling.json", DiagramKind::KnowledgeGraph),
        ("cyclic_flowchart.json", DiagramKind::Flowchart),
    ];

    for (name, expected) in candidates {
        let diagram = load_fixture(name);
        assert_eq!(diagram.kind(), expected, "{name}: wrong kind detected");
        let svg = match &diagram {
            Diagram::KnowledgeGraph(data) => {
                let layout = settle_knowledge_graph(data, viewport, &config.layout.simulation);
                render_graph_svg(&layout, &config.theme)
            }
            Diagram::Flowchart(data) => {
                let layout = compute_flowchart_layout(data, viewport, &config.layout.flowchart);
                let selection = SelectionState::new(data);
                render_flowchart_svg(&layout, selection.selection(), &ViewTransform::default(), &config.theme)
            }
        };
        assert_valid_svg(&svg, name);
    }
}

#[test]
fn knowledge_graph_stays_inside_padded_viewport() {
    let Diagram::KnowledgeGraph(data) = load_fixture("fever_flu.json") else {
        panic!("expected a knowledge graph");
    };
    let config = Config::default();
    let viewport = Viewport::new(390.0, 640.0);
    let layout = settle_knowledge_graph(&data, viewport, &config.layout.simulation);

    assert_eq!(layout.nodes.len(), 4);
    assert_eq!(layout.edges.len(), 3);
    let slack = 20.0;
    for node in &layout.nodes {
        assert!(node.x.is_finite() && node.y.is_finite());
        assert!(node.x > -slack && node.x < viewport.width + slack, "{} x={}", node.id, node.x);
        assert!(node.y > -slack && node.y < viewport.height + slack, "{} y={}", node.id, node.y);
    }
    for i in 0..layout.nodes.len() {
        for j in (i + 1)..layout.nodes.len() {
            let (a, b) = (&layout.nodes[i], &layout.nodes[j]);
            let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
            assert!(dist > 1.0, "{} and {} overlap", a.id, b.id);
        }
    }
}

#[test]
fn same_seed_gives_same_layout() {
    let Diagram::KnowledgeGraph(data) = load_fixture("fever_flu.json") else {
        panic!("expected a knowledge graph");
    };
    let config = Config::default();
    let viewport = Viewport::new(390.0, 640.0);
    let first = settle_knowledge_graph(&data, viewport, &config.layout.simulation);
    let second = settle_knowledge_graph(&data, viewport, &config.layout.simulation);
    assert_eq!(first, second);
}

#[test]
fn dangling_edges_and_duplicates_are_dropped() {
    let Diagram::KnowledgeGraph(data) = load_fixture("dangling.json") else {
        panic!("expected a knowledge graph");
    };
    let config = Config::default();
    let layout = settle_knowledge_graph(&data, Viewport::new(390.0, 640.0), &config.layout.simulation);
    assert_eq!(layout.nodes.len(), 2);
    assert_eq!(layout.node("n1").map(|node| node.label.as_str()), Some("Headache"));
    assert_eq!(layout.edges.len(), 1);
    assert_eq!(layout.edges[0].relation, "SUGGESTS");
}

#[test]
fn cyclic_flowchart_levels_and_trace() {
    let Diagram::Flowchart(data) = load_fixture("cyclic_flowchart.json") else {
        panic!("expected a flowchart");
    };
    let mut view = FlowchartView::new(&Config::default().layout);
    view.resize(Viewport::new(390.0, 640.0));
    view.set_data(data);

    let layout = view.layout().expect("layout computed");
    assert_eq!(layout.level_of("start"), Some(0));
    assert_eq!(layout.level_of("check"), Some(1));
    assert_eq!(layout.level_of("a"), Some(2));
    assert_eq!(layout.level_of("b"), Some(2));
    assert!(layout.level_of("end").is_some_and(|level| level >= 3));

    let selection = view.click("b").clone();
    for id in ["b", "check", "start", "a"] {
        assert!(selection.contains_node(id), "{id} should be traced");
    }
    assert!(!selection.contains_node("end"));
    assert!(selection.contains_edge(0));
    assert!(selection.contains_edge(2));
    assert!(!selection.contains_edge(4));

    assert_eq!(view.click("b"), &selection);
    assert!(view.click("start").is_sole("start"));
    assert!(view.click("start").is_empty());
}

#[test]
fn json_dump_matches_layout() {
    let Diagram::Flowchart(data) = load_fixture("cyclic_flowchart.json") else {
        panic!("expected a flowchart");
    };
    let layout = compute_flowchart_layout(&data, Viewport::new(390.0, 0.0), &Config::default().layout.flowchart);
    assert!(layout.height >= 600.0);
    let value = serde_json::to_value(LayoutDump::from_flowchart(&layout)).unwrap();
    assert_eq!(value["nodes"].as_array().map(Vec::len), Some(5));
    assert_eq!(value["edges"].as_array().map(Vec::len), Some(6));
    assert_eq!(value["nodes"][0]["level"], 0);
}

#[test]
fn config_file_overrides_defaults() {
    let config = load_config(Some(&fixture_path("config.json"))).unwrap();
    assert_eq!(config.theme.highlight_color, "#F97316");
    assert_eq!(config.theme.background, Theme::dark().background);
    assert_eq!(config.layout.simulation.seed, 7);
    assert_eq!(config.layout.simulation.max_iterations, 300);
    assert_eq!(config.layout.simulation.repulsion, 1200.0);
    assert_eq!(config.layout.flowchart.level_height, 120.0);
    assert_eq!(config.render.width, 480.0);
}

#[test]
fn rejects_non_object_documents() {
    assert!(matches!(parse_diagram("[1, 2]", None), Err(InputError::NotAnObject)));
    assert!(matches!(parse_diagram("{nodes", None), Err(InputError::Json(_))));
}
