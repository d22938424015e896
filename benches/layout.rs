use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use medgraph::config::LayoutConfig;
use medgraph::ir::{
    FlowNodeKind, FlowchartData, FlowchartEdge, FlowchartNode, GraphEdge, GraphNode,
    KnowledgeGraphData, NodeKind,
};
use medgraph::layout::{
    SelectionState, Viewport, compute_flowchart_layout, settle_knowledge_graph,
};
use medgraph::render::render_graph_svg;
use medgraph::theme::Theme;
use std::hint::black_box;

const KINDS: [NodeKind; 4] = [
    NodeKind::Symptom,
    NodeKind::Disease,
    NodeKind::Medicine,
    NodeKind::Location,
];

fn knowledge_graph(nodes: usize, extra_edges: usize) -> KnowledgeGraphData {
    let mut data = KnowledgeGraphData::default();
    for i in 0..nodes {
        data.nodes
            .push(GraphNode::new(format!("n{i}"), format!("Concept {i}"), KINDS[i % KINDS.len()]));
    }
    for i in 1..nodes {
        data.edges
            .push(GraphEdge::new(format!("n{}", i / 2), format!("n{i}"), "RELATES_TO"));
    }
    let mut count = 0usize;
    'outer: for i in 0..nodes {
        for j in (i + 3)..nodes {
            if count >= extra_edges {
                break 'outer;
            }
            data.edges.push(GraphEdge::new(format!("n{i}"), format!("n{j}"), "CO_OCCURS"));
            count += 1;
        }
    }
    data
}

/// A decision ladder `levels` deep with a loop back from every branch.
fn flowchart(levels: usize, width: usize) -> FlowchartData {
    let mut data = FlowchartData::default();
    data.nodes.push(FlowchartNode::new("start", "Start", FlowNodeKind::Start));
    let mut previous = vec!["start".to_string()];
    for level in 0..levels {
        let decision = format!("d{level}");
        data.nodes
            .push(FlowchartNode::new(&decision, format!("Check {level}"), FlowNodeKind::Decision));
        for prev in &previous {
            data.edges.push(FlowchartEdge::new(prev, &decision));
        }
        previous.clear();
        for branch in 0..width {
            let id = format!("p{level}_{branch}");
            data.nodes
                .push(FlowchartNode::new(&id, format!("Step {level}.{branch}"), FlowNodeKind::Process));
            data.edges.push(FlowchartEdge::labeled(&decision, &id, format!("#{branch}")));
            if branch == 0 && level > 0 {
                data.edges.push(FlowchartEdge::new(&id, format!("d{}", level - 1)));
            }
            previous.push(id);
        }
    }
    data.nodes.push(FlowchartNode::new("end", "End", FlowNodeKind::End));
    for prev in &previous {
        data.edges.push(FlowchartEdge::new(prev, "end"));
    }
    data
}

fn bench_simulation(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulation_settle");
    let config = LayoutConfig::default();
    let viewport = Viewport::new(390.0, 640.0);
    for (nodes, extra_edges) in [(10usize, 5usize), (40, 40), (120, 200)] {
        let data = knowledge_graph(nodes, extra_edges);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("graph_{nodes}_{extra_edges}")),
            &data,
            |b, data| {
                b.iter(|| {
                    let layout = settle_knowledge_graph(black_box(data), viewport, &config.simulation);
                    black_box(layout.nodes.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_flowchart(c: &mut Criterion) {
    let mut group = c.benchmark_group("flowchart_layout");
    let config = LayoutConfig::default();
    let viewport = Viewport::new(390.0, 640.0);
    for (levels, width) in [(4usize, 2usize), (12, 4), (40, 6)] {
        let data = flowchart(levels, width);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("ladder_{levels}x{width}")),
            &data,
            |b, data| {
                b.iter(|| {
                    let layout = compute_flowchart_layout(black_box(data), viewport, &config.flowchart);
                    black_box(layout.edges.len());
                });
            },
        );
    }
    group.finish();
}

fn bench_trace(c: &mut Criterion) {
    let data = flowchart(40, 6);
    c.bench_function("trace_deepest_end", |b| {
        b.iter(|| {
            let mut state = SelectionState::new(black_box(&data));
            black_box(state.click("end").nodes.len());
        });
    });
}

fn bench_render(c: &mut Criterion) {
    let config = LayoutConfig::default();
    let theme = Theme::clinical();
    let layout = settle_knowledge_graph(
        &knowledge_graph(40, 40),
        Viewport::new(390.0, 640.0),
        &config.simulation,
    );
    c.bench_function("render_graph_svg_40", |b| {
        b.iter(|| black_box(render_graph_svg(black_box(&layout), &theme).len()));
    });
}

criterion_group!(benches, bench_simulation, bench_flowchart, bench_trace, bench_render);
criterion_main!(benches);
