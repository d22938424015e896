mod clock;
mod leveling;
mod simulation;
mod trace;
pub(crate) mod types;
mod view;

pub use clock::{Clock, FrameId, ManualClock, SimulationDriver};
pub use leveling::compute_flowchart_layout;
pub use simulation::{ForceSimulation, SimulationNode};
pub use trace::{PathTracer, Selection, SelectionState};
pub use types::*;
pub use view::ViewTransform;

use crate::config::{FlowchartConfig, LayoutConfig, SimulationConfig};
use crate::geometry::Vec2;
use crate::ir::{FlowchartData, KnowledgeGraphData};

/// Level of every flowchart node, in input order.
pub fn flowchart_levels(data: &FlowchartData) -> Vec<usize> {
    leveling::assign_levels(data)
}

/// Lays out a knowledge graph by running the simulation to the end of its
/// iteration budget. Returns an empty layout for a zero-area viewport.
pub fn settle_knowledge_graph(
    data: &KnowledgeGraphData,
    viewport: Viewport,
    config: &SimulationConfig,
) -> GraphLayout {
    let mut driver = SimulationDriver::new(ForceSimulation::new(config.clone()), ManualClock::new());
    driver.resize(viewport);
    driver.set_graph(data);
    let ticks = driver.run_until_idle();
    tracing::debug!(ticks, nodes = data.nodes.len(), "knowledge graph settled");
    let mut layout = driver.snapshot();
    if viewport.is_empty() {
        layout.nodes.clear();
        layout.edges.clear();
    }
    layout
}

/// An interactive flowchart: leveled layout, ancestor selection and the view
/// transform, kept consistent with each other.
#[derive(Debug, Clone)]
pub struct FlowchartView {
    data: FlowchartData,
    config: FlowchartConfig,
    viewport: Viewport,
    layout: Option<FlowchartLayout>,
    selection: SelectionState,
    view: ViewTransform,
}

impl FlowchartView {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            data: FlowchartData::default(),
            config: config.flowchart.clone(),
            viewport: Viewport::default(),
            layout: None,
            selection: SelectionState::default(),
            view: ViewTransform::new(config.view.clone()),
        }
    }

    /// Replaces the diagram wholesale; any selection is dropped.
    pub fn set_data(&mut self, data: FlowchartData) {
        self.selection.set_data(&data);
        self.data = data;
        self.relayout();
    }

    /// Tracks the container size. A zero width is ignored, keeping the last
    /// known size.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.width <= 0.0 {
            return;
        }
        self.viewport = viewport;
        self.relayout();
    }

    fn relayout(&mut self) {
        if self.data.is_empty() || self.viewport.width <= 0.0 {
            self.layout = None;
            return;
        }
        self.layout = Some(compute_flowchart_layout(&self.data, self.viewport, &self.config));
    }

    pub fn data(&self) -> &FlowchartData {
        &self.data
    }

    pub fn layout(&self) -> Option<&FlowchartLayout> {
        self.layout.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        self.selection.selection()
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn click(&mut self, id: &str) -> &Selection {
        self.selection.click(id)
    }

    /// Node under a screen point, if any, given a hit radius in layout units.
    pub fn node_at(&self, screen: Vec2, radius: f64) -> Option<&LevelNode> {
        let layout = self.layout.as_ref()?;
        let point = self.view.to_layout(screen);
        layout
            .nodes
            .iter()
            .find(|node| Vec2::new(node.x, node.y).distance(point) <= radius)
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.view.zoom_in()
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.view.zoom_out()
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.view.pan_by(delta);
    }

    /// View-level reset: identity transform and no selection. The data and
    /// layout are untouched.
    pub fn reset(&mut self) {
        self.view.reset();
        self.selection.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{FlowNodeKind, FlowchartEdge, FlowchartNode, GraphEdge, GraphNode, NodeKind};

    fn sample_flow() -> FlowchartData {
        FlowchartData {
            nodes: vec![
                FlowchartNode::new("s", "Start", FlowNodeKind::Start),
                FlowchartNode::new("d", "Pain?", FlowNodeKind::Decision),
                FlowchartNode::new("e", "End", FlowNodeKind::End),
            ],
            edges: vec![
                FlowchartEdge::new("s", "d"),
                FlowchartEdge::labeled("d", "e", "No"),
            ],
        }
    }

    #[test]
    fn flowchart_view_defers_until_width_known() {
        let mut view = FlowchartView::new(&LayoutConfig::default());
        view.set_data(sample_flow());
        assert!(view.layout().is_none());

        view.resize(Viewport::new(0.0, 500.0));
        assert!(view.layout().is_none());

        view.resize(Viewport::new(360.0, 500.0));
        let layout = view.layout().unwrap();
        assert_eq!(layout.level_of("e"), Some(2));
    }

    #[test]
    fn reset_clears_selection_and_zoom_only() {
        let mut view = FlowchartView::new(&LayoutConfig::default());
        view.resize(Viewport::new(360.0, 640.0));
        view.set_data(sample_flow());
        view.click("e");
        view.zoom_in();
        assert_eq!(view.selection().nodes.len(), 3);

        view.reset();
        assert!(view.selection().is_empty());
        assert_eq!(view.view().zoom, 1.0);
        assert_eq!(view.layout().map(|layout| layout.nodes.len()), Some(3));
    }

    #[test]
    fn replacing_data_drops_selection() {
        let mut view = FlowchartView::new(&LayoutConfig::default());
        view.resize(Viewport::new(360.0, 640.0));
        view.set_data(sample_flow());
        view.click("d");
        view.set_data(sample_flow());
        assert!(view.selection().is_empty());
    }

    #[test]
    fn hit_testing_respects_zoom() {
        let mut view = FlowchartView::new(&LayoutConfig::default());
        view.resize(Viewport::new(360.0, 640.0));
        view.set_data(sample_flow());
        let start = view.layout().unwrap().node("s").unwrap().clone();
        view.zoom_in();
        let screen = Vec2::new(start.x * 1.1, start.y * 1.1);
        assert_eq!(view.node_at(screen, 20.0).map(|node| node.id.as_str()), Some("s"));
        assert!(view.node_at(Vec2::new(0.0, 0.0), 20.0).is_none());
    }

    #[test]
    fn settle_handles_zero_viewport_and_scenario() {
        let data = KnowledgeGraphData {
            nodes: vec![
                GraphNode::new("n1", "Fever", NodeKind::Symptom),
                GraphNode::new("n2", "Flu", NodeKind::Disease),
            ],
            edges: vec![GraphEdge::new("n1", "n2", "INDICATES")],
        };
        let config = SimulationConfig::default();
        assert!(settle_knowledge_graph(&data, Viewport::new(0.0, 0.0), &config).nodes.is_empty());

        let layout = settle_knowledge_graph(&data, Viewport::new(390.0, 640.0), &config);
        assert_eq!(layout.nodes.len(), 2);
        assert_eq!(layout.edges.len(), 1);
    }
}
