use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::geometry::{self, Vec2};
use crate::ir::{GraphEdge, GraphNode, KnowledgeGraphData};

use super::types::{EdgeLayout, GraphLayout, PositionedNode, Viewport};

/// A graph node plus its physics state.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationNode {
    pub node: GraphNode,
    pub position: Vec2,
    pub velocity: Vec2,
    // Spawned while the viewport had no area; placed on the first real size.
    placed: bool,
}

impl SimulationNode {
    pub fn id(&self) -> &str {
        &self.node.id
    }
}

/// Force-directed layout over an arena of nodes. Edges are stored as given
/// and resolved to arena slots on every merge; a slot never outlives the
/// merge that produced it.
#[derive(Debug)]
pub struct ForceSimulation {
    config: SimulationConfig,
    viewport: Viewport,
    nodes: Vec<SimulationNode>,
    slots: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    links: Vec<(usize, usize)>,
    pinned: Option<String>,
    iterations: usize,
    rng: StdRng,
}

impl ForceSimulation {
    pub fn new(config: SimulationConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            viewport: Viewport::default(),
            nodes: Vec::new(),
            slots: HashMap::new(),
            edges: Vec::new(),
            links: Vec::new(),
            pinned: None,
            iterations: 0,
            rng,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn nodes(&self) -> &[SimulationNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&SimulationNode> {
        self.slots.get(id).map(|&slot| &self.nodes[slot])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn pinned(&self) -> Option<&str> {
        self.pinned.as_deref()
    }

    /// Whether another tick would do any work.
    pub fn is_running(&self) -> bool {
        !self.nodes.is_empty()
            && !self.viewport.is_empty()
            && self.iterations < self.config.max_iterations
    }

    /// Starts a fresh iteration budget.
    pub fn restart(&mut self) {
        self.iterations = 0;
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        if !viewport.is_empty() {
            for slot in 0..self.nodes.len() {
                if !self.nodes[slot].placed {
                    let position = self.spawn_position();
                    let node = &mut self.nodes[slot];
                    node.position = position;
                    node.placed = true;
                }
            }
        }
        self.restart();
    }

    /// Replaces the node set with `data`, carrying over position and velocity
    /// for ids that survive. New ids spawn around the viewport center.
    pub fn set_graph(&mut self, data: &KnowledgeGraphData) {
        self.restart();
        if data.nodes.is_empty() {
            self.clear();
            return;
        }

        let mut previous: HashMap<String, SimulationNode> = self
            .nodes
            .drain(..)
            .map(|node| (node.node.id.clone(), node))
            .collect();
        let mut nodes = Vec::with_capacity(data.nodes.len());
        let mut slots = HashMap::with_capacity(data.nodes.len());
        let mut spawned = 0usize;

        for node in &data.nodes {
            if slots.contains_key(&node.id) {
                tracing::debug!(id = %node.id, "duplicate node id ignored");
                continue;
            }
            let merged = match previous.remove(&node.id) {
                Some(existing) => SimulationNode {
                    node: node.clone(),
                    ..existing
                },
                None => {
                    spawned += 1;
                    let placed = !self.viewport.is_empty();
                    SimulationNode {
                        node: node.clone(),
                        position: self.spawn_position(),
                        velocity: Vec2::ZERO,
                        placed,
                    }
                }
            };
            slots.insert(node.id.clone(), nodes.len());
            nodes.push(merged);
        }

        self.nodes = nodes;
        self.slots = slots;
        self.edges = data.edges.clone();
        self.links = self.resolve_links();
        if self
            .pinned
            .as_deref()
            .is_some_and(|id| !self.slots.contains_key(id))
        {
            self.pinned = None;
        }
        tracing::debug!(
            nodes = self.nodes.len(),
            spawned,
            dropped = previous.len(),
            edges = self.edges.len(),
            links = self.links.len(),
            "merged graph into simulation"
        );
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.slots.clear();
        self.edges.clear();
        self.links.clear();
        self.pinned = None;
    }

    /// Resolves an edge to arena slots. Edges naming an id outside the
    /// current node set resolve to `None` and take no part in layout.
    pub fn resolve_edge(&self, edge: &GraphEdge) -> Option<(usize, usize)> {
        let source = self.slots.get(&edge.source)?;
        let target = self.slots.get(&edge.target)?;
        Some((*source, *target))
    }

    fn resolve_links(&self) -> Vec<(usize, usize)> {
        let mut links = Vec::with_capacity(self.edges.len());
        for edge in &self.edges {
            match self.resolve_edge(edge) {
                Some(link) => links.push(link),
                None => tracing::debug!(
                    source = %edge.source,
                    target = %edge.target,
                    "skipping dangling edge"
                ),
            }
        }
        links
    }

    fn spawn_position(&mut self) -> Vec2 {
        let jitter = self.config.spawn_jitter;
        let offset = Vec2::new(
            (self.rng.r#gen::<f64>() - 0.5) * jitter,
            (self.rng.r#gen::<f64>() - 0.5) * jitter,
        );
        self.viewport.center() + offset
    }

    /// Pins `id` under the pointer. Returns false for unknown ids.
    pub fn pin(&mut self, id: &str) -> bool {
        let Some(&slot) = self.slots.get(id) else {
            return false;
        };
        self.nodes[slot].velocity = Vec2::ZERO;
        self.pinned = Some(id.to_string());
        self.restart();
        true
    }

    /// Moves the pinned node to the pointer, if any node is pinned.
    pub fn drag_to(&mut self, position: Vec2) {
        let Some(slot) = self.pinned_slot() else {
            return;
        };
        let node = &mut self.nodes[slot];
        node.position = position;
        node.velocity = Vec2::ZERO;
        node.placed = true;
    }

    /// Releases the pinned node with zero velocity so it does not fling.
    pub fn release(&mut self) {
        if let Some(slot) = self.pinned_slot() {
            self.nodes[slot].velocity = Vec2::ZERO;
        }
        if self.pinned.take().is_some() {
            self.restart();
        }
    }

    fn pinned_slot(&self) -> Option<usize> {
        self.pinned
            .as_deref()
            .and_then(|id| self.slots.get(id).copied())
    }

    /// Advances the simulation by one frame. Returns true while the iteration
    /// budget has ticks left.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let pinned = self.pinned_slot();
        let scale = self.config.force_scale;

        self.apply_repulsion(pinned, scale);
        self.apply_attraction(pinned, scale);
        self.integrate(pinned);

        self.iterations += 1;
        tracing::trace!(iteration = self.iterations, "simulation tick");
        self.is_running()
    }

    /// Runs ticks until the budget is spent; returns how many ran.
    pub fn settle(&mut self) -> usize {
        let mut ticks = 0;
        while self.is_running() {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    fn apply_repulsion(&mut self, pinned: Option<usize>, scale: f64) {
        let count = self.nodes.len();
        for i in 0..count {
            for j in (i + 1)..count {
                let force = geometry::repulsion(
                    self.nodes[i].position,
                    self.nodes[j].position,
                    self.config.repulsion,
                    self.config.min_distance_sq,
                ) * scale;
                if pinned != Some(i) {
                    self.nodes[i].velocity += force;
                }
                if pinned != Some(j) {
                    self.nodes[j].velocity -= force;
                }
            }
        }
    }

    fn apply_attraction(&mut self, pinned: Option<usize>, scale: f64) {
        let ideal = geometry::ideal_distance(
            self.viewport.width,
            self.viewport.height,
            self.nodes.len(),
            self.config.ideal_distance_factor,
        );
        for &(source, target) in &self.links {
            let force = geometry::attraction(
                self.nodes[source].position,
                self.nodes[target].position,
                ideal,
            ) * scale;
            if pinned != Some(source) {
                self.nodes[source].velocity -= force;
            }
            if pinned != Some(target) {
                self.nodes[target].velocity += force;
            }
        }
    }

    fn integrate(&mut self, pinned: Option<usize>) {
        let center = self.viewport.center();
        let padding = self.config.padding;
        let stiffness = self.config.boundary_stiffness;
        let (max_x, max_y) = (self.viewport.width - padding, self.viewport.height - padding);

        for (slot, node) in self.nodes.iter_mut().enumerate() {
            if pinned == Some(slot) {
                node.velocity = Vec2::ZERO;
                continue;
            }
            node.velocity += geometry::centering(node.position, center, self.config.center_strength);
            node.velocity = geometry::damp(node.velocity, self.config.damping);
            node.position += node.velocity;
            node.position.x = geometry::soft_bound(node.position.x, padding, max_x, stiffness);
            node.position.y = geometry::soft_bound(node.position.y, padding, max_y, stiffness);
        }
    }

    /// Read-only copy of the current positions for the render layer.
    pub fn snapshot(&self) -> GraphLayout {
        let nodes = self
            .nodes
            .iter()
            .map(|node| PositionedNode {
                id: node.node.id.clone(),
                label: node.node.label.clone(),
                kind: node.node.kind,
                x: node.position.x,
                y: node.position.y,
            })
            .collect();
        let edges = self
            .edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let (source, target) = self.resolve_edge(edge)?;
                Some(EdgeLayout {
                    index,
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    relation: edge.relation.clone(),
                    from: self.nodes[source].position,
                    to: self.nodes[target].position,
                })
            })
            .collect();
        GraphLayout {
            width: self.viewport.width,
            height: self.viewport.height,
            nodes,
            edges,
        }
    }
}
