use serde::Serialize;

use crate::geometry::Vec2;
use crate::ir::{FlowNodeKind, NodeKind};

/// Rendered-area dimensions in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when the area is zero (or not a usable number), in which case
    /// the simulation must not run.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite())
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
}

/// An edge whose endpoints both resolved, with its index in the input list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeLayout {
    pub index: usize,
    pub source: String,
    pub target: String,
    pub relation: String,
    pub from: Vec2,
    pub to: Vec2,
}

impl EdgeLayout {
    pub fn midpoint(&self) -> Vec2 {
        (self.from + self.to) * 0.5
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphLayout {
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<EdgeLayout>,
}

impl GraphLayout {
    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelNode {
    pub id: String,
    pub label: String,
    pub kind: FlowNodeKind,
    pub level: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEdgeLayout {
    pub index: usize,
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
}

impl FlowEdgeLayout {
    /// Anchor for the edge label: halfway across, on the elbow's horizontal run.
    pub fn label_anchor(&self) -> Option<(f64, f64)> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        let mid_y = self.points.get(1).map(|point| point.1).unwrap_or(first.1);
        Some(((first.0 + last.0) / 2.0, mid_y))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowchartLayout {
    pub width: f64,
    pub height: f64,
    pub levels: usize,
    pub nodes: Vec<LevelNode>,
    pub edges: Vec<FlowEdgeLayout>,
}

impl FlowchartLayout {
    pub fn node(&self, id: &str) -> Option<&LevelNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn level_of(&self, id: &str) -> Option<usize> {
        self.node(id).map(|node| node.level)
    }
}
