use serde::{Deserialize, Serialize};

use crate::error::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum NodeKind {
    Symptom,
    Disease,
    Medicine,
    Location,
    Other,
}

impl From<String> for NodeKind {
    fn from(token: String) -> Self {
        Self::from_token(&token)
    }
}

impl NodeKind {
    /// Unknown entity types from the extractor collapse to `Other`.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "symptom" => Self::Symptom,
            "disease" => Self::Disease,
            "medicine" => Self::Medicine,
            "location" => Self::Location,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Symptom => "symptom",
            Self::Disease => "disease",
            Self::Medicine => "medicine",
            Self::Location => "location",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub relation: String,
}

impl GraphEdge {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relation: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relation: relation.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraphData {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl KnowledgeGraphData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FlowNodeKind {
    Start,
    Process,
    Decision,
    End,
}

impl From<String> for FlowNodeKind {
    /// Step types the model invents are drawn as plain process steps.
    fn from(token: String) -> Self {
        Self::from_token(token.trim().to_ascii_lowercase().as_str()).unwrap_or(Self::Process)
    }
}

impl FlowNodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Process => "process",
            Self::Decision => "decision",
            Self::End => "end",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "start" => Some(Self::Start),
            "process" => Some(Self::Process),
            "decision" => Some(Self::Decision),
            "end" => Some(Self::End),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowchartNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FlowNodeKind,
}

impl FlowchartNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: FlowNodeKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowchartEdge {
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FlowchartEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: None,
        }
    }

    pub fn labeled(
        source: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: Some(label.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowchartData {
    #[serde(default)]
    pub nodes: Vec<FlowchartNode>,
    #[serde(default)]
    pub edges: Vec<FlowchartEdge>,
}

impl FlowchartData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    KnowledgeGraph,
    Flowchart,
}

impl DiagramKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "graph" | "knowledge" | "knowledge-graph" => Some(Self::KnowledgeGraph),
            "flowchart" | "flow" => Some(Self::Flowchart),
            _ => None,
        }
    }
}

/// A parsed input document, ready for one of the two layout engines.
#[derive(Debug, Clone)]
pub enum Diagram {
    KnowledgeGraph(KnowledgeGraphData),
    Flowchart(FlowchartData),
}

impl Diagram {
    pub fn kind(&self) -> DiagramKind {
        match self {
            Self::KnowledgeGraph(_) => DiagramKind::KnowledgeGraph,
            Self::Flowchart(_) => DiagramKind::Flowchart,
        }
    }
}

/// Guesses the diagram kind of a raw JSON document. Any node typed with a
/// flowchart kind selects the flowchart engine; everything else is a
/// knowledge graph.
pub fn detect_kind(value: &serde_json::Value) -> DiagramKind {
    let flow_node = value
        .get("nodes")
        .and_then(|nodes| nodes.as_array())
        .is_some_and(|nodes| {
            nodes.iter().any(|node| {
                node.get("type")
                    .and_then(|kind| kind.as_str())
                    .and_then(FlowNodeKind::from_token)
                    .is_some()
            })
        });
    if flow_node {
        return DiagramKind::Flowchart;
    }
    DiagramKind::KnowledgeGraph
}

pub fn parse_diagram(input: &str, kind: Option<DiagramKind>) -> Result<Diagram, InputError> {
    let value: serde_json::Value = serde_json::from_str(input)?;
    if !value.is_object() {
        return Err(InputError::NotAnObject);
    }
    let kind = kind.unwrap_or_else(|| detect_kind(&value));
    let diagram = match kind {
        DiagramKind::KnowledgeGraph => Diagram::KnowledgeGraph(serde_json::from_value(value)?),
        DiagramKind::Flowchart => Diagram::Flowchart(serde_json::from_value(value)?),
    };
    Ok(diagram)
}
