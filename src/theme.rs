use serde::{Deserialize, Serialize};

use crate::ir::{FlowNodeKind, NodeKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f64,
    pub background: String,
    pub text_color: String,
    pub line_color: String,
    pub highlight_color: String,
    pub edge_label_background: String,
    pub edge_label_border: String,
    pub badge_color: String,
}

/// Fill, stroke and text color for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePalette {
    pub fill: &'static str,
    pub stroke: &'static str,
    pub text: &'static str,
}

impl Theme {
    pub fn clinical() -> Self {
        Self {
            font_family: "Kanit, Inter, system-ui, sans-serif".to_string(),
            font_size: 12.0,
            background: "#F8FAFC".to_string(),
            text_color: "#1E293B".to_string(),
            line_color: "#94A3B8".to_string(),
            highlight_color: "#3B82F6".to_string(),
            edge_label_background: "#FFFFFF".to_string(),
            edge_label_border: "#E2E8F0".to_string(),
            badge_color: "#1E293B".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Kanit, Inter, system-ui, sans-serif".to_string(),
            font_size: 12.0,
            background: "#0F172A".to_string(),
            text_color: "#E2E8F0".to_string(),
            line_color: "#475569".to_string(),
            highlight_color: "#60A5FA".to_string(),
            edge_label_background: "#1E293B".to_string(),
            edge_label_border: "#334155".to_string(),
            badge_color: "#334155".to_string(),
        }
    }

    pub fn node_palette(&self, kind: NodeKind) -> NodePalette {
        match kind {
            NodeKind::Symptom => NodePalette {
                fill: "#FFEDD5",
                stroke: "#FED7AA",
                text: "#EA580C",
            },
            NodeKind::Disease => NodePalette {
                fill: "#FEE2E2",
                stroke: "#FECACA",
                text: "#DC2626",
            },
            NodeKind::Medicine => NodePalette {
                fill: "#DCFCE7",
                stroke: "#BBF7D0",
                text: "#16A34A",
            },
            NodeKind::Location => NodePalette {
                fill: "#DBEAFE",
                stroke: "#BFDBFE",
                text: "#2563EB",
            },
            NodeKind::Other => NodePalette {
                fill: "#F1F5F9",
                stroke: "#E2E8F0",
                text: "#475569",
            },
        }
    }

    pub fn flow_palette(&self, kind: FlowNodeKind, active: bool) -> NodePalette {
        match (kind, active) {
            (FlowNodeKind::Start | FlowNodeKind::End, false) => NodePalette {
                fill: "#1E293B",
                stroke: "#334155",
                text: "#FFFFFF",
            },
            (FlowNodeKind::Start | FlowNodeKind::End, true) => NodePalette {
                fill: "#0056B3",
                stroke: "#60A5FA",
                text: "#FFFFFF",
            },
            (FlowNodeKind::Decision, false) => NodePalette {
                fill: "#FEFCE8",
                stroke: "#FACC15",
                text: "#1E293B",
            },
            (FlowNodeKind::Decision, true) => NodePalette {
                fill: "#FEF9C3",
                stroke: "#EAB308",
                text: "#713F12",
            },
            (FlowNodeKind::Process, false) => NodePalette {
                fill: "#FFFFFF",
                stroke: "#E2E8F0",
                text: "#334155",
            },
            (FlowNodeKind::Process, true) => NodePalette {
                fill: "#EFF6FF",
                stroke: "#3B82F6",
                text: "#1E40AF",
            },
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::clinical()
    }
}
