use crate::layout::{FlowchartLayout, GraphLayout};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub kind: String,
    pub width: f64,
    pub height: f64,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub label: String,
    pub kind: String,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub points: Vec<[f64; 2]>,
}

impl LayoutDump {
    pub fn from_graph(layout: &GraphLayout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                label: node.label.clone(),
                kind: node.kind.as_str().to_string(),
                x: node.x,
                y: node.y,
                level: None,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: (!edge.relation.is_empty()).then(|| edge.relation.clone()),
                points: vec![[edge.from.x, edge.from.y], [edge.to.x, edge.to.y]],
            })
            .collect();

        LayoutDump {
            kind: "graph".to_string(),
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }

    pub fn from_flowchart(layout: &FlowchartLayout) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                label: node.label.clone(),
                kind: node.kind.as_str().to_string(),
                x: node.x,
                y: node.y,
                level: Some(node.level),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: edge.label.clone(),
                points: edge.points.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            kind: "flowchart".to_string(),
            width: layout.width,
            height: layout.height,
            nodes,
            edges,
        }
    }
}

/// Writes the dump as pretty JSON to `path`, or to stdout when absent.
pub fn write_layout_dump(path: Option<&Path>, dump: &LayoutDump) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            serde_json::to_writer_pretty(writer, dump)?;
        }
        None => {
            let mut stdout = io::stdout().lock();
            serde_json::to_writer_pretty(&mut stdout, dump)?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
