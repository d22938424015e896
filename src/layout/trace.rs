use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::ir::FlowchartData;

/// Highlighted nodes and edge indices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub nodes: BTreeSet<String>,
    pub edges: BTreeSet<usize>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    pub fn contains_edge(&self, index: usize) -> bool {
        self.edges.contains(&index)
    }

    /// True when `id` is the one and only active node.
    pub fn is_sole(&self, id: &str) -> bool {
        self.nodes.len() == 1 && self.nodes.contains(id)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}

/// Reverse adjacency (`target -> [(source, edge index)]`) built once per
/// flowchart.
#[derive(Debug, Clone, Default)]
pub struct PathTracer {
    incoming: HashMap<String, Vec<(String, usize)>>,
    known: HashSet<String>,
}

impl PathTracer {
    pub fn new(data: &FlowchartData) -> Self {
        let known: HashSet<String> = data.nodes.iter().map(|node| node.id.clone()).collect();
        let mut incoming: HashMap<String, Vec<(String, usize)>> = HashMap::new();
        for (idx, edge) in data.edges.iter().enumerate() {
            if !known.contains(&edge.source) || !known.contains(&edge.target) {
                continue;
            }
            incoming
                .entry(edge.target.clone())
                .or_default()
                .push((edge.source.clone(), idx));
        }
        Self { incoming, known }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.known.contains(id)
    }

    /// Walks incoming edges breadth-first from `id`. Every edge followed out
    /// of a visited node is marked, including ones that reach an ancestor
    /// already seen, so converging paths highlight completely. Visited nodes
    /// are never expanded twice, which makes cycles safe.
    pub fn ancestors(&self, id: &str) -> Selection {
        let mut selection = Selection::default();
        if !self.contains(id) {
            return selection;
        }
        selection.nodes.insert(id.to_string());
        let mut queue = VecDeque::from([id.to_string()]);
        while let Some(current) = queue.pop_front() {
            let Some(incoming) = self.incoming.get(&current) else {
                continue;
            };
            for (source, edge) in incoming {
                selection.edges.insert(*edge);
                if selection.nodes.insert(source.clone()) {
                    queue.push_back(source.clone());
                }
            }
        }
        selection
    }
}

/// Click-driven selection over one flowchart. Replacing the data clears it.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    tracer: PathTracer,
    selection: Selection,
}

impl SelectionState {
    pub fn new(data: &FlowchartData) -> Self {
        Self {
            tracer: PathTracer::new(data),
            selection: Selection::default(),
        }
    }

    pub fn set_data(&mut self, data: &FlowchartData) {
        self.tracer = PathTracer::new(data);
        self.selection.clear();
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Selects the ancestor chain of `id`, or clears the selection when `id`
    /// is already the sole active node. Unknown ids leave it untouched.
    pub fn click(&mut self, id: &str) -> &Selection {
        if !self.tracer.contains(id) {
            tracing::debug!(id, "click on unknown flowchart node ignored");
            return &self.selection;
        }
        if self.selection.is_sole(id) {
            self.selection.clear();
        } else {
            self.selection = self.tracer.ancestors(id);
        }
        &self.selection
    }

    pub fn clear(&mut self) {
        self.selection.clear();
    }
}
