//! Accumulating extracted graphs and archiving them as learned concepts.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ir::{GraphNode, KnowledgeGraphData};

const DEFAULT_SOURCE: &str = "Chat Analysis";

impl KnowledgeGraphData {
    /// Merges a freshly extracted graph: nodes with an id already present are
    /// dropped, every extracted edge is appended. Returns the number of new
    /// nodes.
    pub fn absorb(&mut self, extracted: KnowledgeGraphData) -> usize {
        let mut seen: HashSet<String> = self.nodes.iter().map(|node| node.id.clone()).collect();
        let before = self.nodes.len();
        for node in extracted.nodes {
            if seen.insert(node.id.clone()) {
                self.nodes.push(node);
            }
        }
        self.edges.extend(extracted.edges);
        self.nodes.len() - before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearnedConcept {
    #[serde(flatten)]
    pub node: GraphNode,
    /// Seconds since the Unix epoch.
    pub learned_at: u64,
    pub confidence: f64,
    pub source_interaction: String,
}

/// The store of learned concepts that "training" feeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Brain {
    concepts: Vec<LearnedConcept>,
}

impl Brain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn concepts(&self) -> &[LearnedConcept] {
        &self.concepts
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    pub fn knows(&self, id: &str) -> bool {
        self.concepts.iter().any(|concept| concept.node.id == id)
    }

    /// Archives every node of `graph` that is not known yet, then clears the
    /// graph. Returns how many concepts were new.
    pub fn train(&mut self, graph: &mut KnowledgeGraphData) -> usize {
        self.train_with(graph, &mut rand::thread_rng(), now_unix())
    }

    pub fn train_with<R: Rng>(
        &mut self,
        graph: &mut KnowledgeGraphData,
        rng: &mut R,
        learned_at: u64,
    ) -> usize {
        if graph.nodes.is_empty() {
            return 0;
        }
        let mut learned = 0;
        for node in graph.nodes.drain(..) {
            if self.knows(&node.id) {
                continue;
            }
            self.concepts.push(LearnedConcept {
                node,
                learned_at,
                confidence: rng.gen_range(0.8..=1.0),
                source_interaction: DEFAULT_SOURCE.to_string(),
            });
            learned += 1;
        }
        graph.edges.clear();
        tracing::debug!(learned, total = self.concepts.len(), "trained on graph");
        learned
    }
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}
