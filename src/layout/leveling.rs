use std::collections::{HashMap, VecDeque};

use crate::config::FlowchartConfig;
use crate::ir::FlowchartData;

use super::types::{FlowEdgeLayout, FlowchartLayout, LevelNode, Viewport};

const DECISION_EDGE_OFFSET: f64 = 50.0;
const NODE_EDGE_OFFSET: f64 = 30.0;

/// Index of each node id in input order. Later duplicates of an id are
/// ignored.
pub(super) fn node_indices(data: &FlowchartData) -> HashMap<&str, usize> {
    let mut index = HashMap::with_capacity(data.nodes.len());
    for (idx, node) in data.nodes.iter().enumerate() {
        index.entry(node.id.as_str()).or_insert(idx);
    }
    index
}

/// Assigns a level to every node, indexed like `data.nodes`.
///
/// Nodes are peeled Kahn-style: a node is placed once every unplaced
/// predecessor is placed, one level below the deepest of them. Edges from
/// already-placed nodes never block a new root. When only cycles remain the
/// earliest unplaced node in input order is forced in as a root, which keeps
/// the whole pass linear and guarantees termination on any input.
pub(crate) fn assign_levels(data: &FlowchartData) -> Vec<usize> {
    let count = data.nodes.len();
    let index = node_indices(data);

    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut indegree = vec![0usize; count];
    for edge in &data.edges {
        let (Some(&source), Some(&target)) = (
            index.get(edge.source.as_str()),
            index.get(edge.target.as_str()),
        ) else {
            tracing::debug!(
                source = %edge.source,
                target = %edge.target,
                "skipping dangling flowchart edge"
            );
            continue;
        };
        successors[source].push(target);
        indegree[target] += 1;
    }

    let mut processed = vec![false; count];
    let mut levels = vec![0usize; count];
    let mut queue: VecDeque<usize> = VecDeque::new();
    let mut placed = 0usize;
    let mut cursor = 0usize;
    let mut forced = 0usize;

    // Duplicate ids share the first occurrence's slot; mark the rest done.
    for (idx, node) in data.nodes.iter().enumerate() {
        if index.get(node.id.as_str()) != Some(&idx) {
            processed[idx] = true;
            placed += 1;
        }
    }

    for (idx, degree) in indegree.iter().enumerate() {
        if *degree == 0 && !processed[idx] {
            queue.push_back(idx);
        }
    }

    while placed < count {
        if queue.is_empty() {
            while cursor < count && processed[cursor] {
                cursor += 1;
            }
            if cursor >= count {
                break;
            }
            forced += 1;
            queue.push_back(cursor);
        }

        while let Some(node) = queue.pop_front() {
            if processed[node] {
                continue;
            }
            processed[node] = true;
            placed += 1;
            let level = levels[node];
            for &next in &successors[node] {
                if processed[next] {
                    continue;
                }
                levels[next] = levels[next].max(level + 1);
                indegree[next] = indegree[next].saturating_sub(1);
                if indegree[next] == 0 {
                    queue.push_back(next);
                }
            }
        }
    }

    for (idx, node) in data.nodes.iter().enumerate() {
        if let Some(&first) = index.get(node.id.as_str()) {
            levels[idx] = levels[first];
        }
    }

    tracing::debug!(
        nodes = count,
        forced_roots = forced,
        levels = levels.iter().max().map_or(0, |max| max + 1),
        "assigned flowchart levels"
    );
    levels
}

/// Lays out a flowchart top-to-bottom by level, siblings centered on the
/// canvas midpoint in input order. The canvas grows past the viewport when
/// the content needs it.
pub fn compute_flowchart_layout(
    data: &FlowchartData,
    viewport: Viewport,
    config: &FlowchartConfig,
) -> FlowchartLayout {
    let levels = assign_levels(data);
    let index = node_indices(data);

    let mut rows: Vec<Vec<usize>> = Vec::new();
    for (idx, node) in data.nodes.iter().enumerate() {
        if index.get(node.id.as_str()) != Some(&idx) {
            continue;
        }
        let level = levels[idx];
        if rows.len() <= level {
            rows.resize_with(level + 1, Vec::new);
        }
        rows[level].push(idx);
    }

    let max_row_width = rows
        .iter()
        .map(|row| row.len() as f64 * config.node_spacing)
        .fold(0.0, f64::max);
    let viewport_height = if viewport.height > 0.0 {
        viewport.height
    } else {
        config.fallback_viewport_height
    };
    let level_count = rows.len();
    let width = viewport.width.max(max_row_width + config.horizontal_margin);
    let height = viewport_height
        .max(level_count as f64 * config.level_height + config.vertical_margin);
    let center_x = width / 2.0;

    let mut nodes = Vec::with_capacity(data.nodes.len());
    for (level, row) in rows.iter().enumerate() {
        let total = row.len().saturating_sub(1) as f64 * config.node_spacing;
        let start_x = center_x - total / 2.0;
        for (rank, &idx) in row.iter().enumerate() {
            let node = &data.nodes[idx];
            nodes.push(LevelNode {
                id: node.id.clone(),
                label: node.label.clone(),
                kind: node.kind,
                level,
                x: start_x + rank as f64 * config.node_spacing,
                y: config.top_margin + level as f64 * config.level_height,
            });
        }
    }

    let positions: HashMap<&str, &LevelNode> =
        nodes.iter().map(|node| (node.id.as_str(), node)).collect();
    let edges = data
        .edges
        .iter()
        .enumerate()
        .filter_map(|(idx, edge)| {
            let source = positions.get(edge.source.as_str())?;
            let target = positions.get(edge.target.as_str())?;
            Some(FlowEdgeLayout {
                index: idx,
                source: edge.source.clone(),
                target: edge.target.clone(),
                label: edge.label.clone(),
                points: elbow_points(source, target),
            })
        })
        .collect();

    FlowchartLayout {
        width,
        height,
        levels: level_count,
        nodes,
        edges,
    }
}

fn edge_offset(node: &LevelNode) -> f64 {
    match node.kind {
        crate::ir::FlowNodeKind::Decision => DECISION_EDGE_OFFSET,
        _ => NODE_EDGE_OFFSET,
    }
}

fn elbow_points(source: &LevelNode, target: &LevelNode) -> Vec<(f64, f64)> {
    let source_y = source.y + edge_offset(source);
    let target_y = target.y - edge_offset(target);
    let mid_y = (source_y + target_y) / 2.0;
    vec![
        (source.x, source_y),
        (source.x, mid_y),
        (target.x, mid_y),
        (target.x, target_y),
    ]
}
