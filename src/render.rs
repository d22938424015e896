use crate::geometry::Vec2;
use crate::ir::FlowNodeKind;
use crate::layout::{FlowchartLayout, GraphLayout, LevelNode, Selection, ViewTransform};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const NODE_RADIUS: f64 = 28.0;
const CHAR_WIDTH_SCALE: f64 = 0.6;
const PILL_PAD_X: f64 = 10.0;
const PILL_HEIGHT: f64 = 18.0;
const DECISION_HALF: f64 = 50.0;

pub fn render_graph_svg(layout: &GraphLayout, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = layout.width.max(1.0);
    let height = layout.height.max(1.0);

    open_svg(&mut svg, width, height, theme);
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrowhead\" markerWidth=\"10\" markerHeight=\"7\" refX=\"{:.2}\" refY=\"3.5\" orient=\"auto\"><polygon points=\"0 0, 10 3.5, 0 7\" fill=\"{}\"/></marker>",
        NODE_RADIUS - 4.0,
        theme.line_color
    ));
    svg.push_str("</defs>");

    // Lines first, then labels, so a pill is never crossed by another line.
    for edge in &layout.edges {
        svg.push_str(&format!(
            "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{}\" stroke-width=\"1.5\" stroke-opacity=\"0.5\" marker-end=\"url(#arrowhead)\"/>",
            edge.from.x, edge.from.y, edge.to.x, edge.to.y, theme.line_color
        ));
    }

    let mut occupied: Vec<Rect> = Vec::new();
    for edge in &layout.edges {
        if edge.relation.is_empty() {
            continue;
        }
        let label = edge.relation.to_uppercase();
        let anchor = place_label(edge.midpoint(), &label, theme, &mut occupied);
        svg.push_str(&pill_svg(anchor, &label, theme, theme.text_color.as_str()));
    }

    for node in &layout.nodes {
        let palette = theme.node_palette(node.kind);
        svg.push_str(&format!(
            "<g class=\"node {}\" data-id=\"{}\">",
            node.kind.as_str(),
            escape_xml(&node.id)
        ));
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{NODE_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"3\"/>",
            node.x, node.y, palette.fill, palette.stroke
        ));
        let badge = node.kind.as_str().to_uppercase();
        let badge_width = text_width(&badge, 8.0) + 8.0;
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{badge_width:.2}\" height=\"12\" rx=\"6\" fill=\"{}\" stroke=\"#FFFFFF\" stroke-width=\"2\"/>",
            node.x - badge_width / 2.0,
            node.y + NODE_RADIUS - 8.0,
            theme.badge_color
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"8\" font-weight=\"bold\" fill=\"#FFFFFF\">{}</text>",
            node.x,
            node.y + NODE_RADIUS + 1.0,
            theme.font_family,
            escape_xml(&badge)
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" font-weight=\"bold\" fill=\"{}\">{}</text>",
            node.x,
            node.y + NODE_RADIUS + 22.0,
            theme.font_family,
            theme.font_size,
            palette.text,
            escape_xml(&node.label)
        ));
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

pub fn render_flowchart_svg(
    layout: &FlowchartLayout,
    selection: &Selection,
    view: &ViewTransform,
    theme: &Theme,
) -> String {
    let mut svg = String::new();
    let (width, height) = view.scaled_size(layout.width.max(1.0), layout.height.max(1.0));

    open_svg(&mut svg, width, height, theme);
    svg.push_str("<defs>");
    for (id, color) in [
        ("arrowhead-flow", theme.line_color.as_str()),
        ("arrowhead-flow-active", theme.highlight_color.as_str()),
    ] {
        svg.push_str(&format!(
            "<marker id=\"{id}\" markerWidth=\"12\" markerHeight=\"8\" refX=\"11\" refY=\"4\" orient=\"auto\"><polygon points=\"0 0, 12 4, 0 8\" fill=\"{color}\"/></marker>"
        ));
    }
    svg.push_str("</defs>");
    svg.push_str(&format!(
        "<g transform=\"translate({:.2} {:.2}) scale({})\">",
        view.pan.x, view.pan.y, view.zoom
    ));

    for edge in &layout.edges {
        let active = selection.contains_edge(edge.index);
        let (stroke, stroke_width, marker) = if active {
            (theme.highlight_color.as_str(), 3, "arrowhead-flow-active")
        } else {
            (theme.line_color.as_str(), 2, "arrowhead-flow")
        };
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\" stroke-linecap=\"round\" stroke-linejoin=\"round\" marker-end=\"url(#{marker})\"/>",
            points_to_path(&edge.points)
        ));
        if let (Some(label), Some((x, y))) = (edge.label.as_deref(), edge.label_anchor()) {
            let text = if active {
                theme.highlight_color.as_str()
            } else {
                theme.text_color.as_str()
            };
            svg.push_str(&pill_svg(Vec2::new(x, y), label, theme, text));
        }
    }

    for node in &layout.nodes {
        let active = selection.contains_node(&node.id);
        svg.push_str(&flow_node_svg(node, active, theme));
    }

    svg.push_str("</g></svg>");
    svg
}

fn open_svg(svg: &mut String, width: f64, height: f64, theme: &Theme) {
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"0 0 {width:.2} {height:.2}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
}

fn flow_node_svg(node: &LevelNode, active: bool, theme: &Theme) -> String {
    let palette = theme.flow_palette(node.kind, active);
    let label_width = text_width(&node.label, theme.font_size);
    let stroke_width = if active { 3 } else { 2 };
    let mut out = format!(
        "<g class=\"flow-node {}{}\" data-id=\"{}\">",
        node.kind.as_str(),
        if active { " active" } else { "" },
        escape_xml(&node.id)
    );
    match node.kind {
        FlowNodeKind::Start | FlowNodeKind::End => {
            let w = label_width + 40.0;
            let h = 40.0;
            out.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{w:.2}\" height=\"{h}\" rx=\"20\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{stroke_width}\"/>",
                node.x - w / 2.0,
                node.y - h / 2.0,
                palette.fill,
                palette.stroke
            ));
        }
        FlowNodeKind::Decision => {
            let r = DECISION_HALF;
            out.push_str(&format!(
                "<polygon points=\"{:.2},{:.2} {:.2},{:.2} {:.2},{:.2} {:.2},{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{stroke_width}\"/>",
                node.x,
                node.y - r,
                node.x + r,
                node.y,
                node.x,
                node.y + r,
                node.x - r,
                node.y,
                palette.fill,
                palette.stroke
            ));
        }
        FlowNodeKind::Process => {
            let w = (label_width + 32.0).min(200.0);
            let h = 48.0;
            out.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{w:.2}\" height=\"{h}\" rx=\"12\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{stroke_width}\"/>",
                node.x - w / 2.0,
                node.y - h / 2.0,
                palette.fill,
                palette.stroke
            ));
        }
    }
    out.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        node.x,
        node.y,
        theme.font_family,
        theme.font_size,
        palette.text,
        escape_xml(&node.label)
    ));
    out.push_str("</g>");
    out
}

fn pill_svg(anchor: Vec2, label: &str, theme: &Theme, text_color: &str) -> String {
    let width = text_width(label, theme.font_size * 0.75) + PILL_PAD_X * 2.0;
    format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{width:.2}\" height=\"{PILL_HEIGHT}\" rx=\"9\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/><text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{:.1}\" font-weight=\"bold\" fill=\"{text_color}\">{}</text>",
        anchor.x - width / 2.0,
        anchor.y - PILL_HEIGHT / 2.0,
        theme.edge_label_background,
        theme.edge_label_border,
        anchor.x,
        anchor.y,
        theme.font_family,
        theme.font_size * 0.75,
        escape_xml(label)
    )
}

fn points_to_path(points: &[(f64, f64)]) -> String {
    if points.is_empty() {
        return String::new();
    }
    let mut d = String::new();
    d.push_str(&format!("M {:.2} {:.2}", points[0].0, points[0].1));
    for point in points.iter().skip(1) {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

fn text_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * CHAR_WIDTH_SCALE
}

type Rect = (f64, f64, f64, f64);

/// Nudges a label down from `mid` until its pill clears the ones already
/// placed, giving up after a few steps.
fn place_label(mid: Vec2, label: &str, theme: &Theme, occupied: &mut Vec<Rect>) -> Vec2 {
    let width = text_width(label, theme.font_size * 0.75) + PILL_PAD_X * 2.0;
    let mut offset = 0.0;
    for _ in 0..6 {
        let anchor = Vec2::new(mid.x, mid.y + offset);
        let rect = (
            anchor.x - width / 2.0,
            anchor.y - PILL_HEIGHT / 2.0,
            width,
            PILL_HEIGHT,
        );
        if !collides(&rect, occupied) {
            occupied.push(rect);
            return anchor;
        }
        offset += PILL_HEIGHT + 4.0;
    }
    mid
}

fn collides(rect: &Rect, occupied: &[Rect]) -> bool {
    occupied.iter().any(|(x, y, w, h)| {
        rect.0 < x + w && rect.0 + rect.2 > *x && rect.1 < y + h && rect.1 + rect.3 > *y
    })
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, width: f64, height: f64) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(width as f32, height as f32)
        .or_else(|| usvg::Size::from_wh(390.0, 640.0))
        .ok_or_else(|| anyhow::anyhow!("invalid default canvas size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FlowchartConfig, SimulationConfig};
    use crate::ir::{
        FlowchartData, FlowchartEdge, FlowchartNode, GraphEdge, GraphNode, KnowledgeGraphData,
        NodeKind,
    };
    use crate::layout::{SelectionState, Viewport, compute_flowchart_layout, settle_knowledge_graph};

    #[test]
    fn graph_svg_draws_one_line_per_resolved_edge() {
        let data = KnowledgeGraphData {
            nodes: vec![
                GraphNode::new("n1", "Fever", NodeKind::Symptom),
                GraphNode::new("n2", "Flu & cold", NodeKind::Disease),
            ],
            edges: vec![
                GraphEdge::new("n1", "n2", "INDICATES"),
                GraphEdge::new("n1", "ghost", "TREATS"),
            ],
        };
        let layout = settle_knowledge_graph(&data, Viewport::new(390.0, 640.0), &SimulationConfig::default());
        let svg = render_graph_svg(&layout, &Theme::clinical());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<line ").count(), 1);
        assert!(svg.contains("INDICATES"));
        assert!(!svg.contains("TREATS"));
        assert!(svg.contains("Flu &amp; cold"));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn flowchart_svg_highlights_selection() {
        let data = FlowchartData {
            nodes: vec![
                FlowchartNode::new("s", "Start", FlowNodeKind::Start),
                FlowchartNode::new("d", "Red eye?", FlowNodeKind::Decision),
                FlowchartNode::new("p", "Refer", FlowNodeKind::Process),
            ],
            edges: vec![
                FlowchartEdge::new("s", "d"),
                FlowchartEdge::labeled("d", "p", "Yes"),
            ],
        };
        let layout = compute_flowchart_layout(&data, Viewport::new(360.0, 640.0), &FlowchartConfig::default());
        let mut state = SelectionState::new(&data);
        state.click("d");
        let theme = Theme::clinical();
        let mut view = ViewTransform::default();
        view.zoom_in();

        let svg = render_flowchart_svg(&layout, state.selection(), &view, &theme);
        assert_eq!(svg.matches("url(#arrowhead-flow-active)").count(), 1);
        assert_eq!(svg.matches("flow-node").count(), 3);
        assert!(svg.contains("scale(1.1)"));
        assert!(svg.contains("Yes"));
        assert!(svg.contains("<polygon points=\"180.00,190.00"));
    }

    #[test]
    fn labels_stack_when_they_collide() {
        let theme = Theme::clinical();
        let mut occupied = Vec::new();
        let first = place_label(Vec2::new(100.0, 100.0), "CAUSES", &theme, &mut occupied);
        let second = place_label(Vec2::new(100.0, 100.0), "CAUSES", &theme, &mut occupied);
        assert_eq!(first, Vec2::new(100.0, 100.0));
        assert!(second.y > first.y);
    }
}
