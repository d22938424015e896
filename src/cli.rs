use crate::config::{Config, FlowchartConfig, load_config};
use crate::error::InputError;
use crate::ir::{Diagram, DiagramKind, FlowchartData, parse_diagram};
use crate::layout::{
    FlowchartLayout, SelectionState, ViewTransform, Viewport, compute_flowchart_layout,
    settle_knowledge_graph,
};
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::render::{render_flowchart_svg, render_graph_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "medgraph",
    version,
    about = "Lay out medical knowledge graphs and diagnostic flowcharts"
)]
pub struct Args {
    /// Input JSON file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Diagram kind (`graph` or `flowchart`); detected from the nodes if omitted
    #[arg(short = 'k', long = "kind")]
    pub kind: Option<String>,

    /// Config JSON file
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Viewport width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Viewport height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Seed for the initial node placement
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Flowchart node whose ancestry is highlighted
    #[arg(long = "trace")]
    pub trace: Option<String>,

    /// Flowchart zoom level
    #[arg(long = "zoom")]
    pub zoom: Option<f64>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }
    if let Some(seed) = args.seed {
        config.layout.simulation.seed = seed;
    }
    let viewport = checked_viewport(&config)?;
    let zoom = checked_zoom(args.zoom)?;

    let kind = args
        .kind
        .as_deref()
        .map(|token| DiagramKind::from_token(token).ok_or_else(|| InputError::UnknownKind(token.to_string())))
        .transpose()?;
    let input = read_input(args.input.as_deref())?;
    let diagram = parse_diagram(&input, kind)?;
    tracing::info!(kind = ?diagram.kind(), width = viewport.width, height = viewport.height, "laying out");

    let (svg, dump) = match &diagram {
        Diagram::KnowledgeGraph(data) => {
            if args.trace.is_some() || zoom.is_some() {
                tracing::warn!("--trace and --zoom only apply to flowcharts");
            }
            let layout = settle_knowledge_graph(data, viewport, &config.layout.simulation);
            (
                render_graph_svg(&layout, &config.theme),
                LayoutDump::from_graph(&layout),
            )
        }
        Diagram::Flowchart(data) => {
            let layout = layout_flowchart(data, viewport, &config.layout.flowchart);
            let mut selection = SelectionState::new(data);
            if let Some(id) = args.trace.as_deref() {
                if !data.nodes.iter().any(|node| node.id == id) {
                    return Err(InputError::UnknownNode(id.to_string()).into());
                }
                let traced = selection.click(id);
                tracing::debug!(nodes = traced.nodes.len(), edges = traced.edges.len(), "traced ancestry");
            }
            let mut view = ViewTransform::new(config.layout.view.clone());
            if let Some(zoom) = zoom {
                view.set_zoom(zoom);
            }
            (
                render_flowchart_svg(&layout, selection.selection(), &view, &config.theme),
                LayoutDump::from_flowchart(&layout),
            )
        }
    };

    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Json => write_layout_dump(args.output.as_deref(), &dump)?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &config)?;
        }
    }
    Ok(())
}

fn checked_viewport(config: &Config) -> Result<Viewport, InputError> {
    let (width, height) = (config.render.width, config.render.height);
    if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
        return Err(InputError::InvalidViewport { width, height });
    }
    Ok(Viewport::new(width, height))
}

fn checked_zoom(zoom: Option<f64>) -> Result<Option<f64>, InputError> {
    match zoom {
        Some(value) if !value.is_finite() => Err(InputError::InvalidZoom(value)),
        other => Ok(other),
    }
}

/// Zero-width viewports get an empty canvas; no leveling runs.
fn layout_flowchart(
    data: &FlowchartData,
    viewport: Viewport,
    config: &FlowchartConfig,
) -> FlowchartLayout {
    if viewport.width <= 0.0 {
        tracing::debug!(height = viewport.height, "zero-width viewport; skipping flowchart layout");
        return FlowchartLayout::default();
    }
    compute_flowchart_layout(data, viewport, config)
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, config.render.width, config.render.height)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}
