pub mod checklist;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod knowledge;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, load_config};
pub use error::InputError;
pub use ir::{Diagram, DiagramKind, FlowchartData, KnowledgeGraphData, parse_diagram};
pub use layout::{
    FlowchartView, ForceSimulation, SimulationDriver, Viewport, compute_flowchart_layout,
    settle_knowledge_graph,
};
