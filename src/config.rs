use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub repulsion: f64,
    pub force_scale: f64,
    pub damping: f64,
    pub center_strength: f64,
    pub ideal_distance_factor: f64,
    pub padding: f64,
    pub boundary_stiffness: f64,
    pub min_distance_sq: f64,
    pub spawn_jitter: f64,
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            repulsion: 1200.0,
            force_scale: 0.05,
            damping: 0.85,
            center_strength: 0.04,
            ideal_distance_factor: 0.9,
            padding: 50.0,
            boundary_stiffness: 0.1,
            min_distance_sq: 0.1,
            spawn_jitter: 50.0,
            max_iterations: 600,
            seed: 0x6d65_6467,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowchartConfig {
    pub level_height: f64,
    pub node_spacing: f64,
    pub top_margin: f64,
    pub horizontal_margin: f64,
    pub vertical_margin: f64,
    pub fallback_viewport_height: f64,
}

impl Default for FlowchartConfig {
    fn default() -> Self {
        Self {
            level_height: 160.0,
            node_spacing: 160.0,
            top_margin: 80.0,
            horizontal_margin: 100.0,
            vertical_margin: 200.0,
            fallback_viewport_height: 600.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub zoom_step: f64,
}

impl ViewConfig {
    /// Rejects zoom bounds that are not finite and positive, inverted, or
    /// paired with a non-positive step.
    pub fn validate(&self) -> anyhow::Result<()> {
        let finite = [self.min_zoom, self.max_zoom, self.zoom_step]
            .iter()
            .all(|value| value.is_finite());
        if !finite || self.min_zoom <= 0.0 || self.min_zoom > self.max_zoom {
            anyhow::bail!(
                "invalid view zoom bounds: minZoom {} maxZoom {}",
                self.min_zoom,
                self.max_zoom
            );
        }
        if self.zoom_step <= 0.0 {
            anyhow::bail!("invalid view zoomStep {}", self.zoom_step);
        }
        Ok(())
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.5,
            max_zoom: 2.0,
            zoom_step: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub simulation: SimulationConfig,
    pub flowchart: FlowchartConfig,
    pub view: ViewConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f64,
    pub height: f64,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 390.0,
            height: 640.0,
            background: "#F8FAFC".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::clinical();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    simulation: Option<SimulationConfig>,
    flowchart: Option<FlowchartConfig>,
    view: Option<ViewConfig>,
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f64>,
    background: Option<String>,
    line_color: Option<String>,
    highlight_color: Option<String>,
    text_color: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;
    apply_config_file(&mut config, parsed);
    config.layout.view.validate()?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn apply_config_file(config: &mut Config, parsed: ConfigFile) {
    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "dark" {
            config.theme = Theme::dark();
        } else if theme_name == "clinical" || theme_name == "default" {
            config.theme = Theme::clinical();
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.highlight_color {
            config.theme.highlight_color = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
    }

    if let Some(simulation) = parsed.simulation {
        config.layout.simulation = simulation;
    }
    if let Some(flowchart) = parsed.flowchart {
        config.layout.flowchart = flowchart;
    }
    if let Some(view) = parsed.view {
        config.layout.view = view;
    }
    if let Some(width) = parsed.width {
        config.render.width = width;
    }
    if let Some(height) = parsed.height {
        config.render.height = height;
    }
}
