use serde::Serialize;

use crate::config::ViewConfig;
use crate::geometry::Vec2;

const ZOOM_PRECISION: f64 = 1e6;

/// Zoom and pan applied by the renderer on top of layout coordinates. The
/// layout engines always compute at zoom 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewTransform {
    pub zoom: f64,
    pub pan: Vec2,
    #[serde(skip)]
    config: ViewConfig,
}

impl ViewTransform {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            config,
        }
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_zoom(self.zoom + self.config.zoom_step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_zoom(self.zoom - self.config.zoom_step)
    }

    /// Clamps into `[min_zoom, max_zoom]`. Values are snapped to a millionth
    /// so repeated steps land exactly on the bounds. Non-finite values leave
    /// the zoom unchanged.
    pub fn set_zoom(&mut self, zoom: f64) -> f64 {
        if !zoom.is_finite() {
            return self.zoom;
        }
        let snapped = (zoom * ZOOM_PRECISION).round() / ZOOM_PRECISION;
        self.zoom = snapped.max(self.config.min_zoom).min(self.config.max_zoom);
        self.zoom
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    /// Maps a point in layout space to the screen.
    pub fn to_screen(&self, point: Vec2) -> Vec2 {
        point * self.zoom + self.pan
    }

    /// Maps a screen point (pointer position) back into layout space.
    pub fn to_layout(&self, point: Vec2) -> Vec2 {
        (point - self.pan) / self.zoom
    }

    /// Size of a `width` by `height` canvas once scaled.
    pub fn scaled_size(&self, width: f64, height: f64) -> (f64, f64) {
        (width * self.zoom, height * self.zoom)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}
