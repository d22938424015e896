use thiserror::Error;

/// Failures reading a diagram document or its surrounding arguments. The
/// layout engines themselves never fail; they degrade instead.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid diagram JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("diagram document must be a JSON object with `nodes` and `edges`")]
    NotAnObject,
    #[error("unknown diagram kind `{0}` (expected `graph` or `flowchart`)")]
    UnknownKind(String),
    #[error("viewport must be finite and non-negative, got {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
    #[error("zoom must be a finite number, got {0}")]
    InvalidZoom(f64),
    #[error("node `{0}` is not part of the diagram")]
    UnknownNode(String),
}
