//! Errors raised at the edges of the renderer: scene loading and render settings.
//! Tracing itself cannot fail.

use thiserror::Error;

/// Errors that can occur while building or loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed scene description: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Plane #{index} has a zero-length normal")]
    DegenerateNormal { index: usize },

    #[error("Sphere #{index} has a non-positive radius ({radius})")]
    InvalidRadius { index: usize, radius: f64 },
}

/// Errors in a [`RenderConfig`](crate::render::RenderConfig).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Image must be at least 1x1, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("View direction must not be a zero vector")]
    ZeroViewDirection,
}
