use thiserror::Error;

/// Configuration rejected by [`EngineConfig::validate`](super::config::EngineConfig::validate).
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field}: minimum {min} exceeds maximum {max}")]
    InvertedRange {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{0} must be greater than zero")]
    ZeroCapacity(&'static str),
    #[error("color palette is empty")]
    EmptyPalette,
    #[error("lifespan minimum {0}s is shorter than the fade-in plus fade-out window")]
    LifespanTooShort(f32),
    #[error("{0} must be finite")]
    NonFinite(&'static str),
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
}

/// A viewport that cannot host sample points.
#[derive(Debug, Error, PartialEq)]
pub enum ViewportError {
    #[error("viewport {width}x{height} is degenerate")]
    Degenerate { width: f32, height: f32 },
    #[error("flow curve {0} produced non-finite samples")]
    NonFinite(usize),
}

/// Failure raised by an externally supplied phase callback.
#[derive(Debug, Error, PartialEq)]
pub enum CallbackError {
    #[error("{phase} callback failed: {message}")]
    Failed {
        phase: &'static str,
        message: String,
    },
    #[error("{0} callback panicked")]
    Panicked(&'static str),
}

#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Viewport(#[from] ViewportError),
    #[error("engine is not running")]
    NotRunning,
}
