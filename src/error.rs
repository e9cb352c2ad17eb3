//! Error types for terrain construction, height sampling, configuration and
//! movement resolution.
//!
//! Invariant violations ([`TerrainError`], [`ConfigError::Invalid`]) are
//! programming errors and abort construction. [`SamplerError`] is always
//! recovered by falling back to procedural generation, and [`ResolveError`]
//! by applying unobstructed movement.

use std::fmt;

/// Invariant violations detected while building terrain data.
#[derive(Debug, Clone, PartialEq)]
pub enum TerrainError {
    /// The grid edge must carry at least two samples.
    GridTooSmall { size: usize },
    /// A sample buffer does not match the grid topology.
    SampleCountMismatch { expected: usize, actual: usize },
    /// A sample is NaN or infinite.
    NonFiniteSample { index: usize },
    /// World size must be finite and strictly positive.
    InvalidWorldSize(f32),
    /// Height scale must be finite and non-negative.
    InvalidHeightScale(f32),
}

impl fmt::Display for TerrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerrainError::GridTooSmall { size } => {
                write!(f, "height grid must be at least 2x2 (got {size}x{size})")
            }
            TerrainError::SampleCountMismatch { expected, actual } => {
                write!(f, "expected {expected} height samples, got {actual}")
            }
            TerrainError::NonFiniteSample { index } => {
                write!(f, "height sample {index} is not finite")
            }
            TerrainError::InvalidWorldSize(v) => {
                write!(f, "world size must be positive (got {v})")
            }
            TerrainError::InvalidHeightScale(v) => {
                write!(f, "height scale must be non-negative (got {v})")
            }
        }
    }
}

impl std::error::Error for TerrainError {}

/// Failure to derive heights from an external image.
#[derive(Debug)]
pub enum SamplerError {
    /// Decoding or reading the image failed.
    Image(image::ImageError),
    /// The decoded pixels could not form a valid grid.
    Grid(TerrainError),
}

impl fmt::Display for SamplerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplerError::Image(e) => write!(f, "heightmap image error: {e}"),
            SamplerError::Grid(e) => write!(f, "heightmap image grid error: {e}"),
        }
    }
}

impl std::error::Error for SamplerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SamplerError::Image(e) => Some(e),
            SamplerError::Grid(e) => Some(e),
        }
    }
}

impl From<TerrainError> for SamplerError {
    fn from(e: TerrainError) -> Self {
        SamplerError::Grid(e)
    }
}

impl From<image::ImageError> for SamplerError {
    fn from(e: image::ImageError) -> Self {
        SamplerError::Image(e)
    }
}

/// Errors raised while loading or validating a [`WalkerConfig`](crate::WalkerConfig).
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// A value parsed correctly but violates a terrain or movement invariant.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Json(e) => write!(f, "JSON error: {e}"),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Reasons a movement resolver could not correct a request.
///
/// Never fatal: the integrator applies the unobstructed displacement instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolveError {
    /// The requested target lies outside the collidable surface.
    OutOfBounds { x: f32, z: f32 },
    /// Position or displacement contained NaN or infinity.
    NonFinite,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::OutOfBounds { x, z } => {
                write!(f, "movement target ({x:.2}, {z:.2}) is outside the terrain")
            }
            ResolveError::NonFinite => write!(f, "movement request is not finite"),
        }
    }
}

impl std::error::Error for ResolveError {}
