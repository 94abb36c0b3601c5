//! Error types for pixelbeat.
//!
//! Building a particle field, loading a pixel source and reading a
//! configuration preset can fail. Ticking never does.

use std::fmt;

/// Errors returned by [`crate::sampler::build`] for inputs that violate its contract.
///
/// A missing or zero-sized image is not an error: it yields an empty field.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildError {
    /// Dot size must be at least one pixel.
    InvalidDotSize(u32),
    /// Canvas dimensions must be finite and non-negative.
    InvalidCanvas { width: f32, height: f32 },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InvalidDotSize(size) => {
                write!(f, "Invalid dot size {}: must be a positive number of pixels", size)
            }
            BuildError::InvalidCanvas { width, height } => {
                write!(f, "Invalid canvas size {}x{}", width, height)
            }
        }
    }
}

impl std::error::Error for BuildError {}

/// Errors that can occur while loading a pixel source.
#[derive(Debug)]
pub enum SourceError {
    /// Failed to decode image file.
    ImageLoad(image::ImageError),
    /// Failed to read file from disk.
    Io(std::io::Error),
    /// Raw buffer length does not match `width * height * stride`.
    SizeMismatch { expected: usize, actual: usize },
    /// Only RGB (3) and RGBA (4) strides are supported.
    UnsupportedStride(usize),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::ImageLoad(e) => write!(f, "Failed to load image: {}", e),
            SourceError::Io(e) => write!(f, "Failed to read image file: {}", e),
            SourceError::SizeMismatch { expected, actual } => write!(
                f,
                "Pixel buffer size mismatch: expected {} bytes, got {}",
                expected, actual
            ),
            SourceError::UnsupportedStride(stride) => {
                write!(f, "Unsupported channel stride {} (expected 3 or 4)", stride)
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SourceError::ImageLoad(e) => Some(e),
            SourceError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<image::ImageError> for SourceError {
    fn from(e: image::ImageError) -> Self {
        SourceError::ImageLoad(e)
    }
}

impl From<std::io::Error> for SourceError {
    fn from(e: std::io::Error) -> Self {
        SourceError::Io(e)
    }
}

/// Errors that can occur when loading, saving or validating a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the preset file.
    Io(std::io::Error),
    /// Preset is not valid JSON for [`crate::SimulationConfig`].
    Json(serde_json::Error),
    /// A value is outside its accepted range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Json(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
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
