//! Error types shared across composer crates.

use std::fmt::Display;

/// Top-level error type for composer operations.
#[derive(Debug, thiserror::Error)]
pub enum ComposerError {
    #[error("Unknown entity: {id}")]
    UnknownEntity { id: String },

    #[error("Invalid position mode: {mode:?} (expected \"contain\", \"cover\" or \"fixed\")")]
    InvalidPositionMode { mode: String },

    #[error("Invalid dimension: {value:?}")]
    InvalidDimension { value: String },

    #[error("Invalid mask: {mask:?} (expected \"none\" or \"circle\")")]
    InvalidMask { mask: String },

    #[error("Invalid interaction mode: {mode:?} (expected \"move-resize\" or \"draw\")")]
    InvalidInteractionMode { mode: String },

    #[error("Geometry not ready for {id}: native resolution unavailable")]
    GeometryNotReady { id: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using ComposerError.
pub type ComposerResult<T> = Result<T, ComposerError>;

impl ComposerError {
    pub fn unknown_entity(id: impl Display) -> Self {
        Self::UnknownEntity { id: id.to_string() }
    }

    pub fn invalid_position_mode(mode: impl Into<String>) -> Self {
        Self::InvalidPositionMode { mode: mode.into() }
    }

    pub fn invalid_dimension(value: impl Into<String>) -> Self {
        Self::InvalidDimension {
            value: value.into(),
        }
    }

    pub fn invalid_mask(mask: impl Into<String>) -> Self {
        Self::InvalidMask { mask: mask.into() }
    }

    pub fn invalid_interaction_mode(mode: impl Into<String>) -> Self {
        Self::InvalidInteractionMode { mode: mode.into() }
    }

    pub fn geometry_not_ready(id: impl Display) -> Self {
        Self::GeometryNotReady { id: id.to_string() }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    /// Whether this error only means "try again once the source has loaded".
    pub fn is_geometry_not_ready(&self) -> bool {
        matches!(self, Self::GeometryNotReady { .. })
    }
}
