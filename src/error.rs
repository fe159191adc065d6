//! # Error Types
//!
//! This module defines error types used throughout the tapecraft library.
//!
//! None of these are fatal: the builder reports them as notifications and
//! stays usable after any failure.

use thiserror::Error;

/// Main error type for tapecraft operations
#[derive(Debug, Error)]
pub enum TapecraftError {
    /// Missing or empty required input (e.g. an empty save name).
    /// Recovered by reprompting the user.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Malformed template document on import.
    #[error("Format error: {0}")]
    Format(String),

    /// Network failure, timeout or non-success HTTP status from the print service.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Preview or print attempted with no elements on the canvas.
    #[error("Template is empty: add at least one element first")]
    EmptyTemplate,

    /// Offline PNG rendering failed.
    #[error(transparent)]
    Raster(#[from] crate::render::raster::RasterError),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TapecraftError {
    /// Short machine-readable category, used in notifications and API errors.
    pub fn kind(&self) -> &'static str {
        match self {
            TapecraftError::Validation(_) => "validation",
            TapecraftError::Format(_) => "format",
            TapecraftError::Transport(_) => "transport",
            TapecraftError::EmptyTemplate => "empty_template",
            TapecraftError::Raster(_) => "raster",
            TapecraftError::Io(_) => "io",
            TapecraftError::Json(_) => "json",
        }
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, TapecraftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(TapecraftError::EmptyTemplate.kind(), "empty_template");
        assert_eq!(TapecraftError::Format("x".into()).kind(), "format");
    }

    #[test]
    fn test_display() {
        let err = TapecraftError::Validation("name must not be empty".into());
        assert_eq!(err.to_string(), "Validation error: name must not be empty");
    }
}
