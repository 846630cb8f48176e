use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MazeError {
    // Config-related errors
    #[error("Failed to get config directory")]
    ConfigDirNotFound,

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize config: {0}")]
    SerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize config: {0}")]
    DeserializationFailed(#[from] toml::de::Error),

    #[error("Config file not found at path: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Config validation failed: {reason}")]
    ConfigValidation { reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    // Generation-related errors
    #[error("Generation failed after {attempts} attempt(s): {reason}")]
    GenerationFailure { attempts: u32, reason: String },

    #[error("Internal invariant violated: {reason}")]
    InternalInvariantViolation { reason: String },

    // Search-related errors
    #[error("Cell ({x}, {y}) is not part of the navigation graph")]
    UnknownCell { x: u32, y: u32 },
}

impl MazeError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        MazeError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn invariant(reason: impl Into<String>) -> Self {
        MazeError::InternalInvariantViolation {
            reason: reason.into(),
        }
    }
}

/// Result type alias for all operations
pub type MazeResult<T> = Result<T, MazeError>;
