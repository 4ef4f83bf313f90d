//! Error types for callwarden.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CallwardenError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio source errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    #[error("Audio file not found at {path}")]
    AudioFileNotFound { path: String },

    // Speech recognition errors
    #[error("Recognition model not found at {path}")]
    ModelNotFound { path: String },

    #[error("Failed to load recognition model: {message}")]
    ModelLoadFailed { message: String },

    #[error("Recognition failed: {message}")]
    Recognition { message: String },

    // Semantic analysis errors
    #[error("Embedding backend failed: {message}")]
    Embedding { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, CallwardenError>;
