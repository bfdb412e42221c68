//! Unified error types for Forge

use thiserror::Error;

/// Unified error type for all Forge operations
#[derive(Error, Debug)]
pub enum ForgeError {
    // Stage output errors
    #[error("Failed to parse model output: {0}")]
    Parse(String),

    // Sandbox errors
    #[error("Path escapes the project root: {0}")]
    PathViolation(String),

    // Per-file tool errors (recovered locally by the coder loop)
    #[error("Tool execution failed: {0}")]
    Tool(String),

    // Model client errors
    #[error("API error: {0}")]
    Api(String),

    #[error("API limit reached: {0}")]
    ApiLimit(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using ForgeError
pub type Result<T> = std::result::Result<T, ForgeError>;
