//! Error types and result aliases for SIMPLE3.
//!
//! This module defines the core error type [`Simple3Error`] and the [`Result`] type alias
//! used throughout the crate. The interactive loop collapses every variant into a printed
//! message, so the variants exist for logging and tests rather than recovery.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Simple3Error {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Tool error: {0}")]
    ToolError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Schema error: {0}")]
    SchemaError(String),

    #[error("Speech synthesis error: {0}")]
    SynthesisError(String),

    #[error("Playback error: {0}")]
    PlaybackError(String),

    #[error("Agent error: {0}")]
    AgentError(String),
}

pub type Result<T> = std::result::Result<T, Simple3Error>;
