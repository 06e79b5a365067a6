//! Error types for conversation mapping

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while mapping conversations
#[derive(Error, Debug)]
pub enum ConversationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, ConversationError>;
