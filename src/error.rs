//! Error types for the narrator engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NarratorError {
    #[error("Invalid setup: {0}")]
    InvalidSetup(String),

    #[error("Invalid setup file format: {0}")]
    InvalidSetupFormat(String),

    #[error("Player not found: {0}")]
    PlayerNotFound(u32),

    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Invalid game action: {0}")]
    InvalidAction(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type Result<T> = std::result::Result<T, NarratorError>;
