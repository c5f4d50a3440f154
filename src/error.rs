//! Error types for the thermostat case-study model

use thiserror::Error;

use crate::flow::ModeId;
use crate::noise::DistributionId;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while declaring, assembling or exercising the model
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unsupported case-study version: {0}")]
    UnsupportedVersion(u32),

    #[error("Duplicate mode id: {0}")]
    DuplicateMode(ModeId),

    #[error("Duplicate distribution id: {0}")]
    DuplicateDistribution(DistributionId),

    #[error("Duplicate event symbol: {0}")]
    DuplicateSymbol(String),

    #[error("Unknown mode id: {0}")]
    UnknownMode(ModeId),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Model construction error: {0}")]
    ModelConstruction(String),

    #[error("Stale assignment for mode {mode}: expected revision {expected}, found {found}")]
    StaleAssignment {
        mode: ModeId,
        expected: u64,
        found: u64,
    },

    #[error("External collaborator error: {0}")]
    Collaborator(#[from] anyhow::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Configuration(e.to_string())
    }
}
