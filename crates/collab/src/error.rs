//! Errors raised while training, persisting and scoring the CF model.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CfError {
    /// Nothing usable to train on
    #[error("insufficient training data: {0}")]
    InsufficientData(String),

    /// Hyperparameters that cannot produce a sensible model
    #[error("invalid training config: {0}")]
    InvalidConfig(String),

    /// Artifact missing, unreadable or structurally corrupt
    #[error("model artifact unavailable at {path}: {reason}")]
    ModelUnavailable { path: String, reason: String },

    /// Artifact written by a different format or version
    #[error("incompatible model artifact: expected {expected}, found {found}")]
    IncompatibleModelVersion { expected: String, found: String },

    /// User absent from the trained id universe
    #[error("user {0} is not part of the trained model")]
    UnknownUser(String),

    #[error("failed to build training thread pool: {0}")]
    ThreadPool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CfError>;
