//! Error types shared across camrig crates.

use std::path::PathBuf;

/// Top-level error type for camrig operations.
#[derive(Debug, thiserror::Error)]
pub enum CamRigError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Scenario error: {message}")]
    Scenario { message: String },

    #[error("Simulation error: {message}")]
    Simulation { message: String },

    #[error("Unknown scene node: {name}")]
    UnknownNode { name: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CamRigError.
pub type RigResult<T> = Result<T, CamRigError>;

impl CamRigError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn scenario(msg: impl Into<String>) -> Self {
        Self::Scenario {
            message: msg.into(),
        }
    }

    pub fn simulation(msg: impl Into<String>) -> Self {
        Self::Simulation {
            message: msg.into(),
        }
    }

    pub fn unknown_node(name: impl Into<String>) -> Self {
        Self::UnknownNode { name: name.into() }
    }
}
