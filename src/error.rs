//! Error types for devstack-init

use thiserror::Error;

/// Main error type for provisioning operations
#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Command execution failed: {0}")]
    Command(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Step '{step}' failed: {message}")]
    Step { step: String, message: String },
}

impl ProvisionError {
    /// Create a step error
    pub fn step(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Step {
            step: step.into(),
            message: message.into(),
        }
    }

    /// Create a command error
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command(message.into())
    }
}
