//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ValidationError;

/// Main error type for CostClose
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum CostCloseError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The persisted state moved underneath an operation (stale version or
    /// inputs changed between preview and commit).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Closing was refused by the validation gate. Carries every blocking
    /// condition, never just the first one.
    #[error("{message}")]
    ClosingBlocked { message: String, errors: Vec<ValidationError> },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CostCloseError {
    /// Stable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Auth(_) => "auth",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Conflict(_) => "conflict",
            Self::ClosingBlocked { .. } => "closing_blocked",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for CostClose operations
pub type Result<T> = std::result::Result<T, CostCloseError>;
