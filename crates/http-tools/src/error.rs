//! Error types for `petstore-http-tools`.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Status reported when the remote service could not be reached at all.
pub const UNREACHABLE_STATUS: u16 = 500;

/// Status reported for caller mistakes (unknown operation, invalid arguments).
pub const BAD_REQUEST_STATUS: u16 = 400;

#[derive(Debug, Error)]
pub enum HttpToolsError {
    /// Catalog or client configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// The operation name is not in the catalog.
    #[error("Unknown tool: {0}")]
    UnknownOperation(String),

    /// Arguments did not match the declared input shape. Raised before any network I/O.
    #[error("Invalid arguments for {operation}: {}", violations.join("; "))]
    Validation {
        operation: String,
        violations: Vec<String>,
    },

    /// The remote call failed or returned a non-success status.
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
        details: Option<Value>,
    },
}

pub type Result<T> = std::result::Result<T, HttpToolsError>;

impl From<reqwest::Error> for HttpToolsError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport {
            status: value.status().map(|s| s.as_u16()),
            message: crate::safety::sanitize_reqwest_error(&value),
            details: None,
        }
    }
}

/// Failure record handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub status: u16,
    #[serde(rename = "error")]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl HttpToolsError {
    /// Normalize into a `{status, error, details}` record.
    #[must_use]
    pub fn to_failure(&self) -> Failure {
        match self {
            Self::Transport {
                status,
                message,
                details,
            } => Failure {
                status: status.unwrap_or(UNREACHABLE_STATUS),
                message: message.clone(),
                details: details.clone(),
            },
            Self::Validation { violations, .. } => Failure {
                status: BAD_REQUEST_STATUS,
                message: self.to_string(),
                details: Some(serde_json::json!({ "violations": violations })),
            },
            Self::UnknownOperation(_) => Failure {
                status: BAD_REQUEST_STATUS,
                message: self.to_string(),
                details: None,
            },
            Self::Config(_) => Failure {
                status: UNREACHABLE_STATUS,
                message: self.to_string(),
                details: None,
            },
        }
    }

    #[must_use]
    pub fn is_unknown_operation(&self) -> bool {
        matches!(self, Self::UnknownOperation(_))
    }
}
