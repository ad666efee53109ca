use crate::models::Capability;
use crate::services::upstream::reported_status;
use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx answer from a single upstream capability. Never retried here.
    #[error("Upstream {capability} returned status {status}")]
    Upstream {
        capability: Capability,
        status: u16,
        body: Option<serde_json::Value>,
    },

    /// Merge-time mismatch or an upstream payload that does not fit its schema.
    #[error("Input consistency error: {0}")]
    InputConsistency(String),

    /// Error answer from the aggregation server, as seen by the client.
    #[error("Server returned status {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl AppError {
    /// HTTP status to surface for this error.
    ///
    /// Upstream failures surface as 500 unless the upstream body reports its
    /// own error code (`httpCode`), which is then passed on.
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::Upstream { body, .. } => body
                .as_ref()
                .and_then(reported_status)
                .filter(|code| (400..600).contains(code))
                .unwrap_or(500),
            AppError::InvalidInput(_) => 400,
            _ => 500,
        }
    }

    /// Raw upstream body, when the failure carried one.
    pub fn upstream_body(&self) -> Option<&serde_json::Value> {
        match self {
            AppError::Upstream { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// Alias for convenience
pub type Error = AppError;
