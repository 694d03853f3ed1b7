//! Error types for the fleet provider client

/// Fleet client error type
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Provider API error: {status} at {endpoint}")]
    ApiError { status: u16, endpoint: String },

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for fleet operations
pub type Result<T> = std::result::Result<T, FleetError>;
