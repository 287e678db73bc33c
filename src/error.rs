use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the Stratum engine
#[derive(Error, Debug)]
pub enum StratumError {
    // Selection errors
    #[error("No proxy pool configured for any tier allowed by plan {plan}")]
    NoProxyConfigured { plan: String },

    #[error("All proxies exhausted across allowed tiers for domain {domain}")]
    ProxyExhausted { domain: String },

    // Registry errors
    #[error("Pool not found: {id}")]
    PoolNotFound { id: String },

    #[error("Pool already exists: {id}")]
    PoolAlreadyExists { id: String },

    #[error("Invalid pool configuration: {0}")]
    InvalidPoolConfig(String),

    #[error("Proxy not found: {id}")]
    ProxyNotFound { id: String },

    // Risk classifier errors (recovered locally by the selector)
    #[error("Risk classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Stratum operations
pub type Result<T> = std::result::Result<T, StratumError>;

impl StratumError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            StratumError::InvalidRequest(_)
            | StratumError::InvalidPoolConfig(_)
            | StratumError::InvalidConfig(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            StratumError::PoolNotFound { .. } | StratumError::ProxyNotFound { .. } => {
                StatusCode::NOT_FOUND
            }

            // 409 Conflict
            StratumError::PoolAlreadyExists { .. } => StatusCode::CONFLICT,

            // 502 Bad Gateway
            StratumError::ProxyExhausted { .. } | StratumError::ClassifierUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }

            // 503 Service Unavailable
            StratumError::NoProxyConfigured { .. } => StatusCode::SERVICE_UNAVAILABLE,

            // 500 Internal Server Error
            StratumError::Io(_) | StratumError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

// Implement IntoResponse for API error responses
impl IntoResponse for StratumError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.to_string(),
        });

        (status, Json(body)).into_response()
    }
}
