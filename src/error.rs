//! Error types for the IdP gateway
//!
//! Every failure surfaced to a caller is one of the kinds below. Provider
//! responses are fully resolved into these kinds inside [`crate::provider`];
//! no raw provider status or body crosses the service boundary.

use std::io;

use axum::http::StatusCode;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for the IdP gateway
pub type Result<T> = std::result::Result<T, Error>;

/// Value of `error_source` in every error envelope.
pub const ERROR_SOURCE: &str = "OAuthAPI";

/// Prefix of `error_code` in every error envelope (`OA-404`).
pub const ERROR_CODE_PREFIX: &str = "OA";

/// IdP gateway errors
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input detected locally (bad UUID, empty patch)
    #[error("{0}")]
    BadRequest(String),

    /// Request body failed schema validation
    #[error("Validation error")]
    Validation(Vec<FieldError>),

    /// Missing/invalid bearer token or rejected credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Provider denied the caller's token scope
    #[error("{0}")]
    Forbidden(String),

    /// Provider reports the target resource absent
    #[error("{0}")]
    NotFound(String),

    /// Duplicate resource on creation
    #[error("{0}")]
    Conflict(String),

    /// Provider unreachable or returned an unmapped status
    #[error("{0}")]
    BadGateway(String),

    /// Unexpected local fault
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// A single schema validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Location of the offending value, e.g. `["body", "username"]`
    pub loc: Vec<String>,
    /// Human-readable message
    pub msg: String,
    /// Machine-readable error type
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    /// Create a body-field validation error.
    pub fn body(field: &str, kind: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }
}

/// Output error envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    /// `OA-<http status>`
    pub error_code: String,
    /// Human-readable description
    pub error_description: String,
    /// Service name
    pub error_source: String,
    /// Validation details or a diagnostic trace; empty for ordinary errors
    pub error_stack: Vec<serde_json::Value>,
}

impl ErrorBody {
    /// Build an envelope with an empty stack.
    pub fn new(status: StatusCode, description: impl Into<String>) -> Self {
        Self {
            error_code: format!("{ERROR_CODE_PREFIX}-{}", status.as_u16()),
            error_description: description.into(),
            error_source: ERROR_SOURCE.to_string(),
            error_stack: Vec::new(),
        }
    }

    /// Attach stack entries.
    #[must_use]
    pub fn with_stack(mut self, stack: Vec<serde_json::Value>) -> Self {
        self.error_stack = stack;
        self
    }
}

impl Error {
    /// Map to the HTTP status reported to the caller
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) | Self::Config(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Render the output envelope.
    ///
    /// Only `Validation` and the server-side kinds carry stack entries.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        let status = self.status();
        match self {
            Self::Validation(fields) => ErrorBody::new(status, "Validation error").with_stack(
                fields
                    .iter()
                    .filter_map(|f| serde_json::to_value(f).ok())
                    .collect(),
            ),
            Self::Internal(detail) => internal_body(detail),
            Self::Config(_) | Self::Io(_) => internal_body(&self.to_string()),
            other => ErrorBody::new(status, other.to_string()),
        }
    }

    /// Shorthand for the canonical invalid-token error.
    #[must_use]
    pub fn invalid_token() -> Self {
        Self::Unauthorized("Invalid token".to_string())
    }
}

fn internal_body(detail: &str) -> ErrorBody {
    ErrorBody::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").with_stack(vec![
        serde_json::json!({ "trace": detail.lines().collect::<Vec<_>>() }),
    ])
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            tracing::warn!(error = %e, "Undecodable identity provider response");
            Self::BadGateway("Invalid response from identity provider".to_string())
        } else {
            tracing::warn!(error = %e, "Identity provider request failed");
            Self::BadGateway("Failed to reach identity provider".to_string())
        }
    }
}
