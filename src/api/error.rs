//! Error envelope rendering at the HTTP boundary.

use std::any::Any;

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use crate::Error;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Internal(_) | Self::Config(_) | Self::Io(_) => {
                error!(status = status.as_u16(), error = %self, "Request failed");
            }
            Self::BadGateway(_) => warn!(status = status.as_u16(), error = %self, "Request failed"),
            _ => debug!(status = status.as_u16(), error = %self, "Request rejected"),
        }
        (status, Json(self.to_body())).into_response()
    }
}

/// Render a handler panic as an internal error envelope.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "Unknown panic".to_string()
    };
    Error::Internal(detail).into_response()
}

/// Fallback for unknown routes.
pub async fn not_found() -> Error {
    Error::NotFound("Not found".to_string())
}
