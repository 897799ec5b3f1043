//! Liveness and provider reachability.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use super::AppState;

/// Status of one dependency
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// `UP` or `DOWN`
    pub status: &'static str,
}

/// Per-dependency statuses
#[derive(Debug, Serialize)]
pub struct HealthComponents {
    /// Identity provider realm endpoint
    pub provider: ComponentHealth,
}

/// `GET /health` response
#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// Gateway status, `UP` whenever it answers
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
    /// Dependency statuses
    pub components: HealthComponents,
}

/// Health check handler
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let provider = if state.provider.health().await { "UP" } else { "DOWN" };
    Json(HealthReport {
        status: "UP",
        version: env!("CARGO_PKG_VERSION"),
        components: HealthComponents {
            provider: ComponentHealth { status: provider },
        },
    })
}
