//! IdP Gateway Library
//!
//! Backend-for-frontend exposing a simplified user, role and login API over
//! an OpenID-Connect provider's admin REST interface.
//!
//! # Layers
//!
//! - **auth**: signing key cache, bearer token verification, route middleware
//! - **provider**: one function per admin call, with fixed status translation
//! - **service**: orchestration and field mapping for users, roles and tokens
//! - **api**: axum router, handlers and the error envelope

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod provider;
pub mod server;
pub mod service;

pub use error::{Error, Result};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Setup tracing/logging
pub fn setup_tracing(level: &str, format: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    let result = match format {
        Some("json") => subscriber.with(fmt::layer().json()).try_init(),
        _ => subscriber.with(fmt::layer()).try_init(),
    };

    result.map_err(|e| Error::Config(format!("Failed to initialize tracing: {e}")))
}
