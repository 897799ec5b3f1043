//! Provider Gateway: one function per admin operation against the identity
//! provider's REST surface.
//!
//! Every call resolves the provider's answer into [`crate::Error`] through
//! its [`Operation`] before returning. UUID-shaped path parameters are
//! checked with [`validate_uuid`] before any request is built, so malformed
//! identifiers never reach the network.

pub mod cache;
pub mod operation;
pub mod roles;
pub mod token;
pub mod types;
pub mod users;

use std::sync::Arc;

use reqwest::{RequestBuilder, Response, header::LOCATION};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ProviderConfig;
use crate::{Error, Result};

pub use cache::ClientUuidCache;
pub use operation::Operation;
pub use types::{
    ClientRepresentation, CredentialRepresentation, RoleRepresentation, TokenResponse,
    UserRepresentation,
};

/// HTTP client for the provider's token and admin endpoints.
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    token_url: String,
    admin_url: String,
    realm_url: String,
    client_id: String,
    client_secret: String,
    grant_type: String,
    client_uuids: Arc<ClientUuidCache>,
}

impl ProviderClient {
    /// Create a client over a shared HTTP pool and an injected UUID cache.
    #[must_use]
    pub fn new(
        config: &ProviderConfig,
        http: reqwest::Client,
        client_uuids: Arc<ClientUuidCache>,
    ) -> Self {
        Self {
            http,
            token_url: config.token_url(),
            admin_url: config.admin_url(),
            realm_url: config.realm_url(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            grant_type: config.grant_type.clone(),
            client_uuids,
        }
    }

    /// Build the shared outbound HTTP client.
    pub fn http_client(config: &ProviderConfig) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("idp-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))
    }

    /// Configured OIDC client identifier
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client UUID cache shared with other components
    #[must_use]
    pub fn client_uuids(&self) -> &Arc<ClientUuidCache> {
        &self.client_uuids
    }

    fn admin(&self, path: &str) -> String {
        format!("{}{path}", self.admin_url)
    }

    /// Issue the request and require the operation's success status.
    async fn send(&self, op: Operation, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.inspect_err(|e| {
            warn!(operation = %op, error = %e, "Identity provider unreachable");
        })?;

        let status = response.status();
        debug!(operation = %op, status = status.as_u16(), "Identity provider responded");

        if status == op.success() {
            return Ok(response);
        }

        let err = op.translate(status);
        if matches!(err, Error::BadGateway(_)) {
            warn!(operation = %op, status = status.as_u16(), "Unmapped identity provider status");
        }
        Err(err)
    }

    /// Probe the realm endpoint; `true` when it answers 200.
    pub async fn health(&self) -> bool {
        match self.http.get(&self.realm_url).send().await {
            Ok(response) => response.status() == reqwest::StatusCode::OK,
            Err(e) => {
                warn!(error = %e, "Identity provider health probe failed");
                false
            }
        }
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("admin_url", &self.admin_url)
            .field("client_id", &self.client_id)
            .field("cached_clients", &self.client_uuids.len())
            .finish_non_exhaustive()
    }
}

/// Require a hyphenated UUID.
///
/// # Errors
///
/// Returns [`Error::BadRequest`] naming `what` for anything else.
pub fn validate_uuid(value: &str, what: &str) -> Result<()> {
    if value.len() == 36 && Uuid::try_parse(value).is_ok() {
        Ok(())
    } else {
        Err(Error::BadRequest(format!("Invalid {what} id: expected a UUID")))
    }
}

/// Whether `value` is a hyphenated UUID.
#[must_use]
pub fn is_uuid(value: &str) -> bool {
    validate_uuid(value, "").is_ok()
}

/// Trailing path segment of the `Location` header of a `201 Created`.
fn location_id(response: &Response) -> Result<String> {
    location_segments(response).map(|(_, id)| id)
}

/// Last two path segments (`.../{parent}/{id}`) of the `Location` header of
/// a `201 Created`. `parent` is empty when the path has a single segment.
fn location_segments(response: &Response) -> Result<(String, String)> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .and_then(split_location)
        .ok_or_else(|| {
            warn!("Created response without a usable Location header");
            Error::BadGateway("Identity provider did not return the new resource location".to_string())
        })
}

fn split_location(location: &str) -> Option<(String, String)> {
    let mut segments = location.trim_end_matches('/').rsplit('/');
    let id = segments.next().filter(|segment| !segment.is_empty())?;
    let parent = segments.next().unwrap_or_default();
    Some((parent.to_string(), id.to_string()))
}
