//! Bearer authentication middleware for protected routes
//!
//! Extracts `Authorization: Bearer <token>`, verifies it (unless local
//! verification is disabled) and injects an [`Authenticated`] extension for
//! downstream handlers. The raw token is always kept: it is forwarded to the
//! provider's admin API on every call.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::claims::TokenClaims;
use super::verifier::TokenVerifier;
use crate::{Error, Result};

/// Raw access token taken from an `Authorization` header.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap an already-extracted token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Parse an `Authorization` header value. The scheme is matched
    /// case-insensitively; an empty token is rejected.
    pub fn from_header(value: &str) -> Result<Self> {
        let (scheme, token) = value
            .trim()
            .split_once(' ')
            .ok_or_else(|| Error::Unauthorized("Malformed Authorization header".to_string()))?;

        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(Error::Unauthorized(
                "Authorization scheme must be Bearer".to_string(),
            ));
        }

        let token = token.trim();
        if token.is_empty() {
            return Err(Error::Unauthorized("Empty bearer token".to_string()));
        }

        Ok(Self(token.to_string()))
    }

    /// The token string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Identity attached to a request that passed [`require_bearer`].
#[derive(Debug, Clone)]
pub struct Authenticated {
    /// Token to forward to the provider
    pub token: BearerToken,
    /// Verified claims; `None` when local verification is disabled
    pub claims: Option<TokenClaims>,
}

/// Middleware state.
#[derive(Debug)]
pub struct BearerAuth {
    verifier: Arc<TokenVerifier>,
    verify_tokens: bool,
}

impl BearerAuth {
    /// Create the middleware state
    #[must_use]
    pub fn new(verifier: Arc<TokenVerifier>, verify_tokens: bool) -> Self {
        Self {
            verifier,
            verify_tokens,
        }
    }

    /// Resolve an `Authorization` header into an [`Authenticated`] identity.
    pub async fn authenticate(&self, header: Option<&str>) -> Result<Authenticated> {
        let Some(value) = header else {
            return Err(Error::Unauthorized(
                "Missing Authorization header. Use: Authorization: Bearer <token>".to_string(),
            ));
        };
        let token = BearerToken::from_header(value)?;

        let claims = if self.verify_tokens {
            Some(self.verifier.verify(token.as_str()).await?)
        } else {
            None
        };

        Ok(Authenticated { token, claims })
    }
}

/// Authentication middleware
pub async fn require_bearer(
    State(auth): State<Arc<BearerAuth>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match auth.authenticate(header.as_deref()).await {
        Ok(identity) => {
            debug!(
                path = %request.uri().path(),
                sub = ?identity.claims.as_ref().and_then(|c| c.sub.as_deref()),
                "Authenticated request"
            );
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            warn!(path = %request.uri().path(), error = %e, "Rejected request");
            e.into_response()
        }
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<Authenticated>()
            .cloned()
            .ok_or_else(|| Error::Unauthorized("Not authenticated".to_string()))
    }
}
