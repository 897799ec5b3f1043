//! Login, refresh and token introspection.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Validate, min_length};
use crate::Result;
use crate::auth::{TokenClaims, TokenVerifier};
use crate::error::FieldError;
use crate::provider::{ProviderClient, TokenResponse};

/// `POST /login` body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    /// Login name
    pub username: String,
    /// Plain-text password, passed straight to the token endpoint
    pub password: String,
}

impl Validate for LoginRequest {
    fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        min_length("username", &self.username, 1, &mut errors);
        min_length("password", &self.password, 1, &mut errors);
        errors
    }
}

/// `POST /refresh` body.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token from an earlier login
    pub refresh_token: String,
}

impl Validate for RefreshRequest {
    fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        min_length("refresh_token", &self.refresh_token, 1, &mut errors);
        errors
    }
}

/// Token pair returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenOut {
    /// Usually `Bearer`
    pub token_type: String,
    /// Access token to present on protected routes
    pub access_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    /// Refresh token for `POST /refresh`
    pub refresh_token: Option<String>,
    /// Refresh token lifetime in seconds
    pub refresh_expires_in: Option<u64>,
}

impl From<TokenResponse> for TokenOut {
    fn from(t: TokenResponse) -> Self {
        Self {
            token_type: t.token_type,
            access_token: t.access_token,
            expires_in: t.expires_in,
            refresh_token: t.refresh_token,
            refresh_expires_in: t.refresh_expires_in,
        }
    }
}

/// Summary of a verified access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Always `true`; inactive tokens fail verification instead
    pub active: bool,
    /// `sub` claim (the user id)
    pub subject: Option<String>,
    /// `preferred_username` claim
    pub username: Option<String>,
    /// `email` claim
    pub email: Option<String>,
    /// `iss` claim
    pub issuer: String,
    /// `azp` claim, the client the token was issued to
    pub client_id: Option<String>,
    /// `exp` claim, seconds since the epoch
    pub expires_at: u64,
    /// Realm-level roles
    pub realm_roles: Vec<String>,
    /// Roles held on the configured client
    pub client_roles: Vec<String>,
}

impl TokenInfo {
    /// Summarize `claims`, listing the roles held on `client_id`.
    #[must_use]
    pub fn from_claims(claims: &TokenClaims, client_id: &str) -> Self {
        Self {
            active: true,
            subject: claims.sub.clone(),
            username: claims.preferred_username.clone(),
            email: claims.email.clone(),
            issuer: claims.iss.clone(),
            client_id: claims.azp.clone(),
            expires_at: claims.exp,
            realm_roles: claims.realm_roles().to_vec(),
            client_roles: claims.client_roles(client_id).to_vec(),
        }
    }
}

/// Token issuance and verification.
#[derive(Debug, Clone)]
pub struct AuthService {
    provider: Arc<ProviderClient>,
    verifier: Arc<TokenVerifier>,
}

impl AuthService {
    /// Service over `provider`, verifying with `verifier`.
    #[must_use]
    pub fn new(provider: Arc<ProviderClient>, verifier: Arc<TokenVerifier>) -> Self {
        Self { provider, verifier }
    }

    /// Exchange username and password for tokens.
    pub async fn login(&self, input: LoginRequest) -> Result<TokenOut> {
        let tokens = self
            .provider
            .exchange_password_grant(&input.username, &input.password)
            .await?;
        info!(username = %input.username, "Login succeeded");
        Ok(tokens.into())
    }

    /// Exchange a refresh token for a new token pair.
    pub async fn refresh(&self, input: RefreshRequest) -> Result<TokenOut> {
        Ok(self
            .provider
            .exchange_refresh_token(&input.refresh_token)
            .await?
            .into())
    }

    /// Verify `token` regardless of the route-level verification setting.
    pub async fn introspect(&self, token: &str) -> Result<TokenInfo> {
        let claims = self.verifier.verify(token).await?;
        Ok(TokenInfo::from_claims(&claims, self.provider.client_id()))
    }
}
