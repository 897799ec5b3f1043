//! Typed claim set of a verified access token.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Role list nested under `realm_access` or a `resource_access` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleClaims {
    /// Role names
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Verified payload of a bearer token.
///
/// Nested role structures are optional fields; a token without them simply
/// has no roles rather than failing to decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer
    pub iss: String,
    /// Subject (provider user id)
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiry (Unix timestamp)
    pub exp: u64,
    /// Issued-at (Unix timestamp)
    #[serde(default)]
    pub iat: Option<u64>,
    /// Authorized party (client the token was issued to)
    #[serde(default)]
    pub azp: Option<String>,
    /// Login name
    #[serde(default)]
    pub preferred_username: Option<String>,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
    /// Space-separated scopes
    #[serde(default)]
    pub scope: Option<String>,
    /// Realm-wide roles
    #[serde(default)]
    pub realm_access: Option<RoleClaims>,
    /// Client roles keyed by client identifier
    #[serde(default)]
    pub resource_access: HashMap<String, RoleClaims>,
}

impl TokenClaims {
    /// Realm roles, empty when the claim is absent
    #[must_use]
    pub fn realm_roles(&self) -> &[String] {
        self.realm_access.as_ref().map_or(&[], |r| r.roles.as_slice())
    }

    /// Roles granted on `client_id`, empty when absent
    #[must_use]
    pub fn client_roles(&self, client_id: &str) -> &[String] {
        self.resource_access
            .get(client_id)
            .map_or(&[], |r| r.roles.as_slice())
    }

    /// Whether `role` is granted on `client_id`
    #[must_use]
    pub fn has_client_role(&self, client_id: &str, role: &str) -> bool {
        self.client_roles(client_id).iter().any(|r| r == role)
    }

    /// Whether `role` is a realm role of the subject
    #[must_use]
    pub fn has_realm_role(&self, role: &str) -> bool {
        self.realm_roles().iter().any(|r| r == role)
    }
}
