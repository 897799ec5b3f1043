//! Provider admin API representations.

use serde::{Deserialize, Serialize};

/// User as exposed by the admin API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRepresentation {
    /// Provider-assigned UUID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Login name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Given name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Whether the account may log in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Write-only; never returned by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<CredentialRepresentation>>,
}

/// Credential payload for user creation and password resets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRepresentation {
    /// Credential type, always `password` here
    #[serde(rename = "type")]
    pub kind: String,
    /// Secret value
    pub value: String,
    /// Whether the user must change it on next login
    pub temporary: bool,
}

impl CredentialRepresentation {
    /// Non-temporary password credential
    pub fn password(value: impl Into<String>) -> Self {
        Self {
            kind: "password".to_string(),
            value: value.into(),
            temporary: false,
        }
    }
}

/// Role as exposed by the admin API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRepresentation {
    /// Provider-assigned UUID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Role name, unique within its client
    #[serde(default)]
    pub name: String,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the role belongs to a client rather than the realm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_role: Option<bool>,
    /// UUID of the owning client (or realm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// Whether the role aggregates other roles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<bool>,
}

impl RoleRepresentation {
    /// Writable `{name, description}` payload.
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            ..Self::default()
        }
    }

    /// Full update payload for a partial change: every provided field
    /// overwrites, every omitted field keeps the stored value.
    #[must_use]
    pub fn merged(&self, name: Option<&str>, description: Option<&str>) -> Self {
        Self::new(
            name.map_or_else(|| self.name.clone(), str::to_string),
            description
                .map(str::to_string)
                .or_else(|| self.description.clone()),
        )
    }
}

/// Client lookup result; only the internal id matters here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRepresentation {
    /// Provider-internal UUID
    pub id: String,
    /// Public client identifier
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Token endpoint success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Usually `Bearer`
    pub token_type: String,
    /// Signed access token
    pub access_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
    /// Refresh token, when the grant issues one
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Refresh token lifetime in seconds
    #[serde(default)]
    pub refresh_expires_in: Option<u64>,
}
