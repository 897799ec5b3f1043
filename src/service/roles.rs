//! Client role management.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Validate, min_length};
use crate::Result;
use crate::error::FieldError;
use crate::provider::{ProviderClient, RoleRepresentation};

/// `POST /roles` body. The name is trimmed before use.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleCreate {
    /// Role name, unique within the client
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for RoleCreate {
    fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        min_length("name", self.name.trim(), 1, &mut errors);
        errors
    }
}

/// `PUT /roles/{id}` body: the full writable representation.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleUpdate {
    /// New name
    pub name: String,
    /// New description; omitting it clears the stored one
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for RoleUpdate {
    fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        min_length("name", self.name.trim(), 1, &mut errors);
        errors
    }
}

/// `PATCH /roles/{id}` body; omitted fields keep their stored values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolePatch {
    /// Replacement name
    #[serde(default)]
    pub name: Option<String>,
    /// Replacement description
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for RolePatch {
    fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            min_length("name", name.trim(), 1, &mut errors);
        }
        errors
    }
}

/// Role as returned by this API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOut {
    /// Role UUID
    pub id: String,
    /// Role name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Defaults to `true` when the provider omits it
    pub client_role: bool,
}

impl From<RoleRepresentation> for RoleOut {
    fn from(role: RoleRepresentation) -> Self {
        Self {
            id: role.id.unwrap_or_default(),
            name: role.name,
            description: role.description,
            // Only client roles are ever managed here
            client_role: role.client_role.unwrap_or(true),
        }
    }
}

/// Role operations over the provider.
#[derive(Debug, Clone)]
pub struct RoleService {
    provider: Arc<ProviderClient>,
}

impl RoleService {
    /// Service over `provider`.
    #[must_use]
    pub fn new(provider: Arc<ProviderClient>) -> Self {
        Self { provider }
    }

    /// Create a client role with a trimmed name.
    pub async fn create(&self, token: &str, input: RoleCreate) -> Result<RoleOut> {
        let role = RoleRepresentation::new(input.name.trim(), input.description);
        let created = self.provider.create_role(token, &role).await?;
        let out = RoleOut::from(created);
        info!(role_id = %out.id, name = %out.name, "Role created");
        Ok(out)
    }

    /// Every role of the configured client.
    pub async fn list(&self, token: &str) -> Result<Vec<RoleOut>> {
        let roles = self.provider.list_roles(token).await?;
        Ok(roles.into_iter().map(RoleOut::from).collect())
    }

    /// One role by id.
    pub async fn get(&self, token: &str, role_id: &str) -> Result<RoleOut> {
        Ok(self.provider.get_role(token, role_id).await?.into())
    }

    /// Replace name and description.
    pub async fn update(&self, token: &str, role_id: &str, input: RoleUpdate) -> Result<()> {
        let role = RoleRepresentation::new(input.name.trim(), input.description);
        self.provider.update_role(token, role_id, &role).await
    }

    /// Change only the provided fields.
    pub async fn patch(&self, token: &str, role_id: &str, patch: RolePatch) -> Result<()> {
        self.provider
            .patch_role(
                token,
                role_id,
                patch.name.as_deref().map(str::trim),
                patch.description.as_deref(),
            )
            .await
    }

    /// Delete a role by id.
    pub async fn delete(&self, token: &str, role_id: &str) -> Result<()> {
        self.provider.delete_role(token, role_id).await?;
        info!(role_id = %role_id, "Role deleted");
        Ok(())
    }
}
