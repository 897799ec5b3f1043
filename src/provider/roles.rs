//! Client role admin calls and the multi-step role workflows.
//!
//! Roles are created and listed under the configured client, but addressed
//! by id through `/roles-by-id` for everything else. Multi-step workflows
//! are strictly sequential: a later call is only issued once the previous
//! one succeeded.

use tracing::debug;

use super::{
    ClientRepresentation, Operation, ProviderClient, RoleRepresentation, is_uuid,
    location_segments, validate_uuid,
};
use crate::{Error, Result};

impl ProviderClient {
    /// Provider-internal UUID of the configured client. Cached after the
    /// first successful lookup; a cache hit performs no I/O.
    pub async fn resolve_client_uuid(&self, token: &str) -> Result<String> {
        if let Some(uuid) = self.client_uuids.get(&self.client_id) {
            return Ok(uuid);
        }

        let request = self
            .http
            .get(self.admin("/clients"))
            .bearer_auth(token)
            .query(&[("clientId", self.client_id.as_str())]);
        let response = self.send(Operation::ResolveClient, request).await?;
        let clients: Vec<ClientRepresentation> = response.json().await?;

        let uuid = clients
            .into_iter()
            .next()
            .map(|c| c.id)
            .ok_or_else(|| Error::NotFound("Client not found".to_string()))?;

        debug!(client_id = %self.client_id, uuid = %uuid, "Resolved client UUID");
        Ok(self.client_uuids.insert(self.client_id.clone(), uuid))
    }

    /// Create a client role and return it with its id.
    ///
    /// The provider's `Location` for a client role ends in the role name,
    /// which may itself look like a UUID. Only a `/roles-by-id/{id}`
    /// location carries the id; anything else is read back once by name.
    pub async fn create_role(
        &self,
        token: &str,
        role: &RoleRepresentation,
    ) -> Result<RoleRepresentation> {
        let client_uuid = self.resolve_client_uuid(token).await?;
        let request = self
            .http
            .post(self.admin(&format!("/clients/{client_uuid}/roles")))
            .bearer_auth(token)
            .json(role);
        let response = self.send(Operation::CreateRole, request).await?;
        let (parent, segment) = location_segments(&response)?;

        if parent == "roles-by-id" && is_uuid(&segment) {
            return Ok(RoleRepresentation {
                id: Some(segment),
                client_role: Some(true),
                container_id: Some(client_uuid),
                ..role.clone()
            });
        }

        // Segment is already percent-encoded by the provider
        let request = self
            .http
            .get(self.admin(&format!("/clients/{client_uuid}/roles/{segment}")))
            .bearer_auth(token);
        let response = self.send(Operation::ReadCreatedRole, request).await?;
        Ok(response.json().await?)
    }

    /// Every role of the configured client.
    pub async fn list_roles(&self, token: &str) -> Result<Vec<RoleRepresentation>> {
        let client_uuid = self.resolve_client_uuid(token).await?;
        let request = self
            .http
            .get(self.admin(&format!("/clients/{client_uuid}/roles")))
            .bearer_auth(token);
        let response = self.send(Operation::ListRoles, request).await?;
        Ok(response.json().await?)
    }

    /// `GET /roles-by-id/{id}`
    pub async fn get_role(&self, token: &str, role_id: &str) -> Result<RoleRepresentation> {
        validate_uuid(role_id, "role")?;
        let request = self
            .http
            .get(self.admin(&format!("/roles-by-id/{role_id}")))
            .bearer_auth(token);
        let response = self.send(Operation::GetRole, request).await?;
        Ok(response.json().await?)
    }

    /// `PUT /roles-by-id/{id}` with a full representation.
    pub async fn update_role(
        &self,
        token: &str,
        role_id: &str,
        role: &RoleRepresentation,
    ) -> Result<()> {
        validate_uuid(role_id, "role")?;
        let request = self
            .http
            .put(self.admin(&format!("/roles-by-id/{role_id}")))
            .bearer_auth(token)
            .json(role);
        self.send(Operation::UpdateRole, request).await?;
        Ok(())
    }

    /// Partial update: read the stored role, merge, write it back.
    ///
    /// There is no concurrency precondition; a concurrent writer between the
    /// read and the write is overwritten.
    pub async fn patch_role(
        &self,
        token: &str,
        role_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        validate_uuid(role_id, "role")?;
        if name.is_none() && description.is_none() {
            return Err(Error::BadRequest(
                "At least one field must be provided".to_string(),
            ));
        }

        let stored = self.get_role(token, role_id).await?;
        let merged = stored.merged(name, description);
        self.update_role(token, role_id, &merged).await
    }

    /// `DELETE /roles-by-id/{id}`
    pub async fn delete_role(&self, token: &str, role_id: &str) -> Result<()> {
        validate_uuid(role_id, "role")?;
        let request = self
            .http
            .delete(self.admin(&format!("/roles-by-id/{role_id}")))
            .bearer_auth(token);
        self.send(Operation::DeleteRole, request).await?;
        Ok(())
    }

    /// Grant a client role: resolve the client, fetch the role, then post
    /// the role mapping.
    pub async fn assign_role_to_user(
        &self,
        token: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<()> {
        let (client_uuid, role) = self.role_mapping_target(token, user_id, role_id).await?;
        let request = self
            .http
            .post(self.admin(&format!(
                "/users/{user_id}/role-mappings/clients/{client_uuid}"
            )))
            .bearer_auth(token)
            .json(&[role]);
        self.send(Operation::AssignRole, request).await?;
        Ok(())
    }

    /// Revoke a client role; same lookups as [`Self::assign_role_to_user`].
    pub async fn remove_role_from_user(
        &self,
        token: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<()> {
        let (client_uuid, role) = self.role_mapping_target(token, user_id, role_id).await?;
        let request = self
            .http
            .delete(self.admin(&format!(
                "/users/{user_id}/role-mappings/clients/{client_uuid}"
            )))
            .bearer_auth(token)
            .json(&[role]);
        self.send(Operation::RemoveRole, request).await?;
        Ok(())
    }

    /// Client roles currently mapped to a user.
    pub async fn list_user_roles(
        &self,
        token: &str,
        user_id: &str,
    ) -> Result<Vec<RoleRepresentation>> {
        validate_uuid(user_id, "user")?;
        let client_uuid = self.resolve_client_uuid(token).await?;
        let request = self
            .http
            .get(self.admin(&format!(
                "/users/{user_id}/role-mappings/clients/{client_uuid}"
            )))
            .bearer_auth(token);
        let response = self.send(Operation::ListUserRoles, request).await?;
        Ok(response.json().await?)
    }

    async fn role_mapping_target(
        &self,
        token: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(String, RoleRepresentation)> {
        validate_uuid(user_id, "user")?;
        validate_uuid(role_id, "role")?;
        let client_uuid = self.resolve_client_uuid(token).await?;
        let role = self.get_role(token, role_id).await?;
        Ok((client_uuid, role))
    }
}
