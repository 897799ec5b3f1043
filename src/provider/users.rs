//! User admin calls. Each forwards the caller's bearer token.

use serde_json::json;

use super::{
    CredentialRepresentation, Operation, ProviderClient, UserRepresentation, location_id,
    validate_uuid,
};
use crate::Result;

impl ProviderClient {
    /// `POST /users`; returns the new user's id taken from `Location`.
    pub async fn create_user(&self, token: &str, user: &UserRepresentation) -> Result<String> {
        let request = self
            .http
            .post(self.admin("/users"))
            .bearer_auth(token)
            .json(user);
        let response = self.send(Operation::CreateUser, request).await?;
        location_id(&response)
    }

    /// `GET /users`, optionally filtered by the enabled flag.
    pub async fn list_users(
        &self,
        token: &str,
        enabled: Option<bool>,
    ) -> Result<Vec<UserRepresentation>> {
        let mut request = self.http.get(self.admin("/users")).bearer_auth(token);
        if let Some(enabled) = enabled {
            request = request.query(&[("enabled", if enabled { "true" } else { "false" })]);
        }
        let response = self.send(Operation::ListUsers, request).await?;
        Ok(response.json().await?)
    }

    /// `GET /users/{id}`
    pub async fn get_user(&self, token: &str, user_id: &str) -> Result<UserRepresentation> {
        validate_uuid(user_id, "user")?;
        let request = self
            .http
            .get(self.admin(&format!("/users/{user_id}")))
            .bearer_auth(token);
        let response = self.send(Operation::GetUser, request).await?;
        Ok(response.json().await?)
    }

    /// `PUT /users/{id}` with only the fields to change.
    pub async fn update_user(
        &self,
        token: &str,
        user_id: &str,
        changes: &UserRepresentation,
    ) -> Result<()> {
        validate_uuid(user_id, "user")?;
        let request = self
            .http
            .put(self.admin(&format!("/users/{user_id}")))
            .bearer_auth(token)
            .json(changes);
        self.send(Operation::UpdateUser, request).await?;
        Ok(())
    }

    /// `PUT /users/{id}/reset-password` with a non-temporary credential.
    pub async fn reset_password(&self, token: &str, user_id: &str, password: &str) -> Result<()> {
        validate_uuid(user_id, "user")?;
        let request = self
            .http
            .put(self.admin(&format!("/users/{user_id}/reset-password")))
            .bearer_auth(token)
            .json(&CredentialRepresentation::password(password));
        self.send(Operation::ResetPassword, request).await?;
        Ok(())
    }

    /// Disable the account; users are never hard-deleted.
    pub async fn disable_user(&self, token: &str, user_id: &str) -> Result<()> {
        validate_uuid(user_id, "user")?;
        let request = self
            .http
            .put(self.admin(&format!("/users/{user_id}")))
            .bearer_auth(token)
            .json(&json!({ "enabled": false }));
        self.send(Operation::DisableUser, request).await?;
        Ok(())
    }
}
