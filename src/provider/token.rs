//! Token endpoint grants.

use super::{Operation, ProviderClient, TokenResponse};
use crate::Result;

impl ProviderClient {
    /// Exchange user credentials for tokens (password grant).
    ///
    /// A provider 400 means bad credentials and surfaces as `Unauthorized`.
    pub async fn exchange_password_grant(
        &self,
        username: &str,
        password: &str,
    ) -> Result<TokenResponse> {
        let form = [
            ("grant_type", self.grant_type.as_str()),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("username", username),
            ("password", password),
        ];
        let request = self.http.post(&self.token_url).form(&form);
        let response = self.send(Operation::PasswordGrant, request).await?;
        Ok(response.json().await?)
    }

    /// Exchange a refresh token for a new token pair.
    pub async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
        ];
        let request = self.http.post(&self.token_url).form(&form);
        let response = self.send(Operation::RefreshGrant, request).await?;
        Ok(response.json().await?)
    }
}
