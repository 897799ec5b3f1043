//! User management.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{Validate, min_length};
use crate::error::FieldError;
use crate::provider::{CredentialRepresentation, ProviderClient, UserRepresentation};
use crate::{Error, Result};

use super::roles::RoleOut;

const MIN_PASSWORD_LEN: usize = 6;

fn check_email(field: &str, value: &str, errors: &mut Vec<FieldError>) {
    static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
    let email_re =
        EMAIL_RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

    if !email_re.is_match(value) {
        errors.push(FieldError::body(
            field,
            "value_error",
            "value is not a valid email address",
        ));
    }
}

/// `POST /users` body. The username is the user's email.
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    /// Login name; must be an email address
    pub username: String,
    /// Initial password
    pub password: String,
    /// Given name
    #[serde(default)]
    pub first_name: String,
    /// Family name
    #[serde(default)]
    pub last_name: String,
}

impl Validate for UserCreate {
    fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_email("username", &self.username, &mut errors);
        min_length("password", &self.password, MIN_PASSWORD_LEN, &mut errors);
        errors
    }
}

/// `PUT /users/{id}` body; only provided fields are changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserUpdate {
    /// New given name
    #[serde(default)]
    pub first_name: Option<String>,
    /// New family name
    #[serde(default)]
    pub last_name: Option<String>,
    /// New email address
    #[serde(default)]
    pub email: Option<String>,
    /// Enable or disable the account
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl UserUpdate {
    fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.enabled.is_none()
    }
}

impl Validate for UserUpdate {
    fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(email) = &self.email {
            check_email("email", email, &mut errors);
        }
        errors
    }
}

/// `PATCH /users/{id}` body.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordUpdate {
    /// New permanent password
    pub password: String,
}

impl Validate for PasswordUpdate {
    fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        min_length("password", &self.password, MIN_PASSWORD_LEN, &mut errors);
        errors
    }
}

/// User as returned by this API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOut {
    /// User UUID
    pub id: String,
    /// Login name
    pub username: String,
    /// Given name, empty when unset
    pub first_name: String,
    /// Family name, empty when unset
    pub last_name: String,
    /// Defaults to `true` when the provider omits it
    pub enabled: bool,
}

impl From<UserRepresentation> for UserOut {
    fn from(user: UserRepresentation) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            username: user.username.unwrap_or_default(),
            first_name: user.first_name.unwrap_or_default(),
            last_name: user.last_name.unwrap_or_default(),
            enabled: user.enabled.unwrap_or(true),
        }
    }
}

/// User operations over the provider.
#[derive(Debug, Clone)]
pub struct UserService {
    provider: Arc<ProviderClient>,
}

impl UserService {
    /// Service over `provider`.
    #[must_use]
    pub fn new(provider: Arc<ProviderClient>) -> Self {
        Self { provider }
    }

    /// Create an enabled user with a permanent password.
    pub async fn create(&self, token: &str, input: UserCreate) -> Result<UserOut> {
        let user = UserRepresentation {
            username: Some(input.username.clone()),
            email: Some(input.username.clone()),
            first_name: Some(input.first_name.clone()),
            last_name: Some(input.last_name.clone()),
            enabled: Some(true),
            credentials: Some(vec![CredentialRepresentation::password(input.password)]),
            ..Default::default()
        };
        let id = self.provider.create_user(token, &user).await?;
        info!(user_id = %id, "User created");

        Ok(UserOut {
            id,
            username: input.username,
            first_name: input.first_name,
            last_name: input.last_name,
            enabled: true,
        })
    }

    /// All users, optionally filtered by `enabled`.
    pub async fn list(&self, token: &str, enabled: Option<bool>) -> Result<Vec<UserOut>> {
        let users = self.provider.list_users(token, enabled).await?;
        Ok(users.into_iter().map(UserOut::from).collect())
    }

    /// One user by id.
    pub async fn get(&self, token: &str, user_id: &str) -> Result<UserOut> {
        Ok(self.provider.get_user(token, user_id).await?.into())
    }

    /// The user a token was issued to. A token without a subject is
    /// rejected as invalid.
    pub async fn current(&self, token: &str, subject: Option<&str>) -> Result<UserOut> {
        let subject = subject.ok_or_else(Error::invalid_token)?;
        self.get(token, subject).await
    }

    /// Apply a partial update. An empty update is rejected locally.
    pub async fn update(&self, token: &str, user_id: &str, patch: UserUpdate) -> Result<()> {
        if patch.is_empty() {
            return Err(Error::BadRequest(
                "At least one field must be provided".to_string(),
            ));
        }
        let changes = UserRepresentation {
            first_name: patch.first_name,
            last_name: patch.last_name,
            email: patch.email,
            enabled: patch.enabled,
            ..Default::default()
        };
        self.provider.update_user(token, user_id, &changes).await
    }

    /// Replace the password with a permanent one.
    pub async fn update_password(
        &self,
        token: &str,
        user_id: &str,
        input: PasswordUpdate,
    ) -> Result<()> {
        self.provider
            .reset_password(token, user_id, &input.password)
            .await
    }

    /// Logical delete.
    pub async fn disable(&self, token: &str, user_id: &str) -> Result<()> {
        self.provider.disable_user(token, user_id).await?;
        info!(user_id = %user_id, "User disabled");
        Ok(())
    }

    /// Client roles mapped to the user.
    pub async fn roles(&self, token: &str, user_id: &str) -> Result<Vec<RoleOut>> {
        let roles = self.provider.list_user_roles(token, user_id).await?;
        Ok(roles.into_iter().map(RoleOut::from).collect())
    }

    /// Map a client role to the user.
    pub async fn assign_role(&self, token: &str, user_id: &str, role_id: &str) -> Result<()> {
        self.provider
            .assign_role_to_user(token, user_id, role_id)
            .await?;
        info!(user_id = %user_id, role_id = %role_id, "Role assigned");
        Ok(())
    }

    /// Remove a client role mapping from the user.
    pub async fn remove_role(&self, token: &str, user_id: &str, role_id: &str) -> Result<()> {
        self.provider
            .remove_role_from_user(token, user_id, role_id)
            .await?;
        info!(user_id = %user_id, role_id = %role_id, "Role removed");
        Ok(())
    }
}
