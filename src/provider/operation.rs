//! Per-operation status translation.
//!
//! Each admin call declares the single status it treats as success and how
//! the provider's failure statuses map onto [`Error`]. The table is fixed:
//!
//! | Provider status | Result |
//! |---|---|
//! | 400 on a password grant | `Unauthorized` (bad credentials) |
//! | 400 on a refresh grant | `BadRequest` (bad refresh token) |
//! | 401 | `Unauthorized` |
//! | 403 | `Forbidden` |
//! | 404 | `NotFound` with a resource-specific message, when the operation addresses a resource |
//! | 409 on creation | `Conflict` |
//! | anything else | `BadGateway` |

use std::fmt;

use reqwest::StatusCode;

use crate::Error;

/// Every call this gateway issues against the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Password grant on the token endpoint
    PasswordGrant,
    /// Refresh-token grant on the token endpoint
    RefreshGrant,
    /// `POST /users`
    CreateUser,
    /// `GET /users`
    ListUsers,
    /// `GET /users/{id}`
    GetUser,
    /// `PUT /users/{id}`
    UpdateUser,
    /// `PUT /users/{id}/reset-password`
    ResetPassword,
    /// `PUT /users/{id}` with `enabled: false`
    DisableUser,
    /// `GET /clients?clientId=`
    ResolveClient,
    /// `POST /clients/{uuid}/roles`
    CreateRole,
    /// `GET /clients/{uuid}/roles/{name}` after creation
    ReadCreatedRole,
    /// `GET /clients/{uuid}/roles`
    ListRoles,
    /// `GET /roles-by-id/{id}`
    GetRole,
    /// `PUT /roles-by-id/{id}`
    UpdateRole,
    /// `DELETE /roles-by-id/{id}`
    DeleteRole,
    /// `POST /users/{id}/role-mappings/clients/{uuid}`
    AssignRole,
    /// `DELETE /users/{id}/role-mappings/clients/{uuid}`
    RemoveRole,
    /// `GET /users/{id}/role-mappings/clients/{uuid}`
    ListUserRoles,
}

impl Operation {
    /// Status the provider answers with on success
    #[must_use]
    pub fn success(self) -> StatusCode {
        match self {
            Self::CreateUser | Self::CreateRole => StatusCode::CREATED,
            Self::UpdateUser
            | Self::ResetPassword
            | Self::DisableUser
            | Self::UpdateRole
            | Self::DeleteRole
            | Self::AssignRole
            | Self::RemoveRole => StatusCode::NO_CONTENT,
            Self::PasswordGrant
            | Self::RefreshGrant
            | Self::ListUsers
            | Self::GetUser
            | Self::ResolveClient
            | Self::ReadCreatedRole
            | Self::ListRoles
            | Self::GetRole
            | Self::ListUserRoles => StatusCode::OK,
        }
    }

    fn not_found(self) -> Option<&'static str> {
        match self {
            Self::GetUser | Self::UpdateUser | Self::ResetPassword | Self::DisableUser => {
                Some("User not found")
            }
            Self::ReadCreatedRole | Self::GetRole | Self::UpdateRole | Self::DeleteRole => {
                Some("Role not found")
            }
            Self::ResolveClient | Self::CreateRole | Self::ListRoles => Some("Client not found"),
            Self::AssignRole | Self::RemoveRole | Self::ListUserRoles => {
                Some("User or role not found")
            }
            Self::PasswordGrant | Self::RefreshGrant | Self::CreateUser | Self::ListUsers => None,
        }
    }

    fn conflict(self) -> Option<&'static str> {
        match self {
            Self::CreateUser => Some("User already exists"),
            Self::CreateRole => Some("Role already exists"),
            _ => None,
        }
    }

    /// Translate a non-success provider status into the gateway's taxonomy.
    #[must_use]
    pub fn translate(self, status: StatusCode) -> Error {
        match (self, status) {
            (Self::PasswordGrant, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) => {
                Error::Unauthorized("Invalid username or password".to_string())
            }
            (Self::RefreshGrant, StatusCode::BAD_REQUEST) => {
                Error::BadRequest("Invalid or expired refresh token".to_string())
            }
            (_, StatusCode::UNAUTHORIZED) => {
                Error::Unauthorized("Invalid or expired access token".to_string())
            }
            (_, StatusCode::FORBIDDEN) => Error::Forbidden("Insufficient permissions".to_string()),
            (op, StatusCode::NOT_FOUND) if op.not_found().is_some() => {
                Error::NotFound(op.not_found().unwrap_or_default().to_string())
            }
            (op, StatusCode::CONFLICT) if op.conflict().is_some() => {
                Error::Conflict(op.conflict().unwrap_or_default().to_string())
            }
            (op, status) => Error::BadGateway(format!(
                "Unexpected identity provider response to {op} (HTTP {})",
                status.as_u16()
            )),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PasswordGrant => "exchange-password-grant",
            Self::RefreshGrant => "exchange-refresh-token",
            Self::CreateUser => "create-user",
            Self::ListUsers => "list-users",
            Self::GetUser => "get-user",
            Self::UpdateUser => "update-user",
            Self::ResetPassword => "reset-password",
            Self::DisableUser => "disable-user",
            Self::ResolveClient => "resolve-client-uuid",
            Self::CreateRole => "create-role",
            Self::ReadCreatedRole => "read-created-role",
            Self::ListRoles => "list-roles",
            Self::GetRole => "get-role-by-id",
            Self::UpdateRole => "update-role",
            Self::DeleteRole => "delete-role",
            Self::AssignRole => "assign-role-to-user",
            Self::RemoveRole => "remove-role-from-user",
            Self::ListUserRoles => "list-user-roles",
        };
        f.write_str(name)
    }
}
