//! `/users` handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::AppState;
use super::extract::ValidJson;
use crate::auth::Authenticated;
use crate::error::FieldError;
use crate::service::{PasswordUpdate, RoleOut, UserCreate, UserOut, UserUpdate};
use crate::{Error, Result};

/// `GET /users` query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    /// Only users with this `enabled` flag
    #[serde(default)]
    pub enabled: Option<bool>,
}

/// `POST /users`
pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    ValidJson(input): ValidJson<UserCreate>,
) -> Result<(StatusCode, Json<UserOut>)> {
    let user = state.users.create(auth.token.as_str(), input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `GET /users[?enabled=true|false]`. A malformed filter is a validation
/// error on `["query", "enabled"]`.
pub async fn list(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    query: std::result::Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Json<Vec<UserOut>>> {
    let Query(query) = query.map_err(|rejection| {
        Error::Validation(vec![FieldError {
            loc: vec!["query".to_string(), "enabled".to_string()],
            msg: rejection.body_text(),
            kind: "bool_parsing".to_string(),
        }])
    })?;
    let users = state.users.list(auth.token.as_str(), query.enabled).await?;
    Ok(Json(users))
}

/// `GET /users/current`: the caller's own user, found by the token's
/// `sub` claim.
pub async fn current(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> Result<Json<UserOut>> {
    let subject = match &auth.claims {
        Some(claims) => claims.sub.clone(),
        None => state.auth.introspect(auth.token.as_str()).await?.subject,
    };
    let user = state
        .users
        .current(auth.token.as_str(), subject.as_deref())
        .await?;
    Ok(Json(user))
}

/// `GET /users/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(user_id): Path<String>,
) -> Result<Json<UserOut>> {
    Ok(Json(state.users.get(auth.token.as_str(), &user_id).await?))
}

/// `PUT /users/{id}`
pub async fn update(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(user_id): Path<String>,
    ValidJson(patch): ValidJson<UserUpdate>,
) -> Result<Json<Value>> {
    state
        .users
        .update(auth.token.as_str(), &user_id, patch)
        .await?;
    Ok(Json(json!({})))
}

/// `PATCH /users/{id}`: set a new password.
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(user_id): Path<String>,
    ValidJson(input): ValidJson<PasswordUpdate>,
) -> Result<Json<Value>> {
    state
        .users
        .update_password(auth.token.as_str(), &user_id, input)
        .await?;
    Ok(Json(json!({})))
}

/// `DELETE /users/{id}` disables the account.
pub async fn disable(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(user_id): Path<String>,
) -> Result<StatusCode> {
    state.users.disable(auth.token.as_str(), &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /users/{id}/roles`
pub async fn roles(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<RoleOut>>> {
    Ok(Json(state.users.roles(auth.token.as_str(), &user_id).await?))
}

/// `POST /users/{id}/roles/{role_id}`
pub async fn assign_role(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path((user_id, role_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    state
        .users
        .assign_role(auth.token.as_str(), &user_id, &role_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /users/{id}/roles/{role_id}`
pub async fn remove_role(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path((user_id, role_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    state
        .users
        .remove_role(auth.token.as_str(), &user_id, &role_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
