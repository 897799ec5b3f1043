//! `/roles` handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use super::AppState;
use super::extract::ValidJson;
use crate::Result;
use crate::auth::Authenticated;
use crate::service::{RoleCreate, RoleOut, RolePatch, RoleUpdate};

/// `POST /roles`, answered with 201.
pub async fn create(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    ValidJson(input): ValidJson<RoleCreate>,
) -> Result<(StatusCode, Json<RoleOut>)> {
    let role = state.roles.create(auth.token.as_str(), input).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// `GET /roles`
pub async fn list(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> Result<Json<Vec<RoleOut>>> {
    Ok(Json(state.roles.list(auth.token.as_str()).await?))
}

/// `GET /roles/{id}`
pub async fn get(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(role_id): Path<String>,
) -> Result<Json<RoleOut>> {
    Ok(Json(state.roles.get(auth.token.as_str(), &role_id).await?))
}

/// `PUT /roles/{id}`: full replacement.
pub async fn update(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(role_id): Path<String>,
    ValidJson(input): ValidJson<RoleUpdate>,
) -> Result<Json<Value>> {
    state
        .roles
        .update(auth.token.as_str(), &role_id, input)
        .await?;
    Ok(Json(json!({})))
}

/// `PATCH /roles/{id}`: partial update.
pub async fn patch(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(role_id): Path<String>,
    ValidJson(input): ValidJson<RolePatch>,
) -> Result<Json<Value>> {
    state.roles.patch(auth.token.as_str(), &role_id, input).await?;
    Ok(Json(json!({})))
}

/// `DELETE /roles/{id}`
pub async fn delete(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
    Path(role_id): Path<String>,
) -> Result<StatusCode> {
    state.roles.delete(auth.token.as_str(), &role_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
