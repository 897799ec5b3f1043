//! Login, refresh and token validation handlers.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use super::AppState;
use super::extract::ValidJson;
use crate::Result;
use crate::auth::Authenticated;
use crate::service::{LoginRequest, RefreshRequest, TokenInfo, TokenOut};

/// `POST /login`: password grant, answered with 201.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidJson(input): ValidJson<LoginRequest>,
) -> Result<(StatusCode, Json<TokenOut>)> {
    let tokens = state.auth.login(input).await?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

/// `POST /refresh`
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidJson(input): ValidJson<RefreshRequest>,
) -> Result<Json<TokenOut>> {
    Ok(Json(state.auth.refresh(input).await?))
}

/// Summarize the caller's token. Verified here when route-level
/// verification is disabled.
pub async fn validate(
    State(state): State<Arc<AppState>>,
    auth: Authenticated,
) -> Result<Json<TokenInfo>> {
    let info = match &auth.claims {
        Some(claims) => TokenInfo::from_claims(claims, state.provider.client_id()),
        None => state.auth.introspect(auth.token.as_str()).await?,
    };
    Ok(Json(info))
}
