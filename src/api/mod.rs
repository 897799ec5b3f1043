//! HTTP router and shared handler state

pub mod auth;
pub mod error;
pub mod extract;
pub mod health;
pub mod roles;
pub mod users;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::auth::{BearerAuth, TokenVerifier, require_bearer};
use crate::provider::ProviderClient;
use crate::service::{AuthService, RoleService, UserService};

pub use extract::ValidJson;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Provider client (health probes, client id)
    pub provider: Arc<ProviderClient>,
    /// User operations
    pub users: UserService,
    /// Role operations
    pub roles: RoleService,
    /// Login / refresh / introspection
    pub auth: AuthService,
}

impl AppState {
    /// Wire the domain services over one provider client.
    #[must_use]
    pub fn new(provider: Arc<ProviderClient>, verifier: Arc<TokenVerifier>) -> Self {
        Self {
            users: UserService::new(Arc::clone(&provider)),
            roles: RoleService::new(Arc::clone(&provider)),
            auth: AuthService::new(Arc::clone(&provider), verifier),
            provider,
        }
    }
}

/// Create the router
pub fn create_router(state: Arc<AppState>, bearer: Arc<BearerAuth>) -> Router {
    let protected = Router::new()
        .route("/validate", get(auth::validate))
        .route("/users", post(users::create).get(users::list))
        .route("/users/current", get(users::current))
        .route(
            "/users/{id}",
            get(users::get)
                .put(users::update)
                .patch(users::update_password)
                .delete(users::disable),
        )
        .route("/users/{id}/roles", get(users::roles))
        .route(
            "/users/{id}/roles/{role_id}",
            post(users::assign_role).delete(users::remove_role),
        )
        .route("/roles", post(roles::create).get(roles::list))
        .route(
            "/roles/{id}",
            get(roles::get)
                .put(roles::update)
                .patch(roles::patch)
                .delete(roles::delete),
        )
        // Only matched routes pass through authentication
        .route_layer(middleware::from_fn_with_state(bearer, require_bearer));

    Router::new()
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/health", get(health::health))
        .merge(protected)
        .fallback(error::not_found)
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
