//! HTTP layer - routes, middleware and JSON contracts
//!
//! `/api/auth` is public; every other route requires a bearer token issued by it.

/// Request and response bodies
pub mod dto;
/// Mapping of domain errors onto HTTP responses
pub mod error;
/// Route handlers
pub mod handlers;
/// Bearer-token authentication
pub mod middleware;

use crate::{auth::AuthService, core::catalog::CatalogCache};
use axum::{
    Router,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

/// Shared state available to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Login and token verification
    pub auth: AuthService,
    /// In-memory view of the item catalog
    pub catalog: CatalogCache,
}

impl AppState {
    /// Bundles the shared handles for the router.
    #[must_use]
    pub const fn new(db: DatabaseConnection, auth: AuthService, catalog: CatalogCache) -> Self {
        Self { db, auth, catalog }
    }
}

/// Builds the application router.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/info", get(handlers::info_handler))
        .route("/api/sendCoin", post(handlers::send_coin_handler))
        .route("/api/buy/:item", get(handlers::buy_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/api/auth", post(handlers::auth_handler))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
