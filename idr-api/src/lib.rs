//! idr-api library - contact identity reconciliation service
//!
//! Exposes the reconciliation engine ([`resolver::IdentityResolver`]), its
//! storage layer ([`store::ContactStore`]), and the axum router serving
//! the identify endpoint.

use axum::Router;
use sqlx::SqlitePool;

pub mod api;
pub mod db_retry;
pub mod resolver;
pub mod store;

use resolver::IdentityResolver;
use store::ContactStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Reconciliation engine
    pub resolver: IdentityResolver,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, max_lock_wait_ms: u64) -> Self {
        let resolver = IdentityResolver::new(ContactStore::new(db.clone()), max_lock_wait_ms);
        Self { db, resolver }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/identify", post(api::identify))
        .route("/health", get(api::health_check))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
