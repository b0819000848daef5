//! rollcall-api library - person registry with name-based enrichment
//!
//! Exposes the router, state and services for the binary and for
//! integration testing.

use axum::Router;
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod pagination;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use crate::db::SqlitePersonStore;
use crate::services::{NameLookup, PeopleService};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Person use cases
    pub people: PeopleService,
}

impl AppState {
    /// Create application state over a migrated pool
    pub fn new(db: SqlitePool, lookup: Arc<dyn NameLookup>) -> Self {
        let store = Arc::new(SqlitePersonStore::new(db));
        Self {
            people: PeopleService::new(store, lookup),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::people_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
