//! Food-chain API Library
//!
//! Locations, staff, dishes, suppliers and their links, kept in dense
//! compacting tables and served over HTTP.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod queries;
pub mod services;
pub mod store;
pub mod tracing;
pub mod validation;

use axum::{middleware, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::models::Entity;
use crate::queries::QueryFields;
use crate::services::EntityService;
use crate::store::Store;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Empty store using the configured blank templates
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(Store::new(config.blanks.clone()));
        Self {
            store,
            config: Arc::new(config),
        }
    }

    /// Loads the lookup tables named in the configuration
    pub async fn seed(&self) -> Result<(), errors::ServiceError> {
        self.store.seed_lookups(&self.config.seed).await
    }

    pub fn service<E: Entity + QueryFields>(&self) -> EntityService<E> {
        EntityService::new(self.store.clone(), self.config.list_default_page_size)
    }
}

/// Full application router with request-id tagging and HTTP tracing
pub fn build_router(state: AppState) -> Router {
    handlers::api_routes()
        .layer(
            TraceLayer::new_for_http().make_span_with(crate::tracing::RequestSpanMaker),
        )
        .layer(middleware::from_fn(crate::tracing::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub mod prelude {
    pub use crate::config::AppConfig;
    pub use crate::errors::*;
    pub use crate::models::*;
    pub use crate::queries::{QueryFields, QueryOptions};
    pub use crate::services::EntityService;
    pub use crate::store::{DeleteOutcome, Store, Tables};
    pub use crate::{build_router, AppState};
}
