/*!
 * HTTP boundary
 *
 * Every collection exposes the same surface:
 * - `GET /X` list (query options applied)
 * - `GET /X/:id` shaped view, `GET /X/:id/basic` raw row
 * - `POST /X`, `PUT /X/:id`, `DELETE /X/:id` for writable collections;
 *   seeded lookups answer the same writes with `400`
 *
 * Relation lists live in [`relations`].
 */

use axum::{
    extract::{OriginalUri, Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use std::collections::HashMap;
use tracing::info;

use crate::errors::ServiceError;
use crate::models::{
    Dish, DishRequirement, Employee, Entity, Location, Management, Menu, MenuItem, Position,
    Schedule, Supplier, SupplierStock, SupplyCategory, SupplyLink,
};
use crate::queries::QueryFields;
use crate::store::Record;
use crate::AppState;

pub mod common;
pub mod health;
pub mod relations;

use common::{created_response, success_response, JsonBody};

/// List a collection
async fn list<E: Entity + QueryFields>(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ServiceError> {
    let rows = state.service::<E>().list(&params).await?;
    Ok(success_response(rows))
}

/// Get the shaped view of a row
async fn view<E: Entity + QueryFields>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let view = state.service::<E>().view(id).await?;
    Ok(success_response(view))
}

/// Get a raw row
async fn basic<E: Entity + QueryFields>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let row = state.service::<E>().get(id).await?;
    Ok(success_response(row))
}

/// Create a row
async fn create<E: Entity + QueryFields>(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    JsonBody(payload): JsonBody<E>,
) -> Result<Response, ServiceError> {
    let created = state.service::<E>().create(payload).await?;
    let location = format!("{}/{}", uri.path().trim_end_matches('/'), created.id());
    info!(kind = %E::KIND, id = created.id(), "created via {}", uri.path());
    Ok(created_response(created, &location))
}

/// Replace a row
async fn update<E: Entity + QueryFields>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    JsonBody(payload): JsonBody<E>,
) -> Result<Response, ServiceError> {
    let updated = state.service::<E>().update(id, payload).await?;
    Ok(success_response(updated))
}

/// Delete a row (blank, remove or compact)
async fn remove<E: Entity + QueryFields>(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let outcome = state.service::<E>().delete(id).await?;
    Ok(success_response(outcome))
}

/// Any write to a seeded lookup
async fn reject_write<E: Entity>() -> Result<Response, ServiceError> {
    Err(ServiceError::InvalidInput(format!(
        "{} is a seeded lookup and is read-only",
        E::KIND
    )))
}

/// Full CRUD surface under `path`
fn writable<E: Entity + QueryFields>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, get(list::<E>).post(create::<E>))
        .route(
            &format!("{}/:id", path),
            get(view::<E>).put(update::<E>).delete(remove::<E>),
        )
        .route(&format!("{}/:id/basic", path), get(basic::<E>))
}

/// Read-only surface for seeded lookups
fn read_only<E: Entity + QueryFields>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, get(list::<E>).post(reject_write::<E>))
        .route(
            &format!("{}/:id", path),
            get(view::<E>)
                .put(reject_write::<E>)
                .delete(reject_write::<E>),
        )
        .route(&format!("{}/:id/basic", path), get(basic::<E>))
}

/// Every collection, relation list and the health check
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(writable::<Location>("/locations"))
        .merge(writable::<Employee>("/employees"))
        .merge(writable::<Management>("/managements"))
        .merge(writable::<Dish>("/dishes"))
        .merge(writable::<MenuItem>("/menu-items"))
        .merge(writable::<DishRequirement>("/dish-requirements"))
        .merge(writable::<Supplier>("/suppliers"))
        .merge(writable::<SupplyCategory>("/supply-categories"))
        .merge(writable::<SupplierStock>("/supplier-stocks"))
        .merge(writable::<SupplyLink>("/supply-links"))
        .merge(read_only::<Menu>("/menus"))
        .merge(read_only::<Schedule>("/schedules"))
        .merge(read_only::<Position>("/positions"))
        .merge(relations::relation_routes())
}
