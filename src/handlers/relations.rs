//! Derived lists over associated rows. All of them 404 when the parent
//! row is not live; list relations accept the usual query options.

use axum::{
    extract::{Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use std::collections::HashMap;

use super::common::success_response;
use crate::errors::ServiceError;
use crate::models::{
    Dish, DishRequirement, Employee, Location, Management, Menu, MenuItem, Supplier,
    SupplierStock, SupplyCategory, SupplyLink,
};
use crate::store::Column;
use crate::AppState;

type Params = Query<HashMap<String, String>>;

/// Employees working at a location
async fn location_employees(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Params,
) -> Result<Response, ServiceError> {
    let employees = state
        .service::<Location>()
        .dependents::<Employee>(id, Column::LocationId, &params)
        .await?;
    Ok(success_response(employees))
}

/// The location's management row, or `null`
async fn location_management(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let management = state
        .service::<Location>()
        .dependent::<Management>(id, Column::LocationId)
        .await?;
    Ok(success_response(management))
}

/// Suppliers delivering to a location
async fn location_suppliers(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Params,
) -> Result<Response, ServiceError> {
    let suppliers = state
        .service::<Location>()
        .linked::<SupplyLink, Supplier>(id, Column::LocationId, Column::SupplierId, &params)
        .await?;
    Ok(success_response(suppliers))
}

/// The management row naming this employee as manager, or `null`
async fn employee_management(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, ServiceError> {
    let management = state
        .service::<Employee>()
        .dependent::<Management>(id, Column::ManagerId)
        .await?;
    Ok(success_response(management))
}

async fn dish_menus(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Params,
) -> Result<Response, ServiceError> {
    let menus = state
        .service::<Dish>()
        .linked::<MenuItem, Menu>(id, Column::DishId, Column::MenuId, &params)
        .await?;
    Ok(success_response(menus))
}

/// Supply categories a dish needs
async fn dish_requirements(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Params,
) -> Result<Response, ServiceError> {
    let categories = state
        .service::<Dish>()
        .linked::<DishRequirement, SupplyCategory>(
            id,
            Column::DishId,
            Column::SupplyCategoryId,
            &params,
        )
        .await?;
    Ok(success_response(categories))
}

/// Supply categories a supplier stocks
async fn supplier_categories(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Params,
) -> Result<Response, ServiceError> {
    let categories = state
        .service::<Supplier>()
        .linked::<SupplierStock, SupplyCategory>(
            id,
            Column::SupplierId,
            Column::SupplyCategoryId,
            &params,
        )
        .await?;
    Ok(success_response(categories))
}

async fn supplier_locations(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Params,
) -> Result<Response, ServiceError> {
    let locations = state
        .service::<Supplier>()
        .linked::<SupplyLink, Location>(id, Column::SupplierId, Column::LocationId, &params)
        .await?;
    Ok(success_response(locations))
}

/// Suppliers stocking a category
async fn category_suppliers(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Params,
) -> Result<Response, ServiceError> {
    let suppliers = state
        .service::<SupplyCategory>()
        .linked::<SupplierStock, Supplier>(id, Column::SupplyCategoryId, Column::SupplierId, &params)
        .await?;
    Ok(success_response(suppliers))
}

/// Dishes requiring a category
async fn category_dishes(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Params,
) -> Result<Response, ServiceError> {
    let dishes = state
        .service::<SupplyCategory>()
        .linked::<DishRequirement, Dish>(id, Column::SupplyCategoryId, Column::DishId, &params)
        .await?;
    Ok(success_response(dishes))
}

async fn menu_dishes(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Params,
) -> Result<Response, ServiceError> {
    let dishes = state
        .service::<Menu>()
        .linked::<MenuItem, Dish>(id, Column::MenuId, Column::DishId, &params)
        .await?;
    Ok(success_response(dishes))
}

pub fn relation_routes() -> Router<AppState> {
    Router::new()
        .route("/locations/:id/employees", get(location_employees))
        .route("/locations/:id/management", get(location_management))
        .route("/locations/:id/suppliers", get(location_suppliers))
        .route("/employees/:id/management", get(employee_management))
        .route("/dishes/:id/menus", get(dish_menus))
        .route("/dishes/:id/requirements", get(dish_requirements))
        .route("/suppliers/:id/categories", get(supplier_categories))
        .route("/suppliers/:id/locations", get(supplier_locations))
        .route("/supply-categories/:id/suppliers", get(category_suppliers))
        .route("/supply-categories/:id/dishes", get(category_dishes))
        .route("/menus/:id/dishes", get(menu_dishes))
}
