//! `/employees` route group.
//!
//! Each handler performs one store lookup and at most one write. Status
//! mapping mirrors the public contract, including two deliberate quirks: a
//! `null` update body is a 404 rather than a 400, and a delete without an id
//! is a successful 204.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use entity::Employee;
use platform_api::{ApiError, ApiResult};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::http::AppState;

pub fn routes() -> Router<AppState> {
    let collection = get(list_employees)
        .post(create_employee)
        .put(update_employee)
        .delete(delete_employee_by_query);
    Router::new()
        .route("/employees", collection.clone())
        .route("/employees/", collection)
        .route("/employees/{id}", get(get_employee).delete(delete_employee))
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/employees",
    tag = "employees",
    responses((status = 200, description = "Every stored employee", body = [Employee]))
)]
#[instrument(name = "employees.list", skip_all)]
pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<Employee>>> {
    let employees = state.store.list().await?;
    debug!(count = employees.len(), "listed employees");
    Ok(Json(employees))
}

#[utoipa::path(
    get,
    path = "/employees/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 200, description = "The employee", body = Employee),
        (status = 404, description = "No employee with this id")
    )
)]
#[instrument(name = "employees.get", skip(state))]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Json<Employee>> {
    let employee = state.store.find(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Json(employee))
}

#[utoipa::path(
    post,
    path = "/employees",
    tag = "employees",
    request_body = Employee,
    responses(
        (status = 201, description = "Employee created", body = Employee,
            headers(("Location" = String, description = "Path of the new record"))),
        (status = 500, description = "Store rejected the record, e.g. duplicate id")
    )
)]
#[instrument(name = "employees.create", skip_all)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(employee): Json<Employee>,
) -> ApiResult<impl IntoResponse> {
    debug!(id = employee.id, "creating employee");
    let created = state.store.insert(employee).await?;
    let location = format!("/employees/{}", created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

#[utoipa::path(
    put,
    path = "/employees",
    tag = "employees",
    request_body = Employee,
    responses(
        (status = 204, description = "Name updated"),
        (status = 404, description = "Body was null or no employee with this id")
    )
)]
#[instrument(name = "employees.update", skip_all)]
pub async fn update_employee(
    State(state): State<AppState>,
    Json(payload): Json<Option<Employee>>,
) -> ApiResult<StatusCode> {
    let Some(input) = payload else {
        return Err(ApiError::NotFound);
    };
    let mut employee = state
        .store
        .find(input.id)
        .await?
        .ok_or(ApiError::NotFound)?;
    // id is immutable once created
    employee.name = input.name;
    state.store.save(&employee).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/employees/{id}",
    tag = "employees",
    params(("id" = i32, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Deleted; body is the removed id", body = i32),
        (status = 404, description = "No employee with this id")
    )
)]
#[instrument(name = "employees.delete", skip(state))]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> ApiResult<Response> {
    remove_employee(&state, Some(id)).await
}

#[utoipa::path(
    delete,
    path = "/employees",
    tag = "employees",
    params(("id" = Option<i32>, Query, description = "Employee id; omitted means nothing to delete")),
    responses(
        (status = 200, description = "Deleted; body is the removed id", body = i32),
        (status = 204, description = "No id supplied"),
        (status = 404, description = "No employee with this id")
    )
)]
#[instrument(name = "employees.delete", skip(state))]
pub async fn delete_employee_by_query(
    State(state): State<AppState>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<Response> {
    remove_employee(&state, query.id).await
}

async fn remove_employee(state: &AppState, id: Option<i32>) -> ApiResult<Response> {
    let Some(id) = id else {
        return Ok(StatusCode::NO_CONTENT.into_response());
    };
    state.store.find(id).await?.ok_or(ApiError::NotFound)?;
    state.store.remove(id).await?;
    Ok((StatusCode::OK, Json(id)).into_response())
}
