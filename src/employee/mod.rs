//! Mock employee backend.
//!
//! The routed application that sits behind the rate limiting middleware.

mod model;
mod store;

pub use model::{CreateEmployeeInput, DeleteEmployeeInput, Employee};
pub use store::EmployeeStore;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::http::{ApiResponse, ErrorResponse};

/// Base path of the employee routes.
pub const EMPLOYEE_BASE_PATH: &str = "/api/v1/employee";

const TOP_EARNER_COUNT: usize = 10;
const DELETED_MESSAGE: &str = "Employee deleted successfully";

/// Errors surfaced by the employee handlers.
#[derive(Error, Debug)]
pub enum EmployeeError {
    #[error("Employee not found: {0}")]
    NotFound(String),

    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl IntoResponse for EmployeeError {
    fn into_response(self) -> Response {
        match self {
            EmployeeError::NotFound(_) => ErrorResponse::new(
                StatusCode::NOT_FOUND,
                "Employee not found",
                "The requested employee could not be found",
            )
            .into_response(),
            EmployeeError::Validation(field_errors) => ErrorResponse::new(
                StatusCode::BAD_REQUEST,
                "Validation failed",
                "Please check the provided data and try again",
            )
            .with_field_errors(field_errors)
            .into_response(),
            EmployeeError::InvalidBody(reason) => {
                ErrorResponse::new(StatusCode::BAD_REQUEST, "Invalid request body", reason)
                    .into_response()
            }
        }
    }
}

/// Build the employee router.
pub fn router(store: Arc<EmployeeStore>) -> Router {
    Router::new()
        .route(
            EMPLOYEE_BASE_PATH,
            get(list_employees).post(create_employee).delete(delete_employee),
        )
        .route(
            &format!("{}/search/:search", EMPLOYEE_BASE_PATH),
            get(search_employees),
        )
        .route(
            &format!("{}/highestSalary", EMPLOYEE_BASE_PATH),
            get(highest_salary),
        )
        .route(
            &format!("{}/topTenHighestEarningEmployeeNames", EMPLOYEE_BASE_PATH),
            get(top_earner_names),
        )
        .route(
            &format!("{}/:id", EMPLOYEE_BASE_PATH),
            get(get_employee).delete(delete_employee_by_id),
        )
        .with_state(store)
}

async fn list_employees(State(store): State<Arc<EmployeeStore>>) -> ApiResponse<Vec<Employee>> {
    let employees = store.list();
    debug!(count = employees.len(), "Listing employees");
    ApiResponse::handled(employees)
}

async fn search_employees(
    State(store): State<Arc<EmployeeStore>>,
    Path(search): Path<String>,
) -> ApiResponse<Vec<Employee>> {
    let employees = store.search_by_name(&search);
    debug!(matches = employees.len(), "Searched employees by name");
    ApiResponse::handled(employees)
}

async fn highest_salary(State(store): State<Arc<EmployeeStore>>) -> ApiResponse<u32> {
    ApiResponse::handled(store.highest_salary())
}

async fn top_earner_names(State(store): State<Arc<EmployeeStore>>) -> ApiResponse<Vec<String>> {
    ApiResponse::handled(store.top_earner_names(TOP_EARNER_COUNT))
}

async fn get_employee(
    State(store): State<Arc<EmployeeStore>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Employee>, EmployeeError> {
    let employee = Uuid::parse_str(&id)
        .ok()
        .and_then(|uuid| store.get(&uuid))
        .ok_or(EmployeeError::NotFound(id))?;
    Ok(ApiResponse::handled(employee))
}

async fn create_employee(
    State(store): State<Arc<EmployeeStore>>,
    payload: Result<Json<CreateEmployeeInput>, JsonRejection>,
) -> Result<ApiResponse<Employee>, EmployeeError> {
    let Json(input) = payload.map_err(|e| EmployeeError::InvalidBody(e.body_text()))?;
    input.validate().map_err(EmployeeError::Validation)?;

    let employee = store.create(&input);
    info!(id = %employee.id, "Employee created");
    Ok(ApiResponse::handled(employee))
}

async fn delete_employee_by_id(
    State(store): State<Arc<EmployeeStore>>,
    Path(id): Path<String>,
) -> Result<ApiResponse<&'static str>, EmployeeError> {
    let removed = Uuid::parse_str(&id)
        .ok()
        .and_then(|uuid| store.delete_by_id(&uuid))
        .ok_or(EmployeeError::NotFound(id))?;
    info!(id = %removed.id, "Employee deleted");
    Ok(ApiResponse::handled(DELETED_MESSAGE))
}

async fn delete_employee(
    State(store): State<Arc<EmployeeStore>>,
    payload: Result<Json<DeleteEmployeeInput>, JsonRejection>,
) -> Result<ApiResponse<bool>, EmployeeError> {
    let Json(input) = payload.map_err(|e| EmployeeError::InvalidBody(e.body_text()))?;
    let deleted = store.delete_by_name(&input.name);
    info!(deleted = deleted, "Employee delete requested");
    Ok(ApiResponse::handled(deleted))
}
