use crate::{
    AppState,
    auth::{AuthUser, DIRECTORY, Role},
    error::ApiError,
    models::{EmployeeListResponse, EmployeeResponse, UpdateEmployeeRequest},
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

/// list_employees
///
/// [Admin Route] The employee directory: every record, including fired ones.
#[utoipa::path(
    get,
    path = "/admin/employees",
    responses(
        (status = 200, description = "All employees", body = EmployeeListResponse),
        (status = 403, description = "Not on the directory allow-list")
    )
)]
pub async fn list_employees(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<EmployeeListResponse>, ApiError> {
    user.require(DIRECTORY)?;
    let employees = state.repo.list_employees().await?;
    Ok(Json(EmployeeListResponse {
        success: true,
        employees,
    }))
}

/// update_employee
///
/// [Admin Route] Role escalation, firing, and team moves. Admin only; role and
/// status values are validated against the known string sets before hitting the
/// database.
#[utoipa::path(
    patch,
    path = "/admin/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Updated", body = EmployeeResponse),
        (status = 404, description = "No such employee")
    )
)]
pub async fn update_employee(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    user.require(&[Role::Admin])?;

    if let Some(role) = &payload.role {
        if Role::parse(role).is_none() {
            return Err(ApiError::BadRequest(format!("unknown role '{role}'")));
        }
    }
    if let Some(status) = &payload.status {
        if status != "active" && status != "fired" {
            return Err(ApiError::BadRequest(format!("unknown status '{status}'")));
        }
    }

    let employee = state
        .repo
        .update_employee(id, payload)
        .await?
        .ok_or(ApiError::NotFound("employee"))?;

    Ok(Json(EmployeeResponse {
        success: true,
        employee,
    }))
}
