use crate::{
    AppState,
    auth::{AuthUser, TASK_DESK},
    error::ApiError,
    models::{CreateTaskRequest, TaskListResponse, TaskResponse, UpdateTaskStatusRequest},
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

/// create_task
///
/// [Authenticated Route] Leads create and assign work items. The assignee must be a
/// real employee; the author is the session identity.
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Created", body = TaskResponse),
        (status = 404, description = "Assignee does not exist")
    )
)]
pub async fn create_task(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    user.require(TASK_DESK)?;
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    state
        .repo
        .get_employee(payload.assignee_id)
        .await?
        .ok_or(ApiError::NotFound("employee"))?;

    let task = state.repo.create_task(payload, user.id).await?;
    Ok(Json(TaskResponse {
        success: true,
        task,
    }))
}

/// list_tasks
///
/// [Authenticated Route] Every task in the system, for the task desk.
#[utoipa::path(
    get,
    path = "/tasks",
    responses((status = 200, description = "All tasks", body = TaskListResponse))
)]
pub async fn list_tasks(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<TaskListResponse>, ApiError> {
    user.require(TASK_DESK)?;
    let tasks = state.repo.list_tasks_all().await?;
    Ok(Json(TaskListResponse {
        success: true,
        tasks,
    }))
}

/// get_my_tasks
///
/// [Authenticated Route] The caller's assigned tasks.
#[utoipa::path(
    get,
    path = "/me/tasks",
    responses((status = 200, description = "My tasks", body = TaskListResponse))
)]
pub async fn get_my_tasks(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<TaskListResponse>, ApiError> {
    user.require_active()?;
    let tasks = state.repo.list_tasks_for(user.id).await?;
    Ok(Json(TaskListResponse {
        success: true,
        tasks,
    }))
}

/// update_task_status
///
/// [Authenticated Route] The assignee advances their task, forward only:
/// new -> in_progress -> done. Anything else is a conflict.
#[utoipa::path(
    patch,
    path = "/tasks/{id}/status",
    params(("id" = Uuid, Path, description = "Task ID")),
    request_body = UpdateTaskStatusRequest,
    responses(
        (status = 200, description = "Advanced", body = TaskResponse),
        (status = 403, description = "Not the assignee"),
        (status = 404, description = "No such task"),
        (status = 409, description = "Not a forward step")
    )
)]
pub async fn update_task_status(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaskStatusRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    user.require_active()?;

    let task = state
        .repo
        .get_task(id)
        .await?
        .ok_or(ApiError::NotFound("task"))?;

    if task.assignee_id != user.id {
        return Err(ApiError::Forbidden);
    }

    let allowed = matches!(
        (task.status.as_str(), payload.status.as_str()),
        ("new", "in_progress") | ("in_progress", "done")
    );
    if !allowed {
        return Err(ApiError::Conflict(format!(
            "cannot move task from '{}' to '{}'",
            task.status, payload.status
        )));
    }

    let task = state
        .repo
        .set_task_status(id, &payload.status)
        .await?
        .ok_or(ApiError::NotFound("task"))?;

    Ok(Json(TaskResponse {
        success: true,
        task,
    }))
}
