use crate::{
    AppState,
    auth::{AuthUser, CASINO_DESK},
    error::ApiError,
    models::{CasinoListResponse, CasinoResponse, CreateCasinoRequest, UpdateCasinoRequest},
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

const CASINO_STATUSES: [&str; 3] = ["working", "blocked", "checking"];

/// list_casinos
///
/// [Authenticated Route] The casino catalog, visible to every active employee.
#[utoipa::path(
    get,
    path = "/casinos",
    responses((status = 200, description = "Catalog", body = CasinoListResponse))
)]
pub async fn list_casinos(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<CasinoListResponse>, ApiError> {
    user.require_active()?;
    let casinos = state.repo.list_casinos().await?;
    Ok(Json(CasinoListResponse {
        success: true,
        casinos,
    }))
}

/// create_casino
///
/// [Admin Route] Adds a catalog entry. New entries start in 'checking'.
#[utoipa::path(
    post,
    path = "/admin/casinos",
    request_body = CreateCasinoRequest,
    responses((status = 200, description = "Created", body = CasinoResponse))
)]
pub async fn create_casino(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCasinoRequest>,
) -> Result<Json<CasinoResponse>, ApiError> {
    user.require(CASINO_DESK)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    if payload.url.trim().is_empty() {
        return Err(ApiError::BadRequest("url is required".to_string()));
    }

    let casino = state.repo.create_casino(payload).await?;
    Ok(Json(CasinoResponse {
        success: true,
        casino,
    }))
}

/// update_casino
///
/// [Admin Route] Catalog maintenance: details or status ('working' | 'blocked' |
/// 'checking').
#[utoipa::path(
    patch,
    path = "/admin/casinos/{id}",
    params(("id" = Uuid, Path, description = "Casino ID")),
    request_body = UpdateCasinoRequest,
    responses(
        (status = 200, description = "Updated", body = CasinoResponse),
        (status = 404, description = "No such casino")
    )
)]
pub async fn update_casino(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCasinoRequest>,
) -> Result<Json<CasinoResponse>, ApiError> {
    user.require(CASINO_DESK)?;

    if let Some(status) = &payload.status {
        if !CASINO_STATUSES.contains(&status.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "unknown casino status '{status}'"
            )));
        }
    }

    let casino = state
        .repo
        .update_casino(id, payload)
        .await?
        .ok_or(ApiError::NotFound("casino"))?;

    Ok(Json(CasinoResponse {
        success: true,
        casino,
    }))
}
