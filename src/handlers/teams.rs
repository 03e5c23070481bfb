use crate::{
    AppState,
    auth::{AuthUser, Role, TEAM_DESK, TEAM_VIEW},
    error::ApiError,
    models::{Ack, CreateTeamRequest, TeamListResponse, TeamResponse},
};
use axum::{Json, extract::State};

/// list_teams
///
/// [Authenticated Route] The team roster, for lead-capable roles.
#[utoipa::path(
    get,
    path = "/teams",
    responses((status = 200, description = "Teams", body = TeamListResponse))
)]
pub async fn list_teams(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<TeamListResponse>, ApiError> {
    user.require(TEAM_VIEW)?;
    let teams = state.repo.list_teams().await?;
    Ok(Json(TeamListResponse {
        success: true,
        teams,
    }))
}

/// create_team
///
/// [Admin Route] Creates a team, optionally with its lead. Lead validity is checked
/// here; membership itself is reconciled database-side.
#[utoipa::path(
    post,
    path = "/admin/teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 200, description = "Created", body = TeamResponse),
        (status = 404, description = "Named lead does not exist")
    )
)]
pub async fn create_team(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateTeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    user.require(TEAM_DESK)?;
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }

    if let Some(lead_id) = payload.lead_id {
        state
            .repo
            .get_employee(lead_id)
            .await?
            .ok_or(ApiError::NotFound("employee"))?;
    }

    let team = state.repo.create_team(payload.name, payload.lead_id).await?;
    Ok(Json(TeamResponse {
        success: true,
        team,
    }))
}

/// sync_teams
///
/// [Admin Route] Triggers the database-side `manual_sync_teams` routine. The
/// reconciliation logic lives entirely in the database; this endpoint only fires it.
#[utoipa::path(
    post,
    path = "/admin/teams/sync",
    responses(
        (status = 200, description = "Sync triggered", body = Ack),
        (status = 403, description = "Admin only")
    )
)]
pub async fn sync_teams(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Ack>, ApiError> {
    user.require(&[Role::Admin])?;
    state.repo.sync_teams().await?;
    Ok(Json(Ack { success: true }))
}
