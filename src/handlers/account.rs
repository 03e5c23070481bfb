use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{Employee, EmployeeResponse, RegisterRequest},
};
use axum::{Json, extract::State};
use serde::Deserialize;
use uuid::Uuid;

/// AuthSignupResponse
///
/// Minimal struct to deserialize the hosted auth provider's signup response,
/// capturing the newly created user's UUID.
#[derive(Deserialize)]
struct AuthSignupResponse {
    id: Uuid,
}

/// register_employee
///
/// [Public Route] Handles initial employee registration via the hosted auth provider.
///
/// *Flow*: calls the provider's signup endpoint, retrieves the canonical user UUID,
/// then mirrors it into the local `public.employees` table so the primary keys stay
/// synchronized. New employees always start as active juniors; only an admin
/// escalates roles afterwards.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = EmployeeResponse),
        (status = 400, description = "Provider rejected signup")
    )
)]
pub async fn register_employee(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::BadRequest("password is required".to_string()));
    }

    // Step 1: delegate credential handling to the hosted auth provider.
    let client = reqwest::Client::new();
    let signup_url = format!("{}/auth/v1/signup", state.config.auth_url);

    let response = client
        .post(signup_url)
        .header("apikey", &state.config.auth_api_key)
        .header("Content-Type", "application/json")
        .json(&serde_json::json!({ "email": payload.email, "password": payload.password }))
        .send()
        .await
        .map_err(|e| ApiError::Upstream(format!("auth provider unreachable: {e}")))?;

    if !response.status().is_success() {
        // Provider-side rejection (email taken, weak password).
        return Err(ApiError::BadRequest(
            "auth provider rejected the signup".to_string(),
        ));
    }

    // Step 2: extract the canonical user ID from the provider response.
    let signup = response
        .json::<AuthSignupResponse>()
        .await
        .map_err(|e| ApiError::Upstream(format!("bad auth provider response: {e}")))?;

    // Step 3: mirror the identity into the local employees table.
    let employee = state
        .repo
        .create_employee(Employee {
            id: signup.id,
            email: payload.email,
            role: "junior".to_string(),
            status: "active".to_string(),
            team_id: None,
            ..Employee::default()
        })
        .await?;

    Ok(Json(EmployeeResponse {
        success: true,
        employee,
    }))
}

/// get_me
///
/// [Authenticated Route] Returns the caller's own employee record. Also reachable by
/// fired employees: the record itself is the only place they can see that status.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = EmployeeResponse))
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let employee = state
        .repo
        .get_employee(id)
        .await?
        .ok_or(ApiError::NotFound("employee"))?;

    Ok(Json(EmployeeResponse {
        success: true,
        employee,
    }))
}
