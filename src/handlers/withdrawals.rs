use crate::{
    AppState,
    auth::{APPROVAL_CHAIN, AuthUser, FIELD_WORK, Role, SETTLEMENT},
    error::ApiError,
    models::{
        CreateWithdrawalRequest, ResolveWithdrawalRequest, Withdrawal, WithdrawalListResponse,
        WithdrawalResponse, WithdrawalView,
    },
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

/// The stage that follows each chain role's own. The cfo's approval closes the chain.
fn next_stage(role: Role) -> &'static str {
    match role {
        Role::Teamlead => "manager",
        Role::Manager => "hr",
        Role::Hr => "cfo",
        _ => "done",
    }
}

/// A guarded UPDATE affecting zero rows means either the row is gone or it is in
/// the wrong state; one extra lookup picks the right status code.
async fn conflict_or_missing(state: &AppState, id: Uuid, message: &str) -> ApiError {
    match state.repo.get_withdrawal(id).await {
        Ok(None) => ApiError::NotFound("withdrawal"),
        Ok(Some(_)) => ApiError::Conflict(message.to_string()),
        Err(e) => ApiError::Database(e),
    }
}

async fn view(state: &AppState, withdrawal: Withdrawal) -> WithdrawalView {
    let amount_usd = state
        .currency
        .convert_to_usd(withdrawal.amount, &withdrawal.currency)
        .await;
    WithdrawalView {
        withdrawal,
        amount_usd,
    }
}

/// create_withdrawal
///
/// [Authenticated Route] Opens a withdrawal request: status 'new', approval stage
/// 'teamlead'. The requester identity comes from the session.
#[utoipa::path(
    post,
    path = "/withdrawals",
    request_body = CreateWithdrawalRequest,
    responses(
        (status = 200, description = "Opened", body = WithdrawalResponse),
        (status = 403, description = "Not field-work staff")
    )
)]
pub async fn create_withdrawal(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateWithdrawalRequest>,
) -> Result<Json<WithdrawalResponse>, ApiError> {
    user.require(FIELD_WORK)?;
    if payload.amount <= 0.0 {
        return Err(ApiError::BadRequest("amount must be positive".to_string()));
    }
    if payload.currency.trim().is_empty() {
        return Err(ApiError::BadRequest("currency is required".to_string()));
    }

    let withdrawal = state.repo.create_withdrawal(payload, user.id).await?;
    let withdrawal = view(&state, withdrawal).await;
    Ok(Json(WithdrawalResponse {
        success: true,
        withdrawal,
    }))
}

/// list_withdrawals
///
/// [Authenticated Route] Role-scoped listing: field staff see their own requests, a
/// teamlead sees their team's, everyone above sees all. Amounts are echoed with
/// their USD conversion.
#[utoipa::path(
    get,
    path = "/withdrawals",
    responses((status = 200, description = "Scoped listing", body = WithdrawalListResponse))
)]
pub async fn list_withdrawals(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<WithdrawalListResponse>, ApiError> {
    user.require_active()?;

    let rows = match user.role {
        Role::Junior | Role::Tester => state.repo.list_withdrawals_for(user.id).await?,
        Role::Teamlead => match user.team_id {
            Some(team_id) => state.repo.list_withdrawals_for_team(team_id).await?,
            // A teamlead without a team sees only their own requests.
            None => state.repo.list_withdrawals_for(user.id).await?,
        },
        _ => state.repo.list_withdrawals_all().await?,
    };

    // One rate table for the whole listing.
    let rates = state.currency.rates().await;
    let withdrawals = rows
        .into_iter()
        .map(|w| {
            let amount_usd =
                crate::currency::CurrencyService::convert_with(&rates.rates, w.amount, &w.currency);
            WithdrawalView {
                withdrawal: w,
                amount_usd,
            }
        })
        .collect();

    Ok(Json(WithdrawalListResponse {
        success: true,
        withdrawals,
    }))
}

/// approve_withdrawal
///
/// [Authenticated Route] One chain step. The caller's role must equal the request's
/// current approval stage and the status must still be 'new'; both guards live in
/// the repository's WHERE clause, so a miss comes back as a 409. The final (cfo)
/// approval first consults the database-side `check_withdrawal_safe_v3`; an unsafe
/// verdict blocks the request instead of releasing it.
#[utoipa::path(
    post,
    path = "/withdrawals/{id}/approve",
    params(("id" = Uuid, Path, description = "Withdrawal ID")),
    responses(
        (status = 200, description = "Stage advanced", body = WithdrawalResponse),
        (status = 403, description = "Not a chain role"),
        (status = 409, description = "Not pending at the caller's stage, or flagged unsafe")
    )
)]
pub async fn approve_withdrawal(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WithdrawalResponse>, ApiError> {
    user.require(APPROVAL_CHAIN)?;

    let from_stage = user.role.as_str();
    let to_stage = next_stage(user.role);

    if to_stage == "done" {
        // Final release: the safety verdict comes from the database.
        let safe = state.repo.check_withdrawal_safe(id).await?;
        if !safe {
            state
                .repo
                .set_withdrawal_status(id, "new", "blocked")
                .await?;
            return Err(ApiError::Conflict(
                "withdrawal failed the safety check and was blocked".to_string(),
            ));
        }
    }

    let withdrawal = match state
        .repo
        .advance_withdrawal_stage(id, from_stage, to_stage, user.id)
        .await?
    {
        Some(w) => w,
        None => {
            return Err(conflict_or_missing(
                &state,
                id,
                "withdrawal is not pending at your approval stage",
            )
            .await);
        }
    };

    let withdrawal = view(&state, withdrawal).await;
    Ok(Json(WithdrawalResponse {
        success: true,
        withdrawal,
    }))
}

/// block_withdrawal
///
/// [Authenticated Route] Any chain role can block a request while it is still
/// pending. Blocking is terminal; there is no unblock path.
#[utoipa::path(
    post,
    path = "/withdrawals/{id}/block",
    params(("id" = Uuid, Path, description = "Withdrawal ID")),
    responses(
        (status = 200, description = "Blocked", body = WithdrawalResponse),
        (status = 409, description = "No longer pending")
    )
)]
pub async fn block_withdrawal(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WithdrawalResponse>, ApiError> {
    user.require(APPROVAL_CHAIN)?;

    let withdrawal = match state
        .repo
        .set_withdrawal_status(id, "new", "blocked")
        .await?
    {
        Some(w) => w,
        None => {
            return Err(conflict_or_missing(&state, id, "withdrawal is no longer pending").await);
        }
    };

    let withdrawal = view(&state, withdrawal).await;
    Ok(Json(WithdrawalResponse {
        success: true,
        withdrawal,
    }))
}

/// resolve_withdrawal
///
/// [Authenticated Route] Settlement of a released ('waiting') withdrawal: the money
/// either arrived ('received') or it did not ('problem').
#[utoipa::path(
    post,
    path = "/withdrawals/{id}/resolve",
    params(("id" = Uuid, Path, description = "Withdrawal ID")),
    request_body = ResolveWithdrawalRequest,
    responses(
        (status = 200, description = "Settled", body = WithdrawalResponse),
        (status = 403, description = "Not settlement staff"),
        (status = 409, description = "Not in 'waiting'")
    )
)]
pub async fn resolve_withdrawal(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ResolveWithdrawalRequest>,
) -> Result<Json<WithdrawalResponse>, ApiError> {
    user.require(SETTLEMENT)?;

    if payload.outcome != "received" && payload.outcome != "problem" {
        return Err(ApiError::BadRequest(format!(
            "outcome must be 'received' or 'problem', got '{}'",
            payload.outcome
        )));
    }

    let withdrawal = match state
        .repo
        .set_withdrawal_status(id, "waiting", &payload.outcome)
        .await?
    {
        Some(w) => w,
        None => {
            return Err(
                conflict_or_missing(&state, id, "withdrawal is not awaiting settlement").await,
            );
        }
    };

    let withdrawal = view(&state, withdrawal).await;
    Ok(Json(WithdrawalResponse {
        success: true,
        withdrawal,
    }))
}
