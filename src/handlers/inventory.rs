use crate::{
    AppState,
    auth::{AuthUser, INVENTORY_DESK},
    error::ApiError,
    models::{
        BankAccountListResponse, BankAccountResponse, CardListResponse, CardResponse,
        CreateBankAccountRequest, CreateCardRequest, CreatePaypalRequest, PaypalListResponse,
        PaypalResponse, UpdateBankAccountRequest, UpdateCardRequest, UpdatePaypalRequest,
    },
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

const CARD_STATUSES: [&str; 3] = ["free", "assigned", "blocked"];
const PAYPAL_STATUSES: [&str; 4] = ["free", "assigned", "blocked", "dead"];

// --- Cards ---

/// list_cards
///
/// [Admin Route] Full card inventory for the custody desk.
#[utoipa::path(
    get,
    path = "/admin/cards",
    responses((status = 200, description = "Inventory", body = CardListResponse))
)]
pub async fn list_cards(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<CardListResponse>, ApiError> {
    user.require(INVENTORY_DESK)?;
    let cards = state.repo.list_cards().await?;
    Ok(Json(CardListResponse {
        success: true,
        cards,
    }))
}

/// get_my_cards
///
/// [Authenticated Route] Cards currently held by the caller. This is all a junior
/// ever sees of the inventory.
#[utoipa::path(
    get,
    path = "/me/cards",
    responses((status = 200, description = "My cards", body = CardListResponse))
)]
pub async fn get_my_cards(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<CardListResponse>, ApiError> {
    user.require_active()?;
    let cards = state.repo.list_my_cards(user.id).await?;
    Ok(Json(CardListResponse {
        success: true,
        cards,
    }))
}

/// create_card
///
/// [Admin Route] Registers a card. Only the masked PAN ever reaches this service.
#[utoipa::path(
    post,
    path = "/admin/cards",
    request_body = CreateCardRequest,
    responses((status = 200, description = "Created", body = CardResponse))
)]
pub async fn create_card(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateCardRequest>,
) -> Result<Json<CardResponse>, ApiError> {
    user.require(INVENTORY_DESK)?;
    if payload.masked_pan.trim().is_empty() {
        return Err(ApiError::BadRequest("masked_pan is required".to_string()));
    }
    if payload.bank.trim().is_empty() {
        return Err(ApiError::BadRequest("bank is required".to_string()));
    }

    let card = state.repo.create_card(payload).await?;
    Ok(Json(CardResponse {
        success: true,
        card,
    }))
}

/// update_card
///
/// [Admin Route] Assignment and blocking. Assigning requires a holder; the status
/// strings are validated against the card lifecycle set.
#[utoipa::path(
    patch,
    path = "/admin/cards/{id}",
    params(("id" = Uuid, Path, description = "Card ID")),
    request_body = UpdateCardRequest,
    responses(
        (status = 200, description = "Updated", body = CardResponse),
        (status = 404, description = "No such card")
    )
)]
pub async fn update_card(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCardRequest>,
) -> Result<Json<CardResponse>, ApiError> {
    user.require(INVENTORY_DESK)?;

    if let Some(status) = &payload.status {
        if !CARD_STATUSES.contains(&status.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "unknown card status '{status}'"
            )));
        }
        if status == "assigned" && payload.holder_id.is_none() {
            return Err(ApiError::BadRequest(
                "holder_id is required when assigning".to_string(),
            ));
        }
    }

    let card = state
        .repo
        .update_card(id, payload)
        .await?
        .ok_or(ApiError::NotFound("card"))?;

    Ok(Json(CardResponse {
        success: true,
        card,
    }))
}

// --- Bank accounts ---

/// list_bank_accounts
#[utoipa::path(
    get,
    path = "/admin/bank-accounts",
    responses((status = 200, description = "Inventory", body = BankAccountListResponse))
)]
pub async fn list_bank_accounts(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<BankAccountListResponse>, ApiError> {
    user.require(INVENTORY_DESK)?;
    let accounts = state.repo.list_bank_accounts().await?;
    Ok(Json(BankAccountListResponse {
        success: true,
        accounts,
    }))
}

/// get_my_bank_accounts
#[utoipa::path(
    get,
    path = "/me/bank-accounts",
    responses((status = 200, description = "My accounts", body = BankAccountListResponse))
)]
pub async fn get_my_bank_accounts(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<BankAccountListResponse>, ApiError> {
    user.require_active()?;
    let accounts = state.repo.list_my_bank_accounts(user.id).await?;
    Ok(Json(BankAccountListResponse {
        success: true,
        accounts,
    }))
}

/// create_bank_account
#[utoipa::path(
    post,
    path = "/admin/bank-accounts",
    request_body = CreateBankAccountRequest,
    responses((status = 200, description = "Created", body = BankAccountResponse))
)]
pub async fn create_bank_account(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateBankAccountRequest>,
) -> Result<Json<BankAccountResponse>, ApiError> {
    user.require(INVENTORY_DESK)?;
    if payload.iban.trim().is_empty() {
        return Err(ApiError::BadRequest("iban is required".to_string()));
    }
    if payload.bank.trim().is_empty() {
        return Err(ApiError::BadRequest("bank is required".to_string()));
    }

    let account = state.repo.create_bank_account(payload).await?;
    Ok(Json(BankAccountResponse {
        success: true,
        account,
    }))
}

/// update_bank_account
///
/// Same lifecycle and gates as cards.
#[utoipa::path(
    patch,
    path = "/admin/bank-accounts/{id}",
    params(("id" = Uuid, Path, description = "Bank account ID")),
    request_body = UpdateBankAccountRequest,
    responses(
        (status = 200, description = "Updated", body = BankAccountResponse),
        (status = 404, description = "No such account")
    )
)]
pub async fn update_bank_account(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBankAccountRequest>,
) -> Result<Json<BankAccountResponse>, ApiError> {
    user.require(INVENTORY_DESK)?;

    if let Some(status) = &payload.status {
        if !CARD_STATUSES.contains(&status.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "unknown account status '{status}'"
            )));
        }
        if status == "assigned" && payload.holder_id.is_none() {
            return Err(ApiError::BadRequest(
                "holder_id is required when assigning".to_string(),
            ));
        }
    }

    let account = state
        .repo
        .update_bank_account(id, payload)
        .await?
        .ok_or(ApiError::NotFound("bank account"))?;

    Ok(Json(BankAccountResponse {
        success: true,
        account,
    }))
}

// --- PayPal accounts ---

/// list_paypal_accounts
#[utoipa::path(
    get,
    path = "/admin/paypal",
    responses((status = 200, description = "Inventory", body = PaypalListResponse))
)]
pub async fn list_paypal_accounts(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PaypalListResponse>, ApiError> {
    user.require(INVENTORY_DESK)?;
    let accounts = state.repo.list_paypal_accounts().await?;
    Ok(Json(PaypalListResponse {
        success: true,
        accounts,
    }))
}

/// get_my_paypal_accounts
#[utoipa::path(
    get,
    path = "/me/paypal",
    responses((status = 200, description = "My accounts", body = PaypalListResponse))
)]
pub async fn get_my_paypal_accounts(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PaypalListResponse>, ApiError> {
    user.require_active()?;
    let accounts = state.repo.list_my_paypal_accounts(user.id).await?;
    Ok(Json(PaypalListResponse {
        success: true,
        accounts,
    }))
}

/// create_paypal_account
#[utoipa::path(
    post,
    path = "/admin/paypal",
    request_body = CreatePaypalRequest,
    responses((status = 200, description = "Created", body = PaypalResponse))
)]
pub async fn create_paypal_account(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePaypalRequest>,
) -> Result<Json<PaypalResponse>, ApiError> {
    user.require(INVENTORY_DESK)?;
    if payload.email.trim().is_empty() {
        return Err(ApiError::BadRequest("email is required".to_string()));
    }

    let account = state.repo.create_paypal_account(payload).await?;
    Ok(Json(PaypalResponse {
        success: true,
        account,
    }))
}

/// update_paypal_account
///
/// PayPal adds a terminal 'dead' state to the usual lifecycle (provider-side bans).
#[utoipa::path(
    patch,
    path = "/admin/paypal/{id}",
    params(("id" = Uuid, Path, description = "PayPal account ID")),
    request_body = UpdatePaypalRequest,
    responses(
        (status = 200, description = "Updated", body = PaypalResponse),
        (status = 404, description = "No such account")
    )
)]
pub async fn update_paypal_account(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaypalRequest>,
) -> Result<Json<PaypalResponse>, ApiError> {
    user.require(INVENTORY_DESK)?;

    if let Some(status) = &payload.status {
        if !PAYPAL_STATUSES.contains(&status.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "unknown paypal status '{status}'"
            )));
        }
        if status == "assigned" && payload.holder_id.is_none() {
            return Err(ApiError::BadRequest(
                "holder_id is required when assigning".to_string(),
            ));
        }
    }

    let account = state
        .repo
        .update_paypal_account(id, payload)
        .await?
        .ok_or(ApiError::NotFound("paypal account"))?;

    Ok(Json(PaypalResponse {
        success: true,
        account,
    }))
}
