use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Admin Router Module
///
/// Routes nested under '/admin'. The wrapping middleware layer authenticates; each
/// handler then checks its own allow-list (directory, inventory desk, casino desk,
/// NDA desk, dashboard), because the lists differ endpoint by endpoint rather than
/// being a single 'admin' bit.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Dashboard ---
        // GET /admin/stats
        // Counter set plus received withdrawal volume in USD.
        .route("/stats", get(handlers::analytics::get_stats))
        // GET /admin/trends?months=N
        // Monthly buckets over the last N calendar months.
        .route("/trends", get(handlers::analytics::get_trends))
        // --- Employee directory ---
        .route("/employees", get(handlers::employees::list_employees))
        // PATCH /admin/employees/{id}
        // Role escalation, firing, team moves. Admin only.
        .route("/employees/{id}", patch(handlers::employees::update_employee))
        // --- Casino catalog maintenance ---
        .route("/casinos", post(handlers::casinos::create_casino))
        .route("/casinos/{id}", patch(handlers::casinos::update_casino))
        // --- Inventory desks ---
        .route(
            "/cards",
            get(handlers::inventory::list_cards).post(handlers::inventory::create_card),
        )
        .route("/cards/{id}", patch(handlers::inventory::update_card))
        .route(
            "/bank-accounts",
            get(handlers::inventory::list_bank_accounts)
                .post(handlers::inventory::create_bank_account),
        )
        .route(
            "/bank-accounts/{id}",
            patch(handlers::inventory::update_bank_account),
        )
        .route(
            "/paypal",
            get(handlers::inventory::list_paypal_accounts)
                .post(handlers::inventory::create_paypal_account),
        )
        .route("/paypal/{id}", patch(handlers::inventory::update_paypal_account))
        // --- NDA desk ---
        // POST /admin/nda mints the token-gated signing link; GET lists agreements.
        .route(
            "/nda",
            get(handlers::nda::list_ndas).post(handlers::nda::create_nda),
        )
        // --- Teams ---
        .route("/teams", post(handlers::teams::create_team))
        // POST /admin/teams/sync
        // Fires the database-side membership reconciliation routine.
        .route("/teams/sync", post(handlers::teams::sync_teams))
}
