use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, patch, post},
};

/// Authenticated Router Module
///
/// Routes accessible to any employee who passed the authentication layer. Role
/// gating happens inside each handler against its allow-list; the layer above this
/// module only guarantees that a validated `AuthUser` exists. Fired employees
/// authenticate but fail every gate except reading their own profile.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Profile & personal scopes ---
        // GET /me
        // The caller's own employee record.
        .route("/me", get(handlers::account::get_me))
        // GET /me/tests, /me/cards, /me/bank-accounts, /me/paypal, /me/tasks
        // Everything currently attached to the caller.
        .route("/me/tests", get(handlers::casino_tests::get_my_tests))
        .route("/me/cards", get(handlers::inventory::get_my_cards))
        .route(
            "/me/bank-accounts",
            get(handlers::inventory::get_my_bank_accounts),
        )
        .route("/me/paypal", get(handlers::inventory::get_my_paypal_accounts))
        .route("/me/tasks", get(handlers::tasks::get_my_tasks))
        // --- Casino catalog & test sessions ---
        // GET /casinos
        // The catalog, readable by every active employee.
        .route("/casinos", get(handlers::casinos::list_casinos))
        // POST /tests (field staff) / GET /tests (oversight roles)
        .route(
            "/tests",
            post(handlers::casino_tests::log_test).get(handlers::casino_tests::get_all_tests),
        )
        // PATCH /tests/{id}
        // Owner records the session result while it is still open.
        .route("/tests/{id}", patch(handlers::casino_tests::update_test))
        // --- Withdrawal chain ---
        // POST /withdrawals (open) / GET /withdrawals (role-scoped listing)
        .route(
            "/withdrawals",
            post(handlers::withdrawals::create_withdrawal)
                .get(handlers::withdrawals::list_withdrawals),
        )
        // POST /withdrawals/{id}/approve
        // One chain step; the caller's role must match the pending stage.
        .route(
            "/withdrawals/{id}/approve",
            post(handlers::withdrawals::approve_withdrawal),
        )
        // POST /withdrawals/{id}/block
        .route(
            "/withdrawals/{id}/block",
            post(handlers::withdrawals::block_withdrawal),
        )
        // POST /withdrawals/{id}/resolve
        // Settlement: 'received' or 'problem'.
        .route(
            "/withdrawals/{id}/resolve",
            post(handlers::withdrawals::resolve_withdrawal),
        )
        // --- Tasks & teams ---
        // POST /tasks (task desk) / GET /tasks (task desk)
        .route(
            "/tasks",
            post(handlers::tasks::create_task).get(handlers::tasks::list_tasks),
        )
        // PATCH /tasks/{id}/status
        // Assignee advances the task, forward only.
        .route("/tasks/{id}/status", patch(handlers::tasks::update_task_status))
        // GET /teams
        .route("/teams", get(handlers::teams::list_teams))
        // --- Utilities ---
        // GET /rates
        // The USD conversion table in effect.
        .route("/rates", get(handlers::analytics::get_rates))
        // POST /upload/presigned
        // Short-lived direct-to-storage upload URL for documents.
        .route("/upload/presigned", post(handlers::uploads::get_presigned_url))
}
