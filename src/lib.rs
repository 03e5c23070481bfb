use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod currency;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod storage;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the binary entry point and the tests.
pub use config::AppConfig;
pub use currency::{CurrencyService, CurrencyState};
pub use repository::{PostgresRepository, RepositoryState};
pub use storage::{MockStorageService, S3StorageClient, StorageState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation for the application, aggregating every
/// handler decorated with `#[utoipa::path]` and every schema referenced in a
/// request/response body. Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::account::register_employee, handlers::account::get_me,
        handlers::employees::list_employees, handlers::employees::update_employee,
        handlers::casinos::list_casinos, handlers::casinos::create_casino,
        handlers::casinos::update_casino,
        handlers::casino_tests::log_test, handlers::casino_tests::get_my_tests,
        handlers::casino_tests::get_all_tests, handlers::casino_tests::update_test,
        handlers::inventory::list_cards, handlers::inventory::get_my_cards,
        handlers::inventory::create_card, handlers::inventory::update_card,
        handlers::inventory::list_bank_accounts, handlers::inventory::get_my_bank_accounts,
        handlers::inventory::create_bank_account, handlers::inventory::update_bank_account,
        handlers::inventory::list_paypal_accounts, handlers::inventory::get_my_paypal_accounts,
        handlers::inventory::create_paypal_account, handlers::inventory::update_paypal_account,
        handlers::withdrawals::create_withdrawal, handlers::withdrawals::list_withdrawals,
        handlers::withdrawals::approve_withdrawal, handlers::withdrawals::block_withdrawal,
        handlers::withdrawals::resolve_withdrawal,
        handlers::nda::create_nda, handlers::nda::list_ndas,
        handlers::nda::get_nda_for_signing, handlers::nda::sign_nda,
        handlers::nda::get_nda_upload_url,
        handlers::teams::list_teams, handlers::teams::create_team, handlers::teams::sync_teams,
        handlers::tasks::create_task, handlers::tasks::list_tasks,
        handlers::tasks::get_my_tasks, handlers::tasks::update_task_status,
        handlers::analytics::get_stats, handlers::analytics::get_trends,
        handlers::analytics::get_rates,
        handlers::uploads::get_presigned_url
    ),
    components(
        schemas(
            models::Employee, models::Casino, models::CasinoTest, models::Card,
            models::BankAccount, models::PaypalAccount, models::Withdrawal,
            models::NdaAgreement, models::Team, models::Task,
            models::RegisterRequest, models::UpdateEmployeeRequest,
            models::CreateCasinoRequest, models::UpdateCasinoRequest,
            models::CreateTestRequest, models::UpdateTestRequest,
            models::CreateCardRequest, models::UpdateCardRequest,
            models::CreateBankAccountRequest, models::UpdateBankAccountRequest,
            models::CreatePaypalRequest, models::UpdatePaypalRequest,
            models::CreateWithdrawalRequest, models::ResolveWithdrawalRequest,
            models::CreateNdaRequest, models::SignNdaRequest,
            models::CreateTeamRequest, models::CreateTaskRequest,
            models::UpdateTaskStatusRequest, models::PresignedUrlRequest,
            models::PresignedUrlResponse, models::Ack,
            models::EmployeeResponse, models::EmployeeListResponse,
            models::CasinoResponse, models::CasinoListResponse,
            models::TestResponse, models::TestListResponse,
            models::CardResponse, models::CardListResponse,
            models::BankAccountResponse, models::BankAccountListResponse,
            models::PaypalResponse, models::PaypalListResponse,
            models::WithdrawalView, models::WithdrawalResponse,
            models::WithdrawalListResponse,
            models::NdaCreatedResponse, models::NdaResponse, models::NdaListResponse,
            models::TeamResponse, models::TeamListResponse,
            models::TaskResponse, models::TaskListResponse,
            models::DashboardStats, models::StatsResponse,
            models::MonthTrend, models::TrendsResponse, models::RatesResponse,
        )
    ),
    tags(
        (name = "ops-portal", description = "Internal Operations API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The Unified State Pattern: a single, thread-safe, immutable container holding all
/// application services and configuration, shared across all incoming requests.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: abstracts database access via the PgPool connection.
    pub repo: RepositoryState,
    /// Storage Layer: abstracts object-store access and presigned URL generation.
    pub storage: StorageState,
    /// Currency Layer: conversion table cache and fallback.
    pub currency: CurrencyState,
    /// Configuration: the loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These allow handlers and extractors to pull individual components from the shared
// AppState.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for StorageState {
    fn from_ref(app_state: &AppState) -> StorageState {
        app_state.storage.clone()
    }
}

impl FromRef<AppState> for CurrencyState {
    fn from_ref(app_state: &AppState) -> CurrencyState {
        app_state.currency.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces authentication for the authenticated route set. `AuthUser` implements
/// FromRequestParts, so a failed extraction (bad JWT, unknown employee) rejects the
/// request with 401 before the handler runs; a successful one lets the request
/// proceed, and the handler re-extracts the identity for its own role gate.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and scoped
/// middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Authenticated routes: protected by the auth middleware.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Admin routes: nested under '/admin', same authentication layer; the
        // per-endpoint allow-list check happens inside each handler.
        .nest(
            "/admin",
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        // Apply the Unified State to all routes.
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: the request/response lifecycle in a tracing
                // span correlated by the generated request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer (applied last).
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes TraceLayer span creation: extracts the `x-request-id` header (if
/// present) and includes it in the structured logging metadata alongside the HTTP
/// method and URI, so every log line for a single request is correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
