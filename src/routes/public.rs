use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints that are unauthenticated and accessible to any client. Besides the
/// health probe and the registration gateway, the only public surface is the NDA
/// signing flow, where possession of the sign token *is* the credential: the token
/// is a single-use UUID minted by HR and the repository stops resolving it the
/// moment the agreement is signed.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /register
        // New employee creation. Credentials go to the hosted auth provider; only
        // the mirrored employee row is written locally.
        .route("/register", post(handlers::account::register_employee))
        // GET /nda/sign/{token}
        // Resolves a pending agreement behind its signing token.
        // POST /nda/sign/{token}
        // Completes the signature and consumes the token.
        .route(
            "/nda/sign/{token}",
            get(handlers::nda::get_nda_for_signing).post(handlers::nda::sign_nda),
        )
        // POST /nda/sign/{token}/upload
        // Presigned upload URL for the signed scan, gated by the same token.
        .route(
            "/nda/sign/{token}/upload",
            post(handlers::nda::get_nda_upload_url),
        )
}
