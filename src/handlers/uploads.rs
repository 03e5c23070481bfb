use crate::{
    AppState,
    auth::AuthUser,
    error::ApiError,
    models::{PresignedUrlRequest, PresignedUrlResponse},
};
use axum::{Json, extract::State};
use uuid::Uuid;

/// get_presigned_url
///
/// [Authenticated Route] Generates a temporary, secure URL for direct client-to-cloud
/// document upload (NDA scans, statements). The URL is short-lived, constrained to
/// the declared file type, and keyed under a fresh UUID so uploads never collide.
#[utoipa::path(
    post,
    path = "/upload/presigned",
    request_body = PresignedUrlRequest,
    responses(
        (status = 200, description = "Upload URL", body = PresignedUrlResponse),
        (status = 500, description = "Storage unavailable")
    )
)]
pub async fn get_presigned_url(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<PresignedUrlRequest>,
) -> Result<Json<PresignedUrlResponse>, ApiError> {
    user.require_active()?;
    if payload.filename.trim().is_empty() {
        return Err(ApiError::BadRequest("filename is required".to_string()));
    }

    // Structured object key: 'docs/UUID.ext'. Only the extension of the original
    // filename survives.
    let extension = std::path::Path::new(&payload.filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("bin");
    let object_key = format!("docs/{}.{}", Uuid::new_v4(), extension);

    let upload_url = state
        .storage
        .get_presigned_upload_url(&object_key, &payload.file_type)
        .await
        .map_err(ApiError::Upstream)?;

    Ok(Json(PresignedUrlResponse {
        success: true,
        upload_url,
        resource_key: object_key,
    }))
}
