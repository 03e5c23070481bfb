use crate::{
    AppState,
    auth::{AuthUser, NDA_DESK},
    error::ApiError,
    models::{
        CreateNdaRequest, NdaCreatedResponse, NdaListResponse, NdaResponse, PresignedUrlRequest,
        PresignedUrlResponse, SignNdaRequest,
    },
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

/// create_nda
///
/// [Admin Route] HR opens an NDA agreement for an employee. The response carries the
/// token-gated public signing path, which is what actually gets mailed out.
#[utoipa::path(
    post,
    path = "/admin/nda",
    request_body = CreateNdaRequest,
    responses(
        (status = 200, description = "Created", body = NdaCreatedResponse),
        (status = 404, description = "No such employee")
    )
)]
pub async fn create_nda(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateNdaRequest>,
) -> Result<Json<NdaCreatedResponse>, ApiError> {
    user.require(NDA_DESK)?;
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::BadRequest("full_name is required".to_string()));
    }

    // The agreement must point at a real employee record.
    state
        .repo
        .get_employee(payload.employee_id)
        .await?
        .ok_or(ApiError::NotFound("employee"))?;

    let sign_token = Uuid::new_v4();
    let agreement = state
        .repo
        .create_nda(payload.employee_id, payload.full_name, sign_token)
        .await?;

    let sign_path = format!("/nda/sign/{sign_token}");
    Ok(Json(NdaCreatedResponse {
        success: true,
        agreement,
        sign_path,
    }))
}

/// list_ndas
///
/// [Admin Route] Every agreement, signed or still out.
#[utoipa::path(
    get,
    path = "/admin/nda",
    responses((status = 200, description = "Agreements", body = NdaListResponse))
)]
pub async fn list_ndas(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<NdaListResponse>, ApiError> {
    user.require(NDA_DESK)?;
    let agreements = state.repo.list_ndas().await?;
    Ok(Json(NdaListResponse {
        success: true,
        agreements,
    }))
}

/// get_nda_for_signing
///
/// [Public Route] Resolves the token-gated signing link. Only agreements still in
/// 'sent' resolve; a signed agreement's token is consumed, so this is a plain 404
/// afterwards.
#[utoipa::path(
    get,
    path = "/nda/sign/{token}",
    params(("token" = Uuid, Path, description = "Signing token")),
    responses(
        (status = 200, description = "Pending agreement", body = NdaResponse),
        (status = 404, description = "Unknown or consumed token")
    )
)]
pub async fn get_nda_for_signing(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
) -> Result<Json<NdaResponse>, ApiError> {
    let agreement = state
        .repo
        .get_nda_by_token(token)
        .await?
        .ok_or(ApiError::NotFound("agreement"))?;

    Ok(Json(NdaResponse {
        success: true,
        agreement,
    }))
}

/// get_nda_upload_url
///
/// [Public Route] The signer-side variant of the presigned upload flow. The sign
/// token stands in for a session: while the agreement is still 'sent', the holder
/// can obtain one short-lived URL to upload the signed scan.
#[utoipa::path(
    post,
    path = "/nda/sign/{token}/upload",
    params(("token" = Uuid, Path, description = "Signing token")),
    request_body = PresignedUrlRequest,
    responses(
        (status = 200, description = "Upload URL", body = PresignedUrlResponse),
        (status = 404, description = "Unknown or consumed token")
    )
)]
pub async fn get_nda_upload_url(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Json(payload): Json<PresignedUrlRequest>,
) -> Result<Json<PresignedUrlResponse>, ApiError> {
    // Token gate: only a pending agreement entitles the holder to storage access.
    state
        .repo
        .get_nda_by_token(token)
        .await?
        .ok_or(ApiError::NotFound("agreement"))?;

    let extension = std::path::Path::new(&payload.filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("pdf");
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

/// sign_nda
///
/// [Public Route] Completes the signing: the signer confirms their full name and
/// attaches the uploaded document's object key. The repository's `status = 'sent'`
/// guard makes a second attempt a 404.
#[utoipa::path(
    post,
    path = "/nda/sign/{token}",
    params(("token" = Uuid, Path, description = "Signing token")),
    request_body = SignNdaRequest,
    responses(
        (status = 200, description = "Signed", body = NdaResponse),
        (status = 404, description = "Unknown or consumed token")
    )
)]
pub async fn sign_nda(
    State(state): State<AppState>,
    Path(token): Path<Uuid>,
    Json(payload): Json<SignNdaRequest>,
) -> Result<Json<NdaResponse>, ApiError> {
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::BadRequest("full_name is required".to_string()));
    }
    if payload.document_key.trim().is_empty() {
        return Err(ApiError::BadRequest("document_key is required".to_string()));
    }

    let agreement = state
        .repo
        .sign_nda(token, payload.full_name, payload.document_key)
        .await?
        .ok_or(ApiError::NotFound("agreement"))?;

    Ok(Json(NdaResponse {
        success: true,
        agreement,
    }))
}
