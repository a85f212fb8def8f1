//! User directory endpoints: registration, profile, lookups and profile photo.

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::auth::AuthUser;
use super::{ApiError, ApiResponse, AppState, ProfilePhotoDto};
use crate::models::{ProfileUpdate, PublicUserInfo, User};
use crate::services::RegisterInput;

/// POST /users/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterInput>,
) -> Result<(StatusCode, Json<ApiResponse<User>>), ApiError> {
    let user = state.user_service().register(payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

/// GET /users/keycloak/{sub}
pub async fn get_by_keycloak_id(
    State(state): State<Arc<AppState>>,
    Path(sub): Path<String>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.user_service().get_by_keycloak_id(&sub).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// GET /users/{firstname}/{lastname}
pub async fn get_public_info(
    State(state): State<Arc<AppState>>,
    Path((first_name, last_name)): Path<(String, String)>,
) -> Result<Json<ApiResponse<PublicUserInfo>>, ApiError> {
    let info = state
        .user_service()
        .get_public_info_by_name(&first_name, &last_name)
        .await?;
    Ok(Json(ApiResponse::success(info)))
}

/// PUT /users/me
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .user_service()
        .update_profile(&caller.keycloak_id, &update)
        .await?;
    Ok(Json(ApiResponse::success(user)))
}

/// POST /users/me/profile-photo
///
/// Multipart body with a single `file` field.
pub async fn upload_profile_photo(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ProfilePhotoDto>>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::PayloadTooLarge(format!("Could not read file: {e}")))?;

        let url = state
            .user_service()
            .upload_profile_photo(&caller.keycloak_id, &content_type, bytes.to_vec())
            .await?;

        return Ok(Json(ApiResponse::success(ProfilePhotoDto { url })));
    }

    Err(ApiError::validation("file is required"))
}

/// GET /users/me/profile-photo/url
pub async fn profile_photo_url(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<ApiResponse<ProfilePhotoDto>>, ApiError> {
    let url = state
        .user_service()
        .presign_profile_photo(&caller.keycloak_id)
        .await?;
    Ok(Json(ApiResponse::success(ProfilePhotoDto { url })))
}

/// GET /internal/users/{email}
pub async fn internal_get_by_email(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.user_service().get_by_email(&email).await?;
    Ok(Json(ApiResponse::success(user)))
}
