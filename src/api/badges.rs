//! Badge ledger endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;
use uuid::Uuid;

use super::auth::AuthUser;
use super::validation::{validate_badge_key, validate_user_id};
use super::{ApiError, ApiResponse, AppState, AwardBadgeRequest, BadgeDto, StatusResponse};
use crate::services::BadgeError;

impl From<BadgeError> for ApiError {
    fn from(err: BadgeError) -> Self {
        match err {
            BadgeError::Database(msg) => Self::DatabaseError(msg),
            BadgeError::Internal(msg) => Self::internal(msg),
        }
    }
}

async fn badges_for(state: &AppState, user_id: Uuid) -> Result<Vec<BadgeDto>, ApiError> {
    Ok(state
        .badge_service()
        .grants_for_user(user_id)
        .await?
        .into_iter()
        .map(BadgeDto::from)
        .collect())
}

/// GET /users/me/badges
pub async fn my_badges(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<BadgeDto>>>, ApiError> {
    let user = state
        .user_service()
        .get_by_keycloak_id(&caller.keycloak_id)
        .await?;
    Ok(Json(ApiResponse::success(badges_for(&state, user.id).await?)))
}

/// GET /users/id/{id}/badges
pub async fn user_badges(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<BadgeDto>>>, ApiError> {
    let user_id = validate_user_id(&id)?;
    Ok(Json(ApiResponse::success(badges_for(&state, user_id).await?)))
}

/// POST /internal/badges/award
///
/// Repeated awards are acknowledged the same way as the first one.
pub async fn award(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AwardBadgeRequest>,
) -> Result<Json<ApiResponse<StatusResponse>>, ApiError> {
    let user_id = validate_user_id(&payload.user_id)?;
    let badge_key = validate_badge_key(&payload.badge_key)?;

    state.badge_service().award(user_id, badge_key).await?;

    Ok(Json(ApiResponse::success(StatusResponse { status: "ok" })))
}
