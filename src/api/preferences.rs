//! Notification, discovery and interest preferences.
//!
//! User-facing routes key on the caller's account email; internal routes take
//! the email from the path.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::auth::AuthUser;
use super::{
    ApiError, ApiResponse, AppState, DiscoveryPreferencesRequest, InterestsRequest,
};
use crate::models::{
    DiscoveryPreferences, InterestValue, NotificationSettingsPatch, NotificationSettingsView,
};
use crate::services::PreferencesError;

impl From<PreferencesError> for ApiError {
    fn from(err: PreferencesError) -> Self {
        match err {
            PreferencesError::Validation(msg) => Self::validation(msg),
            PreferencesError::NotFound(msg) => Self::NotFound(msg),
            PreferencesError::Database(msg) => Self::DatabaseError(msg),
            PreferencesError::Internal(msg) => Self::internal(msg),
        }
    }
}

async fn caller_email(state: &AppState, caller: &AuthUser) -> Result<String, ApiError> {
    Ok(state
        .user_service()
        .get_by_keycloak_id(&caller.keycloak_id)
        .await?
        .email)
}

/// GET /users/me/notification-settings
pub async fn get_notification_settings(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<ApiResponse<NotificationSettingsView>>, ApiError> {
    let email = caller_email(&state, &caller).await?;
    let settings = state.preferences_service().notification_settings(&email).await?;
    Ok(Json(ApiResponse::success(NotificationSettingsView::user_facing(
        &settings,
    ))))
}

/// PUT /users/me/notification-settings
pub async fn update_notification_settings(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(patch): Json<NotificationSettingsPatch>,
) -> Result<Json<ApiResponse<NotificationSettingsView>>, ApiError> {
    let email = caller_email(&state, &caller).await?;
    let settings = state
        .preferences_service()
        .update_notification_settings(&email, &patch)
        .await?;
    Ok(Json(ApiResponse::success(NotificationSettingsView::user_facing(
        &settings,
    ))))
}

/// GET /users/me/discovery-preferences
pub async fn get_discovery(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<ApiResponse<DiscoveryPreferences>>, ApiError> {
    let email = caller_email(&state, &caller).await?;
    let prefs = state.preferences_service().discovery_preferences(&email).await?;
    Ok(Json(ApiResponse::success(prefs)))
}

/// PUT /users/me/discovery-preferences
pub async fn update_discovery(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<DiscoveryPreferencesRequest>,
) -> Result<Json<ApiResponse<DiscoveryPreferences>>, ApiError> {
    let email = caller_email(&state, &caller).await?;
    let prefs = state
        .preferences_service()
        .update_discovery_preferences(&email, payload.radius_km)
        .await?;
    Ok(Json(ApiResponse::success(prefs)))
}

/// GET /users/me/interests
pub async fn get_interests(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<InterestValue>>>, ApiError> {
    let email = caller_email(&state, &caller).await?;
    let interests = state.preferences_service().interests(&email).await?;
    Ok(Json(ApiResponse::success(interests)))
}

/// PUT /users/me/interests
pub async fn update_interests(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(payload): Json<InterestsRequest>,
) -> Result<Json<ApiResponse<Vec<InterestValue>>>, ApiError> {
    let email = caller_email(&state, &caller).await?;
    let interests = state
        .preferences_service()
        .update_interests(&email, &payload.interests)
        .await?;
    Ok(Json(ApiResponse::success(interests)))
}

/// GET /internal/users/{email}/notification-settings
pub async fn internal_notification_settings(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<NotificationSettingsView>>, ApiError> {
    let settings = state
        .preferences_service()
        .notification_settings(email.trim())
        .await?;
    Ok(Json(ApiResponse::success(NotificationSettingsView::internal(
        &settings,
    ))))
}

/// GET /internal/users/{email}/interests
pub async fn internal_interests(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<Vec<InterestValue>>>, ApiError> {
    let interests = state.preferences_service().interests(email.trim()).await?;
    Ok(Json(ApiResponse::success(interests)))
}

/// GET /internal/users/{email}/discovery-preferences
pub async fn internal_discovery(
    State(state): State<Arc<AppState>>,
    Path(email): Path<String>,
) -> Result<Json<ApiResponse<DiscoveryPreferences>>, ApiError> {
    let prefs = state
        .preferences_service()
        .discovery_preferences(email.trim())
        .await?;
    Ok(Json(ApiResponse::success(prefs)))
}
