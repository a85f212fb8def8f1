use axum::{
    Json,
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::clients::NotificationRequest;
use crate::models::TokenSet;
use crate::services::{ResetError, UserError};

/// Body returned by forgot-password regardless of whether the account exists.
pub const FORGOT_PASSWORD_MESSAGE: &str = "if the email exists, a reset link will be sent";

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub new_password: String,
}

/// Identity of the caller, attached by [`bearer_auth_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub keycloak_id: String,
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::Validation(msg) => Self::validation(msg),
            UserError::Conflict(msg) => Self::Conflict(msg),
            UserError::NotFound(msg) => Self::NotFound(msg),
            UserError::Unauthorized(msg) => Self::unauthorized(msg),
            UserError::Upstream(msg) => Self::identity_error(msg),
            UserError::Storage(msg) => Self::storage_error(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::internal(msg),
        }
    }
}

impl From<ResetError> for ApiError {
    fn from(err: ResetError) -> Self {
        match err {
            ResetError::TokenRequired => Self::validation("token and new_password are required"),
            ResetError::Validation(msg) => Self::validation(msg),
            ResetError::InvalidToken => Self::unauthorized(ResetError::InvalidToken.to_string()),
            ResetError::Upstream(msg) => Self::identity_error(msg),
            ResetError::Database(msg) => Self::DatabaseError(msg),
            ResetError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Middleware
// ============================================================================

/// Requires `Authorization: Bearer <access token>` accepted by the identity provider.
pub async fn bearer_auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let keycloak_id = state.user_service().authenticate(token).await?;

    tracing::Span::current().record("user_id", keycloak_id.as_str());
    request.extensions_mut().insert(AuthUser { keycloak_id });

    Ok(next.run(request).await)
}

/// Requires `X-Service-Token` to match the configured internal token.
/// An empty configured token rejects every call.
pub async fn service_token_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let expected = state.config().internal.service_token.as_str();
    let provided = headers
        .get("X-Service-Token")
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    if expected.is_empty() || !constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
        return Err(ApiError::unauthorized("Invalid service token"));
    }

    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<TokenSet>>, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("email and password are required"));
    }

    let tokens = state
        .user_service()
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(ApiResponse::success(tokens)))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<ApiResponse<TokenSet>>, ApiError> {
    let tokens = state.user_service().refresh(&payload.refresh_token).await?;
    Ok(Json(ApiResponse::success(tokens)))
}

/// POST /auth/forgot-password
///
/// Responds identically for known and unknown addresses. The raw token only
/// leaves the process through the notification service.
pub async fn forgot_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ApiError::validation("email is required"));
    }

    match state.reset_service().request_reset(&email).await {
        Ok(token) => state
            .notifications()
            .dispatch(NotificationRequest::password_reset(&email, &token)),
        Err(e) => warn!(error = %e, "Reset token could not be issued"),
    }

    Ok(Json(ApiResponse::success(MessageResponse::new(
        FORGOT_PASSWORD_MESSAGE,
    ))))
}

/// POST /auth/reset-password
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if payload.token.is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::validation("token and new_password are required"));
    }

    state
        .reset_service()
        .reset_password(&payload.token, &payload.new_password)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "password updated",
    ))))
}
