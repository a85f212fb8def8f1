use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::clients::NotificationDispatcher;
use crate::config::Config;
use crate::services::{BadgeService, PasswordResetService, PreferencesService, UserService};
use crate::state::SharedState;

pub mod auth;
mod badges;
mod error;
mod observability;
mod preferences;
mod system;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

/// Multipart framing allowance on top of the photo size limit.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn notifications(&self) -> &Arc<NotificationDispatcher> {
        &self.shared.notifications
    }

    #[must_use]
    pub fn badge_service(&self) -> &Arc<dyn BadgeService> {
        &self.shared.badge_service
    }

    #[must_use]
    pub fn reset_service(&self) -> &Arc<dyn PasswordResetService> {
        &self.shared.reset_service
    }

    #[must_use]
    pub fn user_service(&self) -> &Arc<dyn UserService> {
        &self.shared.user_service
    }

    #[must_use]
    pub fn preferences_service(&self) -> &Arc<dyn PreferencesService> {
        &self.shared.preferences_service
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();

    let public_routes = Router::new()
        .route("/users/register", post(users::register))
        .route("/users/keycloak/{sub}", get(users::get_by_keycloak_id))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password))
        .route("/health", get(system::health))
        .route("/metrics", get(observability::get_metrics));

    let api_router = Router::new()
        .merge(public_routes)
        .merge(create_user_router(state.clone()))
        .merge(create_internal_router(state.clone()))
        .route_layer(middleware::from_fn(observability::logging_middleware))
        .with_state(state);

    let cors_layer = if cors_origins.contains(&"*".to_string()) {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    api_router
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
}

fn create_user_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let upload_limit = state.config().storage.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/users/me", put(users::update_me))
        .route("/users/{firstname}/{lastname}", get(users::get_public_info))
        .route("/users/id/{id}/badges", get(badges::user_badges))
        .route("/users/me/badges", get(badges::my_badges))
        .route(
            "/users/me/profile-photo",
            post(users::upload_profile_photo).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/users/me/profile-photo/url", get(users::profile_photo_url))
        .route(
            "/users/me/interests",
            get(preferences::get_interests).put(preferences::update_interests),
        )
        .route(
            "/users/me/discovery-preferences",
            get(preferences::get_discovery).put(preferences::update_discovery),
        )
        .route(
            "/users/me/notification-settings",
            get(preferences::get_notification_settings)
                .put(preferences::update_notification_settings),
        )
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::bearer_auth_middleware,
        ))
}

fn create_internal_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/internal/users/{email}", get(users::internal_get_by_email))
        .route(
            "/internal/users/{email}/notification-settings",
            get(preferences::internal_notification_settings),
        )
        .route(
            "/internal/users/{email}/interests",
            get(preferences::internal_interests),
        )
        .route(
            "/internal/users/{email}/discovery-preferences",
            get(preferences::internal_discovery),
        )
        .route("/internal/badges/award", post(badges::award))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::service_token_middleware,
        ))
}
