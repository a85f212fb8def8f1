//! Domain service for per-user preferences: notification channels,
//! discovery radius and sector interests.

use thiserror::Error;

use crate::models::{
    DiscoveryPreferences, InterestUpdate, InterestValue, NotificationSettings,
    NotificationSettingsPatch,
};

#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for PreferencesError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for PreferencesError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait PreferencesService: Send + Sync {
    /// Stored settings, or freshly persisted defaults on first access.
    async fn notification_settings(
        &self,
        email: &str,
    ) -> Result<NotificationSettings, PreferencesError>;

    async fn update_notification_settings(
        &self,
        email: &str,
        patch: &NotificationSettingsPatch,
    ) -> Result<NotificationSettings, PreferencesError>;

    async fn discovery_preferences(
        &self,
        email: &str,
    ) -> Result<DiscoveryPreferences, PreferencesError>;

    async fn update_discovery_preferences(
        &self,
        email: &str,
        radius_km: i32,
    ) -> Result<DiscoveryPreferences, PreferencesError>;

    /// Every catalog interest with the user's flag, ordered by id.
    async fn interests(&self, email: &str) -> Result<Vec<InterestValue>, PreferencesError>;

    async fn update_interests(
        &self,
        email: &str,
        updates: &[InterestUpdate],
    ) -> Result<Vec<InterestValue>, PreferencesError>;
}
