//! `SeaORM` implementation of the `PreferencesService` trait.

use async_trait::async_trait;
use tracing::debug;

use crate::db::Store;
use crate::models::preferences::{
    DEFAULT_DISCOVERY_RADIUS_KM, MAX_DISCOVERY_RADIUS_KM, MIN_DISCOVERY_RADIUS_KM,
};
use crate::models::{
    DiscoveryPreferences, InterestUpdate, InterestValue, NotificationSettings,
    NotificationSettingsPatch,
};
use crate::services::preferences_service::{PreferencesError, PreferencesService};

pub struct SeaOrmPreferencesService {
    store: Store,
}

impl SeaOrmPreferencesService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PreferencesService for SeaOrmPreferencesService {
    async fn notification_settings(
        &self,
        email: &str,
    ) -> Result<NotificationSettings, PreferencesError> {
        if let Some(settings) = self.store.get_notification_settings(email).await? {
            return Ok(settings);
        }

        debug!("Creating default notification settings");
        Ok(self
            .store
            .upsert_notification_settings(&NotificationSettings::defaults_for(email))
            .await?)
    }

    async fn update_notification_settings(
        &self,
        email: &str,
        patch: &NotificationSettingsPatch,
    ) -> Result<NotificationSettings, PreferencesError> {
        patch.validate().map_err(PreferencesError::Validation)?;

        let mut settings = self.notification_settings(email).await?;
        settings.merge(patch);

        Ok(self.store.upsert_notification_settings(&settings).await?)
    }

    async fn discovery_preferences(
        &self,
        email: &str,
    ) -> Result<DiscoveryPreferences, PreferencesError> {
        Ok(self
            .store
            .get_discovery_preferences(email)
            .await?
            .unwrap_or_else(|| DiscoveryPreferences {
                email: email.to_string(),
                radius_km: DEFAULT_DISCOVERY_RADIUS_KM,
            }))
    }

    async fn update_discovery_preferences(
        &self,
        email: &str,
        radius_km: i32,
    ) -> Result<DiscoveryPreferences, PreferencesError> {
        if !(MIN_DISCOVERY_RADIUS_KM..=MAX_DISCOVERY_RADIUS_KM).contains(&radius_km) {
            return Err(PreferencesError::Validation(format!(
                "radius_km must be between {MIN_DISCOVERY_RADIUS_KM} and {MAX_DISCOVERY_RADIUS_KM}"
            )));
        }

        Ok(self
            .store
            .upsert_discovery_preferences(email, radius_km)
            .await?)
    }

    async fn interests(&self, email: &str) -> Result<Vec<InterestValue>, PreferencesError> {
        Ok(self.store.list_user_interests(email).await?)
    }

    async fn update_interests(
        &self,
        email: &str,
        updates: &[InterestUpdate],
    ) -> Result<Vec<InterestValue>, PreferencesError> {
        let known = self.store.list_interest_ids().await?;
        if let Some(unknown) = updates.iter().find(|u| !known.contains(&u.id)) {
            return Err(PreferencesError::NotFound(format!(
                "interest {} not found",
                unknown.id
            )));
        }

        self.store.upsert_user_interests(email, updates).await?;
        self.interests(email).await
    }
}
