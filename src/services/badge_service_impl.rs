//! `SeaORM` implementation of the `BadgeService` trait.

use async_trait::async_trait;
use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::constants;
use crate::db::{BadgeGrant, Store};
use crate::services::badge_service::{BadgeError, BadgeService};

pub struct SeaOrmBadgeService {
    store: Store,
}

impl SeaOrmBadgeService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BadgeService for SeaOrmBadgeService {
    async fn award(&self, user_id: Uuid, badge_key: &str) -> Result<bool, BadgeError> {
        if self.store.has_badge_grant(user_id, badge_key).await? {
            return Ok(false);
        }

        if !constants::badges::CATALOG
            .iter()
            .any(|(key, _, _)| *key == badge_key)
        {
            // Stored anyway; listing shows it without catalog metadata.
            warn!(badge_key, "Awarding badge key that is not in the catalog");
        }

        let granted = self
            .store
            .insert_badge_grant(user_id, badge_key, Utc::now())
            .await?;

        if granted {
            metrics::counter!("badges_awarded_total", "badge" => badge_key.to_string())
                .increment(1);
        }

        Ok(granted)
    }

    async fn grants_for_user(&self, user_id: Uuid) -> Result<Vec<BadgeGrant>, BadgeError> {
        Ok(self.store.list_badge_grants(user_id).await?)
    }
}
