use anyhow::{Context, Result};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::entities::{notification_settings, prelude::*};
use crate::models::NotificationSettings as Settings;

pub struct NotificationSettingsRepository {
    conn: DatabaseConnection,
}

impl NotificationSettingsRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn get(&self, email: &str) -> Result<Option<Settings>> {
        let row = NotificationSettings::find()
            .filter(notification_settings::Column::UserEmail.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query notification settings")?;

        Ok(row.map(Settings::from))
    }

    /// Inserts or replaces the row keyed by email, then reads it back.
    pub async fn upsert(&self, settings: &Settings) -> Result<Settings> {
        let active_model = notification_settings::ActiveModel {
            user_email: Set(settings.email.clone()),
            like_email: Set(settings.like_email),
            like_push: Set(settings.like_push),
            favorite_email: Set(settings.favorite_email),
            favorite_push: Set(settings.favorite_push),
            chat_email: Set(settings.chat_email),
            chat_push: Set(settings.chat_push),
            system_email: Set(settings.system_email),
            system_push: Set(settings.system_push),
            expo_push_token: Set(settings.expo_push_token.clone()),
            ..Default::default()
        };

        NotificationSettings::insert(active_model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(notification_settings::Column::UserEmail)
                    .update_columns([
                        notification_settings::Column::LikeEmail,
                        notification_settings::Column::LikePush,
                        notification_settings::Column::FavoriteEmail,
                        notification_settings::Column::FavoritePush,
                        notification_settings::Column::ChatEmail,
                        notification_settings::Column::ChatPush,
                        notification_settings::Column::SystemEmail,
                        notification_settings::Column::SystemPush,
                        notification_settings::Column::ExpoPushToken,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to upsert notification settings")?;

        self.get(&settings.email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Notification settings vanished after upsert"))
    }
}
