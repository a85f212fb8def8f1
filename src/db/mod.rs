use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use crate::constants;
use crate::models::{
    DiscoveryPreferences, InterestUpdate, InterestValue, NewUser, NotificationSettings,
    ProfileUpdate, User,
};

pub mod migrator;
pub mod repositories;

pub use repositories::badge::{BadgeGrant, BadgeInfo};
pub use repositories::password_reset::ResetTokenRecord;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if let Some(path_str) = sqlite_file_path(db_url) {
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    /// Inserts missing badge and interest catalog rows. Safe to run on every start.
    pub async fn seed_catalogs(&self) -> Result<()> {
        let badges = self
            .badge_repo()
            .seed_catalog(constants::badges::CATALOG)
            .await?;
        let interests = self
            .interest_repo()
            .seed_catalog(constants::interests::CATALOG)
            .await?;

        info!(badges, interests, "Catalog seeding finished");
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn badge_repo(&self) -> repositories::badge::BadgeRepository {
        repositories::badge::BadgeRepository::new(self.conn.clone())
    }

    fn reset_repo(&self) -> repositories::password_reset::PasswordResetRepository {
        repositories::password_reset::PasswordResetRepository::new(self.conn.clone())
    }

    fn notification_settings_repo(
        &self,
    ) -> repositories::notification_settings::NotificationSettingsRepository {
        repositories::notification_settings::NotificationSettingsRepository::new(self.conn.clone())
    }

    fn discovery_repo(&self) -> repositories::discovery::DiscoveryRepository {
        repositories::discovery::DiscoveryRepository::new(self.conn.clone())
    }

    fn interest_repo(&self) -> repositories::interests::InterestRepository {
        repositories::interests::InterestRepository::new(self.conn.clone())
    }

    // Users

    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.user_repo().create(new_user).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_keycloak_id(&self, keycloak_id: &str) -> Result<Option<User>> {
        self.user_repo().get_by_keycloak_id(keycloak_id).await
    }

    pub async fn get_user_by_name(&self, first: &str, last: &str) -> Result<Option<User>> {
        self.user_repo().get_by_name(first, last).await
    }

    pub async fn get_user_password_hash(&self, email: &str) -> Result<Option<String>> {
        self.user_repo().get_password_hash(email).await
    }

    pub async fn update_user_profile(
        &self,
        email: &str,
        update: &ProfileUpdate,
    ) -> Result<Option<User>> {
        self.user_repo().update_profile(email, update).await
    }

    pub async fn set_user_profile_photo(&self, email: &str, url: &str) -> Result<Option<User>> {
        self.user_repo().set_profile_photo_url(email, url).await
    }

    pub async fn update_user_password_hash(&self, email: &str, hash: &str) -> Result<bool> {
        self.user_repo().update_password_hash(email, hash).await
    }

    // Badge ledger

    pub async fn has_badge_grant(&self, user_id: Uuid, badge_key: &str) -> Result<bool> {
        self.badge_repo().has_grant(user_id, badge_key).await
    }

    pub async fn insert_badge_grant(
        &self,
        user_id: Uuid,
        badge_key: &str,
        earned_at: DateTime<Utc>,
    ) -> Result<bool> {
        self.badge_repo()
            .insert_grant(user_id, badge_key, earned_at)
            .await
    }

    pub async fn list_badge_grants(&self, user_id: Uuid) -> Result<Vec<BadgeGrant>> {
        self.badge_repo().grants_for_user(user_id).await
    }

    pub async fn list_badge_catalog(&self) -> Result<Vec<crate::entities::badges::Model>> {
        self.badge_repo().catalog().await
    }

    // Password reset tokens

    pub async fn create_reset_token(
        &self,
        email: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ResetTokenRecord> {
        self.reset_repo()
            .create(email, token_hash, expires_at)
            .await
    }

    pub async fn find_valid_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetTokenRecord>> {
        self.reset_repo().find_valid(token_hash, now).await
    }

    pub async fn mark_reset_token_used(&self, id: i32) -> Result<bool> {
        self.reset_repo().mark_used(id).await
    }

    pub async fn list_reset_tokens(&self, email: &str) -> Result<Vec<ResetTokenRecord>> {
        self.reset_repo().list_for_email(email).await
    }

    // Preferences

    pub async fn get_notification_settings(
        &self,
        email: &str,
    ) -> Result<Option<NotificationSettings>> {
        self.notification_settings_repo().get(email).await
    }

    pub async fn upsert_notification_settings(
        &self,
        settings: &NotificationSettings,
    ) -> Result<NotificationSettings> {
        self.notification_settings_repo().upsert(settings).await
    }

    pub async fn get_discovery_preferences(
        &self,
        email: &str,
    ) -> Result<Option<DiscoveryPreferences>> {
        self.discovery_repo().get(email).await
    }

    pub async fn upsert_discovery_preferences(
        &self,
        email: &str,
        radius_km: i32,
    ) -> Result<DiscoveryPreferences> {
        self.discovery_repo().upsert(email, radius_km).await
    }

    pub async fn list_interest_ids(&self) -> Result<Vec<i32>> {
        Ok(self
            .interest_repo()
            .catalog()
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect())
    }

    pub async fn list_user_interests(&self, email: &str) -> Result<Vec<InterestValue>> {
        self.interest_repo().list_for_user(email).await
    }

    pub async fn upsert_user_interests(
        &self,
        email: &str,
        updates: &[InterestUpdate],
    ) -> Result<()> {
        self.interest_repo().upsert_for_user(email, updates).await
    }
}

/// Filesystem path behind a `sqlite:` URL, if any. In-memory databases have none.
fn sqlite_file_path(db_url: &str) -> Option<&str> {
    let path = db_url.strip_prefix("sqlite:")?;
    let path = path.trim_start_matches("//");
    let path = path.split('?').next().unwrap_or(path);

    if path.is_empty() || path.starts_with(":memory:") {
        None
    } else {
        Some(path)
    }
}
