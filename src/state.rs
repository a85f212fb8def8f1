use std::sync::Arc;
use std::time::Duration;

use crate::clients::{
    IdentityProvider, KeycloakClient, NotificationDispatcher, ObjectStore, S3ObjectStore,
};
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    BadgeService, PasswordResetService, PreferencesService, SeaOrmBadgeService,
    SeaOrmPasswordResetService, SeaOrmPreferencesService, SeaOrmUserService, UserService,
};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub identity: Arc<dyn IdentityProvider>,

    pub objects: Arc<dyn ObjectStore>,

    pub notifications: Arc<NotificationDispatcher>,

    pub badge_service: Arc<dyn BadgeService>,

    pub reset_service: Arc<dyn PasswordResetService>,

    pub user_service: Arc<dyn UserService>,

    pub preferences_service: Arc<dyn PreferencesService>,
}

impl SharedState {
    /// Builds the state with the production Keycloak and S3 clients.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let identity = Arc::new(
            KeycloakClient::new(config.identity.clone())
                .map_err(|e| anyhow::anyhow!("Failed to build identity client: {e}"))?,
        ) as Arc<dyn IdentityProvider>;
        let objects = Arc::new(S3ObjectStore::new(&config.storage)) as Arc<dyn ObjectStore>;

        Self::with_clients(config, identity, objects).await
    }

    /// Builds the state around caller-supplied outbound clients.
    pub async fn with_clients(
        config: Config,
        identity: Arc<dyn IdentityProvider>,
        objects: Arc<dyn ObjectStore>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_url,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;
        store.seed_catalogs().await?;

        let notifications = Arc::new(NotificationDispatcher::new(&config.notifications)?);

        let badge_service =
            Arc::new(SeaOrmBadgeService::new(store.clone())) as Arc<dyn BadgeService>;

        let reset_service = Arc::new(SeaOrmPasswordResetService::new(
            store.clone(),
            identity.clone(),
            config.security.clone(),
            Duration::from_secs(config.identity.request_timeout_seconds),
        )) as Arc<dyn PasswordResetService>;

        let user_service = Arc::new(SeaOrmUserService::new(
            store.clone(),
            identity.clone(),
            objects.clone(),
            badge_service.clone(),
            config.security.clone(),
            config.storage.clone(),
        )) as Arc<dyn UserService>;

        let preferences_service =
            Arc::new(SeaOrmPreferencesService::new(store.clone())) as Arc<dyn PreferencesService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            identity,
            objects,
            notifications,
            badge_service,
            reset_service,
            user_service,
            preferences_service,
        })
    }
}
