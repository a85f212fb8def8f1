use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

const SECRET_MASK: &str = "********";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub identity: IdentityConfig,

    pub storage: StorageConfig,

    pub notifications: NotificationConfig,

    pub internal: InternalConfig,

    pub security: SecurityConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,

    pub max_db_connections: u32,

    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/userservice.db".to_string(),
            log_level: "info".to_string(),
            worker_threads: 2,
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,

    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cors_allowed_origins: vec!["*".to_string()],
        }
    }
}

/// Keycloak realm and admin credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub base_url: String,

    pub realm: String,

    pub client_id: String,

    pub client_secret: String,

    /// Master-realm admin used for user creation and password resets.
    pub admin_user: String,

    pub admin_password: String,

    pub request_timeout_seconds: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            realm: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            admin_user: String::new(),
            admin_password: String::new(),
            request_timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Endpoint the service uploads through (usually the cluster-internal address).
    pub endpoint: String,

    /// Endpoint embedded in presigned URLs handed to clients.
    pub external_endpoint: String,

    pub access_key: String,

    pub secret_key: String,

    pub bucket: String,

    pub public_base_url: String,

    pub region: String,

    pub max_upload_bytes: usize,

    pub presign_ttl_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            external_endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            bucket: "user-media".to_string(),
            public_base_url: String::new(),
            region: "us-east-1".to_string(),
            max_upload_bytes: 5 * 1024 * 1024,
            presign_ttl_seconds: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Empty disables outbound notifications.
    pub url: String,

    pub service_token: String,

    pub timeout_seconds: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            service_token: String::new(),
            timeout_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InternalConfig {
    /// Shared secret expected in `X-Service-Token`. Empty rejects every internal call.
    pub service_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations)
    pub argon2_time_cost: u32,

    pub argon2_parallelism: u32,

    pub password_min_length: usize,

    pub reset_token_ttl_minutes: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
            password_min_length: 6,
            reset_token_ttl_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: std::collections::HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = std::collections::HashMap::new();
        labels.insert("app".to_string(), "userservice".to_string());

        Self {
            metrics_enabled: true,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // A missing .env is normal outside local development.
        let _ = dotenvy::dotenv();

        let mut config = Self::default();
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Self::load_from_path(path)?;
                break;
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    /// Overlays deployment environment variables on top of the file values.
    ///
    /// Only non-empty variables are applied, so an exported-but-blank
    /// variable never clears a value from the config file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("DATABASE_URL") {
            self.general.database_url = v;
        }
        if let Some(port) = get("APP_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }

        let identity = [
            ("KEYCLOAK_URL", &mut self.identity.base_url),
            ("KEYCLOAK_REALM", &mut self.identity.realm),
            ("KEYCLOAK_CLIENT_ID", &mut self.identity.client_id),
            ("KEYCLOAK_CLIENT_SECRET", &mut self.identity.client_secret),
            ("KEYCLOAK_ADMIN_USER", &mut self.identity.admin_user),
            ("KEYCLOAK_ADMIN_PASS", &mut self.identity.admin_password),
        ];
        for (key, slot) in identity {
            if let Some(v) = get(key) {
                *slot = v;
            }
        }

        let storage = [
            ("S3_ENDPOINT", &mut self.storage.endpoint),
            ("S3_EXTERNAL_ENDPOINT", &mut self.storage.external_endpoint),
            ("S3_ACCESS_KEY", &mut self.storage.access_key),
            ("S3_SECRET_KEY", &mut self.storage.secret_key),
            ("S3_BUCKET", &mut self.storage.bucket),
            ("S3_PUBLIC_BASE_URL", &mut self.storage.public_base_url),
        ];
        for (key, slot) in storage {
            if let Some(v) = get(key) {
                *slot = v;
            }
        }

        if let Some(v) = get("NOTIFICATION_SERVICE_URL") {
            self.notifications.url = v;
        }
        if let Some(v) = get("NOTIFICATION_SERVICE_TOKEN") {
            self.notifications.service_token = v;
        }
        if let Some(v) = get("USER_SERVICE_TOKEN") {
            self.internal.service_token = v;
        }
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("userservice").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".userservice").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            Self::default().save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    /// Copy safe to print: every configured secret is replaced by a mask.
    #[must_use]
    pub fn redacted(&self) -> Self {
        fn mask(value: &mut String) {
            if !value.is_empty() {
                *value = SECRET_MASK.to_string();
            }
        }

        let mut config = self.clone();
        mask(&mut config.identity.client_secret);
        mask(&mut config.identity.admin_password);
        mask(&mut config.storage.secret_key);
        mask(&mut config.notifications.service_token);
        mask(&mut config.internal.service_token);
        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.security.reset_token_ttl_minutes == 0 {
            anyhow::bail!("security.reset_token_ttl_minutes must be > 0");
        }

        if self.security.password_min_length == 0 {
            anyhow::bail!("security.password_min_length must be > 0");
        }

        if self.storage.max_upload_bytes == 0 {
            anyhow::bail!("storage.max_upload_bytes must be > 0");
        }

        if !self.identity.base_url.is_empty() && self.identity.realm.is_empty() {
            anyhow::bail!("identity.realm cannot be empty when identity.base_url is set");
        }

        Ok(())
    }
}
