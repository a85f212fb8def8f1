//! Shared fixtures: in-process fakes for the identity provider and object
//! storage, plus app/state builders over a throwaway SQLite file.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{Router, body::Body, http::Request};
use http_body_util::BodyExt;
use tower::ServiceExt;
use userservice::clients::{IdentityAccount, IdentityError, IdentityProvider, ObjectStore};
use userservice::config::Config;
use userservice::models::{TokenSet, User};
use userservice::services::RegisterInput;
use userservice::state::SharedState;

pub const SERVICE_TOKEN: &str = "mesh-token";
pub const PASSWORD: &str = "secret1";
pub const PUBLIC_BASE_URL: &str = "http://cdn.test/user-media";

/// Identity provider double. Access tokens are `access-{subject}`.
#[derive(Default)]
pub struct FakeIdentity {
    accounts: Mutex<HashMap<String, String>>,
    pub reset_calls: Mutex<Vec<(String, String)>>,
    pub fail_resets: AtomicBool,
    pub reset_delay: Mutex<Option<Duration>>,
}

impl FakeIdentity {
    pub fn reset_call_count(&self) -> usize {
        self.reset_calls.lock().unwrap().len()
    }

    /// Creates an account at the provider only, without a local row.
    pub fn add_account(&self, email: &str) -> String {
        let subject = format!("kc-{}", uuid::Uuid::new_v4());
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), subject.clone());
        subject
    }

    pub fn access_token_for(subject: &str) -> String {
        format!("access-{subject}")
    }
}

#[async_trait::async_trait]
impl IdentityProvider for FakeIdentity {
    async fn create_user(&self, account: IdentityAccount<'_>) -> Result<String, IdentityError> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(account.email) {
            return Err(IdentityError::EmailExists);
        }
        let subject = format!("kc-{}", uuid::Uuid::new_v4());
        accounts.insert(account.email.to_string(), subject.clone());
        Ok(subject)
    }

    async fn password_grant(&self, email: &str, _password: &str) -> Result<TokenSet, IdentityError> {
        let subject = self
            .accounts
            .lock()
            .unwrap()
            .get(email)
            .cloned()
            .ok_or(IdentityError::Unauthorized)?;

        Ok(TokenSet {
            access_token: Self::access_token_for(&subject),
            token_type: "Bearer".to_string(),
            expires_in: 300,
            refresh_token: format!("refresh-{subject}"),
            refresh_expires_in: 1800,
        })
    }

    async fn refresh_grant(&self, refresh_token: &str) -> Result<TokenSet, IdentityError> {
        let subject = refresh_token
            .strip_prefix("refresh-")
            .ok_or(IdentityError::Unauthorized)?;

        Ok(TokenSet {
            access_token: Self::access_token_for(subject),
            token_type: "Bearer".to_string(),
            expires_in: 300,
            refresh_token: refresh_token.to_string(),
            refresh_expires_in: 1800,
        })
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        let delay = *self.reset_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_resets.load(Ordering::SeqCst) {
            return Err(IdentityError::Upstream("admin API returned 500".to_string()));
        }

        if !self.accounts.lock().unwrap().contains_key(email) {
            return Err(IdentityError::UserNotFound);
        }

        self.reset_calls
            .lock()
            .unwrap()
            .push((email.to_string(), new_password.to_string()));
        Ok(())
    }

    async fn verify_access_token(&self, access_token: &str) -> Result<String, IdentityError> {
        let subject = access_token
            .strip_prefix("access-")
            .ok_or(IdentityError::Unauthorized)?;

        if self
            .accounts
            .lock()
            .unwrap()
            .values()
            .any(|s| s == subject)
        {
            Ok(subject.to_string())
        } else {
            Err(IdentityError::Unauthorized)
        }
    }
}

/// Object store double that keeps uploads in memory.
#[derive(Default)]
pub struct FakeObjectStore {
    pub objects: Mutex<HashMap<String, (String, usize)>>,
    pub fail_puts: AtomicBool,
}

#[async_trait::async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> anyhow::Result<()> {
        if self.fail_puts.load(Ordering::SeqCst) {
            anyhow::bail!("s3 down");
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (content_type.to_string(), bytes.len()));
        Ok(())
    }

    async fn presign_get(&self, key: &str, ttl: Duration) -> anyhow::Result<String> {
        Ok(format!(
            "http://storage.test/user-media/{key}?X-Amz-Expires={}",
            ttl.as_secs()
        ))
    }

    async fn ensure_bucket(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub struct TestContext {
    pub shared: Arc<SharedState>,
    pub identity: Arc<FakeIdentity>,
    pub objects: Arc<FakeObjectStore>,
}

impl TestContext {
    pub fn router(&self) -> Router {
        let state = userservice::api::create_app_state(self.shared.clone(), None);
        userservice::api::router(state)
    }

    /// Registers a user through the service layer with [`PASSWORD`].
    pub async fn register(&self, email: &str, first: &str, last: &str) -> User {
        self.shared
            .user_service
            .register(RegisterInput {
                email: email.to_string(),
                password: PASSWORD.to_string(),
                first_name: first.to_string(),
                last_name: last.to_string(),
            })
            .await
            .expect("registration failed")
    }
}

pub fn test_config() -> Config {
    let db_path =
        std::env::temp_dir().join(format!("userservice-test-{}.db", uuid::Uuid::new_v4()));

    let mut config = Config::default();
    config.general.database_url = format!("sqlite:{}", db_path.display());
    config.internal.service_token = SERVICE_TOKEN.to_string();
    config.storage.public_base_url = PUBLIC_BASE_URL.to_string();
    config.identity.request_timeout_seconds = 1;
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    config
}

pub async fn spawn_with_config(config: Config) -> TestContext {
    let identity = Arc::new(FakeIdentity::default());
    let objects = Arc::new(FakeObjectStore::default());

    let shared = SharedState::with_clients(
        config,
        identity.clone() as Arc<dyn IdentityProvider>,
        objects.clone() as Arc<dyn ObjectStore>,
    )
    .await
    .expect("Failed to create shared state");

    TestContext {
        shared: Arc::new(shared),
        identity,
        objects,
    }
}

pub async fn spawn() -> TestContext {
    spawn_with_config(test_config()).await
}

pub async fn send(app: &Router, request: Request<Body>) -> (axum::http::StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    // Extractor rejections answer in plain text; those bodies map to Null.
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub fn json_request(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
