//! `SeaORM` implementation of the `UserService` trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clients::{IdentityAccount, IdentityError, IdentityProvider, ObjectStore};
use crate::config::{SecurityConfig, StorageConfig};
use crate::constants;
use crate::db::Store;
use crate::models::{NewUser, ProfileUpdate, PublicUserInfo, TokenSet, User};
use crate::security;
use crate::services::badge_service::BadgeService;
use crate::services::user_service::{RegisterInput, UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
    identity: Arc<dyn IdentityProvider>,
    objects: Arc<dyn ObjectStore>,
    badges: Arc<dyn BadgeService>,
    security: SecurityConfig,
    storage: StorageConfig,
}

impl SeaOrmUserService {
    #[must_use]
    pub fn new(
        store: Store,
        identity: Arc<dyn IdentityProvider>,
        objects: Arc<dyn ObjectStore>,
        badges: Arc<dyn BadgeService>,
        security: SecurityConfig,
        storage: StorageConfig,
    ) -> Self {
        Self {
            store,
            identity,
            objects,
            badges,
            security,
            storage,
        }
    }

    async fn require_by_keycloak_id(&self, keycloak_id: &str) -> Result<User, UserError> {
        self.store
            .get_user_by_keycloak_id(keycloak_id)
            .await?
            .ok_or_else(|| UserError::NotFound("User not found".to_string()))
    }

    fn public_prefix(&self) -> String {
        format!("{}/", self.storage.public_base_url.trim_end_matches('/'))
    }

    async fn award_completion_if_due(&self, user: &User) {
        if user.is_profile_complete() {
            self.badges
                .award_best_effort(user.id, constants::badges::PROFILE_COMPLETE)
                .await;
        }
    }
}

fn photo_extension(content_type: &str) -> Option<&'static str> {
    constants::uploads::PROFILE_PHOTO_TYPES
        .iter()
        .find(|(mime, _)| mime.eq_ignore_ascii_case(content_type.trim()))
        .map(|(_, ext)| *ext)
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn register(&self, input: RegisterInput) -> Result<User, UserError> {
        let email = input.email.trim().to_lowercase();
        if email.is_empty() || input.first_name.trim().is_empty() || input.last_name.trim().is_empty()
        {
            return Err(UserError::Validation(
                "email, first_name and last_name are required".to_string(),
            ));
        }

        security::validate_password(&input.password, self.security.password_min_length)
            .map_err(UserError::Validation)?;

        if self.store.get_user_by_email(&email).await?.is_some() {
            return Err(UserError::Conflict("email already registered".to_string()));
        }

        let keycloak_id = self
            .identity
            .create_user(IdentityAccount {
                email: &email,
                first_name: input.first_name.trim(),
                last_name: input.last_name.trim(),
                password: &input.password,
            })
            .await
            .map_err(|e| match e {
                IdentityError::EmailExists => {
                    UserError::Conflict("email already registered".to_string())
                }
                other => UserError::Upstream(other.to_string()),
            })?;

        let password_hash = security::hash_password(&input.password, &self.security).await?;

        let user = self
            .store
            .create_user(NewUser {
                keycloak_id,
                email,
                password_hash,
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
            })
            .await?;

        metrics::counter!("users_registered_total").increment(1);
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn login(&self, email: &str, password: &str) -> Result<TokenSet, UserError> {
        let invalid = || UserError::Unauthorized("Invalid email or password".to_string());
        let email = email.trim().to_lowercase();

        let hash = self
            .store
            .get_user_password_hash(&email)
            .await?
            .ok_or_else(invalid)?;

        if !security::verify_password(&hash, password).await? {
            return Err(invalid());
        }

        self.identity
            .password_grant(&email, password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Password grant failed after local verification");
                UserError::Unauthorized("Authentication failed".to_string())
            })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, UserError> {
        if refresh_token.is_empty() {
            return Err(UserError::Validation("refresh_token is required".to_string()));
        }

        self.identity
            .refresh_grant(refresh_token)
            .await
            .map_err(|_| UserError::Unauthorized("Authentication failed".to_string()))
    }

    async fn authenticate(&self, access_token: &str) -> Result<String, UserError> {
        self.identity
            .verify_access_token(access_token)
            .await
            .map_err(|e| match e {
                IdentityError::Unauthorized | IdentityError::UserNotFound => {
                    UserError::Unauthorized("Invalid access token".to_string())
                }
                other => UserError::Upstream(other.to_string()),
            })
    }

    async fn get_by_email(&self, email: &str) -> Result<User, UserError> {
        self.store
            .get_user_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or_else(|| UserError::NotFound("User not found".to_string()))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<User, UserError> {
        self.store
            .get_user_by_id(id)
            .await?
            .ok_or_else(|| UserError::NotFound("User not found".to_string()))
    }

    async fn get_by_keycloak_id(&self, keycloak_id: &str) -> Result<User, UserError> {
        self.require_by_keycloak_id(keycloak_id).await
    }

    async fn get_public_info_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<PublicUserInfo, UserError> {
        self.store
            .get_user_by_name(first_name.trim(), last_name.trim())
            .await?
            .map(PublicUserInfo::from)
            .ok_or_else(|| UserError::NotFound("User not found".to_string()))
    }

    async fn update_profile(
        &self,
        keycloak_id: &str,
        update: &ProfileUpdate,
    ) -> Result<User, UserError> {
        let current = self.require_by_keycloak_id(keycloak_id).await?;

        let user = self
            .store
            .update_user_profile(&current.email, update)
            .await?
            .ok_or_else(|| UserError::NotFound("User not found".to_string()))?;

        self.award_completion_if_due(&user).await;
        Ok(user)
    }

    async fn update_password_hash(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<(), UserError> {
        security::validate_password(new_password, self.security.password_min_length)
            .map_err(UserError::Validation)?;

        let hash = security::hash_password(new_password, &self.security).await?;
        if self.store.update_user_password_hash(email, &hash).await? {
            Ok(())
        } else {
            Err(UserError::NotFound("User not found".to_string()))
        }
    }

    async fn upload_profile_photo(
        &self,
        keycloak_id: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UserError> {
        let ext = photo_extension(content_type).ok_or_else(|| {
            UserError::Validation("only jpeg, png and webp images are allowed".to_string())
        })?;

        if bytes.is_empty() {
            return Err(UserError::Validation("file is empty".to_string()));
        }
        if bytes.len() > self.storage.max_upload_bytes {
            return Err(UserError::Validation(format!(
                "file exceeds the {} byte limit",
                self.storage.max_upload_bytes
            )));
        }

        let user = self.require_by_keycloak_id(keycloak_id).await?;

        let key = format!("users/{keycloak_id}/profile.{ext}");
        self.objects
            .put(&key, content_type.trim(), bytes)
            .await
            .map_err(|e| UserError::Storage(e.to_string()))?;

        let url = format!("{}{key}", self.public_prefix());
        let updated = self
            .store
            .set_user_profile_photo(&user.email, &url)
            .await?
            .ok_or_else(|| UserError::NotFound("User not found".to_string()))?;

        self.badges
            .award_best_effort(updated.id, constants::badges::PROFILE_PHOTO_UPLOADED)
            .await;
        self.award_completion_if_due(&updated).await;

        info!(user_id = %updated.id, "Profile photo uploaded");
        Ok(url)
    }

    async fn presign_profile_photo(&self, keycloak_id: &str) -> Result<String, UserError> {
        let user = self.require_by_keycloak_id(keycloak_id).await?;

        let key = user
            .profile_photo_url
            .strip_prefix(&self.public_prefix())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| UserError::NotFound("No profile photo".to_string()))?;

        self.objects
            .presign_get(key, Duration::from_secs(self.storage.presign_ttl_seconds))
            .await
            .map_err(|e| UserError::Storage(e.to_string()))
    }
}
