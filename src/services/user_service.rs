//! Domain service for the local user directory.
//!
//! Accounts live at the identity provider; this service keeps the profile
//! record, a credential mirror, and the profile photo.

use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ProfileUpdate, PublicUserInfo, TokenSet, User};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Identity provider error: {0}")]
    Upstream(String),

    #[error("Object storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    /// Creates the account upstream, then the local record.
    async fn register(&self, input: RegisterInput) -> Result<User, UserError>;

    async fn login(&self, email: &str, password: &str) -> Result<TokenSet, UserError>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, UserError>;

    /// Resolves a bearer token to the identity provider subject.
    async fn authenticate(&self, access_token: &str) -> Result<String, UserError>;

    async fn get_by_email(&self, email: &str) -> Result<User, UserError>;

    async fn get_by_id(&self, id: Uuid) -> Result<User, UserError>;

    async fn get_by_keycloak_id(&self, keycloak_id: &str) -> Result<User, UserError>;

    /// Case-insensitive name lookup exposing only public fields.
    async fn get_public_info_by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<PublicUserInfo, UserError>;

    /// Applies the present fields of `update`, then awards `profile_complete`
    /// when the profile has become complete.
    async fn update_profile(
        &self,
        keycloak_id: &str,
        update: &ProfileUpdate,
    ) -> Result<User, UserError>;

    /// Policy check, hash and write of the local credential mirror.
    async fn update_password_hash(&self, email: &str, new_password: &str)
    -> Result<(), UserError>;

    /// Stores the photo and returns its public URL.
    async fn upload_profile_photo(
        &self,
        keycloak_id: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, UserError>;

    /// Short-lived signed URL for the user's current photo.
    async fn presign_profile_photo(&self, keycloak_id: &str) -> Result<String, UserError>;
}
