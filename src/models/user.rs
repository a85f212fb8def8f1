use chrono::{DateTime, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::users;

/// Local user record. The credential hash is deliberately absent.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub keycloak_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub phone_number_visible: bool,
    pub country: String,
    pub job_function: String,
    pub sector: String,
    pub biography: String,
    pub is_blocked: bool,
    pub profile_photo_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            keycloak_id: model.keycloak_id,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            phone_number: model.phone_number,
            phone_number_visible: model.phone_number_visible,
            country: model.country,
            job_function: model.job_function,
            sector: model.sector,
            biography: model.biography,
            is_blocked: model.is_blocked,
            profile_photo_url: model.profile_photo_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl User {
    /// True when every field the "profile complete" badge depends on is filled in.
    #[must_use]
    pub fn is_profile_complete(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.phone_number,
            &self.country,
            &self.job_function,
            &self.sector,
            &self.biography,
            &self.profile_photo_url,
        ]
        .iter()
        .all(|field| !field.is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicUserInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<User> for PublicUserInfo {
    fn from(user: User) -> Self {
        Self {
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub keycloak_id: String,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

/// Partial profile update. `None` means the field was not sent.
///
/// Text fields that arrive empty are treated like absent ones, so a client
/// cannot blank a profile field by omission-as-empty-string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub phone_number_visible: Option<bool>,
    pub country: Option<String>,
    pub job_function: Option<String>,
    pub sector: Option<String>,
    pub biography: Option<String>,
    pub profile_photo_url: Option<String>,
}

impl ProfileUpdate {
    /// Writes the provided fields into `model`; everything else stays as loaded.
    pub fn merge_into(&self, model: &mut users::ActiveModel) {
        fn text(value: Option<&String>) -> Option<String> {
            value.filter(|v| !v.is_empty()).cloned()
        }

        if let Some(v) = text(self.first_name.as_ref()) {
            model.first_name = Set(v);
        }
        if let Some(v) = text(self.last_name.as_ref()) {
            model.last_name = Set(v);
        }
        if let Some(v) = text(self.phone_number.as_ref()) {
            model.phone_number = Set(v);
        }
        if let Some(v) = self.phone_number_visible {
            model.phone_number_visible = Set(v);
        }
        if let Some(v) = text(self.country.as_ref()) {
            model.country = Set(v);
        }
        if let Some(v) = text(self.job_function.as_ref()) {
            model.job_function = Set(v);
        }
        if let Some(v) = text(self.sector.as_ref()) {
            model.sector = Set(v);
        }
        if let Some(v) = text(self.biography.as_ref()) {
            model.biography = Set(v);
        }
        if let Some(v) = text(self.profile_photo_url.as_ref()) {
            model.profile_photo_url = Set(v);
        }
    }
}

/// Token set returned by the identity provider's token endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub refresh_expires_in: i64,
}
