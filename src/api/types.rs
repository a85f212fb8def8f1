use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::BadgeGrant;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BadgeDto {
    pub key: String,
    pub name: String,
    pub description: String,
    pub earned_at: DateTime<Utc>,
}

impl From<BadgeGrant> for BadgeDto {
    fn from(grant: BadgeGrant) -> Self {
        Self {
            key: grant.badge_key,
            name: grant.badge.name,
            description: grant.badge.description,
            earned_at: grant.earned_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfilePhotoDto {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct AwardBadgeRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub badge_key: String,
}

#[derive(Debug, Deserialize)]
pub struct DiscoveryPreferencesRequest {
    pub radius_km: i32,
}

#[derive(Debug, Deserialize)]
pub struct InterestsRequest {
    pub interests: Vec<crate::models::InterestUpdate>,
}

#[derive(Debug, Serialize)]
pub struct UserBadgesDto {
    pub user_id: Uuid,
    pub badges: Vec<BadgeDto>,
}
