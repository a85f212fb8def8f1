//! Domain service for the achievement badge ledger.
//!
//! Grants are one-time: awarding an already-held badge is a silent no-op.

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::BadgeGrant;

#[derive(Debug, Error)]
pub enum BadgeError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for BadgeError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for BadgeError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait BadgeService: Send + Sync {
    /// Records the badge for the user unless already held.
    ///
    /// Returns `true` only for the call that created the grant. Losing a
    /// concurrent race for the same pair yields `false`, never an error.
    async fn award(&self, user_id: Uuid, badge_key: &str) -> Result<bool, BadgeError>;

    /// Earned badges, oldest first, with catalog metadata inlined.
    async fn grants_for_user(&self, user_id: Uuid) -> Result<Vec<BadgeGrant>, BadgeError>;

    /// Awards from a side path (profile update, photo upload). Failures are
    /// logged and never surface to the triggering operation.
    async fn award_best_effort(&self, user_id: Uuid, badge_key: &str) {
        match self.award(user_id, badge_key).await {
            Ok(true) => info!(%user_id, badge_key, "Badge awarded"),
            Ok(false) => {}
            Err(e) => warn!(%user_id, badge_key, error = %e, "Badge award failed"),
        }
    }
}
