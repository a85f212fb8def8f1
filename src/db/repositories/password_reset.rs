use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    sea_query::Expr,
};

use crate::entities::{password_reset_tokens, prelude::*};

/// A stored reset token as seen by callers. The hash never leaves the repository.
#[derive(Debug, Clone)]
pub struct ResetTokenRecord {
    pub id: i32,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl From<password_reset_tokens::Model> for ResetTokenRecord {
    fn from(model: password_reset_tokens::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            expires_at: model.expires_at,
            used: model.used,
            created_at: model.created_at,
        }
    }
}

pub struct PasswordResetRepository {
    conn: DatabaseConnection,
}

impl PasswordResetRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &self,
        email: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<ResetTokenRecord> {
        let active_model = password_reset_tokens::ActiveModel {
            email: Set(email.to_string()),
            token_hash: Set(token_hash.to_string()),
            expires_at: Set(expires_at),
            used: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to store password reset token")?;

        Ok(model.into())
    }

    /// Finds an unused token with the given hash that is still valid at `now`.
    pub async fn find_valid(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetTokenRecord>> {
        let token = PasswordResetTokens::find()
            .filter(password_reset_tokens::Column::TokenHash.eq(token_hash))
            .filter(password_reset_tokens::Column::Used.eq(false))
            .one(&self.conn)
            .await
            .context("Failed to query password reset token")?;

        Ok(token
            .filter(|t| now < t.expires_at)
            .map(ResetTokenRecord::from))
    }

    /// Flips `used` from false to true. Returns `false` if the token was already consumed.
    pub async fn mark_used(&self, id: i32) -> Result<bool> {
        let result = PasswordResetTokens::update_many()
            .col_expr(password_reset_tokens::Column::Used, Expr::value(true))
            .filter(password_reset_tokens::Column::Id.eq(id))
            .filter(password_reset_tokens::Column::Used.eq(false))
            .exec(&self.conn)
            .await
            .context("Failed to mark password reset token as used")?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_for_email(&self, email: &str) -> Result<Vec<ResetTokenRecord>> {
        let tokens = PasswordResetTokens::find()
            .filter(password_reset_tokens::Column::Email.eq(email))
            .all(&self.conn)
            .await
            .context("Failed to list password reset tokens")?;

        Ok(tokens.into_iter().map(ResetTokenRecord::from).collect())
    }
}
