//! Domain service for the password reset token lifecycle.
//!
//! A raw token is handed out exactly once (to the notification channel) and
//! only its SHA-256 digest is persisted. Redemption is single-use and bounded
//! by the configured TTL.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResetError {
    #[error("token is required")]
    TokenRequired,

    /// Unknown, expired and already-used tokens are indistinguishable.
    #[error("invalid or expired token")]
    InvalidToken,

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Identity provider failed or timed out; nothing was changed locally.
    #[error("Identity provider error: {0}")]
    Upstream(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for ResetError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for ResetError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait PasswordResetService: Send + Sync {
    /// Issues a new reset token for `email` and returns the raw value.
    ///
    /// Succeeds whether or not an account exists for the address. Earlier
    /// outstanding tokens for the same address stay valid.
    async fn request_reset(&self, email: &str) -> Result<String, ResetError>;

    /// Redeems `raw_token`, setting `new_password` at the identity provider
    /// and in the local credential mirror, then consumes the token.
    ///
    /// # Errors
    ///
    /// - [`ResetError::TokenRequired`] for an empty token (no lookup is made).
    /// - [`ResetError::Validation`] when the password fails the policy.
    /// - [`ResetError::InvalidToken`] for unknown, expired or used tokens.
    /// - [`ResetError::Upstream`] when the identity update fails; the token
    ///   remains usable.
    async fn reset_password(&self, raw_token: &str, new_password: &str) -> Result<(), ResetError>;
}
