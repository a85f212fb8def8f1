//! `SeaORM` implementation of the `PasswordResetService` trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::clients::{IdentityError, IdentityProvider};
use crate::config::SecurityConfig;
use crate::db::Store;
use crate::security;
use crate::services::password_reset_service::{PasswordResetService, ResetError};

pub struct SeaOrmPasswordResetService {
    store: Store,
    identity: Arc<dyn IdentityProvider>,
    security: SecurityConfig,
    identity_timeout: Duration,
}

impl SeaOrmPasswordResetService {
    #[must_use]
    pub fn new(
        store: Store,
        identity: Arc<dyn IdentityProvider>,
        security: SecurityConfig,
        identity_timeout: Duration,
    ) -> Self {
        Self {
            store,
            identity,
            security,
            identity_timeout,
        }
    }

    fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.security.reset_token_ttl_minutes))
    }
}

#[async_trait]
impl PasswordResetService for SeaOrmPasswordResetService {
    async fn request_reset(&self, email: &str) -> Result<String, ResetError> {
        let email = email.trim().to_lowercase();

        // The lookup result is not allowed to change the outcome.
        if let Err(e) = self.store.get_user_by_email(&email).await {
            debug!(error = %e, "User lookup during reset request failed");
        }

        let raw = security::generate_reset_token();
        let expires_at = Utc::now() + self.token_ttl();

        self.store
            .create_reset_token(&email, &security::hash_token(&raw), expires_at)
            .await?;

        metrics::counter!("password_reset_requests_total").increment(1);
        info!(%expires_at, "Password reset token issued");

        Ok(raw)
    }

    async fn reset_password(&self, raw_token: &str, new_password: &str) -> Result<(), ResetError> {
        if raw_token.is_empty() {
            return Err(ResetError::TokenRequired);
        }

        security::validate_password(new_password, self.security.password_min_length)
            .map_err(ResetError::Validation)?;

        let token_hash = security::hash_token(raw_token);
        let Some(record) = self
            .store
            .find_valid_reset_token(&token_hash, Utc::now())
            .await?
        else {
            metrics::counter!("password_reset_redemptions_total", "outcome" => "invalid")
                .increment(1);
            return Err(ResetError::InvalidToken);
        };

        let remote = tokio::time::timeout(
            self.identity_timeout,
            self.identity
                .reset_password_for_email(&record.email, new_password),
        )
        .await;

        match remote {
            Ok(Ok(())) => {}
            Ok(Err(IdentityError::UserNotFound)) => {
                warn!(token_id = record.id, "Reset token refers to an account unknown upstream");
                return Err(ResetError::InvalidToken);
            }
            Ok(Err(e)) => {
                metrics::counter!("password_reset_redemptions_total", "outcome" => "upstream_error")
                    .increment(1);
                return Err(ResetError::Upstream(e.to_string()));
            }
            Err(_) => {
                metrics::counter!("password_reset_redemptions_total", "outcome" => "upstream_error")
                    .increment(1);
                return Err(ResetError::Upstream(
                    "identity provider timed out".to_string(),
                ));
            }
        }

        // From here on the identity provider already holds the new password.
        let local = async {
            let hash = security::hash_password(new_password, &self.security).await?;
            if !self
                .store
                .update_user_password_hash(&record.email, &hash)
                .await?
            {
                anyhow::bail!("no local user row for reset token {}", record.id);
            }
            Ok::<(), anyhow::Error>(())
        }
        .await;

        if let Err(e) = local {
            error!(
                token_id = record.id,
                error = %e,
                "Password changed upstream but local credential update failed"
            );
            return Err(ResetError::Internal(e.to_string()));
        }

        match self.store.mark_reset_token_used(record.id).await {
            Ok(true) => {}
            Ok(false) => warn!(token_id = record.id, "Reset token was consumed concurrently"),
            Err(e) => {
                error!(
                    token_id = record.id,
                    error = %e,
                    "Password changed but reset token could not be marked used"
                );
                return Err(ResetError::Internal(e.to_string()));
            }
        }

        metrics::counter!("password_reset_redemptions_total", "outcome" => "success").increment(1);
        info!(token_id = record.id, "Password reset completed");

        Ok(())
    }
}
