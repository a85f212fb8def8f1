//! Keycloak client: OIDC token grants for end users, admin REST calls for
//! account provisioning and password resets.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::config::IdentityConfig;
use crate::models::TokenSet;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("user not found at identity provider")]
    UserNotFound,

    #[error("email already exists at identity provider")]
    EmailExists,

    #[error("identity provider rejected the credentials")]
    Unauthorized,

    #[error("identity provider timed out")]
    Timeout,

    #[error("identity provider error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Upstream(err.to_string())
        }
    }
}

/// Account profile sent when provisioning a user remotely.
#[derive(Debug, Clone)]
pub struct IdentityAccount<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password: &'a str,
}

#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates the account with its initial password and returns the remote subject id.
    async fn create_user(&self, account: IdentityAccount<'_>) -> Result<String, IdentityError>;

    async fn password_grant(&self, email: &str, password: &str) -> Result<TokenSet, IdentityError>;

    async fn refresh_grant(&self, refresh_token: &str) -> Result<TokenSet, IdentityError>;

    /// # Errors
    ///
    /// Returns [`IdentityError::UserNotFound`] when no remote account has this email.
    async fn reset_password_for_email(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<(), IdentityError>;

    /// Validates a bearer access token and returns its subject.
    async fn verify_access_token(&self, access_token: &str) -> Result<String, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
}

pub struct KeycloakClient {
    client: Client,
    config: IdentityConfig,
}

impl KeycloakClient {
    pub fn new(config: IdentityConfig) -> Result<Self, IdentityError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .user_agent("userservice/1.0")
            .build()
            .map_err(|e| IdentityError::Upstream(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn realm_token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base(),
            self.config.realm
        )
    }

    fn admin_users_url(&self) -> String {
        format!("{}/admin/realms/{}/users", self.base(), self.config.realm)
    }

    async fn admin_token(&self) -> Result<String, IdentityError> {
        let url = format!(
            "{}/realms/master/protocol/openid-connect/token",
            self.base()
        );

        let params = [
            ("client_id", "admin-cli"),
            ("grant_type", "password"),
            ("username", self.config.admin_user.as_str()),
            ("password", self.config.admin_password.as_str()),
        ];

        let response = self.client.post(&url).form(&params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Upstream(format!(
                "admin token request failed: status={status}"
            )));
        }

        let token: TokenSet = response.json().await?;
        Ok(token.access_token)
    }

    async fn find_user_id(&self, admin_token: &str, email: &str) -> Result<String, IdentityError> {
        let url = Url::parse_with_params(
            &self.admin_users_url(),
            &[("email", email), ("exact", "true")],
        )
        .map_err(|e| IdentityError::Upstream(format!("invalid identity URL: {e}")))?;

        let response = self
            .client
            .get(url)
            .bearer_auth(admin_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Upstream(format!(
                "user search failed: status={status}"
            )));
        }

        let found: Vec<RemoteUser> = response.json().await?;
        found
            .into_iter()
            .next()
            .map(|u| u.id)
            .ok_or(IdentityError::UserNotFound)
    }

    async fn set_password(
        &self,
        admin_token: &str,
        user_id: &str,
        password: &str,
    ) -> Result<(), IdentityError> {
        let url = format!("{}/{user_id}/reset-password", self.admin_users_url());

        let response = self
            .client
            .put(&url)
            .bearer_auth(admin_token)
            .json(&json!({
                "type": "password",
                "value": password,
                "temporary": false,
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::NOT_FOUND => Err(IdentityError::UserNotFound),
            status => Err(IdentityError::Upstream(format!(
                "set password failed: status={status}"
            ))),
        }
    }

    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenSet, IdentityError> {
        let response = self
            .client
            .post(self.realm_token_url())
            .form(params)
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => Ok(response.json().await?),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                debug!("Token grant rejected by identity provider");
                Err(IdentityError::Unauthorized)
            }
            status => Err(IdentityError::Upstream(format!(
                "token request failed: status={status}"
            ))),
        }
    }
}

#[async_trait::async_trait]
impl IdentityProvider for KeycloakClient {
    async fn create_user(&self, account: IdentityAccount<'_>) -> Result<String, IdentityError> {
        let admin_token = self.admin_token().await?;

        let response = self
            .client
            .post(self.admin_users_url())
            .bearer_auth(&admin_token)
            .json(&json!({
                "email": account.email,
                "username": account.email,
                "firstName": account.first_name,
                "lastName": account.last_name,
                "enabled": true,
            }))
            .send()
            .await?;

        match response.status() {
            StatusCode::CONFLICT => return Err(IdentityError::EmailExists),
            s if !s.is_success() => {
                return Err(IdentityError::Upstream(format!(
                    "create user failed: status={s}"
                )));
            }
            _ => {}
        }

        let user_id = self.find_user_id(&admin_token, account.email).await?;
        self.set_password(&admin_token, &user_id, account.password)
            .await?;

        Ok(user_id)
    }

    async fn password_grant(&self, email: &str, password: &str) -> Result<TokenSet, IdentityError> {
        self.token_request(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "password"),
            ("username", email),
            ("password", password),
        ])
        .await
    }

    async fn refresh_grant(&self, refresh_token: &str) -> Result<TokenSet, IdentityError> {
        self.token_request(&[
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn reset_password_for_email(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        let admin_token = self.admin_token().await?;
        let user_id = self.find_user_id(&admin_token, email).await?;
        self.set_password(&admin_token, &user_id, new_password)
            .await
    }

    async fn verify_access_token(&self, access_token: &str) -> Result<String, IdentityError> {
        let url = format!(
            "{}/realms/{}/protocol/openid-connect/userinfo",
            self.base(),
            self.config.realm
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => {
                let info: UserInfo = response.json().await?;
                Ok(info.sub)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(IdentityError::Unauthorized),
            status => {
                warn!(%status, "Unexpected userinfo response");
                Err(IdentityError::Upstream(format!(
                    "userinfo failed: status={status}"
                )))
            }
        }
    }
}
