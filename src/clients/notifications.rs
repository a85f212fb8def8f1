use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::NotificationConfig;

/// Payload accepted by the notification service.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationRequest {
    pub email: String,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub token: String,
    pub timestamp: String,
}

impl NotificationRequest {
    #[must_use]
    pub fn password_reset(email: &str, token: &str) -> Self {
        Self {
            email: email.to_string(),
            title: "Password reset requested".to_string(),
            message: "A password reset was requested for your account. If this was you, please follow the reset instructions.".to_string(),
            kind: "system_alert".to_string(),
            token: token.to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Best-effort client for the sibling notification service.
///
/// Without a configured URL every call is a no-op.
pub struct NotificationDispatcher {
    client: Client,
    url: Option<String>,
    service_token: String,
}

impl NotificationDispatcher {
    pub fn new(config: &NotificationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("userservice/1.0")
            .build()
            .context("Failed to build notification HTTP client")?;

        let url = Some(config.url.trim().to_string()).filter(|u| !u.is_empty());

        Ok(Self {
            client,
            url,
            service_token: config.service_token.clone(),
        })
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    pub async fn notify(&self, request: &NotificationRequest) -> Result<()> {
        let Some(url) = &self.url else {
            debug!("Notification service not configured, skipping");
            return Ok(());
        };

        let mut builder = self.client.post(url).json(request);
        if !self.service_token.is_empty() {
            builder = builder.header("X-Service-Token", &self.service_token);
        }

        let response = builder
            .send()
            .await
            .context("Failed to reach notification service")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Notification service returned status={status}");
        }

        Ok(())
    }

    /// Sends on a detached task. The outcome is only logged and counted.
    pub fn dispatch(self: &Arc<Self>, request: NotificationRequest) {
        if !self.is_enabled() {
            return;
        }

        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = match dispatcher.notify(&request).await {
                Ok(()) => "success",
                Err(e) => {
                    warn!(error = %e, "Notification dispatch failed");
                    "error"
                }
            };
            metrics::counter!("notification_calls_total", "outcome" => outcome).increment(1);
        });
    }
}
