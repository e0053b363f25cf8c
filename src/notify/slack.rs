// src/notify/slack.rs
use anyhow::{Context, Result};
use reqwest::Client;

use super::{AlertNotifier, OperatorAlert};

/// Webhook alert channel (Slack-compatible payload). Missing configuration
/// disables it silently.
pub struct WebhookNotifier {
    webhook_url: Option<String>,
    client: Client,
}

impl WebhookNotifier {
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var("OPERATOR_WEBHOOK_URL").ok(),
            client: Client::new(),
        }
    }

    /// Builder for tests/tools.
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: Some(url),
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AlertNotifier for WebhookNotifier {
    async fn send_alert(&self, alert: &OperatorAlert) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("webhook alerts disabled (no OPERATOR_WEBHOOK_URL)");
            return Ok(());
        };

        let text = format!(
            "*digest {:?}* @ {}\n{}",
            alert.edition,
            alert.ts.to_rfc3339(),
            alert.warnings.join("\n")
        );
        let body = serde_json::json!({ "text": text });

        self.client
            .post(url)
            .json(&body)
            .send()
            .await
            .context("webhook post")?
            .error_for_status()
            .context("webhook non-2xx")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
