// src/notify/mod.rs
//! Delivery surfaces: edition e-mail plus operator alert channels.

pub mod email;
pub mod slack;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::decision::Edition;

/// A rendered edition ready for delivery.
#[derive(Debug, Clone)]
pub struct EditionPayload {
    pub subject: String,
    pub html: String,
    pub edition: Edition,
    pub ts: DateTime<Utc>,
}

/// Operator-facing alert for degraded or suppressed runs. Distinct from the
/// digest itself so a suppressed run still leaves a record.
#[derive(Debug, Clone)]
pub struct OperatorAlert {
    pub edition: Edition,
    pub warnings: Vec<String>,
    pub body: String,
    pub ts: DateTime<Utc>,
}

#[async_trait]
pub trait AlertNotifier: Send + Sync {
    async fn send_alert(&self, alert: &OperatorAlert) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Fan-out to every configured alert channel; one failing channel never
/// silences the others.
#[derive(Default)]
pub struct AlertMux {
    channels: Vec<std::sync::Arc<dyn AlertNotifier>>,
}

impl AlertMux {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, channel: std::sync::Arc<dyn AlertNotifier>) {
        self.channels.push(channel);
    }

    pub async fn send_all(&self, alert: &OperatorAlert) {
        for ch in &self.channels {
            if let Err(e) = ch.send_alert(alert).await {
                warn!(target: "notify", channel = ch.name(), error = ?e, "operator alert channel failed");
            }
        }
    }
}
