// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use tracing::warn;

use super::{AlertNotifier, EditionPayload, OperatorAlert};

pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    recipients: Vec<Mailbox>,
    operator: Mailbox,
}

impl EmailSender {
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SMTP_HOST").context("SMTP_HOST missing")?;
        let user = std::env::var("SMTP_USER").context("SMTP_USER missing")?;
        let pass = std::env::var("SMTP_PASS").context("SMTP_PASS missing")?;
        let from_addr = std::env::var("DIGEST_FROM").context("DIGEST_FROM missing")?;
        let to_addrs = std::env::var("DIGEST_RECIPIENTS").context("DIGEST_RECIPIENTS missing")?;

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(creds)
            .build();

        let from: Mailbox = from_addr.parse().context("invalid DIGEST_FROM")?;
        let recipients = to_addrs
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Mailbox>()
                    .with_context(|| format!("invalid recipient `{s}`"))
            })
            .collect::<Result<Vec<_>>>()?;
        anyhow::ensure!(!recipients.is_empty(), "DIGEST_RECIPIENTS is empty");

        // Alerts go to a dedicated operator address when configured,
        // otherwise back to the sender.
        let operator = match std::env::var("OPERATOR_EMAIL") {
            Ok(addr) => addr.parse().context("invalid OPERATOR_EMAIL")?,
            Err(_) => from.clone(),
        };

        Ok(Self {
            mailer,
            from,
            recipients,
            operator,
        })
    }

    /// Deliver one edition. Sends are per-recipient; a failed recipient is
    /// logged and skipped. Returns how many deliveries succeeded.
    pub async fn send_edition(&self, payload: &EditionPayload) -> usize {
        let mut delivered = 0usize;
        for to in &self.recipients {
            let msg = match Message::builder()
                .from(self.from.clone())
                .to(to.clone())
                .subject(payload.subject.clone())
                .header(header::ContentType::TEXT_HTML)
                .body(payload.html.clone())
            {
                Ok(m) => m,
                Err(e) => {
                    warn!(target: "notify", error = ?e, "building edition message failed");
                    continue;
                }
            };
            match self.mailer.send(msg).await {
                Ok(_) => delivered += 1,
                Err(e) => {
                    warn!(target: "notify", recipient = %to, error = ?e, "edition delivery failed")
                }
            }
        }
        delivered
    }
}

#[async_trait::async_trait]
impl AlertNotifier for EmailSender {
    async fn send_alert(&self, alert: &OperatorAlert) -> Result<()> {
        let subject = format!("digest alert: {:?} edition", alert.edition);
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.operator.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(alert.body.clone())
            .context("build alert email")?;
        self.mailer.send(msg).await.context("send alert email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
