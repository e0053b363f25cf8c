//! Weekly HR Digest — Binary Entrypoint
//! Runs the pipeline exactly once and exits; scheduling lives outside
//! (cron or a workflow runner).

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hr_trend_digest::config::DigestConfig;
use hr_trend_digest::decision::Edition;
use hr_trend_digest::engine::DigestEngine;
use hr_trend_digest::genai::gemini::GeminiProvider;
use hr_trend_digest::genai::{GenerationClient, LinearBackoff};
use hr_trend_digest::ingest::providers::google_news::GoogleNewsProvider;
use hr_trend_digest::notify::email::EmailSender;
use hr_trend_digest::notify::slack::WebhookNotifier;
use hr_trend_digest::notify::{AlertMux, EditionPayload, OperatorAlert};
use hr_trend_digest::render;
use hr_trend_digest::reply::{FileReplyChannel, NoReplyChannel, ReplyChannel};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = DigestConfig::from_toml()?;

    let news = Arc::new(GoogleNewsProvider::new());
    let client = GenerationClient::new(
        Arc::new(GeminiProvider::from_env()),
        Arc::new(LinearBackoff {
            base: Duration::from_secs(cfg.retry.base_delay_secs),
        }),
        cfg.retry.max_attempts,
    );
    let reply: Arc<dyn ReplyChannel> = match std::env::var("REPLY_DROP_PATH") {
        Ok(path) => Arc::new(FileReplyChannel::new(path)),
        Err(_) => Arc::new(NoReplyChannel),
    };

    let engine = DigestEngine::new(cfg, news, client, reply);
    let run = engine.run_once().await;

    let now = Utc::now();
    let mut alerts = AlertMux::new();
    alerts.push(Arc::new(WebhookNotifier::from_env()));
    let mailer = match EmailSender::from_env() {
        Ok(m) => Some(Arc::new(m)),
        Err(e) => {
            warn!(error = ?e, "mail transport unavailable");
            None
        }
    };
    if let Some(m) = &mailer {
        alerts.push(m.clone());
    }

    let alert = OperatorAlert {
        edition: run.decision.edition,
        warnings: run.decision.warnings.clone(),
        body: render::render_alert(&run.decision),
        ts: now,
    };

    if run.decision.should_publish {
        let date = render::display_date(&now);
        let window = render::collection_window(&now, engine.config().digest.lookback_days);
        let payload = EditionPayload {
            subject: render::subject(&date),
            html: render::render_edition(&run, &date, &window),
            edition: run.decision.edition,
            ts: now,
        };
        match &mailer {
            Some(m) => {
                let delivered = m.send_edition(&payload).await;
                info!(delivered, edition = ?run.decision.edition, "edition sent");
            }
            None => warn!("no mail transport; edition was not delivered"),
        }
        if run.decision.edition == Edition::Degraded {
            alerts.send_all(&alert).await;
        }
    } else {
        warn!("edition suppressed; notifying operator");
        alerts.send_all(&alert).await;
    }

    Ok(())
}
