// src/genai/mod.rs
//! Generation client: provider abstraction, retry loop, and typed failure
//! classification.
//!
//! Providers classify each attempt (`Success` / `Retry` / `Fatal`); the
//! retry policy itself lives centrally in [`GenerationClient`]. That split is
//! what lets callers distinguish "try again" failures from "stop now"
//! failures (blocked content) without per-call special-casing.

pub mod extract;
pub mod gemini;

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Failure taxonomy for generation outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    RateLimit,
    Http(u16),
    Blocked(String),
    NoCandidates,
    Timeout,
    Parse,
    Unknown,
}

/// Classified result of a single provider attempt.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Success(String),
    Retry(FailureKind),
    Fatal(FailureKind),
}

#[async_trait::async_trait]
pub trait GenProvider: Send + Sync {
    /// One remote attempt. Never panics; every transport or service problem
    /// maps onto a classified outcome.
    async fn attempt(&self, prompt: &str) -> AttemptOutcome;
    fn name(&self) -> &'static str;
}

/// Maps a 1-based failed attempt number to the wait before the next try.
/// Injected so tests can observe or zero the waits.
pub trait BackoffPolicy: Send + Sync {
    fn delay(&self, attempt: u32) -> Duration;
}

/// `base × attempt`: linear, not fixed, so consecutive rate limits space out.
#[derive(Debug, Clone, Copy)]
pub struct LinearBackoff {
    pub base: Duration,
}

impl BackoffPolicy for LinearBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        self.base * attempt
    }
}

/// Zero-delay policy for deterministic tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBackoff;

impl BackoffPolicy for NoBackoff {
    fn delay(&self, _attempt: u32) -> Duration {
        Duration::ZERO
    }
}

pub struct GenerationClient {
    provider: Arc<dyn GenProvider>,
    backoff: Arc<dyn BackoffPolicy>,
    max_attempts: u32,
}

impl GenerationClient {
    pub fn new(
        provider: Arc<dyn GenProvider>,
        backoff: Arc<dyn BackoffPolicy>,
        max_attempts: u32,
    ) -> Self {
        Self {
            provider,
            backoff,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Drive the provider until success, a fatal classification, or attempt
    /// exhaustion. Every failed retryable attempt is followed by the policy
    /// wait, the last one included; exhaustion surfaces the last kind.
    pub async fn generate(&self, prompt: &str) -> Result<String, FailureKind> {
        let mut last = FailureKind::Unknown;
        for attempt in 1..=self.max_attempts {
            match self.provider.attempt(prompt).await {
                AttemptOutcome::Success(text) => {
                    counter!("gen_success_total").increment(1);
                    return Ok(text);
                }
                AttemptOutcome::Fatal(kind) => {
                    warn!(
                        target: "genai",
                        provider = self.provider.name(),
                        attempt,
                        kind = ?kind,
                        "generation failed fatally"
                    );
                    counter!("gen_fatal_total").increment(1);
                    return Err(kind);
                }
                AttemptOutcome::Retry(kind) => {
                    warn!(
                        target: "genai",
                        provider = self.provider.name(),
                        attempt,
                        kind = ?kind,
                        "generation attempt failed"
                    );
                    counter!("gen_retry_total").increment(1);
                    last = kind;
                    let wait = self.backoff.delay(attempt);
                    if !wait.is_zero() {
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }
        counter!("gen_exhausted_total").increment(1);
        Err(last)
    }
}
