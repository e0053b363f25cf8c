// tests/generation_retry.rs
// Retry, backoff, and classification behavior of the generation client
// against scripted providers. No network, no real sleeps beyond a few ms.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use hr_trend_digest::genai::{
    AttemptOutcome, BackoffPolicy, FailureKind, GenProvider, GenerationClient, LinearBackoff,
};

/// Pops scripted outcomes in order; repeats the last one when exhausted.
struct ScriptedProvider {
    script: Mutex<Vec<AttemptOutcome>>,
    calls: Mutex<u32>,
}

impl ScriptedProvider {
    fn new(script: Vec<AttemptOutcome>) -> Self {
        assert!(!script.is_empty());
        Self {
            script: Mutex::new(script),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl GenProvider for ScriptedProvider {
    async fn attempt(&self, _prompt: &str) -> AttemptOutcome {
        *self.calls.lock().unwrap() += 1;
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.remove(0)
        } else {
            script[0].clone()
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Records every delay the client asks for, delegating to a linear policy
/// with a tiny base so the test still observes the 1×/2×/3× progression.
struct RecordingBackoff {
    inner: LinearBackoff,
    delays: Mutex<Vec<Duration>>,
}

impl RecordingBackoff {
    fn new(base: Duration) -> Self {
        Self {
            inner: LinearBackoff { base },
            delays: Mutex::new(Vec::new()),
        }
    }

    fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

impl BackoffPolicy for RecordingBackoff {
    fn delay(&self, attempt: u32) -> Duration {
        let d = self.inner.delay(attempt);
        self.delays.lock().unwrap().push(d);
        d
    }
}

const BASE: Duration = Duration::from_millis(1);

#[tokio::test]
async fn three_rate_limits_exhaust_the_budget_with_growing_waits() {
    let provider = Arc::new(ScriptedProvider::new(vec![AttemptOutcome::Retry(
        FailureKind::RateLimit,
    )]));
    let backoff = Arc::new(RecordingBackoff::new(BASE));
    let client = GenerationClient::new(provider.clone(), backoff.clone(), 3);

    let out = client.generate("prompt").await;
    assert_eq!(out, Err(FailureKind::RateLimit));
    assert_eq!(provider.calls(), 3, "never exceeds max attempts");
    assert_eq!(backoff.delays(), vec![BASE, BASE * 2, BASE * 3]);
}

#[tokio::test]
async fn blocked_content_is_never_retried() {
    let provider = Arc::new(ScriptedProvider::new(vec![AttemptOutcome::Fatal(
        FailureKind::Blocked("SAFETY".into()),
    )]));
    let backoff = Arc::new(RecordingBackoff::new(BASE));
    let client = GenerationClient::new(provider.clone(), backoff.clone(), 5);

    let out = client.generate("prompt").await;
    assert_eq!(out, Err(FailureKind::Blocked("SAFETY".into())));
    assert_eq!(provider.calls(), 1);
    assert!(backoff.delays().is_empty(), "fatal outcomes skip backoff");
}

#[tokio::test]
async fn success_after_transient_failures() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        AttemptOutcome::Retry(FailureKind::Timeout),
        AttemptOutcome::Retry(FailureKind::Http(503)),
        AttemptOutcome::Success("생성된 텍스트".into()),
    ]));
    let backoff = Arc::new(RecordingBackoff::new(BASE));
    let client = GenerationClient::new(provider.clone(), backoff.clone(), 5);

    let out = client.generate("prompt").await;
    assert_eq!(out, Ok("생성된 텍스트".to_string()));
    assert_eq!(provider.calls(), 3);
    assert_eq!(backoff.delays().len(), 2);
}

#[tokio::test]
async fn exhaustion_reports_the_last_classified_kind() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        AttemptOutcome::Retry(FailureKind::RateLimit),
        AttemptOutcome::Retry(FailureKind::NoCandidates),
        AttemptOutcome::Retry(FailureKind::Timeout),
    ]));
    let client = GenerationClient::new(provider.clone(), Arc::new(RecordingBackoff::new(BASE)), 3);

    let out = client.generate("prompt").await;
    assert_eq!(out, Err(FailureKind::Timeout));
}

#[tokio::test]
async fn zero_max_attempts_is_clamped_to_one() {
    let provider = Arc::new(ScriptedProvider::new(vec![AttemptOutcome::Success(
        "ok".into(),
    )]));
    let client = GenerationClient::new(provider.clone(), Arc::new(RecordingBackoff::new(BASE)), 0);

    assert_eq!(client.generate("prompt").await, Ok("ok".to_string()));
    assert_eq!(provider.calls(), 1);
}
