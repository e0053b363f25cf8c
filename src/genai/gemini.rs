// src/genai/gemini.rs
//! Gemini `generateContent` provider with per-attempt failure classification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use super::{AttemptOutcome, FailureKind, GenProvider};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    /// Reads `GEMINI_API_KEY`. A missing key classifies every attempt as
    /// fatal rather than panicking at construction.
    pub fn from_env() -> Self {
        let api_key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent("hr-trend-digest/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client");
        Self {
            http,
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[derive(Serialize)]
struct Req<'a> {
    contents: Vec<Content<'a>>,
}
#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}
#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    candidates: Vec<RespCandidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<PromptFeedback>,
}
#[derive(Deserialize)]
struct RespCandidate {
    content: Option<RespContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}
#[derive(Deserialize)]
struct RespContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}
#[derive(Deserialize)]
struct RespPart {
    text: Option<String>,
}
#[derive(Deserialize)]
struct PromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

#[async_trait]
impl GenProvider for GeminiProvider {
    async fn attempt(&self, prompt: &str) -> AttemptOutcome {
        if self.api_key.is_empty() {
            warn!(target: "genai", "GEMINI_API_KEY is not set");
            return AttemptOutcome::Fatal(FailureKind::Unknown);
        }

        let url = format!("{API_BASE}/{}:generateContent", self.model);
        let req = Req {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp = match self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return AttemptOutcome::Retry(FailureKind::Timeout),
            Err(e) => {
                warn!(target: "genai", error = ?e, "gemini transport error");
                return AttemptOutcome::Retry(FailureKind::Unknown);
            }
        };

        let status = resp.status();
        if status.as_u16() == 429 {
            return AttemptOutcome::Retry(FailureKind::RateLimit);
        }
        if !status.is_success() {
            return AttemptOutcome::Retry(FailureKind::Http(status.as_u16()));
        }

        let body: Resp = match resp.json().await {
            Ok(b) => b,
            Err(_) => return AttemptOutcome::Retry(FailureKind::Parse),
        };

        // A block reason makes retrying pointless.
        if let Some(reason) = body.prompt_feedback.and_then(|fb| fb.block_reason) {
            return AttemptOutcome::Fatal(FailureKind::Blocked(reason));
        }

        let text: String = body
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            if let Some(reason) = body
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .filter(|r| r.eq_ignore_ascii_case("safety"))
            {
                return AttemptOutcome::Fatal(FailureKind::Blocked(reason.to_string()));
            }
            return AttemptOutcome::Retry(FailureKind::NoCandidates);
        }

        AttemptOutcome::Success(text)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
