// src/config.rs
//! Digest configuration: categories, thresholds, pacing, and retry policy.
//! Loaded from TOML; the path and a few knobs can be overridden from the
//! environment.

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "config/digest.toml";
pub const ENV_CONFIG_PATH: &str = "DIGEST_CONFIG_PATH";
pub const ENV_MIN_SCORE: &str = "DIGEST_MIN_SCORE";

fn default_min_score() -> f32 {
    0.3
}
fn default_fallback_min_score() -> f32 {
    0.6
}
fn default_fallback_cap() -> usize {
    2
}
fn default_dedup_threshold() -> f32 {
    0.4
}
fn default_category_pause() -> u64 {
    4
}
fn default_lookback_days() -> i64 {
    7
}
fn default_max_results() -> usize {
    10
}
fn default_max_picks() -> usize {
    3
}
fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay() -> u64 {
    2
}

#[derive(Debug, Clone, Deserialize)]
pub struct DigestConfig {
    pub digest: DigestSection,
    #[serde(default)]
    pub retry: RetrySection,
    pub categories: Vec<CategoryCfg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DigestSection {
    #[serde(default = "default_min_score")]
    pub min_score: f32,
    /// Stricter bar applied when wrapping fallback records.
    #[serde(default = "default_fallback_min_score")]
    pub fallback_min_score: f32,
    #[serde(default = "default_fallback_cap")]
    pub fallback_cap: usize,
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f32,
    /// Fixed pause between category generation calls (rate-limit contract).
    #[serde(default = "default_category_pause")]
    pub category_pause_secs: u64,
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_max_picks")]
    pub max_picks: usize,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetrySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay")]
    pub base_delay_secs: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay(),
        }
    }
}

/// One digest category. Order matters: earlier categories are
/// dedup-primary over later ones.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCfg {
    pub id: String,
    /// Section heading in the rendered edition.
    pub title: String,
    /// Search keyword; the engine appends the recency clause.
    pub query: String,
    pub terms: Vec<String>,
    /// Prompt template with `{count}` and `{context}` placeholders.
    pub prompt: String,
}

fn parse_score_env(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .map(|v| v.clamp(0.0, 1.0))
}

impl DigestConfig {
    /// Load from TOML. Uses DIGEST_CONFIG_PATH or defaults to
    /// "config/digest.toml"; DIGEST_MIN_SCORE overrides the file value.
    pub fn from_toml() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let content = fs::read_to_string(&path).map_err(|e| {
            anyhow::anyhow!("Failed to read digest config at {}: {}", path.display(), e)
        })?;

        let mut cfg = Self::from_toml_str(&content)?;
        if let Some(v) = parse_score_env(std::env::var(ENV_MIN_SCORE).ok()) {
            cfg.digest.min_score = v;
        }
        Ok(cfg)
    }

    /// Load from a TOML string and sanitize out-of-range values.
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let mut cfg: DigestConfig = toml::from_str(toml_str)?;
        anyhow::ensure!(
            !cfg.categories.is_empty(),
            "digest config declares no categories"
        );
        for c in &cfg.categories {
            anyhow::ensure!(!c.id.trim().is_empty(), "category with empty id");
            anyhow::ensure!(
                c.prompt.contains("{context}"),
                "category `{}` prompt lacks a {{context}} placeholder",
                c.id
            );
        }

        let d = &mut cfg.digest;
        d.min_score = d.min_score.clamp(0.0, 1.0);
        d.fallback_min_score = d.fallback_min_score.clamp(0.0, 1.0);
        d.dedup_threshold = d.dedup_threshold.clamp(0.0, 1.0);
        if d.max_picks == 0 {
            d.max_picks = default_max_picks();
        }
        if cfg.retry.max_attempts == 0 {
            cfg.retry.max_attempts = 1;
        }
        Ok(cfg)
    }
}
