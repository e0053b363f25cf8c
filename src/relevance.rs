// src/relevance.rs
//! Relevance gate: per-category term matching with a fixed saturation point.
//!
//! A cheap lexical filter in front of the expensive generation step. The
//! score counts how many category terms occur in title+description and
//! saturates after a handful of hits; a couple of matching terms is already
//! sufficient signal.

use tracing::info;

use crate::ingest::types::Candidate;

/// Number of term hits at which the score saturates to 1.0.
const SATURATION: f32 = 3.0;

// Dev logging gate: DIGEST_DEV_LOG=1 and a debug build.
pub(crate) fn dev_logging_enabled() -> bool {
    cfg!(debug_assertions) && std::env::var("DIGEST_DEV_LOG").ok().as_deref() == Some("1")
}

// Anonymized id for dev diagnostics; raw titles never reach the log.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

fn dev_log_score(candidate: &Candidate, hits: usize, score: f32, min_score: f32) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(&candidate.title);
    info!(target: "relevance", %id, hits, %score, %min_score, "scored candidate");
}

#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer;

impl RelevanceScorer {
    /// Score a candidate against one category's term set. Deterministic for a
    /// fixed candidate and term list; always in [0.0, 1.0].
    pub fn score(&self, candidate: &Candidate, terms: &[String]) -> f32 {
        let haystack = format!("{} {}", candidate.title, candidate.description);
        let hits = terms
            .iter()
            .filter(|t| !t.is_empty() && haystack.contains(t.as_str()))
            .count();
        (hits as f32 / SATURATION).min(1.0)
    }

    /// Score, drop below `min_score`, and rank descending. The sort is stable,
    /// so candidates with equal scores keep their fetch order.
    pub fn filter(
        &self,
        candidates: &[Candidate],
        terms: &[String],
        min_score: f32,
    ) -> Vec<(Candidate, f32)> {
        let mut kept: Vec<(Candidate, f32)> = candidates
            .iter()
            .filter_map(|c| {
                let score = self.score(c, terms);
                let hits = (score * SATURATION).round() as usize;
                dev_log_score(c, hits, score, min_score);
                (score >= min_score).then(|| (c.clone(), score))
            })
            .collect();
        kept.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        kept
    }
}
