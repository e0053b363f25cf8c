// src/analyze/fallback.rs
//! Degraded output tiers for categories whose generation failed.
//!
//! Tier 1 re-scores the candidates at a stricter bar and wraps the few
//! survivors as raw-summary records. Tier 2 is the empty list: an explicit
//! "no relevant content" beats irrelevant filler. Fallback records never
//! carry fabricated analysis text.

use crate::config::CategoryCfg;
use crate::ingest::types::Candidate;
use crate::relevance::RelevanceScorer;

use super::AnalysisRecord;

/// Shown in place of generated analysis; visibly lower-confidence.
pub const FALLBACK_NOTICE: &str = "AI 분석을 생성하지 못해 수집된 기사 요약으로 대체합니다.";

pub fn build_fallback(
    candidates: &[Candidate],
    category: &CategoryCfg,
    scorer: &RelevanceScorer,
    min_score: f32,
    cap: usize,
) -> Vec<AnalysisRecord> {
    scorer
        .filter(candidates, &category.terms, min_score)
        .into_iter()
        .take(cap)
        .map(|(c, _)| AnalysisRecord {
            headline: c.title.clone(),
            fact: c.description.clone(),
            significance: FALLBACK_NOTICE.to_string(),
            business_impact: String::new(),
            actions: Vec::new(),
            source_link: c.link,
            source_date: c.published_at,
            is_fallback: true,
        })
        .collect()
}
