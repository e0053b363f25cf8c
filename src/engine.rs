// src/engine.rs
//! Sequential digest pipeline: fetch → dedup → relevance → analysis →
//! fallback → quality gate.
//!
//! The run is deliberately single-threaded and sequential: categories are
//! processed in configured order with a fixed pause between generation
//! calls, and the seen-title set accumulated from resolved categories feeds
//! the next category's cross-category dedup. Parallelizing this would break
//! both the rate-limit contract and the dedup-primacy ordering.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::{info, warn};

use crate::analyze::fallback::build_fallback;
use crate::analyze::{AnalysisRecord, CategoryAnalyzer};
use crate::config::{CategoryCfg, DigestConfig};
use crate::decision::{decide, EditionDecision, SectionStatus};
use crate::dedup::SeenTitles;
use crate::genai::GenerationClient;
use crate::ingest::types::{Candidate, NewsProvider};
use crate::relevance::RelevanceScorer;
use crate::reply::ReplyChannel;

/// One category's resolved block of the edition.
#[derive(Debug, Clone)]
pub struct CategorySection {
    pub id: String,
    pub title: String,
    pub records: Vec<AnalysisRecord>,
    pub used_fallback: bool,
}

/// Everything one scheduled invocation produced.
#[derive(Debug, Clone)]
pub struct DigestRun {
    pub sections: Vec<CategorySection>,
    pub manual: Option<String>,
    pub decision: EditionDecision,
}

pub struct DigestEngine {
    cfg: DigestConfig,
    news: Arc<dyn NewsProvider>,
    client: GenerationClient,
    reply: Arc<dyn ReplyChannel>,
    scorer: RelevanceScorer,
}

impl DigestEngine {
    pub fn new(
        cfg: DigestConfig,
        news: Arc<dyn NewsProvider>,
        client: GenerationClient,
        reply: Arc<dyn ReplyChannel>,
    ) -> Self {
        Self {
            cfg,
            news,
            client,
            reply,
            scorer: RelevanceScorer,
        }
    }

    pub fn config(&self) -> &DigestConfig {
        &self.cfg
    }

    /// Run the whole pipeline once and return the gated result. Never
    /// aborts on a single category's failure; the only run-level "stop" is
    /// the gate's Suppressed verdict, carried inside the returned decision.
    pub async fn run_once(&self) -> DigestRun {
        let since = Utc::now() - chrono::Duration::days(self.cfg.digest.lookback_days);
        let mut seen = SeenTitles::new();
        let mut sections = Vec::with_capacity(self.cfg.categories.len());

        for (i, category) in self.cfg.categories.iter().enumerate() {
            if i > 0 && self.cfg.digest.category_pause_secs > 0 {
                // pacing toward the generation service
                tokio::time::sleep(Duration::from_secs(self.cfg.digest.category_pause_secs)).await;
            }
            let section = self.run_category(category, &since, &mut seen).await;
            info!(
                target: "digest",
                category = %section.id,
                records = section.records.len(),
                fallback = section.used_fallback,
                "category resolved"
            );
            sections.push(section);
        }

        let manual = match self.reply.latest_reply().await {
            Ok(m) => m,
            Err(e) => {
                warn!(target: "digest", error = ?e, "reply channel error; continuing without manual input");
                None
            }
        };

        let statuses: Vec<SectionStatus> = sections
            .iter()
            .map(|s| SectionStatus {
                category: s.id.clone(),
                records: s.records.len(),
                used_fallback: s.used_fallback,
            })
            .collect();
        let decision = decide(&statuses, manual.is_some());
        for w in &decision.warnings {
            warn!(target: "digest", "{w}");
        }
        counter!("digest_runs_total").increment(1);

        DigestRun {
            sections,
            manual,
            decision,
        }
    }

    async fn run_category(
        &self,
        category: &CategoryCfg,
        since: &DateTime<Utc>,
        seen: &mut SeenTitles,
    ) -> CategorySection {
        let query = format!("{} after:{}", category.query, since.format("%Y-%m-%d"));
        let mut raw = match self.news.search(&query, self.cfg.digest.max_results).await {
            Ok(v) => v,
            Err(e) => {
                // Provider trouble is never fatal to the run.
                warn!(
                    target: "ingest",
                    category = %category.id,
                    provider = self.news.name(),
                    error = ?e,
                    "provider error, treating as zero results"
                );
                counter!("digest_provider_errors_total").increment(1);
                Vec::new()
            }
        };
        counter!("digest_candidates_total").increment(raw.len() as u64);
        for c in &mut raw {
            c.category = category.id.clone();
        }

        // Intra-fetch dedup plus cross-category dedup against earlier,
        // already-resolved categories. `seen` is read only, so the current
        // category can never strip a primary category's items.
        let mut local = SeenTitles::new();
        let mut unique: Vec<Candidate> = Vec::with_capacity(raw.len());
        let mut dropped = 0usize;
        for c in raw {
            if local.contains_near(&c.title, self.cfg.digest.dedup_threshold)
                || seen.contains_near(&c.title, self.cfg.digest.dedup_threshold)
            {
                dropped += 1;
                continue;
            }
            local.insert(&c.title);
            unique.push(c);
        }
        counter!("digest_dedup_total").increment(dropped as u64);

        let ranked = self
            .scorer
            .filter(&unique, &category.terms, self.cfg.digest.min_score);
        let picked: Vec<Candidate> = ranked.into_iter().map(|(c, _)| c).collect();

        let analyzer = CategoryAnalyzer::new(&self.client);
        let (mut records, err) = analyzer
            .analyze(&picked, category, self.cfg.digest.max_picks)
            .await;

        let mut used_fallback = false;
        if let Some(kind) = err {
            warn!(
                target: "digest",
                category = %category.id,
                kind = ?kind,
                "analysis failed, applying fallback"
            );
            counter!("digest_fallback_total").increment(1);
            records = build_fallback(
                &picked,
                category,
                &self.scorer,
                self.cfg.digest.fallback_min_score,
                self.cfg.digest.fallback_cap,
            );
            used_fallback = true;
        }

        // This category is now resolved; its full candidate list guards
        // later categories against near-duplicates.
        for c in &unique {
            seen.insert(&c.title);
        }

        CategorySection {
            id: category.id.clone(),
            title: category.title.clone(),
            records,
            used_fallback,
        }
    }
}
