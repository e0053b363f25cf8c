// src/ingest/types.rs
use anyhow::Result;

/// One fetched news item before relevance filtering or analysis. Immutable
/// for the rest of the run once the engine has stamped the category id.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub title: String,
    pub link: String,
    pub description: String,
    pub published_at: u64, // unix seconds
    pub category: String,  // config-driven category id, stamped by the engine
}

#[async_trait::async_trait]
pub trait NewsProvider: Send + Sync {
    /// Search recent items for one query, capped at `limit`. Transport or
    /// parse problems surface as `Err`; callers treat them as zero results.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>>;
    fn name(&self) -> &'static str;
}
