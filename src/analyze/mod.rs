// src/analyze/mod.rs
//! Category analysis: prompt assembly, generation, extraction, and
//! reference-id resolution back to source candidates.

pub mod fallback;

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::config::CategoryCfg;
use crate::genai::extract::extract_json;
use crate::genai::{FailureKind, GenerationClient};
use crate::ingest::types::Candidate;

/// One analyzed item of the edition. Always traces back to exactly one
/// candidate through the resolved reference id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub headline: String,
    pub fact: String,
    pub significance: String,
    pub business_impact: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    pub source_link: String,
    pub source_date: u64,
    pub is_fallback: bool,
}

/// Shape demanded from the generator. Lenient on missing prose fields,
/// strict on the reference id.
#[derive(Debug, Deserialize)]
struct GeneratedItem {
    #[serde(rename = "ref")]
    reference: Value,
    headline: Option<String>,
    fact: Option<String>,
    significance: Option<String>,
    business_impact: Option<String>,
    #[serde(default)]
    actions: Vec<String>,
}

/// Accept the reference id as a JSON number or a numeric string; the
/// generator is not consistent about which it emits.
fn resolve_ref(v: &Value) -> Option<u32> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|x| u32::try_from(x).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

/// Number every candidate and render the context block fed to the prompt.
/// Ids are explicit so an omitted or reordered item in the reply still maps
/// back to its source; array position is never trusted.
fn build_context(candidates: &[Candidate]) -> (String, HashMap<u32, &Candidate>) {
    let mut ctx = String::new();
    let mut by_ref = HashMap::new();
    for (i, c) in candidates.iter().enumerate() {
        let id = i as u32 + 1;
        let _ = writeln!(&mut ctx, "[{id}] 제목: {}", c.title);
        if !c.description.is_empty() {
            let _ = writeln!(&mut ctx, "    요약: {}", c.description);
        }
        by_ref.insert(id, c);
    }
    (ctx, by_ref)
}

fn render_prompt(template: &str, count: usize, context: &str) -> String {
    template
        .replace("{count}", &count.to_string())
        .replace("{context}", context)
}

pub struct CategoryAnalyzer<'a> {
    client: &'a GenerationClient,
}

impl<'a> CategoryAnalyzer<'a> {
    pub fn new(client: &'a GenerationClient) -> Self {
        Self { client }
    }

    /// Run one category's candidates through generation and resolution.
    /// Empty input short-circuits without touching the generation service.
    /// Returns the resolved records, or an empty list plus the classified
    /// failure when generation or extraction failed.
    pub async fn analyze(
        &self,
        candidates: &[Candidate],
        category: &CategoryCfg,
        max_picks: usize,
    ) -> (Vec<AnalysisRecord>, Option<FailureKind>) {
        if candidates.is_empty() {
            return (Vec::new(), None);
        }

        let (context, by_ref) = build_context(candidates);
        let prompt = render_prompt(&category.prompt, max_picks.min(candidates.len()), &context);

        let raw = match self.client.generate(&prompt).await {
            Ok(text) => text,
            Err(kind) => return (Vec::new(), Some(kind)),
        };

        let value = match extract_json(&raw) {
            Some(v) => v,
            None => return (Vec::new(), Some(FailureKind::Parse)),
        };
        let items = match value.get("items").and_then(Value::as_array) {
            Some(a) => a,
            None => return (Vec::new(), Some(FailureKind::Parse)),
        };

        let mut out = Vec::new();
        let mut used: HashSet<u32> = HashSet::new();
        for item in items {
            let gi: GeneratedItem = match serde_json::from_value(item.clone()) {
                Ok(gi) => gi,
                Err(_) => continue,
            };
            let Some(id) = resolve_ref(&gi.reference) else {
                warn!(target: "analyze", category = %category.id, "item carries a non-numeric ref");
                continue;
            };
            let Some(cand) = by_ref.get(&id) else {
                // Hallucinated out-of-range id; drop rather than guess.
                warn!(target: "analyze", category = %category.id, id, "item references an unknown candidate");
                continue;
            };
            if !used.insert(id) {
                continue;
            }
            out.push(AnalysisRecord {
                headline: gi.headline.unwrap_or_else(|| cand.title.clone()),
                fact: gi.fact.unwrap_or_default(),
                significance: gi.significance.unwrap_or_default(),
                business_impact: gi.business_impact.unwrap_or_default(),
                actions: gi.actions,
                source_link: cand.link.clone(),
                source_date: cand.published_at,
                is_fallback: false,
            });
        }
        (out, None)
    }
}
