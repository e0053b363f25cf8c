// src/ingest/providers/google_news.rs
//! Google News RSS search provider (Korean locale).

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime, UtcOffset};

use crate::ingest::types::{Candidate, NewsProvider};
use crate::normalize;

const SEARCH_URL: &str = "https://news.google.com/rss/search";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822_to_unix(ts: &str) -> u64 {
    OffsetDateTime::parse(ts, &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .and_then(|x| u64::try_from(x).ok())
        .unwrap_or(0)
}

pub struct GoogleNewsProvider {
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http {
        base: String,
        client: reqwest::Client,
    },
}

impl GoogleNewsProvider {
    pub fn new() -> Self {
        Self::from_base(SEARCH_URL)
    }

    pub fn from_base(base: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent("hr-trend-digest/0.1")
            .connect_timeout(std::time::Duration::from_secs(5))
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("reqwest client");
        Self {
            mode: Mode::Http {
                base: base.into(),
                client,
            },
        }
    }

    /// Parse a captured RSS payload instead of fetching; used in tests.
    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Fixture(s.to_string()),
        }
    }

    fn parse_items_from_str(s: &str, limit: usize) -> Result<Vec<Candidate>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing google news rss xml")?;

        let mut out = Vec::new();
        for it in rss.channel.item {
            if out.len() >= limit {
                break;
            }
            let title = normalize::strip(it.title.as_deref().unwrap_or_default());
            if title.is_empty() {
                continue;
            }
            out.push(Candidate {
                title,
                link: it.link.unwrap_or_default(),
                description: normalize::strip(it.description.as_deref().unwrap_or_default()),
                published_at: it
                    .pub_date
                    .as_deref()
                    .map(parse_rfc2822_to_unix)
                    .unwrap_or(0),
                category: String::new(), // stamped by the engine
            });
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_parse_ms").record(ms);
        counter!("ingest_items_total").increment(out.len() as u64);
        Ok(out)
    }
}

impl Default for GoogleNewsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsProvider for GoogleNewsProvider {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>> {
        match &self.mode {
            Mode::Fixture(s) => Self::parse_items_from_str(s, limit),

            Mode::Http { base, client } => {
                let resp = client
                    .get(base)
                    .query(&[("q", query), ("hl", "ko"), ("gl", "KR"), ("ceid", "KR:ko")])
                    .send()
                    .await
                    .context("google news http get()")?;
                let body = resp.text().await.context("google news http .text()")?;
                Self::parse_items_from_str(&body, limit)
            }
        }
    }

    fn name(&self) -> &'static str {
        "GoogleNews"
    }
}

// Named entities Google News leaves undeclared in its RSS payloads.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&middot;", "\u{00B7}")
}
