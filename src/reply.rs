// src/reply.rs
//! Auxiliary manual-input channel. Absence of a reply is the normal,
//! expected outcome, not an error.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait ReplyChannel: Send + Sync {
    /// Most recent operator reply body, if one arrived since the last run.
    async fn latest_reply(&self) -> Result<Option<String>>;
}

/// No channel configured.
pub struct NoReplyChannel;

#[async_trait]
impl ReplyChannel for NoReplyChannel {
    async fn latest_reply(&self) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Reads a drop file left by an external mail poller. The file is consumed
/// on read so one reply feeds at most one edition.
pub struct FileReplyChannel {
    path: PathBuf,
}

impl FileReplyChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReplyChannel for FileReplyChannel {
    async fn latest_reply(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(s) => {
                let body = s.trim();
                if body.is_empty() {
                    return Ok(None);
                }
                let body = body.to_string();
                tokio::fs::remove_file(&self.path)
                    .await
                    .context("consume reply drop file")?;
                Ok(Some(body))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("read reply drop file"),
        }
    }
}
