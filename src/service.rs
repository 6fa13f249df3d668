//! End-to-end transcript fetch orchestration

use crate::browser::{BrowserLauncher, BrowserPage};
use crate::cache::TranscriptCache;
use crate::config::Config;
use crate::error::Result;
use crate::session::{self, SessionStore};
use crate::{extractor, site};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a transcript came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptSource {
    Cache,
    Fresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub identifier: String,
    pub transcript: String,
    pub source: TranscriptSource,
}

/// Composes cache, session handling, and extraction into "fetch transcript
/// for episode X". One browser instance per fetch, released on every exit
/// path.
pub struct TranscriptService {
    credentials: crate::config::Credentials,
    store: SessionStore,
    cache: Arc<dyn TranscriptCache>,
    launcher: Arc<dyn BrowserLauncher>,
}

impl TranscriptService {
    pub fn new(
        config: &Config,
        cache: Arc<dyn TranscriptCache>,
        launcher: Arc<dyn BrowserLauncher>,
    ) -> Self {
        Self {
            credentials: config.credentials.clone(),
            store: SessionStore::new(&config.session_file),
            cache,
            launcher,
        }
    }

    pub async fn fetch(&self, id: &str) -> Result<TranscriptResponse> {
        if let Some(transcript) = self.cache.get(id).await {
            debug!("Cache hit for {}", id);
            return Ok(TranscriptResponse {
                identifier: id.to_string(),
                transcript,
                source: TranscriptSource::Cache,
            });
        }

        info!("Cache miss for {}, scraping", id);
        let mut page = self.launcher.launch().await?;
        let outcome = self.scrape(page.as_mut(), id).await;
        if let Err(e) = page.close().await {
            warn!("Failed to release browser instance: {}", e);
        }

        let transcript = outcome?;
        // Only non-empty successes are cached; not-found and failures must
        // not pin a transient outcome for the full TTL.
        self.cache.put(id, &transcript).await;

        Ok(TranscriptResponse {
            identifier: id.to_string(),
            transcript,
            source: TranscriptSource::Fresh,
        })
    }

    async fn scrape(&self, page: &mut dyn BrowserPage, id: &str) -> Result<String> {
        let target_url = site::episode_url(id);
        session::ensure_authenticated(page, &self.store, &self.credentials, &target_url).await?;
        let document = extractor::extract(page).await?;
        Ok(document.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TranscriptSource::Cache).unwrap(),
            "\"cache\""
        );
        assert_eq!(
            serde_json::to_string(&TranscriptSource::Fresh).unwrap(),
            "\"fresh\""
        );
    }
}
