//! Cache-aside layer for rendered transcripts

use crate::error::Result;
use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::{debug, warn};

/// Cached transcripts live for 24 hours.
pub const TRANSCRIPT_TTL_SECS: u64 = 24 * 60 * 60;

pub fn cache_key(id: &str) -> String {
    format!("transcript:{}", id)
}

/// Key-value cache for rendered transcript documents.
///
/// Implementations absorb their own failures: an unavailable cache reads as
/// a miss on `get` and drops the write on `put`, so the scrape pipeline
/// proceeds uncached rather than failing the request.
#[async_trait]
pub trait TranscriptCache: Send + Sync {
    async fn get(&self, id: &str) -> Option<String>;

    /// Store a rendered transcript with the fixed TTL. Only called after a
    /// non-empty successful extraction — failures are never cached.
    async fn put(&self, id: &str, transcript: &str);
}

/// Redis-backed cache, connected once at startup.
#[derive(Clone)]
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_connection_manager().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl TranscriptCache for RedisCache {
    async fn get(&self, id: &str) -> Option<String> {
        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(cache_key(id)).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Cache read failed, treating as miss: {}", e);
                None
            }
        }
    }

    async fn put(&self, id: &str, transcript: &str) {
        let mut conn = self.conn.clone();
        match conn
            .set_ex::<_, _, ()>(cache_key(id), transcript, TRANSCRIPT_TTL_SECS)
            .await
        {
            Ok(()) => debug!("Cached transcript for {}", id),
            Err(e) => warn!("Cache write failed, skipping: {}", e),
        }
    }
}
