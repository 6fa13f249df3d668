//! Error types for showscribe

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("browser operation failed: {0}")]
    Browser(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("transcript not available")]
    ContentUnavailable,

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
