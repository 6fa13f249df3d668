//! Showscribe - a session-authenticated transcript scraper for Screenhall
//!
//! The site renders episode transcripts client-side behind a login wall and
//! exposes no data API, so this service drives a real browser: it reuses a
//! persisted login session where possible, navigates to the episode,
//! activates the transcript view, and normalizes the cues into a plain-text
//! document — all behind a 24-hour cache keyed by episode identifier.

pub mod browser;
pub mod cache;
pub mod config;
pub mod error;
pub mod extractor;
pub mod server;
pub mod service;
pub mod session;
pub mod site;
pub mod transcript;

pub use browser::{BrowserLauncher, BrowserPage, CdpLauncher, Cookie};
pub use cache::{RedisCache, TranscriptCache};
pub use config::{Config, Credentials};
pub use error::{Result, ScrapeError};
pub use service::{TranscriptResponse, TranscriptService, TranscriptSource};
pub use session::{SessionStore, StoredSession};
pub use transcript::{Cue, RawCue, TranscriptDocument};
