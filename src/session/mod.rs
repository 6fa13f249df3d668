//! Login session state: persistence and the authentication workflow

mod manager;
mod store;

pub use manager::ensure_authenticated;
pub use store::SessionStore;

use crate::browser::Cookie;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long a persisted session is trusted without a fresh login.
/// Staleness is conservative: an expired window forces the login workflow
/// even when the cookies themselves have not expired.
pub const SESSION_VALIDITY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// A persisted authenticated-identity proof: the cookie set captured after
/// a successful login plus the capture timestamp.
///
/// Written on every successful login, never explicitly deleted — a stale
/// record is superseded by the next login, not erased.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub cookies: Vec<Cookie>,
    /// Epoch milliseconds of the login that produced the cookies.
    pub timestamp: i64,
}

impl StoredSession {
    pub fn new(cookies: Vec<Cookie>, captured_at: DateTime<Utc>) -> Self {
        Self {
            cookies,
            timestamp: captured_at.timestamp_millis(),
        }
    }

    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() - self.timestamp > SESSION_VALIDITY.as_millis() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn fresh_session_is_not_stale() {
        let session = StoredSession::new(Vec::new(), at(1_000_000));
        assert!(!session.is_stale(at(1_000_000)));
    }

    #[test]
    fn session_just_inside_the_window_is_reusable() {
        let window_ms = SESSION_VALIDITY.as_millis() as i64;
        let session = StoredSession::new(Vec::new(), at(0));
        assert!(!session.is_stale(at(window_ms)));
    }

    #[test]
    fn session_one_second_past_the_window_is_stale() {
        let window_ms = SESSION_VALIDITY.as_millis() as i64;
        let session = StoredSession::new(Vec::new(), at(0));
        assert!(session.is_stale(at(window_ms + 1_000)));
    }
}
