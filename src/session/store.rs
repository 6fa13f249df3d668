//! File-backed session persistence

use super::StoredSession;
use crate::error::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Durable storage for the login session, surviving process restarts.
///
/// The record is a single JSON file `{ "cookies": [...], "timestamp": ms }`.
/// `load` never fails: a missing or undecodable record reads as "no
/// session" and the caller falls through to a fresh login.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Option<StoredSession> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No session file at {}", self.path.display());
                return None;
            }
            Err(e) => {
                warn!("Could not read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(
                    "Ignoring undecodable session file {}: {}",
                    self.path.display(),
                    e
                );
                None
            }
        }
    }

    pub fn save(&self, session: &StoredSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(session)?)?;
        debug!(
            "Persisted session with {} cookies to {}",
            session.cookies.len(),
            self.path.display()
        );
        Ok(())
    }
}
