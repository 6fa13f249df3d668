//! Process configuration
//!
//! Settings load from an optional `showscribe.toml` merged with
//! `SHOWSCRIBE_`-prefixed environment variables (nested keys split on
//! `__`, e.g. `SHOWSCRIBE_CREDENTIALS__USERNAME`).

use crate::error::{Result, ScrapeError};
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "showscribe.toml";

/// Site credentials, consumed as opaque strings.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub credentials: Credentials,

    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,

    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_file(DEFAULT_CONFIG_FILE)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SHOWSCRIBE_").split("__"))
            .extract()
            .map_err(|e| ScrapeError::Config(e.to_string()))
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().expect("valid default address")
}

fn default_redis_url() -> String {
    "redis://127.0.0.1/".to_string()
}

fn default_session_file() -> PathBuf {
    PathBuf::from("session.json")
}

fn default_headless() -> bool {
    true
}
