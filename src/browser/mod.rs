//! Browser automation abstraction
//!
//! `BrowserPage` is the seam between the scrape pipeline and the real
//! browser: the session manager and extractor only ever talk to this trait,
//! so tests can drive them with a scripted fake. `CdpPage` is the production
//! implementation over chromiumoxide.

mod cdp;

pub use cdp::{CdpLauncher, CdpPage};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// A browser cookie as round-tripped through the CDP layer and the session
/// file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    /// Epoch seconds; `None` for session cookies.
    pub expires: Option<f64>,
    pub http_only: Option<bool>,
    pub secure: Option<bool>,
}

/// One live page in one isolated browser instance.
///
/// Every wait is bounded: `wait_for` reports "did not appear in time" as
/// `Ok(false)` so callers decide whether that is a signal or a failure, and
/// navigation methods carry their own timeout.
#[async_trait]
pub trait BrowserPage: Send {
    /// Navigate and wait for the load to finish, bounded by `timeout`.
    async fn goto(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// Wait for a selector to appear. `Ok(false)` means the element never
    /// showed up within `timeout`; `Err` is reserved for CDP plumbing
    /// failures.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<bool>;

    /// Pointer-activate the `index`-th element matching `selector`.
    async fn click_nth(&mut self, selector: &str, index: usize) -> Result<()>;

    /// Focus the first element matching `selector` and type `text` into it.
    async fn fill(&mut self, selector: &str, text: &str) -> Result<()>;

    /// Click `selector` and await the navigation it triggers. Click and
    /// navigation-wait run under one shared timeout window so the
    /// navigation can never complete before the wait is watching.
    async fn submit_and_settle(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    /// Visible text of every element matching `selector`, in document order.
    async fn texts_of(&mut self, selector: &str) -> Result<Vec<String>>;

    /// Evaluate a script in the page and return its JSON value.
    async fn eval(&mut self, script: &str) -> Result<Value>;

    /// All cookies visible to the current page.
    async fn cookies(&mut self) -> Result<Vec<Cookie>>;

    /// Install cookies before navigation.
    async fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<()>;

    /// Tear down the page and its browser instance.
    async fn close(&mut self) -> Result<()>;
}

/// Produces one fresh, isolated [`BrowserPage`] per request. Instances are
/// never shared or pooled.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserPage>>;
}
