//! chromiumoxide-backed implementation of [`BrowserPage`]

use super::{BrowserLauncher, BrowserPage, Cookie};
use crate::error::{Result, ScrapeError};
use crate::site;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::emulation::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    CookieParam, SetCookiesParams, TimeSinceEpoch,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, error, warn};

/// Default bound for every CDP request issued through the page handle.
const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(60);

/// How often `wait_for` re-queries the document for its selector.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches one headless Chromium per request.
pub struct CdpLauncher {
    headless: bool,
}

impl CdpLauncher {
    pub fn new(headless: bool) -> Self {
        Self { headless }
    }
}

#[async_trait]
impl BrowserLauncher for CdpLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserPage>> {
        let page = CdpPage::launch(self.headless).await?;
        Ok(Box::new(page))
    }
}

/// One page in one dedicated browser process, torn down with the request.
pub struct CdpPage {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page: Page,
    // Profile directory lives as long as the page; removed on drop.
    _user_data_dir: TempDir,
}

impl CdpPage {
    pub async fn launch(headless: bool) -> Result<Self> {
        let user_data_dir = tempfile::tempdir()?;

        let mut builder = BrowserConfig::builder()
            .no_sandbox() // required in container environments
            .user_data_dir(user_data_dir.path())
            .request_timeout(DEFAULT_OP_TIMEOUT);
        if !headless {
            builder = builder.with_head();
        }
        if let Ok(chrome_bin) = std::env::var("CHROME_BIN") {
            debug!("Using custom Chrome binary: {}", chrome_bin);
            builder = builder.chrome_executable(chrome_bin);
        }

        let config = builder
            .build()
            .map_err(|e| ScrapeError::Browser(format!("failed to build browser config: {}", e)))?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Browser(format!("failed to launch browser: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    error!("Browser handler error (ignoring): {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| ScrapeError::Browser(format!("failed to create page: {}", e)))?;
        page.execute(SetUserAgentOverrideParams::new(site::USER_AGENT))
            .await
            .map_err(|e| ScrapeError::Browser(format!("failed to set user agent: {}", e)))?;

        Ok(Self {
            browser,
            handler_task,
            page,
            _user_data_dir: user_data_dir,
        })
    }
}

#[async_trait]
impl BrowserPage for CdpPage {
    async fn goto(&mut self, url: &str, limit: Duration) -> Result<()> {
        debug!("Navigating to: {}", url);
        timeout(limit, self.page.goto(url))
            .await
            .map_err(|_| ScrapeError::Browser(format!("navigation to {} timed out", url)))?
            .map_err(|e| ScrapeError::Browser(format!("navigation to {} failed: {}", url, e)))?;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, limit: Duration) -> Result<bool> {
        let deadline = Instant::now() + limit;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    async fn click_nth(&mut self, selector: &str, index: usize) -> Result<()> {
        let script = format!(
            "(() => {{ const els = document.querySelectorAll({sel}); if (!els[{idx}]) return false; els[{idx}].click(); return true; }})()",
            sel = serde_json::to_string(selector)?,
            idx = index,
        );
        let clicked: bool = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| ScrapeError::Browser(format!("click on {} failed: {}", selector, e)))?
            .into_value()
            .map_err(|e| ScrapeError::Browser(format!("click on {} failed: {}", selector, e)))?;
        if !clicked {
            return Err(ScrapeError::Browser(format!(
                "no element at index {} for {}",
                index, selector
            )));
        }
        Ok(())
    }

    async fn fill(&mut self, selector: &str, text: &str) -> Result<()> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::Browser(format!("element {} not found: {}", selector, e)))?
            .click()
            .await
            .map_err(|e| ScrapeError::Browser(format!("focus on {} failed: {}", selector, e)))?
            .type_str(text)
            .await
            .map_err(|e| ScrapeError::Browser(format!("typing into {} failed: {}", selector, e)))?;
        Ok(())
    }

    async fn submit_and_settle(&mut self, selector: &str, limit: Duration) -> Result<()> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::Browser(format!("element {} not found: {}", selector, e)))?;

        // Click and navigation-wait under one timeout so the navigation
        // cannot land in the gap between the two.
        timeout(
            limit,
            futures::future::try_join(
                async {
                    element
                        .click()
                        .await
                        .map(|_| ())
                        .map_err(|e| ScrapeError::Browser(format!("submit click failed: {}", e)))
                },
                async {
                    self.page
                        .wait_for_navigation()
                        .await
                        .map(|_| ())
                        .map_err(|e| {
                            ScrapeError::Browser(format!("post-submit navigation failed: {}", e))
                        })
                },
            ),
        )
        .await
        .map_err(|_| ScrapeError::Browser("submission did not settle in time".to_string()))??;
        Ok(())
    }

    async fn texts_of(&mut self, selector: &str) -> Result<Vec<String>> {
        let script = format!(
            "Array.from(document.querySelectorAll({sel})).map((el) => (el.textContent || '').trim())",
            sel = serde_json::to_string(selector)?,
        );
        self.page
            .evaluate(script)
            .await
            .map_err(|e| ScrapeError::Browser(format!("collecting {} failed: {}", selector, e)))?
            .into_value()
            .map_err(|e| ScrapeError::Browser(format!("collecting {} failed: {}", selector, e)))
    }

    async fn eval(&mut self, script: &str) -> Result<serde_json::Value> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| ScrapeError::Browser(format!("script evaluation failed: {}", e)))?
            .into_value()
            .map_err(|e| ScrapeError::Browser(format!("script evaluation failed: {}", e)))
    }

    async fn cookies(&mut self) -> Result<Vec<Cookie>> {
        let cookies = self
            .page
            .get_cookies()
            .await
            .map_err(|e| ScrapeError::Browser(format!("get cookies failed: {}", e)))?;

        Ok(cookies
            .into_iter()
            .map(|c| Cookie {
                name: c.name,
                value: c.value,
                domain: Some(c.domain),
                path: Some(c.path),
                expires: Some(c.expires),
                http_only: Some(c.http_only),
                secure: Some(c.secure),
            })
            .collect())
    }

    async fn set_cookies(&mut self, cookies: &[Cookie]) -> Result<()> {
        let params: Vec<CookieParam> = cookies
            .iter()
            .map(|c| {
                let mut param = CookieParam::new(c.name.clone(), c.value.clone());
                param.domain = c.domain.clone();
                param.path = c.path.clone();
                param.expires = c.expires.map(TimeSinceEpoch::new);
                param.http_only = c.http_only;
                param.secure = c.secure;
                param
            })
            .collect();

        self.page
            .execute(SetCookiesParams::new(params))
            .await
            .map_err(|e| ScrapeError::Browser(format!("set cookies failed: {}", e)))?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| ScrapeError::Browser(format!("failed to close browser: {}", e)))?;
        if let Err(e) = self.browser.wait().await {
            warn!("Browser process did not exit cleanly: {}", e);
        }
        self.handler_task.abort();
        Ok(())
    }
}
