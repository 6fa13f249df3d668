//! End-to-end pipeline tests over scripted browser and cache fakes

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use showscribe::{
    site, BrowserLauncher, BrowserPage, Config, Cookie, Credentials, ScrapeError, SessionStore,
    StoredSession, TranscriptCache, TranscriptService, TranscriptSource,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

#[derive(Default)]
struct FakeCache {
    entries: Mutex<HashMap<String, String>>,
}

impl FakeCache {
    fn seeded(id: &str, transcript: &str) -> Self {
        let cache = Self::default();
        cache
            .entries
            .lock()
            .unwrap()
            .insert(id.to_string(), transcript.to_string());
        cache
    }

    fn stored(&self, id: &str) -> Option<String> {
        self.entries.lock().unwrap().get(id).cloned()
    }
}

#[async_trait]
impl TranscriptCache for FakeCache {
    async fn get(&self, id: &str) -> Option<String> {
        self.entries.lock().unwrap().get(id).cloned()
    }

    async fn put(&self, id: &str, transcript: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(id.to_string(), transcript.to_string());
    }
}

/// What the scripted page should pretend the site did.
#[derive(Clone)]
struct Behavior {
    marker_present: bool,
    login_succeeds: bool,
    tab_labels: Vec<String>,
    panel_renders: bool,
    cues: Value,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            marker_present: true,
            login_succeeds: true,
            tab_labels: vec!["Details".into(), "Transcript".into()],
            panel_renders: true,
            cues: header_and_two_cues(),
        }
    }
}

/// A header child first, then two real cues. The header carries
/// plausible-looking values so a broken skip-first rule would leak it into
/// the output.
fn header_and_two_cues() -> Value {
    json!([
        { "time": "Time", "text": "Dialogue" },
        { "time": "0:00", "text": "Hi" },
        { "time": "0:05", "text": "There" },
    ])
}

#[derive(Default)]
struct PageState {
    calls: Vec<String>,
    closed: bool,
}

struct FakePage {
    behavior: Behavior,
    state: Arc<Mutex<PageState>>,
}

impl FakePage {
    fn log(&self, call: impl Into<String>) {
        self.state.lock().unwrap().calls.push(call.into());
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&mut self, url: &str, _timeout: Duration) -> showscribe::Result<()> {
        self.log(format!("goto {}", url));
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, _timeout: Duration) -> showscribe::Result<bool> {
        self.log(format!("wait_for {}", selector));
        Ok(match selector {
            s if s == site::LOGGED_IN_MARKER => self.behavior.marker_present,
            s if s == site::TRANSCRIPT_CONTAINER => self.behavior.panel_renders,
            _ => true,
        })
    }

    async fn click_nth(&mut self, selector: &str, index: usize) -> showscribe::Result<()> {
        self.log(format!("click_nth {} {}", selector, index));
        Ok(())
    }

    async fn fill(&mut self, selector: &str, _text: &str) -> showscribe::Result<()> {
        self.log(format!("fill {}", selector));
        Ok(())
    }

    async fn submit_and_settle(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> showscribe::Result<()> {
        self.log(format!("submit {}", selector));
        if self.behavior.login_succeeds {
            Ok(())
        } else {
            Err(ScrapeError::Browser("login rejected".to_string()))
        }
    }

    async fn texts_of(&mut self, selector: &str) -> showscribe::Result<Vec<String>> {
        self.log(format!("texts_of {}", selector));
        Ok(self.behavior.tab_labels.clone())
    }

    async fn eval(&mut self, _script: &str) -> showscribe::Result<Value> {
        self.log("eval");
        Ok(self.behavior.cues.clone())
    }

    async fn cookies(&mut self) -> showscribe::Result<Vec<Cookie>> {
        Ok(vec![Cookie {
            name: "sh_session".to_string(),
            value: "fresh-token".to_string(),
            domain: Some(".screenhall.com".to_string()),
            path: Some("/".to_string()),
            expires: None,
            http_only: Some(true),
            secure: Some(true),
        }])
    }

    async fn set_cookies(&mut self, cookies: &[Cookie]) -> showscribe::Result<()> {
        self.log(format!("set_cookies {}", cookies.len()));
        Ok(())
    }

    async fn close(&mut self) -> showscribe::Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

struct FakeLauncher {
    behavior: Behavior,
    launches: AtomicUsize,
    pages: Mutex<Vec<Arc<Mutex<PageState>>>>,
}

impl FakeLauncher {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            launches: AtomicUsize::new(0),
            pages: Mutex::new(Vec::new()),
        }
    }

    fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    fn last_page(&self) -> Arc<Mutex<PageState>> {
        self.pages
            .lock()
            .unwrap()
            .last()
            .expect("a page was launched")
            .clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> showscribe::Result<Box<dyn BrowserPage>> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let state = Arc::new(Mutex::new(PageState::default()));
        self.pages.lock().unwrap().push(state.clone());
        Ok(Box::new(FakePage {
            behavior: self.behavior.clone(),
            state,
        }))
    }
}

fn test_config(session_file: PathBuf) -> Config {
    Config {
        credentials: Credentials {
            username: "viewer@example.com".to_string(),
            password: "hunter2".to_string(),
        },
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        redis_url: "redis://unused/".to_string(),
        session_file,
        headless: true,
    }
}

fn service_with(
    dir: &TempDir,
    cache: Arc<FakeCache>,
    launcher: Arc<FakeLauncher>,
) -> TranscriptService {
    let config = test_config(dir.path().join("session.json"));
    TranscriptService::new(&config, cache, launcher)
}

fn write_session(dir: &TempDir, age: ChronoDuration) {
    let store = SessionStore::new(dir.path().join("session.json"));
    let session = StoredSession::new(
        vec![Cookie {
            name: "sh_session".to_string(),
            value: "stored-token".to_string(),
            domain: Some(".screenhall.com".to_string()),
            path: Some("/".to_string()),
            expires: None,
            http_only: Some(true),
            secure: Some(true),
        }],
        Utc::now() - age,
    );
    store.save(&session).unwrap();
}

fn calls(page: &Arc<Mutex<PageState>>) -> Vec<String> {
    page.lock().unwrap().calls.clone()
}

#[tokio::test]
async fn cache_hit_bypasses_the_browser() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FakeCache::seeded("abc123", "0:00\nHello"));
    let launcher = Arc::new(FakeLauncher::new(Behavior::default()));
    let service = service_with(&dir, cache.clone(), launcher.clone());

    let response = service.fetch("abc123").await.unwrap();

    assert_eq!(response.identifier, "abc123");
    assert_eq!(response.transcript, "0:00\nHello");
    assert_eq!(response.source, TranscriptSource::Cache);
    assert_eq!(launcher.launch_count(), 0);
}

#[tokio::test]
async fn fresh_fetch_scrapes_and_populates_the_cache() {
    let dir = TempDir::new().unwrap();
    write_session(&dir, ChronoDuration::hours(1));
    let cache = Arc::new(FakeCache::default());
    let launcher = Arc::new(FakeLauncher::new(Behavior::default()));
    let service = service_with(&dir, cache.clone(), launcher.clone());

    let response = service.fetch("xyz999").await.unwrap();

    assert_eq!(response.identifier, "xyz999");
    assert_eq!(response.transcript, "0:00\nHi\n\n0:05\nThere");
    assert_eq!(response.source, TranscriptSource::Fresh);
    assert_eq!(launcher.launch_count(), 1);
    assert_eq!(cache.stored("xyz999").as_deref(), Some("0:00\nHi\n\n0:05\nThere"));

    let page = launcher.last_page();
    assert!(page.lock().unwrap().closed);
    // Valid session + marker present: the login form is never touched.
    assert!(!calls(&page).iter().any(|c| c.starts_with("fill")));
}

#[tokio::test]
async fn stale_session_always_routes_through_login() {
    let dir = TempDir::new().unwrap();
    write_session(&dir, ChronoDuration::days(7) + ChronoDuration::seconds(1));
    let cache = Arc::new(FakeCache::default());
    let launcher = Arc::new(FakeLauncher::new(Behavior::default()));
    let service = service_with(&dir, cache.clone(), launcher.clone());

    let before = SessionStore::new(dir.path().join("session.json"))
        .load()
        .unwrap()
        .timestamp;

    service.fetch("xyz999").await.unwrap();

    let page_calls = calls(&launcher.last_page());
    assert!(page_calls.contains(&format!("goto {}", site::LOGIN_URL)));
    assert!(page_calls.contains(&format!("fill {}", site::USERNAME_FIELD)));
    // Stale cookies are never presented as reusable.
    assert!(!page_calls.iter().any(|c| c.starts_with("set_cookies")));

    let after = SessionStore::new(dir.path().join("session.json"))
        .load()
        .unwrap()
        .timestamp;
    assert!(after > before, "login must persist a fresh session record");
}

#[tokio::test]
async fn absent_session_routes_through_login() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FakeCache::default());
    let launcher = Arc::new(FakeLauncher::new(Behavior::default()));
    let service = service_with(&dir, cache.clone(), launcher.clone());

    service.fetch("xyz999").await.unwrap();

    let page_calls = calls(&launcher.last_page());
    assert!(page_calls.contains(&format!("goto {}", site::LOGIN_URL)));
}

#[tokio::test]
async fn login_failure_writes_no_session_record() {
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FakeCache::default());
    let launcher = Arc::new(FakeLauncher::new(Behavior {
        marker_present: false,
        login_succeeds: false,
        ..Behavior::default()
    }));
    let service = service_with(&dir, cache.clone(), launcher.clone());

    let err = service.fetch("xyz999").await.unwrap_err();

    assert!(matches!(err, ScrapeError::Authentication(_)));
    assert!(!dir.path().join("session.json").exists());
    assert!(launcher.last_page().lock().unwrap().closed);
}

#[tokio::test]
async fn missing_activator_is_not_found_and_releases_the_browser() {
    let dir = TempDir::new().unwrap();
    write_session(&dir, ChronoDuration::hours(1));
    let cache = Arc::new(FakeCache::default());
    let launcher = Arc::new(FakeLauncher::new(Behavior {
        tab_labels: vec!["Details".into(), "Episodes".into()],
        ..Behavior::default()
    }));
    let service = service_with(&dir, cache.clone(), launcher.clone());

    let err = service.fetch("xyz999").await.unwrap_err();

    assert!(matches!(err, ScrapeError::ContentUnavailable));
    assert!(launcher.last_page().lock().unwrap().closed);
    assert_eq!(cache.stored("xyz999"), None);
}

#[tokio::test]
async fn panel_timeout_is_not_found() {
    let dir = TempDir::new().unwrap();
    write_session(&dir, ChronoDuration::hours(1));
    let cache = Arc::new(FakeCache::default());
    let launcher = Arc::new(FakeLauncher::new(Behavior {
        panel_renders: false,
        ..Behavior::default()
    }));
    let service = service_with(&dir, cache.clone(), launcher.clone());

    let err = service.fetch("xyz999").await.unwrap_err();
    assert!(matches!(err, ScrapeError::ContentUnavailable));
}

#[tokio::test]
async fn header_only_panel_is_not_found_never_an_empty_success() {
    let dir = TempDir::new().unwrap();
    write_session(&dir, ChronoDuration::hours(1));
    let cache = Arc::new(FakeCache::default());
    let launcher = Arc::new(FakeLauncher::new(Behavior {
        cues: json!([{ "time": "Time", "text": "Dialogue" }]),
        ..Behavior::default()
    }));
    let service = service_with(&dir, cache.clone(), launcher.clone());

    let err = service.fetch("xyz999").await.unwrap_err();

    assert!(matches!(err, ScrapeError::ContentUnavailable));
    assert_eq!(cache.stored("xyz999"), None);
}

#[tokio::test]
async fn each_fetch_gets_its_own_browser_instance() {
    let dir = TempDir::new().unwrap();
    write_session(&dir, ChronoDuration::hours(1));
    let cache = Arc::new(FakeCache::default());
    let launcher = Arc::new(FakeLauncher::new(Behavior::default()));
    let service = service_with(&dir, cache.clone(), launcher.clone());

    service.fetch("first").await.unwrap();
    service.fetch("second").await.unwrap();

    assert_eq!(launcher.launch_count(), 2);
    // A repeat of a cached identifier launches nothing further.
    service.fetch("first").await.unwrap();
    assert_eq!(launcher.launch_count(), 2);
}
