//! Screenhall page contract: URLs, selectors, and in-page collection scripts.
//!
//! Everything in this module tracks markup the site ships and can break
//! whenever the site revs its frontend. Selector changes land here and
//! nowhere else.

/// Client identity presented by every browser instance.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub const LOGIN_URL: &str = "https://watch.screenhall.com/signin";

/// Episode page for a resource identifier. The identifier is embedded
/// verbatim as a path segment.
pub fn episode_url(id: &str) -> String {
    format!("https://watch.screenhall.com/episode/{}", id)
}

// Login form
pub const USERNAME_FIELD: &str = "input[name=\"email\"]";
pub const PASSWORD_FIELD: &str = "input[name=\"password\"]";
pub const SUBMIT_BUTTON: &str = "button[type=\"submit\"]";

/// Rendered only for an authenticated viewer.
pub const LOGGED_IN_MARKER: &str = "[data-testid=\"account-menu\"]";

/// Tab strip under the player; one of these activates the transcript panel.
pub const TAB_SELECTOR: &str = "[role=\"tab\"]";

/// Matched case-insensitively against tab labels.
pub const TRANSCRIPT_TAB_KEYWORD: &str = "transcript";

pub const TRANSCRIPT_CONTAINER: &str = "[data-testid=\"transcript-panel\"]";

/// Collects every direct child of the transcript panel, in document order,
/// as `{time, text}` objects. Children missing either sub-element yield
/// nulls; filtering happens on the Rust side.
pub const COLLECT_CUES_JS: &str = r#"
Array.from(document.querySelectorAll('[data-testid="transcript-panel"] > *')).map((entry) => ({
    time: entry.querySelector('[data-cue-time]') ? entry.querySelector('[data-cue-time]').textContent : null,
    text: entry.querySelector('[data-cue-text]') ? entry.querySelector('[data-cue-text]').textContent : null,
}))
"#;
