//! Transcript extraction from the rendered episode page

use crate::browser::BrowserPage;
use crate::error::{Result, ScrapeError};
use crate::site;
use crate::transcript::{RawCue, TranscriptDocument};
use std::time::Duration;
use tracing::debug;

/// Window for the transcript panel to render after activating its tab.
const PANEL_TIMEOUT: Duration = Duration::from_secs(10);

/// Activate the transcript view on an already-authenticated episode page
/// and collect its cues.
///
/// Every "nothing there" outcome — no matching tab, panel never renders,
/// zero surviving cues — is [`ScrapeError::ContentUnavailable`], the
/// 404-equivalent; only CDP plumbing failures surface as errors.
pub async fn extract(page: &mut dyn BrowserPage) -> Result<TranscriptDocument> {
    let labels = page.texts_of(site::TAB_SELECTOR).await?;
    let tab_index = labels
        .iter()
        .position(|label| matches_activator_label(label))
        .ok_or(ScrapeError::ContentUnavailable)?;
    debug!("Activating transcript tab {:?}", labels[tab_index]);

    page.click_nth(site::TAB_SELECTOR, tab_index).await?;

    if !page
        .wait_for(site::TRANSCRIPT_CONTAINER, PANEL_TIMEOUT)
        .await?
    {
        debug!("Transcript panel never rendered");
        return Err(ScrapeError::ContentUnavailable);
    }

    let raw: Vec<RawCue> = serde_json::from_value(page.eval(site::COLLECT_CUES_JS).await?)?;

    // The panel's first child is a header row, not a cue. Observed site
    // structure with no documented rationale; the most likely point of
    // breakage when the site revs its markup.
    let document = TranscriptDocument::from_raw(raw.into_iter().skip(1));
    if document.is_empty() {
        debug!("Transcript panel contained no usable cues");
        return Err(ScrapeError::ContentUnavailable);
    }

    debug!("Extracted {} cues", document.cues().len());
    Ok(document)
}

/// Case-insensitive substring match against the fixed activator keyword.
fn matches_activator_label(label: &str) -> bool {
    label
        .to_lowercase()
        .contains(site::TRANSCRIPT_TAB_KEYWORD)
}
