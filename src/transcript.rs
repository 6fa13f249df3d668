//! Transcript document model and serialization

use serde::{Deserialize, Serialize};

/// A `{time, text}` pair as collected from the page, before filtering.
/// Either part may be missing when a panel child lacks the sub-element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCue {
    pub time: Option<String>,
    pub text: Option<String>,
}

/// A surviving timed text segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub time: String,
    pub text: String,
}

/// An ordered sequence of cues.
///
/// Construction drops cues with a missing or whitespace-only time or text;
/// an empty document after filtering is treated as "not found" by the
/// extractor, never as an empty success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptDocument {
    cues: Vec<Cue>,
}

impl TranscriptDocument {
    pub fn from_raw<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = RawCue>,
    {
        let cues = raw
            .into_iter()
            .filter_map(|cue| {
                let time = cue.time.as_deref().map(str::trim).unwrap_or_default();
                let text = cue.text.as_deref().map(str::trim).unwrap_or_default();
                if time.is_empty() || text.is_empty() {
                    return None;
                }
                Some(Cue {
                    time: time.to_string(),
                    text: text.to_string(),
                })
            })
            .collect();

        Self { cues }
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    /// Serialize as `time\ntext` pairs joined by blank lines.
    pub fn render(&self) -> String {
        self.cues
            .iter()
            .map(|cue| format!("{}\n{}", cue.time, cue.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(time: &str, text: &str) -> RawCue {
        RawCue {
            time: Some(time.to_string()),
            text: Some(text.to_string()),
        }
    }

    #[test]
    fn renders_pairs_with_blank_line_separator() {
        let doc = TranscriptDocument::from_raw(vec![raw("0:00", "Hi"), raw("0:05", "There")]);
        assert_eq!(doc.render(), "0:00\nHi\n\n0:05\nThere");
    }

    #[test]
    fn drops_cues_missing_either_part() {
        let doc = TranscriptDocument::from_raw(vec![
            RawCue {
                time: Some("0:00".into()),
                text: None,
            },
            RawCue {
                time: None,
                text: Some("orphaned".into()),
            },
            raw("0:10", "kept"),
        ]);
        assert_eq!(doc.cues().len(), 1);
        assert_eq!(doc.render(), "0:10\nkept");
    }

    #[test]
    fn whitespace_only_parts_count_as_missing() {
        let doc = TranscriptDocument::from_raw(vec![raw("   ", "Hello"), raw("0:00", "\n\t ")]);
        assert!(doc.is_empty());
    }

    #[test]
    fn trims_surviving_parts() {
        let doc = TranscriptDocument::from_raw(vec![raw(" 0:00 ", " Hello \n")]);
        assert_eq!(doc.render(), "0:00\nHello");
    }
}
