use chrono::{DateTime, Utc};

/// A VEVENT as read from a feed, before interpretation.
///
/// Built up line by line while the tokenizer is inside one
/// `BEGIN:VEVENT`/`END:VEVENT` block; the tokenizer only emits events whose
/// `start` resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedEvent {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Raw `DURATION` value, resolved only when there is no usable `DTEND`
    pub duration: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
    pub dt_stamp: Option<DateTime<Utc>>,
    pub uid: Option<String>,
}

impl ParsedEvent {
    /// `STATUS` trimmed and lower-cased, empty when absent.
    pub fn normalized_status(&self) -> String {
        self.status
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.normalized_status() == "cancelled"
    }
}
