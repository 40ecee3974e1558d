//! Line-level reading of calendar text into [`ParsedEvent`]s.

use std::collections::HashMap;
use tracing::debug;

use super::datetime::resolve_datetime;
use super::event::ParsedEvent;
use crate::timezone::TzResolver;

/// One unfolded content line: `NAME;PARAM=value:VALUE`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentLine {
    /// Upper-cased property name
    pub key: String,
    /// Upper-cased parameter names mapped to their raw values
    pub params: HashMap<String, String>,
    pub value: String,
}

impl ContentLine {
    /// Split on the first colon. Lines without one are not content lines.
    pub fn parse(line: &str) -> Option<Self> {
        let (meta, value) = line.split_once(':')?;
        let mut parts = meta.split(';');
        let key = parts.next().unwrap_or_default().trim().to_uppercase();

        let params = parts
            .filter_map(|param| {
                let (name, val) = param.split_once('=')?;
                let name = name.trim();
                let val = val.trim().trim_matches('"');
                if name.is_empty() || val.is_empty() {
                    return None;
                }
                Some((name.to_uppercase(), val.to_string()))
            })
            .collect();

        Some(ContentLine {
            key,
            params,
            value: value.to_string(),
        })
    }
}

/// Read every VEVENT in `content`.
///
/// Never fails: lines without a colon are skipped, events without a usable
/// DTSTART are dropped, and components nested inside an event (VALARM and
/// friends) are ignored so their DESCRIPTION cannot leak into the event.
pub fn parse_events(content: &str, tz: &dyn TzResolver) -> Vec<ParsedEvent> {
    let mut events = Vec::new();
    let mut current: Option<ParsedEvent> = None;
    let mut nested = 0usize;

    for raw_line in unfold_lines(content) {
        let line = raw_line.trim_end();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("BEGIN:VEVENT") {
            if current.is_some() {
                debug!("Unterminated VEVENT discarded");
            }
            current = Some(ParsedEvent::default());
            nested = 0;
            continue;
        }

        if line.eq_ignore_ascii_case("END:VEVENT") {
            match current.take() {
                Some(event) if event.start.is_some() => events.push(event),
                Some(event) => debug!(uid = ?event.uid, "VEVENT without a usable DTSTART dropped"),
                None => {}
            }
            nested = 0;
            continue;
        }

        let Some(event) = current.as_mut() else {
            continue;
        };

        let Some(content_line) = ContentLine::parse(line) else {
            continue;
        };

        match content_line.key.as_str() {
            "BEGIN" => {
                nested += 1;
                continue;
            }
            "END" => {
                nested = nested.saturating_sub(1);
                continue;
            }
            _ if nested > 0 => continue,
            _ => {}
        }

        apply_line(event, &content_line, tz);
    }

    events
}

fn apply_line(event: &mut ParsedEvent, line: &ContentLine, tz: &dyn TzResolver) {
    let value = line.value.as_str();
    match line.key.as_str() {
        "DTSTART" => event.start = resolve_datetime(value, &line.params, tz),
        "DTEND" => event.end = resolve_datetime(value, &line.params, tz),
        "DURATION" => event.duration = Some(value.trim().to_string()),
        "SUMMARY" => event.summary = Some(decode_text(value)),
        "DESCRIPTION" => event.description = Some(decode_text(value)),
        "STATUS" => event.status = Some(value.trim().to_string()),
        "LAST-MODIFIED" => event.last_modified = resolve_datetime(value, &line.params, tz),
        "DTSTAMP" => event.dt_stamp = resolve_datetime(value, &line.params, tz),
        "UID" => event.uid = Some(value.trim().to_string()),
        _ => {}
    }
}

/// Normalize line endings and join folded lines.
///
/// A line starting with a space or tab continues the previous logical line;
/// exactly that one whitespace character is removed (RFC 5545 §3.1).
pub fn unfold_lines(content: &str) -> Vec<String> {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<String> = Vec::new();

    for raw in normalized.split('\n') {
        let continuation = raw.starts_with(' ') || raw.starts_with('\t');
        match lines.last_mut() {
            Some(previous) if continuation => previous.push_str(&raw[1..]),
            _ => lines.push(raw.to_string()),
        }
    }

    lines
}

/// Undo TEXT escaping (`\n`, `\,`, `\;`, `\\`) and trim.
pub fn decode_text(value: &str) -> String {
    let mut decoded = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            decoded.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => decoded.push('\n'),
            Some(',') => decoded.push(','),
            Some(';') => decoded.push(';'),
            Some('\\') => decoded.push('\\'),
            Some(other) => {
                decoded.push('\\');
                decoded.push(other);
            }
            None => decoded.push('\\'),
        }
    }

    decoded.trim().to_string()
}
