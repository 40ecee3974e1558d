//! Time zone offset resolution for `TZID`-qualified floating times.
//!
//! The resolver is injected so that the footprint/accuracy tradeoff (full
//! IANA database, a fixed table, or nothing at all) is a deployment choice.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use std::collections::HashMap;

/// Resolves the UTC offset of a named zone at a given wall-clock time.
pub trait TzResolver: Send + Sync {
    /// Offset in effect in `zone` at local time `local`, or `None` when the
    /// zone is unknown or the local time does not exist there.
    fn offset_for(&self, zone: &str, local: NaiveDateTime) -> Option<FixedOffset>;

    /// Convert a wall-clock time in `zone` to UTC.
    fn to_utc(&self, zone: &str, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        let offset = self.offset_for(zone, local)?;
        offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Full IANA database via chrono-tz. Daylight saving rules are honoured;
/// ambiguous fall-back times resolve to the earliest instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct IanaTz;

impl TzResolver for IanaTz {
    fn offset_for(&self, zone: &str, local: NaiveDateTime) -> Option<FixedOffset> {
        let tz: chrono_tz::Tz = zone.parse().ok()?;
        tz.offset_from_local_datetime(&local)
            .earliest()
            .map(|offset| offset.fix())
    }
}

/// A fixed zone → offset table, ignoring daylight saving. Zone names
/// match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct FixedOffsetTable {
    offsets: HashMap<String, FixedOffset>,
}

impl FixedOffsetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, zone: &str, offset: FixedOffset) -> Self {
        self.offsets.insert(zone.to_lowercase(), offset);
        self
    }

    /// Build a table from `"+HH:MM"` / `"-HHMM"` strings.
    /// Returns the first entry that could not be parsed as the error.
    pub fn from_strings(entries: &HashMap<String, String>) -> Result<Self, String> {
        let mut table = Self::new();
        for (zone, raw) in entries {
            let offset = parse_offset(raw).ok_or_else(|| {
                format!("Invalid offset '{}' for time zone '{}'", raw, zone)
            })?;
            table.offsets.insert(zone.to_lowercase(), offset);
        }
        Ok(table)
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

impl TzResolver for FixedOffsetTable {
    fn offset_for(&self, zone: &str, _local: NaiveDateTime) -> Option<FixedOffset> {
        self.offsets.get(&zone.to_lowercase()).copied()
    }
}

/// Never resolves a zone, so every floating time is read as UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcOnly;

impl TzResolver for UtcOnly {
    fn offset_for(&self, _zone: &str, _local: NaiveDateTime) -> Option<FixedOffset> {
        None
    }
}

/// Parse `+HH:MM`, `-HH:MM`, `+HHMM` or `Z`.
fn parse_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match raw.chars().next()? {
        '+' => (1, &raw[1..]),
        '-' => (-1, &raw[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
