//! Turning parsed VEVENTs into occupancy records.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::ics::{ParsedEvent, parse_duration, parse_events};
use crate::occupancy::OccupancyMode;
use crate::record::RawBookingRecord;
use crate::timezone::TzResolver;

/// Map one event to a booking record for `lot_ref`.
///
/// Cancelled events, events whose end cannot be resolved, and events whose
/// end is not after their start yield `None`.
pub fn interpret(
    event: &ParsedEvent,
    lot_ref: &str,
    ordinal: usize,
    now: DateTime<Utc>,
) -> Option<RawBookingRecord> {
    let start = event.start?;

    if event.is_cancelled() {
        debug!(uid = ?event.uid, "Cancelled event skipped");
        return None;
    }

    let Some(end) = resolve_end(event, start) else {
        debug!(uid = ?event.uid, "Event without DTEND or usable DURATION skipped");
        return None;
    };

    let mode = OccupancyMode::derive(
        &event.normalized_status(),
        event.summary.as_deref().unwrap_or_default(),
        event.description.as_deref().unwrap_or_default(),
    );
    let updated_at = event.last_modified.or(event.dt_stamp).unwrap_or(now);

    let record = RawBookingRecord::new(lot_ref, start, end, mode, updated_at, ordinal);
    if record.is_none() {
        debug!(uid = ?event.uid, %start, %end, "Event with empty or inverted interval skipped");
    }
    record
}

/// Explicit DTEND first, then DTSTART + DURATION.
fn resolve_end(event: &ParsedEvent, start: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(end) = event.end {
        return Some(end);
    }
    let duration = parse_duration(event.duration.as_deref()?)?;
    start.checked_add_signed(duration)
}

/// Parse one calendar feed into booking records for `lot_ref`.
///
/// Ordinals follow the position of each event in the feed, so they stay
/// stable when a neighbouring event is dropped.
pub fn parse_calendar(
    content: &str,
    lot_ref: &str,
    tz: &dyn TzResolver,
    now: DateTime<Utc>,
) -> Vec<RawBookingRecord> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    parse_events(content, tz)
        .iter()
        .enumerate()
        .filter_map(|(index, event)| interpret(event, lot_ref, index + 1, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timezone::IanaTz;
    use chrono::{TimeDelta, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn vevent(lines: &[&str]) -> String {
        format!("BEGIN:VCALENDAR\r\nBEGIN:VEVENT\r\n{}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n", lines.join("\r\n"))
    }

    fn parse(lines: &[&str]) -> Vec<RawBookingRecord> {
        parse_calendar(&vevent(lines), "SAVOIE-53", &IanaTz, now())
    }

    #[test]
    fn test_option_keyword_in_summary() {
        let records = parse(&["DTSTART:20250110", "DTEND:20250115", "SUMMARY:Option - Smith"]);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.lot_ref, "SAVOIE-53");
        assert_eq!(record.mode, OccupancyMode::Option);
        assert_eq!(record.duration_days, 5);
        assert!(!record.is_available);
    }

    #[test]
    fn test_zoned_start_with_duration() {
        let records = parse(&["DTSTART;TZID=Europe/Paris:20250315T100000", "DURATION:P2D"]);
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.start, Utc.with_ymd_and_hms(2025, 3, 15, 9, 0, 0).unwrap());
        assert_eq!(record.end - record.start, TimeDelta::days(2));
        assert_eq!(record.mode, OccupancyMode::Reservation);
        assert_eq!(record.duration_days, 2);
    }

    #[test]
    fn test_cancelled_never_appears() {
        for status in ["CANCELLED", "cancelled", " Cancelled "] {
            let records = parse(&[
                "DTSTART:20250110",
                "DTEND:20250115",
                "SUMMARY:Option - Smith",
                &format!("STATUS:{}", status),
            ]);
            assert!(records.is_empty(), "{:?}", status);
        }
    }

    #[test]
    fn test_end_not_after_start_is_dropped() {
        assert!(parse(&["DTSTART:20250110", "DTEND:20250110"]).is_empty());
        assert!(parse(&["DTSTART:20250110", "DTEND:20250105"]).is_empty());
    }

    #[test]
    fn test_one_day_interval() {
        let records = parse(&["DTSTART:20250110", "DTEND:20250111"]);
        assert_eq!(records[0].duration_days, 1);
    }

    #[test]
    fn test_dtend_wins_over_duration() {
        let records = parse(&["DTSTART:20250110", "DTEND:20250112", "DURATION:P7D"]);
        assert_eq!(records[0].end, Utc.with_ymd_and_hms(2025, 1, 12, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_no_end_and_bad_duration_is_dropped() {
        assert!(parse(&["DTSTART:20250110"]).is_empty());
        assert!(parse(&["DTSTART:20250110", "DURATION:1 week"]).is_empty());
        assert!(parse(&["DTSTART:20250110", "DURATION:P"]).is_empty());
    }

    #[test]
    fn test_unparseable_dtend_falls_back_to_duration() {
        let records = parse(&["DTSTART:20250110", "DTEND:soon", "DURATION:P1W"]);
        assert_eq!(records[0].duration_days, 7);
    }

    #[test]
    fn test_status_overrides_keywords() {
        let confirmed = parse(&["DTSTART:20250110", "DTEND:20250111", "SUMMARY:Option", "STATUS:CONFIRMED"]);
        assert_eq!(confirmed[0].mode, OccupancyMode::Reservation);

        let tentative = parse(&["DTSTART:20250110", "DTEND:20250111", "STATUS:TENTATIVE"]);
        assert_eq!(tentative[0].mode, OccupancyMode::Option);
    }

    #[test]
    fn test_keyword_in_escaped_description() {
        let records = parse(&["DTSTART:20250110", "DTEND:20250111", "DESCRIPTION:Smith\\, pre-book"]);
        assert_eq!(records[0].mode, OccupancyMode::Option);
    }

    #[test]
    fn test_updated_at_precedence() {
        let both = parse(&[
            "DTSTART:20250110",
            "DTEND:20250111",
            "DTSTAMP:20250102T000000Z",
            "LAST-MODIFIED:20250101T000000Z",
        ]);
        assert_eq!(both[0].updated_at, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());

        let stamp = parse(&["DTSTART:20250110", "DTEND:20250111", "DTSTAMP:20250102T000000Z"]);
        assert_eq!(stamp[0].updated_at, Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap());

        let neither = parse(&["DTSTART:20250110", "DTEND:20250111"]);
        assert_eq!(neither[0].updated_at, now());
    }

    #[test]
    fn test_ordinals_follow_feed_position() {
        let ics = "BEGIN:VEVENT\nDTSTART:20250101\nDTEND:20250102\nEND:VEVENT\n\
                   BEGIN:VEVENT\nDTSTART:20250103\nDTEND:20250104\nSTATUS:CANCELLED\nEND:VEVENT\n\
                   BEGIN:VEVENT\nDTSTART:20250105\nDTEND:20250106\nEND:VEVENT\n";
        let records = parse_calendar(ics, "ALICE", &IanaTz, now());
        let ordinals: Vec<usize> = records.iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, vec![1, 3]);
    }

    #[test]
    fn test_blank_feed() {
        assert!(parse_calendar("", "ALICE", &IanaTz, now()).is_empty());
        assert!(parse_calendar("BEGIN:VCALENDAR\nEND:VCALENDAR", "ALICE", &IanaTz, now()).is_empty());
    }
}
