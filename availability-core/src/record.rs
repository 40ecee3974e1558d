//! Source-agnostic occupancy records.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::occupancy::OccupancyMode;

/// One occupied interval for one lot, as produced by either a calendar feed
/// or the JSON snapshot.
///
/// `end > start` holds for every record built through [`RawBookingRecord::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBookingRecord {
    pub lot_ref: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub mode: OccupancyMode,
    pub duration_days: i64,
    pub updated_at: DateTime<Utc>,
    pub price_total_eur: String,
    pub price_sr_eur: String,
    pub discount_rate: String,
    pub is_available: bool,
    /// 1-based position of the record within the feed or snapshot it came from
    pub ordinal: usize,
}

impl RawBookingRecord {
    /// Build an occupying record, or `None` if the interval is empty or
    /// inverted.
    pub fn new(
        lot_ref: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        mode: OccupancyMode,
        updated_at: DateTime<Utc>,
        ordinal: usize,
    ) -> Option<Self> {
        if end <= start {
            return None;
        }

        Some(RawBookingRecord {
            lot_ref: lot_ref.to_string(),
            start,
            end,
            mode,
            duration_days: duration_days(start, end),
            updated_at,
            price_total_eur: "0".to_string(),
            price_sr_eur: "0".to_string(),
            discount_rate: "0".to_string(),
            is_available: false,
            ordinal,
        })
    }

    /// Total price in euros, `0.0` when the upstream string is not numeric.
    pub fn price(&self) -> f64 {
        self.price_total_eur
            .trim()
            .replace(',', ".")
            .parse()
            .unwrap_or(0.0)
    }
}

/// Whole days covered by `[start, end)`, rounded up, never less than one.
pub fn duration_days(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    let span = (end - start).num_milliseconds();
    let day = TimeDelta::days(1).num_milliseconds();
    let mut days = span / day;
    if span % day > 0 {
        days += 1;
    }
    days.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_duration_rounds_up() {
        assert_eq!(duration_days(at(10, 0), at(11, 0)), 1);
        assert_eq!(duration_days(at(10, 0), at(11, 1)), 2);
        assert_eq!(duration_days(at(10, 0), at(10, 1)), 1);
        assert_eq!(duration_days(at(10, 0), at(15, 0)), 5);
    }

    #[test]
    fn test_new_rejects_empty_and_inverted_intervals() {
        let mode = OccupancyMode::Reservation;
        assert!(RawBookingRecord::new("A", at(10, 0), at(10, 0), mode, at(1, 0), 1).is_none());
        assert!(RawBookingRecord::new("A", at(11, 0), at(10, 0), mode, at(1, 0), 1).is_none());
    }

    #[test]
    fn test_new_record_is_occupying_with_zero_price() {
        let record =
            RawBookingRecord::new("ALICE", at(10, 0), at(12, 0), OccupancyMode::Option, at(1, 0), 3)
                .unwrap();
        assert!(!record.is_available);
        assert_eq!(record.duration_days, 2);
        assert_eq!(record.price(), 0.0);
        assert_eq!(record.ordinal, 3);
    }

    #[test]
    fn test_price_parsing() {
        let mut record =
            RawBookingRecord::new("ALICE", at(10, 0), at(12, 0), OccupancyMode::Option, at(1, 0), 1)
                .unwrap();
        record.price_total_eur = "1250.50".to_string();
        assert_eq!(record.price(), 1250.5);
        record.price_total_eur = "12,5".to_string();
        assert_eq!(record.price(), 12.5);
        record.price_total_eur = "n/a".to_string();
        assert_eq!(record.price(), 0.0);
    }
}
