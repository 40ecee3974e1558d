//! The JSON snapshot: a flat array of booking rows exported by the
//! reservation system and pushed to a static location.
//!
//! Used only when no calendar feed could be loaded.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{AvailabilityError, AvailabilityResult};
use crate::ics::resolve_datetime;
use crate::occupancy::OccupancyMode;
use crate::record::RawBookingRecord;
use crate::source::Fetcher;
use crate::timezone::UtcOnly;

/// One snapshot row. Only the columns the pipeline reads are listed; every
/// other column is ignored.
#[derive(Debug, Default, Deserialize)]
struct SnapshotRow {
    lot_ref: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    #[serde(rename = "Mode")]
    mode: Option<String>,
    is_available: Option<bool>,
    price_total_eur: Option<Value>,
    price_sr_eur: Option<Value>,
    discount_rate: Option<Value>,
    updated_at: Option<String>,
}

/// Parse snapshot JSON into occupying records.
///
/// The document must be an array. Rows that are not objects, lack
/// `lot_ref`/`start_date`/`end_date`/`Mode`, carry an unknown `Mode`, have an
/// empty or inverted interval, or are marked `is_available` are skipped.
pub fn parse_snapshot(json: &str) -> AvailabilityResult<Vec<RawBookingRecord>> {
    let document: Value = serde_json::from_str(json)
        .map_err(|e| AvailabilityError::Snapshot(format!("Invalid JSON: {e}")))?;

    let Value::Array(rows) = document else {
        return Err(AvailabilityError::Snapshot(
            "Expected a JSON array of bookings".into(),
        ));
    };

    let now = Utc::now();
    let total = rows.len();
    let records: Vec<RawBookingRecord> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| {
            let row: SnapshotRow = serde_json::from_value(row).ok()?;
            into_record(row, index + 1, now)
        })
        .collect();

    debug!(rows = total, kept = records.len(), "Parsed snapshot");
    Ok(records)
}

/// Fetch the snapshot at `location` and parse it.
pub async fn load_snapshot(
    location: &str,
    fetcher: &dyn Fetcher,
) -> AvailabilityResult<Vec<RawBookingRecord>> {
    let text = fetcher.fetch_text(location).await?;
    let records = parse_snapshot(&text)?;
    info!(location, bookings = records.len(), "Snapshot loaded");
    Ok(records)
}

fn into_record(row: SnapshotRow, ordinal: usize, now: DateTime<Utc>) -> Option<RawBookingRecord> {
    if row.is_available.unwrap_or(false) {
        return None;
    }

    let lot_ref = row.lot_ref.filter(|s| !s.trim().is_empty())?;
    let start = parse_date(row.start_date.as_deref()?)?;
    let end = parse_date(row.end_date.as_deref()?)?;
    let mode = OccupancyMode::from_mode(row.mode.as_deref()?)?;
    let updated_at = row
        .updated_at
        .as_deref()
        .and_then(parse_date)
        .unwrap_or(now);

    let mut record = RawBookingRecord::new(lot_ref.trim(), start, end, mode, updated_at, ordinal)?;
    if let Some(price) = row.price_total_eur.as_ref().and_then(decimal_string) {
        record.price_total_eur = price;
    }
    if let Some(price) = row.price_sr_eur.as_ref().and_then(decimal_string) {
        record.price_sr_eur = price;
    }
    if let Some(rate) = row.discount_rate.as_ref().and_then(decimal_string) {
        record.discount_rate = rate;
    }
    Some(record)
}

fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    resolve_datetime(value, &HashMap::new(), &UtcOnly)
}

/// Prices arrive as strings in exports and as numbers in hand-edited files.
fn decimal_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
