//! Final booking entities, grouped per property.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::occupancy::OccupancyMode;
use crate::property::{Property, canonical_slug};
use crate::record::RawBookingRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookingStatus {
    Confirmed,
    Option,
}

impl From<OccupancyMode> for BookingStatus {
    fn from(mode: OccupancyMode) -> Self {
        match mode {
            OccupancyMode::Reservation => BookingStatus::Confirmed,
            OccupancyMode::Option => BookingStatus::Option,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Option => write!(f, "option"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub property_slug: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: BookingStatus,
    pub price: f64,
    pub is_available: bool,
}

impl Booking {
    pub fn duration_days(&self) -> i64 {
        crate::record::duration_days(self.start, self.end)
    }

    /// Whether the booking occupies any part of `date` (UTC), treating the
    /// end as exclusive.
    pub fn covers(&self, date: NaiveDate) -> bool {
        let Some(day_start) = date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()) else {
            return false;
        };
        let day_end = day_start + chrono::TimeDelta::days(1);
        self.start < day_end && self.end > day_start
    }
}

/// Bookings keyed by canonical property slug, each list sorted by start.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BookingCollection {
    by_property: BTreeMap<String, Vec<Booking>>,
}

impl BookingCollection {
    pub fn get(&self, slug: &str) -> &[Booking] {
        self.by_property
            .get(slug)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.by_property.contains_key(slug)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Booking])> {
        self.by_property
            .iter()
            .map(|(slug, bookings)| (slug.as_str(), bookings.as_slice()))
    }

    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.by_property.keys().map(String::as_str)
    }

    /// Total number of bookings across all properties.
    pub fn total(&self) -> usize {
        self.by_property.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// The booking occupying `slug` on `date`, if any.
    pub fn occupied_on(&self, slug: &str, date: NaiveDate) -> Option<&Booking> {
        self.get(slug).iter().find(|booking| booking.covers(date))
    }
}

/// Group raw records into per-property booking lists.
///
/// With `known` properties, records for any other slug are dropped and
/// every known property gets an entry even when it has no bookings. With
/// `None`, every slug is accepted. A known property's configured lot
/// reference resolves to that property's slug.
pub fn project(records: &[RawBookingRecord], known: Option<&[Property]>) -> BookingCollection {
    let mut grouped: BTreeMap<String, Vec<&RawBookingRecord>> = BTreeMap::new();
    // Canonical lot reference -> property slug
    let mut aliases: HashMap<String, String> = HashMap::new();

    if let Some(properties) = known {
        for property in properties {
            let slug = canonical_slug(&property.slug);
            aliases.insert(slug.clone(), slug.clone());
            grouped.entry(slug).or_default();
        }
        // A lot reference never takes over another property's own slug.
        for property in properties {
            aliases
                .entry(canonical_slug(&property.lot_ref()))
                .or_insert_with(|| canonical_slug(&property.slug));
        }
    }

    for record in records.iter().filter(|r| !r.is_available) {
        let reference = canonical_slug(&record.lot_ref);
        let slug = aliases.get(&reference).cloned().unwrap_or(reference);
        match grouped.get_mut(&slug) {
            Some(list) => list.push(record),
            None if known.is_none() => {
                grouped.insert(slug, vec![record]);
            }
            None => {
                tracing::debug!(lot_ref = %record.lot_ref, "Record for unknown property dropped");
            }
        }
    }

    let by_property = grouped
        .into_iter()
        .map(|(slug, mut list)| {
            list.sort_by(|a, b| a.start.cmp(&b.start).then(a.ordinal.cmp(&b.ordinal)));
            let bookings = to_bookings(&slug, &list);
            (slug, bookings)
        })
        .collect();

    BookingCollection { by_property }
}

fn to_bookings(slug: &str, records: &[&RawBookingRecord]) -> Vec<Booking> {
    let mut seen: HashMap<String, usize> = HashMap::new();

    records
        .iter()
        .map(|record| {
            let base = format!(
                "{}-{}-{}",
                slug,
                record.ordinal,
                record.start.to_rfc3339_opts(SecondsFormat::Secs, true)
            );
            let count = seen.entry(base.clone()).or_insert(0);
            *count += 1;
            let id = if *count == 1 {
                base
            } else {
                format!("{}-{}", base, count)
            };

            Booking {
                id,
                property_slug: slug.to_string(),
                start: record.start,
                end: record.end,
                status: record.mode.into(),
                price: record.price(),
                is_available: record.is_available,
            }
        })
        .collect()
}
