//! Concurrent loading of every property's calendar feed.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::AvailabilityError;
use crate::interpret::parse_calendar;
use crate::record::RawBookingRecord;
use crate::source::{CalendarSource, Fetcher};
use crate::timezone::TzResolver;

/// A feed that could not be retrieved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub slug: String,
    pub location: String,
    pub reason: String,
}

/// Merged result of one calendar fan-out.
#[derive(Debug, Default)]
pub struct CalendarLoad {
    /// Records from every feed that was retrieved, in source order
    pub bookings: Vec<RawBookingRecord>,
    /// Feeds whose content was retrieved, however many events they held
    pub successful_calendars: usize,
    pub failures: Vec<SourceFailure>,
}

impl CalendarLoad {
    /// Calendar data is authoritative as soon as one feed came back.
    pub fn is_usable(&self) -> bool {
        self.successful_calendars > 0
    }
}

/// What a single feed contributed.
enum FeedOutcome {
    Loaded(Vec<RawBookingRecord>),
    Failed(SourceFailure),
}

/// Fetch and parse every source concurrently and merge the results.
///
/// Each feed is handled by its own future with its own result; nothing is
/// shared between them. The merge runs once, after all of them settle, in
/// the order of `sources`. A failing feed contributes no bookings and never
/// stops its siblings.
pub async fn load_calendars(
    sources: &[CalendarSource],
    fetcher: &dyn Fetcher,
    tz: &dyn TzResolver,
) -> CalendarLoad {
    if sources.is_empty() {
        return CalendarLoad::default();
    }

    let now = Utc::now();
    let outcomes = join_all(
        sources
            .iter()
            .map(|source| load_feed(source, fetcher, tz, now)),
    )
    .await;

    let mut load = CalendarLoad::default();
    for outcome in outcomes {
        match outcome {
            FeedOutcome::Loaded(records) => {
                load.successful_calendars += 1;
                load.bookings.extend(records);
            }
            FeedOutcome::Failed(failure) => load.failures.push(failure),
        }
    }

    info!(
        sources = sources.len(),
        successful = load.successful_calendars,
        bookings = load.bookings.len(),
        "Calendar feeds loaded"
    );

    load
}

async fn load_feed(
    source: &CalendarSource,
    fetcher: &dyn Fetcher,
    tz: &dyn TzResolver,
    now: DateTime<Utc>,
) -> FeedOutcome {
    match fetcher.fetch_text(&source.location).await {
        Ok(text) => {
            let records = parse_calendar(&text, &source.lot_ref, tz, now);
            debug!(slug = %source.slug, bookings = records.len(), "Parsed calendar feed");
            FeedOutcome::Loaded(records)
        }
        Err(e) => {
            warn!(slug = %source.slug, error = %e, "Failed to load calendar feed");
            FeedOutcome::Failed(SourceFailure {
                slug: source.slug.clone(),
                location: source.location.clone(),
                reason: describe(&e),
            })
        }
    }
}

fn describe(error: &AvailabilityError) -> String {
    match error {
        AvailabilityError::HttpStatus { status, .. } => format!("HTTP status {}", status),
        AvailabilityError::Fetch { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::AvailabilityResult;
    use crate::occupancy::OccupancyMode;
    use crate::timezone::IanaTz;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    /// In-memory fetcher: known locations return their text, locations with
    /// a status answer like a server returning that status, anything else
    /// fails like an unreachable host. Optional per-location delays let
    /// tests finish feeds out of order.
    #[derive(Default)]
    pub(crate) struct FakeFetcher {
        pub responses: HashMap<String, String>,
        pub statuses: HashMap<String, (u16, String)>,
        pub delays: HashMap<String, Duration>,
    }

    impl FakeFetcher {
        pub fn with(mut self, location: &str, body: &str) -> Self {
            self.responses.insert(location.to_string(), body.to_string());
            self
        }

        /// Answer `location` with a non-2xx `status` and `body`.
        pub fn status(mut self, location: &str, status: u16, body: &str) -> Self {
            self.statuses
                .insert(location.to_string(), (status, body.to_string()));
            self
        }

        pub fn delayed(mut self, location: &str, delay: Duration) -> Self {
            self.delays.insert(location.to_string(), delay);
            self
        }
    }

    #[async_trait]
    impl Fetcher for FakeFetcher {
        async fn fetch_text(&self, location: &str) -> AvailabilityResult<String> {
            if let Some(delay) = self.delays.get(location) {
                tokio::time::sleep(*delay).await;
            }
            if let Some((status, body)) = self.statuses.get(location) {
                return Err(AvailabilityError::HttpStatus {
                    location: location.to_string(),
                    status: *status,
                    message: crate::source::error_message(body),
                });
            }
            self.responses
                .get(location)
                .cloned()
                .ok_or_else(|| AvailabilityError::Fetch {
                    location: location.to_string(),
                    reason: "connection refused".to_string(),
                })
        }
    }

    pub(crate) fn source(slug: &str) -> CalendarSource {
        CalendarSource {
            slug: slug.to_string(),
            location: format!("https://cal.example.com/{}.ics", slug),
            lot_ref: slug.to_uppercase(),
        }
    }

    pub(crate) const ONE_EVENT: &str =
        "BEGIN:VCALENDAR\nBEGIN:VEVENT\nDTSTART:20250110\nDTEND:20250115\nSUMMARY:Option - Smith\nEND:VEVENT\nEND:VCALENDAR\n";

    #[tokio::test]
    async fn test_one_failing_source_does_not_abort_the_other() {
        let fetcher = FakeFetcher::default().with("https://cal.example.com/alice.ics", ONE_EVENT);
        let sources = vec![source("alice"), source("cinq")];

        let load = load_calendars(&sources, &fetcher, &IanaTz).await;

        assert_eq!(load.successful_calendars, 1);
        assert!(load.is_usable());
        assert_eq!(load.bookings.len(), 1);
        assert_eq!(load.bookings[0].lot_ref, "ALICE");
        assert_eq!(load.bookings[0].mode, OccupancyMode::Option);
        assert_eq!(load.failures.len(), 1);
        assert_eq!(load.failures[0].slug, "cinq");
        assert_eq!(load.failures[0].reason, "connection refused");
    }

    #[tokio::test]
    async fn test_http_status_failure_is_described() {
        let fetcher = FakeFetcher::default()
            .with("https://cal.example.com/alice.ics", ONE_EVENT)
            .status("https://cal.example.com/cinq.ics", 404, "Not Found");

        let load = load_calendars(&[source("alice"), source("cinq")], &fetcher, &IanaTz).await;

        assert_eq!(load.successful_calendars, 1);
        assert_eq!(load.bookings.len(), 1);
        assert_eq!(load.failures.len(), 1);
        assert_eq!(load.failures[0].slug, "cinq");
        assert_eq!(load.failures[0].location, "https://cal.example.com/cinq.ics");
        assert_eq!(load.failures[0].reason, "HTTP status 404");
    }

    #[tokio::test]
    async fn test_empty_feed_still_counts_as_success() {
        let fetcher = FakeFetcher::default()
            .with("https://cal.example.com/alice.ics", "BEGIN:VCALENDAR\nEND:VCALENDAR\n");

        let load = load_calendars(&[source("alice")], &fetcher, &IanaTz).await;

        assert_eq!(load.successful_calendars, 1);
        assert!(load.bookings.is_empty());
    }

    #[tokio::test]
    async fn test_all_sources_failing() {
        let load = load_calendars(&[source("alice"), source("cinq")], &FakeFetcher::default(), &IanaTz).await;
        assert_eq!(load.successful_calendars, 0);
        assert!(!load.is_usable());
        assert_eq!(load.failures.len(), 2);
    }

    #[tokio::test]
    async fn test_no_sources() {
        let load = load_calendars(&[], &FakeFetcher::default(), &IanaTz).await;
        assert_eq!(load.successful_calendars, 0);
        assert!(load.bookings.is_empty());
    }

    #[tokio::test]
    async fn test_merge_order_follows_sources_not_completion() {
        let fetcher = FakeFetcher::default()
            .with("https://cal.example.com/alice.ics", ONE_EVENT)
            .with("https://cal.example.com/cinq.ics", ONE_EVENT)
            .delayed("https://cal.example.com/alice.ics", Duration::from_millis(50));

        let load = load_calendars(&[source("alice"), source("cinq")], &fetcher, &IanaTz).await;

        let lots: Vec<&str> = load.bookings.iter().map(|b| b.lot_ref.as_str()).collect();
        assert_eq!(lots, vec!["ALICE", "CINQ"]);
    }

    #[tokio::test]
    async fn test_fetches_run_concurrently() {
        let delay = Duration::from_millis(200);
        let mut fetcher = FakeFetcher::default();
        let sources: Vec<CalendarSource> = ["alice", "cinq", "face", "marie"]
            .iter()
            .map(|slug| source(slug))
            .collect();
        for s in &sources {
            fetcher = fetcher.with(&s.location, ONE_EVENT).delayed(&s.location, delay);
        }

        let started = std::time::Instant::now();
        let load = load_calendars(&sources, &fetcher, &IanaTz).await;

        assert_eq!(load.successful_calendars, 4);
        assert!(started.elapsed() < delay * 3, "fetches were serialized");
    }
}
