//! End-to-end load: calendar feeds first, JSON snapshot as fallback, then
//! projection into a `BookingCollection`.

use serde::Serialize;
use std::fmt;
use tracing::{info, warn};

use crate::aggregate::{SourceFailure, load_calendars};
use crate::config::AvailabilityConfig;
use crate::error::{AvailabilityError, AvailabilityResult};
use crate::projection::{BookingCollection, project};
use crate::snapshot::load_snapshot;
use crate::source::{Fetcher, SourceFetcher};
use crate::timezone::TzResolver;

/// Which path produced the published bookings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Calendar,
    Snapshot,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DataSource::Calendar => write!(f, "calendar feeds"),
            DataSource::Snapshot => write!(f, "snapshot"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub collection: BookingCollection,
    pub source: DataSource,
    pub successful_calendars: usize,
    pub failed_sources: Vec<SourceFailure>,
}

/// Load availability with the fetcher and timezone handling `config` asks for.
pub async fn run(config: &AvailabilityConfig) -> AvailabilityResult<LoadOutcome> {
    let fetcher = SourceFetcher::new(config.fetch_timeout())?;
    let tz = config.tz_resolver()?;
    load_availability(config, &fetcher, tz.as_ref()).await
}

/// Load availability for every configured property.
///
/// Calendar data wins as soon as a single feed was retrieved, even if that
/// feed held no events. The snapshot is only read when calendars are
/// disabled, no property is configured, or every feed failed.
pub async fn load_availability(
    config: &AvailabilityConfig,
    fetcher: &dyn Fetcher,
    tz: &dyn TzResolver,
) -> AvailabilityResult<LoadOutcome> {
    let known = Some(config.properties.as_slice());
    let sources = config.sources();

    let mut successful_calendars = 0;
    let mut failed_sources = Vec::new();

    if config.use_ics && !sources.is_empty() {
        let load = load_calendars(&sources, fetcher, tz).await;
        if load.is_usable() {
            return Ok(LoadOutcome {
                collection: project(&load.bookings, known),
                source: DataSource::Calendar,
                successful_calendars: load.successful_calendars,
                failed_sources: load.failures,
            });
        }

        warn!(
            failed = load.failures.len(),
            "No calendar feed could be loaded, falling back to snapshot"
        );
        successful_calendars = load.successful_calendars;
        failed_sources = load.failures;
    }

    match load_snapshot(&config.snapshot, fetcher).await {
        Ok(records) => {
            let collection = project(&records, known);
            info!(bookings = collection.total(), "Availability loaded from snapshot");
            Ok(LoadOutcome {
                collection,
                source: DataSource::Snapshot,
                successful_calendars,
                failed_sources,
            })
        }
        Err(e) => {
            warn!(error = %e, "Snapshot could not be loaded");
            let reason = snapshot_reason(&e);
            let message = if config.use_ics && !failed_sources.is_empty() {
                format!(
                    "No calendar feed could be loaded ({} failed) and the snapshot is unavailable: {}",
                    failed_sources.len(),
                    reason
                )
            } else {
                format!("The availability snapshot is unavailable: {}", reason)
            };
            Err(AvailabilityError::Unavailable(message))
        }
    }
}

/// The server's own explanation when the snapshot response carried one.
fn snapshot_reason(error: &AvailabilityError) -> String {
    match error {
        AvailabilityError::HttpStatus {
            message: Some(message),
            ..
        } => message.clone(),
        other => other.to_string(),
    }
}
