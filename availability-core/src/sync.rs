//! Sync status as presented to a viewer.
//!
//! Loads may overlap (a refresh started before the previous one finished).
//! Only the most recently started load may publish; older completions are
//! discarded so a slow stale load never overwrites a newer one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::error::AvailabilityResult;
use crate::pipeline::{DataSource, LoadOutcome};
use crate::projection::BookingCollection;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[default]
    Idle,
    Syncing,
    Success,
    Error,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SyncStatus::Idle => write!(f, "idle"),
            SyncStatus::Syncing => write!(f, "syncing"),
            SyncStatus::Success => write!(f, "success"),
            SyncStatus::Error => write!(f, "error"),
        }
    }
}

/// Handed out by [`SyncTracker::begin`]; identifies one load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Whether a completion was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Default)]
pub struct SyncTracker {
    generation: u64,
    status: SyncStatus,
    collection: BookingCollection,
    source: Option<DataSource>,
    error: Option<String>,
    last_synced: Option<DateTime<Utc>>,
}

impl SyncTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new load. Any load started earlier becomes stale.
    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        self.status = SyncStatus::Syncing;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Publish the result of the load identified by `ticket`.
    ///
    /// A success replaces the collection wholesale. A failure clears it and
    /// keeps the message.
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: AvailabilityResult<LoadOutcome>,
    ) -> Completion {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale load"
            );
            return Completion::Stale;
        }

        match result {
            Ok(outcome) => {
                self.status = SyncStatus::Success;
                self.collection = outcome.collection;
                self.source = Some(outcome.source);
                self.error = None;
                self.last_synced = Some(Utc::now());
            }
            Err(e) => {
                self.status = SyncStatus::Error;
                self.collection = BookingCollection::default();
                self.source = None;
                self.error = Some(e.to_string());
            }
        }

        Completion::Applied
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn collection(&self) -> &BookingCollection {
        &self.collection
    }

    pub fn source(&self) -> Option<DataSource> {
        self.source
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_synced(&self) -> Option<DateTime<Utc>> {
        self.last_synced
    }
}
