//! Colored terminal rendering for availability types.

use availability_core::aggregate::SourceFailure;
use availability_core::pipeline::LoadOutcome;
use availability_core::{Booking, BookingStatus, DataSource, Property, SyncStatus};
use owo_colors::OwoColorize;

use crate::utils::tui::pluralize;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for BookingStatus {
    fn render(&self) -> String {
        match self {
            BookingStatus::Confirmed => "confirmed".red().to_string(),
            BookingStatus::Option => "option".yellow().to_string(),
        }
    }
}

impl Render for Booking {
    fn render(&self) -> String {
        let days = self.duration_days();
        let dates = format!(
            "{} → {}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        );
        let length = format!("{} {}", days, pluralize("day", days as usize));

        let mut line = format!("{} {} {}", dates, length.dimmed(), self.status.render());
        if self.price > 0.0 {
            line.push_str(&format!(" {}", format!("{:.2} €", self.price).dimmed()));
        }
        line
    }
}

impl Render for Property {
    fn render(&self) -> String {
        format!("🏠 {}", self.display_name())
    }
}

impl Render for SyncStatus {
    fn render(&self) -> String {
        match self {
            SyncStatus::Idle => "idle".dimmed().to_string(),
            SyncStatus::Syncing => "syncing".cyan().to_string(),
            SyncStatus::Success => "synced".green().to_string(),
            SyncStatus::Error => "error".red().to_string(),
        }
    }
}

impl Render for SourceFailure {
    fn render(&self) -> String {
        format!("{} {}", self.slug, format!("({})", self.reason).dimmed())
    }
}

/// Bookings of one property, indented under its name.
pub fn render_bookings(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "   No bookings".dimmed().to_string();
    }

    bookings
        .iter()
        .map(|booking| format!("   {}", booking.render()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-line summary of where the data came from.
pub fn render_summary(outcome: &LoadOutcome) -> String {
    let total = outcome.collection.total();
    let bookings = format!("{} {}", total, pluralize("booking", total));

    match outcome.source {
        DataSource::Calendar => format!(
            "{} from {} {}",
            bookings,
            outcome.successful_calendars,
            pluralize("calendar", outcome.successful_calendars)
        ),
        DataSource::Snapshot => format!("{} from {}", bookings, "snapshot".yellow()),
    }
}
