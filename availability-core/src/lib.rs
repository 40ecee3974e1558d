//! Availability core.
//!
//! Turns per-property calendar feeds (or, when none can be loaded, a JSON
//! snapshot) into a normalized collection of bookings:
//! - `ics` tokenizes feeds and resolves their dates and durations
//! - `interpret` turns parsed events into raw booking records
//! - `aggregate` and `pipeline` fan out over every property and fall back
//!   to the snapshot
//! - `projection` groups records into per-property bookings

pub mod aggregate;
pub mod config;
pub mod constants;
pub mod error;
pub mod ics;
pub mod interpret;
pub mod occupancy;
pub mod pipeline;
pub mod projection;
pub mod property;
pub mod record;
pub mod snapshot;
pub mod source;
pub mod sync;
pub mod timezone;

pub use config::AvailabilityConfig;
pub use error::{AvailabilityError, AvailabilityResult};
pub use pipeline::{DataSource, LoadOutcome, load_availability};
pub use projection::{Booking, BookingCollection, BookingStatus};
pub use property::Property;
pub use sync::{SyncStatus, SyncTracker};
