//! Error types for the availability pipeline.
//!
//! Only source-level and whole-pipeline failures are errors. Malformed lines,
//! unresolvable dates and invalid intervals are dropped where they occur and
//! never reach this type.

use thiserror::Error;

/// Errors that can occur while loading availability.
#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch {location}: {reason}")]
    Fetch { location: String, reason: String },

    /// `message` is the `error` field of a JSON error body, when the server sent one.
    #[error("Failed to fetch {location} (status {status})")]
    HttpStatus {
        location: String,
        status: u16,
        message: Option<String>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("{0}")]
    Unavailable(String),
}

/// Result type alias for availability operations.
pub type AvailabilityResult<T> = Result<T, AvailabilityError>;
