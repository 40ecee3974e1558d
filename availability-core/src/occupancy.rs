//! Occupancy mode: whether an occupied interval is a firm reservation or a
//! tentative option.
//!
//! Upstream data carries this as free text (ICS `STATUS`, summary keywords,
//! the snapshot's `Mode` column). Every interpretation of that text goes
//! through the functions here.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::OPTION_KEYWORDS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyMode {
    Reservation,
    Option,
}

impl OccupancyMode {
    /// Derive the mode of a calendar event.
    ///
    /// | STATUS      | summary/description keyword | mode        |
    /// |-------------|-----------------------------|-------------|
    /// | tentative   | any                         | Option      |
    /// | confirmed   | any                         | Reservation |
    /// | other/none  | option, tentative, pre-book | Option      |
    /// | other/none  | none                        | Reservation |
    pub fn derive(status: &str, summary: &str, description: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "tentative" => return OccupancyMode::Option,
            "confirmed" => return OccupancyMode::Reservation,
            _ => {}
        }

        let haystack = format!("{}\n{}", summary, description).to_lowercase();
        if OPTION_KEYWORDS.iter().any(|keyword| haystack.contains(keyword)) {
            OccupancyMode::Option
        } else {
            OccupancyMode::Reservation
        }
    }

    /// Strict reading of a snapshot `Mode` value. Unmapped strings are `None`
    /// and the record carrying them is dropped.
    pub fn from_mode(mode: &str) -> Option<Self> {
        match mode.trim().to_lowercase().as_str() {
            "reservation" | "confirmed" => Some(OccupancyMode::Reservation),
            "option" | "tentative" => Some(OccupancyMode::Option),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OccupancyMode::Reservation => "reservation",
            OccupancyMode::Option => "option",
        }
    }
}

impl fmt::Display for OccupancyMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
