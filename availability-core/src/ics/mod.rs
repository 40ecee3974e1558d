//! iCalendar reading.
//!
//! Only what booking feeds need from RFC 5545: line unfolding, TEXT
//! unescaping, VEVENT grouping and date/duration values.

mod datetime;
mod event;
mod tokenize;

pub use datetime::{parse_duration, resolve_datetime};
pub use event::ParsedEvent;
pub use tokenize::{ContentLine, decode_text, parse_events, unfold_lines};
