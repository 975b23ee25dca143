//! Pure parsing helpers used while building TickTick requests.
//!
//! These helpers are stateless and do no I/O, so both the command surface and the
//! library tests can call them directly.
//!
//! # Available Utilities
//!
//! - [`date`] - Resolve `today`, `tomorrow`, `+Nd`, `YYYY-MM-DD` and RFC 3339
//!   input into TickTick's end-of-day timestamp format
//! - [`priority`] - Map priority words to TickTick's 0/1/3/5 scale and back

pub mod date;
pub mod priority;

pub use date::{resolve_date, resolve_date_at};
pub use priority::{parse_priority, priority_label};
