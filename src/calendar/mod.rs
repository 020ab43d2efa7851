//! Calendar events shown as bars alongside the forecast.
//!
//! Events arrive already expanded (recurrences resolved) in a JSON file; fetching and
//! expanding the calendar feeds happens elsewhere.

pub mod error;
pub mod events;
