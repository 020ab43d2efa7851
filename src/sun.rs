//! Sunrise and sunset times, used for laundry-day windows, all-day calendar events and
//! daytime shading.

use crate::types::interval::TimeInterval;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sunrise::{Coordinates, SolarDay, SolarEvent};

/// Sunrise and sunset of one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Daylight {
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

impl Daylight {
    pub fn as_interval(&self) -> TimeInterval {
        TimeInterval::new(self.sunrise, self.sunset)
    }
}

/// Supplies sunrise and sunset for a date.
///
/// Returns `None` when the sun does not both rise and set on that date.
pub trait SunProvider {
    fn daylight(&self, date: NaiveDate) -> Option<Daylight>;
}

impl<F> SunProvider for F
where
    F: Fn(NaiveDate) -> Option<Daylight>,
{
    fn daylight(&self, date: NaiveDate) -> Option<Daylight> {
        self(date)
    }
}

/// Computes sunrise and sunset from the configured forecast location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarCalculator {
    lat: f64,
    lon: f64,
}

impl SolarCalculator {
    /// Returns `None` if the coordinates are out of range.
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        Coordinates::new(lat, lon).map(|_| Self { lat, lon })
    }
}

impl SunProvider for SolarCalculator {
    fn daylight(&self, date: NaiveDate) -> Option<Daylight> {
        let coordinates = Coordinates::new(self.lat, self.lon)?;
        let day = SolarDay::new(coordinates, date);
        let daylight = Daylight {
            sunrise: day.event_time(SolarEvent::Sunrise),
            sunset: day.event_time(SolarEvent::Sunset),
        };
        // Without a sunrise or sunset both events come back as the same sentinel time.
        (daylight.sunrise < daylight.sunset).then_some(daylight)
    }
}
