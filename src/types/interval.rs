use bon::Builder;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// A continuous span of time, `start` to `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// A zero-width (or inverted) interval has nothing to draw.
    pub fn is_degenerate(&self) -> bool {
        self.start >= self.end
    }

    /// Two intervals overlap when they share a strictly positive span of time. Intervals
    /// that merely touch at an endpoint do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        let latest_start = self.start.max(other.start);
        let earliest_end = self.end.min(other.end);
        latest_start < earliest_end
    }

    /// Whether `time` lies strictly inside this interval.
    pub fn is_active_at(&self, time: DateTime<Utc>) -> bool {
        self.start < time && time < self.end
    }
}

/// Where a [`LabeledBar`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarKind {
    /// Derived from the forecast (frost, storm, laundry day).
    Condition,
    /// Taken from a calendar feed.
    Event,
}

/// A labeled time interval ready for display.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use meteogram::{BarKind, LabeledBar, TimeInterval};
///
/// let bar = LabeledBar::builder()
///     .text("Frost")
///     .color("#8fd3fe")
///     .kind(BarKind::Condition)
///     .interval(TimeInterval::new(
///         Utc.with_ymd_and_hms(2023, 1, 5, 1, 30, 0).unwrap(),
///         Utc.with_ymd_and_hms(2023, 1, 5, 8, 30, 0).unwrap(),
///     ))
///     .build();
/// assert_eq!(bar.interval.duration().num_hours(), 7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Builder)]
pub struct LabeledBar {
    #[builder(into)]
    pub text: String,
    #[serde(flatten)]
    pub interval: TimeInterval,
    #[builder(into)]
    pub color: String,
    pub kind: BarKind,
}

impl LabeledBar {
    pub fn start(&self) -> DateTime<Utc> {
        self.interval.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.interval.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = TimeInterval::new(at(0), at(10));
        let b = TimeInterval::new(at(10), at(15));
        let c = TimeInterval::new(at(9), at(11));
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
        assert!(a.overlaps(&c));
        assert!(c.overlaps(&b));
    }

    #[test]
    fn activity_excludes_endpoints() {
        let a = TimeInterval::new(at(2), at(4));
        assert!(!a.is_active_at(at(2)));
        assert!(a.is_active_at(at(3)));
        assert!(!a.is_active_at(at(4)));
    }

    #[test]
    fn zero_width_is_degenerate() {
        assert!(TimeInterval::new(at(3), at(3)).is_degenerate());
        assert!(TimeInterval::new(at(4), at(3)).is_degenerate());
        assert!(!TimeInterval::new(at(3), at(4)).is_degenerate());
    }
}
