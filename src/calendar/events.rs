use crate::calendar::error::CalendarError;
use crate::sun::SunProvider;
use crate::types::interval::{BarKind, LabeledBar, TimeInterval};
use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, info};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_EVENT_COLOR: &str = "#444444";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CalendarEvent {
    pub start: DateTime<Utc>,
    /// Exclusive; an all-day event ends at midnight after its last day.
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    pub title: String,
    #[serde(default = "default_event_color")]
    pub color: String,
}

fn default_event_color() -> String {
    DEFAULT_EVENT_COLOR.to_string()
}

pub fn load_events(path: &Path) -> Result<Vec<CalendarEvent>, CalendarError> {
    let text =
        std::fs::read_to_string(path).map_err(|e| CalendarError::Read(path.to_path_buf(), e))?;
    let events: Vec<CalendarEvent> =
        serde_json::from_str(&text).map_err(|e| CalendarError::Parse(path.to_path_buf(), e))?;
    info!("Loaded {} calendar events from {:?}", events.len(), path);
    Ok(events)
}

/// Turns calendar events into bars over `span`.
///
/// All-day events are drawn from sunrise on their first day to sunset on their last day,
/// falling back to their own start or end when the sun does not rise or set. Every bar is
/// clamped to `span`; events that end up with nothing left inside it are dropped.
pub fn event_bars(
    events: &[CalendarEvent],
    sun: &dyn SunProvider,
    span: TimeInterval,
) -> Vec<LabeledBar> {
    events
        .iter()
        .filter_map(|event| {
            let (mut start, mut end) = (event.start, event.end);
            if event.all_day {
                if let Some(daylight) = sun.daylight(event.start.date_naive()) {
                    start = daylight.sunrise;
                }
                let last_day = (event.end - TimeDelta::hours(1)).date_naive();
                if let Some(daylight) = sun.daylight(last_day) {
                    end = daylight.sunset;
                }
            }

            let interval = TimeInterval::new(start.max(span.start), end.min(span.end));
            if interval.is_degenerate() {
                debug!("Calendar event {:?} falls outside the forecast", event.title);
                return None;
            }
            Some(
                LabeledBar::builder()
                    .text(event.title.as_str())
                    .color(event.color.as_str())
                    .interval(interval)
                    .kind(BarKind::Event)
                    .build(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sun::Daylight;
    use chrono::{NaiveDate, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 6, day, hour, 0, 0).unwrap()
    }

    fn sun(d: NaiveDate) -> Option<Daylight> {
        Some(Daylight {
            sunrise: d.and_hms_opt(5, 0, 0)?.and_utc(),
            sunset: d.and_hms_opt(21, 0, 0)?.and_utc(),
        })
    }

    fn span() -> TimeInterval {
        TimeInterval::new(at(1, 9), at(5, 9))
    }

    fn event(title: &str, start: DateTime<Utc>, end: DateTime<Utc>, all_day: bool) -> CalendarEvent {
        CalendarEvent {
            start,
            end,
            all_day,
            title: title.to_string(),
            color: "red".to_string(),
        }
    }

    #[test]
    fn all_day_events_run_sunrise_to_sunset() {
        // Two all-day days: the 2nd and the 3rd, ending at midnight on the 4th.
        let bars = event_bars(&[event("Trip", at(2, 0), at(4, 0), true)], &sun, span());
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].interval, TimeInterval::new(at(2, 5), at(3, 21)));
        assert_eq!(bars[0].kind, BarKind::Event);
        assert_eq!(bars[0].color, "red");
    }

    #[test]
    fn events_are_clamped_to_the_forecast() {
        let bars = event_bars(
            &[
                event("Long", at(1, 0), at(9, 0), false),
                event("Before", at(1, 2), at(1, 8), false),
                event("Meeting", at(3, 10), at(3, 11), false),
            ],
            &sun,
            span(),
        );
        assert_eq!(
            bars.iter().map(|b| (b.text.as_str(), b.interval)).collect::<Vec<_>>(),
            vec![
                ("Long", span()),
                ("Meeting", TimeInterval::new(at(3, 10), at(3, 11))),
            ]
        );
    }

    #[test]
    fn all_day_event_without_sun_keeps_its_times() {
        let no_sun = |_: NaiveDate| -> Option<Daylight> { None };
        let bars = event_bars(&[event("Holiday", at(2, 0), at(3, 0), true)], &no_sun, span());
        assert_eq!(bars[0].interval, TimeInterval::new(at(2, 0), at(3, 0)));
    }

    #[test]
    fn loads_events_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"[
                {"start": "2023-06-02T00:00:00Z", "end": "2023-06-03T00:00:00Z", "all_day": true, "title": "Bin day"},
                {"start": "2023-06-02T18:00:00Z", "end": "2023-06-02T19:30:00Z", "title": "Dentist", "color": "blue"}
            ]"#,
        )
        .unwrap();

        let events = load_events(file.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].all_day);
        assert_eq!(events[0].color, DEFAULT_EVENT_COLOR);
        assert!(!events[1].all_day);
        assert_eq!(events[1].end, Utc.with_ymd_and_hms(2023, 6, 2, 19, 30, 0).unwrap());
    }

    #[test]
    fn bad_events_file_is_reported() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{}").unwrap();
        assert!(matches!(load_events(file.path()), Err(CalendarError::Parse(..))));
        assert!(matches!(
            load_events(Path::new("/no/such/events.json")),
            Err(CalendarError::Read(..))
        ));
    }
}
