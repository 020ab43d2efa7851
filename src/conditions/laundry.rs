use crate::config::LaundryDay;
use crate::sun::SunProvider;
use crate::types::forecast_point::ForecastPoint;
use crate::types::interval::{BarKind, LabeledBar, TimeInterval};
use crate::utils::hours;
use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use ordered_float::OrderedFloat;
use serde::Deserialize;

pub const LAUNDRY_DAY_LABEL: &str = "Laundry Day";

/// Where the drying window of a day ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DryingWindowEnd {
    /// The window runs until sunset.
    #[default]
    Sunset,
    /// The window covers exactly the minimum drying time after its start.
    StartPlusMinDaylight,
}

/// Whether samples on the window boundaries count towards the day's averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMembership {
    #[default]
    Inclusive,
    Exclusive,
}

impl WindowMembership {
    fn contains(self, window: &TimeInterval, time: DateTime<Utc>) -> bool {
        match self {
            WindowMembership::Inclusive => window.start <= time && time <= window.end,
            WindowMembership::Exclusive => window.is_active_at(time),
        }
    }
}

/// Aggregated drying conditions over one window.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DryingConditions {
    mean_temperature: f64,
    mean_humidity: f64,
    max_precipitation_probability: f64,
}

impl DryingConditions {
    /// `None` if any aggregate has no sample to work from.
    fn aggregate<'a>(points: impl Iterator<Item = &'a ForecastPoint> + Clone) -> Option<Self> {
        Some(Self {
            mean_temperature: mean(points.clone().filter_map(|p| p.air_temperature))?,
            mean_humidity: mean(points.clone().filter_map(|p| p.humidity))?,
            max_precipitation_probability: points
                .filter_map(|p| p.precipitation_probability)
                .map(OrderedFloat)
                .max()?
                .into_inner(),
        })
    }

    fn qualifies(&self, thresholds: &LaundryDay) -> bool {
        self.mean_temperature >= thresholds.min_average_temp
            && self.mean_humidity <= thresholds.max_average_humidity
            && self.max_precipitation_probability <= thresholds.max_precip_prob
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// One "Laundry Day" bar, sunrise to sunset, for every date in `dates` with good
/// drying conditions.
///
/// Dates without sunrise and sunset, with a drying window shorter than
/// `min_hours_daylight`, or without forecast samples inside the window get no bar.
pub fn laundry_day_bars(
    forecast: &[ForecastPoint],
    thresholds: &LaundryDay,
    color: &str,
    dates: &[NaiveDate],
    sun: &dyn SunProvider,
) -> Vec<LabeledBar> {
    dates
        .iter()
        .filter_map(|&date| {
            let daylight = sun.daylight(date)?;
            let window = drying_window(date, daylight.sunrise, daylight.sunset, thresholds)?;

            let in_window = forecast
                .iter()
                .filter(|p| thresholds.membership.contains(&window, p.time));
            let Some(conditions) = DryingConditions::aggregate(in_window) else {
                debug!("No laundry verdict for {}: not enough samples in the drying window", date);
                return None;
            };
            if !conditions.qualifies(thresholds) {
                debug!("{} is not a laundry day: {:?}", date, conditions);
                return None;
            }

            debug!("{} is a laundry day: {:?}", date, conditions);
            Some(
                LabeledBar::builder()
                    .text(LAUNDRY_DAY_LABEL)
                    .color(color)
                    .interval(daylight.as_interval())
                    .kind(BarKind::Condition)
                    .build(),
            )
        })
        .collect()
}

fn drying_window(
    date: NaiveDate,
    sunrise: DateTime<Utc>,
    sunset: DateTime<Utc>,
    thresholds: &LaundryDay,
) -> Option<TimeInterval> {
    let midnight = date.and_hms_opt(0, 0, 0)?.and_utc();
    let start = sunrise.max(midnight + hours(thresholds.hang_out_time));
    let min_drying_time = hours(thresholds.min_hours_daylight);

    if sunset - start < min_drying_time {
        debug!(
            "Drying window on {} starts at {} and is too short before sunset at {}",
            date, start, sunset
        );
        return None;
    }

    let end = match thresholds.window_end {
        DryingWindowEnd::Sunset => sunset,
        DryingWindowEnd::StartPlusMinDaylight => start + min_drying_time,
    };
    Some(TimeInterval::new(start, end))
}
