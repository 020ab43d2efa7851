use crate::types::forecast_point::ForecastPoint;
use crate::types::interval::TimeInterval;
use chrono::{NaiveDate, TimeDelta};
use log::info;

/// Drops every point later than `days` after the first point.
pub fn limit_to_days(mut forecast: Vec<ForecastPoint>, days: u32) -> Vec<ForecastPoint> {
    let Some(first_time) = forecast.first().map(|p| p.time) else {
        return forecast;
    };
    info!("Limiting forecast to {} days", days);
    let cutoff = first_time + TimeDelta::days(i64::from(days));
    forecast.retain(|point| point.time <= cutoff);
    forecast
}

/// Every calendar date (UTC) from the first point's date to the last point's date,
/// inclusive.
pub fn dates_spanned(forecast: &[ForecastPoint]) -> Vec<NaiveDate> {
    let (Some(first), Some(last)) = (forecast.first(), forecast.last()) else {
        return Vec::new();
    };
    first
        .time
        .date_naive()
        .iter_days()
        .take_while(|date| *date <= last.time.date_naive())
        .collect()
}

/// The time span covered by the forecast, `None` when it has fewer than two distinct
/// sample times.
pub fn time_span(forecast: &[ForecastPoint]) -> Option<TimeInterval> {
    let span = TimeInterval::new(forecast.first()?.time, forecast.last()?.time);
    (!span.is_degenerate()).then_some(span)
}
