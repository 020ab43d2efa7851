use crate::forecast::error::IngestionError;
use crate::types::forecast_point::{record_time, ForecastPoint, Granularity, RawRecord};
use log::{info, warn};
use serde::Deserialize;
use std::collections::BTreeMap;

/// What to do with a raw record that has no usable timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTimePolicy {
    /// Log a warning and drop the record.
    #[default]
    Skip,
    /// Fail the whole merge.
    Abort,
}

/// Combines the three-hourly and hourly time series into one list of points sorted by time.
///
/// The three-hourly records are converted first, in source order. Each hourly record is
/// then merged into the point with the same timestamp, if there is one, or appended.
/// Hourly data is loaded second so it overwrites three-hourly fields with the same
/// meaning, but it never blanks a field it does not mention.
///
/// Either input may be empty; both empty gives an empty forecast.
///
/// # Errors
///
/// With [`MissingTimePolicy::Abort`], returns the [`IngestionError`] of the first record
/// without a usable timestamp.
pub fn build_forecast(
    hourly: &[RawRecord],
    three_hourly: &[RawRecord],
    policy: MissingTimePolicy,
) -> Result<Vec<ForecastPoint>, IngestionError> {
    let mut forecast: Vec<ForecastPoint> = Vec::with_capacity(hourly.len() + three_hourly.len());
    let mut index_by_time = BTreeMap::new();

    for record in three_hourly {
        let point = match ForecastPoint::from_record(record, Granularity::ThreeHourly) {
            Ok(point) => point,
            Err(e) => {
                handle_bad_record(e, policy)?;
                continue;
            }
        };
        index_by_time.entry(point.time).or_insert(forecast.len());
        forecast.push(point);
    }

    for record in hourly {
        let time = match record_time(record, Granularity::Hourly) {
            Ok(time) => time,
            Err(e) => {
                handle_bad_record(e, policy)?;
                continue;
            }
        };
        match index_by_time.get(&time) {
            Some(&index) => forecast[index].merge_record(record, Granularity::Hourly),
            None => {
                let point = ForecastPoint::from_record(record, Granularity::Hourly)?;
                index_by_time.insert(time, forecast.len());
                forecast.push(point);
            }
        }
    }

    // Stable, so a duplicated timestamp keeps first-seen order.
    forecast.sort_by_key(|point| point.time);

    if let (Some(first), Some(last)) = (forecast.first(), forecast.last()) {
        info!(
            "Forecast contains {} data points between {} and {}",
            forecast.len(),
            first.time,
            last.time
        );
    } else {
        warn!("Forecast contains no data points");
    }
    Ok(forecast)
}

fn handle_bad_record(error: IngestionError, policy: MissingTimePolicy) -> Result<(), IngestionError> {
    match policy {
        MissingTimePolicy::Skip => {
            warn!("Skipping forecast record: {}", error);
            Ok(())
        }
        MissingTimePolicy::Abort => Err(error),
    }
}
