use crate::conditions::cluster::cluster_and_get_start_end_times;
use crate::conditions::error::ClusterError;
use crate::config::FrostStormWarning;
use crate::types::forecast_point::ForecastPoint;
use crate::types::interval::{BarKind, LabeledBar};
use chrono::{DateTime, Utc};

pub const FROST_LABEL: &str = "Frost";
pub const STORM_LABEL: &str = "Storm";

/// Condition bars covering every frosty stretch of the forecast.
pub fn frost_bars(
    forecast: &[ForecastPoint],
    warning: &FrostStormWarning,
    color: &str,
) -> Result<Vec<LabeledBar>, ClusterError> {
    bars_where(forecast, |point| point.is_frosty(warning), FROST_LABEL, color)
}

/// Condition bars covering every stormy stretch of the forecast.
pub fn storm_bars(
    forecast: &[ForecastPoint],
    warning: &FrostStormWarning,
    color: &str,
) -> Result<Vec<LabeledBar>, ClusterError> {
    bars_where(forecast, |point| point.is_stormy(warning), STORM_LABEL, color)
}

fn bars_where(
    forecast: &[ForecastPoint],
    predicate: impl Fn(&ForecastPoint) -> bool,
    text: &str,
    color: &str,
) -> Result<Vec<LabeledBar>, ClusterError> {
    let times: Vec<DateTime<Utc>> = forecast.iter().map(|point| point.time).collect();
    let indices: Vec<usize> = forecast
        .iter()
        .enumerate()
        .filter(|(_, point)| predicate(point))
        .map(|(i, _)| i)
        .collect();

    Ok(cluster_and_get_start_end_times(&indices, &times)?
        .into_iter()
        .map(|interval| {
            LabeledBar::builder()
                .text(text)
                .color(color)
                .interval(interval)
                .kind(BarKind::Condition)
                .build()
        })
        .collect())
}
