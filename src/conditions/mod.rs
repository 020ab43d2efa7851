//! Qualitative conditions (frost, storm, good laundry day) derived from the forecast.

pub mod bars;
pub mod cluster;
pub mod error;
pub mod laundry;

use crate::conditions::error::ClusterError;
use crate::config::Config;
use crate::sun::SunProvider;
use crate::types::forecast_point::ForecastPoint;
use crate::types::interval::LabeledBar;
use chrono::NaiveDate;
use log::info;

/// Every enabled condition bar, frost first, then storm, then laundry days.
pub fn condition_bars(
    forecast: &[ForecastPoint],
    config: &Config,
    dates: &[NaiveDate],
    sun: &dyn SunProvider,
) -> Result<Vec<LabeledBar>, ClusterError> {
    let features = &config.enable_features;
    let style = &config.style;
    let mut bars = Vec::new();
    if !features.condition_bars {
        return Ok(bars);
    }

    if features.frost {
        info!("Finding frosts");
        bars.extend(bars::frost_bars(forecast, &config.frost_storm_warning, &style.frost_color)?);
    }
    if features.storm {
        info!("Finding storms");
        bars.extend(bars::storm_bars(forecast, &config.frost_storm_warning, &style.storm_color)?);
    }
    if features.laundry_day {
        info!("Finding good laundry days");
        bars.extend(laundry::laundry_day_bars(
            forecast,
            &config.laundry_day,
            &style.laundry_day_color,
            dates,
            sun,
        ));
    }
    Ok(bars)
}
