//! The finished display model handed to a chart renderer.

use crate::config::{Config, EnablePlots, Style};
use crate::forecast::response::ForecastMetadata;
use crate::rows::RowAssignment;
use crate::sun::{Daylight, SunProvider};
use crate::types::forecast_point::{ForecastPoint, Granularity};
use crate::types::interval::TimeInterval;
use crate::types::weather_code::WeatherCode;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Which y-axis a series is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Temperature,
    Probability,
    Speed,
    Humidity,
}

/// One plotted line; `values` lines up with [`DisplayModel::times`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: &'static str,
    pub unit: &'static str,
    pub axis: Axis,
    pub color: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherIcon {
    pub time: DateTime<Utc>,
    pub code: WeatherCode,
    /// `None` for codes drawn as an empty icon.
    pub file: Option<&'static str>,
    pub granularity: Granularity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayModel {
    pub metadata: Option<ForecastMetadata>,
    pub forecast: Vec<ForecastPoint>,
    pub times: Vec<DateTime<Utc>>,
    pub series: Vec<Series>,
    pub icons: Vec<WeatherIcon>,
    pub condition_bars: RowAssignment,
    pub event_bars: RowAssignment,
    /// Calendar rows to reserve: the most simultaneous events, capped at the configured
    /// maximum.
    pub event_lines_required: usize,
    pub show_frost_lines: bool,
    pub daytime_regions: Vec<Daylight>,
    /// First to last forecast time; bars and daytime regions may reach past it.
    pub x_range: Option<TimeInterval>,
    pub now: DateTime<Utc>,
}

/// The enabled plot series, in drawing order.
pub fn series(forecast: &[ForecastPoint], config: &Config) -> Vec<Series> {
    let EnablePlots {
        temp,
        precip_prob,
        wind,
        gust,
        humidity,
    } = config.enable_plots;
    let Style {
        temp_color,
        precip_color,
        wind_color,
        gust_color,
        humidity_color,
        ..
    } = &config.style;
    let column = |field: fn(&ForecastPoint) -> Option<f64>| -> Vec<Option<f64>> {
        forecast.iter().map(field).collect()
    };

    let mut series = Vec::new();
    if temp {
        series.push(Series {
            name: "Temperature",
            unit: "°C",
            axis: Axis::Temperature,
            color: temp_color.clone(),
            values: if config.use_feels_like_temp {
                column(|p| p.feels_like_temperature)
            } else {
                column(|p| p.air_temperature)
            },
        });
    }
    if precip_prob {
        series.push(Series {
            name: "Precipitation Probability",
            unit: "%",
            axis: Axis::Probability,
            color: precip_color.clone(),
            values: column(|p| p.precipitation_probability),
        });
    }
    if wind {
        series.push(Series {
            name: "Wind Speed",
            unit: "kn",
            axis: Axis::Speed,
            color: wind_color.clone(),
            values: column(|p| p.wind_speed),
        });
    }
    if gust {
        series.push(Series {
            name: "Gust Speed",
            unit: "kn",
            axis: Axis::Speed,
            color: gust_color.clone(),
            values: column(|p| p.wind_gust_speed),
        });
    }
    if humidity {
        series.push(Series {
            name: "Humidity",
            unit: "%",
            axis: Axis::Humidity,
            color: humidity_color.clone(),
            values: column(|p| p.humidity),
        });
    }
    series
}

pub fn weather_icons(forecast: &[ForecastPoint]) -> Vec<WeatherIcon> {
    forecast
        .iter()
        .filter_map(|point| {
            let code = point.weather_code?;
            Some(WeatherIcon {
                time: point.time,
                code,
                file: code.icon_file(),
                granularity: point.granularity,
            })
        })
        .collect()
}

/// Whether the lowest known air temperature reaches the frost threshold.
pub fn show_frost_lines(forecast: &[ForecastPoint], frost_temp: f64) -> bool {
    forecast
        .iter()
        .filter_map(|p| p.air_temperature)
        .any(|temp| temp <= frost_temp)
}

pub fn daytime_regions(dates: &[NaiveDate], sun: &dyn SunProvider) -> Vec<Daylight> {
    dates.iter().filter_map(|&date| sun.daylight(date)).collect()
}
