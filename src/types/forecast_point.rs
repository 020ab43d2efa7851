//! The canonical per-timestamp forecast record and the ingestion of raw API records into it.

use crate::config::FrostStormWarning;
use crate::forecast::error::IngestionError;
use crate::types::weather_code::WeatherCode;
use chrono::{DateTime, NaiveDateTime, Utc};
use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// One entry of a `timeSeries` array as returned by the API: a loosely typed mapping
/// whose keys differ between the hourly and three-hourly feeds.
pub type RawRecord = Map<String, Value>;

/// Date/time format used by the Met Office DataHub API, e.g. `2023-04-12T15:00Z`.
pub const MET_OFFICE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%MZ";

const MPS_TO_KNOTS: f64 = 1.944;
const METRES_PER_MILE: f64 = 1609.0;
const PASCALS_PER_MILLIBAR: f64 = 100.0;

/// Which feed(s) populated a [`ForecastPoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Populated from the fine-grained (hourly) feed only.
    Hourly,
    /// Populated from the coarse-grained (three-hourly) feed only.
    ThreeHourly,
    /// Populated from both feeds after a merge.
    Both,
}

impl Granularity {
    /// Combines the granularity a point already has with the granularity of a newly
    /// loaded record.
    pub fn absorb(self, other: Granularity) -> Granularity {
        if self == other {
            self
        } else {
            Granularity::Both
        }
    }

    pub fn has_hourly_data(self) -> bool {
        matches!(self, Granularity::Hourly | Granularity::Both)
    }

    pub fn has_three_hourly_data(self) -> bool {
        matches!(self, Granularity::ThreeHourly | Granularity::Both)
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Hourly => write!(f, "hourly"),
            Granularity::ThreeHourly => write!(f, "three-hourly"),
            Granularity::Both => write!(f, "merged"),
        }
    }
}

/// A single forecast sample after normalization.
///
/// Every measurement is optional; `None` means "unknown", never zero. Units are the
/// display units: Celsius, knots, miles, millibar, percent and millimetres.
#[derive(Debug, PartialEq, Clone, Serialize)]
pub struct ForecastPoint {
    pub time: DateTime<Utc>,
    pub air_temperature: Option<f64>,
    pub feels_like_temperature: Option<f64>,
    pub dew_point: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub wind_gust_speed: Option<f64>,
    pub wind_max_gust_speed: Option<f64>,
    pub weather_code: Option<WeatherCode>,
    pub visibility: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub uv_index: Option<i64>,
    pub precipitation_probability: Option<f64>,
    pub snow_probability: Option<f64>,
    pub heavy_snow_probability: Option<f64>,
    pub rain_probability: Option<f64>,
    pub heavy_rain_probability: Option<f64>,
    pub hail_probability: Option<f64>,
    pub thunder_probability: Option<f64>,
    pub precipitation_rate: Option<f64>,
    pub total_precipitation_amount: Option<f64>,
    pub total_snow_amount: Option<f64>,
    pub granularity: Granularity,
}

impl ForecastPoint {
    /// Creates a point with every measurement unknown.
    pub fn new(time: DateTime<Utc>, granularity: Granularity) -> Self {
        Self {
            time,
            air_temperature: None,
            feels_like_temperature: None,
            dew_point: None,
            wind_speed: None,
            wind_direction: None,
            wind_gust_speed: None,
            wind_max_gust_speed: None,
            weather_code: None,
            visibility: None,
            humidity: None,
            pressure: None,
            uv_index: None,
            precipitation_probability: None,
            snow_probability: None,
            heavy_snow_probability: None,
            rain_probability: None,
            heavy_rain_probability: None,
            hail_probability: None,
            thunder_probability: None,
            precipitation_rate: None,
            total_precipitation_amount: None,
            total_snow_amount: None,
            granularity,
        }
    }

    /// Builds a point from one raw record of the given feed.
    ///
    /// # Errors
    ///
    /// Returns an [`IngestionError`] if the record has no usable `time` field.
    pub fn from_record(record: &RawRecord, granularity: Granularity) -> Result<Self, IngestionError> {
        let time = record_time(record, granularity)?;
        let mut point = ForecastPoint::new(time, granularity);
        point.load_fields(record);
        Ok(point)
    }

    /// Loads a record on top of this point. Fields the record mentions overwrite the
    /// current values; fields it does not mention are left untouched.
    pub fn merge_record(&mut self, record: &RawRecord, granularity: Granularity) {
        self.granularity = self.granularity.absorb(granularity);
        self.load_fields(record);
    }

    fn load_fields(&mut self, record: &RawRecord) {
        // The instantaneous reading wins over a mean of the daily extremes.
        if let Some(temp) = number(record, "screenTemperature") {
            self.air_temperature = Some(temp);
        } else if let (Some(min), Some(max)) = (
            number(record, "minScreenAirTemp"),
            number(record, "maxScreenAirTemp"),
        ) {
            self.air_temperature = Some((max + min) / 2.0);
        }
        overwrite(&mut self.feels_like_temperature, number(record, "feelsLikeTemp"));
        overwrite(&mut self.feels_like_temperature, number(record, "feelsLikeTemperature"));
        overwrite(&mut self.dew_point, number(record, "screenDewPointTemperature"));
        overwrite(
            &mut self.wind_speed,
            number(record, "windSpeed10m").map(|v| v * MPS_TO_KNOTS),
        );
        overwrite(&mut self.wind_direction, number(record, "windDirectionFrom10m"));
        overwrite(
            &mut self.wind_gust_speed,
            number(record, "windGustSpeed10m").map(|v| v * MPS_TO_KNOTS),
        );
        overwrite(
            &mut self.wind_max_gust_speed,
            number(record, "max10mWindGust").map(|v| v * MPS_TO_KNOTS),
        );
        if let Some(code) = integer(record, "significantWeatherCode") {
            match WeatherCode::from_i64(code) {
                Some(weather_code) => self.weather_code = Some(weather_code),
                None => debug!("Ignoring unknown weather code {} at {}", code, self.time),
            }
        }
        overwrite(
            &mut self.visibility,
            number(record, "visibility").map(|v| v / METRES_PER_MILE),
        );
        overwrite(&mut self.humidity, number(record, "screenRelativeHumidity"));
        overwrite(
            &mut self.pressure,
            number(record, "mslp").map(|v| v / PASCALS_PER_MILLIBAR),
        );
        overwrite(&mut self.uv_index, integer(record, "uvIndex"));
        overwrite(&mut self.precipitation_rate, number(record, "precipitationRate"));
        overwrite(&mut self.total_precipitation_amount, number(record, "totalPrecipAmount"));
        overwrite(&mut self.total_snow_amount, number(record, "totalSnowAmount"));
        overwrite(&mut self.precipitation_probability, number(record, "probOfPrecipitation"));
        overwrite(&mut self.snow_probability, number(record, "probOfSnow"));
        overwrite(&mut self.heavy_snow_probability, number(record, "probOfHeavySnow"));
        overwrite(&mut self.rain_probability, number(record, "probOfRain"));
        overwrite(&mut self.heavy_rain_probability, number(record, "probOfHeavyRain"));
        overwrite(&mut self.hail_probability, number(record, "probOfHail"));
        overwrite(&mut self.thunder_probability, number(record, "probOfSferics"));
    }

    /// Whether this point is stormy: both precipitation probability and gust speed are
    /// known and at or above their thresholds.
    pub fn is_stormy(&self, warning: &FrostStormWarning) -> bool {
        match (self.precipitation_probability, self.wind_gust_speed) {
            (Some(precip_prob), Some(gust)) => {
                precip_prob >= warning.storm_precip_prob && gust >= warning.storm_gust_speed
            }
            _ => false,
        }
    }

    /// Whether this point is frosty. Storms take precedence, so a stormy point is never
    /// frosty.
    pub fn is_frosty(&self, warning: &FrostStormWarning) -> bool {
        if self.is_stormy(warning) {
            return false;
        }
        self.air_temperature
            .is_some_and(|temp| temp <= warning.frost_temp)
    }
}

/// Extracts and parses the `time` key of a raw record.
///
/// Accepts the API's own `%Y-%m-%dT%H:%MZ` format and falls back to RFC 3339.
pub fn record_time(
    record: &RawRecord,
    granularity: Granularity,
) -> Result<DateTime<Utc>, IngestionError> {
    let value = record
        .get("time")
        .ok_or(IngestionError::MissingTime { granularity })?;
    let text = value
        .as_str()
        .ok_or(IngestionError::TimeNotAString { granularity })?;
    parse_time(text)
}

fn parse_time(text: &str) -> Result<DateTime<Utc>, IngestionError> {
    NaiveDateTime::parse_from_str(text, MET_OFFICE_TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|e| {
            DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| e)
        })
        .map_err(|source| IngestionError::InvalidTime {
            value: text.to_string(),
            source,
        })
}

fn number(record: &RawRecord, key: &str) -> Option<f64> {
    record.get(key).and_then(Value::as_f64)
}

fn integer(record: &RawRecord, key: &str) -> Option<i64> {
    record
        .get(key)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f.round() as i64)))
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}
