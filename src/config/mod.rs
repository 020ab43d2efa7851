//! Configuration for a meteogram run, loaded from a TOML file.
//!
//! Thresholds are required: a config without the `frost_storm_warning` or `laundry_day`
//! tables fails to load. Styling, feature flags and file locations fall back to defaults.

pub mod error;

use crate::conditions::laundry::{DryingWindowEnd, WindowMembership};
use crate::config::error::ConfigError;
use crate::forecast::merge::MissingTimePolicy;
use crate::rows::RowPolicy;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One week.
const MAX_CACHE_TTL_MINUTES: i64 = 7 * 24 * 60;
const DEFAULT_HOURLY_URL: &str =
    "https://api-metoffice.apiconnect.ibmcloud.com/v0/forecasts/point/hourly";
const DEFAULT_THREE_HOURLY_URL: &str =
    "https://api-metoffice.apiconnect.ibmcloud.com/v0/forecasts/point/three-hourly";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub location: Location,
    pub api: ApiConfig,
    #[serde(default)]
    pub files: Files,
    /// Number of days after the first forecast sample to keep.
    #[serde(default = "default_forecast_days")]
    pub show_forecast_days: u32,
    /// Plot the "feels like" temperature instead of the air temperature.
    #[serde(default)]
    pub use_feels_like_temp: bool,
    #[serde(default)]
    pub missing_time_policy: MissingTimePolicy,
    pub frost_storm_warning: FrostStormWarning,
    pub laundry_day: LaundryDay,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub enable_features: EnableFeatures,
    #[serde(default)]
    pub enable_plots: EnablePlots,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ApiConfig {
    pub client_key: String,
    pub client_secret: String,
    #[serde(default = "default_hourly_url")]
    pub hourly_url: String,
    #[serde(default = "default_three_hourly_url")]
    pub three_hourly_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Files {
    /// Cache for the hourly response. Defaults to the user cache directory.
    pub cache_file_hourly: Option<PathBuf>,
    /// Cache for the three-hourly response. Defaults to the user cache directory.
    pub cache_file_three_hourly: Option<PathBuf>,
    /// Age below which a cached response is reused instead of querying the API.
    pub cache_ttl_minutes: i64,
    pub output_file_name: PathBuf,
    /// JSON list of already-expanded calendar events.
    pub calendar_events_file: Option<PathBuf>,
}

impl Default for Files {
    fn default() -> Self {
        Self {
            cache_file_hourly: None,
            cache_file_three_hourly: None,
            cache_ttl_minutes: 10,
            output_file_name: PathBuf::from("meteogram.json"),
            calendar_events_file: None,
        }
    }
}

/// Thresholds for the frost and storm condition bars.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FrostStormWarning {
    /// Air temperature (Celsius) at or below which a sample is frosty.
    pub frost_temp: f64,
    /// Precipitation probability (percent) at or above which a sample may be stormy.
    pub storm_precip_prob: f64,
    /// Gust speed (knots) at or above which a sample may be stormy.
    pub storm_gust_speed: f64,
}

/// Thresholds for the good-laundry-day condition bar.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LaundryDay {
    /// Hours after midnight (UTC) before which washing is not hung out.
    pub hang_out_time: f64,
    /// Minimum length of the drying window, in hours.
    pub min_hours_daylight: f64,
    pub min_average_temp: f64,
    pub max_average_humidity: f64,
    pub max_precip_prob: f64,
    #[serde(default)]
    pub window_end: DryingWindowEnd,
    #[serde(default)]
    pub membership: WindowMembership,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Style {
    pub temp_color: String,
    pub precip_color: String,
    pub wind_color: String,
    pub gust_color: String,
    pub humidity_color: String,
    pub frost_color: String,
    pub storm_color: String,
    pub laundry_day_color: String,
    pub max_calendar_event_bar_rows: usize,
    pub row_policy: RowPolicy,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            temp_color: "#d62728".to_string(),
            precip_color: "#1f77b4".to_string(),
            wind_color: "#2ca02c".to_string(),
            gust_color: "#98df8a".to_string(),
            humidity_color: "#9467bd".to_string(),
            frost_color: "#8fd3fe".to_string(),
            storm_color: "#7f7f7f".to_string(),
            laundry_day_color: "#ffbb78".to_string(),
            max_calendar_event_bar_rows: 3,
            row_policy: RowPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnableFeatures {
    pub weather_icons: bool,
    pub condition_bars: bool,
    pub calendar_events: bool,
    pub frost: bool,
    pub storm: bool,
    pub laundry_day: bool,
}

impl Default for EnableFeatures {
    fn default() -> Self {
        Self {
            weather_icons: true,
            condition_bars: true,
            calendar_events: true,
            frost: true,
            storm: true,
            laundry_day: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnablePlots {
    pub temp: bool,
    pub precip_prob: bool,
    pub wind: bool,
    pub gust: bool,
    pub humidity: bool,
}

impl Default for EnablePlots {
    fn default() -> Self {
        Self {
            temp: true,
            precip_prob: true,
            wind: true,
            gust: true,
            humidity: true,
        }
    }
}

fn default_forecast_days() -> u32 {
    4
}

fn default_hourly_url() -> String {
    DEFAULT_HOURLY_URL.to_string()
}

fn default_three_hourly_url() -> String {
    DEFAULT_THREE_HOURLY_URL.to_string()
}

impl Config {
    /// Loads and validates the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist, [`ConfigError::Parse`]
    /// if it is not valid TOML or lacks a required table, and
    /// [`ConfigError::MissingCredentials`] / [`ConfigError::InvalidValue`] if validation fails.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let text =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.client_key.trim().is_empty() || self.api.client_secret.trim().is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        if !(-90.0..=90.0).contains(&self.location.lat) {
            return Err(invalid("location.lat", format!("{} is not a latitude", self.location.lat)));
        }
        if !(-180.0..=180.0).contains(&self.location.lon) {
            return Err(invalid("location.lon", format!("{} is not a longitude", self.location.lon)));
        }
        if self.show_forecast_days == 0 {
            return Err(invalid("show_forecast_days", "must be at least 1".to_string()));
        }
        if !(0..=MAX_CACHE_TTL_MINUTES).contains(&self.files.cache_ttl_minutes) {
            return Err(invalid(
                "files.cache_ttl_minutes",
                format!("must be between 0 and {}", MAX_CACHE_TTL_MINUTES),
            ));
        }
        if !(0.0..24.0).contains(&self.laundry_day.hang_out_time) {
            return Err(invalid(
                "laundry_day.hang_out_time",
                format!("{} is not an hour of the day", self.laundry_day.hang_out_time),
            ));
        }
        if !(0.0..=24.0).contains(&self.laundry_day.min_hours_daylight) {
            return Err(invalid(
                "laundry_day.min_hours_daylight",
                format!("{} is not a number of hours in a day", self.laundry_day.min_hours_daylight),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, message: String) -> ConfigError {
    ConfigError::InvalidValue { field, message }
}
