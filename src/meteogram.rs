//! The main entry point: fetches the two Met Office feeds and turns them into a
//! [`DisplayModel`].

use crate::calendar::events::{event_bars, load_events, CalendarEvent};
use crate::conditions::condition_bars;
use crate::config::Config;
use crate::display::{daytime_regions, series, show_frost_lines, weather_icons, DisplayModel};
use crate::error::MeteogramError;
use crate::fetch::cache::CachedFetcher;
use crate::forecast::merge::build_forecast;
use crate::forecast::response::SiteForecastResponse;
use crate::forecast::window::{dates_spanned, limit_to_days, time_span};
use crate::rows::{assign_rows, count_max_bars_at_time};
use crate::sun::{SolarCalculator, SunProvider};
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use bon::bon;
use chrono::{DateTime, Utc};
use log::info;
use std::path::PathBuf;
use std::time::Duration;

const HOURLY_CACHE_FILE_NAME: &str = "hourly.json";
const THREE_HOURLY_CACHE_FILE_NAME: &str = "three_hourly.json";

/// The raw responses of both forecast feeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastResponses {
    pub hourly: SiteForecastResponse,
    pub three_hourly: SiteForecastResponse,
}

/// Builds meteograms for the configured location.
///
/// Create one with [`Meteogram::new`] to cache API responses in the user cache directory,
/// or with [`Meteogram::with_cache_folder`] to choose the directory. Explicit cache file
/// paths in the config take precedence over either.
///
/// # Examples
///
/// ```no_run
/// # use meteogram::{Config, Meteogram, MeteogramError};
/// # use std::path::Path;
/// # fn run() -> Result<(), MeteogramError> {
/// let config = Config::load(Path::new("config.toml"))?;
/// let meteogram = Meteogram::new(config)?;
///
/// let responses = meteogram.fetch().call()?;
/// let sun = meteogram.sun()?;
/// let events = meteogram.calendar_events()?;
/// let model = meteogram
///     .display_model()
///     .hourly(&responses.hourly)
///     .three_hourly(&responses.three_hourly)
///     .sun(&sun)
///     .events(&events)
///     .call()?;
/// println!("{} points, {} condition bars", model.forecast.len(), model.condition_bars.bars.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Meteogram {
    config: Config,
    cache_dir: PathBuf,
}

#[bon]
impl Meteogram {
    /// Creates a `Meteogram` caching responses in `cache_folder`, which is created if it
    /// does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::CacheDirCreation`] if the directory cannot be created, or
    /// [`MeteogramError::CacheDirNotADirectory`] if a file is in the way.
    pub fn with_cache_folder(config: Config, cache_folder: PathBuf) -> Result<Self, MeteogramError> {
        ensure_cache_dir_exists(&cache_folder)?;
        Ok(Self {
            config,
            cache_dir: cache_folder,
        })
    }

    /// Creates a `Meteogram` caching responses in the user cache directory
    /// (e.g. `~/.cache/meteogram` on Linux).
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::CacheDirResolution`] if there is no user cache directory,
    /// and the errors of [`Meteogram::with_cache_folder`].
    pub fn new(config: Config) -> Result<Self, MeteogramError> {
        let cache_folder = get_cache_dir()?;
        Self::with_cache_folder(config, cache_folder)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sunrise and sunset at the configured location.
    pub fn sun(&self) -> Result<SolarCalculator, MeteogramError> {
        let location = self.config.location;
        SolarCalculator::new(location.lat, location.lon).ok_or(MeteogramError::InvalidLocation {
            lat: location.lat,
            lon: location.lon,
        })
    }

    /// Fetches the hourly and three-hourly forecasts, each from its cache file while that
    /// is younger than the configured TTL.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.ignore_cache(bool)`: Optional. Always query the API. Defaults to `false`.
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::Fetch`] if a request fails or a cache file cannot be read
    /// or written.
    #[builder]
    pub fn fetch(&self, #[builder(default)] ignore_cache: bool) -> Result<ForecastResponses, MeteogramError> {
        let api = &self.config.api;
        let files = &self.config.files;
        let ttl = Duration::from_secs((files.cache_ttl_minutes.max(0) as u64).saturating_mul(60));
        let fetcher = CachedFetcher::new(
            &api.client_key,
            &api.client_secret,
            self.config.location.lat,
            self.config.location.lon,
            ttl,
        )?;

        let hourly_cache = files
            .cache_file_hourly
            .clone()
            .unwrap_or_else(|| self.cache_dir.join(HOURLY_CACHE_FILE_NAME));
        let three_hourly_cache = files
            .cache_file_three_hourly
            .clone()
            .unwrap_or_else(|| self.cache_dir.join(THREE_HOURLY_CACHE_FILE_NAME));

        Ok(ForecastResponses {
            hourly: fetcher.get(&api.hourly_url, &hourly_cache, ignore_cache)?,
            three_hourly: fetcher.get(&api.three_hourly_url, &three_hourly_cache, ignore_cache)?,
        })
    }

    /// Reads the configured calendar events file. Without one, or with calendar events
    /// disabled, there are no events.
    pub fn calendar_events(&self) -> Result<Vec<CalendarEvent>, MeteogramError> {
        match &self.config.files.calendar_events_file {
            Some(path) if self.config.enable_features.calendar_events => Ok(load_events(path)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Runs the whole pipeline over two forecast responses.
    ///
    /// The feeds are merged into one forecast, cut to `show_forecast_days`, and annotated
    /// with condition bars and calendar event bars placed on rows. The result depends only
    /// on the arguments and the config.
    ///
    /// This method uses a builder pattern.
    ///
    /// # Arguments
    ///
    /// * `.hourly(&SiteForecastResponse)`: **Required.** The hourly feed.
    /// * `.three_hourly(&SiteForecastResponse)`: **Required.** The three-hourly feed.
    /// * `.sun(&dyn SunProvider)`: **Required.** Sunrise and sunset times.
    /// * `.events(&[CalendarEvent])`: Optional. Calendar events to overlay.
    /// * `.now(DateTime<Utc>)`: Optional. Time of the "now" marker. Defaults to the clock.
    ///
    /// # Errors
    ///
    /// Returns [`MeteogramError::Ingestion`] if a record has no usable time and the config
    /// asks to abort on such records.
    #[builder]
    pub fn display_model(
        &self,
        hourly: &SiteForecastResponse,
        three_hourly: &SiteForecastResponse,
        sun: &dyn SunProvider,
        events: Option<&[CalendarEvent]>,
        now: Option<DateTime<Utc>>,
    ) -> Result<DisplayModel, MeteogramError> {
        let config = &self.config;
        let features = &config.enable_features;
        let metadata = hourly.metadata().or_else(|| three_hourly.metadata());
        if let Some(metadata) = &metadata {
            info!(
                "Forecast for {} (model run {:?}, {:?} m from requested point)",
                metadata.location_name.as_deref().unwrap_or("unnamed location"),
                metadata.model_run,
                metadata.distance_from_requested_point
            );
        }

        let forecast = build_forecast(
            hourly.time_series(),
            three_hourly.time_series(),
            config.missing_time_policy,
        )?;
        let forecast = limit_to_days(forecast, config.show_forecast_days);
        let dates = dates_spanned(&forecast);
        let span = time_span(&forecast);

        let conditions = condition_bars(&forecast, config, &dates, sun)?;

        let max_rows = config.style.max_calendar_event_bar_rows;
        let events = match (events, span) {
            (Some(events), Some(span)) if features.calendar_events => {
                info!("Placing {} calendar events", events.len());
                event_bars(events, sun, span)
            }
            _ => Vec::new(),
        };
        let max_simultaneous = count_max_bars_at_time(&events);
        let placed_events = assign_rows(events, Some(max_rows), config.style.row_policy);
        // Every placed bar needs its row, even one the hourly scan misses.
        let event_lines_required = max_simultaneous
            .max(placed_events.rows_required)
            .min(max_rows);

        Ok(DisplayModel {
            metadata,
            times: forecast.iter().map(|p| p.time).collect(),
            series: series(&forecast, config),
            icons: if features.weather_icons {
                weather_icons(&forecast)
            } else {
                Vec::new()
            },
            condition_bars: assign_rows(conditions, None, config.style.row_policy),
            event_bars: placed_events,
            event_lines_required,
            show_frost_lines: show_frost_lines(&forecast, config.frost_storm_warning.frost_temp),
            daytime_regions: daytime_regions(&dates, sun),
            x_range: span,
            now: now.unwrap_or_else(Utc::now),
            forecast,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use crate::sun::Daylight;
    use crate::types::forecast_point::Granularity;
    use chrono::{NaiveDate, TimeDelta, TimeZone};
    use serde_json::{json, Value};

    fn sun(d: NaiveDate) -> Option<Daylight> {
        Some(Daylight {
            sunrise: d.and_hms_opt(6, 0, 0)?.and_utc(),
            sunset: d.and_hms_opt(20, 0, 0)?.and_utc(),
        })
    }

    fn response(time_series: Vec<Value>) -> SiteForecastResponse {
        serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": {"type": "Point", "coordinates": [-1.3, 50.7, 12.0]},
                "properties": {
                    "location": {"name": "Newport"},
                    "requestPointDistance": 120.5,
                    "modelRunDate": "2023-01-09T21:00Z",
                    "timeSeries": time_series
                }
            }]
        }))
        .unwrap()
    }

    /// A frosty night then a storm; hourly to 05:00, three-hourly on to the next day.
    fn responses() -> (SiteForecastResponse, SiteForecastResponse) {
        let hourly = (0..6)
            .map(|h| {
                json!({
                    "time": format!("2023-01-10T{:02}:00Z", h),
                    "screenTemperature": -2.0 + h as f64 * 0.25,
                    "feelsLikeTemperature": -5.0,
                    "windSpeed10m": 2.0,
                    "windGustSpeed10m": 4.0,
                    "screenRelativeHumidity": 90.0,
                    "probOfPrecipitation": 5,
                    "significantWeatherCode": 0
                })
            })
            .collect();
        let three_hourly = (0..10)
            .map(|i| {
                let stormy = (4..6).contains(&i);
                json!({
                    "time": format!("2023-01-{:02}T{:02}:00Z", 10 + i / 8, (i % 8) * 3),
                    "maxScreenAirTemp": 6.0,
                    "minScreenAirTemp": 2.0,
                    "feelsLikeTemp": 1.0,
                    "windSpeed10m": 8.0,
                    "windGustSpeed10m": if stormy { 20.0 } else { 6.0 },
                    "screenRelativeHumidity": 85.0,
                    "probOfPrecipitation": if stormy { 95 } else { 30 },
                    "probOfSnow": 2,
                    "significantWeatherCode": if stormy { 30 } else { 7 }
                })
            })
            .collect();
        (response(hourly), response(three_hourly))
    }

    fn meteogram() -> Meteogram {
        let dir = std::env::temp_dir().join("meteogram-tests");
        Meteogram::with_cache_folder(test_config(), dir).unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn builds_a_full_display_model() {
        let (hourly, three_hourly) = responses();
        let events = vec![
            CalendarEvent {
                start: at(10, 8),
                end: at(10, 11),
                all_day: false,
                title: "Dentist".to_string(),
                color: "red".to_string(),
            },
            CalendarEvent {
                start: at(10, 9) + TimeDelta::minutes(30),
                end: at(10, 12),
                all_day: false,
                title: "Call".to_string(),
                color: "blue".to_string(),
            },
        ];
        let model = meteogram()
            .display_model()
            .hourly(&hourly)
            .three_hourly(&three_hourly)
            .sun(&sun)
            .events(&events)
            .now(at(10, 2))
            .call()
            .unwrap();

        // Hourly 00-05 plus three-hourly 06:00 through 03:00 next day; 00:00 and 03:00 merge.
        assert_eq!(model.forecast.len(), 6 + 8);
        assert!(model.times.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(model.forecast[3].granularity, Granularity::Both);
        // The merged 03:00 point keeps the three-hourly snow probability.
        assert_eq!(model.forecast[3].snow_probability, Some(2.0));
        assert_eq!(model.forecast[3].air_temperature, Some(-1.25));

        let labels: Vec<_> = model
            .condition_bars
            .bars
            .iter()
            .map(|p| (p.bar.text.as_str(), p.bar.interval.start, p.bar.interval.end, p.row))
            .collect();
        assert_eq!(
            labels,
            vec![
                ("Frost", at(10, 0), at(10, 5) + TimeDelta::minutes(30), 0),
                ("Storm", at(10, 10) + TimeDelta::minutes(30), at(10, 16) + TimeDelta::minutes(30), 0),
            ]
        );

        assert_eq!(model.event_bars.bars.len(), 2);
        assert_eq!(model.event_bars.rows_required, 2);
        assert_eq!(model.event_lines_required, 2);
        assert!(model.show_frost_lines);
        assert_eq!(model.daytime_regions.len(), 2);
        assert_eq!(model.x_range.unwrap().start, at(10, 0));
        assert_eq!(model.x_range.unwrap().end, at(11, 3));
        assert_eq!(model.metadata.unwrap().location_name.as_deref(), Some("Newport"));
        assert_eq!(model.icons.len(), model.forecast.len());
        assert_eq!(model.series.len(), 5);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let (hourly, three_hourly) = responses();
        let meteogram = meteogram();
        let build = || {
            meteogram
                .display_model()
                .hourly(&hourly)
                .three_hourly(&three_hourly)
                .sun(&sun)
                .now(at(10, 2))
                .call()
                .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn empty_feeds_give_an_empty_model() {
        let empty = SiteForecastResponse::default();
        let model = meteogram()
            .display_model()
            .hourly(&empty)
            .three_hourly(&empty)
            .sun(&sun)
            .now(at(10, 2))
            .call()
            .unwrap();
        assert!(model.forecast.is_empty());
        assert!(model.condition_bars.bars.is_empty());
        assert_eq!(model.event_lines_required, 0);
        assert_eq!(model.x_range, None);
        assert_eq!(model.metadata, None);
    }

    #[test]
    fn event_rows_respect_the_cap() {
        let (hourly, three_hourly) = responses();
        let mut config = test_config();
        config.style.max_calendar_event_bar_rows = 1;
        let meteogram = Meteogram::with_cache_folder(config, std::env::temp_dir().join("meteogram-tests")).unwrap();
        let events: Vec<_> = (0..3)
            .map(|i| CalendarEvent {
                start: at(10, 8),
                end: at(10, 12),
                all_day: false,
                title: format!("Event {}", i),
                color: "green".to_string(),
            })
            .collect();
        let model = meteogram
            .display_model()
            .hourly(&hourly)
            .three_hourly(&three_hourly)
            .sun(&sun)
            .events(&events)
            .now(at(10, 2))
            .call()
            .unwrap();
        assert_eq!(model.event_bars.bars.len(), 1);
        assert_eq!(model.event_lines_required, 1);
    }

    #[test]
    fn a_single_whole_hour_event_gets_a_line() {
        let (hourly, three_hourly) = responses();
        let events = vec![CalendarEvent {
            start: at(10, 3),
            end: at(10, 4),
            all_day: false,
            title: "Alarm".to_string(),
            color: "red".to_string(),
        }];
        let model = meteogram()
            .display_model()
            .hourly(&hourly)
            .three_hourly(&three_hourly)
            .sun(&sun)
            .events(&events)
            .now(at(10, 2))
            .call()
            .unwrap();
        assert_eq!(model.event_bars.bars.len(), 1);
        assert_eq!(model.event_bars.rows_required, 1);
        assert_eq!(model.event_lines_required, 1);
    }

    #[test]
    fn short_event_between_samples_still_gets_a_line() {
        let (hourly, three_hourly) = responses();
        let events = vec![CalendarEvent {
            start: at(10, 3),
            end: at(10, 3) + TimeDelta::minutes(20),
            all_day: false,
            title: "Standup".to_string(),
            color: "red".to_string(),
        }];
        let model = meteogram()
            .display_model()
            .hourly(&hourly)
            .three_hourly(&three_hourly)
            .sun(&sun)
            .events(&events)
            .now(at(10, 2))
            .call()
            .unwrap();
        assert_eq!(model.event_lines_required, 1);
    }

    #[test]
    fn calendar_events_need_a_file() {
        assert!(meteogram().calendar_events().unwrap().is_empty());
    }
}
