mod calendar;
mod conditions;
mod config;
mod display;
mod error;
mod fetch;
mod forecast;
mod meteogram;
mod rows;
mod sun;
mod types;
mod utils;

pub use error::MeteogramError;
pub use meteogram::*;

pub use calendar::error::CalendarError;
pub use calendar::events::{event_bars, load_events, CalendarEvent};

pub use conditions::bars::{frost_bars, storm_bars, FROST_LABEL, STORM_LABEL};
pub use conditions::cluster::{cluster, cluster_and_get_start_end_times};
pub use conditions::condition_bars;
pub use conditions::error::ClusterError;
pub use conditions::laundry::{laundry_day_bars, DryingWindowEnd, WindowMembership, LAUNDRY_DAY_LABEL};

pub use config::error::ConfigError;
pub use config::{
    ApiConfig, Config, EnableFeatures, EnablePlots, Files, FrostStormWarning, LaundryDay, Location,
    Style,
};

pub use display::*;

pub use fetch::cache::{is_fresh, CachedFetcher};
pub use fetch::error::FetchError;

pub use forecast::error::IngestionError;
pub use forecast::merge::{build_forecast, MissingTimePolicy};
pub use forecast::response::*;
pub use forecast::window::{dates_spanned, limit_to_days, time_span};

pub use rows::*;
pub use sun::{Daylight, SolarCalculator, SunProvider};

pub use types::forecast_point::{ForecastPoint, Granularity, RawRecord};
pub use types::interval::{BarKind, LabeledBar, TimeInterval};
pub use types::weather_code::WeatherCode;
