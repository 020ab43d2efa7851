//! Defines the `WeatherCode` enum, mapping the Met Office "significant weather" codes
//! to descriptive variants and to the icon used to draw them.

use serde::Serialize;

/// Represents the significant weather code reported by the Met Office DataHub API.
///
/// The API reports an integer `significantWeatherCode` between 0 and 30 for every
/// sample in both the hourly and the three-hourly time series. Day and night variants
/// of the same condition use different codes.
///
/// Convert an integer code into this enum using [`WeatherCode::from_i64`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCode {
    /// Code 0: Clear night.
    ClearNight = 0,
    /// Code 1: Sunny day.
    SunnyDay = 1,
    /// Code 2: Partly cloudy (night).
    PartlyCloudyNight = 2,
    /// Code 3: Partly cloudy (day).
    PartlyCloudyDay = 3,
    /// Code 4: Reserved by the Met Office, never drawn.
    NotUsed = 4,
    /// Code 5: Mist.
    Mist = 5,
    /// Code 6: Fog.
    Fog = 6,
    /// Code 7: Cloudy.
    Cloudy = 7,
    /// Code 8: Overcast.
    Overcast = 8,
    /// Code 9: Light rain shower (night).
    LightRainShowerNight = 9,
    /// Code 10: Light rain shower (day).
    LightRainShowerDay = 10,
    /// Code 11: Drizzle.
    Drizzle = 11,
    /// Code 12: Light rain.
    LightRain = 12,
    /// Code 13: Heavy rain shower (night).
    HeavyRainShowerNight = 13,
    /// Code 14: Heavy rain shower (day).
    HeavyRainShowerDay = 14,
    /// Code 15: Heavy rain.
    HeavyRain = 15,
    /// Code 16: Sleet shower (night).
    SleetShowerNight = 16,
    /// Code 17: Sleet shower (day).
    SleetShowerDay = 17,
    /// Code 18: Sleet.
    Sleet = 18,
    /// Code 19: Hail shower (night).
    HailShowerNight = 19,
    /// Code 20: Hail shower (day).
    HailShowerDay = 20,
    /// Code 21: Hail.
    Hail = 21,
    /// Code 22: Light snow shower (night).
    LightSnowShowerNight = 22,
    /// Code 23: Light snow shower (day).
    LightSnowShowerDay = 23,
    /// Code 24: Light snow.
    LightSnow = 24,
    /// Code 25: Heavy snow shower (night).
    HeavySnowShowerNight = 25,
    /// Code 26: Heavy snow shower (day).
    HeavySnowShowerDay = 26,
    /// Code 27: Heavy snow.
    HeavySnow = 27,
    /// Code 28: Thunder shower (night).
    ThunderShowerNight = 28,
    /// Code 29: Thunder shower (day).
    ThunderShowerDay = 29,
    /// Code 30: Thunder.
    Thunder = 30,
}

/// Icon file for every code, indexed by the code's integer value.
const WEATHER_ICON_LOOKUP: [&str; 31] = [
    "weather-clear-night.png",
    "weather-clear.png",
    "weather-few-clouds-night.png",
    "weather-few-clouds.png",
    "",
    "weather-fog.png",
    "weather-fog.png",
    "weather-overcast.png",
    "weather-overcast.png",
    "weather-showers-scattered.png",
    "weather-showers-scattered.png",
    "weather-showers-scattered.png",
    "weather-showers-scattered.png",
    "weather-showers.png",
    "weather-showers.png",
    "weather-showers.png",
    "weather-showers-scattered.png",
    "weather-showers-scattered.png",
    "weather-showers.png",
    "weather-storm.png",
    "weather-storm.png",
    "weather-storm.png",
    "weather-snow.png",
    "weather-snow.png",
    "weather-snow.png",
    "weather-snow.png",
    "weather-snow.png",
    "weather-snow.png",
    "weather-storm.png",
    "weather-storm.png",
    "weather-storm.png",
];

impl WeatherCode {
    /// Attempts to convert a Met Office significant weather code into a `WeatherCode` variant.
    ///
    /// # Returns
    ///
    /// * `Some(WeatherCode)` if `value` is a known code (0-30).
    /// * `None` otherwise, e.g. the `-1` "trace rain" code some feeds emit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use meteogram::WeatherCode;
    ///
    /// assert_eq!(WeatherCode::from_i64(15), Some(WeatherCode::HeavyRain));
    /// assert_eq!(WeatherCode::from_i64(31), None);
    /// ```
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(WeatherCode::ClearNight),
            1 => Some(WeatherCode::SunnyDay),
            2 => Some(WeatherCode::PartlyCloudyNight),
            3 => Some(WeatherCode::PartlyCloudyDay),
            4 => Some(WeatherCode::NotUsed),
            5 => Some(WeatherCode::Mist),
            6 => Some(WeatherCode::Fog),
            7 => Some(WeatherCode::Cloudy),
            8 => Some(WeatherCode::Overcast),
            9 => Some(WeatherCode::LightRainShowerNight),
            10 => Some(WeatherCode::LightRainShowerDay),
            11 => Some(WeatherCode::Drizzle),
            12 => Some(WeatherCode::LightRain),
            13 => Some(WeatherCode::HeavyRainShowerNight),
            14 => Some(WeatherCode::HeavyRainShowerDay),
            15 => Some(WeatherCode::HeavyRain),
            16 => Some(WeatherCode::SleetShowerNight),
            17 => Some(WeatherCode::SleetShowerDay),
            18 => Some(WeatherCode::Sleet),
            19 => Some(WeatherCode::HailShowerNight),
            20 => Some(WeatherCode::HailShowerDay),
            21 => Some(WeatherCode::Hail),
            22 => Some(WeatherCode::LightSnowShowerNight),
            23 => Some(WeatherCode::LightSnowShowerDay),
            24 => Some(WeatherCode::LightSnow),
            25 => Some(WeatherCode::HeavySnowShowerNight),
            26 => Some(WeatherCode::HeavySnowShowerDay),
            27 => Some(WeatherCode::HeavySnow),
            28 => Some(WeatherCode::ThunderShowerNight),
            29 => Some(WeatherCode::ThunderShowerDay),
            30 => Some(WeatherCode::Thunder),
            _ => None,
        }
    }

    /// The icon file used to draw this code, or `None` for the empty icon.
    pub fn icon_file(self) -> Option<&'static str> {
        let file = WEATHER_ICON_LOOKUP[self as usize];
        if file.is_empty() {
            None
        } else {
            Some(file)
        }
    }
}
