pub mod forecast_point;
pub mod interval;
pub mod weather_code;
