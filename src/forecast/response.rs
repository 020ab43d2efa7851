//! Serde model of a Met Office DataHub site-specific forecast response (GeoJSON).

use crate::types::forecast_point::{RawRecord, MET_OFFICE_TIME_FORMAT};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SiteForecastResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Geometry {
    /// `[longitude, latitude, altitude]`
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    pub location: Option<LocationName>,
    pub request_point_distance: Option<f64>,
    pub model_run_date: Option<String>,
    #[serde(default)]
    pub time_series: Vec<RawRecord>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationName {
    pub name: String,
}

/// Where and when a forecast was modelled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastMetadata {
    pub location_name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub alt: Option<f64>,
    /// Distance in metres between the requested point and the forecast grid point.
    pub distance_from_requested_point: Option<f64>,
    pub model_run: Option<DateTime<Utc>>,
}

impl SiteForecastResponse {
    /// The raw time series of the first feature, or an empty slice.
    pub fn time_series(&self) -> &[RawRecord] {
        self.features
            .first()
            .map(|feature| feature.properties.time_series.as_slice())
            .unwrap_or_default()
    }

    pub fn metadata(&self) -> Option<ForecastMetadata> {
        let feature = self.features.first()?;
        let coordinate = |i: usize| feature.geometry.coordinates.get(i).copied();
        Some(ForecastMetadata {
            location_name: feature.properties.location.as_ref().map(|l| l.name.clone()),
            lat: coordinate(1),
            lon: coordinate(0),
            alt: coordinate(2),
            distance_from_requested_point: feature.properties.request_point_distance,
            model_run: feature
                .properties
                .model_run_date
                .as_deref()
                .and_then(|text| NaiveDateTime::parse_from_str(text, MET_OFFICE_TIME_FORMAT).ok())
                .map(|naive| naive.and_utc()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn reads_time_series_and_metadata() {
        let response: SiteForecastResponse = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-1.3, 50.7, 12.0] },
                "properties": {
                    "location": { "name": "Newport" },
                    "requestPointDistance": 412.3,
                    "modelRunDate": "2023-04-12T14:00Z",
                    "timeSeries": [
                        { "time": "2023-04-12T15:00Z", "screenTemperature": 11.8 }
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(response.time_series().len(), 1);
        let metadata = response.metadata().unwrap();
        assert_eq!(metadata.location_name.as_deref(), Some("Newport"));
        assert_eq!(metadata.lat, Some(50.7));
        assert_eq!(metadata.lon, Some(-1.3));
        assert_eq!(metadata.alt, Some(12.0));
        assert_eq!(metadata.distance_from_requested_point, Some(412.3));
        assert_eq!(
            metadata.model_run,
            Some(Utc.with_ymd_and_hms(2023, 4, 12, 14, 0, 0).unwrap())
        );
    }

    #[test]
    fn empty_response_has_no_series() {
        let response: SiteForecastResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.time_series().is_empty());
        assert!(response.metadata().is_none());
    }
}
