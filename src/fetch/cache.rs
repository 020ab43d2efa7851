use crate::fetch::error::FetchError;
use crate::forecast::response::SiteForecastResponse;
use log::{info, warn};
use reqwest::blocking::Client;
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

const CLIENT_ID_HEADER: &str = "X-IBM-Client-Id";
const CLIENT_SECRET_HEADER: &str = "X-IBM-Client-Secret";

/// Downloads site forecasts, reusing a cached response while it is younger than the TTL.
pub struct CachedFetcher {
    client: Client,
    client_key: String,
    client_secret: String,
    lat: f64,
    lon: f64,
    ttl: Duration,
}

impl CachedFetcher {
    pub fn new(
        client_key: &str,
        client_secret: &str,
        lat: f64,
        lon: f64,
        ttl: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            client_key: client_key.to_string(),
            client_secret: client_secret.to_string(),
            lat,
            lon,
            ttl,
        })
    }

    /// Returns the forecast at `url`, read from `cache_file` if that is fresh and
    /// `ignore_cache` is not set, downloaded (and cached) otherwise.
    pub fn get(
        &self,
        url: &str,
        cache_file: &Path,
        ignore_cache: bool,
    ) -> Result<SiteForecastResponse, FetchError> {
        if !ignore_cache && is_fresh(cache_file, self.ttl)? {
            info!("Cache hit for {} at {:?}", url, cache_file);
            return read_cache(cache_file);
        }
        warn!("Cache miss for {}. Downloading.", url);

        let body = self.download(url)?;
        let value: Value = serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?;
        write_cache(cache_file, &value)?;
        info!("Cached response from {} to {:?}", url, cache_file);

        serde_json::from_value(value).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn download(&self, url: &str) -> Result<String, FetchError> {
        info!("Downloading forecast from {}", url);
        let response = self
            .client
            .get(url)
            .header("accept", "application/json")
            .header(CLIENT_ID_HEADER, &self.client_key)
            .header(CLIENT_SECRET_HEADER, &self.client_secret)
            .query(&[
                ("latitude", self.lat.to_string()),
                ("longitude", self.lon.to_string()),
                ("includeLocationName", "true".to_string()),
                ("excludeParameterMetadata", "true".to_string()),
            ])
            .send()
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(match e.status() {
                    Some(status) => FetchError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    },
                    None => FetchError::NetworkRequest(url.to_string(), e),
                });
            }
        };

        response
            .text()
            .map_err(|e| FetchError::NetworkRequest(url.to_string(), e))
    }
}

/// Whether `path` holds a non-empty cached response younger than `ttl`. A file modified
/// in the future counts as brand new.
pub fn is_fresh(path: &Path, ttl: Duration) -> Result<bool, FetchError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(FetchError::CacheMetadataRead(path.to_path_buf(), e)),
    };
    if metadata.len() == 0 {
        warn!("Cache file {:?} is empty", path);
        return Ok(false);
    }
    let modified = metadata
        .modified()
        .map_err(|e| FetchError::CacheMetadataRead(path.to_path_buf(), e))?;
    let age = match modified.elapsed() {
        Ok(age) => age,
        Err(e) => {
            // The clock is behind the file, e.g. on a device that has not synced its time yet.
            warn!(
                "Cache file {:?} was modified {:?} in the future. Treating it as fresh.",
                path,
                e.duration()
            );
            Duration::ZERO
        }
    };
    Ok(age < ttl)
}

fn read_cache(path: &Path) -> Result<SiteForecastResponse, FetchError> {
    let text =
        std::fs::read_to_string(path).map_err(|e| FetchError::CacheRead(path.to_path_buf(), e))?;
    serde_json::from_str(&text).map_err(|e| FetchError::CacheDecode(path.to_path_buf(), e))
}

/// Writes `value` as pretty JSON, replacing `path` atomically.
fn write_cache(path: &Path, value: &Value) -> Result<(), FetchError> {
    let to_write_error = |e: std::io::Error| FetchError::CacheWrite(path.to_path_buf(), e);
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(to_write_error)?;

    let pretty = serde_json::to_string_pretty(value)
        .map_err(|e| FetchError::CacheDecode(path.to_path_buf(), e))?;
    let mut temp_file = NamedTempFile::new_in(parent).map_err(to_write_error)?;
    temp_file.write_all(pretty.as_bytes()).map_err(to_write_error)?;
    temp_file.flush().map_err(to_write_error)?;
    temp_file
        .persist(path)
        .map_err(|e| to_write_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FORECAST: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": {"type": "Point", "coordinates": [-1.3, 50.7, 12.0]},
            "properties": {
                "location": {"name": "Newport"},
                "requestPointDistance": 1081.6,
                "modelRunDate": "2023-06-01T09:00Z",
                "timeSeries": [{"time": "2023-06-01T10:00Z", "screenTemperature": 17.2}]
            }
        }]
    }"#;

    fn fetcher(ttl: Duration) -> CachedFetcher {
        CachedFetcher::new("key", "secret", 50.7, -1.3, ttl).unwrap()
    }

    #[test]
    fn missing_or_empty_cache_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hourly.json");
        assert!(!is_fresh(&path, Duration::from_secs(600)).unwrap());

        std::fs::write(&path, "").unwrap();
        assert!(!is_fresh(&path, Duration::from_secs(600)).unwrap());

        std::fs::write(&path, FORECAST).unwrap();
        assert!(is_fresh(&path, Duration::from_secs(600)).unwrap());
        assert!(!is_fresh(&path, Duration::ZERO).unwrap());
    }

    #[test]
    fn cache_from_the_future_is_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hourly.json");
        std::fs::write(&path, FORECAST).unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(std::time::SystemTime::now() + Duration::from_secs(3600))
            .unwrap();

        assert!(is_fresh(&path, Duration::from_secs(600)).unwrap());
        let response = fetcher(Duration::from_secs(600))
            .get("http://127.0.0.1:9/unreachable", &path, false)
            .unwrap();
        assert_eq!(response.time_series().len(), 1);
    }

    #[test]
    fn fresh_cache_is_used_without_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hourly.json");
        std::fs::write(&path, FORECAST).unwrap();

        // The URL is never contacted while the cache is fresh.
        let response = fetcher(Duration::from_secs(600))
            .get("http://127.0.0.1:9/unreachable", &path, false)
            .unwrap();
        assert_eq!(response.time_series().len(), 1);
        assert_eq!(
            response.metadata().unwrap().location_name.as_deref(),
            Some("Newport")
        );
    }

    #[test]
    fn ignoring_the_cache_goes_to_the_network() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hourly.json");
        std::fs::write(&path, FORECAST).unwrap();

        let result = fetcher(Duration::from_secs(600)).get("http://127.0.0.1:9/unreachable", &path, true);
        assert!(matches!(result, Err(FetchError::NetworkRequest(..))));
    }

    #[test]
    fn corrupt_cache_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hourly.json");
        std::fs::write(&path, "{ not json").unwrap();
        let result = fetcher(Duration::from_secs(600)).get("http://127.0.0.1:9/unreachable", &path, false);
        assert!(matches!(result, Err(FetchError::CacheDecode(..))));
    }

    #[test]
    fn cache_is_written_pretty_and_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("three_hourly.json");
        write_cache(&path, &json!({"features": []})).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(first.contains('\n'));

        write_cache(&path, &json!({"features": [], "type": "FeatureCollection"})).unwrap();
        let second: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(second["type"], "FeatureCollection");
    }
}
