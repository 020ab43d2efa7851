use crate::error::MeteogramError;
use chrono::TimeDelta;
use log::info;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "meteogram";

pub fn get_cache_dir() -> Result<PathBuf, MeteogramError> {
    dirs::cache_dir()
        .ok_or(MeteogramError::CacheDirResolution)
        .map(|p| p.join(CACHE_DIR_NAME))
}

pub fn ensure_cache_dir_exists(path: &Path) -> Result<(), MeteogramError> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(MeteogramError::CacheDirNotADirectory(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("Creating cache directory: {}", path.display());
            std::fs::create_dir_all(path)
                .map_err(|e| MeteogramError::CacheDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(MeteogramError::CacheDirCreation(path.to_path_buf(), e)),
    }
}

/// A fractional number of hours as a time delta, to the second. Saturates at the
/// limits of `TimeDelta`.
pub fn hours(value: f64) -> TimeDelta {
    let seconds = (value * 3600.0).round() as i64;
    TimeDelta::try_seconds(seconds).unwrap_or(if seconds < 0 {
        TimeDelta::MIN
    } else {
        TimeDelta::MAX
    })
}
