use crate::calendar::error::CalendarError;
use crate::conditions::error::ClusterError;
use crate::config::error::ConfigError;
use crate::fetch::error::FetchError;
use crate::forecast::error::IngestionError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MeteogramError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error(transparent)]
    Calendar(#[from] CalendarError),

    #[error("Location {lat}, {lon} has no sunrise or sunset")]
    InvalidLocation { lat: f64, lon: f64 },

    #[error("Failed to create cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Cache path '{0}' exists but is not a directory")]
    CacheDirNotADirectory(PathBuf),

    #[error("Failed to determine cache directory")]
    CacheDirResolution,
}
