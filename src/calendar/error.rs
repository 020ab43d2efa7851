use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Failed to read calendar events file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Calendar events file '{0}' is not a list of events")]
    Parse(PathBuf, #[source] serde_json::Error),
}
