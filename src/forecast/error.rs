use crate::types::forecast_point::Granularity;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("{granularity} forecast record has no 'time' field")]
    MissingTime { granularity: Granularity },

    #[error("{granularity} forecast record has a non-string 'time' field")]
    TimeNotAString { granularity: Granularity },

    #[error("Failed to parse forecast time '{value}'")]
    InvalidTime {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
