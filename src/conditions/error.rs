use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClusterError {
    #[error("Index {index} is outside a sequence of {len} sample times")]
    IndexOutOfRange { index: usize, len: usize },
}
