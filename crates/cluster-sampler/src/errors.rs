use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("invalid argument: {0}")]
    InvalidArg(String),
    #[error("vector {index} has length {found}, expected {expected}; corpus was not padded")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
    #[error("summary encoding failed: {0}")]
    Encode(String),
}

pub type ClusterResult<T> = Result<T, ClusterError>;
