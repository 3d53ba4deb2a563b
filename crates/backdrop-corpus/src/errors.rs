use thiserror::Error;

use replayscope_core_types::SessionId;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("vector of length {len} from session {session} exceeds dictionary size {dimension}")]
    VectorOverflow {
        session: SessionId,
        len: usize,
        dimension: usize,
    },
}

pub type CorpusResult<T> = Result<T, CorpusError>;

/// Failures of an upstream session source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("session not found: {0}")]
    NotFound(SessionId),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type SourceResult<T> = Result<T, SourceError>;
