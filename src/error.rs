use thiserror::Error;

/// Errors raised while setting up a session. The session engine itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("word list must contain at least one word")]
    EmptyWordList,
    #[error("time limit must be at least one second, got {0}")]
    InvalidTimeLimit(u64),
    #[error("poll interval must be at least one millisecond, got {0}")]
    InvalidPollInterval(u64),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
