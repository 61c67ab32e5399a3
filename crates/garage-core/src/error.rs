//! Error types for the retrieval service.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Caller supplied an unusable request (missing query, bad body).
    #[error("{0}")]
    Validation(String),

    /// No index snapshot has been loaded yet.
    #[error("{0}")]
    NotReady(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
