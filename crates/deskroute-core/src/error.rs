use thiserror::Error;

use crate::types::Domain;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid corpus: {0}")]
    InvalidCorpus(String),

    /// Retrieval was requested for a domain whose index was never built.
    #[error("No index built for domain {0}")]
    DomainNotIndexed(Domain),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
