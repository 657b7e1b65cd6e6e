//! Error types for mpe-core.

use thiserror::Error;

/// Error type for mpe-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for mpe-core operations.
pub type Result<T> = std::result::Result<T, Error>;
