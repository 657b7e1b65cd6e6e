//! Error types for the MPE engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown parameter: {0:?}")]
    UnknownParam(String),

    #[error("Message queue full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error(transparent)]
    Core(#[from] mpe_core::Error),

    #[error(transparent)]
    Midi(#[from] mpe_midi::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
