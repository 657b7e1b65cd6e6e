//! Error types for mpe-midi.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid MIDI channel: {0}")]
    InvalidChannel(u8),

    #[error("Failed to parse MIDI message: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, Error>;
