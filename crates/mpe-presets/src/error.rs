//! Error types for mpe-presets

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading or writing a settings file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Settings file over the size limit
    #[error("Settings file too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: usize },

    #[error(transparent)]
    Engine(#[from] mpe_engine::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
