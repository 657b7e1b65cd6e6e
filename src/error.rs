//! Centralized error type for the mpe-emulator umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] mpe_core::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] mpe_midi::Error),

    #[error(transparent)]
    Engine(#[from] mpe_engine::Error),

    #[cfg(feature = "presets")]
    #[error("Presets: {0}")]
    Presets(#[from] mpe_presets::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
