//! Presets for the MPE emulator.
//!
//! - [`serializer`]: the `[mpeemulator]` settings text format, export from
//!   an engine's published state and import through [`MessageSink`]s.
//! - [`Program`] and [`Bank`]: named presets, 128 to a bank.
//! - [`upgrade`]: rewriting old settings files, also available as the
//!   `mpe-upgrade-settings` binary.
//!
//! # Example
//!
//! ```
//! use mpe_core::EngineConfig;
//! use mpe_engine::{Engine, ParamId};
//! use mpe_presets::serializer;
//!
//! let (mut engine, _handle) = Engine::new(EngineConfig::default()).unwrap();
//! serializer::import_settings_in_audio_thread(&mut engine, "[mpeemulator]\nZ1CHN = 0.5\n");
//!
//! assert_eq!(engine.param_value(ParamId::Z1CHN), 8);
//! assert_eq!(
//!     serializer::serialize(engine.shared()),
//!     "[mpeemulator]\r\nZ1CHN = 0.50\r\n"
//! );
//! ```
//!
//! [`MessageSink`]: mpe_engine::MessageSink

pub mod error;
pub use error::{Error, Result};

pub mod bank;
pub mod program;
pub mod serializer;
pub mod upgrade;

pub use bank::{Bank, NUMBER_OF_PROGRAMS};
pub use program::Program;
pub use serializer::{import_settings, serialize};
pub use upgrade::{upgrade_settings, upgrade_settings_file};
