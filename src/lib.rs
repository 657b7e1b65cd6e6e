//! # MPE Emulator
//!
//! Turns the output of a plain, mono-timbral MIDI controller into MIDI
//! Polyphonic Expression for synths that expect one note per channel.
//!
//! ## Architecture
//!
//! mpe-emulator is an umbrella crate that coordinates:
//! - **mpe-core** - Parameters, lock-free atomics, distortion curves, configuration
//! - **mpe-midi** - MIDI vocabulary, running-status parser, host rendering
//! - **mpe-engine** - Channel allocation, controller rules, message bus
//! - **mpe-presets** - Settings format, programs and banks
//!
//! ## Quick Start
//!
//! ```
//! use mpe_emulator::prelude::*;
//!
//! let (mut engine, mut handle) = MpeEmulatorBuilder::default().build()?;
//!
//! // GUI thread
//! handle.set_param(ParamId::Z1CHN, 0.5);
//!
//! // Audio thread, once per block
//! engine.begin_processing();
//! engine.note_on(0.0, 0, 60, 100);
//! engine.pitch_wheel_change(0.0, 0, 12000);
//!
//! for event in engine.render(512, true) {
//!     println!("{:?}", event);
//! }
//! # Ok::<(), mpe_emulator::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Engine plus presets
//! - `presets` - Settings format, programs and banks

/// Re-export of mpe-core for direct access
pub use mpe_core as core;

/// Re-export of mpe-midi for direct access
pub use mpe_midi as midi;

/// Re-export of mpe-engine for direct access
pub use mpe_engine as engine;

pub use mpe_core::{DistortionCurve, EngineConfig, Param};

pub use mpe_midi::{
    midi_output_channel, Command, MidiEvent, MidiEventHandler, MidiOutputConsumer,
    MidiOutputProducer, OutEvent,
};

pub use mpe_engine::{
    ControlHandle, ControllerId, Engine, ExcessNoteHandling, Message, MessageSink, MessageType,
    ParamId, Reset, RuleParam, SharedState, Target, ZoneType,
};

// Presets
#[cfg(feature = "presets")]
pub use mpe_presets as presets;

#[cfg(feature = "presets")]
pub use mpe_presets::{Bank, Program};

mod builder;
mod error;

pub use builder::MpeEmulatorBuilder;
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    // Engine and its GUI-side handle
    pub use crate::{ControlHandle, Engine, MpeEmulatorBuilder};

    // Input and output
    pub use crate::{Command, MidiEvent, MidiEventHandler, OutEvent};

    // Parameters
    pub use crate::{ExcessNoteHandling, Message, ParamId, Reset, RuleParam, Target, ZoneType};

    // Presets
    #[cfg(feature = "presets")]
    pub use crate::{Bank, Program};
}
