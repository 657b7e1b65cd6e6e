//! MPE emulator engine.
//!
//! Turns the output of a plain MIDI controller into MPE for a synth that
//! expects one note per channel.
//!
//! - [`Engine`]: the audio-thread state machine. Implements
//!   [`MidiEventHandler`] for input and collects [`OutEvent`]s for output.
//! - [`ControlHandle`]: the GUI-thread side, sending [`Message`]s over a
//!   lock-free queue and reading the ratios and counters the engine publishes.
//! - [`ParamId`]: the 99 parameters, their ranges, and the name lookup used
//!   by the settings format.
//! - [`display`]: parameter labels and value formatting.
//!
//! # Example
//!
//! ```
//! use mpe_core::EngineConfig;
//! use mpe_engine::{Engine, MidiEventHandler};
//!
//! let (mut engine, _handle) = Engine::new(EngineConfig::default()).unwrap();
//!
//! engine.begin_processing();
//! engine.note_on(0.0, 0, 60, 100);
//! engine.note_on(0.0, 0, 64, 100);
//!
//! let channels: Vec<u8> = engine
//!     .out_events()
//!     .iter()
//!     .filter(|e| e.command == mpe_midi::Command::NoteOn)
//!     .map(|e| e.channel)
//!     .collect();
//! assert_eq!(channels, vec![1, 2]);
//! ```

pub mod error;
pub use error::{Error, Result};

mod channel_queue;
mod controller;
pub mod display;
mod engine;
mod handle;
mod message;
mod note_stack;
mod param_id;
mod params;
mod rule;
mod shared;
mod zone;

pub use channel_queue::{ChannelQueue, MEMBER_CHANNELS_MAX};
pub use controller::{ControllerId, ExcessNoteHandling, Region, Reset, Role, Target};
pub use engine::Engine;
pub use handle::ControlHandle;
pub use message::{Message, MessageSink, MessageType};
pub use note_stack::{ChannelStats, NoteStack};
pub use param_id::{
    HashTableStats, ParamId, ParamIdHashTable, ParamKind, ParamSpec, RuleParam,
    PARAM_ID_COUNT, PARAM_NAME_MAX_LEN, RULES,
};
pub use params::EngineParams;
pub use rule::Rule;
pub use shared::SharedState;
pub use zone::{Zone, ZoneType};

pub use mpe_midi::{MidiEventHandler, OutEvent};
