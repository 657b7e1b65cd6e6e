//! MIDI vocabulary for the MPE emulator.
//!
//! - **Types and conversions**: channel/note/byte/word aliases, well-known
//!   constants, and the clamping float conversions used everywhere.
//! - **Parsing**: a running-status parser that dispatches raw bytes to a
//!   [`MidiEventHandler`].
//! - **Outbound events**: [`OutEvent`], the engine's output record with a
//!   time offset in seconds and a pre-Note-On setup tag.
//! - **Rendering**: conversion of engine output into sample-accurate
//!   [`MidiEvent`]s for a host block.
//! - **Output collection**: a lock-free ring buffer carrying rendered events
//!   from the audio thread to a MIDI output thread.

pub mod error;
pub use error::{Error, Result};

mod event;
mod output_collector;
mod parser;
mod render;
mod types;

pub use event::{Command, OutEvent};
pub use output_collector::{midi_output_channel, MidiOutputConsumer, MidiOutputProducer};
pub use parser::{dispatch_event, dispatch_events, MidiEventHandler};
pub use render::{render_block, render_block_into, render_block_to_output, MidiEvent};
pub use types::*;

// Message types carried by `MidiEvent`
pub use midi_msg::{ChannelVoiceMsg, ControlChange};
