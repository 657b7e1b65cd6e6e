//! Test helpers and fixtures for mpe-emulator integration tests
//!
//! Engines are driven block by block, the way a host would: queue
//! messages, `begin_processing`, feed MIDI, then render.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `RATIO_EPSILON` (1e-6): Ratios read back from the settings format
//! - `WORD_STEP` (1/16383): One step of a 14-bit controller
//! - `BYTE_STEP` (1/127): One step of a 7-bit controller

#![allow(dead_code)]

pub mod tolerances;

use mpe_emulator::midi::ChannelVoiceMsg;
use mpe_emulator::prelude::*;

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Standard buffer size for deterministic testing
pub const TEST_BUFFER_SIZE: usize = 512;

/// Events emitted for the first note of a fresh engine: three setup
/// controllers, the Note-On, and three controllers following it.
pub const FIRST_NOTE_EVENT_COUNT: usize = 7;

/// Create a test engine with default parameters.
pub fn test_engine() -> (Engine, ControlHandle) {
    MpeEmulatorBuilder::default()
        .sample_rate(TEST_SAMPLE_RATE)
        .build()
        .expect("Failed to create test engine")
}

/// Create a test engine with serialized settings applied.
pub fn test_engine_with_settings(settings: &str) -> (Engine, ControlHandle) {
    MpeEmulatorBuilder::default()
        .sample_rate(TEST_SAMPLE_RATE)
        .settings(settings)
        .build()
        .expect("Failed to create test engine")
}

/// Render the current block with setup nudging enabled.
pub fn render(engine: &Engine) -> Vec<MidiEvent> {
    engine.render(TEST_BUFFER_SIZE, true)
}

/// `(channel, note)` of every Note-On in `events`.
pub fn note_ons(events: &[MidiEvent]) -> Vec<(u8, u8)> {
    events
        .iter()
        .filter_map(|event| match event.msg {
            ChannelVoiceMsg::NoteOn { note, .. } => Some((event.channel_num(), note)),
            _ => None,
        })
        .collect()
}

/// `(channel, note)` of every Note-Off in `events`.
pub fn note_offs(events: &[MidiEvent]) -> Vec<(u8, u8)> {
    events
        .iter()
        .filter_map(|event| match event.msg {
            ChannelVoiceMsg::NoteOff { note, .. } => Some((event.channel_num(), note)),
            _ => None,
        })
        .collect()
}

/// Pitch bend values sent on `channel`.
pub fn pitch_bends(events: &[MidiEvent], channel: u8) -> Vec<u16> {
    events
        .iter()
        .filter(|event| event.channel_num() == channel)
        .filter_map(|event| match event.msg {
            ChannelVoiceMsg::PitchBend { bend } => Some(bend),
            _ => None,
        })
        .collect()
}

/// Channel pressure values sent on `channel`.
pub fn channel_pressures(events: &[MidiEvent], channel: u8) -> Vec<u8> {
    events
        .iter()
        .filter(|event| event.channel_num() == channel)
        .filter_map(|event| match event.msg {
            ChannelVoiceMsg::ChannelPressure { pressure } => Some(pressure),
            _ => None,
        })
        .collect()
}
