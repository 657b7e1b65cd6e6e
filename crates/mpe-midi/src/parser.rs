//! Running-status MIDI parser.
//!
//! Raw input bytes are decoded into calls on a [`MidiEventHandler`]. If an
//! event starts with a data byte, the handler's previous status byte is
//! reused; without a valid running status the data bytes are skipped.

use crate::event::Command;
use crate::types::{Byte, Channel, Controller, Note, Word, CHANNEL_MAX, CHANNEL_MODE_FIRST};

/// Velocity reported for a Note-On with zero velocity.
const DEFAULT_RELEASE_VELOCITY: Byte = 64;

/// Receiver of decoded channel voice messages.
///
/// All callbacks default to no-ops; the running status must be stored by the
/// implementor.
pub trait MidiEventHandler {
    fn running_status(&self) -> Byte;

    fn set_running_status(&mut self, status: Byte);

    fn note_off(&mut self, _time_offset: f64, _channel: Channel, _note: Note, _velocity: Byte) {}

    fn note_on(&mut self, _time_offset: f64, _channel: Channel, _note: Note, _velocity: Byte) {}

    fn aftertouch(&mut self, _time_offset: f64, _channel: Channel, _note: Note, _pressure: Byte) {}

    fn control_change(
        &mut self,
        _time_offset: f64,
        _channel: Channel,
        _controller: Controller,
        _value: Byte,
    ) {
    }

    fn program_change(&mut self, _time_offset: f64, _channel: Channel, _program: Byte) {}

    fn channel_pressure(&mut self, _time_offset: f64, _channel: Channel, _pressure: Byte) {}

    fn pitch_wheel_change(&mut self, _time_offset: f64, _channel: Channel, _value: Word) {}

    fn channel_mode(&mut self, _time_offset: f64, _channel: Channel, _message: Byte, _data: Byte) {}
}

#[inline]
fn is_status_byte(byte: Byte) -> bool {
    byte & 0x80 != 0
}

/// Parses and dispatches every event found in `buffer`.
///
/// Returns the number of bytes consumed.
pub fn dispatch_events<H: MidiEventHandler + ?Sized>(
    handler: &mut H,
    time_offset: f64,
    buffer: &[u8],
) -> usize {
    let mut next_byte = 0;
    while next_byte < buffer.len() {
        let consumed = dispatch_event(handler, time_offset, &buffer[next_byte..]);
        if consumed == 0 {
            break;
        }
        next_byte += consumed;
    }
    next_byte
}

/// Parses and dispatches the first event that can be read from `buffer`.
///
/// Returns the number of bytes consumed.
pub fn dispatch_event<H: MidiEventHandler + ?Sized>(
    handler: &mut H,
    time_offset: f64,
    buffer: &[u8],
) -> usize {
    let Some(&first) = buffer.first() else {
        return 0;
    };

    let mut cursor = Cursor { buffer, next: 0 };
    let status = if is_status_byte(first) {
        cursor.next = 1;
        handler.set_running_status(first);
        first
    } else {
        let running = handler.running_status();
        if !is_status_byte(running) {
            return cursor.skip_data_bytes();
        }
        running
    };

    let channel = status & CHANNEL_MAX;
    let Some(command) = Command::from_status(status) else {
        return cursor.skip_data_bytes();
    };

    match command {
        Command::NoteOff => {
            if let Some((note, velocity)) = cursor.pair() {
                handler.note_off(time_offset, channel, note, velocity);
            }
        }
        Command::NoteOn => {
            if let Some((note, velocity)) = cursor.pair() {
                if velocity == 0 {
                    handler.note_off(time_offset, channel, note, DEFAULT_RELEASE_VELOCITY);
                } else {
                    handler.note_on(time_offset, channel, note, velocity);
                }
            }
        }
        Command::Aftertouch => {
            if let Some((note, pressure)) = cursor.pair() {
                handler.aftertouch(time_offset, channel, note, pressure);
            }
        }
        Command::ControlChange => {
            if let Some((d1, d2)) = cursor.pair() {
                // Special controllers such as the sustain pedal are left to the handler.
                if d1 < CHANNEL_MODE_FIRST {
                    handler.control_change(time_offset, channel, d1, d2);
                } else {
                    handler.channel_mode(time_offset, channel, d1, d2);
                }
            }
        }
        Command::ProgramChange => {
            if let Some(program) = cursor.data_byte() {
                handler.program_change(time_offset, channel, program);
            }
        }
        Command::ChannelPressure => {
            if let Some(pressure) = cursor.data_byte() {
                handler.channel_pressure(time_offset, channel, pressure);
            }
        }
        Command::PitchBendChange => {
            if let Some((lsb, msb)) = cursor.pair() {
                let value = (Word::from(msb) << 7) | Word::from(lsb);
                handler.pitch_wheel_change(time_offset, channel, value);
            }
        }
    }

    cursor.next
}

struct Cursor<'a> {
    buffer: &'a [u8],
    next: usize,
}

impl Cursor<'_> {
    fn data_byte(&mut self) -> Option<Byte> {
        let byte = *self.buffer.get(self.next)?;
        if is_status_byte(byte) {
            return None;
        }
        self.next += 1;
        Some(byte)
    }

    fn pair(&mut self) -> Option<(Byte, Byte)> {
        let first = self.data_byte()?;
        let second = self.data_byte()?;
        Some((first, second))
    }

    fn skip_data_bytes(&mut self) -> usize {
        while self.next < self.buffer.len() && !is_status_byte(self.buffer[self.next]) {
            self.next += 1;
        }
        self.next
    }
}
