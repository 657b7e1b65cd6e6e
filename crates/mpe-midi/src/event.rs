//! Outbound events produced by the engine.

use crate::types::{Byte, Channel, CHANNEL_MAX};
use smallvec::SmallVec;

/// Channel voice message type, the upper nibble of a status byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Command {
    NoteOff = 0x80,
    NoteOn = 0x90,
    Aftertouch = 0xa0,
    ControlChange = 0xb0,
    ProgramChange = 0xc0,
    ChannelPressure = 0xd0,
    PitchBendChange = 0xe0,
}

impl Command {
    /// Decodes the message type of a status byte.
    pub fn from_status(status: Byte) -> Option<Self> {
        match status & 0xf0 {
            0x80 => Some(Command::NoteOff),
            0x90 => Some(Command::NoteOn),
            0xa0 => Some(Command::Aftertouch),
            0xb0 => Some(Command::ControlChange),
            0xc0 => Some(Command::ProgramChange),
            0xd0 => Some(Command::ChannelPressure),
            0xe0 => Some(Command::PitchBendChange),
            _ => None,
        }
    }

    #[inline]
    pub fn status(self, channel: Channel) -> Byte {
        self as Byte | (channel & CHANNEL_MAX)
    }

    /// Number of data bytes following the status byte.
    #[inline]
    pub fn data_len(self) -> usize {
        match self {
            Command::ProgramChange | Command::ChannelPressure => 1,
            _ => 2,
        }
    }

    /// Controller-like messages, which hosts may deliver out of band from notes.
    #[inline]
    pub fn is_controller(self) -> bool {
        matches!(
            self,
            Command::ControlChange | Command::ChannelPressure | Command::PitchBendChange
        )
    }
}

/// A MIDI event emitted by the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutEvent {
    /// Seconds from the start of the current block.
    pub time_offset: f64,
    /// Normalized value the event was derived from.
    pub value: f64,
    pub command: Command,
    pub channel: Channel,
    pub data1: Byte,
    pub data2: Byte,
    /// Controller setup emitted right before a Note-On on the same channel.
    pub is_pre_note_on_setup: bool,
}

impl OutEvent {
    #[inline]
    pub fn new(
        time_offset: f64,
        command: Command,
        channel: Channel,
        data1: Byte,
        data2: Byte,
        value: f64,
        is_pre_note_on_setup: bool,
    ) -> Self {
        Self {
            time_offset,
            value,
            command,
            channel,
            data1,
            data2,
            is_pre_note_on_setup,
        }
    }

    /// Position of the event within a block of `last_sample_offset + 1` samples.
    #[inline]
    pub fn sample_offset(&self, sample_rate: f64, last_sample_offset: usize) -> usize {
        let offset = (self.time_offset * sample_rate).round().max(0.0) as usize;
        offset.min(last_sample_offset)
    }

    /// Raw MIDI bytes of the event.
    pub fn to_bytes(&self) -> SmallVec<[u8; 3]> {
        let mut bytes = SmallVec::new();
        bytes.push(self.command.status(self.channel));
        bytes.push(self.data1 & 0x7f);
        if self.command.data_len() == 2 {
            bytes.push(self.data2 & 0x7f);
        }
        bytes
    }

    /// 14-bit pitch bend word of a pitch bend event.
    #[inline]
    pub fn pitch_bend_word(&self) -> u16 {
        (u16::from(self.data2 & 0x7f) << 7) | u16::from(self.data1 & 0x7f)
    }
}

impl std::fmt::Display for OutEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "t={:.3} cmd={:?} ch={} d1=0x{:02x} d2=0x{:02x} (v={:.3}){}",
            self.time_offset,
            self.command,
            self.channel,
            self.data1,
            self.data2,
            self.value,
            if self.is_pre_note_on_setup {
                " pre-NOTE_ON setup"
            } else {
                ""
            }
        )
    }
}
