//! MIDI primitives, constants and value conversions.

pub type Byte = u8;
pub type Word = u16;
pub type Note = Byte;
pub type Channel = Byte;
pub type Controller = Byte;

pub const CHANNEL_MAX: Channel = 15;
pub const CHANNELS: usize = CHANNEL_MAX as usize + 1;
pub const INVALID_CHANNEL: Channel = 255;

pub const NOTE_MAX: Note = 127;
pub const NOTES: usize = NOTE_MAX as usize + 1;
pub const INVALID_NOTE: Note = 255;

pub const DATA_ENTRY_MSB: Controller = 0x06;
pub const SUSTAIN_PEDAL: Controller = 0x40;
pub const RPN_LSB: Controller = 0x64;
pub const RPN_MSB: Controller = 0x65;
pub const MAX_CONTROLLER_ID: Controller = 0x7f;

/// Controller numbers at and above this are channel mode messages.
pub const CHANNEL_MODE_FIRST: Controller = 0x78;

/// Maps `[0, 1]` onto a 7-bit data byte.
#[inline]
pub fn float_to_byte(value: f64) -> Byte {
    (value * 127.0).round().clamp(0.0, 127.0) as Byte
}

/// Maps `[0, 1]` onto a 14-bit word.
#[inline]
pub fn float_to_word(value: f64) -> Word {
    (value * 16383.0).round().clamp(0.0, 16383.0) as Word
}

#[inline]
pub fn byte_to_float(value: Byte) -> f64 {
    (f64::from(value) / 127.0).min(1.0)
}

#[inline]
pub fn word_to_float(value: Word) -> f64 {
    (f64::from(value) / 16383.0).min(1.0)
}
