//! Host-side rendering of engine output into sample-accurate MIDI events.

use crate::error::{Error, Result};
use crate::event::{Command, OutEvent};
use crate::output_collector::MidiOutputProducer;
use crate::types::CHANNEL_MAX;
use midi_msg::{Channel, ChannelVoiceMsg, ControlChange, MidiMsg};

/// RT-safe MIDI event with sample-accurate frame offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MidiEvent {
    /// Offset within the current buffer (0 = first sample).
    pub frame_offset: usize,
    pub channel: Channel,
    pub msg: ChannelVoiceMsg,
}

impl MidiEvent {
    #[inline]
    pub fn new(frame_offset: usize, channel: Channel, msg: ChannelVoiceMsg) -> Self {
        Self {
            frame_offset,
            channel,
            msg,
        }
    }

    /// Converts an engine event, placing it at `frame_offset`.
    pub fn from_out_event(event: &OutEvent, frame_offset: usize) -> Result<Self> {
        if event.channel > CHANNEL_MAX {
            return Err(Error::InvalidChannel(event.channel));
        }
        let msg = match event.command {
            Command::NoteOff => ChannelVoiceMsg::NoteOff {
                note: event.data1,
                velocity: event.data2,
            },
            Command::NoteOn => ChannelVoiceMsg::NoteOn {
                note: event.data1,
                velocity: event.data2,
            },
            Command::Aftertouch => ChannelVoiceMsg::PolyPressure {
                note: event.data1,
                pressure: event.data2,
            },
            Command::ControlChange => ChannelVoiceMsg::ControlChange {
                control: ControlChange::CC {
                    control: event.data1,
                    value: event.data2,
                },
            },
            Command::ProgramChange => ChannelVoiceMsg::ProgramChange {
                program: event.data1,
            },
            Command::ChannelPressure => ChannelVoiceMsg::ChannelPressure {
                pressure: event.data1,
            },
            Command::PitchBendChange => ChannelVoiceMsg::PitchBend {
                bend: event.pitch_bend_word(),
            },
        };
        Ok(Self {
            frame_offset,
            channel: Channel::from_u8(event.channel),
            msg,
        })
    }

    #[inline]
    pub fn channel_num(&self) -> u8 {
        self.channel as u8
    }

    #[inline]
    pub fn note(&self) -> Option<u8> {
        match self.msg {
            ChannelVoiceMsg::NoteOn { note, .. }
            | ChannelVoiceMsg::NoteOff { note, .. }
            | ChannelVoiceMsg::PolyPressure { note, .. } => Some(note),
            _ => None,
        }
    }

    #[inline]
    pub fn to_midi_msg(&self) -> MidiMsg {
        MidiMsg::ChannelVoice {
            channel: self.channel,
            msg: self.msg,
        }
    }

    #[inline]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_midi_msg().to_midi()
    }
}

/// Renders one block of engine output.
///
/// With `nudge_setup_events`, controller events that are not pre-Note-On
/// setup move one sample later (unless already on the last sample) so that
/// hosts delivering controllers separately from notes still see them after
/// the matching Note-On.
pub fn render_block(
    events: &[OutEvent],
    sample_rate: f64,
    block_len: usize,
    nudge_setup_events: bool,
) -> Vec<MidiEvent> {
    let mut out = Vec::with_capacity(events.len());
    render_block_into(events, sample_rate, block_len, nudge_setup_events, &mut out);
    out
}

/// Like [`render_block`], appending into a caller-owned buffer.
pub fn render_block_into(
    events: &[OutEvent],
    sample_rate: f64,
    block_len: usize,
    nudge_setup_events: bool,
    out: &mut Vec<MidiEvent>,
) {
    render_with(events, sample_rate, block_len, nudge_setup_events, |event| {
        out.push(event)
    });
}

/// Like [`render_block`], sending each event to an output thread.
///
/// Returns the number of events sent. Events that do not fit are dropped
/// and counted by the producer.
pub fn render_block_to_output(
    events: &[OutEvent],
    sample_rate: f64,
    block_len: usize,
    nudge_setup_events: bool,
    output: &mut MidiOutputProducer,
) -> usize {
    let mut sent = 0;
    render_with(events, sample_rate, block_len, nudge_setup_events, |event| {
        if output.send(event) {
            sent += 1;
        }
    });
    sent
}

fn render_with(
    events: &[OutEvent],
    sample_rate: f64,
    block_len: usize,
    nudge_setup_events: bool,
    mut emit: impl FnMut(MidiEvent),
) {
    if block_len == 0 {
        return;
    }
    let last_sample = block_len - 1;

    for event in events {
        let mut offset = event.sample_offset(sample_rate, last_sample);
        if nudge_setup_events
            && event.command.is_controller()
            && !event.is_pre_note_on_setup
            && offset < last_sample
        {
            offset += 1;
        }
        match MidiEvent::from_out_event(event, offset) {
            Ok(midi_event) => emit(midi_event),
            Err(err) => tracing::trace!("dropping event {}: {}", event, err),
        }
    }
}
