//! The MPE emulator engine.
//!
//! [`Engine`] lives on the audio thread. It turns a mono-timbral MIDI stream
//! into MPE: every note gets its own member channel, and controller rules
//! route (and reshape) incoming controllers to the channels of the notes
//! they target.
//!
//! Per block the host calls [`Engine::begin_processing`], feeds the block's
//! input through the [`MidiEventHandler`] callbacks (or
//! [`Engine::process_midi`] for raw bytes), then reads
//! [`Engine::out_events`].

use crate::channel_queue::ChannelQueue;
use crate::controller::{ControllerId, ExcessNoteHandling, Region, Reset, Role, Target};
use crate::error::{Error, Result};
use crate::handle::ControlHandle;
use crate::message::{Message, MessageSink, MessageType};
use crate::note_stack::{ChannelStats, NoteStack};
use crate::param_id::{ParamId, RuleParam, RULES};
use crate::params::EngineParams;
use crate::shared::SharedState;
use crate::zone::Zone;
use mpe_core::{EngineConfig, Param};
use mpe_midi::{
    byte_to_float, dispatch_events, float_to_byte, float_to_word, midi_output_channel,
    render_block_into, render_block_to_output, Byte, Channel, Command, Controller, MidiEvent,
    MidiEventHandler, MidiOutputConsumer, MidiOutputProducer, Note, OutEvent, Word, CHANNELS,
    CHANNEL_MAX, DATA_ENTRY_MSB, INVALID_CHANNEL, NOTES, NOTE_MAX, RPN_LSB, RPN_MSB,
};
use ringbuf::{traits::*, HeapCons, HeapRb};
use std::sync::Arc;

const DEFAULT_VELOCITY: Byte = 64;

/// MCM payload: registered parameter number 6.
const MCM_RPN_LSB: Byte = 6;

/// Positional channels of the three note stacks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct StackStats {
    all: ChannelStats,
    below: ChannelStats,
    above: ChannelStats,
}

impl StackStats {
    fn channel(&self, region: Region, role: Role) -> Channel {
        let stats = match region {
            Region::All => &self.all,
            Region::Below => &self.below,
            Region::Above => &self.above,
        };
        match role {
            Role::Lowest => stats.lowest,
            Role::Highest => stats.highest,
            Role::Oldest => stats.oldest,
            Role::Newest => stats.newest,
        }
    }
}

/// Settings that require stopping every note when they change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ZoneConfig {
    zone: Zone,
    anchor: Note,
    offset_below_anchor: i32,
    offset_above_anchor: i32,
}

impl ZoneConfig {
    fn from_params(params: &EngineParams) -> Self {
        Self {
            zone: Zone::new(params.zone_type(), params.member_channels()),
            anchor: params.anchor.value().clamp(0, i32::from(NOTE_MAX)) as Note,
            offset_below_anchor: params.transpose_below(),
            offset_above_anchor: params.transpose_above(),
        }
    }
}

/// Last controller value seen in this block, for dropping duplicates.
#[derive(Clone, Copy, Debug, PartialEq)]
struct ControllerMessage {
    time_offset: f64,
    value: Word,
}

impl ControllerMessage {
    const NONE: Self = Self {
        time_offset: f64::NEG_INFINITY,
        value: 0,
    };
}

/// MIDI-to-MPE transformation engine.
///
/// Created together with its [`ControlHandle`] by [`Engine::new`]. All
/// input callbacks and [`begin_processing`](Engine::begin_processing) are
/// infallible and do not block.
pub struct Engine {
    config: EngineConfig,
    params: EngineParams,
    shared: Arc<SharedState>,
    messages: HeapCons<Message>,
    out_events: Vec<OutEvent>,

    note_stack: NoteStack,
    note_stack_below: NoteStack,
    note_stack_above: NoteStack,
    stats: StackStats,
    available_channels: ChannelQueue,
    channels_by_note: [Channel; NOTES],
    velocities_by_note: [Byte; NOTES],
    deferred_note_offs: NoteStack,
    deferred_velocities: [Byte; NOTES],
    previous_controller_messages: [ControllerMessage; ControllerId::COUNT],

    zone_config: ZoneConfig,
    running_status: Byte,
    is_sustain_pedal_on: bool,
    is_suspended: bool,
    had_reset: bool,
}

impl Engine {
    /// Creates an engine with default parameters and the handle that
    /// controls it from another thread.
    pub fn new(config: EngineConfig) -> Result<(Self, ControlHandle)> {
        config.validate()?;
        mpe_core::math::warm_up();

        let params = EngineParams::new();
        let shared = Arc::new(SharedState::new(&params));
        let (producer, consumer) = HeapRb::<Message>::new(config.message_queue_capacity).split();
        let zone_config = ZoneConfig::from_params(&params);

        let mut engine = Self {
            out_events: Vec::with_capacity(config.out_events_capacity),
            config,
            params,
            shared: Arc::clone(&shared),
            messages: consumer,
            note_stack: NoteStack::new(),
            note_stack_below: NoteStack::new(),
            note_stack_above: NoteStack::new(),
            stats: StackStats::default(),
            available_channels: ChannelQueue::new(),
            channels_by_note: [INVALID_CHANNEL; NOTES],
            velocities_by_note: [0; NOTES],
            deferred_note_offs: NoteStack::new(),
            deferred_velocities: [DEFAULT_VELOCITY; NOTES],
            previous_controller_messages: [ControllerMessage::NONE; ControllerId::COUNT],
            zone_config,
            running_status: 0,
            is_sustain_pedal_on: false,
            is_suspended: false,
            had_reset: false,
        };
        engine.reset_available_channels();

        tracing::debug!(
            sample_rate = engine.config.sample_rate,
            queue = engine.config.message_queue_capacity,
            "engine created"
        );

        Ok((engine, ControlHandle::new(producer, shared)))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }

    /// Prepares for a new block: applies pending messages, reconfigures the
    /// zone if needed, and drops last block's output unless a reset just
    /// produced some.
    pub fn begin_processing(&mut self) {
        self.process_messages();
        self.previous_controller_messages = [ControllerMessage::NONE; ControllerId::COUNT];

        if self.is_suspended {
            self.out_events.clear();
            return;
        }

        self.update_zone_config();

        if self.had_reset {
            self.had_reset = false;
        } else {
            self.out_events.clear();
        }
    }

    /// Events produced since the last [`begin_processing`](Self::begin_processing).
    #[inline]
    pub fn out_events(&self) -> &[OutEvent] {
        &self.out_events
    }

    /// Renders the current output as sample-accurate events for a block of
    /// `block_len` samples.
    pub fn render(&self, block_len: usize, nudge_setup_events: bool) -> Vec<MidiEvent> {
        let mut out = Vec::with_capacity(self.out_events.len());
        self.render_into(block_len, nudge_setup_events, &mut out);
        out
    }

    pub fn render_into(&self, block_len: usize, nudge_setup_events: bool, out: &mut Vec<MidiEvent>) {
        render_block_into(
            &self.out_events,
            self.config.sample_rate,
            block_len,
            nudge_setup_events,
            out,
        );
    }

    /// Creates an output channel large enough for a full block of this
    /// engine's output.
    pub fn output_channel(&self) -> (MidiOutputProducer, MidiOutputConsumer) {
        midi_output_channel(self.config.out_events_capacity)
    }

    /// Renders the current output straight into `output`.
    ///
    /// Returns the number of events sent.
    pub fn render_to_output(
        &self,
        block_len: usize,
        nudge_setup_events: bool,
        output: &mut MidiOutputProducer,
    ) -> usize {
        let sent = render_block_to_output(
            &self.out_events,
            self.config.sample_rate,
            block_len,
            nudge_setup_events,
            output,
        );
        if sent < self.out_events.len() {
            tracing::warn!(
                sent,
                produced = self.out_events.len(),
                dropped_total = output.dropped_count(),
                "MIDI output fell behind"
            );
        }
        sent
    }

    /// Parses raw MIDI bytes and handles every event in them.
    ///
    /// Returns the number of bytes consumed.
    pub fn process_midi(&mut self, time_offset: f64, bytes: &[u8]) -> usize {
        dispatch_events(self, time_offset, bytes)
    }

    pub fn suspend(&mut self) {
        tracing::debug!("suspend");
        self.is_suspended = true;
    }

    pub fn resume(&mut self) {
        tracing::debug!("resume");
        self.is_suspended = false;
        self.reset();
    }

    #[inline]
    pub fn is_suspended(&self) -> bool {
        self.is_suspended
    }

    /// Stops every note and brings channels back to their initial state.
    ///
    /// A pending zone change performs the reset itself.
    pub fn reset(&mut self) {
        if self.update_zone_config() {
            return;
        }

        tracing::debug!("reset");

        self.out_events.clear();
        self.stop_all_notes();
        self.push_mcms();
        self.reset_rules();
        self.reset_available_channels();
        self.had_reset = true;
    }

    // ------------------------------------------------------------------
    // Messages and parameters
    // ------------------------------------------------------------------

    /// Applies the messages queued when the call starts.
    pub fn process_messages(&mut self) {
        let count = self.messages.occupied_len();
        for _ in 0..count {
            match self.messages.try_pop() {
                Some(message) => self.process_message(message),
                None => break,
            }
        }
    }

    /// Applies one message right away.
    pub fn process_message(&mut self, message: Message) {
        let id = message.param_id;
        match message.kind {
            MessageType::SetParam => {
                let param = self.params.param_mut(id);
                let old_value = param.value();
                param.set_ratio(message.value);
                let changed = param.value() != old_value;
                let ratio = param.ratio();
                if changed {
                    self.shared.dirty.set(true);
                }
                self.shared.publish_ratio(id, ratio);
            }
            MessageType::RefreshParam => {
                self.shared.publish_ratio(id, self.params.param(id).ratio());
            }
            MessageType::Clear => {
                if self.params.reset_all() {
                    self.shared.dirty.set(true);
                }
                for id in ParamId::all() {
                    self.shared.publish_ratio(id, self.params.param(id).ratio());
                }
            }
            MessageType::ClearDirtyFlag => self.shared.dirty.set(false),
        }
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.shared.is_dirty()
    }

    pub fn clear_dirty_flag(&mut self) {
        self.shared.dirty.set(false);
    }

    #[inline]
    pub fn active_voices_count(&self) -> usize {
        self.shared.active_voices_count()
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.shared.channel_count()
    }

    /// Member channels not holding a note.
    #[inline]
    pub fn available_channel_count(&self) -> usize {
        self.available_channels.len()
    }

    #[inline]
    pub fn is_sustain_pedal_on(&self) -> bool {
        self.is_sustain_pedal_on
    }

    pub fn param(&self, id: ParamId) -> &Param {
        self.params.param(id)
    }

    /// Current integer value of a parameter.
    pub fn param_value(&self, id: ParamId) -> i32 {
        self.params.param(id).value()
    }

    pub fn param_ratio_to_value(&self, id: ParamId, ratio: f64) -> i32 {
        self.params.param(id).ratio_to_value(ratio)
    }

    pub fn param_value_to_ratio(&self, id: ParamId, value: i32) -> f64 {
        self.params.param(id).value_to_ratio(value)
    }

    pub fn param_max_value(&self, id: ParamId) -> i32 {
        self.params.param(id).max_value()
    }

    pub fn param_default_ratio(&self, id: ParamId) -> f64 {
        self.params.param(id).default_ratio()
    }

    /// Last ratio published for the GUI thread.
    pub fn param_ratio_atomic(&self, id: ParamId) -> f64 {
        self.shared.param_ratio(id)
    }

    pub fn param_name(&self, id: ParamId) -> &'static str {
        id.name()
    }

    pub fn param_id_by_name(&self, name: &str) -> Option<ParamId> {
        ParamId::from_name(name)
    }

    pub fn try_param_id(&self, name: &str) -> Result<ParamId> {
        self.param_id_by_name(name)
            .ok_or_else(|| Error::UnknownParam(name.to_string()))
    }

    // ------------------------------------------------------------------
    // Zone and reset
    // ------------------------------------------------------------------

    /// Returns whether the zone changed, in which case every note was
    /// stopped and the new zone announced.
    fn update_zone_config(&mut self) -> bool {
        let new_config = ZoneConfig::from_params(&self.params);
        if new_config == self.zone_config {
            return false;
        }

        tracing::debug!(
            zone_type = ?new_config.zone.zone_type,
            channels = new_config.zone.member_count,
            anchor = new_config.anchor,
            below = new_config.offset_below_anchor,
            above = new_config.offset_above_anchor,
            "zone reconfigured"
        );

        self.out_events.clear();
        self.stop_all_notes();

        self.zone_config = new_config;
        self.shared
            .channel_count
            .set(usize::from(new_config.zone.member_count));

        self.reset_available_channels();
        self.push_mcms();
        self.reset_rules();
        self.had_reset = true;

        true
    }

    fn reset_available_channels(&mut self) {
        self.available_channels.clear();
        let zone = self.zone_config.zone;
        for channel in zone.member_channels() {
            self.available_channels.push(channel);
        }
    }

    fn stop_all_notes(&mut self) {
        let manager = self.manager_channel();

        if !self.note_stack.is_empty() {
            self.push_controller_event(0.0, manager, ControllerId::SUSTAIN_PEDAL, 0.0, false);
        }

        for _ in 0..NOTES {
            if self.note_stack.is_empty() {
                break;
            }
            let note = self.note_stack.top();
            let channel = self.channels_by_note[note as usize];
            self.push_controller_event(0.0, channel, ControllerId::SUSTAIN_PEDAL, 0.0, false);
            self.push_note_off(0.0, channel, note, DEFAULT_VELOCITY);
        }

        self.deferred_note_offs.clear();
        self.note_stack.clear();
        self.note_stack_below.clear();
        self.note_stack_above.clear();
        self.stats = StackStats::default();
        self.is_sustain_pedal_on = false;
        self.publish_active_voices();
    }

    /// Announces the zone layout, and an empty zone on the opposite side.
    fn push_mcms(&mut self) {
        if !self.params.send_mcm.is_on() {
            return;
        }

        let manager = self.manager_channel();
        let members = self.zone_config.zone.member_count;
        self.push_mcm(manager, members);
        self.push_mcm(self.zone_config.zone.opposite_manager_channel(), 0);
    }

    fn push_mcm(&mut self, channel: Channel, members: Byte) {
        for (controller, value) in [(RPN_MSB, 0), (RPN_LSB, MCM_RPN_LSB), (DATA_ENTRY_MSB, members)] {
            self.push_out_event(OutEvent::new(
                0.0,
                Command::ControlChange,
                channel,
                controller,
                value,
                0.0,
                false,
            ));
        }
    }

    fn reset_rules(&mut self) {
        let manager = self.manager_channel();
        for i in 0..RULES {
            let rule = &mut self.params.rules[i];
            rule.reset_last_input();

            if rule.reset_policy() == Reset::Off || rule.target() != Target::Global {
                continue;
            }

            let out = rule.output();
            let value = rule.distort(rule.init_value.ratio());
            self.push_controller_event(0.0, manager, out, value, false);
        }
    }

    // ------------------------------------------------------------------
    // Notes
    // ------------------------------------------------------------------

    #[inline]
    fn manager_channel(&self) -> Channel {
        self.zone_config.zone.manager_channel()
    }

    #[inline]
    fn is_above_anchor(&self, note: Note) -> bool {
        note >= self.zone_config.anchor
    }

    fn transpose(&self, note: Note, is_above_anchor: bool) -> Note {
        let offset = if is_above_anchor {
            self.zone_config.offset_above_anchor
        } else {
            self.zone_config.offset_below_anchor
        };
        (i32::from(note) + offset).clamp(0, i32::from(NOTE_MAX)) as Note
    }

    fn make_stats(&self) -> StackStats {
        StackStats {
            all: self.note_stack.make_stats(&self.channels_by_note),
            below: self.note_stack_below.make_stats(&self.channels_by_note),
            above: self.note_stack_above.make_stats(&self.channels_by_note),
        }
    }

    fn publish_active_voices(&self) {
        self.shared.active_voices.set(self.note_stack.len());
    }

    fn push_out_event(&mut self, event: OutEvent) {
        if event.channel > CHANNEL_MAX {
            return;
        }
        self.out_events.push(event);
    }

    fn push_controller_event(
        &mut self,
        time_offset: f64,
        channel: Channel,
        controller: ControllerId,
        value: f64,
        is_pre_note_on_setup: bool,
    ) {
        let event = if controller == ControllerId::PITCH_WHEEL {
            let word = float_to_word(value);
            OutEvent::new(
                time_offset,
                Command::PitchBendChange,
                channel,
                (word & 0x7f) as Byte,
                (word >> 7) as Byte,
                value,
                is_pre_note_on_setup,
            )
        } else if controller == ControllerId::CHANNEL_PRESSURE {
            OutEvent::new(
                time_offset,
                Command::ChannelPressure,
                channel,
                float_to_byte(value),
                0,
                value,
                is_pre_note_on_setup,
            )
        } else if let Some(cc) = controller.midi_cc() {
            OutEvent::new(
                time_offset,
                Command::ControlChange,
                channel,
                cc,
                float_to_byte(value),
                value,
                is_pre_note_on_setup,
            )
        } else {
            return;
        };

        self.push_out_event(event);
    }

    fn push_note_on(&mut self, time_offset: f64, channel: Channel, note: Note, velocity: Byte) {
        let old_stats = self.stats;
        let is_first_note = self.note_stack.is_empty();

        self.note_stack.push(note);
        self.channels_by_note[note as usize] = channel;
        self.velocities_by_note[note as usize] = velocity;

        let is_above_anchor = self.is_above_anchor(note);
        if is_above_anchor {
            self.note_stack_above.push(note);
        } else {
            self.note_stack_below.push(note);
        }
        self.stats = self.make_stats();

        self.push_resets_for_new_note(
            time_offset,
            channel,
            is_first_note,
            is_above_anchor,
            &old_stats,
            true,
        );

        self.push_out_event(OutEvent::new(
            time_offset,
            Command::NoteOn,
            channel,
            self.transpose(note, is_above_anchor),
            velocity,
            byte_to_float(velocity),
            false,
        ));

        // Some synths ignore controllers on a channel with no sounding note,
        // so the setup is repeated after the Note-On.
        self.push_resets_for_new_note(
            time_offset,
            channel,
            is_first_note,
            is_above_anchor,
            &old_stats,
            false,
        );

        self.publish_active_voices();
    }

    fn push_resets_for_new_note(
        &mut self,
        time_offset: f64,
        new_note_channel: Channel,
        is_first_note: bool,
        is_above_anchor: bool,
        old_stats: &StackStats,
        is_pre_note_on_setup: bool,
    ) {
        let manager = self.manager_channel();
        let new_stats = self.stats;

        for i in 0..RULES {
            let rule = &self.params.rules[i];
            if !rule.needs_reset_for_note_event(is_above_anchor) {
                continue;
            }

            let value = rule.reset_value();
            let out = rule.output();
            let target = rule.target();
            let fallback = rule.fallback.is_on();

            if is_pre_note_on_setup {
                self.reset_outdated_target(
                    target,
                    time_offset,
                    new_note_channel,
                    old_stats,
                    &new_stats,
                    value,
                    out,
                );
            }

            if is_first_note && fallback {
                self.push_controller_event(time_offset, manager, out, value, is_pre_note_on_setup);
            }

            self.push_controller_event(
                time_offset,
                new_note_channel,
                out,
                value,
                is_pre_note_on_setup,
            );
        }
    }

    /// Resets the channel that held the target's role in `a` when the role
    /// moved to another channel in `b`.
    #[allow(clippy::too_many_arguments)]
    fn reset_outdated_target(
        &mut self,
        target: Target,
        time_offset: f64,
        new_note_channel: Channel,
        a: &StackStats,
        b: &StackStats,
        value: f64,
        out: ControllerId,
    ) {
        // Split-wide and global targets do not follow polyphonic roles.
        let Some((region, role)) = target.position() else {
            return;
        };

        let channel = a.channel(region, role);
        if channel == b.channel(region, role) {
            return;
        }

        if channel != INVALID_CHANNEL && channel != new_note_channel {
            self.push_controller_event(time_offset, channel, out, value, false);
        }
    }

    fn push_note_off(&mut self, time_offset: f64, channel: Channel, note: Note, velocity: Byte) {
        let velocity = if self.params.override_release_velocity.is_on() {
            self.velocities_by_note[note as usize]
        } else {
            velocity
        };
        let was_above_anchor = self.is_above_anchor(note);

        self.push_out_event(OutEvent::new(
            time_offset,
            Command::NoteOff,
            channel,
            self.transpose(note, was_above_anchor),
            velocity,
            byte_to_float(velocity),
            false,
        ));

        let old_stats = self.stats;

        self.note_stack.remove(note);
        self.note_stack_above.remove(note);
        self.note_stack_below.remove(note);
        self.stats = self.make_stats();

        let new_stats = self.stats;
        for i in 0..RULES {
            let rule = &self.params.rules[i];
            if !rule.needs_reset_for_note_event(was_above_anchor) {
                continue;
            }

            let value = rule.reset_value();
            let out = rule.output();
            let target = rule.target();
            self.reset_outdated_target(
                target,
                time_offset,
                INVALID_CHANNEL,
                &new_stats,
                &old_stats,
                value,
                out,
            );
        }

        self.deferred_note_offs.remove(note);
        self.publish_active_voices();
    }

    fn handle_note_off(&mut self, time_offset: f64, note: Note, velocity: Byte) {
        let channel = self.channels_by_note[note as usize];
        self.push_note_off(time_offset, channel, note, velocity);
        if self.zone_config.zone.is_member_channel(channel) {
            self.available_channels.push(channel);
        }
    }

    fn process_deferred_note_offs(&mut self, time_offset: f64) {
        while !self.deferred_note_offs.is_empty() {
            let note = self.deferred_note_offs.pop();
            let velocity = self.deferred_velocities[note as usize];
            self.handle_note_off(time_offset, note, velocity);
        }
    }

    fn steal_note(&self) -> Option<Note> {
        let note = match self.params.excess_note_handling() {
            ExcessNoteHandling::Ignore => return None,
            ExcessNoteHandling::StealLowest => self.note_stack.lowest(),
            ExcessNoteHandling::StealHighest => self.note_stack.highest(),
            ExcessNoteHandling::StealOldest => self.note_stack.oldest(),
            ExcessNoteHandling::StealNewest => self.note_stack.top(),
        };
        (note <= NOTE_MAX).then_some(note)
    }

    // ------------------------------------------------------------------
    // Controllers
    // ------------------------------------------------------------------

    /// Hosts may send the same controller event once per channel; only the
    /// first copy at a given time offset is handled.
    fn is_repeated_controller_message(
        &mut self,
        controller: ControllerId,
        time_offset: f64,
        value: Word,
    ) -> bool {
        let message = ControllerMessage { time_offset, value };
        let previous = &mut self.previous_controller_messages[controller.index()];
        if *previous == message {
            return true;
        }
        *previous = message;
        false
    }

    fn process_controller_event(&mut self, time_offset: f64, controller: ControllerId, value: f64) {
        let manager = self.manager_channel();
        let is_note_stack_empty = self.note_stack.is_empty();
        let mut matched = false;
        let mut targets = [INVALID_CHANNEL; CHANNELS];

        for i in 0..RULES {
            let rule = &mut self.params.rules[i];
            let input = rule.input();

            if input == ControllerId::MIDI_LEARN {
                rule.in_cc.set_value(i32::from(controller.value()));
                let ratio = rule.in_cc.ratio();
                self.shared.dirty.set(true);
                if let Some(id) = ParamId::rule(i, RuleParam::In) {
                    self.shared.publish_ratio(id, ratio);
                }
                tracing::debug!(rule = i + 1, controller = controller.value(), "learned controller");
            } else if input != controller {
                continue;
            }

            matched = true;
            rule.last_input_value = value;

            let out = rule.output();
            let target = rule.target();
            let fallback = rule.fallback.is_on();
            let out_value = rule.distort(value);

            let count = if is_note_stack_empty && fallback {
                targets[0] = manager;
                1
            } else {
                self.collect_target_channels(target, &mut targets)
            };

            for &channel in &targets[..count] {
                self.push_controller_event(time_offset, channel, out, out_value, false);
            }
        }

        if !matched {
            self.push_controller_event(time_offset, manager, controller, value, false);
        }

        if self.params.sustain_pedal_handling.is_on() && controller == ControllerId::SUSTAIN_PEDAL {
            self.is_sustain_pedal_on = value >= 0.5;
            if !self.is_sustain_pedal_on {
                self.process_deferred_note_offs(time_offset);
            }
        }
    }

    fn collect_target_channels(&self, target: Target, targets: &mut [Channel; CHANNELS]) -> usize {
        match target {
            Target::Global => {
                targets[0] = self.manager_channel();
                1
            }
            Target::AllBelowAnchor => self
                .note_stack_below
                .collect_active_channels(&self.channels_by_note, targets),
            Target::AllAboveAnchor => self
                .note_stack_above
                .collect_active_channels(&self.channels_by_note, targets),
            _ => {
                let Some((region, role)) = target.position() else {
                    return 0;
                };
                let stack = match region {
                    Region::All => &self.note_stack,
                    Region::Below => &self.note_stack_below,
                    Region::Above => &self.note_stack_above,
                };
                if stack.is_empty() {
                    return 0;
                }
                let note = match role {
                    Role::Lowest => stack.lowest(),
                    Role::Highest => stack.highest(),
                    Role::Oldest => stack.oldest(),
                    Role::Newest => stack.top(),
                };
                targets[0] = self.channels_by_note[note as usize];
                1
            }
        }
    }
}

impl MidiEventHandler for Engine {
    fn running_status(&self) -> Byte {
        self.running_status
    }

    fn set_running_status(&mut self, status: Byte) {
        self.running_status = status;
    }

    /// The input channel is ignored: the whole input is treated as one voice
    /// pool.
    fn note_on(&mut self, time_offset: f64, _channel: Channel, note: Note, velocity: Byte) {
        if self.is_suspended || note > NOTE_MAX {
            return;
        }

        if self.note_stack.find(note) {
            if self.params.excess_note_handling() == ExcessNoteHandling::Ignore {
                return;
            }
            let channel = self.channels_by_note[note as usize];
            self.push_note_off(time_offset, channel, note, DEFAULT_VELOCITY);
            self.push_note_on(time_offset, channel, note, velocity);
            return;
        }

        match self.available_channels.pop() {
            Some(channel) => self.push_note_on(time_offset, channel, note, velocity),
            None => {
                let Some(steal_note) = self.steal_note() else {
                    return;
                };
                let channel = self.channels_by_note[steal_note as usize];
                tracing::trace!(steal_note, note, channel, "stealing channel");
                self.push_note_off(time_offset, channel, steal_note, DEFAULT_VELOCITY);
                self.push_note_on(time_offset, channel, note, velocity);
            }
        }
    }

    fn note_off(&mut self, time_offset: f64, _channel: Channel, note: Note, velocity: Byte) {
        if self.is_suspended || !self.note_stack.find(note) {
            return;
        }

        if self.params.sustain_pedal_handling.is_on() && self.is_sustain_pedal_on {
            self.deferred_note_offs.push(note);
            self.deferred_velocities[note as usize] = velocity;
        } else {
            self.handle_note_off(time_offset, note, velocity);
        }
    }

    fn control_change(
        &mut self,
        time_offset: f64,
        _channel: Channel,
        controller: Controller,
        value: Byte,
    ) {
        let Some(controller) = ControllerId::new(controller).filter(|c| c.midi_cc().is_some())
        else {
            return;
        };
        if self.is_suspended
            || self.is_repeated_controller_message(controller, time_offset, Word::from(value))
        {
            return;
        }
        self.process_controller_event(time_offset, controller, byte_to_float(value));
    }

    fn channel_pressure(&mut self, time_offset: f64, _channel: Channel, pressure: Byte) {
        let controller = ControllerId::CHANNEL_PRESSURE;
        if self.is_suspended
            || self.is_repeated_controller_message(controller, time_offset, Word::from(pressure))
        {
            return;
        }
        self.process_controller_event(time_offset, controller, byte_to_float(pressure));
    }

    fn pitch_wheel_change(&mut self, time_offset: f64, _channel: Channel, value: Word) {
        let controller = ControllerId::PITCH_WHEEL;
        if self.is_suspended || self.is_repeated_controller_message(controller, time_offset, value) {
            return;
        }
        self.process_controller_event(time_offset, controller, mpe_midi::word_to_float(value));
    }
}

impl MessageSink for Engine {
    /// Applies the message synchronously.
    fn push_message(&mut self, message: Message) -> bool {
        self.process_message(message);
        true
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("zone", &self.zone_config.zone)
            .field("anchor", &self.zone_config.anchor)
            .field("active_voices", &self.note_stack.len())
            .field("available_channels", &self.available_channels.len())
            .field("out_events", &self.out_events.len())
            .field("is_suspended", &self.is_suspended)
            .finish()
    }
}
