//! Integration tests for mpe-engine.
//!
//! These drive the engine through its public surface only: MIDI callbacks,
//! messages from a control handle, and block boundaries.

use approx::assert_relative_eq;
use mpe_core::EngineConfig;
use mpe_engine::{
    ControlHandle, ControllerId, Engine, ExcessNoteHandling, Message, MidiEventHandler, OutEvent,
    ParamId, Reset, RuleParam, Target, ZoneType,
};
use mpe_midi::Command;

fn new_engine() -> (Engine, ControlHandle) {
    Engine::new(EngineConfig::default()).expect("Failed to create engine")
}

/// Applies parameter values directly, then runs the block boundary twice so
/// any zone change has been applied and its output flushed.
fn configure(engine: &mut Engine, values: &[(ParamId, i32)]) {
    for &(id, value) in values {
        let ratio = engine.param_value_to_ratio(id, value);
        engine.process_message(Message::set_param(id, ratio));
    }
    engine.begin_processing();
    engine.begin_processing();
}

fn rule(index: usize, param: RuleParam) -> ParamId {
    ParamId::rule(index, param).unwrap()
}

/// (command, channel, note, velocity) of every Note-On and Note-Off.
fn note_events(events: &[OutEvent]) -> Vec<(Command, u8, u8, u8)> {
    events
        .iter()
        .filter(|e| matches!(e.command, Command::NoteOn | Command::NoteOff))
        .map(|e| (e.command, e.channel, e.data1, e.data2))
        .collect()
}

fn of_command(events: &[OutEvent], command: Command) -> Vec<OutEvent> {
    events
        .iter()
        .filter(|e| e.command == command)
        .copied()
        .collect()
}

// ---------------------------------------------------------------------------
// 1. Channel allocation
// ---------------------------------------------------------------------------

/// An upper zone hands out member channels downwards from channel 15.
#[test]
fn test_upper_zone_allocation() {
    let (mut engine, mut handle) = new_engine();

    assert!(handle.set_param(ParamId::Z1TYP, 1.0));
    assert!(handle.set_param(ParamId::Z1CHN, 9.0 / 14.0));
    engine.begin_processing();

    assert_eq!(engine.channel_count(), 10);
    assert_eq!(handle.channel_count(), 10);

    engine.begin_processing();
    engine.note_on(0.0, 0, 60, 100);
    engine.note_on(0.0, 0, 62, 100);
    engine.note_on(0.0, 0, 64, 100);

    assert_eq!(
        note_events(engine.out_events()),
        vec![
            (Command::NoteOn, 14, 60, 100),
            (Command::NoteOn, 13, 62, 100),
            (Command::NoteOn, 12, 64, 100),
        ]
    );
    assert_eq!(engine.active_voices_count(), 3);
    assert_eq!(engine.available_channel_count(), 7);
}

/// A released channel goes to the back of the queue.
#[test]
fn test_released_channel_reused_last() {
    let (mut engine, _) = new_engine();
    configure(&mut engine, &[(ParamId::Z1CHN, 3)]);

    engine.note_on(0.0, 0, 60, 100);
    engine.note_on(0.0, 0, 62, 100);
    engine.note_off(0.0, 0, 60, 64);
    engine.note_on(0.0, 0, 64, 100);
    engine.note_on(0.0, 0, 65, 100);

    let ons: Vec<_> = note_events(engine.out_events())
        .into_iter()
        .filter(|e| e.0 == Command::NoteOn)
        .map(|e| (e.1, e.2))
        .collect();
    assert_eq!(ons, vec![(1, 60), (2, 62), (3, 64), (1, 65)]);
}

/// With every channel busy, the oldest note gives up its channel.
#[test]
fn test_steal_oldest() {
    let (mut engine, _) = new_engine();
    configure(&mut engine, &[(ParamId::Z1TYP, 1), (ParamId::Z1CHN, 3)]);

    engine.note_on(0.0, 0, 60, 100);
    engine.note_on(0.0, 0, 72, 100);
    engine.note_on(0.0, 0, 84, 100);
    engine.begin_processing();

    engine.note_on(0.0, 0, 96, 100);
    assert_eq!(
        note_events(engine.out_events()),
        vec![(Command::NoteOff, 14, 60, 64), (Command::NoteOn, 14, 96, 100)]
    );
    assert_eq!(engine.active_voices_count(), 3);
    assert_eq!(engine.available_channel_count(), 0);
}

/// Each stealing policy picks its own victim.
#[test]
fn test_steal_policies() {
    let cases = [
        (ExcessNoteHandling::StealLowest, 60, 2),
        (ExcessNoteHandling::StealHighest, 72, 1),
        (ExcessNoteHandling::StealOldest, 72, 1),
        (ExcessNoteHandling::StealNewest, 60, 2),
    ];

    for (policy, victim, channel) in cases {
        let (mut engine, _) = new_engine();
        configure(
            &mut engine,
            &[(ParamId::Z1CHN, 2), (ParamId::Z1ENH, policy as i32)],
        );

        engine.note_on(0.0, 0, 72, 100);
        engine.note_on(0.0, 0, 60, 100);
        engine.begin_processing();
        engine.note_on(0.0, 0, 66, 100);

        assert_eq!(
            note_events(engine.out_events()),
            vec![
                (Command::NoteOff, channel, victim, 64),
                (Command::NoteOn, channel, 66, 100),
            ],
            "{:?}",
            policy
        );
    }
}

/// Ignoring excess notes drops both new notes and re-triggers.
#[test]
fn test_ignore_excess_notes() {
    let (mut engine, _) = new_engine();
    configure(
        &mut engine,
        &[
            (ParamId::Z1CHN, 1),
            (ParamId::Z1ENH, ExcessNoteHandling::Ignore as i32),
        ],
    );

    engine.note_on(0.0, 0, 60, 100);
    engine.begin_processing();
    engine.note_on(0.0, 0, 62, 100);
    engine.note_on(0.0, 0, 60, 90);

    assert!(engine.out_events().is_empty());
    assert_eq!(engine.active_voices_count(), 1);
}

/// A held note played again is restarted on its own channel.
#[test]
fn test_retrigger_same_channel() {
    let (mut engine, _) = new_engine();
    engine.begin_processing();

    engine.note_on(0.0, 0, 60, 100);
    engine.note_on(0.0, 0, 62, 100);
    engine.begin_processing();
    engine.note_on(0.0, 0, 60, 80);

    assert_eq!(
        note_events(engine.out_events()),
        vec![(Command::NoteOff, 1, 60, 64), (Command::NoteOn, 1, 60, 80)]
    );
    assert_eq!(engine.active_voices_count(), 2);
    assert_eq!(engine.available_channel_count(), 13);
}

// ---------------------------------------------------------------------------
// 2. Controller rules
// ---------------------------------------------------------------------------

/// Default rules route pitch bend and pressure to the newest note's channel.
#[test]
fn test_default_rules_follow_newest_note() {
    let (mut engine, _) = new_engine();
    engine.begin_processing();
    engine.note_on(0.0, 0, 60, 100);
    engine.note_on(0.0, 0, 64, 100);
    engine.begin_processing();

    engine.pitch_wheel_change(0.0, 0, 10000);
    engine.channel_pressure(0.0, 0, 30);

    let events = engine.out_events();
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].command, Command::PitchBendChange);
    assert_eq!(events[0].channel, 2);
    assert_eq!((events[0].data1, events[0].data2), (0x10, 0x4e));

    assert_eq!(events[1].command, Command::ChannelPressure);
    assert_eq!(events[1].channel, 2);
    assert_eq!(events[1].data1, 30);
}

/// A rule can translate one controller into another.
#[test]
fn test_rule_remaps_controller() {
    let (mut engine, _) = new_engine();
    configure(&mut engine, &[(rule(2, RuleParam::In), 1)]);

    engine.note_on(0.0, 0, 60, 100);
    engine.begin_processing();
    engine.control_change(0.0, 0, 1, 110);

    let events = engine.out_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].command, Command::ControlChange);
    assert_eq!((events[0].channel, events[0].data1, events[0].data2), (1, 74, 110));
}

/// Controllers no rule listens to go to the manager channel unchanged.
#[test]
fn test_unmatched_controller_forwarded_to_manager() {
    let (mut engine, _) = new_engine();
    engine.begin_processing();
    engine.note_on(0.0, 0, 60, 100);
    engine.begin_processing();

    engine.control_change(0.25, 3, 7, 99);

    let events = engine.out_events();
    assert_eq!(events.len(), 1);
    assert_eq!(
        (events[0].command, events[0].channel, events[0].data1, events[0].data2),
        (Command::ControlChange, 0, 7, 99)
    );
    assert_eq!(events[0].time_offset, 0.25);
}

/// The midpoint bends the response curve around its centre.
#[test]
fn test_midpoint_reshapes_values() {
    let (mut engine, _) = new_engine();
    configure(&mut engine, &[(rule(0, RuleParam::Midpoint), 15000)]);

    engine.note_on(0.0, 0, 60, 100);
    engine.begin_processing();

    engine.pitch_wheel_change(0.0, 0, 4096);
    engine.pitch_wheel_change(0.1, 0, 12288);

    let bends = of_command(engine.out_events(), Command::PitchBendChange);
    assert_eq!(bends.len(), 2);
    assert_eq!((bends[0].data1, bends[0].data2), (0x00, 0x30));
    assert_relative_eq!(bends[0].value, 0.375, epsilon = 1e-3);
    assert_relative_eq!(bends[1].value, 0.875, epsilon = 1e-3);
}

/// Inverting flips the value range.
#[test]
fn test_invert() {
    let (mut engine, _) = new_engine();
    configure(&mut engine, &[(rule(1, RuleParam::Invert), 1)]);

    engine.note_on(0.0, 0, 60, 100);
    engine.begin_processing();
    engine.channel_pressure(0.0, 0, 96);

    let pressure = of_command(engine.out_events(), Command::ChannelPressure);
    assert_eq!(pressure.len(), 1);
    assert_eq!(pressure[0].data1, 0x1f);
}

/// Split-wide targets reach every note on their side of the anchor.
#[test]
fn test_all_above_anchor_target() {
    let (mut engine, _) = new_engine();
    configure(
        &mut engine,
        &[(rule(1, RuleParam::Target), Target::AllAboveAnchor as i32)],
    );

    engine.note_on(0.0, 0, 48, 100);
    engine.note_on(0.0, 0, 60, 100);
    engine.note_on(0.0, 0, 72, 100);
    engine.begin_processing();
    engine.channel_pressure(0.0, 0, 64);

    let mut channels: Vec<u8> = of_command(engine.out_events(), Command::ChannelPressure)
        .iter()
        .map(|e| e.channel)
        .collect();
    channels.sort_unstable();
    assert_eq!(channels, vec![2, 3]);
}

/// Global targets always use the manager channel.
#[test]
fn test_global_target() {
    let (mut engine, _) = new_engine();
    configure(
        &mut engine,
        &[(rule(0, RuleParam::Target), Target::Global as i32)],
    );

    engine.pitch_wheel_change(0.0, 0, 0);
    let events = engine.out_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].channel, 0);
}

/// With no note held, a fallback rule talks to the manager channel.
#[test]
fn test_fallback_to_manager() {
    let (mut engine, _) = new_engine();
    engine.begin_processing();
    engine.pitch_wheel_change(0.0, 0, 16383);
    assert!(engine.out_events().is_empty());

    configure(&mut engine, &[(rule(0, RuleParam::Fallback), 1)]);
    engine.pitch_wheel_change(0.0, 0, 16383);
    let events = engine.out_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].channel, 0);
    assert_eq!((events[0].data1, events[0].data2), (0x7f, 0x7f));

    // The first note also resets the manager channel.
    engine.begin_processing();
    engine.note_on(0.0, 0, 60, 100);
    let manager_bends = of_command(engine.out_events(), Command::PitchBendChange)
        .into_iter()
        .filter(|e| e.channel == 0)
        .count();
    assert_eq!(manager_bends, 2);
}

/// Identical controller events in one block are handled once.
#[test]
fn test_repeated_controller_deduplicated() {
    let (mut engine, _) = new_engine();
    engine.begin_processing();
    engine.note_on(0.0, 0, 60, 100);
    engine.begin_processing();

    for channel in 0..16 {
        engine.pitch_wheel_change(0.5, channel, 9000);
    }
    engine.pitch_wheel_change(0.6, 0, 9000);
    engine.pitch_wheel_change(0.6, 0, 9001);

    assert_eq!(of_command(engine.out_events(), Command::PitchBendChange).len(), 3);
}

// ---------------------------------------------------------------------------
// 3. Note-On setup and resets
// ---------------------------------------------------------------------------

/// Controller state is sent both before and after a Note-On.
#[test]
fn test_setup_around_note_on() {
    let (mut engine, _) = new_engine();
    configure(&mut engine, &[]);
    engine.process_message(Message::set_param(rule(0, RuleParam::InitValue), 0.5));

    // With no note sounding the bend goes nowhere, and the reset to the
    // initial value overrides it.
    engine.pitch_wheel_change(0.0, 0, 16383);
    assert!(engine.out_events().is_empty());

    engine.note_on(0.0, 0, 60, 100);

    let events = engine.out_events();
    let note_on = events
        .iter()
        .position(|e| e.command == Command::NoteOn)
        .unwrap();

    let bends: Vec<(usize, &OutEvent)> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.command == Command::PitchBendChange)
        .collect();
    assert_eq!(bends.len(), 2);

    let (before, pre) = bends[0];
    let (after, post) = bends[1];
    assert!(before < note_on && after > note_on);
    assert!(pre.is_pre_note_on_setup);
    assert!(!post.is_pre_note_on_setup);
    for bend in [pre, post] {
        assert_eq!(bend.channel, 1);
        assert_eq!((bend.data1, bend.data2), (0x00, 0x40));
    }
}

/// When the newest note changes, the previous holder of the role is reset.
#[test]
fn test_role_handover_resets_previous_channel() {
    let (mut engine, _) = new_engine();
    engine.begin_processing();
    engine.note_on(0.0, 0, 60, 100);
    engine.begin_processing();
    engine.note_on(0.0, 0, 64, 100);

    let bends: Vec<(u8, bool)> = of_command(engine.out_events(), Command::PitchBendChange)
        .iter()
        .map(|e| (e.channel, e.is_pre_note_on_setup))
        .collect();
    assert_eq!(bends, vec![(1, false), (2, true), (2, false)]);

    // Releasing the newest note hands the role back to channel 1.
    engine.begin_processing();
    engine.note_off(0.0, 0, 64, 64);
    let bends: Vec<u8> = of_command(engine.out_events(), Command::PitchBendChange)
        .iter()
        .map(|e| e.channel)
        .collect();
    assert_eq!(bends, vec![1]);
}

/// Resetting to the last value replays what the controller last sent.
#[test]
fn test_reset_to_last_value() {
    let (mut engine, _) = new_engine();
    configure(&mut engine, &[(rule(1, RuleParam::Reset), Reset::Last as i32)]);

    engine.channel_pressure(0.0, 0, 100);
    engine.begin_processing();
    engine.note_on(0.0, 0, 60, 100);

    let pressure = of_command(engine.out_events(), Command::ChannelPressure);
    assert_eq!(pressure.len(), 2);
    assert!(pressure.iter().all(|e| e.data1 == 100));
}

/// With resets off, a new note gets no setup for that rule.
#[test]
fn test_reset_off() {
    let (mut engine, _) = new_engine();
    configure(&mut engine, &[(rule(1, RuleParam::Reset), Reset::Off as i32)]);

    engine.note_on(0.0, 0, 60, 100);
    assert!(of_command(engine.out_events(), Command::ChannelPressure).is_empty());
    assert_eq!(of_command(engine.out_events(), Command::PitchBendChange).len(), 2);
}

// ---------------------------------------------------------------------------
// 4. Anchor, transposition, release velocity
// ---------------------------------------------------------------------------

/// Each side of the anchor is transposed separately and clamped.
#[test]
fn test_split_transposition() {
    let (mut engine, _) = new_engine();
    configure(
        &mut engine,
        &[(ParamId::Z1TRB, 36), (ParamId::Z1TRA, 60)],
    );

    engine.note_on(0.0, 0, 48, 100);
    engine.note_on(0.0, 0, 60, 100);
    engine.note_on(0.0, 0, 120, 100);
    engine.note_off(0.0, 0, 48, 64);

    assert_eq!(
        note_events(engine.out_events()),
        vec![
            (Command::NoteOn, 1, 36, 100),
            (Command::NoteOn, 2, 72, 100),
            (Command::NoteOn, 3, 127, 100),
            (Command::NoteOff, 1, 36, 64),
        ]
    );
}

/// Release velocity can be replaced by the velocity the note started with.
#[test]
fn test_override_release_velocity() {
    let (mut engine, _) = new_engine();
    configure(&mut engine, &[(ParamId::Z1ORV, 1)]);

    engine.note_on(0.0, 0, 60, 99);
    engine.note_off(0.0, 0, 60, 10);

    assert_eq!(
        note_events(engine.out_events()),
        vec![(Command::NoteOn, 1, 60, 99), (Command::NoteOff, 1, 60, 99)]
    );
}

// ---------------------------------------------------------------------------
// 5. Sustain pedal
// ---------------------------------------------------------------------------

/// Note-Offs wait for the pedal when sustain handling is on.
#[test]
fn test_sustain_pedal_defers_note_off() {
    let (mut engine, _) = new_engine();
    configure(
        &mut engine,
        &[
            (ParamId::Z1SUS, 1),
            (ParamId::Z1TRB, 32),
            (ParamId::Z1TRA, 32),
        ],
    );

    engine.note_on(0.0, 0, 60, 100);
    engine.begin_processing();

    engine.control_change(0.0, 0, 64, 127);
    assert!(engine.is_sustain_pedal_on());
    engine.note_off(0.1, 0, 60, 50);

    let events = engine.out_events();
    assert_eq!(events.len(), 1);
    assert_eq!((events[0].channel, events[0].data1, events[0].data2), (0, 64, 127));
    assert_eq!(engine.active_voices_count(), 1);

    engine.begin_processing();
    engine.control_change(0.2, 0, 64, 0);

    let events = engine.out_events();
    assert_eq!(events.len(), 2);
    assert_eq!((events[0].channel, events[0].data1, events[0].data2), (0, 64, 0));
    assert_eq!(
        (events[1].command, events[1].channel, events[1].data1, events[1].data2),
        (Command::NoteOff, 1, 44, 50)
    );
    assert_eq!(engine.active_voices_count(), 0);
    assert_eq!(engine.available_channel_count(), 15);
}

/// A note struck again while its release waits on the pedal is retriggered
/// on its own channel, and the pedal release owes it nothing.
#[test]
fn test_sustain_retrigger_cancels_deferred_note_off() {
    let (mut engine, _) = new_engine();
    configure(
        &mut engine,
        &[
            (ParamId::Z1SUS, 1),
            (ParamId::Z1TRB, 32),
            (ParamId::Z1TRA, 32),
        ],
    );

    engine.note_on(0.0, 0, 60, 100);
    engine.begin_processing();

    engine.control_change(0.0, 0, 64, 127);
    engine.note_off(0.1, 0, 60, 50);
    assert!(note_events(engine.out_events()).is_empty());

    engine.begin_processing();
    engine.note_on(0.2, 0, 60, 100);
    assert_eq!(
        note_events(engine.out_events()),
        vec![(Command::NoteOff, 1, 44, 64), (Command::NoteOn, 1, 44, 100)]
    );
    assert_eq!(engine.active_voices_count(), 1);

    engine.begin_processing();
    engine.control_change(0.3, 0, 64, 0);

    let events = engine.out_events();
    assert_eq!(events.len(), 1);
    assert_eq!(
        (events[0].command, events[0].channel, events[0].data1, events[0].data2),
        (Command::ControlChange, 0, 64, 0)
    );
    assert!(!engine.is_sustain_pedal_on());
    assert_eq!(engine.active_voices_count(), 1);
}

/// Without sustain handling the pedal is only forwarded.
#[test]
fn test_sustain_pedal_passthrough() {
    let (mut engine, _) = new_engine();
    engine.begin_processing();
    engine.note_on(0.0, 0, 60, 100);
    engine.control_change(0.0, 0, 64, 127);
    engine.note_off(0.0, 0, 60, 64);

    assert!(!engine.is_sustain_pedal_on());
    assert_eq!(note_events(engine.out_events()).len(), 2);
}

// ---------------------------------------------------------------------------
// 6. Lifecycle
// ---------------------------------------------------------------------------

/// Resuming stops every sounding note.
#[test]
fn test_resume_stops_notes() {
    let (mut engine, _) = new_engine();
    engine.begin_processing();
    engine.note_on(0.0, 0, 60, 100);

    engine.suspend();
    engine.begin_processing();
    engine.note_on(0.0, 0, 62, 100);
    assert!(engine.out_events().is_empty());

    engine.resume();
    let events: Vec<_> = engine
        .out_events()
        .iter()
        .map(|e| (e.command, e.channel, e.data1, e.data2))
        .collect();
    assert_eq!(
        events,
        vec![
            (Command::ControlChange, 0, 64, 0),
            (Command::ControlChange, 1, 64, 0),
            (Command::NoteOff, 1, 60, 64),
        ]
    );

    // The reset's output survives the next block boundary.
    engine.begin_processing();
    assert_eq!(engine.out_events().len(), 3);
    engine.begin_processing();
    assert!(engine.out_events().is_empty());
    assert_eq!(engine.active_voices_count(), 0);
}

/// MCM announces the zone and clears the opposite one.
#[test]
fn test_mcm_on_reset() {
    let (mut engine, _) = new_engine();
    configure(&mut engine, &[(ParamId::MCM, 1)]);

    engine.reset();
    let events: Vec<_> = engine
        .out_events()
        .iter()
        .map(|e| (e.channel, e.data1, e.data2))
        .collect();
    assert_eq!(
        events,
        vec![
            (0, 101, 0),
            (0, 100, 6),
            (0, 6, 15),
            (15, 101, 0),
            (15, 100, 6),
            (15, 6, 0),
        ]
    );

    // Resetting again produces the same output.
    engine.begin_processing();
    engine.reset();
    assert_eq!(engine.out_events().len(), 6);
}

/// Changing the zone stops notes on the old layout and announces the new one.
#[test]
fn test_zone_change() {
    let (mut engine, mut handle) = new_engine();
    configure(&mut engine, &[(ParamId::MCM, 1)]);
    engine.note_on(0.0, 0, 60, 100);

    handle.set_param(ParamId::Z1TYP, 1.0);
    handle.set_param(ParamId::Z1CHN, 4.0 / 14.0);
    engine.begin_processing();

    let events: Vec<_> = engine
        .out_events()
        .iter()
        .map(|e| (e.command, e.channel, e.data1, e.data2))
        .collect();
    assert_eq!(
        events,
        vec![
            (Command::ControlChange, 0, 64, 0),
            (Command::ControlChange, 1, 64, 0),
            (Command::NoteOff, 1, 60, 64),
            (Command::ControlChange, 15, 101, 0),
            (Command::ControlChange, 15, 100, 6),
            (Command::ControlChange, 15, 6, 5),
            (Command::ControlChange, 0, 101, 0),
            (Command::ControlChange, 0, 100, 6),
            (Command::ControlChange, 0, 6, 0),
        ]
    );
    assert_eq!(handle.channel_count(), 5);
    assert_eq!(engine.available_channel_count(), 5);
}

/// Global rules with a reset send their initial value after a reset.
#[test]
fn test_global_rule_reset() {
    let (mut engine, _) = new_engine();
    configure(
        &mut engine,
        &[(rule(2, RuleParam::Target), Target::Global as i32)],
    );

    engine.reset();
    let events = engine.out_events();
    assert_eq!(events.len(), 1);
    assert_eq!((events[0].channel, events[0].data1, events[0].data2), (0, 74, 64));
}

/// Raw bytes go through the running-status parser.
#[test]
fn test_process_raw_midi() {
    let (mut engine, _) = new_engine();
    engine.begin_processing();

    let consumed = engine.process_midi(0.0, &[0x90, 60, 100, 62, 100, 0x80, 60, 0]);
    assert_eq!(consumed, 8);
    assert_eq!(
        note_events(engine.out_events()),
        vec![
            (Command::NoteOn, 1, 60, 100),
            (Command::NoteOn, 2, 62, 100),
            (Command::NoteOff, 1, 60, 0),
        ]
    );
}

// ---------------------------------------------------------------------------
// 7. Messages and published state
// ---------------------------------------------------------------------------

/// Parameter changes mark the engine dirty until the flag is cleared.
#[test]
fn test_dirty_flag() {
    let (mut engine, mut handle) = new_engine();
    assert!(!handle.is_dirty());

    handle.set_param(ParamId::Z1ANC, 1.0);
    engine.begin_processing();
    assert!(handle.is_dirty());
    assert_relative_eq!(handle.param_ratio_atomic(ParamId::Z1ANC), 1.0);
    assert_eq!(engine.param_value(ParamId::Z1ANC), 127);

    handle.clear_dirty_flag();
    engine.begin_processing();
    assert!(!engine.is_dirty());

    // Setting the same value again changes nothing.
    handle.set_param(ParamId::Z1ANC, 1.0);
    engine.begin_processing();
    assert!(!engine.is_dirty());

    handle.clear();
    engine.begin_processing();
    assert!(engine.is_dirty());
    assert_eq!(engine.param_value(ParamId::Z1ANC), 60);
    assert_relative_eq!(
        handle.param_ratio_atomic(ParamId::Z1ANC),
        handle.param_default_ratio(ParamId::Z1ANC)
    );
}

/// The stored ratio is the one that was sent, not the rounded value's.
#[test]
fn test_ratio_is_kept() {
    let (mut engine, mut handle) = new_engine();
    let id = rule(0, RuleParam::Midpoint);

    handle.set_param(id, 0.123456789);
    engine.begin_processing();
    assert_eq!(handle.param_ratio_atomic(id), 0.123456789);
    assert_eq!(engine.param_value(id), 2469);

    handle.set_param(id, 7.0);
    engine.begin_processing();
    assert_eq!(handle.param_ratio_atomic(id), 1.0);
}

/// A learning rule adopts the first controller it sees.
#[test]
fn test_midi_learn() {
    let (mut engine, handle) = new_engine();
    let input = rule(3, RuleParam::In);
    configure(
        &mut engine,
        &[
            (input, i32::from(ControllerId::MIDI_LEARN.value())),
            (rule(3, RuleParam::Out), 7),
        ],
    );
    engine.clear_dirty_flag();

    engine.note_on(0.0, 0, 60, 100);
    engine.begin_processing();
    engine.control_change(0.0, 0, 20, 64);

    assert_eq!(engine.param_value(input), 20);
    assert!(handle.is_dirty());
    assert_relative_eq!(handle.param_ratio_atomic(input), 20.0 / 123.0);

    let events = engine.out_events();
    assert_eq!(events.len(), 1);
    assert_eq!((events[0].channel, events[0].data1, events[0].data2), (1, 7, 64));
}

/// Messages queued while a block is being processed wait for the next one.
#[test]
fn test_queue_drained_at_block_start() {
    let (mut engine, mut handle) = new_engine();
    for _ in 0..10 {
        assert!(handle.refresh_param(ParamId::MCM));
    }
    assert_eq!(handle.pending_messages(), 10);
    engine.begin_processing();
    assert_eq!(handle.pending_messages(), 0);
}

/// A full queue is reported instead of blocking.
#[test]
fn test_queue_full() {
    let config = EngineConfig {
        message_queue_capacity: 2,
        ..EngineConfig::default()
    };
    let (_engine, mut handle) = Engine::new(config).unwrap();

    assert!(handle.send(Message::clear()).is_ok());
    assert!(handle.send(Message::clear()).is_ok());
    assert!(matches!(
        handle.send(Message::clear()),
        Err(mpe_engine::Error::QueueFull { capacity: 2 })
    ));
    assert!(!handle.clear_dirty_flag());
}

/// Invalid configurations are rejected up front.
#[test]
fn test_invalid_config() {
    let config = EngineConfig {
        sample_rate: 0.0,
        ..EngineConfig::default()
    };
    assert!(matches!(
        Engine::new(config),
        Err(mpe_engine::Error::Core(_))
    ));
}

/// Zone type and voice counters reflect the engine state.
#[test]
fn test_published_counters() {
    let (mut engine, handle) = new_engine();
    engine.begin_processing();
    assert_eq!(engine.params().zone_type(), ZoneType::Lower);

    engine.note_on(0.0, 0, 60, 100);
    engine.note_on(0.0, 0, 61, 100);
    assert_eq!(handle.active_voices_count(), 2);

    engine.note_off(0.0, 0, 60, 64);
    assert_eq!(handle.active_voices_count(), 1);
    assert_eq!(handle.channel_count(), 15);
}

/// Rendering places pre-Note-On setup before the nudged controllers.
#[test]
fn test_render_nudges_controllers() {
    let (mut engine, _) = new_engine();
    engine.begin_processing();
    engine.note_on(0.0, 0, 60, 100);

    let plain = engine.render(64, false);
    assert_eq!(plain.len(), 7);
    assert!(plain.iter().all(|e| e.frame_offset == 0));

    let nudged = engine.render(64, true);
    let offsets: Vec<usize> = nudged.iter().map(|e| e.frame_offset).collect();
    assert_eq!(offsets, vec![0, 0, 0, 0, 1, 1, 1]);
    assert_eq!(nudged[3].note(), Some(60));
}

// ---------------------------------------------------------------------------
// 8. Properties
// ---------------------------------------------------------------------------

mod properties {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Copy, Debug)]
    enum Op {
        NoteOn(u8),
        NoteOff(u8),
        Pedal(bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (36u8..84).prop_map(Op::NoteOn),
            3 => (36u8..84).prop_map(Op::NoteOff),
            1 => any::<bool>().prop_map(Op::Pedal),
        ]
    }

    fn apply(engine: &mut Engine, op: Op) {
        match op {
            Op::NoteOn(note) => engine.note_on(0.0, 0, note, 100),
            Op::NoteOff(note) => engine.note_off(0.0, 0, note, 64),
            Op::Pedal(down) => engine.control_change(0.0, 0, 64, if down { 127 } else { 0 }),
        }
        engine.begin_processing();
    }

    fn pedal_engine(channels: i32, policy: i32) -> Engine {
        let (mut engine, _) = new_engine();
        configure(
            &mut engine,
            &[
                (ParamId::Z1CHN, channels),
                (ParamId::Z1ENH, policy),
                (ParamId::Z1SUS, 1),
            ],
        );
        engine
    }

    proptest! {
        /// Every member channel is either free or holds exactly one note.
        #[test]
        fn channels_are_conserved(
            channels in 1i32..=15,
            policy in 0i32..=4,
            ops in prop::collection::vec(op(), 0..64),
        ) {
            let mut engine = pedal_engine(channels, policy);
            let mut sounding: [Option<u8>; 16] = [None; 16];

            for op in ops {
                match op {
                    Op::NoteOn(note) => engine.note_on(0.0, 0, note, 100),
                    Op::NoteOff(note) => engine.note_off(0.0, 0, note, 64),
                    Op::Pedal(down) => {
                        engine.control_change(0.0, 0, 64, if down { 127 } else { 0 })
                    }
                }

                for event in engine.out_events() {
                    let channel = event.channel as usize;
                    match event.command {
                        Command::NoteOn => {
                            prop_assert!((1..=channels as usize).contains(&channel));
                            prop_assert_eq!(sounding[channel], None);
                            prop_assert!(!sounding.contains(&Some(event.data1)));
                            sounding[channel] = Some(event.data1);
                        }
                        Command::NoteOff => {
                            prop_assert_eq!(sounding[channel], Some(event.data1));
                            sounding[channel] = None;
                        }
                        _ => {}
                    }
                }
                engine.begin_processing();

                let held = sounding.iter().filter(|n| n.is_some()).count();
                prop_assert_eq!(engine.active_voices_count(), held);
                prop_assert_eq!(
                    engine.available_channel_count() + engine.active_voices_count(),
                    channels as usize
                );
            }
        }

        /// Releasing every key and lifting the pedal silences everything.
        #[test]
        fn pedal_release_stops_all_notes(
            ops in prop::collection::vec(op(), 0..64),
        ) {
            let mut engine = pedal_engine(15, ExcessNoteHandling::StealOldest as i32);
            for op in ops {
                apply(&mut engine, op);
            }

            for note in 36u8..84 {
                apply(&mut engine, Op::NoteOff(note));
            }
            apply(&mut engine, Op::Pedal(false));

            prop_assert_eq!(engine.active_voices_count(), 0);
            prop_assert_eq!(engine.available_channel_count(), 15);
            prop_assert!(!engine.is_sustain_pedal_on());
        }

        /// A reset leaves the same state no matter what came before it.
        #[test]
        fn reset_is_idempotent(
            ops in prop::collection::vec(op(), 0..64),
        ) {
            let mut engine = pedal_engine(15, ExcessNoteHandling::StealOldest as i32);
            engine.process_message(Message::set_param(ParamId::MCM, 1.0));
            for op in ops {
                apply(&mut engine, op);
            }

            engine.reset();
            prop_assert_eq!(engine.active_voices_count(), 0);
            prop_assert_eq!(engine.available_channel_count(), 15);

            engine.begin_processing();
            engine.reset();
            let events: Vec<_> = engine
                .out_events()
                .iter()
                .map(|e| (e.command, e.channel, e.data1, e.data2))
                .collect();
            prop_assert_eq!(events.len(), 6);
            prop_assert!(events.iter().all(|e| e.0 == Command::ControlChange));
        }
    }
}
