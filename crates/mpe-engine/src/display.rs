//! Human-readable parameter names and values.

use crate::controller::ControllerId;
use crate::param_id::{ParamId, ParamKind, RuleParam};
use std::sync::OnceLock;

/// How much room the caller has for a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TextLength {
    /// Fits a knob label.
    #[default]
    Short,
    /// For tooltips and host automation lanes.
    Long,
}

const ZONE_TYPES: [&str; 2] = ["Lower", "Upper"];
const EXCESS_NOTE_HANDLINGS: [&str; 5] = ["Never", "Low", "High", "Old", "New"];
const RESETS: [&str; 3] = ["OFF", "LST", "INI"];
const TOGGLE_STATES: [&str; 2] = ["OFF", "ON"];
const DISTORTIONS: [&str; 4] = ["SMT-SMT", "SMT-SHP", "SHP-SMT", "SHP-SHP"];
const NOTE_NAMES: [&str; 12] = [
    "C", "C#/Db", "D", "D#/Eb", "E", "F", "F#/Gb", "G", "G#/Ab", "A", "A#/Bb", "B",
];

const TARGETS_SHORT: [&str; 15] = [
    "Global", "All BA", "All AA", "Low", "High", "Old", "New", "Low BA", "Hi BA", "Old BA",
    "New BA", "Low AA", "Hi AA", "Old AA", "New AA",
];

const TARGETS_LONG: [&str; 15] = [
    "Global",
    "All below anchor",
    "All above anchor",
    "Lowest",
    "Highest",
    "Oldest",
    "Newest",
    "Lowest below anchor",
    "Highest below anchor",
    "Oldest below anchor",
    "Newest below anchor",
    "Lowest above anchor",
    "Highest above anchor",
    "Oldest above anchor",
    "Newest above anchor",
];

/// Option lists that are generated rather than written out.
struct OptionTables {
    controllers_short: Vec<String>,
    controllers_long: Vec<String>,
    channels: Vec<String>,
    anchors: Vec<String>,
    transpose: Vec<String>,
    zone_types: Vec<String>,
    excess_note_handlings: Vec<String>,
    targets_short: Vec<String>,
    targets_long: Vec<String>,
    resets: Vec<String>,
    toggles: Vec<String>,
    distortions: Vec<String>,
}

fn to_strings(options: &[&str]) -> Vec<String> {
    options.iter().map(|s| s.to_string()).collect()
}

fn tables() -> &'static OptionTables {
    static TABLES: OnceLock<OptionTables> = OnceLock::new();
    TABLES.get_or_init(|| OptionTables {
        controllers_short: (0..ControllerId::COUNT as u8)
            .map(|id| controller_short_name(id).into_owned())
            .collect(),
        controllers_long: (0..ControllerId::COUNT as u8)
            .map(controller_long_name)
            .collect(),
        channels: std::iter::once("-".to_string())
            .chain((1..=15).map(|c: u8| c.to_string()))
            .collect(),
        anchors: (0..128).map(note_name).collect(),
        transpose: (-48..=48)
            .map(|t: i32| if t > 0 { format!("+{t}") } else { t.to_string() })
            .collect(),
        zone_types: to_strings(&ZONE_TYPES),
        excess_note_handlings: to_strings(&EXCESS_NOTE_HANDLINGS),
        targets_short: to_strings(&TARGETS_SHORT),
        targets_long: to_strings(&TARGETS_LONG),
        resets: to_strings(&RESETS),
        toggles: to_strings(&TOGGLE_STATES),
        distortions: to_strings(&DISTORTIONS),
    })
}

/// Note name with octave, where note 60 is `C 4`.
pub fn note_name(note: u8) -> String {
    let octave = i32::from(note / 12) - 1;
    format!("{} {}", NOTE_NAMES[usize::from(note % 12)], octave)
}

fn controller_short_name(id: u8) -> std::borrow::Cow<'static, str> {
    let name = match id {
        0 => "Bank",
        1 => "Mod",
        2 => "Breath",
        4 => "Foot",
        6 => "Data",
        7 => "Vol",
        10 => "Pan",
        11 => "Expr",
        12 => "Fx 1",
        13 => "Fx 2",
        16 => "Gen 1",
        17 => "Gen 2",
        18 => "Gen 3",
        19 => "Gen 4",
        64 => "Sust",
        120 => "Pitch",
        121 => "Ch AT",
        122 => "Learn",
        123 => "none",
        cc => return format!("CC{cc}").into(),
    };
    name.into()
}

fn controller_long_name(id: u8) -> String {
    let name = match id {
        0 => "Bank Select",
        1 => "Modulation Wheel",
        2 => "Breath",
        4 => "Foot Pedal",
        5 => "Portamento Time",
        6 => "Data Entry",
        7 => "Volume",
        8 => "Balance",
        10 => "Pan",
        11 => "Expression Pedal",
        12 => "Effect Control 1",
        13 => "Effect Control 2",
        16 => "General 1",
        17 => "General 2",
        18 => "General 3",
        19 => "General 4",
        32 => "Bank Select LSB (14 bit)",
        33 => "Mod Wheel LSB (14 bit)",
        34 => "Breath LSB (14 bit)",
        36 => "Foot Pedal LSB (14 bit)",
        37 => "Portamento T LSB (14 bit)",
        38 => "Data Entry LSB (14 bit)",
        39 => "Volume LSB (14 bit)",
        40 => "Balance LSB (14 bit)",
        42 => "Pan LSB (14 bit)",
        43 => "Expr Pedal LSB (14 bit)",
        44 => "Effect Ctl 1 LSB (14 bit)",
        45 => "Effect Ctl 2 LSB (14 bit)",
        48 => "General 1 LSB (14 bit)",
        49 => "General 2 LSB (14 bit)",
        50 => "General 3 LSB (14 bit)",
        51 => "General 4 LSB (14 bit)",
        33..=63 => return format!("CC {id} LSB for CC {} (14 bit)", id - 32),
        64 => "Sustain Pedal",
        65 => "Portamento On/Off",
        66 => "Sostenuto",
        67 => "Soft Pedal",
        68 => "Legato Footswitch",
        69 => "Hold 2",
        70..=79 => return format!("CC {id} Sound {}", id - 69),
        80..=83 => return format!("CC {id} General On/Off {}", id - 79),
        84 => "Portamento Control",
        91..=95 => return format!("CC {id} Effect {}", id - 90),
        96 => "Data Increment",
        97 => "Data Decrement",
        98 => "Non-Reg Param Num LSB",
        99 => "Non-Reg Param Num MSB",
        100 => "Reg Param Num LSB",
        101 => "Reg Param Num MSB",
        120 => return "Pitch Wheel".to_string(),
        121 => return "Channel Pressure (Aftertouch)".to_string(),
        122 => return "MIDI Learn".to_string(),
        123 => return "none".to_string(),
        _ => return format!("CC {id}"),
    };
    format!("CC {id} {name}")
}

/// Label of a parameter, e.g. `"Rule 3 distortion level (%)"`.
pub fn param_display_name(id: ParamId) -> String {
    let name = match id.kind() {
        ParamKind::SendMcm => "Emit MCM on reset",
        ParamKind::ZoneType => "Zone type",
        ParamKind::Channels => "Channels",
        ParamKind::ExcessNoteHandling => "Excess note handling",
        ParamKind::Anchor => "Anchor",
        ParamKind::OverrideReleaseVelocity => "Override release velocity with triggered velocity",
        ParamKind::TransposeBelowAnchor => "Transpose below anchor",
        ParamKind::TransposeAboveAnchor => "Transpose above anchor",
        ParamKind::SustainPedalHandling => "Sustain pedal handling",
        ParamKind::Rule(rule, param) => {
            let what = match param {
                RuleParam::In => "input",
                RuleParam::Out => "output",
                RuleParam::InitValue => "initial value (%)",
                RuleParam::Target => "target",
                RuleParam::DistortionType => "distortion type",
                RuleParam::DistortionLevel => "distortion level (%)",
                RuleParam::Midpoint => "midpoint (%)",
                RuleParam::Reset => "reset on target change",
                RuleParam::Invert => "invert",
                RuleParam::Fallback => "fall back to manager channel",
            };
            return format!("Rule {} {}", rule + 1, what);
        }
    };
    name.to_string()
}

/// Options a parameter's integer value indexes, or `None` for percentages.
pub fn param_options(id: ParamId, length: TextLength) -> Option<&'static [String]> {
    let tables = tables();
    let options = match id.kind() {
        ParamKind::SendMcm
        | ParamKind::OverrideReleaseVelocity
        | ParamKind::SustainPedalHandling => &tables.toggles,
        ParamKind::ZoneType => &tables.zone_types,
        ParamKind::Channels => &tables.channels,
        ParamKind::ExcessNoteHandling => &tables.excess_note_handlings,
        ParamKind::Anchor => &tables.anchors,
        ParamKind::TransposeBelowAnchor | ParamKind::TransposeAboveAnchor => &tables.transpose,
        ParamKind::Rule(_, param) => match param {
            RuleParam::In | RuleParam::Out => match length {
                TextLength::Short => &tables.controllers_short,
                TextLength::Long => &tables.controllers_long,
            },
            RuleParam::Target => match length {
                TextLength::Short => &tables.targets_short,
                TextLength::Long => &tables.targets_long,
            },
            RuleParam::DistortionType => &tables.distortions,
            RuleParam::Reset => &tables.resets,
            RuleParam::Invert | RuleParam::Fallback => &tables.toggles,
            RuleParam::InitValue | RuleParam::DistortionLevel | RuleParam::Midpoint => {
                return None
            }
        },
    };
    Some(options.as_slice())
}

/// Renders a ratio the way the parameter is shown to users.
pub fn format_param_ratio(id: ParamId, ratio: f64, length: TextLength) -> String {
    let Some(options) = param_options(id, length) else {
        return format_percentage(ratio);
    };

    let spec = id.spec();
    let index = spec.ratio_to_value(ratio);
    // Channel counts start at 1 but the option list has a placeholder at 0.
    let index = usize::try_from(index).unwrap_or(0);
    let index = if matches!(id.kind(), ParamKind::Channels) {
        index
    } else {
        index.saturating_sub(spec.min.max(0) as usize)
    };

    options.get(index).cloned().unwrap_or_default()
}

fn format_percentage(ratio: f64) -> String {
    let text = format!("{:.2}%", ratio * 100.0);
    let is_minus_zero = text.starts_with('-')
        && !text.chars().skip(1).any(|c| ('1'..='9').contains(&c));
    if is_minus_zero {
        format!("{:.2}%", 0.0)
    } else {
        text
    }
}
