//! Parameter identifiers, their ranges, and the name lookup table.

use crate::controller::{ControllerId, ExcessNoteHandling, Reset, Target};
use crate::zone::ZoneType;
use mpe_core::{DistortionCurve, Param};
use smallvec::SmallVec;
use std::sync::OnceLock;

/// Number of controller rules.
pub const RULES: usize = 9;

/// Number of parameters.
pub const PARAM_ID_COUNT: usize = 99;

/// Longest parameter name accepted by the settings format.
pub const PARAM_NAME_MAX_LEN: usize = 7;

const RULE_PARAMS_FIRST: u8 = 6;
const RULE_PARAMS_PER_RULE: u8 = 9;
const FALLBACK_PARAMS_FIRST: u8 = 90;

static PARAM_NAMES: [&str; PARAM_ID_COUNT] = [
    "MCM", "Z1TYP", "Z1CHN", "Z1ENH", "Z1ANC", "Z1ORV",
    "Z1R1IN", "Z1R1OU", "Z1R1IV", "Z1R1TR", "Z1R1DT", "Z1R1DL",
    "Z1R1MP", "Z1R1RS", "Z1R1NV", "Z1R2IN", "Z1R2OU", "Z1R2IV",
    "Z1R2TR", "Z1R2DT", "Z1R2DL", "Z1R2MP", "Z1R2RS", "Z1R2NV",
    "Z1R3IN", "Z1R3OU", "Z1R3IV", "Z1R3TR", "Z1R3DT", "Z1R3DL",
    "Z1R3MP", "Z1R3RS", "Z1R3NV", "Z1R4IN", "Z1R4OU", "Z1R4IV",
    "Z1R4TR", "Z1R4DT", "Z1R4DL", "Z1R4MP", "Z1R4RS", "Z1R4NV",
    "Z1R5IN", "Z1R5OU", "Z1R5IV", "Z1R5TR", "Z1R5DT", "Z1R5DL",
    "Z1R5MP", "Z1R5RS", "Z1R5NV", "Z1R6IN", "Z1R6OU", "Z1R6IV",
    "Z1R6TR", "Z1R6DT", "Z1R6DL", "Z1R6MP", "Z1R6RS", "Z1R6NV",
    "Z1R7IN", "Z1R7OU", "Z1R7IV", "Z1R7TR", "Z1R7DT", "Z1R7DL",
    "Z1R7MP", "Z1R7RS", "Z1R7NV", "Z1R8IN", "Z1R8OU", "Z1R8IV",
    "Z1R8TR", "Z1R8DT", "Z1R8DL", "Z1R8MP", "Z1R8RS", "Z1R8NV",
    "Z1R9IN", "Z1R9OU", "Z1R9IV", "Z1R9TR", "Z1R9DT", "Z1R9DL",
    "Z1R9MP", "Z1R9RS", "Z1R9NV", "Z1TRB", "Z1TRA", "Z1SUS",
    "Z1R1FB", "Z1R2FB", "Z1R3FB", "Z1R4FB", "Z1R5FB", "Z1R6FB",
    "Z1R7FB", "Z1R8FB", "Z1R9FB",
];

/// One of the per-rule parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleParam {
    In,
    Out,
    InitValue,
    Target,
    DistortionType,
    DistortionLevel,
    Midpoint,
    Reset,
    Invert,
    Fallback,
}

impl RuleParam {
    /// Per-rule parameters in id order; `Fallback` lives in its own block.
    const IN_BLOCK: [RuleParam; 9] = [
        RuleParam::In,
        RuleParam::Out,
        RuleParam::InitValue,
        RuleParam::Target,
        RuleParam::DistortionType,
        RuleParam::DistortionLevel,
        RuleParam::Midpoint,
        RuleParam::Reset,
        RuleParam::Invert,
    ];
}

/// Decoded meaning of a [`ParamId`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    SendMcm,
    ZoneType,
    Channels,
    ExcessNoteHandling,
    Anchor,
    OverrideReleaseVelocity,
    TransposeBelowAnchor,
    TransposeAboveAnchor,
    SustainPedalHandling,
    Rule(usize, RuleParam),
}

/// Identifier of an engine parameter, `0..PARAM_ID_COUNT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParamId(u8);

impl ParamId {
    pub const MCM: Self = Self(0);
    pub const Z1TYP: Self = Self(1);
    pub const Z1CHN: Self = Self(2);
    pub const Z1ENH: Self = Self(3);
    pub const Z1ANC: Self = Self(4);
    pub const Z1ORV: Self = Self(5);
    pub const Z1TRB: Self = Self(87);
    pub const Z1TRA: Self = Self(88);
    pub const Z1SUS: Self = Self(89);

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < PARAM_ID_COUNT {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    /// Looks up a parameter by its exact name.
    pub fn from_name(name: &str) -> Option<Self> {
        ParamIdHashTable::global().lookup(name)
    }

    /// Parameter of the rule at `rule` (zero-based).
    pub fn rule(rule: usize, param: RuleParam) -> Option<Self> {
        if rule >= RULES {
            return None;
        }
        let rule = rule as u8;
        let id = match param {
            RuleParam::Fallback => FALLBACK_PARAMS_FIRST + rule,
            _ => {
                let offset = RuleParam::IN_BLOCK.iter().position(|p| *p == param)? as u8;
                RULE_PARAMS_FIRST + rule * RULE_PARAMS_PER_RULE + offset
            }
        };
        Some(Self(id))
    }

    pub fn all() -> impl Iterator<Item = ParamId> {
        (0..PARAM_ID_COUNT as u8).map(ParamId)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn name(self) -> &'static str {
        PARAM_NAMES[self.index()]
    }

    pub fn kind(self) -> ParamKind {
        match self.0 {
            0 => ParamKind::SendMcm,
            1 => ParamKind::ZoneType,
            2 => ParamKind::Channels,
            3 => ParamKind::ExcessNoteHandling,
            4 => ParamKind::Anchor,
            5 => ParamKind::OverrideReleaseVelocity,
            87 => ParamKind::TransposeBelowAnchor,
            88 => ParamKind::TransposeAboveAnchor,
            89 => ParamKind::SustainPedalHandling,
            id if id >= FALLBACK_PARAMS_FIRST => {
                ParamKind::Rule((id - FALLBACK_PARAMS_FIRST) as usize, RuleParam::Fallback)
            }
            id => {
                let offset = id - RULE_PARAMS_FIRST;
                ParamKind::Rule(
                    (offset / RULE_PARAMS_PER_RULE) as usize,
                    RuleParam::IN_BLOCK[(offset % RULE_PARAMS_PER_RULE) as usize],
                )
            }
        }
    }

    /// Range and default of the parameter.
    pub fn spec(self) -> ParamSpec {
        let (min, max, default) = match self.kind() {
            ParamKind::SendMcm
            | ParamKind::OverrideReleaseVelocity
            | ParamKind::SustainPedalHandling => (0, 1, 0),
            ParamKind::ZoneType => (0, 1, ZoneType::Lower as i32),
            ParamKind::Channels => (1, 15, 15),
            ParamKind::ExcessNoteHandling => (
                ExcessNoteHandling::Ignore as i32,
                ExcessNoteHandling::StealNewest as i32,
                ExcessNoteHandling::StealOldest as i32,
            ),
            ParamKind::Anchor => (0, 127, 60),
            ParamKind::TransposeBelowAnchor | ParamKind::TransposeAboveAnchor => (0, 96, 48),
            ParamKind::Rule(rule, param) => rule_param_range(rule, param),
        };
        ParamSpec {
            name: self.name(),
            min,
            max,
            default,
        }
    }
}

/// Default input/output controller and initial value of each rule.
fn rule_defaults(rule: usize) -> (ControllerId, i32) {
    match rule {
        0 => (ControllerId::PITCH_WHEEL, 8192),
        1 => (ControllerId::CHANNEL_PRESSURE, 0),
        2 => (ControllerId::SOUND_5, 8192),
        _ => (ControllerId::NONE, 0),
    }
}

fn rule_param_range(rule: usize, param: RuleParam) -> (i32, i32, i32) {
    let (controller, init_value) = rule_defaults(rule);
    let controller = i32::from(controller.value());
    let none = i32::from(ControllerId::NONE.value());
    match param {
        RuleParam::In | RuleParam::Out => (0, none, controller),
        RuleParam::InitValue => (0, 16383, init_value),
        RuleParam::Target => (
            Target::Global as i32,
            Target::NewestAboveAnchor as i32,
            Target::Newest as i32,
        ),
        RuleParam::DistortionType => (
            DistortionCurve::SmoothSmooth as i32,
            DistortionCurve::SharpSharp as i32,
            DistortionCurve::SmoothSmooth as i32,
        ),
        RuleParam::DistortionLevel => (0, 16383, 0),
        RuleParam::Midpoint => (0, 20000, 10000),
        RuleParam::Reset => (Reset::Off as i32, Reset::Init as i32, Reset::Init as i32),
        RuleParam::Invert | RuleParam::Fallback => (0, 1, 0),
    }
}

/// Static description of a parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub min: i32,
    pub max: i32,
    pub default: i32,
}

impl ParamSpec {
    /// A fresh parameter at its default value.
    pub fn to_param(&self) -> Param {
        Param::new(self.name, self.min, self.max, self.default)
    }

    pub fn default_ratio(&self) -> f64 {
        self.to_param().default_ratio()
    }

    pub fn ratio_to_value(&self, ratio: f64) -> i32 {
        self.to_param().ratio_to_value(ratio)
    }

    pub fn value_to_ratio(&self, value: i32) -> f64 {
        self.to_param().value_to_ratio(value)
    }
}

/// Bucket occupancy of the name table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HashTableStats {
    /// Longest chain among buckets holding more than one name.
    pub max_collisions: usize,
    /// Average chain length among buckets holding more than one name.
    pub avg_collisions: f64,
    /// Average chain length among non-empty buckets.
    pub avg_bucket_size: f64,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    name: &'static str,
    id: ParamId,
}

/// Chained hash table from parameter names to ids.
///
/// The hash folds up to five characters after the first one in base 36, so
/// it only works well for names drawn from `[A-Z0-9]`.
#[derive(Debug)]
pub struct ParamIdHashTable {
    buckets: Vec<SmallVec<[Entry; 2]>>,
}

impl ParamIdHashTable {
    const BUCKETS: usize = 128;
    const MASK: i32 = Self::BUCKETS as i32 - 1;
    const MULTIPLIER: i32 = 1413;
    const SHIFT: u32 = 7;

    fn new() -> Self {
        let mut table = Self {
            buckets: vec![SmallVec::new(); Self::BUCKETS],
        };
        for id in ParamId::all() {
            table.add(id.name(), id);
        }
        table
    }

    /// Table of every parameter name, built on first use.
    pub fn global() -> &'static Self {
        static TABLE: OnceLock<ParamIdHashTable> = OnceLock::new();
        TABLE.get_or_init(Self::new)
    }

    fn add(&mut self, name: &'static str, id: ParamId) {
        let bucket = &mut self.buckets[Self::hash(name)];
        if bucket.iter().all(|entry| entry.name != name) {
            bucket.push(Entry { name, id });
        }
    }

    pub fn lookup(&self, name: &str) -> Option<ParamId> {
        if name.is_empty() || name.len() > PARAM_NAME_MAX_LEN {
            return None;
        }
        self.buckets[Self::hash(name)]
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.id)
    }

    pub fn statistics(&self) -> HashTableStats {
        let mut collisions_sum = 0;
        let mut collisions_count = 0;
        let mut bucket_size_sum = 0;
        let mut bucket_count = 0;
        let mut max_collisions = 0;

        for bucket in self.buckets.iter().filter(|b| !b.is_empty()) {
            bucket_count += 1;
            bucket_size_sum += bucket.len();
            if bucket.len() > 1 {
                collisions_sum += bucket.len();
                collisions_count += 1;
                max_collisions = max_collisions.max(bucket.len());
            }
        }

        HashTableStats {
            max_collisions,
            avg_collisions: if collisions_count == 0 {
                0.0
            } else {
                collisions_sum as f64 / collisions_count as f64
            },
            avg_bucket_size: if bucket_count == 0 {
                0.0
            } else {
                bucket_size_sum as f64 / bucket_count as f64
            },
        }
    }

    /// Bucket index of a name.
    pub fn hash(name: &str) -> usize {
        const LETTER_OFFSET: i32 = b'A' as i32 - 10;
        const DIGIT_OFFSET: i32 = b'0' as i32;

        let bytes = name.as_bytes();
        if bytes.is_empty() {
            return 0;
        }

        let mut hash: i32 = 0;
        let mut i: i32 = -1;

        // The first character is the same for almost every name.
        for &byte in &bytes[1..] {
            let c = i32::from(byte);
            let c = if c >= LETTER_OFFSET {
                c - LETTER_OFFSET
            } else {
                c - DIGIT_OFFSET
            };
            hash = hash.wrapping_mul(36).wrapping_add(c);
            i += 1;
            if i == 4 {
                break;
            }
        }

        hash = (hash.wrapping_shl(3)).wrapping_add(i).wrapping_abs();
        ((hash.wrapping_mul(Self::MULTIPLIER) >> Self::SHIFT) & Self::MASK) as usize
    }
}
