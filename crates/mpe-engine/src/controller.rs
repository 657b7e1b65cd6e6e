//! Controller identifiers and rule policies.

use mpe_midi::Controller;

/// A controller a rule can listen to or emit.
///
/// `0..=119` are MIDI CCs, followed by pitch wheel, channel pressure, and the
/// two sentinels for MIDI learn and "no controller".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(u8);

impl ControllerId {
    pub const BANK_SELECT: Self = Self(0);
    pub const MODULATION_WHEEL: Self = Self(1);
    pub const BREATH: Self = Self(2);
    pub const VOLUME: Self = Self(7);
    pub const EXPRESSION_PEDAL: Self = Self(11);
    pub const SUSTAIN_PEDAL: Self = Self(64);
    pub const SOUND_5: Self = Self(74);
    pub const MAX_MIDI_CC: Self = Self(119);
    pub const PITCH_WHEEL: Self = Self(120);
    pub const CHANNEL_PRESSURE: Self = Self(121);
    pub const MIDI_LEARN: Self = Self(122);
    pub const NONE: Self = Self(123);

    /// Number of controller ids.
    pub const COUNT: usize = 124;

    pub const fn new(id: u8) -> Option<Self> {
        if (id as usize) < Self::COUNT {
            Some(Self(id))
        } else {
            None
        }
    }

    /// Converts a parameter value, clamping into the valid id range.
    pub fn from_value(value: i32) -> Self {
        Self(value.clamp(0, Self::NONE.0 as i32) as u8)
    }

    /// The MIDI CC number, if this id is a plain CC.
    #[inline]
    pub fn midi_cc(self) -> Option<Controller> {
        (self <= Self::MAX_MIDI_CC).then_some(self.0)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }
}

/// Which channels a rule's output goes to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Target {
    /// Manager channel.
    Global = 0,
    AllBelowAnchor = 1,
    AllAboveAnchor = 2,
    Lowest = 3,
    Highest = 4,
    Oldest = 5,
    #[default]
    Newest = 6,
    LowestBelowAnchor = 7,
    HighestBelowAnchor = 8,
    OldestBelowAnchor = 9,
    NewestBelowAnchor = 10,
    LowestAboveAnchor = 11,
    HighestAboveAnchor = 12,
    OldestAboveAnchor = 13,
    NewestAboveAnchor = 14,
}

impl Target {
    pub const ALL: [Target; 15] = [
        Target::Global,
        Target::AllBelowAnchor,
        Target::AllAboveAnchor,
        Target::Lowest,
        Target::Highest,
        Target::Oldest,
        Target::Newest,
        Target::LowestBelowAnchor,
        Target::HighestBelowAnchor,
        Target::OldestBelowAnchor,
        Target::NewestBelowAnchor,
        Target::LowestAboveAnchor,
        Target::HighestAboveAnchor,
        Target::OldestAboveAnchor,
        Target::NewestAboveAnchor,
    ];

    pub fn from_index(index: i32) -> Self {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    /// Region and role for single-channel targets.
    pub fn position(self) -> Option<(Region, Role)> {
        let position = match self {
            Target::Lowest => (Region::All, Role::Lowest),
            Target::Highest => (Region::All, Role::Highest),
            Target::Oldest => (Region::All, Role::Oldest),
            Target::Newest => (Region::All, Role::Newest),
            Target::LowestBelowAnchor => (Region::Below, Role::Lowest),
            Target::HighestBelowAnchor => (Region::Below, Role::Highest),
            Target::OldestBelowAnchor => (Region::Below, Role::Oldest),
            Target::NewestBelowAnchor => (Region::Below, Role::Newest),
            Target::LowestAboveAnchor => (Region::Above, Role::Lowest),
            Target::HighestAboveAnchor => (Region::Above, Role::Highest),
            Target::OldestAboveAnchor => (Region::Above, Role::Oldest),
            Target::NewestAboveAnchor => (Region::Above, Role::Newest),
            Target::Global | Target::AllBelowAnchor | Target::AllAboveAnchor => return None,
        };
        Some(position)
    }
}

/// Part of the keyboard a positional target looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    All,
    Below,
    Above,
}

/// Positional role within a note stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Lowest,
    Highest,
    Oldest,
    Newest,
}

/// What a rule sends to a channel when a note starts or its role moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Reset {
    Off = 0,
    /// Last value seen on the input controller.
    Last = 1,
    /// The rule's initial value.
    #[default]
    Init = 2,
}

impl Reset {
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => Reset::Off,
            1 => Reset::Last,
            _ => Reset::Init,
        }
    }
}

/// What happens to a Note-On when every member channel is busy, or when the
/// note is already sounding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ExcessNoteHandling {
    Ignore = 0,
    StealLowest = 1,
    StealHighest = 2,
    #[default]
    StealOldest = 3,
    StealNewest = 4,
}

impl ExcessNoteHandling {
    pub fn from_index(index: i32) -> Self {
        match index {
            0 => ExcessNoteHandling::Ignore,
            1 => ExcessNoteHandling::StealLowest,
            2 => ExcessNoteHandling::StealHighest,
            4 => ExcessNoteHandling::StealNewest,
            _ => ExcessNoteHandling::StealOldest,
        }
    }
}
