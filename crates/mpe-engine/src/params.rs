//! The engine's parameter set.

use crate::controller::ExcessNoteHandling;
use crate::param_id::{ParamId, ParamKind, RULES};
use crate::rule::Rule;
use crate::zone::ZoneType;
use mpe_core::Param;

/// Every parameter the engine owns, addressable by [`ParamId`].
#[derive(Debug, Clone)]
pub struct EngineParams {
    pub send_mcm: Param,
    pub zone_type: Param,
    pub channels: Param,
    pub excess_note_handling: Param,
    pub anchor: Param,
    pub override_release_velocity: Param,
    pub transpose_below_anchor: Param,
    pub transpose_above_anchor: Param,
    pub sustain_pedal_handling: Param,
    pub rules: [Rule; RULES],
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineParams {
    pub fn new() -> Self {
        let param = |id: ParamId| id.spec().to_param();
        Self {
            send_mcm: param(ParamId::MCM),
            zone_type: param(ParamId::Z1TYP),
            channels: param(ParamId::Z1CHN),
            excess_note_handling: param(ParamId::Z1ENH),
            anchor: param(ParamId::Z1ANC),
            override_release_velocity: param(ParamId::Z1ORV),
            transpose_below_anchor: param(ParamId::Z1TRB),
            transpose_above_anchor: param(ParamId::Z1TRA),
            sustain_pedal_handling: param(ParamId::Z1SUS),
            rules: std::array::from_fn(Rule::new),
        }
    }

    pub fn param(&self, id: ParamId) -> &Param {
        match id.kind() {
            ParamKind::SendMcm => &self.send_mcm,
            ParamKind::ZoneType => &self.zone_type,
            ParamKind::Channels => &self.channels,
            ParamKind::ExcessNoteHandling => &self.excess_note_handling,
            ParamKind::Anchor => &self.anchor,
            ParamKind::OverrideReleaseVelocity => &self.override_release_velocity,
            ParamKind::TransposeBelowAnchor => &self.transpose_below_anchor,
            ParamKind::TransposeAboveAnchor => &self.transpose_above_anchor,
            ParamKind::SustainPedalHandling => &self.sustain_pedal_handling,
            ParamKind::Rule(rule, param) => self.rules[rule].param(param),
        }
    }

    pub fn param_mut(&mut self, id: ParamId) -> &mut Param {
        match id.kind() {
            ParamKind::SendMcm => &mut self.send_mcm,
            ParamKind::ZoneType => &mut self.zone_type,
            ParamKind::Channels => &mut self.channels,
            ParamKind::ExcessNoteHandling => &mut self.excess_note_handling,
            ParamKind::Anchor => &mut self.anchor,
            ParamKind::OverrideReleaseVelocity => &mut self.override_release_velocity,
            ParamKind::TransposeBelowAnchor => &mut self.transpose_below_anchor,
            ParamKind::TransposeAboveAnchor => &mut self.transpose_above_anchor,
            ParamKind::SustainPedalHandling => &mut self.sustain_pedal_handling,
            ParamKind::Rule(rule, param) => self.rules[rule].param_mut(param),
        }
    }

    #[inline]
    pub fn zone_type(&self) -> ZoneType {
        ZoneType::from_index(self.zone_type.value())
    }

    #[inline]
    pub fn excess_note_handling(&self) -> ExcessNoteHandling {
        ExcessNoteHandling::from_index(self.excess_note_handling.value())
    }

    /// Number of member channels, `1..=15`.
    #[inline]
    pub fn member_channels(&self) -> u8 {
        self.channels.value().clamp(1, 15) as u8
    }

    /// Semitone offset applied to notes below the anchor.
    #[inline]
    pub fn transpose_below(&self) -> i32 {
        self.transpose_below_anchor.value() - 48
    }

    /// Semitone offset applied to notes at or above the anchor.
    #[inline]
    pub fn transpose_above(&self) -> i32 {
        self.transpose_above_anchor.value() - 48
    }

    /// Sets every parameter to its default.
    ///
    /// Returns whether any value changed.
    pub fn reset_all(&mut self) -> bool {
        let mut changed = false;
        for id in ParamId::all() {
            let param = self.param_mut(id);
            let old = param.value();
            param.reset();
            changed |= old != param.value();
        }
        changed
    }
}
