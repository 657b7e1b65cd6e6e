//! Controller rules.
//!
//! A rule listens to one input controller, reshapes its value, and sends the
//! result as an output controller to the channels picked by its target.

use crate::controller::{ControllerId, Reset, Target};
use crate::param_id::{ParamId, RuleParam};
use mpe_core::{distort, DistortionCurve, Param};

/// One controller mapping rule and its parameters.
#[derive(Debug, Clone)]
pub struct Rule {
    pub in_cc: Param,
    pub out_cc: Param,
    pub init_value: Param,
    pub target: Param,
    pub distortion_type: Param,
    pub distortion_level: Param,
    pub midpoint: Param,
    pub reset: Param,
    pub invert: Param,
    pub fallback: Param,
    /// Most recent normalized value seen on the input controller.
    pub last_input_value: f64,
}

impl Rule {
    /// Rule number `index` (zero-based) with its default settings.
    pub(crate) fn new(index: usize) -> Self {
        let param = |p: RuleParam| {
            ParamId::rule(index, p)
                .map(|id| id.spec().to_param())
                .unwrap_or_else(|| Param::new("", 0, 0, 0))
        };
        let init_value = param(RuleParam::InitValue);
        let last_input_value = init_value.ratio();
        Self {
            in_cc: param(RuleParam::In),
            out_cc: param(RuleParam::Out),
            init_value,
            target: param(RuleParam::Target),
            distortion_type: param(RuleParam::DistortionType),
            distortion_level: param(RuleParam::DistortionLevel),
            midpoint: param(RuleParam::Midpoint),
            reset: param(RuleParam::Reset),
            invert: param(RuleParam::Invert),
            fallback: param(RuleParam::Fallback),
            last_input_value,
        }
    }

    pub fn param(&self, param: RuleParam) -> &Param {
        match param {
            RuleParam::In => &self.in_cc,
            RuleParam::Out => &self.out_cc,
            RuleParam::InitValue => &self.init_value,
            RuleParam::Target => &self.target,
            RuleParam::DistortionType => &self.distortion_type,
            RuleParam::DistortionLevel => &self.distortion_level,
            RuleParam::Midpoint => &self.midpoint,
            RuleParam::Reset => &self.reset,
            RuleParam::Invert => &self.invert,
            RuleParam::Fallback => &self.fallback,
        }
    }

    pub fn param_mut(&mut self, param: RuleParam) -> &mut Param {
        match param {
            RuleParam::In => &mut self.in_cc,
            RuleParam::Out => &mut self.out_cc,
            RuleParam::InitValue => &mut self.init_value,
            RuleParam::Target => &mut self.target,
            RuleParam::DistortionType => &mut self.distortion_type,
            RuleParam::DistortionLevel => &mut self.distortion_level,
            RuleParam::Midpoint => &mut self.midpoint,
            RuleParam::Reset => &mut self.reset,
            RuleParam::Invert => &mut self.invert,
            RuleParam::Fallback => &mut self.fallback,
        }
    }

    #[inline]
    pub fn input(&self) -> ControllerId {
        ControllerId::from_value(self.in_cc.value())
    }

    #[inline]
    pub fn output(&self) -> ControllerId {
        ControllerId::from_value(self.out_cc.value())
    }

    #[inline]
    pub fn target(&self) -> Target {
        Target::from_index(self.target.value())
    }

    #[inline]
    pub fn reset_policy(&self) -> Reset {
        Reset::from_index(self.reset.value())
    }

    #[inline]
    pub fn curve(&self) -> DistortionCurve {
        DistortionCurve::from_index(self.distortion_type.value())
    }

    /// Maps an input value through the midpoint, inversion and distortion.
    ///
    /// The midpoint bends the response so that an input of 0.5 lands on the
    /// midpoint's ratio; inputs on either side are scaled linearly.
    pub fn distort(&self, value: f64) -> f64 {
        let midpoint = self.midpoint.ratio();
        let mut shifted = if value < 0.5 {
            2.0 * value * midpoint
        } else {
            midpoint + (2.0 * value - 1.0) * (1.0 - midpoint)
        };

        if self.invert.is_on() {
            shifted = 1.0 - shifted;
        }

        distort(self.distortion_level.ratio(), shifted, self.curve())
    }

    /// Whether a note event at the given side of the anchor resets this rule.
    pub fn needs_reset_for_note_event(&self, is_above_anchor: bool) -> bool {
        if self.reset_policy() == Reset::Off {
            return false;
        }
        match self.target() {
            Target::Global => false,
            Target::AllBelowAnchor => !is_above_anchor,
            Target::AllAboveAnchor => is_above_anchor,
            _ => true,
        }
    }

    /// Value sent to a channel when this rule resets it.
    ///
    /// Split-wide targets keep every channel of the region in sync, so they
    /// always reset to the last input.
    pub fn reset_value(&self) -> f64 {
        let from_last = self.reset_policy() == Reset::Last
            || matches!(
                self.target(),
                Target::AllBelowAnchor | Target::AllAboveAnchor
            );
        if from_last {
            self.distort(self.last_input_value)
        } else {
            self.distort(self.init_value.ratio())
        }
    }

    /// Forgets the last input value.
    pub fn reset_last_input(&mut self) {
        self.last_input_value = self.init_value.ratio();
    }
}
