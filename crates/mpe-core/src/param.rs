//! Integer parameters with a normalized ratio view.
//!
//! Every engine setting is an integer in `[min, max]`. Hosts and GUIs talk
//! in normalized ratios (`0.0..=1.0`), so a parameter keeps both: the
//! integer value the engine acts on, and the ratio it was last set with.
//!
//! # Example
//!
//! ```
//! use mpe_core::Param;
//!
//! let mut channels = Param::new("Z1CHN", 1, 15, 15);
//! assert_eq!(channels.default_ratio(), 1.0);
//!
//! channels.set_ratio(0.5);
//! assert_eq!(channels.value(), 8); // 1 + round(14 * 0.5)
//! assert_eq!(channels.ratio(), 0.5); // the ratio is kept as given
//! ```

/// A named integer parameter in `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    name: &'static str,
    min: i32,
    max: i32,
    default: i32,
    range: f64,
    value: i32,
    ratio: f64,
}

impl Param {
    /// Creates a parameter at its default value.
    ///
    /// # Arguments
    /// * `name` - Short upper-case identifier used in settings files
    /// * `min`, `max` - Inclusive integer range
    /// * `default` - Initial value, clamped into the range
    pub fn new(name: &'static str, min: i32, max: i32, default: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let default = default.clamp(min, max);
        let mut param = Self {
            name,
            min,
            max,
            default,
            range: f64::from(max - min),
            value: default,
            ratio: 0.0,
        };
        param.ratio = param.value_to_ratio(default);
        param
    }

    /// Creates an off/on parameter.
    pub fn toggle(name: &'static str, default_on: bool) -> Self {
        Self::new(name, 0, 1, i32::from(default_on))
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn min_value(&self) -> i32 {
        self.min
    }

    #[inline]
    pub fn max_value(&self) -> i32 {
        self.max
    }

    #[inline]
    pub fn default_value(&self) -> i32 {
        self.default
    }

    #[inline]
    pub fn value(&self) -> i32 {
        self.value
    }

    /// The ratio the parameter was last set with.
    #[inline]
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    #[inline]
    pub fn default_ratio(&self) -> f64 {
        self.value_to_ratio(self.default)
    }

    /// Whether a toggle-like parameter is on (any non-zero value).
    #[inline]
    pub fn is_on(&self) -> bool {
        self.value != 0
    }

    /// Sets the integer value, clamping it and recomputing the ratio.
    pub fn set_value(&mut self, value: i32) {
        self.value = self.clamp(value);
        self.ratio = self.value_to_ratio(self.value);
    }

    /// Sets the ratio, clamping it and rounding the value to the nearest integer.
    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = clamp_ratio(ratio);
        self.value = self.ratio_to_value(self.ratio);
    }

    /// Resets the parameter to its default value.
    pub fn reset(&mut self) {
        self.set_value(self.default);
    }

    /// Maps an integer onto `[0, 1]`.
    pub fn value_to_ratio(&self, value: i32) -> f64 {
        if self.range <= 0.0 {
            return 0.0;
        }
        clamp_ratio(f64::from(value - self.min) / self.range)
    }

    /// Maps a ratio onto the nearest integer in range.
    pub fn ratio_to_value(&self, ratio: f64) -> i32 {
        let offset = (self.range * clamp_ratio(ratio)).round() as i32;
        self.clamp(self.min + offset)
    }

    #[inline]
    fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }
}

/// Clamps a ratio into `[0, 1]`; NaN becomes 0.
#[inline]
pub fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        0.0
    } else {
        ratio.clamp(0.0, 1.0)
    }
}
