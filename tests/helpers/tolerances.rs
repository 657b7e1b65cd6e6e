//! Tolerance constants for comparing normalized values.
//!
//! Ratios pass through integer parameter values and 7 or 14-bit MIDI data,
//! so comparisons must allow for one quantization step.

/// Ratios written and read back through the settings format.
pub const RATIO_EPSILON: f64 = 1e-6;

/// One step of a 14-bit controller (pitch bend).
pub const WORD_STEP: f64 = 1.0 / 16383.0;

/// One step of a 7-bit controller.
pub const BYTE_STEP: f64 = 1.0 / 127.0;
