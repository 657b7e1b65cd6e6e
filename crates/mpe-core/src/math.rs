//! Distortion curves used to shape controller values.
//!
//! Each curve maps `[0, 1]` onto itself and is precomputed into a table of
//! [`TABLE_SIZE`] samples, read back with linear interpolation. The tables
//! are built once on first use; [`warm_up`] forces that outside the audio
//! thread.

use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Number of samples per curve table.
pub const TABLE_SIZE: usize = 2048;

const MAX_INDEX: usize = TABLE_SIZE - 1;
const SCALE: f64 = MAX_INDEX as f64;

/// Below this blend level the input passes through unchanged.
const MIN_LEVEL: f64 = 0.0001;

/// Shape of a distortion curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DistortionCurve {
    /// S-curve with flat ends and a steep middle.
    #[default]
    SmoothSmooth = 0,
    /// Flat start, steep end (`x^5`).
    SmoothSharp = 1,
    /// Steep start, flat end.
    SharpSmooth = 2,
    /// Steep ends, flat middle.
    SharpSharp = 3,
}

impl DistortionCurve {
    pub const ALL: [DistortionCurve; 4] = [
        DistortionCurve::SmoothSmooth,
        DistortionCurve::SmoothSharp,
        DistortionCurve::SharpSmooth,
        DistortionCurve::SharpSharp,
    ];

    /// Converts a parameter value, falling back to the default curve.
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => DistortionCurve::SmoothSharp,
            2 => DistortionCurve::SharpSmooth,
            3 => DistortionCurve::SharpSharp,
            _ => DistortionCurve::SmoothSmooth,
        }
    }

    /// Evaluates the curve directly, without the table.
    pub fn eval(self, x: f64) -> f64 {
        match self {
            DistortionCurve::SmoothSmooth => smooth_smooth(x),
            DistortionCurve::SmoothSharp => x.powi(5),
            DistortionCurve::SharpSmooth => sharp_smooth(x),
            DistortionCurve::SharpSharp => sharp_sharp(x),
        }
    }
}

/// Stops about 1.1e-7 short of 0 and 1 at the end points.
fn smooth_smooth(x: f64) -> f64 {
    ((8.0 * (2.0 * x - 1.0)).tanh() + 1.0) / 2.0
}

fn sharp_smooth(x: f64) -> f64 {
    (x * (1.0 - (x + 0.001).ln()) / (1.0 - 1.001_f64.ln())).cbrt()
}

/// Antiderivative of `((2x - 1)^2)^5`, scaled onto `[0, 1]`, in Horner form.
fn sharp_sharp(x: f64) -> f64 {
    const A: f64 = 1024.0;
    const B: f64 = 5632.0;
    const C: f64 = 14080.0;
    const D: f64 = 21120.0;
    const E: f64 = 21120.0;
    const F: f64 = 14784.0;
    const G: f64 = 7392.0;
    const H: f64 = 2640.0;
    const I: f64 = 660.0;
    const J: f64 = 110.0;
    const K: f64 = 11.0;

    ((((((((((A * x - B) * x + C) * x - D) * x + E) * x - F) * x + G) * x - H) * x + I) * x - J)
        * x
        + K)
        * x
}

type Tables = [[f64; TABLE_SIZE]; 4];

static TABLES: OnceLock<Box<Tables>> = OnceLock::new();

fn tables() -> &'static Tables {
    TABLES.get_or_init(|| {
        let mut tables = Box::new([[0.0; TABLE_SIZE]; 4]);
        for curve in DistortionCurve::ALL {
            let table = &mut tables[curve as usize];
            for (i, slot) in table.iter_mut().enumerate() {
                *slot = curve.eval(i as f64 / SCALE);
            }
        }
        tables
    })
}

/// Builds the curve tables if they do not exist yet.
pub fn warm_up() {
    let _ = tables();
}

/// `weight * a + (1 - weight) * b`
#[inline]
pub fn combine(weight: f64, a: f64, b: f64) -> f64 {
    weight * (a - b) + b
}

/// Reads a table at a fractional index with linear interpolation.
#[inline]
pub fn lookup(table: &[f64; TABLE_SIZE], index: f64) -> f64 {
    let index = index.max(0.0);
    let before = index as usize;
    if before >= MAX_INDEX {
        return table[MAX_INDEX];
    }
    let after_weight = index - index.floor();
    combine(after_weight, table[before + 1], table[before])
}

/// Blends `x` with `curve(x)` by `level`.
#[inline]
pub fn distort(level: f64, x: f64, curve: DistortionCurve) -> f64 {
    if level < MIN_LEVEL {
        return x;
    }
    combine(level, lookup(&tables()[curve as usize], x * SCALE), x)
}
