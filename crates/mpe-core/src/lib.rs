//! Core primitives for the MPE emulator.
//!
//! Everything here is shared by the engine and the host-facing layers:
//! integer parameters with a normalized ratio view, cache-line aligned
//! atomics for publishing state across threads, the engine configuration,
//! and the precomputed distortion curves used by controller rules.

pub mod config;
pub mod error;
pub mod lockfree;
pub mod math;
pub mod param;

pub use config::EngineConfig;
pub use error::{Error, Result};
pub use lockfree::{AtomicCount, AtomicDouble, AtomicFlag};
pub use math::{distort, DistortionCurve, TABLE_SIZE};
pub use param::{clamp_ratio, Param};

pub use std::sync::atomic::Ordering;
