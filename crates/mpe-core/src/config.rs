//! Engine configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Smallest output reservation that still fits a worst-case block.
pub const MIN_OUT_EVENTS_CAPACITY: usize = 32768;

/// Largest message queue the GUI side may request.
pub const MAX_MESSAGE_QUEUE_CAPACITY: usize = 1 << 20;

/// Configuration for the MIDI transformation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Host sample rate, used when rendering time offsets to sample offsets.
    pub sample_rate: f64,

    /// Capacity of the GUI to audio message queue.
    pub message_queue_capacity: usize,

    /// Number of outbound events reserved up front.
    pub out_events_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            message_queue_capacity: 8192,
            out_events_capacity: MIN_OUT_EVENTS_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8000.0..=384000.0).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.message_queue_capacity == 0
            || self.message_queue_capacity > MAX_MESSAGE_QUEUE_CAPACITY
        {
            return Err(Error::InvalidConfig(format!(
                "message_queue_capacity {} out of range (1-{})",
                self.message_queue_capacity, MAX_MESSAGE_QUEUE_CAPACITY
            )));
        }
        if self.out_events_capacity < MIN_OUT_EVENTS_CAPACITY {
            return Err(Error::InvalidConfig(format!(
                "out_events_capacity {} below minimum {}",
                self.out_events_capacity, MIN_OUT_EVENTS_CAPACITY
            )));
        }
        Ok(())
    }
}
