//! Builder for configuring and constructing an [`Engine`] and its
//! [`ControlHandle`].

use crate::Result;
use mpe_core::EngineConfig;
use mpe_engine::{ControlHandle, Engine};

/// Settings not given here keep their [`EngineConfig`] defaults.
///
/// # Example
///
/// ```
/// use mpe_emulator::prelude::*;
///
/// let (mut engine, handle) = MpeEmulatorBuilder::default()
///     .sample_rate(48000.0)
///     .settings("[mpeemulator]\nZ1TYP = 1.0\n")
///     .build()?;
///
/// engine.begin_processing();
/// engine.note_on(0.0, 0, 60, 100);
/// assert_eq!(handle.active_voices_count(), 1);
/// # Ok::<(), mpe_emulator::Error>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct MpeEmulatorBuilder {
    config: EngineConfig,

    #[cfg(feature = "presets")]
    settings: Option<String>,
}

impl MpeEmulatorBuilder {
    /// Default: 44100
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.config.sample_rate = sample_rate;
        self
    }

    /// Default: 8192
    pub fn message_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.message_queue_capacity = capacity;
        self
    }

    /// Default: 32768
    pub fn out_events_capacity(mut self, capacity: usize) -> Self {
        self.config.out_events_capacity = capacity;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Serialized settings applied before the first block.
    #[cfg(feature = "presets")]
    pub fn settings(mut self, serialized: impl Into<String>) -> Self {
        self.settings = Some(serialized.into());
        self
    }

    pub fn build(self) -> Result<(Engine, ControlHandle)> {
        self.config.validate()?;

        #[allow(unused_mut)]
        let (mut engine, handle) = Engine::new(self.config)?;

        #[cfg(feature = "presets")]
        if let Some(settings) = self.settings {
            mpe_presets::serializer::import_settings_in_audio_thread(&mut engine, &settings);
            engine.clear_dirty_flag();
        }

        tracing::debug!(sample_rate = engine.config().sample_rate, "mpe emulator built");

        Ok((engine, handle))
    }
}
