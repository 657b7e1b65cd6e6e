//! State published by the audio thread for the GUI thread.

use crate::param_id::{ParamId, PARAM_ID_COUNT};
use crate::params::EngineParams;
use mpe_core::{AtomicCount, AtomicDouble, AtomicFlag};

/// Lock-free mirror of the engine's observable state.
#[derive(Debug)]
pub struct SharedState {
    ratios: Box<[AtomicDouble]>,
    pub(crate) dirty: AtomicFlag,
    pub(crate) active_voices: AtomicCount,
    pub(crate) channel_count: AtomicCount,
}

impl SharedState {
    pub(crate) fn new(params: &EngineParams) -> Self {
        let ratios = ParamId::all()
            .map(|id| AtomicDouble::new(params.param(id).ratio()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        debug_assert_eq!(ratios.len(), PARAM_ID_COUNT);
        Self {
            ratios,
            dirty: AtomicFlag::new(false),
            active_voices: AtomicCount::new(0),
            channel_count: AtomicCount::new(usize::from(params.member_channels())),
        }
    }

    /// Last published ratio of a parameter.
    #[inline]
    pub fn param_ratio(&self, id: ParamId) -> f64 {
        self.ratios[id.index()].get()
    }

    #[inline]
    pub(crate) fn publish_ratio(&self, id: ParamId, ratio: f64) {
        self.ratios[id.index()].set(ratio);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    #[inline]
    pub fn active_voices_count(&self) -> usize {
        self.active_voices.get()
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channel_count.get()
    }
}
