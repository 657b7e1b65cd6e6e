//! GUI-thread side of the engine.

use crate::error::{Error, Result};
use crate::message::{Message, MessageSink};
use crate::param_id::ParamId;
use crate::shared::SharedState;
use ringbuf::{traits::*, HeapProd};
use std::sync::Arc;

/// Sends messages to an [`Engine`](crate::Engine) and reads what it publishes.
///
/// Pushing never blocks; reads are plain atomic loads.
///
/// # Example
/// ```
/// use mpe_engine::{Engine, ParamId};
/// use mpe_core::EngineConfig;
///
/// let (mut engine, mut handle) = Engine::new(EngineConfig::default()).unwrap();
/// assert!(handle.set_param(ParamId::Z1CHN, 0.5));
///
/// engine.begin_processing();
/// assert_eq!(handle.channel_count(), 8);
/// ```
pub struct ControlHandle {
    producer: HeapProd<Message>,
    shared: Arc<SharedState>,
    capacity: usize,
}

impl ControlHandle {
    pub(crate) fn new(producer: HeapProd<Message>, shared: Arc<SharedState>) -> Self {
        let capacity = producer.capacity().get();
        Self {
            producer,
            shared,
            capacity,
        }
    }

    /// Queues a message, failing with [`Error::QueueFull`] when the audio
    /// thread is behind.
    pub fn send(&mut self, message: Message) -> Result<()> {
        if self.producer.try_push(message).is_err() {
            tracing::warn!(?message, capacity = self.capacity, "message queue full, dropping");
            return Err(Error::QueueFull {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    pub fn set_param(&mut self, id: ParamId, ratio: f64) -> bool {
        self.push_message(Message::set_param(id, ratio))
    }

    pub fn refresh_param(&mut self, id: ParamId) -> bool {
        self.push_message(Message::refresh_param(id))
    }

    pub fn clear(&mut self) -> bool {
        self.push_message(Message::clear())
    }

    pub fn clear_dirty_flag(&mut self) -> bool {
        self.push_message(Message::clear_dirty_flag())
    }

    /// Number of queued messages not yet seen by the audio thread.
    pub fn pending_messages(&self) -> usize {
        self.producer.occupied_len()
    }

    #[inline]
    pub fn param_ratio_atomic(&self, id: ParamId) -> f64 {
        self.shared.param_ratio(id)
    }

    pub fn param_default_ratio(&self, id: ParamId) -> f64 {
        id.spec().default_ratio()
    }

    pub fn param_name(&self, id: ParamId) -> &'static str {
        id.name()
    }

    pub fn param_id_by_name(&self, name: &str) -> Option<ParamId> {
        ParamId::from_name(name)
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.shared.is_dirty()
    }

    #[inline]
    pub fn active_voices_count(&self) -> usize {
        self.shared.active_voices_count()
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.shared.channel_count()
    }

    pub fn shared(&self) -> &Arc<SharedState> {
        &self.shared
    }
}

impl MessageSink for ControlHandle {
    fn push_message(&mut self, message: Message) -> bool {
        self.send(message).is_ok()
    }
}

impl std::fmt::Debug for ControlHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlHandle")
            .field("capacity", &self.capacity)
            .field("pending", &self.pending_messages())
            .finish()
    }
}
