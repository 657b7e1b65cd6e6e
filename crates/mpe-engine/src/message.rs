//! Messages from the GUI thread to the audio thread.

use crate::param_id::ParamId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageType {
    /// Set a parameter from a normalized ratio.
    SetParam = 1,
    /// Republish a parameter's ratio without changing it.
    RefreshParam = 2,
    /// Set every parameter to its default.
    Clear = 3,
    ClearDirtyFlag = 4,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Message {
    pub kind: MessageType,
    pub param_id: ParamId,
    pub value: f64,
}

impl Message {
    pub fn new(kind: MessageType, param_id: ParamId, value: f64) -> Self {
        Self {
            kind,
            param_id,
            value,
        }
    }

    pub fn set_param(param_id: ParamId, ratio: f64) -> Self {
        Self::new(MessageType::SetParam, param_id, ratio)
    }

    pub fn refresh_param(param_id: ParamId) -> Self {
        Self::new(MessageType::RefreshParam, param_id, 0.0)
    }

    pub fn clear() -> Self {
        Self::new(MessageType::Clear, ParamId::MCM, 0.0)
    }

    pub fn clear_dirty_flag() -> Self {
        Self::new(MessageType::ClearDirtyFlag, ParamId::MCM, 0.0)
    }
}

/// Anything that accepts engine messages.
///
/// The engine applies them right away; a [`ControlHandle`](crate::ControlHandle)
/// queues them for the audio thread.
pub trait MessageSink {
    /// Returns `false` when the message was dropped.
    fn push_message(&mut self, message: Message) -> bool;
}

impl<T: MessageSink + ?Sized> MessageSink for &mut T {
    fn push_message(&mut self, message: Message) -> bool {
        (**self).push_message(message)
    }
}
