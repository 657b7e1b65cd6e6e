//! Fixed-capacity FIFO of free member channels.

use mpe_midi::Channel;

/// Maximum number of member channels in a zone.
pub const MEMBER_CHANNELS_MAX: usize = 15;

/// FIFO of free member channels: the channel released first is reused first.
#[derive(Debug, Clone)]
pub struct ChannelQueue {
    items: [Channel; MEMBER_CHANNELS_MAX],
    head: usize,
    len: usize,
}

impl Default for ChannelQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelQueue {
    pub fn new() -> Self {
        Self {
            items: [0; MEMBER_CHANNELS_MAX],
            head: 0,
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Appends a channel; returns `false` when the queue is full.
    pub fn push(&mut self, channel: Channel) -> bool {
        if self.len == MEMBER_CHANNELS_MAX {
            return false;
        }
        let tail = (self.head + self.len) % MEMBER_CHANNELS_MAX;
        self.items[tail] = channel;
        self.len += 1;
        true
    }

    pub fn pop(&mut self) -> Option<Channel> {
        if self.len == 0 {
            return None;
        }
        let channel = self.items[self.head];
        self.head = (self.head + 1) % MEMBER_CHANNELS_MAX;
        self.len -= 1;
        Some(channel)
    }

    /// Free channels in the order they will be handed out.
    pub fn iter(&self) -> impl Iterator<Item = Channel> + '_ {
        (0..self.len).map(move |i| self.items[(self.head + i) % MEMBER_CHANNELS_MAX])
    }
}
