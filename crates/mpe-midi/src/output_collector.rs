//! Lock-free hand-off of rendered blocks to a MIDI output thread.
//!
//! The audio thread renders each block straight into a [`MidiOutputProducer`]
//! (see [`render_block_to_output`](crate::render_block_to_output)); the output
//! thread receives the events in order from the [`MidiOutputConsumer`].
//! Events that do not fit are dropped and counted instead of blocking.

use crate::render::MidiEvent;
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};

/// Audio-thread side of an output channel.
pub struct MidiOutputProducer {
    producer: HeapProd<MidiEvent>,
    dropped: usize,
}

impl MidiOutputProducer {
    /// Queues one event. A full channel drops it and returns `false`.
    #[inline]
    pub fn send(&mut self, event: MidiEvent) -> bool {
        if self.producer.try_push(event).is_ok() {
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    /// Room left before events start being dropped.
    #[inline]
    pub fn free_len(&self) -> usize {
        self.producer.vacant_len()
    }

    /// Events dropped so far because the output thread fell behind.
    #[inline]
    pub fn dropped_count(&self) -> usize {
        self.dropped
    }
}

/// Output-thread side of an output channel.
pub struct MidiOutputConsumer {
    consumer: HeapCons<MidiEvent>,
}

impl MidiOutputConsumer {
    #[inline]
    pub fn recv(&mut self) -> Option<MidiEvent> {
        self.consumer.try_pop()
    }

    /// Appends every queued event to `out`, returning how many were moved.
    pub fn recv_into(&mut self, out: &mut Vec<MidiEvent>) -> usize {
        let count = self.consumer.occupied_len();
        out.reserve(count);
        let mut moved = 0;
        while let Some(event) = self.consumer.try_pop() {
            out.push(event);
            moved += 1;
        }
        moved
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.consumer.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }
}

/// Creates an output channel holding up to `capacity` events.
pub fn midi_output_channel(capacity: usize) -> (MidiOutputProducer, MidiOutputConsumer) {
    let (producer, consumer) = HeapRb::new(capacity.max(1)).split();
    (
        MidiOutputProducer {
            producer,
            dropped: 0,
        },
        MidiOutputConsumer { consumer },
    )
}
