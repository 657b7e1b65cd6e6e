//! LIFO set of MIDI notes with O(1) access to the oldest, newest, lowest and
//! highest note.
//!
//! The stack is an intrusive doubly linked list over two 128-slot arrays
//! indexed by note number, so nothing allocates after construction.

use mpe_midi::{Channel, Note, CHANNELS, INVALID_CHANNEL, INVALID_NOTE, NOTES, NOTE_MAX};

/// Channels holding the positional roles of a stack.
///
/// Every field is [`INVALID_CHANNEL`] when the stack is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStats {
    pub lowest: Channel,
    pub highest: Channel,
    pub oldest: Channel,
    pub newest: Channel,
}

impl Default for ChannelStats {
    fn default() -> Self {
        Self {
            lowest: INVALID_CHANNEL,
            highest: INVALID_CHANNEL,
            oldest: INVALID_CHANNEL,
            newest: INVALID_CHANNEL,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NoteStack {
    /// Towards older notes.
    next: [Note; NOTES],
    /// Towards newer notes.
    previous: [Note; NOTES],
    head: Note,
    oldest: Note,
    lowest: Note,
    highest: Note,
    len: usize,
}

impl Default for NoteStack {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteStack {
    pub fn new() -> Self {
        Self {
            next: [INVALID_NOTE; NOTES],
            previous: [INVALID_NOTE; NOTES],
            head: INVALID_NOTE,
            oldest: INVALID_NOTE,
            lowest: INVALID_NOTE,
            highest: INVALID_NOTE,
            len: 0,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == INVALID_NOTE
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_top(&self, note: Note) -> bool {
        self.head == note
    }

    pub fn find(&self, note: Note) -> bool {
        !is_invalid(note) && self.contains(note)
    }

    /// Newest note, or [`INVALID_NOTE`].
    #[inline]
    pub fn top(&self) -> Note {
        self.head
    }

    #[inline]
    pub fn oldest(&self) -> Note {
        self.oldest
    }

    #[inline]
    pub fn lowest(&self) -> Note {
        self.lowest
    }

    #[inline]
    pub fn highest(&self) -> Note {
        self.highest
    }

    /// Pushes `note` on top, moving it there if it is already present.
    pub fn push(&mut self, note: Note) {
        if is_invalid(note) {
            return;
        }

        if self.contains(note) {
            self.unlink(note);
            self.update_extremes_after_remove(note);
        }

        if self.oldest == INVALID_NOTE {
            self.oldest = note;
        }

        if self.head != INVALID_NOTE {
            self.previous[self.head as usize] = note;
        }
        self.next[note as usize] = self.head;
        self.previous[note as usize] = INVALID_NOTE;
        self.head = note;
        self.len += 1;

        if self.lowest == INVALID_NOTE || note < self.lowest {
            self.lowest = note;
        }
        if self.highest == INVALID_NOTE || note > self.highest {
            self.highest = note;
        }
    }

    /// Removes and returns the newest note, or [`INVALID_NOTE`] when empty.
    pub fn pop(&mut self) -> Note {
        let note = self.head;
        if note != INVALID_NOTE {
            self.remove(note);
        }
        note
    }

    pub fn remove(&mut self, note: Note) {
        if is_invalid(note) || !self.contains(note) {
            return;
        }
        self.unlink(note);
        self.update_extremes_after_remove(note);
    }

    /// Writes the channel of every note in the stack, newest first.
    ///
    /// Returns the number of channels written.
    pub fn collect_active_channels(
        &self,
        channels_by_note: &[Channel; NOTES],
        channels: &mut [Channel; CHANNELS],
    ) -> usize {
        let mut count = 0;
        let mut note = self.head;
        while note != INVALID_NOTE && count != CHANNELS {
            channels[count] = channels_by_note[note as usize];
            count += 1;
            note = self.next[note as usize];
        }
        count
    }

    pub fn make_stats(&self, channels_by_note: &[Channel; NOTES]) -> ChannelStats {
        if self.is_empty() {
            return ChannelStats::default();
        }
        ChannelStats {
            lowest: channels_by_note[self.lowest as usize],
            highest: channels_by_note[self.highest as usize],
            oldest: channels_by_note[self.oldest as usize],
            newest: channels_by_note[self.head as usize],
        }
    }

    /// Notes from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = Note> + '_ {
        let mut note = self.head;
        std::iter::from_fn(move || {
            if note == INVALID_NOTE {
                return None;
            }
            let current = note;
            note = self.next[current as usize];
            Some(current)
        })
    }

    #[inline]
    fn contains(&self, note: Note) -> bool {
        self.head == note || self.previous[note as usize] != INVALID_NOTE
    }

    fn unlink(&mut self, note: Note) {
        let next_note = self.next[note as usize];
        let previous_note = self.previous[note as usize];

        if note == self.oldest {
            self.oldest = previous_note;
        }

        if next_note != INVALID_NOTE {
            self.previous[next_note as usize] = previous_note;
        }

        if note == self.head {
            self.head = next_note;
        } else if previous_note != INVALID_NOTE {
            self.next[previous_note as usize] = next_note;
        }

        self.next[note as usize] = INVALID_NOTE;
        self.previous[note as usize] = INVALID_NOTE;
        self.len -= 1;
    }

    fn update_extremes_after_remove(&mut self, removed: Note) {
        if self.is_empty() {
            self.lowest = INVALID_NOTE;
            self.highest = INVALID_NOTE;
            return;
        }

        if removed != self.lowest && removed != self.highest {
            return;
        }

        self.lowest = INVALID_NOTE;
        self.highest = INVALID_NOTE;

        let mut note = self.head;
        while note != INVALID_NOTE {
            if self.lowest == INVALID_NOTE || note < self.lowest {
                self.lowest = note;
            }
            if self.highest == INVALID_NOTE || note > self.highest {
                self.highest = note;
            }
            note = self.next[note as usize];
        }
    }
}

#[inline]
fn is_invalid(note: Note) -> bool {
    note > NOTE_MAX
}
