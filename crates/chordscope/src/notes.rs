//! The set of currently held notes.

use std::collections::BTreeSet;

use crate::midi::{NoteEvent, NoteEventKind};

/// Held MIDI notes, ordered by pitch.
///
/// Channels are merged: a pitch is held while any channel holds it, and
/// released by the first note-off on any channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveNotes {
    held: BTreeSet<u8>,
}

impl ActiveNotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event; returns whether the held set changed.
    pub fn apply(&mut self, event: &NoteEvent) -> bool {
        match event.kind {
            NoteEventKind::NoteOn => self.held.insert(event.pitch),
            NoteEventKind::NoteOff => self.held.remove(&event.pitch),
        }
    }

    /// Owned copy for analysis; later events do not affect it.
    pub fn snapshot(&self) -> BTreeSet<u8> {
        self.held.clone()
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &u8> {
        self.held.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn on_then_off() {
        let mut notes = ActiveNotes::new();
        assert!(notes.apply(&NoteEvent::note_on(0, 64, 90)));
        assert!(notes.apply(&NoteEvent::note_on(0, 60, 90)));
        assert_eq!(notes.iter().copied().collect::<Vec<_>>(), vec![60, 64]);

        assert!(notes.apply(&NoteEvent::note_off(0, 60)));
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn repeated_events_do_not_change_the_set() {
        let mut notes = ActiveNotes::new();
        notes.apply(&NoteEvent::note_on(0, 60, 90));
        assert!(!notes.apply(&NoteEvent::note_on(1, 60, 30)));
        assert!(!notes.apply(&NoteEvent::note_off(0, 61)));
    }

    #[test]
    fn snapshot_is_detached() {
        let mut notes = ActiveNotes::new();
        notes.apply(&NoteEvent::note_on(0, 60, 90));
        let snapshot = notes.snapshot();

        notes.apply(&NoteEvent::note_on(0, 67, 90));
        notes.clear();

        assert_eq!(snapshot.into_iter().collect::<Vec<_>>(), vec![60]);
        assert!(notes.is_empty());
    }
}
