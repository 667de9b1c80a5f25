//! Offline analysis of Standard MIDI Files.
//!
//! Note events from every track are merged by absolute tick and played
//! through the same tracker the live monitor uses. A frame is produced for
//! each tick at which the held set changed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use harmony::{Analysis, ChordAnalyzer, KeySignature};
use midly::{MidiMessage, Smf, Timing, TrackEventKind};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::midi::NoteEvent;
use crate::notes::ActiveNotes;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read MIDI file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse MIDI file: {0}")]
    Parse(String),
}

/// A note event at an absolute tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedNoteEvent {
    pub tick: u64,
    pub event: NoteEvent,
}

/// Note events of a parsed file, sorted by tick
#[derive(Debug, Clone)]
pub struct NoteTimeline {
    /// Pulses per quarter note
    pub ppq: u16,
    pub events: Vec<TimedNoteEvent>,
}

impl NoteTimeline {
    pub fn tick_to_beat(&self, tick: u64) -> f64 {
        tick as f64 / self.ppq as f64
    }
}

/// Held notes and their analysis after all events at `tick`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayFrame {
    pub tick: u64,
    pub beat: f64,
    pub notes: BTreeSet<u8>,
    pub analysis: Analysis,
}

fn note_event(channel: u8, message: MidiMessage) -> Option<NoteEvent> {
    match message {
        MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
            Some(NoteEvent::note_on(channel, key.as_int(), vel.as_int()))
        }
        // Note On with velocity 0 is Note Off
        MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
            Some(NoteEvent::note_off(channel, key.as_int()))
        }
        _ => None,
    }
}

/// Extract note events from SMF bytes.
pub fn parse_note_timeline(bytes: &[u8]) -> Result<NoteTimeline, ReplayError> {
    let smf = Smf::parse(bytes).map_err(|e| ReplayError::Parse(e.to_string()))?;

    let ppq = match smf.header.timing {
        Timing::Metrical(t) => t.as_int(),
        // SMPTE timing - use reasonable default
        Timing::Timecode(_fps, _tpf) => 480,
    };

    let mut events = Vec::new();
    for track in &smf.tracks {
        let mut tick = 0u64;

        for event in track {
            tick += event.delta.as_int() as u64;

            if let TrackEventKind::Midi { channel, message } = event.kind {
                if let Some(event) = note_event(channel.as_int(), message) {
                    events.push(TimedNoteEvent { tick, event });
                }
            }
        }
    }

    // Stable: events on the same tick keep track order
    events.sort_by_key(|e| e.tick);

    debug!(ppq, events = events.len(), tracks = smf.tracks.len(), "parsed MIDI file");

    Ok(NoteTimeline { ppq, events })
}

/// Play `timeline` through a tracker and analyze every change.
pub fn replay_frames(
    timeline: &NoteTimeline,
    analyzer: &ChordAnalyzer<'_>,
    key: &KeySignature,
) -> Vec<ReplayFrame> {
    let mut notes = ActiveNotes::new();
    let mut frames = Vec::new();

    let mut events = timeline.events.iter().peekable();
    while let Some(first) = events.next() {
        let tick = first.tick;
        let mut changed = notes.apply(&first.event);

        while let Some(next) = events.next_if(|e| e.tick == tick) {
            changed |= notes.apply(&next.event);
        }

        if changed {
            let snapshot = notes.snapshot();
            let analysis = analyzer.analyze_snapshot(&snapshot, key);
            frames.push(ReplayFrame {
                tick,
                beat: timeline.tick_to_beat(tick),
                notes: snapshot,
                analysis,
            });
        }
    }

    frames
}

/// Read, parse and replay a MIDI file.
pub fn replay_file(
    path: &Path,
    analyzer: &ChordAnalyzer<'_>,
    key: &KeySignature,
) -> Result<Vec<ReplayFrame>, ReplayError> {
    let bytes = std::fs::read(path).map_err(|e| ReplayError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let timeline = parse_note_timeline(&bytes)?;
    Ok(replay_frames(&timeline, analyzer, key))
}
