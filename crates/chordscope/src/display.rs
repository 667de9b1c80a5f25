//! Terminal presentation for the live monitor.
//!
//! `MonitorView` holds what the screen shows. It never talks to the MIDI
//! layer or the analyzer; the monitor loop feeds it snapshots and results
//! and asks it to render.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::time::{Duration, Instant};

use harmony::{describe_notes, note_name_in_key, Analysis, KeySignature};

use crate::midi::NoteEvent;

pub const IDLE_PROMPT: &str = "Press keys...";
pub const DISCONNECTED_PROMPT: &str = "Connect MIDI controller...";

/// MIDI device state as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceStatus {
    Searching,
    Connected(String),
    NotFound,
    Error(String),
}

impl DeviceStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, DeviceStatus::Connected(_))
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceStatus::Searching => f.write_str("Searching for MIDI devices..."),
            DeviceStatus::Connected(name) => write!(f, "Connected: {name}"),
            DeviceStatus::NotFound => f.write_str("No Controller Found"),
            DeviceStatus::Error(message) => write!(f, "Connection Error: {message}"),
        }
    }
}

/// Most recent note messages, oldest first, bounded to `capacity`.
#[derive(Debug, Clone)]
pub struct MidiLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl MidiLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, entry: String) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// One log line: "ON  C4 (60) vel 100 ch 1". Channels are shown 1-based.
pub fn format_log_entry(event: &NoteEvent, key: &KeySignature) -> String {
    let name = note_name_in_key(event.pitch, key);
    if event.is_on() {
        format!(
            "ON  {} ({}) vel {} ch {}",
            name,
            event.pitch,
            event.velocity,
            event.channel + 1
        )
    } else {
        format!("OFF {} ({}) ch {}", name, event.pitch, event.channel + 1)
    }
}

/// Everything the monitor screen shows.
#[derive(Debug, Clone)]
pub struct MonitorView {
    pub device: DeviceStatus,
    pub key_name: String,
    pub notes_label: String,
    pub chord_label: String,
    pub roman_label: String,
    pub function_label: String,
    pub non_diatonic: bool,
    pub log: MidiLog,
    clear_delay: Duration,
    clear_at: Option<Instant>,
}

impl MonitorView {
    pub fn new(key_name: impl Into<String>, clear_delay: Duration, log_capacity: usize) -> Self {
        Self {
            device: DeviceStatus::Searching,
            key_name: key_name.into(),
            notes_label: DISCONNECTED_PROMPT.to_string(),
            chord_label: String::new(),
            roman_label: String::new(),
            function_label: String::new(),
            non_diatonic: false,
            log: MidiLog::new(log_capacity),
            clear_delay,
            clear_at: None,
        }
    }

    pub fn set_device(&mut self, status: DeviceStatus) {
        self.notes_label = if status.is_connected() {
            IDLE_PROMPT
        } else {
            DISCONNECTED_PROMPT
        }
        .to_string();
        self.device = status;
        self.clear_analysis();
        self.clear_at = None;
    }

    pub fn set_key(&mut self, key: &KeySignature) {
        self.key_name = key.name.clone();
    }

    pub fn log_event(&mut self, event: &NoteEvent, key: &KeySignature) {
        self.log.push(format_log_entry(event, key));
    }

    /// Show the analysis of `notes`. An empty snapshot does not clear the
    /// screen at once; it arms the clear timer so a quick chord change
    /// does not flicker.
    pub fn show(
        &mut self,
        notes: &BTreeSet<u8>,
        analysis: &Analysis,
        key: &KeySignature,
        now: Instant,
    ) {
        if notes.is_empty() {
            self.clear_at = Some(now + self.clear_delay);
            return;
        }

        self.clear_at = None;
        self.notes_label = describe_notes(notes, key);
        self.chord_label = analysis.display().to_string();

        match analysis {
            Analysis::Chord(chord) => {
                self.roman_label = chord.roman_numeral.clone();
                self.function_label = chord.function_name.clone();
                self.non_diatonic = chord.is_non_diatonic;
            }
            Analysis::Silent | Analysis::Interval { .. } => {
                self.roman_label.clear();
                self.function_label.clear();
                self.non_diatonic = false;
            }
        }
    }

    /// When the pending clear fires, if one is armed.
    pub fn clear_deadline(&self) -> Option<Instant> {
        self.clear_at
    }

    /// Apply a pending clear that is due. Returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.clear_at {
            Some(deadline) if deadline <= now => {
                self.clear_at = None;
                self.notes_label = IDLE_PROMPT.to_string();
                self.clear_analysis();
                true
            }
            _ => false,
        }
    }

    fn clear_analysis(&mut self) {
        self.chord_label.clear();
        self.roman_label.clear();
        self.function_label.clear();
        self.non_diatonic = false;
    }

    /// Status block: device, key, notes, chord and analysis lines.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", self.device));
        out.push_str(&format!("Key:    {}\n", self.key_name));
        out.push_str(&format!("Notes:  {}\n", self.notes_label));
        out.push_str(&format!("Chord:  {}\n", self.chord_label));

        let marker = if self.non_diatonic { "  (non-diatonic)" } else { "" };
        out.push_str(&format!("Roman:  {}{}\n", self.roman_label, marker));
        out.push_str(&format!("Function: {}\n", self.function_label));
        out
    }

    /// The last `limit` log entries, one per line.
    pub fn render_log(&self, limit: usize) -> String {
        let skip = self.log.len().saturating_sub(limit);
        self.log
            .entries()
            .skip(skip)
            .map(|entry| format!("{entry}\n"))
            .collect()
    }
}
