//! Real-time harmonic analysis of held MIDI notes.
//!
//! Given the set of currently held notes and a key, produce a chord name
//! with slash bass, a Roman numeral with figured-bass inversion marks, the
//! harmonic function, and flags for chromatic and secondary-dominant
//! chords. Everything here is pure and synchronous; the caller owns the
//! note set and hands the analyzer a snapshot.

pub mod analyzer;
pub mod chord_templates;
pub mod keys;
pub mod matcher;
pub mod naming;
pub mod roman;
pub mod scale;
pub mod types;

pub use analyzer::{Analysis, ChordAnalyzer};
pub use chord_templates::{ChordPatternLibrary, ChordTemplate};
pub use keys::{KeySignature, KeySignatureTable};
pub use matcher::{match_chord, ChordMatch};
pub use naming::{describe_notes, note_name, note_name_in_key, parse_note};
pub use types::{ChordAnalysis, ChordQuality, KeyMode, ScaleDegree};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarmonyError {
    #[error("unknown key: {0}")]
    UnknownKey(String),

    #[error("invalid note: {0}")]
    InvalidNote(String),
}

/// Read-only theory tables shared by every analysis.
///
/// Built once at startup and passed by reference; nothing mutates them.
#[derive(Debug, Clone)]
pub struct TheoryTables {
    pub keys: KeySignatureTable,
    pub patterns: ChordPatternLibrary,
}

impl TheoryTables {
    pub fn new() -> Self {
        Self {
            keys: KeySignatureTable::standard(),
            patterns: ChordPatternLibrary::standard(),
        }
    }

    /// Key by table index; out-of-range indices fall back to C Major.
    pub fn key(&self, index: usize) -> &KeySignature {
        self.keys.get(index)
    }

    /// Key by name ("E♭ Major", "f# minor", "Bb") or index ("15").
    pub fn find_key(&self, query: &str) -> Result<(usize, &KeySignature), HarmonyError> {
        self.keys.find(query)
    }

    pub fn analyzer(&self) -> ChordAnalyzer<'_> {
        ChordAnalyzer::new(self)
    }
}

impl Default for TheoryTables {
    fn default() -> Self {
        Self::new()
    }
}
