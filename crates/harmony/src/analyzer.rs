use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::keys::KeySignature;
use crate::matcher::match_chord;
use crate::naming::{note_name_in_key, pitch_class};
use crate::roman::{detect_secondary_dominant, inversion_figure, roman_numeral_for_degree};
use crate::scale::{find_accidentals, function_name, is_diatonic, scale_degree};
use crate::types::ChordAnalysis;
use crate::TheoryTables;

const INTERVAL_NAMES: [&str; 12] = [
    "minor 2nd",
    "major 2nd",
    "minor 3rd",
    "major 3rd",
    "perfect 4th",
    "tritone",
    "perfect 5th",
    "minor 6th",
    "major 6th",
    "minor 7th",
    "major 7th",
    "octave",
];

/// What a held-note snapshot amounts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    /// Zero or one note held
    Silent,
    /// Two notes: "C4 major 3rd"
    Interval { label: String },
    /// Three or more notes
    Chord(ChordAnalysis),
}

impl Analysis {
    /// Text shown for this analysis; empty when silent.
    pub fn display(&self) -> &str {
        match self {
            Analysis::Silent => "",
            Analysis::Interval { label } => label,
            Analysis::Chord(chord) => &chord.chord_name,
        }
    }
}

/// Composes naming, matching, classification and numeral analysis.
///
/// Stateless apart from the borrowed tables; every call works on the
/// snapshot it is handed.
#[derive(Debug, Clone, Copy)]
pub struct ChordAnalyzer<'a> {
    tables: &'a TheoryTables,
}

impl<'a> ChordAnalyzer<'a> {
    pub fn new(tables: &'a TheoryTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &'a TheoryTables {
        self.tables
    }

    /// Display string for a snapshot: empty for fewer than two notes, an
    /// interval name for two, the chord name for more.
    pub fn analyze(&self, active_notes: &BTreeSet<u8>, key: &KeySignature) -> String {
        self.analyze_snapshot(active_notes, key).display().to_string()
    }

    pub fn analyze_snapshot(&self, active_notes: &BTreeSet<u8>, key: &KeySignature) -> Analysis {
        let notes: Vec<u8> = active_notes.iter().copied().collect();
        match notes.as_slice() {
            [] | [_] => Analysis::Silent,
            [low, high] => Analysis::Interval {
                label: self.analyze_interval(*low, *high, key),
            },
            _ => Analysis::Chord(self.analyze_chord(&notes, key)),
        }
    }

    /// Name the raw distance between two notes. Compound intervals are not
    /// reduced: a minor ninth reads "+13 semitones".
    pub fn analyze_interval(&self, low: u8, high: u8, key: &KeySignature) -> String {
        let root = note_name_in_key(low, key);
        let semitones = high as i32 - low as i32;

        match semitones {
            1..=12 => format!("{} {}", root, INTERVAL_NAMES[(semitones - 1) as usize]),
            _ => format!("{} +{} semitones", root, semitones),
        }
    }

    /// Full interpretation of `notes`, which must be ascending, distinct
    /// and non-empty.
    pub fn analyze_chord(&self, notes: &[u8], key: &KeySignature) -> ChordAnalysis {
        let bass_note = notes.first().copied().unwrap_or_default();
        let accidental_notes = find_accidentals(notes, key);

        let mut analysis = ChordAnalysis {
            bass_note,
            root_note: bass_note,
            is_non_diatonic: !accidental_notes.is_empty(),
            accidental_notes,
            ..ChordAnalysis::default()
        };

        let Some(found) = match_chord(notes, key, &self.tables.patterns) else {
            analysis.chord_name = format!("Cluster ({} notes)", notes.len());
            analysis.roman_numeral = "?".to_string();
            debug!(notes = ?notes, key = %key, "no chord pattern matched");
            return analysis;
        };

        let quality = found.quality;
        analysis.quality = Some(quality);
        analysis.root_note = found.root;
        analysis.chord_name = found.display_name;

        let figure = inversion_figure(quality, bass_note, found.root);
        analysis.inversion_figure = figure.to_string();

        let root_pc = pitch_class(found.root);
        let degree = scale_degree(root_pc, key);
        let diatonic = is_diatonic(root_pc, quality, key);

        if diatonic && !analysis.is_non_diatonic {
            if let Some(degree) = degree {
                analysis.roman_numeral =
                    format!("{}{}", roman_numeral_for_degree(degree, key, quality), figure);
                analysis.function_name = function_name(Some(degree), key).to_string();
            }
        } else {
            analysis.is_non_diatonic = true;

            if let Some(target) = detect_secondary_dominant(root_pc, quality, key) {
                analysis.is_secondary_dominant = true;
                analysis.secondary_target = target.to_string();
                analysis.roman_numeral = format!("V{}/{}", figure, target);
                analysis.function_name = "Secondary Dominant".to_string();
            } else {
                let numeral = match degree {
                    Some(degree) => roman_numeral_for_degree(degree, key, quality),
                    None => "Non-diatonic",
                };
                analysis.roman_numeral = format!("{}{}", numeral, figure);
                analysis.function_name = "Non-functional".to_string();
            }
        }

        debug!(
            chord = %analysis.chord_name,
            roman = %analysis.roman_numeral,
            function = %analysis.function_name,
            key = %key,
            "analyzed chord"
        );

        analysis
    }
}
