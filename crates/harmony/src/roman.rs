//! Roman-numeral labels, figured-bass inversion figures and secondary dominants.

use crate::keys::KeySignature;
use crate::naming::pitch_class;
use crate::scale::degree_pitch_class;
use crate::types::{ChordQuality, KeyMode, ScaleDegree};

const MAJOR_NUMERALS: [&str; 7] = ["I", "ii", "iii", "IV", "V", "vi", "vii°"];
const MINOR_NUMERALS: [&str; 7] = ["i", "ii°", "♭III", "iv", "v", "♭VI", "♭VII"];

/// Figured-bass suffix for the chord member in the bass.
///
/// Root position figures only sevenths. An unrecognized bass interval
/// yields an empty figure.
pub fn inversion_figure(quality: ChordQuality, bass_note: u8, root_note: u8) -> &'static str {
    let seventh = quality.has_seventh();
    let root_pc = pitch_class(root_note);
    let bass_pc = pitch_class(bass_note);

    if bass_pc == root_pc {
        return match quality {
            ChordQuality::Diminished7 => "°⁷",
            ChordQuality::HalfDiminished7 => "ø⁷",
            _ if seventh => "⁷",
            _ => "",
        };
    }

    let bass_interval = (bass_pc + 12 - root_pc) % 12;
    match bass_interval {
        3 | 4 if seventh => "⁶₅",
        3 | 4 => "⁶",
        7 if seventh => "₄³",
        7 => "₆₄",
        6 if quality == ChordQuality::Diminished => "₆₄",
        9..=11 if seventh => "₄₂",
        _ => "",
    }
}

/// Numeral of the degree this chord tonicizes, if it is a major or
/// dominant chord whose root lies a perfect fifth above a scale degree.
pub fn detect_secondary_dominant(
    root_pitch_class: u8,
    quality: ChordQuality,
    key: &KeySignature,
) -> Option<&'static str> {
    if !matches!(
        quality,
        ChordQuality::Major | ChordQuality::Dominant7 | ChordQuality::Dominant9 | ChordQuality::Major7
    ) {
        return None;
    }

    let numerals = numerals(key);
    ScaleDegree::all()
        .find(|&degree| (degree_pitch_class(degree, key) + 7) % 12 == root_pitch_class % 12)
        .map(|degree| numerals[degree.index()])
}

/// Numeral for a chord built on `degree`, adjusted for the few qualities
/// that change its spelling.
pub fn roman_numeral_for_degree(
    degree: ScaleDegree,
    key: &KeySignature,
    quality: ChordQuality,
) -> &'static str {
    match (key.mode, degree.get(), quality) {
        (KeyMode::Major, 7, ChordQuality::HalfDiminished7) => "vii",
        (KeyMode::Minor, 2, ChordQuality::HalfDiminished7) => "ii",
        (KeyMode::Minor, 5, ChordQuality::Major | ChordQuality::Dominant7) => "V",
        _ => numerals(key)[degree.index()],
    }
}

fn numerals(key: &KeySignature) -> &'static [&'static str; 7] {
    match key.mode {
        KeyMode::Major => &MAJOR_NUMERALS,
        KeyMode::Minor => &MINOR_NUMERALS,
    }
}
