//! Scale degrees, harmonic function and diatonic membership within a key.

use crate::keys::KeySignature;
use crate::naming::pitch_class;
use crate::types::{ChordQuality, KeyMode, ScaleDegree};

/// Semitone steps from the tonic for each degree.
pub const MAJOR_SCALE_STEPS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];
pub const MINOR_SCALE_STEPS: [u8; 7] = [0, 2, 3, 5, 7, 8, 10];

/// Chromatic distance from the tonic -> scale degree (0 = not in the scale).
const MAJOR_DEGREE_BY_STEP: [u8; 12] = [1, 0, 2, 0, 3, 4, 0, 5, 0, 6, 0, 7];
const MINOR_DEGREE_BY_STEP: [u8; 12] = [1, 0, 2, 3, 0, 4, 0, 5, 6, 0, 7, 0];

const MAJOR_FUNCTIONS: [&str; 7] = [
    "Tonic",
    "Supertonic",
    "Mediant",
    "Subdominant",
    "Dominant",
    "Submediant",
    "Leading Tone",
];
const MINOR_FUNCTIONS: [&str; 7] = [
    "Tonic",
    "Supertonic",
    "Mediant",
    "Subdominant",
    "Dominant",
    "Submediant",
    "Subtonic",
];

fn scale_steps(key: &KeySignature) -> &'static [u8; 7] {
    match key.mode {
        KeyMode::Major => &MAJOR_SCALE_STEPS,
        KeyMode::Minor => &MINOR_SCALE_STEPS,
    }
}

/// Degree of `pitch_class` in `key`, or `None` when it lies outside the
/// (natural) scale.
pub fn scale_degree(pitch_class: u8, key: &KeySignature) -> Option<ScaleDegree> {
    let step = ((pitch_class % 12) + 12 - key.tonic % 12) % 12;
    let table = match key.mode {
        KeyMode::Major => &MAJOR_DEGREE_BY_STEP,
        KeyMode::Minor => &MINOR_DEGREE_BY_STEP,
    };
    ScaleDegree::new(table[step as usize])
}

/// Pitch class sitting on `degree` of `key`.
pub fn degree_pitch_class(degree: ScaleDegree, key: &KeySignature) -> u8 {
    (key.tonic + scale_steps(key)[degree.index()]) % 12
}

pub fn function_name(degree: Option<ScaleDegree>, key: &KeySignature) -> &'static str {
    match degree {
        None => "Non-diatonic",
        Some(degree) => match key.mode {
            KeyMode::Major => MAJOR_FUNCTIONS[degree.index()],
            KeyMode::Minor => MINOR_FUNCTIONS[degree.index()],
        },
    }
}

/// Whether a chord of `quality` built on `root_pitch_class` is what the key
/// expects on that degree. Minor-key dominants may be major (raised
/// leading tone).
pub fn is_diatonic(root_pitch_class: u8, quality: ChordQuality, key: &KeySignature) -> bool {
    let Some(degree) = scale_degree(root_pitch_class, key) else {
        return false;
    };

    match (key.mode, degree.get()) {
        (KeyMode::Major, 1 | 4 | 5) => quality.is_major_family(),
        (KeyMode::Major, 2 | 3 | 6) => quality.is_minor_family(),
        (KeyMode::Major, 7) => quality.is_diminished_family(),
        (KeyMode::Minor, 5) => {
            quality.is_minor_family()
                || matches!(quality, ChordQuality::Major | ChordQuality::Dominant7)
        }
        (KeyMode::Minor, 1 | 4) => quality.is_minor_family(),
        (KeyMode::Minor, 3 | 6 | 7) => quality.is_major_family(),
        (KeyMode::Minor, 2) => quality.is_diminished_family(),
        _ => false,
    }
}

/// Membership mask over the 12 pitch classes. Minor keys use the natural
/// minor scale plus the dominant pitch class, which it already holds; the
/// raised seventh stays foreign.
pub fn diatonic_pitch_classes(key: &KeySignature) -> [bool; 12] {
    let mut members = [false; 12];
    for step in scale_steps(key) {
        members[((key.tonic + step) % 12) as usize] = true;
    }
    if key.mode == KeyMode::Minor {
        members[((key.tonic + 7) % 12) as usize] = true;
    }
    members
}

/// Held notes whose pitch class is foreign to the key, in input order.
pub fn find_accidentals(notes: &[u8], key: &KeySignature) -> Vec<u8> {
    let members = diatonic_pitch_classes(key);
    notes
        .iter()
        .copied()
        .filter(|&note| !members[pitch_class(note) as usize])
        .collect()
}
