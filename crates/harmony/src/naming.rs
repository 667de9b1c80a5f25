use crate::keys::KeySignature;
use crate::HarmonyError;

const NOTE_NAMES_SHARP: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const NOTE_NAMES_FLAT: [&str; 12] = [
    "C", "D♭", "D", "E♭", "E", "F", "G♭", "G", "A♭", "A", "B♭", "B",
];

pub fn pitch_class(note: u8) -> u8 {
    note % 12
}

/// Scientific octave number: MIDI 60 is C4, MIDI 0 is C-1.
pub fn octave(note: u8) -> i8 {
    (note / 12) as i8 - 1
}

/// Pitch-class name as the key spells it: sharp if the key sharpens it,
/// flat if the key flattens it, sharp otherwise.
pub fn spell_pitch_class(pitch_class: u8, key: &KeySignature) -> &'static str {
    let idx = (pitch_class % 12) as usize;
    if key.spells_sharp(pitch_class) {
        NOTE_NAMES_SHARP[idx]
    } else if key.spells_flat(pitch_class) {
        NOTE_NAMES_FLAT[idx]
    } else {
        NOTE_NAMES_SHARP[idx]
    }
}

pub fn note_name_in_key(note: u8, key: &KeySignature) -> String {
    format!("{}{}", spell_pitch_class(pitch_class(note), key), octave(note))
}

/// Key-agnostic name, always with sharps.
pub fn note_name(note: u8) -> String {
    format!("{}{}", NOTE_NAMES_SHARP[pitch_class(note) as usize], octave(note))
}

/// Held-notes label: "C4 + E4 + G4".
pub fn describe_notes<'a>(notes: impl IntoIterator<Item = &'a u8>, key: &KeySignature) -> String {
    notes
        .into_iter()
        .map(|&n| note_name_in_key(n, key))
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Parse "C4", "F#3", "Bb2", "B♭2", "C-1" or a bare MIDI number.
pub fn parse_note(text: &str) -> Result<u8, HarmonyError> {
    let trimmed = text.trim();
    let invalid = || HarmonyError::InvalidNote(text.to_string());

    if let Ok(number) = trimmed.parse::<u8>() {
        return if number <= 127 { Ok(number) } else { Err(invalid()) };
    }

    let mut chars = trimmed.chars();
    let letter = chars.next().ok_or_else(invalid)?;
    let base: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(invalid()),
    };

    let rest = chars.as_str();
    let (alteration, octave_text) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('♭') => (-1, &rest['♭'.len_utf8()..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };

    let octave: i32 = octave_text.parse().map_err(|_| invalid())?;
    octave
        .checked_add(1)
        .and_then(|o| o.checked_mul(12))
        .and_then(|n| n.checked_add(base + alteration))
        .and_then(|n| u8::try_from(n).ok())
        .filter(|n| *n <= 127)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeySignatureTable;

    fn key(name: &str) -> KeySignature {
        KeySignatureTable::standard().find(name).unwrap().1.clone()
    }

    #[test]
    fn middle_c_is_c4() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(127), "G9");
    }

    #[test]
    fn sharp_key_spells_sharps() {
        assert_eq!(note_name_in_key(66, &key("D Major")), "F#4");
    }

    #[test]
    fn flat_key_spells_flats() {
        let e_flat = key("E♭ Major");
        assert_eq!(note_name_in_key(70, &e_flat), "B♭4");
        assert_eq!(note_name_in_key(63, &e_flat), "E♭4");
        // not in the signature: default sharp spelling
        assert_eq!(note_name_in_key(66, &e_flat), "F#4");
    }

    #[test]
    fn c_major_defaults_to_sharps() {
        assert_eq!(note_name_in_key(61, &key("C Major")), "C#4");
    }

    #[test]
    fn describe_joins_with_plus() {
        let notes = [60u8, 64, 67];
        assert_eq!(describe_notes(&notes, &key("C Major")), "C4 + E4 + G4");
    }

    #[test]
    fn parse_note_names() {
        assert_eq!(parse_note("C4").unwrap(), 60);
        assert_eq!(parse_note("f#3").unwrap(), 54);
        assert_eq!(parse_note("Bb2").unwrap(), 46);
        assert_eq!(parse_note("B♭2").unwrap(), 46);
        assert_eq!(parse_note("C-1").unwrap(), 0);
        assert_eq!(parse_note("64").unwrap(), 64);
    }

    #[test]
    fn parse_note_rejects_garbage() {
        assert!(parse_note("H4").is_err());
        assert!(parse_note("C").is_err());
        assert!(parse_note("128").is_err());
        assert!(parse_note("G#9").is_err());
        assert!(parse_note("").is_err());
        assert!(parse_note("C2000000000").is_err());
        assert!(parse_note("C-2000000000").is_err());
        assert!(parse_note("B2147483647").is_err());
    }
}
