use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::KeyMode;
use crate::HarmonyError;

/// A key with its conventional spelling.
///
/// `sharps` and `flats` only steer note naming. Diatonic membership is
/// always derived from `tonic` and `mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignature {
    pub name: String,
    /// Pitch classes spelled with a sharp
    pub sharps: Vec<u8>,
    /// Pitch classes spelled with a flat
    pub flats: Vec<u8>,
    /// Pitch class 0–11 (C=0)
    pub tonic: u8,
    pub mode: KeyMode,
}

impl KeySignature {
    fn new(name: &str, sharps: &[u8], flats: &[u8], tonic: u8, mode: KeyMode) -> Self {
        Self {
            name: name.to_string(),
            sharps: sharps.to_vec(),
            flats: flats.to_vec(),
            tonic,
            mode,
        }
    }

    pub fn is_major(&self) -> bool {
        self.mode == KeyMode::Major
    }

    pub fn spells_sharp(&self, pitch_class: u8) -> bool {
        self.sharps.contains(&pitch_class)
    }

    pub fn spells_flat(&self, pitch_class: u8) -> bool {
        self.flats.contains(&pitch_class)
    }
}

impl std::fmt::Display for KeySignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

const SHARP_ORDER: [u8; 7] = [6, 1, 8, 3, 10, 5, 0]; // F# C# G# D# A# E# B#
const FLAT_ORDER: [u8; 7] = [10, 3, 8, 1, 6, 11, 0]; // Bb Eb Ab Db Gb Cb, then pc 0 (named C either way)

/// The 30 selectable keys: 15 major then 15 natural minor, each group in
/// circle-of-fifths order (sharp keys, then flat keys).
#[derive(Debug, Clone)]
pub struct KeySignatureTable {
    keys: Vec<KeySignature>,
}

impl KeySignatureTable {
    pub fn standard() -> Self {
        let mut keys = Vec::with_capacity(30);

        const MAJOR_SHARP: [(&str, u8); 8] = [
            ("C Major", 0),
            ("G Major", 7),
            ("D Major", 2),
            ("A Major", 9),
            ("E Major", 4),
            ("B Major", 11),
            ("F# Major", 6),
            ("C# Major", 1),
        ];
        const MAJOR_FLAT: [(&str, u8); 7] = [
            ("F Major", 5),
            ("B♭ Major", 10),
            ("E♭ Major", 3),
            ("A♭ Major", 8),
            ("D♭ Major", 1),
            ("G♭ Major", 6),
            ("C♭ Major", 11),
        ];
        const MINOR_SHARP: [(&str, u8); 8] = [
            ("A minor", 9),
            ("E minor", 4),
            ("B minor", 11),
            ("F# minor", 6),
            ("C# minor", 1),
            ("G# minor", 8),
            ("D# minor", 3),
            ("A# minor", 10),
        ];
        const MINOR_FLAT: [(&str, u8); 7] = [
            ("D minor", 2),
            ("G minor", 7),
            ("C minor", 0),
            ("F minor", 5),
            ("B♭ minor", 10),
            ("E♭ minor", 3),
            ("A♭ minor", 8),
        ];

        for (sharp_keys, flat_keys, mode) in [
            (&MAJOR_SHARP, &MAJOR_FLAT, KeyMode::Major),
            (&MINOR_SHARP, &MINOR_FLAT, KeyMode::Minor),
        ] {
            for (count, (name, tonic)) in sharp_keys.iter().enumerate() {
                keys.push(KeySignature::new(name, &SHARP_ORDER[..count], &[], *tonic, mode));
            }
            for (count, (name, tonic)) in flat_keys.iter().enumerate() {
                keys.push(KeySignature::new(name, &[], &FLAT_ORDER[..count + 1], *tonic, mode));
            }
        }

        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeySignature> {
        self.keys.iter()
    }

    /// Key at `index`, falling back to the first key (C Major) when out of range.
    pub fn get(&self, index: usize) -> &KeySignature {
        self.keys.get(index).unwrap_or(&self.keys[0])
    }

    /// Look a key up by name ("B♭ Major", "bb major", "F#m", "G") or by index.
    /// Indices past the end fall back to C Major; only names can be unknown.
    pub fn find(&self, query: &str) -> Result<(usize, &KeySignature), HarmonyError> {
        let trimmed = query.trim();
        if let Ok(index) = trimmed.parse::<usize>() {
            if index >= self.keys.len() {
                warn!(index, "key index out of range, using {}", self.keys[0].name);
                return Ok((0, self.get(index)));
            }
            return Ok((index, self.get(index)));
        }

        let wanted = normalize_key_name(trimmed);
        self.keys
            .iter()
            .enumerate()
            .find(|(_, key)| normalize_key_name(&key.name) == wanted)
            .ok_or_else(|| HarmonyError::UnknownKey(query.to_string()))
    }
}

impl Default for KeySignatureTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Canonical comparison form: lowercase, ASCII flats, explicit mode word.
fn normalize_key_name(name: &str) -> String {
    let lowered = name.to_lowercase().replace('♭', "b");
    let words: Vec<&str> = lowered.split_whitespace().collect();

    match words.as_slice() {
        [root, mode] if *mode == "major" || *mode == "minor" => format!("{root} {mode}"),
        [root] => match root.strip_suffix('m') {
            Some(stripped) if !stripped.is_empty() => format!("{stripped} minor"),
            _ => format!("{root} major"),
        },
        _ => words.join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thirty_keys_major_first() {
        let table = KeySignatureTable::standard();
        assert_eq!(table.len(), 30);
        assert!(table.iter().take(15).all(|k| k.is_major()));
        assert!(table.iter().skip(15).all(|k| !k.is_major()));
    }

    #[test]
    fn spelling_sets_are_disjoint() {
        for key in KeySignatureTable::standard().iter() {
            assert!(
                key.sharps.iter().all(|pc| !key.flats.contains(pc)),
                "{} spells a pitch class both ways",
                key.name
            );
        }
    }

    #[test]
    fn accidental_counts_follow_circle_of_fifths() {
        let table = KeySignatureTable::standard();
        let (_, c_sharp) = table.find("C# Major").unwrap();
        assert_eq!(c_sharp.sharps, vec![6, 1, 8, 3, 10, 5, 0]);
        assert_eq!(c_sharp.tonic, 1);

        let (_, e_flat_minor) = table.find("E♭ minor").unwrap();
        assert_eq!(e_flat_minor.flats, vec![10, 3, 8, 1, 6, 11]);
        assert_eq!(e_flat_minor.tonic, 3);

        let (_, a_minor) = table.find("A minor").unwrap();
        assert!(a_minor.sharps.is_empty() && a_minor.flats.is_empty());
    }

    #[test]
    fn out_of_range_index_falls_back_to_c_major() {
        let table = KeySignatureTable::standard();
        assert_eq!(table.get(30).name, "C Major");
        assert_eq!(table.get(usize::MAX).name, "C Major");
        assert_eq!(table.get(1).name, "G Major");
    }

    #[test]
    fn find_accepts_loose_names() {
        let table = KeySignatureTable::standard();
        assert_eq!(table.find("bb major").unwrap().1.name, "B♭ Major");
        assert_eq!(table.find("F#m").unwrap().1.name, "F# minor");
        assert_eq!(table.find("g").unwrap().1.name, "G Major");
        assert_eq!(table.find("  A   MINOR ").unwrap().0, 15);
        assert_eq!(table.find("2").unwrap().1.name, "D Major");
    }

    #[test]
    fn find_rejects_unknown_names() {
        let table = KeySignatureTable::standard();
        assert!(matches!(table.find("H major"), Err(HarmonyError::UnknownKey(_))));
    }

    #[test]
    fn find_by_out_of_range_index_uses_c_major() {
        let table = KeySignatureTable::standard();
        let (index, key) = table.find("99").unwrap();
        assert_eq!(index, 0);
        assert_eq!(key.name, "C Major");
        assert_eq!(table.find("30").unwrap().0, 0);
        assert_eq!(table.find("29").unwrap().0, 29);
    }
}
