use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMode {
    Major,
    Minor,
}

impl std::fmt::Display for KeyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyMode::Major => write!(f, "major"),
            KeyMode::Minor => write!(f, "minor"),
        }
    }
}

/// Every chord quality the matcher knows about.
///
/// Declaration order is library order, which decides ties between
/// qualities sharing an interval set (`Augmented7` beats `Dominant7Sharp5`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChordQuality {
    Major,
    Major7,
    Major9,
    Major6,
    Add9,
    Minor,
    Minor7,
    Minor9,
    Minor6,
    MinorMajor7,
    Dominant7,
    Dominant9,
    Dominant11,
    Dominant13,
    Diminished,
    Diminished7,
    HalfDiminished7,
    Augmented,
    Augmented7,
    Suspended2,
    Suspended4,
    Dominant7Sus2,
    Dominant7Sus4,
    Dominant7Flat5,
    Dominant7Sharp5,
    Dominant7Flat9,
    Dominant7Sharp9,
    Dominant7Sharp11,
}

impl ChordQuality {
    pub const ALL: [ChordQuality; 28] = [
        ChordQuality::Major,
        ChordQuality::Major7,
        ChordQuality::Major9,
        ChordQuality::Major6,
        ChordQuality::Add9,
        ChordQuality::Minor,
        ChordQuality::Minor7,
        ChordQuality::Minor9,
        ChordQuality::Minor6,
        ChordQuality::MinorMajor7,
        ChordQuality::Dominant7,
        ChordQuality::Dominant9,
        ChordQuality::Dominant11,
        ChordQuality::Dominant13,
        ChordQuality::Diminished,
        ChordQuality::Diminished7,
        ChordQuality::HalfDiminished7,
        ChordQuality::Augmented,
        ChordQuality::Augmented7,
        ChordQuality::Suspended2,
        ChordQuality::Suspended4,
        ChordQuality::Dominant7Sus2,
        ChordQuality::Dominant7Sus4,
        ChordQuality::Dominant7Flat5,
        ChordQuality::Dominant7Sharp5,
        ChordQuality::Dominant7Flat9,
        ChordQuality::Dominant7Sharp9,
        ChordQuality::Dominant7Sharp11,
    ];

    /// Label used in chord names: "C4 maj", "G3 7/B3"
    pub fn label(&self) -> &'static str {
        match self {
            ChordQuality::Major => "maj",
            ChordQuality::Major7 => "maj7",
            ChordQuality::Major9 => "maj9",
            ChordQuality::Major6 => "6",
            ChordQuality::Add9 => "add9",
            ChordQuality::Minor => "m",
            ChordQuality::Minor7 => "m7",
            ChordQuality::Minor9 => "m9",
            ChordQuality::Minor6 => "m6",
            ChordQuality::MinorMajor7 => "mMaj7",
            ChordQuality::Dominant7 => "7",
            ChordQuality::Dominant9 => "9",
            ChordQuality::Dominant11 => "11",
            ChordQuality::Dominant13 => "13",
            ChordQuality::Diminished => "dim",
            ChordQuality::Diminished7 => "dim7",
            ChordQuality::HalfDiminished7 => "ø7",
            ChordQuality::Augmented => "aug",
            ChordQuality::Augmented7 => "aug7",
            ChordQuality::Suspended2 => "sus2",
            ChordQuality::Suspended4 => "sus4",
            ChordQuality::Dominant7Sus2 => "7sus2",
            ChordQuality::Dominant7Sus4 => "7sus4",
            ChordQuality::Dominant7Flat5 => "7♭5",
            ChordQuality::Dominant7Sharp5 => "7#5",
            ChordQuality::Dominant7Flat9 => "7♭9",
            ChordQuality::Dominant7Sharp9 => "7#9",
            ChordQuality::Dominant7Sharp11 => "7#11",
        }
    }

    /// Semitone offsets from the root. Extensions keep their compound
    /// offsets (a ninth is 14, not 2).
    pub fn intervals(&self) -> &'static [u8] {
        match self {
            ChordQuality::Major => &[0, 4, 7],
            ChordQuality::Major7 => &[0, 4, 7, 11],
            ChordQuality::Major9 => &[0, 4, 7, 11, 14],
            ChordQuality::Major6 => &[0, 4, 7, 9],
            ChordQuality::Add9 => &[0, 4, 7, 14],
            ChordQuality::Minor => &[0, 3, 7],
            ChordQuality::Minor7 => &[0, 3, 7, 10],
            ChordQuality::Minor9 => &[0, 3, 7, 10, 14],
            ChordQuality::Minor6 => &[0, 3, 7, 9],
            ChordQuality::MinorMajor7 => &[0, 3, 7, 11],
            ChordQuality::Dominant7 => &[0, 4, 7, 10],
            ChordQuality::Dominant9 => &[0, 4, 7, 10, 14],
            ChordQuality::Dominant11 => &[0, 4, 7, 10, 14, 17],
            ChordQuality::Dominant13 => &[0, 4, 7, 10, 14, 17, 21],
            ChordQuality::Diminished => &[0, 3, 6],
            ChordQuality::Diminished7 => &[0, 3, 6, 9],
            ChordQuality::HalfDiminished7 => &[0, 3, 6, 10],
            ChordQuality::Augmented => &[0, 4, 8],
            ChordQuality::Augmented7 => &[0, 4, 8, 10],
            ChordQuality::Suspended2 => &[0, 2, 7],
            ChordQuality::Suspended4 => &[0, 5, 7],
            ChordQuality::Dominant7Sus2 => &[0, 2, 7, 10],
            ChordQuality::Dominant7Sus4 => &[0, 5, 7, 10],
            ChordQuality::Dominant7Flat5 => &[0, 4, 6, 10],
            ChordQuality::Dominant7Sharp5 => &[0, 4, 8, 10],
            ChordQuality::Dominant7Flat9 => &[0, 4, 7, 10, 13],
            ChordQuality::Dominant7Sharp9 => &[0, 4, 7, 10, 15],
            ChordQuality::Dominant7Sharp11 => &[0, 4, 7, 10, 18],
        }
    }

    /// Qualities whose label carries a 7. Ninth, eleventh and thirteenth
    /// chords are labelled without one and are not figured as sevenths.
    pub fn has_seventh(&self) -> bool {
        matches!(
            self,
            ChordQuality::Major7
                | ChordQuality::Minor7
                | ChordQuality::MinorMajor7
                | ChordQuality::Dominant7
                | ChordQuality::Diminished7
                | ChordQuality::HalfDiminished7
                | ChordQuality::Augmented7
                | ChordQuality::Dominant7Sus2
                | ChordQuality::Dominant7Sus4
                | ChordQuality::Dominant7Flat5
                | ChordQuality::Dominant7Sharp5
                | ChordQuality::Dominant7Flat9
                | ChordQuality::Dominant7Sharp9
                | ChordQuality::Dominant7Sharp11
        )
    }

    /// Qualities expected on a major-sounding degree (I, IV, V in major).
    pub fn is_major_family(&self) -> bool {
        matches!(
            self,
            ChordQuality::Major
                | ChordQuality::Dominant7
                | ChordQuality::Major7
                | ChordQuality::Dominant9
                | ChordQuality::Major6
                | ChordQuality::Add9
        )
    }

    pub fn is_minor_family(&self) -> bool {
        matches!(
            self,
            ChordQuality::Minor
                | ChordQuality::Minor7
                | ChordQuality::Minor9
                | ChordQuality::Minor6
                | ChordQuality::MinorMajor7
        )
    }

    pub fn is_diminished_family(&self) -> bool {
        matches!(
            self,
            ChordQuality::Diminished | ChordQuality::Diminished7 | ChordQuality::HalfDiminished7
        )
    }
}

impl std::fmt::Display for ChordQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A diatonic scale degree, 1 through 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScaleDegree(u8);

impl ScaleDegree {
    pub const fn new(degree: u8) -> Option<Self> {
        if degree >= 1 && degree <= 7 {
            Some(Self(degree))
        } else {
            None
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero-based position, for indexing 7-entry tables.
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn all() -> impl Iterator<Item = ScaleDegree> {
        (1..=7).map(ScaleDegree)
    }
}

impl std::fmt::Display for ScaleDegree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Full interpretation of three or more held notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordAnalysis {
    /// "B4 dim/D5", or "Cluster (4 notes)" when nothing matched
    pub chord_name: String,
    /// "vii°⁶", "V⁷/ii", "?" for clusters
    pub roman_numeral: String,
    /// "Leading Tone", "Secondary Dominant", "Non-functional"
    pub function_name: String,
    pub is_non_diatonic: bool,
    pub is_secondary_dominant: bool,
    /// Target of a secondary dominant: "ii" in "V/ii"
    pub secondary_target: String,
    /// "⁶", "₆₄", "⁷", "⁶₅", "₄³", "₄₂"
    pub inversion_figure: String,
    /// Held notes outside the key, in input order
    pub accidental_notes: Vec<u8>,
    /// Lowest held note
    pub bass_note: u8,
    /// Harmonic root; equals `bass_note` for clusters
    pub root_note: u8,
    /// `None` for clusters
    pub quality: Option<ChordQuality>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_every_quality_once() {
        let mut labels: Vec<_> = ChordQuality::ALL.iter().map(|q| q.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), ChordQuality::ALL.len());
    }

    #[test]
    fn seventh_flag_follows_label() {
        for quality in ChordQuality::ALL {
            assert_eq!(
                quality.has_seventh(),
                quality.label().contains('7'),
                "{quality:?}"
            );
        }
    }

    #[test]
    fn scale_degree_bounds() {
        assert!(ScaleDegree::new(0).is_none());
        assert!(ScaleDegree::new(8).is_none());
        assert_eq!(ScaleDegree::new(7).map(|d| d.index()), Some(6));
        assert_eq!(ScaleDegree::all().count(), 7);
    }

    #[test]
    fn quality_serializes_snake_case() {
        let json = serde_json::to_string(&ChordQuality::HalfDiminished7).unwrap();
        assert_eq!(json, "\"half_diminished7\"");
    }
}
