use tracing::trace;

use crate::chord_templates::ChordPatternLibrary;
use crate::keys::KeySignature;
use crate::naming::note_name_in_key;
use crate::types::ChordQuality;

/// Result of root-finding over a held note set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChordMatch {
    pub quality: ChordQuality,
    /// MIDI note chosen as root (one of the held notes)
    pub root: u8,
    /// "G3 7/B2": root name, label, and slash bass when inverted
    pub display_name: String,
}

/// Convert notes to a pitch-class interval bitmask relative to a root note.
fn to_interval_mask(notes: &[u8], root: u8) -> u32 {
    notes.iter().fold(0u32, |mask, &note| {
        let interval = (note as i32 - root as i32).rem_euclid(12);
        mask | (1 << interval)
    })
}

/// Find the first root/quality interpretation of `notes`.
///
/// `notes` must be ascending and distinct. Each held note is tried as
/// root, lowest first; for each root the interval set is reduced to pitch
/// classes and compared for equality against the library in order. The
/// first hit wins. Templates with compound offsets (9ths and beyond) can
/// never equal a reduced set.
pub fn match_chord(
    notes: &[u8],
    key: &KeySignature,
    library: &ChordPatternLibrary,
) -> Option<ChordMatch> {
    let &bass = notes.first()?;

    for &root in notes {
        let mask = to_interval_mask(notes, root);
        trace!(root, mask, "trying root");

        if let Some(template) = library.lookup(mask) {
            let mut display_name =
                format!("{} {}", note_name_in_key(root, key), template.label());
            if bass != root {
                display_name.push('/');
                display_name.push_str(&note_name_in_key(bass, key));
            }

            return Some(ChordMatch {
                quality: template.quality,
                root,
                display_name,
            });
        }
    }

    None
}
