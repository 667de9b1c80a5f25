use crate::types::ChordQuality;

/// A chord template: quality + interval set from root (as bitmask over semitone offsets).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordTemplate {
    pub quality: ChordQuality,
    pub intervals: &'static [u8],
    pub mask: u32, // bit i set means offset i is in the template
}

impl ChordTemplate {
    pub fn new(quality: ChordQuality) -> Self {
        let intervals = quality.intervals();
        Self {
            quality,
            intervals,
            mask: interval_mask(intervals),
        }
    }

    pub fn label(&self) -> &'static str {
        self.quality.label()
    }

    pub fn size(&self) -> usize {
        self.intervals.len()
    }
}

/// Bitmask with one bit per offset. Offsets stay unreduced, so a ninth sets bit 14.
pub fn interval_mask(intervals: &[u8]) -> u32 {
    intervals.iter().fold(0u32, |mask, &i| mask | (1 << i))
}

/// Ordered, read-only catalog of chord templates.
///
/// Iteration order matters: the matcher takes the first template that fits.
#[derive(Debug, Clone)]
pub struct ChordPatternLibrary {
    templates: Vec<ChordTemplate>,
}

impl ChordPatternLibrary {
    /// Every known quality, in `ChordQuality::ALL` order.
    pub fn standard() -> Self {
        Self::from_qualities(&ChordQuality::ALL)
    }

    pub fn from_qualities(qualities: &[ChordQuality]) -> Self {
        Self {
            templates: qualities.iter().copied().map(ChordTemplate::new).collect(),
        }
    }

    pub fn templates(&self) -> &[ChordTemplate] {
        &self.templates
    }

    /// `(label, intervals)` pairs in library order.
    pub fn patterns(&self) -> impl Iterator<Item = (&'static str, &'static [u8])> + '_ {
        self.templates.iter().map(|t| (t.label(), t.intervals))
    }

    /// First template whose interval set equals `mask` exactly.
    pub fn lookup(&self, mask: u32) -> Option<&ChordTemplate> {
        self.templates.iter().find(|t| t.mask == mask)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl Default for ChordPatternLibrary {
    fn default() -> Self {
        Self::standard()
    }
}
