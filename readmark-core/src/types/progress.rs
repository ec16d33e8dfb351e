//! Progress results returned by the engine

use serde::{Deserialize, Serialize};

/// Position within a single section
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalProgress {
    /// Spine index of the section
    pub section_index: usize,

    /// Characters before the anchor divided by characters in the section
    pub fraction: f64,

    /// Fraction of the region end, for anchors wider than a point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_fraction: Option<f64>,
}

/// Section counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionPosition {
    pub current: usize,
    pub total: usize,
}

/// Virtual page location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    pub current: usize,
    pub next: usize,
    pub total: usize,
}

/// Estimated minutes of reading left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadingTime {
    /// Minutes left in the current section
    pub section: u64,

    /// Minutes left in the book
    pub total: u64,
}

/// Book-wide progress for one location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BookProgress {
    pub fraction: f64,
    pub section: SectionPosition,
    pub location: PageLocation,
    pub time: ReadingTime,
}

impl BookProgress {
    /// Progress as a whole percentage, rounded down
    pub fn percent(&self) -> u8 {
        (self.fraction * 100.0).floor().clamp(0.0, 100.0) as u8
    }
}
