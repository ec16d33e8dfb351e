//! Core types for the reading-progress engine

mod anchor;
mod progress;
mod section;

pub use anchor::{Anchor, LazyAnchor, NodePath, Point, Region};
pub use progress::{BookProgress, LocalProgress, PageLocation, ReadingTime, SectionPosition};
pub use section::Section;
