//! Readmark Core Library
//!
//! Reading-progress engine for reflowable books. A location reference (an
//! EPUB CFI or any other string an injected [`NavigationResolver`]
//! understands) is turned into a position within its section and within the
//! whole book: a fraction, a section counter, a virtual page and an
//! estimated reading time. Pages and time are derived from character counts.
//!
//! The progress APIs never fail: anything that cannot be resolved yields
//! `None`, and the cause is reported through `tracing`.

pub mod book_progress;
pub mod cfi;
pub mod config;
pub mod document;
pub mod error;
pub mod navigation;
pub mod offset;
pub mod provider;
pub mod section_progress;
pub mod spine;
pub mod types;

pub use book_progress::BookProgressEngine;
pub use cfi::{Cfi, CfiResolver};
pub use config::ProgressConfig;
pub use document::SectionDocument;
pub use error::{ConfigError, LoadError, ProgressError, ResolveError, Result};
pub use navigation::{Navigation, NavigationResolver};
pub use offset::SectionOffsets;
pub use provider::{DocumentLoader, EpubBook, MemoryBook, SectionProvider};
pub use section_progress::SectionProgress;
pub use spine::{SpineEntry, SpineIndex};
pub use types::{
    Anchor, BookProgress, LazyAnchor, LocalProgress, NodePath, PageLocation, Point, ReadingTime,
    Region, Section, SectionPosition,
};
