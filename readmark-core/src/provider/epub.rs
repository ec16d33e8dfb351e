//! EPUB-backed section provider

use super::{SectionProvider, StaticDocument};
use crate::error::{ProgressError, Result};
use crate::types::Section;
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

/// The spine of an EPUB 2/3 file
///
/// Spine documents are extracted into memory when the book is opened; the
/// sections parse them on demand.
#[derive(Debug)]
pub struct EpubBook {
    title: Option<String>,
    sections: Vec<Section>,
}

impl EpubBook {
    /// Open an EPUB file from disk
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(data)
    }

    /// Read an EPUB from memory
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let mut epub = ::epub::doc::EpubDoc::from_reader(Cursor::new(data))
            .map_err(|e| ProgressError::Epub(e.to_string()))?;

        let title = epub.mdata("title").map(|item| item.value.clone());

        let spine = epub.spine.clone();
        let mut sections = Vec::with_capacity(spine.len());
        for (index, item) in spine.iter().enumerate() {
            let mut section = Section::new(index, item.idref.clone()).with_linear(item.linear);
            match epub.get_resource_str(&item.idref) {
                Some((content, _mime)) => {
                    section = section.with_loader(Arc::new(StaticDocument::new(content)));
                }
                None => {
                    tracing::warn!("Spine item {} has no readable resource", item.idref);
                }
            }
            sections.push(section);
        }

        tracing::debug!("Opened EPUB with {} spine items", sections.len());
        Ok(Self { title, sections })
    }

    /// Book title from the package metadata
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl SectionProvider for EpubBook {
    fn sections(&self) -> &[Section] {
        &self.sections
    }
}
