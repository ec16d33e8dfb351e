//! In-memory section provider

use super::{DocumentLoader, SectionProvider};
use crate::error::LoadError;
use crate::types::Section;
use async_trait::async_trait;
use std::sync::Arc;

/// A loader returning fixed markup
#[derive(Debug, Clone)]
pub struct StaticDocument {
    markup: Arc<str>,
}

impl StaticDocument {
    pub fn new(markup: impl Into<Arc<str>>) -> Self {
        Self {
            markup: markup.into(),
        }
    }
}

#[async_trait]
impl DocumentLoader for StaticDocument {
    async fn load(&self) -> Result<String, LoadError> {
        Ok(self.markup.to_string())
    }
}

/// A book whose sections are held in memory
#[derive(Debug, Default)]
pub struct MemoryBook {
    sections: Vec<Section>,
}

impl MemoryBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a linear section
    pub fn with_section(self, markup: impl Into<Arc<str>>) -> Self {
        self.push(markup.into(), true)
    }

    /// Append a section marked `linear="no"`
    pub fn with_non_linear_section(self, markup: impl Into<Arc<str>>) -> Self {
        self.push(markup.into(), false)
    }

    /// Append a section that cannot produce a document
    pub fn with_unloadable_section(mut self) -> Self {
        let index = self.sections.len();
        self.sections
            .push(Section::new(index, format!("section-{index}")));
        self
    }

    fn push(mut self, markup: Arc<str>, linear: bool) -> Self {
        let index = self.sections.len();
        let section = Section::new(index, format!("section-{index}"))
            .with_linear(linear)
            .with_loader(Arc::new(StaticDocument::new(markup)));
        self.sections.push(section);
        self
    }
}

impl SectionProvider for MemoryBook {
    fn sections(&self) -> &[Section] {
        &self.sections
    }
}
