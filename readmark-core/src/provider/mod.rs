//! Section providers: the reading order of a book and its documents

mod epub;
mod memory;

pub use self::epub::EpubBook;
pub use memory::{MemoryBook, StaticDocument};

use crate::error::LoadError;
use crate::types::Section;
use async_trait::async_trait;

/// Produces the markup of one section
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Fetch the section's XHTML/HTML source
    async fn load(&self) -> Result<String, LoadError>;
}

/// Ordered sections of a book
pub trait SectionProvider: Send + Sync {
    /// All sections in spine order, linear or not
    fn sections(&self) -> &[Section];

    /// Section at a spine index
    fn section(&self, index: usize) -> Option<&Section> {
        self.sections().get(index)
    }

    /// Number of sections in the reading order
    fn len(&self) -> usize {
        self.sections().len()
    }

    fn is_empty(&self) -> bool {
        self.sections().is_empty()
    }
}
