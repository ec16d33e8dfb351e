//! Section type representing one spine item of a book

use crate::document::SectionDocument;
use crate::error::LoadError;
use crate::provider::DocumentLoader;
use std::fmt;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// One readable unit of the book's reading order
pub struct Section {
    /// Zero-based position in the spine
    index: usize,

    /// Content document reference, used for diagnostics
    href: String,

    /// Whether the section takes part in normal reading order
    linear: bool,

    /// Produces the section markup, if this section can be loaded at all
    loader: Option<Arc<dyn DocumentLoader>>,

    /// Meaningful text characters, computed on first access
    character_count: OnceCell<usize>,
}

impl Section {
    /// Create a linear section with the given spine index
    pub fn new(index: usize, href: impl Into<String>) -> Self {
        Self {
            index,
            href: href.into(),
            linear: true,
            loader: None,
            character_count: OnceCell::new(),
        }
    }

    /// Set the linear flag
    pub fn with_linear(mut self, linear: bool) -> Self {
        self.linear = linear;
        self
    }

    /// Attach a document loader
    pub fn with_loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn is_linear(&self) -> bool {
        self.linear
    }

    /// Whether this section can produce a document
    pub fn has_loader(&self) -> bool {
        self.loader.is_some()
    }

    /// Fetch the section markup; `None` when the section has no loader
    pub async fn load(&self) -> Option<Result<String, LoadError>> {
        match &self.loader {
            Some(loader) => Some(loader.load().await),
            None => None,
        }
    }

    /// Total meaningful characters in the section
    ///
    /// Parses the document once on first call and caches the count for the
    /// lifetime of the section. Concurrent first callers share a single
    /// computation.
    pub async fn character_count(&self) -> Result<usize, LoadError> {
        let count = self
            .character_count
            .get_or_try_init(|| async {
                let markup = match &self.loader {
                    Some(loader) => loader.load().await?,
                    None => return Err(LoadError::NotFound(self.href.clone())),
                };
                Ok::<_, LoadError>(SectionDocument::parse(&markup).total_characters())
            })
            .await?;
        Ok(*count)
    }

    /// The cached count, if it has been computed
    pub fn cached_character_count(&self) -> Option<usize> {
        self.character_count.get().copied()
    }
}

impl fmt::Debug for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Section")
            .field("index", &self.index)
            .field("href", &self.href)
            .field("linear", &self.linear)
            .field("has_loader", &self.loader.is_some())
            .field("character_count", &self.character_count.get())
            .finish()
    }
}
