//! Spine weight index: character weight of each linear section

use crate::error::{LoadError, Result};
use crate::provider::SectionProvider;
use serde::Serialize;

/// Weight of one linear section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpineEntry {
    /// Spine index of the section
    pub section_index: usize,

    /// Meaningful characters in the section
    pub character_count: usize,

    /// Characters in all linear sections before this one
    pub cumulative_before: usize,
}

/// Prefix sums of section weights over the linear reading order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpineIndex {
    entries: Vec<SpineEntry>,
    total_characters: usize,
}

impl SpineIndex {
    /// Build the index from a provider's sections
    ///
    /// Non-linear sections are left out. A linear section that cannot
    /// produce a document weighs nothing; a loader failure aborts the build.
    pub async fn build(provider: &dyn SectionProvider) -> Result<Self> {
        let mut entries = Vec::new();
        let mut total_characters = 0usize;

        for section in provider.sections().iter().filter(|s| s.is_linear()) {
            let character_count = match section.character_count().await {
                Ok(count) => count,
                Err(LoadError::NotFound(_)) if !section.has_loader() => {
                    tracing::warn!(
                        "Section {} has no document, counting it as empty",
                        section.href()
                    );
                    0
                }
                Err(e) => return Err(e.into()),
            };

            entries.push(SpineEntry {
                section_index: section.index(),
                character_count,
                cumulative_before: total_characters,
            });
            total_characters += character_count;
        }

        tracing::info!(
            "Built spine index: {} linear sections, {} characters",
            entries.len(),
            total_characters
        );

        Ok(Self {
            entries,
            total_characters,
        })
    }

    /// Weight entry for a section, `None` for non-linear or unknown sections
    pub fn entry(&self, section_index: usize) -> Option<&SpineEntry> {
        self.entries
            .binary_search_by_key(&section_index, |e| e.section_index)
            .ok()
            .map(|i| &self.entries[i])
    }

    pub fn entries(&self) -> &[SpineEntry] {
        &self.entries
    }

    /// Characters in all linear sections
    pub fn total_characters(&self) -> usize {
        self.total_characters
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
