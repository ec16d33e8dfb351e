//! Book progress: fraction, section, virtual page and reading time

use crate::config::ProgressConfig;
use crate::error::Result;
use crate::navigation::NavigationResolver;
use crate::provider::SectionProvider;
use crate::section_progress::SectionProgress;
use crate::spine::{SpineEntry, SpineIndex};
use crate::types::{BookProgress, LocalProgress, PageLocation, ReadingTime, SectionPosition};
use std::sync::Arc;

/// Reading-progress engine for one book
///
/// Holds the spine index built when the engine is created. Each call is an
/// independent request; nothing is retained between calls apart from the
/// section character counts cached on the provider's sections.
#[derive(Clone)]
pub struct BookProgressEngine {
    sections: SectionProgress,
    spine: SpineIndex,
    config: ProgressConfig,
}

impl BookProgressEngine {
    /// Create an engine, building the spine index from the provider
    pub async fn new(
        resolver: Arc<dyn NavigationResolver>,
        provider: Arc<dyn SectionProvider>,
        config: ProgressConfig,
    ) -> Result<Self> {
        config.validate()?;
        let spine = SpineIndex::build(provider.as_ref()).await?;
        Ok(Self {
            sections: SectionProgress::new(resolver, provider),
            spine,
            config,
        })
    }

    pub fn spine(&self) -> &SpineIndex {
        &self.spine
    }

    pub fn config(&self) -> &ProgressConfig {
        &self.config
    }

    /// Position of `location` within its own section
    pub async fn get_progress(&self, location: &str) -> Option<LocalProgress> {
        self.sections.get_progress(location).await
    }

    /// Position of `location` within the whole book
    ///
    /// `None` for anything that does not resolve, including locations in
    /// non-linear sections, which carry no reading weight.
    pub async fn get_book_progress(&self, location: &str) -> Option<BookProgress> {
        let local = self.sections.get_progress(location).await?;
        let Some(entry) = self.spine.entry(local.section_index) else {
            tracing::debug!(
                "Section {} is not part of the linear reading order",
                local.section_index
            );
            return None;
        };
        Some(self.aggregate(&local, entry))
    }

    fn aggregate(&self, local: &LocalProgress, entry: &SpineEntry) -> BookProgress {
        let total = self.spine.total_characters();
        let fraction = self.global_fraction(entry, local.fraction);

        let pages = page_count(total, self.config.chars_per_page);
        let current = self.page_at(fraction, pages);
        let next = local
            .end_fraction
            .map(|end| self.page_at(self.global_fraction(entry, end), pages))
            .map_or(current, |end_page| end_page.max(current));

        let remaining_book = chars_at(1.0 - fraction, total);
        let remaining_section = chars_at(1.0 - local.fraction, entry.character_count);

        BookProgress {
            fraction,
            section: SectionPosition {
                current: local.section_index,
                total: self.sections.provider().len(),
            },
            location: PageLocation {
                current,
                next,
                total: pages,
            },
            time: ReadingTime {
                section: minutes_for(remaining_section, self.config.chars_per_minute),
                total: minutes_for(remaining_book, self.config.chars_per_minute),
            },
        }
    }

    fn global_fraction(&self, entry: &SpineEntry, local: f64) -> f64 {
        let total = self.spine.total_characters();
        if total == 0 {
            return 0.0;
        }
        let position = entry.cumulative_before as f64 + local * entry.character_count as f64;
        (position / total as f64).clamp(0.0, 1.0)
    }

    fn page_at(&self, fraction: f64, pages: usize) -> usize {
        let position = chars_at(fraction, self.spine.total_characters());
        (position / self.config.chars_per_page as u64).min(pages as u64 - 1) as usize
    }
}

/// Virtual pages in a book of `total` characters, at least one
fn page_count(total: usize, chars_per_page: usize) -> usize {
    total.div_ceil(chars_per_page).max(1)
}

/// Whole characters covered by `fraction` of `total`
///
/// Rounds away float noise: character positions are integers.
fn chars_at(fraction: f64, total: usize) -> u64 {
    (fraction.clamp(0.0, 1.0) * total as f64).round() as u64
}

fn minutes_for(chars: u64, chars_per_minute: usize) -> u64 {
    chars.div_ceil(chars_per_minute as u64)
}
