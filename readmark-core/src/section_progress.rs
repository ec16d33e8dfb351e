//! Section progress: where a location sits inside its own section

use crate::document::SectionDocument;
use crate::navigation::NavigationResolver;
use crate::offset::SectionOffsets;
use crate::provider::SectionProvider;
use crate::types::{Anchor, LocalProgress};
use std::sync::Arc;

/// Resolves locations and measures them within their section
///
/// Every failure (resolver fault, unknown section, missing loader, anchor
/// not found in the document) is reported through `tracing` and returned as
/// `None`.
#[derive(Clone)]
pub struct SectionProgress {
    resolver: Arc<dyn NavigationResolver>,
    provider: Arc<dyn SectionProvider>,
}

impl SectionProgress {
    pub fn new(resolver: Arc<dyn NavigationResolver>, provider: Arc<dyn SectionProvider>) -> Self {
        Self { resolver, provider }
    }

    /// The section provider this facade reads from
    pub fn provider(&self) -> &dyn SectionProvider {
        self.provider.as_ref()
    }

    /// Position of `location` within its section
    pub async fn get_progress(&self, location: &str) -> Option<LocalProgress> {
        let navigation = match self.resolver.resolve(location) {
            Ok(Some(navigation)) => navigation,
            Ok(None) => {
                tracing::debug!("Location {:?} did not resolve", location);
                return None;
            }
            Err(e) => {
                tracing::warn!("Failed to resolve location {:?}: {}", location, e);
                return None;
            }
        };

        let (section_index, anchor) = match (navigation.section_index, navigation.anchor) {
            (Some(index), Some(anchor)) => (index, anchor),
            _ => {
                tracing::debug!("Location {:?} has no section or anchor", location);
                return None;
            }
        };

        let Some(section) = self.provider.section(section_index) else {
            tracing::debug!("Location {:?} points past the spine ({})", location, section_index);
            return None;
        };

        let markup = match section.load().await {
            Some(Ok(markup)) => markup,
            Some(Err(e)) => {
                tracing::warn!("Failed to load section {}: {}", section.href(), e);
                return None;
            }
            None => {
                tracing::debug!("Section {} cannot produce a document", section.href());
                return None;
            }
        };

        let Some(offsets) = locate(&markup, &anchor) else {
            tracing::debug!(
                "Anchor for {:?} not found in section {}",
                location,
                section.href()
            );
            return None;
        };

        Some(LocalProgress {
            section_index,
            fraction: offsets.fraction(),
            end_fraction: offsets.end_fraction(),
        })
    }
}

/// Parse a section and locate the anchor in it
fn locate(markup: &str, anchor: &Anchor) -> Option<SectionOffsets> {
    SectionDocument::parse(markup).offsets(anchor)
}
