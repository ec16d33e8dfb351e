//! Navigation resolution: location reference to section and anchor

use crate::error::ResolveError;
use crate::types::Anchor;

/// Where a location reference resolves to
#[derive(Debug, Clone, Default)]
pub struct Navigation {
    /// Spine index of the section
    pub section_index: Option<usize>,

    /// Position inside the section
    pub anchor: Option<Anchor>,
}

impl Navigation {
    pub fn new(section_index: usize, anchor: Anchor) -> Self {
        Self {
            section_index: Some(section_index),
            anchor: Some(anchor),
        }
    }
}

/// Turns opaque location strings into navigation targets
///
/// `Ok(None)` means the location is unknown; `Err` means the resolver
/// faulted. Both end up as an absent progress result.
pub trait NavigationResolver: Send + Sync {
    fn resolve(&self, location: &str) -> Result<Option<Navigation>, ResolveError>;
}

impl<F> NavigationResolver for F
where
    F: Fn(&str) -> Result<Option<Navigation>, ResolveError> + Send + Sync,
{
    fn resolve(&self, location: &str) -> Result<Option<Navigation>, ResolveError> {
        self(location)
    }
}
