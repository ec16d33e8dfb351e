//! Locate command implementation

use super::open_book;
use anyhow::{Context, Result};
use readmark_core::{CfiResolver, SectionDocument, SectionProvider};

/// Print the CFI of the first point at or after `percent` of a section
pub async fn locate(input: &str, section_index: usize, percent: f64) -> Result<()> {
    let book = open_book(input)?;
    let section = book
        .section(section_index)
        .with_context(|| format!("{} has no section {}", input, section_index))?;

    let markup = section
        .load()
        .await
        .with_context(|| format!("Section {} has no document", section.href()))?
        .with_context(|| format!("Failed to load section {}", section.href()))?;

    let document = SectionDocument::parse(&markup);
    let total = document.total_characters();
    let target = ((percent / 100.0) * total as f64).ceil() as usize;
    tracing::debug!("Locating character {} of {}", target, total);

    let point = document
        .point_at_character(target)
        .with_context(|| format!("Section {} has no text", section.href()))?;
    let cfi = CfiResolver::cfi_for(section_index, &document, &point)
        .context("Could not express the position as a CFI")?;

    println!("{}", cfi);
    Ok(())
}
