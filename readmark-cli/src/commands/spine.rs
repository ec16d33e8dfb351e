//! Spine command implementation

use super::open_book;
use anyhow::{Context, Result};
use readmark_core::{SectionProvider, SpineEntry, SpineIndex};
use serde::Serialize;

/// Spine output
#[derive(Serialize)]
struct SpineInfo {
    title: Option<String>,
    sections: usize,
    linear_sections: usize,
    total_characters: usize,
    entries: Vec<SpineEntry>,
}

/// Display the spine weight index of an EPUB
pub async fn spine(input: &str, json: bool) -> Result<()> {
    let book = open_book(input)?;
    let index = SpineIndex::build(&book)
        .await
        .with_context(|| format!("Failed to index {}", input))?;

    let info = SpineInfo {
        title: book.title().map(str::to_string),
        sections: book.len(),
        linear_sections: index.len(),
        total_characters: index.total_characters(),
        entries: index.entries().to_vec(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        if let Some(title) = &info.title {
            println!("Title:       {}", title);
        }
        println!(
            "Sections:    {} ({} linear)",
            info.sections, info.linear_sections
        );
        println!("Characters:  {}", info.total_characters);
        println!();
        for entry in &info.entries {
            let href = book
                .section(entry.section_index)
                .map(|s| s.href())
                .unwrap_or_default();
            println!(
                "{:>4}  {:>8}  {:>8}  {}",
                entry.section_index, entry.cumulative_before, entry.character_count, href
            );
        }
    }

    Ok(())
}
