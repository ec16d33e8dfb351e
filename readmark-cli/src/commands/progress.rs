//! Progress command implementation

use super::open_book;
use anyhow::{bail, Context, Result};
use readmark_core::{BookProgress, BookProgressEngine, CfiResolver, ProgressConfig};
use serde::Serialize;
use std::sync::Arc;

/// Rate overrides from the command line
#[derive(Debug, Default, Clone, Copy)]
pub struct Rates {
    pub chars_per_page: Option<usize>,
    pub chars_per_minute: Option<usize>,
}

/// One resolved location in JSON output
#[derive(Serialize)]
struct LocationProgress<'a> {
    location: &'a str,
    progress: Option<BookProgress>,
}

/// Report book progress for each location
pub async fn progress(input: &str, locations: &[String], rates: Rates, json: bool) -> Result<()> {
    let mut config = ProgressConfig::from_env().context("Invalid progress configuration")?;
    if let Some(chars) = rates.chars_per_page {
        config = config.with_chars_per_page(chars);
    }
    if let Some(chars) = rates.chars_per_minute {
        config = config.with_chars_per_minute(chars);
    }

    let book = open_book(input)?;
    let engine = BookProgressEngine::new(Arc::new(CfiResolver::new()), Arc::new(book), config)
        .await
        .with_context(|| format!("Failed to index {}", input))?;

    let mut results = Vec::with_capacity(locations.len());
    let mut unresolved = 0;
    for location in locations {
        let progress = engine.get_book_progress(location).await;
        if progress.is_none() {
            eprintln!("unresolved: {}", location);
            unresolved += 1;
        }
        results.push(LocationProgress {
            location,
            progress,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for result in &results {
            let Some(progress) = &result.progress else {
                continue;
            };
            println!("{}", result.location);
            println!("  Progress:  {}%", progress.percent());
            println!(
                "  Section:   {} of {}",
                progress.section.current + 1,
                progress.section.total
            );
            println!(
                "  Page:      {} of {} (next {})",
                progress.location.current + 1,
                progress.location.total,
                progress.location.next + 1
            );
            println!(
                "  Time left: {} min in section, {} min in book",
                progress.time.section, progress.time.total
            );
        }
    }

    if unresolved > 0 {
        bail!(
            "{} of {} locations could not be resolved",
            unresolved,
            locations.len()
        );
    }
    Ok(())
}
