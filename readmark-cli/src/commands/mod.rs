//! CLI command implementations

mod locate;
mod progress;
mod spine;

pub use locate::locate;
pub use progress::{progress, Rates};
pub use spine::spine;

use anyhow::{Context, Result};
use readmark_core::EpubBook;

/// Open an EPUB with file context on failure
fn open_book(input: &str) -> Result<EpubBook> {
    EpubBook::open(input).with_context(|| format!("Failed to open EPUB: {}", input))
}
