//! End-to-end progress tests for readmark-core
//!
//! These tests drive the engine through the CFI resolver over in-memory
//! books and check the numeric guarantees of the progress results:
//! bounds, monotonicity, determinism and graceful failure.

use proptest::prelude::*;
use readmark_core::{
    BookProgressEngine, CfiResolver, MemoryBook, ProgressConfig, SectionDocument,
};
use std::sync::Arc;

// =============================================================================
// Helpers
// =============================================================================

/// Wrap body markup in a minimal XHTML chapter
fn chapter(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Chapter</title></head>
<body>{body}</body>
</html>"#
    )
}

async fn engine(book: MemoryBook) -> BookProgressEngine {
    engine_with(book, ProgressConfig::default()).await
}

async fn engine_with(book: MemoryBook, config: ProgressConfig) -> BookProgressEngine {
    BookProgressEngine::new(Arc::new(CfiResolver::new()), Arc::new(book), config)
        .await
        .expect("engine should build")
}

fn three_chapters() -> MemoryBook {
    MemoryBook::new()
        .with_section(chapter("<p>aaaa</p>"))
        .with_section(chapter("<p>bbbb</p>"))
        .with_section(chapter("<p>cccc</p>"))
}

// =============================================================================
// Worked scenarios
// =============================================================================

#[tokio::test]
async fn test_single_section_offsets() {
    let engine = engine(MemoryBook::new().with_section(chapter("<p>abcdefghij</p>"))).await;

    for (cfi, expected) in [
        ("epubcfi(/6/2!/4/2/1:0)", 0.0),
        ("epubcfi(/6/2!/4/2/1:5)", 0.5),
        ("epubcfi(/6/2!/4/2/1:10)", 1.0),
    ] {
        let local = engine.get_progress(cfi).await.expect("should resolve");
        assert_eq!(local.section_index, 0);
        assert_eq!(local.fraction, expected, "{cfi}");

        let book = engine.get_book_progress(cfi).await.expect("should resolve");
        assert_eq!(book.fraction, expected, "{cfi}");
    }
}

#[tokio::test]
async fn test_three_paragraphs_in_one_section() {
    let engine = engine(
        MemoryBook::new().with_section(chapter("<p>aaaa</p>\n<p>bbbb</p>\n<p>cccc</p>")),
    )
    .await;

    let progress = engine
        .get_book_progress("epubcfi(/6/2!/4/4/1:0)")
        .await
        .unwrap();
    assert!((progress.fraction - 4.0 / 12.0).abs() < 1e-12);
}

#[tokio::test]
async fn test_three_sections() {
    let engine = engine(three_chapters()).await;

    let progress = engine
        .get_book_progress("epubcfi(/6/4!/4/2/1:0)")
        .await
        .unwrap();
    assert!((progress.fraction - 4.0 / 12.0).abs() < 1e-12);
    assert_eq!(progress.section.current, 1);
    assert_eq!(progress.section.total, 3);
}

#[tokio::test]
async fn test_section_starts_strictly_increase() {
    let engine = engine(three_chapters()).await;

    let mut fractions = Vec::new();
    for section in 0..3 {
        let cfi = format!("epubcfi(/6/{}!/4/2/1:0)", (section + 1) * 2);
        fractions.push(engine.get_book_progress(&cfi).await.unwrap().fraction);
    }
    assert!(fractions.windows(2).all(|w| w[0] < w[1]), "{fractions:?}");
}

#[tokio::test]
async fn test_progress_snapshot() {
    let engine = engine(
        MemoryBook::new()
            .with_section(chapter("<p>aaaa</p>"))
            .with_section(chapter("<p>bbbb</p>")),
    )
    .await;

    let progress = engine
        .get_book_progress("epubcfi(/6/4[ch2]!/4[body]/2/1:0)")
        .await
        .unwrap();
    insta::assert_json_snapshot!(progress, @r###"
    {
      "fraction": 0.5,
      "section": {
        "current": 1,
        "total": 2
      },
      "location": {
        "current": 0,
        "next": 0,
        "total": 1
      },
      "time": {
        "section": 1,
        "total": 1
      }
    }
    "###);
}

// =============================================================================
// Pagination and reading time
// =============================================================================

#[tokio::test]
async fn test_range_spans_pages() {
    let config = ProgressConfig::default().with_chars_per_page(3);
    let engine = engine_with(three_chapters(), config).await;

    let progress = engine
        .get_book_progress("epubcfi(/6/4!/4/2,/1:0,/1:4)")
        .await
        .unwrap();
    assert_eq!(progress.location.current, 1);
    assert_eq!(progress.location.next, 2);
    assert_eq!(progress.location.total, 4);
    assert!(progress.location.current <= progress.location.next);
}

#[tokio::test]
async fn test_reading_time_decreases() {
    let config = ProgressConfig::default().with_chars_per_minute(2);
    let engine = engine_with(three_chapters(), config).await;

    let start = engine
        .get_book_progress("epubcfi(/6/2!/4/2/1:0)")
        .await
        .unwrap();
    let later = engine
        .get_book_progress("epubcfi(/6/6!/4/2/1:2)")
        .await
        .unwrap();
    assert_eq!(start.time.total, 6);
    assert_eq!(start.time.section, 2);
    assert_eq!(later.time.total, 1);
    assert_eq!(later.time.section, 1);
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn test_invalid_locations_are_absent() {
    let engine = engine(three_chapters()).await;

    for location in [
        "",
        "not a cfi",
        "epubcfi(",
        "epubcfi(/6/4!/4/2/1:0",
        "epubcfi(/6/3!/4/2/1:0)",
        // Well-formed but past the spine
        "epubcfi(/6/40!/4/2/1:0)",
        // Well-formed but no such element
        "epubcfi(/6/2!/4/20/1:0)",
        "epubcfi(/6/2!/8/2/1:0)",
    ] {
        assert!(engine.get_progress(location).await.is_none(), "{location:?}");
        assert!(
            engine.get_book_progress(location).await.is_none(),
            "{location:?}"
        );
    }
}

#[tokio::test]
async fn test_empty_section() {
    let engine = engine(
        MemoryBook::new()
            .with_section(chapter("<div><img src=\"cover.jpg\" alt=\"\"/></div>"))
            .with_section(chapter("<p>text</p>")),
    )
    .await;

    let local = engine
        .get_progress("epubcfi(/6/2!/4/2/2)")
        .await
        .unwrap();
    assert_eq!(local.fraction, 0.0);

    let book = engine
        .get_book_progress("epubcfi(/6/2!/4/2/2)")
        .await
        .unwrap();
    assert_eq!(book.fraction, 0.0);
}

#[tokio::test]
async fn test_unloadable_section_is_absent() {
    let engine = engine(
        MemoryBook::new()
            .with_section(chapter("<p>text</p>"))
            .with_unloadable_section(),
    )
    .await;

    assert!(engine
        .get_book_progress("epubcfi(/6/4!/4/2/1:0)")
        .await
        .is_none());
    assert_eq!(engine.spine().total_characters(), 4);
}

#[tokio::test]
async fn test_non_linear_section() {
    let engine = engine(
        MemoryBook::new()
            .with_section(chapter("<p>aaaa</p>"))
            .with_non_linear_section(chapter("<p>footnote</p>"))
            .with_section(chapter("<p>bbbb</p>")),
    )
    .await;

    let cfi = "epubcfi(/6/4!/4/2/1:4)";
    assert_eq!(engine.get_progress(cfi).await.unwrap().fraction, 0.5);
    assert!(engine.get_book_progress(cfi).await.is_none());
}

#[tokio::test]
async fn test_degenerate_book() {
    let engine = engine(MemoryBook::new().with_section(chapter("<div></div>"))).await;

    let progress = engine
        .get_book_progress("epubcfi(/6/2!/4/2)")
        .await
        .unwrap();
    assert_eq!(progress.fraction, 0.0);
    assert_eq!(progress.location.total, 1);
    assert_eq!(progress.time.total, 0);
}

// =============================================================================
// Determinism and concurrency
// =============================================================================

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    let engine = engine(three_chapters()).await;
    let cfi = "epubcfi(/6/4!/4/2/1:3)";

    let first = engine.get_book_progress(cfi).await.unwrap();
    let second = engine.get_book_progress(cfi).await.unwrap();
    assert_eq!(first.fraction.to_bits(), second.fraction.to_bits());
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_concurrent_calls() {
    let engine = Arc::new(engine(three_chapters()).await);

    let locations: Vec<String> = (0..3)
        .flat_map(|section| {
            (0..=4).map(move |offset| {
                format!("epubcfi(/6/{}!/4/2/1:{})", (section + 1) * 2, offset)
            })
        })
        .collect();

    let mut expected = Vec::new();
    for location in &locations {
        expected.push(engine.get_book_progress(location).await);
    }

    let handles: Vec<_> = locations
        .iter()
        .cloned()
        .map(|location| {
            let engine = engine.clone();
            tokio::spawn(async move { engine.get_book_progress(&location).await })
        })
        .collect();

    for (handle, expected) in handles.into_iter().zip(expected) {
        assert_eq!(handle.await.unwrap(), expected);
    }
}

// =============================================================================
// Properties
// =============================================================================

fn paragraphs() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z]{1,12}( [a-z]{1,12}){0,3}", 1..6)
}

proptest! {
    #[test]
    fn prop_fraction_strictly_increases_within_section(
        paragraphs in paragraphs(),
        a in 0usize..400,
        b in 0usize..400,
    ) {
        let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
        let doc = SectionDocument::parse(&chapter(&body));
        let total = doc.total_characters();
        let (a, b) = (a % (total + 1), b % (total + 1));
        prop_assume!(a != b);
        let (low, high) = (a.min(b), a.max(b));

        let fraction = |index: usize| {
            let point = doc.point_at_character(index).unwrap();
            let cfi = CfiResolver::cfi_for(0, &doc, &point).unwrap();
            let anchor = readmark_core::Cfi::parse(&cfi).unwrap().anchor();
            doc.offsets(&anchor).unwrap().fraction()
        };

        let (low, high) = (fraction(low), fraction(high));
        prop_assert!((0.0..=1.0).contains(&low));
        prop_assert!((0.0..=1.0).contains(&high));
        prop_assert!(low < high, "{} !< {}", low, high);
    }

    #[test]
    fn prop_book_fraction_increases_across_sections(
        sections in prop::collection::vec("[a-z]{1,40}", 2..6),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let fractions = runtime.block_on(async {
            let book = sections
                .iter()
                .fold(MemoryBook::new(), |book, text| {
                    book.with_section(chapter(&format!("<p>{text}</p>")))
                });
            let engine = engine(book).await;
            let mut fractions = Vec::new();
            for section in 0..sections.len() {
                let cfi = format!("epubcfi(/6/{}!/4/2/1:1)", (section + 1) * 2);
                fractions.push(engine.get_book_progress(&cfi).await.unwrap().fraction);
            }
            fractions
        });

        prop_assert!(fractions.iter().all(|f| (0.0..=1.0).contains(f)));
        prop_assert!(fractions.windows(2).all(|w| w[0] < w[1]), "{:?}", fractions);
    }
}
