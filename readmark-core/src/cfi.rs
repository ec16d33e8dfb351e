//! EPUB canonical fragment identifiers
//!
//! A resolver for the part of the EPUB CFI grammar that reading positions
//! use in practice: a spine step, an indirection into the content document,
//! a step path with an optional character offset, and ranges. Id and text
//! assertions (`[...]`) and side-bias parameters are accepted and ignored.
//! Offsets count Unicode scalar values.

use crate::document::SectionDocument;
use crate::error::ResolveError;
use crate::navigation::{Navigation, NavigationResolver};
use crate::types::{Anchor, Point};
use ego_tree::NodeRef;
use scraper::Node;
use std::fmt::Write;
use std::iter::Peekable;
use std::str::{Chars, FromStr};

/// One `/N` step, with the `:offset` allowed on the last step of a path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub offset: Option<usize>,
}

/// A parsed CFI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cfi {
    section_index: usize,
    start: Vec<Step>,
    end: Option<Vec<Step>>,
}

impl Cfi {
    /// Parse `epubcfi(...)`, or the bare path without the wrapper
    pub fn parse(input: &str) -> Result<Self, ResolveError> {
        let malformed = || ResolveError::Malformed(input.to_string());

        let trimmed = input.trim();
        let body = match trimmed.strip_prefix("epubcfi(") {
            Some(rest) => rest.strip_suffix(')').ok_or_else(malformed)?,
            None => trimmed,
        };

        let parts = split_top_level(body, ',');
        let (parent, range) = match parts.as_slice() {
            [parent] => (*parent, None),
            [parent, start, end] => (*parent, Some((*start, *end))),
            _ => return Err(malformed()),
        };

        let (package, content) = match split_top_level(parent, '!').as_slice() {
            [package, content] => (*package, *content),
            _ => return Err(malformed()),
        };

        let package = StepParser::new(package, input).parse()?;
        let section_index = match package.as_slice() {
            [_, itemref] if itemref.offset.is_none() => {
                if itemref.index == 0 || itemref.index % 2 != 0 {
                    return Err(ResolveError::OutOfRange(input.to_string()));
                }
                itemref.index / 2 - 1
            }
            _ => return Err(malformed()),
        };

        let parent_steps = StepParser::new(content, input).parse()?;
        let (start, end) = match range {
            None => {
                if parent_steps.is_empty() {
                    return Err(malformed());
                }
                (parent_steps, None)
            }
            Some((start, end)) => {
                if parent_steps.last().is_some_and(|s| s.offset.is_some()) {
                    return Err(malformed());
                }
                let start_steps = StepParser::new(start, input).parse()?;
                let end_steps = StepParser::new(end, input).parse()?;
                if start_steps.is_empty() || end_steps.is_empty() {
                    return Err(malformed());
                }
                let join = |tail: Vec<Step>| {
                    let mut steps = parent_steps.clone();
                    steps.extend(tail);
                    steps
                };
                (join(start_steps), Some(join(end_steps)))
            }
        };

        Ok(Self {
            section_index,
            start,
            end,
        })
    }

    /// Spine index of the section the CFI points into
    pub fn section_index(&self) -> usize {
        self.section_index
    }

    pub fn is_range(&self) -> bool {
        self.end.is_some()
    }

    /// Anchor resolving the content path against the section document
    pub fn anchor(&self) -> Anchor {
        let start = self.start.clone();
        let end = self.end.clone();
        Anchor::lazy(move |document| {
            let start = locate(document, &start)?;
            match &end {
                Some(end) => Some(Anchor::region(start, locate(document, end)?)),
                None => Some(Anchor::point(start)),
            }
        })
    }
}

impl FromStr for Cfi {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Resolves CFI strings; plugs into the engine as its navigation resolver
#[derive(Debug, Clone, Copy, Default)]
pub struct CfiResolver;

impl CfiResolver {
    pub fn new() -> Self {
        Self
    }

    /// CFI of a point in a section document
    ///
    /// Supports points in text nodes and element points that sit before a
    /// child node. `None` for anything else.
    pub fn cfi_for(
        section_index: usize,
        document: &SectionDocument,
        point: &Point,
    ) -> Option<String> {
        let root = *document.html().root_element();
        let node = document.node(&point.node)?;

        let mut cfi = format!("epubcfi(/6/{}!", (section_index + 1) * 2);
        match node.value() {
            Node::Text(text) => {
                let parent = node.parent()?;
                cfi.push_str(&element_path(root, parent)?);
                let elements_before = node.prev_siblings().filter(is_element).count();
                let text_before: usize = node
                    .prev_siblings()
                    .take_while(|n| !is_element(n))
                    .filter_map(|n| n.value().as_text().map(|t| t.chars().count()))
                    .sum();
                let offset = text_before + point.offset.min(text.chars().count());
                let _ = write!(cfi, "/{}:{}", elements_before * 2 + 1, offset);
            }
            Node::Element(_) => {
                let child = node.children().nth(point.offset)?;
                match child.value() {
                    Node::Element(_) => cfi.push_str(&element_path(root, child)?),
                    Node::Text(_) => {
                        let point = Point::new(document.path_of(child), 0);
                        return Self::cfi_for(section_index, document, &point);
                    }
                    _ => return None,
                }
            }
            _ => return None,
        }
        cfi.push(')');
        Some(cfi)
    }
}

impl NavigationResolver for CfiResolver {
    fn resolve(&self, location: &str) -> Result<Option<Navigation>, ResolveError> {
        let cfi = Cfi::parse(location)?;
        Ok(Some(Navigation::new(cfi.section_index(), cfi.anchor())))
    }
}

/// Split on `separator` outside of `[...]` assertions
fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '^' => escaped = true,
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

struct StepParser<'a> {
    chars: Peekable<Chars<'a>>,
    source: &'a str,
}

impl<'a> StepParser<'a> {
    fn new(path: &'a str, source: &'a str) -> Self {
        Self {
            chars: path.chars().peekable(),
            source,
        }
    }

    fn malformed(&self) -> ResolveError {
        ResolveError::Malformed(self.source.to_string())
    }

    fn parse(mut self) -> Result<Vec<Step>, ResolveError> {
        let mut steps = Vec::new();
        while let Some(c) = self.chars.next() {
            if c != '/' {
                return Err(self.malformed());
            }
            let index = self.number()?;
            if index == 0 {
                return Err(self.malformed());
            }
            self.skip_assertion()?;

            let mut offset = None;
            if self.chars.peek() == Some(&':') {
                self.chars.next();
                offset = Some(self.number()?);
                self.skip_assertion()?;
                // Only the terminal step may carry an offset
                if self.chars.peek().is_some() {
                    return Err(self.malformed());
                }
            }
            steps.push(Step { index, offset });
        }
        Ok(steps)
    }

    fn number(&mut self) -> Result<usize, ResolveError> {
        let mut digits = String::new();
        while let Some(c) = self.chars.peek().copied().filter(char::is_ascii_digit) {
            digits.push(c);
            self.chars.next();
        }
        digits.parse().map_err(|_| self.malformed())
    }

    fn skip_assertion(&mut self) -> Result<(), ResolveError> {
        if self.chars.peek() != Some(&'[') {
            return Ok(());
        }
        self.chars.next();
        while let Some(c) = self.chars.next() {
            match c {
                '^' => {
                    self.chars.next();
                }
                ']' => return Ok(()),
                _ => {}
            }
        }
        Err(self.malformed())
    }
}

fn is_element(node: &NodeRef<'_, Node>) -> bool {
    node.value().is_element()
}

/// The `k`-th element child (1-based)
fn element_child(node: NodeRef<'_, Node>, k: usize) -> Option<NodeRef<'_, Node>> {
    node.children().filter(is_element).nth(k.checked_sub(1)?)
}

/// Steps from the root element down to `element`
fn element_path(root: NodeRef<'_, Node>, element: NodeRef<'_, Node>) -> Option<String> {
    let mut steps = Vec::new();
    let mut current = element;
    while current.id() != root.id() {
        if !is_element(&current) {
            return None;
        }
        steps.push((current.prev_siblings().filter(is_element).count() + 1) * 2);
        current = current.parent()?;
    }
    Some(steps.iter().rev().fold(String::new(), |mut path, step| {
        let _ = write!(path, "/{}", step);
        path
    }))
}

/// Resolve a content path to a point, starting at the root element
fn locate(document: &SectionDocument, steps: &[Step]) -> Option<Point> {
    let (last, inner) = steps.split_last()?;

    let mut node = *document.html().root_element();
    for step in inner {
        if step.index % 2 != 0 {
            return None;
        }
        node = element_child(node, step.index / 2)?;
    }

    if last.index % 2 == 0 {
        let element = element_child(node, last.index / 2)?;
        return Some(Point::new(
            document.path_of(node),
            element.prev_siblings().count(),
        ));
    }

    // Odd step: the character data between two element children
    let elements_before = last.index / 2;
    let children: Vec<_> = node.children().collect();
    let gap_start = if elements_before == 0 {
        0
    } else {
        children
            .iter()
            .enumerate()
            .filter(|(_, child)| is_element(child))
            .nth(elements_before - 1)
            .map(|(i, _)| i + 1)?
    };

    let mut remaining = last.offset.unwrap_or(0);
    let mut last_text = None;
    for child in children[gap_start..].iter().take_while(|c| !is_element(c)) {
        if let Some(text) = child.value().as_text() {
            let len = text.chars().count();
            if remaining <= len {
                return Some(Point::new(document.path_of(*child), remaining));
            }
            remaining -= len;
            last_text = Some((*child, len));
        }
    }

    match last_text {
        Some((text, len)) => Some(Point::new(document.path_of(text), len)),
        None => Some(Point::new(document.path_of(node), gap_start)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAPTER: &str = "<html><head><title>T</title></head>\
        <body><h1 id=\"t\">Title</h1><p>Hello world</p><p>Second <em>para</em> end</p></body></html>";

    fn offsets(cfi: &str) -> Option<(usize, Option<usize>)> {
        let doc = SectionDocument::parse(CHAPTER);
        let anchor = Cfi::parse(cfi).ok()?.anchor();
        let offsets = doc.offsets(&anchor)?;
        Some((offsets.before, offsets.end))
    }

    #[test]
    fn test_parse_point() {
        let cfi = Cfi::parse("epubcfi(/6/4[chap01ref]!/4[body01]/10[para05]/3:10)").unwrap();
        assert_eq!(cfi.section_index(), 1);
        assert!(!cfi.is_range());
        assert_eq!(
            cfi.start,
            vec![
                Step { index: 4, offset: None },
                Step { index: 10, offset: None },
                Step { index: 3, offset: Some(10) },
            ]
        );
    }

    #[test]
    fn test_parse_without_wrapper() {
        let cfi: Cfi = "/6/2!/4/2/1:0".parse().unwrap();
        assert_eq!(cfi.section_index(), 0);
    }

    #[test]
    fn test_parse_range() {
        let cfi = Cfi::parse("epubcfi(/6/4!/4/2,/1:1,/1:4)").unwrap();
        assert!(cfi.is_range());
        assert_eq!(cfi.start.len(), 3);
        assert_eq!(cfi.end.as_ref().unwrap()[2], Step { index: 1, offset: Some(4) });
    }

    #[test]
    fn test_assertions_may_contain_separators() {
        let cfi = Cfi::parse("epubcfi(/6/4[a!b]!/4/2/1:3[yyy,x^]z;s=b])").unwrap();
        assert_eq!(cfi.section_index(), 1);
        assert!(!cfi.is_range());
    }

    #[test]
    fn test_malformed() {
        for input in [
            "",
            "garbage",
            "epubcfi(/6/4!/4/2/1:3",
            "epubcfi(/6/4)",
            "epubcfi(/6/4!)",
            "epubcfi(/6!/4/2)",
            "epubcfi(/6/4/2!/4)",
            "epubcfi(/6/4!/4:2/2)",
            "epubcfi(/6/4!/4/x)",
            "epubcfi(/6/4!/4/0)",
            "epubcfi(/6/4!/4[unclosed)",
            "epubcfi(/6/4!/4,/1:0)",
            "epubcfi(/6/4!/4/2,,/1:1)",
        ] {
            assert!(
                matches!(Cfi::parse(input), Err(ResolveError::Malformed(_))),
                "{input:?}"
            );
        }
    }

    #[test]
    fn test_spine_step_out_of_range() {
        assert!(matches!(
            Cfi::parse("epubcfi(/6/3!/4/2)"),
            Err(ResolveError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_resolve_text_offsets() {
        // Title(5) Hello world(11) Second (7) para(4)  end(4)
        assert_eq!(offsets("epubcfi(/6/2!/4/2/1:0)"), Some((0, None)));
        assert_eq!(offsets("epubcfi(/6/2!/4/4/1:6)"), Some((11, None)));
        assert_eq!(offsets("epubcfi(/6/2!/4/6/2/1:2)"), Some((25, None)));
        assert_eq!(offsets("epubcfi(/6/2!/4/6/3:1)"), Some((28, None)));
    }

    #[test]
    fn test_resolve_element_steps() {
        assert_eq!(offsets("epubcfi(/6/2!/4/4)"), Some((5, None)));
        assert_eq!(offsets("epubcfi(/6/2!/4/6/2)"), Some((23, None)));
        // No fourth element child in body
        assert_eq!(offsets("epubcfi(/6/2!/4/8)"), None);
        // Odd steps cannot have children
        assert_eq!(offsets("epubcfi(/6/2!/4/1/2)"), None);
    }

    #[test]
    fn test_resolve_range() {
        assert_eq!(
            offsets("epubcfi(/6/2!/4/4,/1:0,/1:5)"),
            Some((5, Some(10)))
        );
    }

    #[test]
    fn test_offset_past_gap_end() {
        assert_eq!(offsets("epubcfi(/6/2!/4/4/1:99)"), Some((16, None)));
    }

    #[test]
    fn test_resolver_returns_section_and_anchor() {
        let nav = CfiResolver::new()
            .resolve("epubcfi(/6/8!/4/2/1:0)")
            .unwrap()
            .unwrap();
        assert_eq!(nav.section_index, Some(3));
        assert!(matches!(nav.anchor, Some(Anchor::Lazy(_))));
        assert!(CfiResolver::new().resolve("nonsense").is_err());
    }

    #[test]
    fn test_cfi_round_trip() {
        let doc = SectionDocument::parse(CHAPTER);
        let total = doc.total_characters();
        for index in 0..=total {
            let point = doc.point_at_character(index).unwrap();
            let cfi = CfiResolver::cfi_for(2, &doc, &point).unwrap();
            let parsed = Cfi::parse(&cfi).unwrap();
            assert_eq!(parsed.section_index(), 2, "{cfi}");
            let offsets = doc.offsets(&parsed.anchor()).unwrap();
            assert_eq!(offsets.before, index, "{cfi}");
        }
    }

    #[test]
    fn test_xhtml_milestone_between_text() {
        let doc = SectionDocument::parse(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Page markers</title></head>
<body><p>ab<a id="pg5"/>cd</p><p>ef</p></body>
</html>"#,
        );
        let before = |cfi: &str| {
            let anchor = Cfi::parse(cfi).ok()?.anchor();
            doc.offsets(&anchor).map(|o| o.before)
        };

        assert_eq!(before("epubcfi(/6/2!/4/4/1:1)"), Some(5));
        assert_eq!(before("epubcfi(/6/2!/4/2/2[pg5])"), Some(2));
        assert_eq!(before("epubcfi(/6/2!/4/2/3:1)"), Some(3));

        for index in 0..=doc.total_characters() {
            let point = doc.point_at_character(index).unwrap();
            let cfi = CfiResolver::cfi_for(0, &doc, &point).unwrap();
            assert_eq!(before(&cfi), Some(index), "{cfi}");
        }
    }

    #[test]
    fn test_cfi_for_element_point() {
        let doc = SectionDocument::parse(CHAPTER);
        let body = doc.select_first("body").unwrap();
        let cfi = CfiResolver::cfi_for(0, &doc, &Point::new(body, 1)).unwrap();
        assert_eq!(cfi, "epubcfi(/6/2!/4/4)");
    }
}
