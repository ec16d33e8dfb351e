//! Parsed section documents

use crate::types::{NodePath, Point};
use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};

/// A parsed section content document
///
/// Wraps the scraper DOM. Node positions are exchanged as [`NodePath`]s so
/// that anchors stay valid when the same markup is parsed again.
pub struct SectionDocument {
    html: Html,
}

impl SectionDocument {
    /// Parse XHTML/HTML markup into a document
    ///
    /// XHTML content has its self-closing elements expanded first, so that
    /// `<a id="p5"/>` builds the same tree an XML parser would.
    pub fn parse(markup: &str) -> Self {
        let html = if is_xhtml(markup) {
            Html::parse_document(&expand_self_closing(markup))
        } else {
            Html::parse_document(markup)
        };
        Self { html }
    }

    /// The underlying DOM
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// The document root node (above the root element)
    pub fn root(&self) -> NodeRef<'_, Node> {
        self.html.tree.root()
    }

    /// The node the text count is taken over: `<body>`, else the root element
    pub fn scope(&self) -> NodeRef<'_, Node> {
        let root_element = *self.html.root_element();
        root_element
            .children()
            .find(|child| {
                child
                    .value()
                    .as_element()
                    .map(|el| el.name() == "body")
                    .unwrap_or(false)
            })
            .unwrap_or(root_element)
    }

    /// Look up the node at `path`
    pub fn node(&self, path: &NodePath) -> Option<NodeRef<'_, Node>> {
        let mut node = self.root();
        for &step in path.steps() {
            node = node.children().nth(step)?;
        }
        Some(node)
    }

    /// Path of a node belonging to this document
    pub fn path_of(&self, node: NodeRef<'_, Node>) -> NodePath {
        let mut steps: Vec<usize> = std::iter::once(node)
            .chain(node.ancestors())
            .filter(|n| n.parent().is_some())
            .map(|n| n.prev_siblings().count())
            .collect();
        steps.reverse();
        NodePath::new(steps)
    }

    /// Path of the first element matching a CSS selector
    pub fn select_first(&self, selector: &str) -> Option<NodePath> {
        let selector = Selector::parse(selector).ok()?;
        let element = self.html.select(&selector).next()?;
        Some(self.path_of(*element))
    }

    /// Point `offset` characters into the first non-blank text inside the
    /// first element matching `selector`
    pub fn text_point(&self, selector: &str, offset: usize) -> Option<Point> {
        let selector = Selector::parse(selector).ok()?;
        let element = self.html.select(&selector).next()?;
        let text = element.descendants().find(|node| match node.value() {
            Node::Text(text) => !is_blank(text),
            _ => false,
        })?;
        Some(Point::new(self.path_of(text), offset))
    }
}

/// Text made only of whitespace carries no reading weight
pub(crate) fn is_blank(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// HTML elements that never have content
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";

/// Markup with an XML prolog or the XHTML namespace
fn is_xhtml(markup: &str) -> bool {
    markup
        .trim_start_matches('\u{feff}')
        .trim_start()
        .starts_with("<?xml")
        || markup.contains(XHTML_NAMESPACE)
}

/// Rewrite `<name .../>` as `<name ...></name>` for non-void elements
///
/// The HTML tree builder ignores the trailing slash, which would turn every
/// following sibling into a child of the empty element.
fn expand_self_closing(markup: &str) -> String {
    let mut result = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(start) = rest.find('<') {
        result.push_str(&rest[..start]);
        rest = &rest[start..];

        // Comments, CDATA, declarations and processing instructions
        if let Some(len) = opaque_len(rest) {
            result.push_str(&rest[..len]);
            rest = &rest[len..];
            continue;
        }

        let Some(end) = tag_end(rest) else {
            break;
        };
        let tag = &rest[..=end];
        rest = &rest[end + 1..];

        match self_closing_name(tag) {
            Some(name) if !VOID_ELEMENTS.contains(&name.to_ascii_lowercase().as_str()) => {
                result.push_str(tag[..tag.len() - 2].trim_end());
                result.push_str("></");
                result.push_str(name);
                result.push('>');
            }
            _ => result.push_str(tag),
        }
    }

    result.push_str(rest);
    result
}

/// Length of a markup construct at the start of `rest` that holds no tags
fn opaque_len(rest: &str) -> Option<usize> {
    let terminator = if rest.starts_with("<!--") {
        "-->"
    } else if rest.starts_with("<![CDATA[") {
        "]]>"
    } else if rest.starts_with("<?") {
        "?>"
    } else if rest.starts_with("<!") {
        ">"
    } else {
        return None;
    };
    Some(
        rest[2..]
            .find(terminator)
            .map_or(rest.len(), |i| i + 2 + terminator.len()),
    )
}

/// Index of the `>` closing the tag at the start of `rest`, skipping quoted
/// attribute values
fn tag_end(rest: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in rest.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i),
            None => {}
        }
    }
    None
}

fn self_closing_name(tag: &str) -> Option<&str> {
    let inner = tag.strip_prefix('<')?.strip_suffix("/>")?;
    if !inner.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }
    let end = inner
        .find(|c: char| c.is_whitespace() || c == '/')
        .unwrap_or(inner.len());
    Some(&inner[..end])
}
