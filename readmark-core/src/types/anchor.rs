//! Anchors: positions and regions inside a section document

use crate::document::SectionDocument;
use std::fmt;
use std::sync::Arc;

/// Child-index path from the document root node to a node
///
/// Parsing the same markup always produces the same tree, so a path keeps
/// pointing at the same node when a section is re-parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// Path to the document root node itself
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(steps: Vec<usize>) -> Self {
        Self(steps)
    }

    /// Path to the `index`-th child of this node
    pub fn child(&self, index: usize) -> Self {
        let mut steps = self.0.clone();
        steps.push(index);
        Self(steps)
    }

    pub fn steps(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(steps: Vec<usize>) -> Self {
        Self(steps)
    }
}

/// A node plus an offset within it
///
/// For a text node `offset` counts characters into its text. For any other
/// node it counts child nodes, so offset `n` sits before the `n`-th child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Point {
    pub node: NodePath,
    pub offset: usize,
}

impl Point {
    pub fn new(node: impl Into<NodePath>, offset: usize) -> Self {
        Self {
            node: node.into(),
            offset,
        }
    }
}

/// A contiguous region between two points
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Region {
    pub start: Point,
    pub end: Point,
}

impl Region {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// A zero-width region at a single point
    pub fn collapsed(point: Point) -> Self {
        Self {
            start: point.clone(),
            end: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

type AnchorFn = dyn Fn(&SectionDocument) -> Option<Anchor> + Send + Sync;

/// An anchor computed from the section document once it has been fetched
#[derive(Clone)]
pub struct LazyAnchor(Arc<AnchorFn>);

impl LazyAnchor {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SectionDocument) -> Option<Anchor> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Evaluate against a document
    pub fn evaluate(&self, document: &SectionDocument) -> Option<Anchor> {
        (self.0)(document)
    }
}

impl fmt::Debug for LazyAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("LazyAnchor(..)")
    }
}

/// Where a location reference points inside its section
#[derive(Debug, Clone)]
pub enum Anchor {
    /// A point or a wider region; only the start matters for the position
    Region(Region),

    /// A structural node, positioned at its first character
    Node(NodePath),

    /// Resolved against the parsed document when it becomes available
    Lazy(LazyAnchor),
}

impl Anchor {
    /// A collapsed region anchor at `point`
    pub fn point(point: Point) -> Self {
        Anchor::Region(Region::collapsed(point))
    }

    pub fn region(start: Point, end: Point) -> Self {
        Anchor::Region(Region::new(start, end))
    }

    pub fn node(path: impl Into<NodePath>) -> Self {
        Anchor::Node(path.into())
    }

    pub fn lazy<F>(f: F) -> Self
    where
        F: Fn(&SectionDocument) -> Option<Anchor> + Send + Sync + 'static,
    {
        Anchor::Lazy(LazyAnchor::new(f))
    }

    /// Evaluate a lazy anchor against `document`
    ///
    /// Concrete anchors are returned as-is. A lazy anchor that yields
    /// another lazy anchor is treated as unresolved.
    pub fn resolve(self, document: &SectionDocument) -> Option<Anchor> {
        match self {
            Anchor::Lazy(lazy) => match lazy.evaluate(document)? {
                Anchor::Lazy(_) => None,
                resolved => Some(resolved),
            },
            concrete => Some(concrete),
        }
    }
}
