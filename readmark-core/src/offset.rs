//! Section offset calculator
//!
//! Counts the meaningful text characters of a section document in document
//! order and locates anchors within that count.

use crate::document::{is_blank, SectionDocument};
use crate::types::{Anchor, NodePath, Point};
use ego_tree::iter::Edge;
use ego_tree::NodeId;
use scraper::Node;
use std::ops::ControlFlow;

/// Elements whose text is never shown as reading content
const IGNORED_ELEMENTS: &[&str] = &["script", "style", "template", "noscript"];

/// Character offsets of an anchor within its section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionOffsets {
    /// Characters preceding the anchor start
    pub before: usize,

    /// Characters in the whole section
    pub total: usize,

    /// Characters preceding the region end, for anchors wider than a point
    pub end: Option<usize>,
}

impl SectionOffsets {
    /// `before / total`, or 0 for a section without text
    pub fn fraction(&self) -> f64 {
        ratio(self.before, self.total)
    }

    pub fn end_fraction(&self) -> Option<f64> {
        self.end.map(|end| ratio(end, self.total))
    }
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64).clamp(0.0, 1.0)
    }
}

/// Traversal edge at which a position is reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    /// Just before `node` opens, plus `chars` characters into it when it is text
    Open { node: NodeId, chars: usize },

    /// Just after the last descendant of `node`
    Close { node: NodeId },
}

impl SectionDocument {
    /// Meaningful text characters in the section
    pub fn total_characters(&self) -> usize {
        self.walk(|_, _, _| ControlFlow::Continue(()))
    }

    /// Characters preceding a point, or `None` if its node does not exist
    pub fn offset_of(&self, point: &Point) -> Option<usize> {
        let stop = self.stop_for_point(point)?;
        Some(self.measure(&[stop]).0[0])
    }

    /// Characters preceding the first character of a node
    pub fn offset_of_node(&self, path: &NodePath) -> Option<usize> {
        let node = self.node(path)?;
        Some(
            self.measure(&[Stop::Open {
                node: node.id(),
                chars: 0,
            }])
            .0[0],
        )
    }

    /// Locate an anchor within the section
    ///
    /// Lazy anchors are evaluated against this document first. Returns `None`
    /// when the anchor cannot be resolved here.
    pub fn offsets(&self, anchor: &Anchor) -> Option<SectionOffsets> {
        match anchor {
            Anchor::Region(region) => {
                let start = self.stop_for_point(&region.start)?;
                if region.is_collapsed() {
                    let (found, total) = self.measure(&[start]);
                    return Some(SectionOffsets {
                        before: found[0],
                        total,
                        end: None,
                    });
                }
                let end = self.stop_for_point(&region.end)?;
                let (found, total) = self.measure(&[start, end]);
                Some(SectionOffsets {
                    before: found[0],
                    total,
                    end: Some(found[1].max(found[0])),
                })
            }
            Anchor::Node(path) => {
                let node = self.node(path)?;
                let (found, total) = self.measure(&[Stop::Open {
                    node: node.id(),
                    chars: 0,
                }]);
                Some(SectionOffsets {
                    before: found[0],
                    total,
                    end: None,
                })
            }
            Anchor::Lazy(_) => {
                let resolved = anchor.clone().resolve(self)?;
                self.offsets(&resolved)
            }
        }
    }

    /// The point just before the `index`-th meaningful character
    ///
    /// An index at or past the end yields the end of the last text node.
    /// `None` for a section without text.
    pub fn point_at_character(&self, index: usize) -> Option<Point> {
        let mut found = None;
        let mut last = None;
        self.walk(|edge, seen, weight| {
            if let Edge::Open(node) = edge {
                if weight > 0 {
                    if index < seen + weight {
                        found = Some((node.id(), index - seen));
                        return ControlFlow::Break(());
                    }
                    last = Some((node.id(), weight));
                }
            }
            ControlFlow::Continue(())
        });
        let (id, offset) = found.or(last)?;
        let node = self.html().tree.get(id)?;
        Some(Point::new(self.path_of(node), offset))
    }

    fn stop_for_point(&self, point: &Point) -> Option<Stop> {
        let node = self.node(&point.node)?;
        let stop = match node.value() {
            Node::Text(_) => Stop::Open {
                node: node.id(),
                chars: point.offset,
            },
            _ => match node.children().nth(point.offset) {
                Some(child) => Stop::Open {
                    node: child.id(),
                    chars: 0,
                },
                None => Stop::Close { node: node.id() },
            },
        };
        Some(stop)
    }

    /// Characters preceding each stop, plus the section total
    fn measure(&self, stops: &[Stop]) -> (Vec<usize>, usize) {
        let mut found: Vec<Option<usize>> = vec![None; stops.len()];
        let total = self.walk(|edge, seen, weight| {
            for (slot, stop) in found.iter_mut().zip(stops) {
                if slot.is_some() {
                    continue;
                }
                match (*stop, edge) {
                    (Stop::Open { node, chars }, Edge::Open(n)) if n.id() == node => {
                        *slot = Some(seen + chars.min(weight));
                    }
                    (Stop::Close { node }, Edge::Close(n)) if n.id() == node => {
                        *slot = Some(seen);
                    }
                    _ => {}
                }
            }
            ControlFlow::Continue(())
        });
        // Every stop names a node of this tree, so the walk reaches it
        let found = found.into_iter().map(|f| f.unwrap_or(total)).collect();
        (found, total)
    }

    /// Pre-order walk over the whole tree
    ///
    /// `visit` receives each edge, the characters counted before it, and the
    /// characters the edge contributes (non-zero only when opening counted
    /// text). Returns the characters counted when the walk ends.
    fn walk<F>(&self, mut visit: F) -> usize
    where
        F: FnMut(&Edge<'_, Node>, usize, usize) -> ControlFlow<()>,
    {
        let scope = self.scope().id();
        let mut in_scope = false;
        let mut ignored_depth = 0usize;
        let mut seen = 0usize;

        for edge in self.root().traverse() {
            let weight = match &edge {
                Edge::Open(node) => match node.value() {
                    Node::Text(text) if in_scope && ignored_depth == 0 && !is_blank(text) => {
                        text.chars().count()
                    }
                    _ => 0,
                },
                Edge::Close(_) => 0,
            };

            if visit(&edge, seen, weight).is_break() {
                return seen;
            }
            seen += weight;

            match edge {
                Edge::Open(node) => {
                    if node.id() == scope {
                        in_scope = true;
                    }
                    if is_ignored(node.value()) {
                        ignored_depth += 1;
                    }
                }
                Edge::Close(node) => {
                    if node.id() == scope {
                        in_scope = false;
                    }
                    if is_ignored(node.value()) {
                        ignored_depth -= 1;
                    }
                }
            }
        }
        seen
    }
}

fn is_ignored(node: &Node) -> bool {
    node.as_element()
        .map(|el| IGNORED_ELEMENTS.contains(&el.name()))
        .unwrap_or(false)
}
