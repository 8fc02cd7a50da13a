use std::ops::Range;

use crate::aabb::Aabb;

/// How many of an internal node's two children have been emitted so far.
///
/// Only meaningful while a build is running. Children are emitted depth-first,
/// left before right, so the left child always lands at `parent + 1` and the
/// second touch is the right child announcing its own index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Touches {
    Untouched,
    LeftEmitted,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum NodeLink {
    /// References `count` (> 0) entries of the object-ID array starting at `start`.
    Leaf { start: u32, count: u32 },
    /// Left child is the next array slot; right child index is stored.
    Internal { right: u32 },
    /// Internal node whose right child has not been emitted yet.
    Pending(Touches),
}

/// One node of the flat BVH array. The root is index 0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BvhNode {
    /// Union of every item AABB below this node.
    pub aabb: Aabb,
    pub(crate) link: NodeLink,
}

impl BvhNode {
    #[inline]
    pub(crate) fn leaf(aabb: Aabb, start: u32, count: u32) -> Self {
        debug_assert!(count > 0);
        Self {
            aabb,
            link: NodeLink::Leaf { start, count },
        }
    }

    #[inline]
    pub(crate) fn pending(aabb: Aabb) -> Self {
        Self {
            aabb,
            link: NodeLink::Pending(Touches::Untouched),
        }
    }

    /// Called by each child of this node as it is emitted.
    ///
    /// The first call marks the left child (implicitly `parent + 1`); the
    /// second call is the right child and resolves the link to its index.
    #[inline]
    pub(crate) fn record_child(&mut self, child: u32) {
        debug_assert!(
            matches!(self.link, NodeLink::Pending(_)),
            "child emitted under a resolved node"
        );
        self.link = match self.link {
            NodeLink::Pending(Touches::Untouched) => NodeLink::Pending(Touches::LeftEmitted),
            NodeLink::Pending(Touches::LeftEmitted) => NodeLink::Internal { right: child },
            resolved => resolved,
        };
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.link, NodeLink::Leaf { .. })
    }

    /// Number of referenced objects; 0 for internal nodes.
    #[inline]
    pub fn count(&self) -> u32 {
        match self.link {
            NodeLink::Leaf { count, .. } => count,
            _ => 0,
        }
    }

    /// The object-ID array slice referenced by a leaf.
    #[inline]
    pub fn items(&self) -> Option<Range<usize>> {
        match self.link {
            NodeLink::Leaf { start, count } => {
                Some(start as usize..start as usize + count as usize)
            }
            _ => None,
        }
    }

    /// `(left, right)` child indices of an internal node stored at `index`.
    #[inline]
    pub fn children(&self, index: u32) -> Option<(u32, u32)> {
        match self.link {
            NodeLink::Internal { right } => Some((index + 1, right)),
            _ => None,
        }
    }

    #[inline]
    pub fn right_child(&self) -> Option<u32> {
        match self.link {
            NodeLink::Internal { right } => Some(right),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn is_pending(&self) -> bool {
        matches!(self.link, NodeLink::Pending(_))
    }
}
