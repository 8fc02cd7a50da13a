use super::{Bvh, BvhNode};
use crate::aabb::Aabb;

/// One wireframe box for debug drawing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugBox {
    pub aabb: Aabb,
    pub depth: u32,
    pub is_leaf: bool,
    /// RGB picked from the depth palette.
    pub color: [u8; 3],
}

const DEPTH_PALETTE: [[u8; 3]; 8] = [
    [255, 255, 255],
    [255, 80, 80],
    [255, 170, 60],
    [240, 230, 70],
    [90, 220, 90],
    [70, 200, 220],
    [90, 120, 255],
    [200, 100, 240],
];

/// Palette color for a tree depth; repeats every eight levels.
#[inline]
pub fn depth_color(depth: u32) -> [u8; 3] {
    DEPTH_PALETTE[depth as usize % DEPTH_PALETTE.len()]
}

impl Bvh {
    /// Visits every node depth-first, left before right, with its index and depth.
    pub fn walk_nodes<F>(&self, mut visit: F)
    where
        F: FnMut(u32, &BvhNode, u32),
    {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack: Vec<(u32, u32)> = Vec::with_capacity(self.config.stack_capacity);
        stack.push((0, 0));

        while let Some((index, depth)) = stack.pop() {
            let node = &self.nodes[index as usize];
            visit(index, node, depth);
            if let Some((left, right)) = node.children(index) {
                stack.push((right, depth + 1));
                stack.push((left, depth + 1));
            }
        }
    }

    /// Node boxes down to `max_depth` (inclusive), or all of them for `None`.
    pub fn debug_boxes(&self, max_depth: Option<u32>) -> Vec<DebugBox> {
        let mut out = Vec::with_capacity(self.nodes.len());
        self.walk_nodes(|_, node, depth| {
            if max_depth.is_none_or(|max| depth <= max) {
                out.push(DebugBox {
                    aabb: node.aabb,
                    depth,
                    is_leaf: node.is_leaf(),
                    color: depth_color(depth),
                });
            }
        });
        out
    }
}
