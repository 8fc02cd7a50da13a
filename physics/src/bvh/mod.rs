/*!
Bounding volume hierarchy rebuilt from scratch every frame.

The tree is a flat array of [`BvhNode`]s in depth-first, left-first order:
the root is index 0, an internal node's left child is the next slot and its
right child index is stored on the node. Leaves reference a contiguous run of
the object-ID array, which is permuted in lockstep with a private copy of the
item AABBs during the build.

- build:  iterative midpoint-split construction ([`Bvh::update`])
- query:  frustum, AABB, point and ray queries
- debug:  depth-first node walk for wireframe debug drawing

Nothing persists between rebuilds apart from buffer capacity. Queries are
read-only and may run concurrently with each other, never with `update`.
*/

mod build;
mod debug;
mod node;
mod query;

pub use debug::{DebugBox, depth_color};
pub use node::BvhNode;
pub use query::{RayHit, VisibleObject};

use crate::{
    Vec3,
    aabb::Aabb,
    config::BvhConfig,
    object_id::{ObjectId, PackedObjectId},
};

/// Shape of the most recent build.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BvhStats {
    pub item_count: usize,
    pub node_count: usize,
    pub leaf_count: usize,
    /// Depth of the deepest node; the root is depth 0.
    pub max_depth: usize,
}

#[derive(Clone, Copy, Debug)]
struct BuildTask {
    start: usize,
    end: usize,
    parent: Option<u32>,
    depth: usize,
}

pub struct Bvh {
    config: BvhConfig,
    nodes: Vec<BvhNode>,
    object_ids: Vec<PackedObjectId>,
    item_aabbs: Vec<Aabb>,
    stats: BvhStats,

    // Scratch reused across rebuilds.
    centers: Vec<Vec3>,
    scratch_ids: Vec<ObjectId>,
    build_stack: Vec<BuildTask>,
}

impl Bvh {
    /// Creates an empty tree with every buffer sized for `config.max_item_count`.
    pub fn new(config: BvhConfig) -> Self {
        let items = config.max_item_count;
        let max_nodes = (2 * items).saturating_sub(1);
        Self {
            nodes: Vec::with_capacity(max_nodes),
            object_ids: Vec::with_capacity(items),
            item_aabbs: Vec::with_capacity(items),
            stats: BvhStats::default(),
            centers: Vec::with_capacity(items),
            scratch_ids: Vec::with_capacity(items),
            build_stack: Vec::with_capacity(config.stack_capacity),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &BvhConfig {
        &self.config
    }

    /// Maximum number of items a single [`Bvh::update`] accepts.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.max_item_count
    }

    /// Number of items referenced by the current tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.object_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.object_ids.is_empty()
    }

    #[inline]
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Packed object IDs in leaf order.
    #[inline]
    pub fn object_ids(&self) -> &[PackedObjectId] {
        &self.object_ids
    }

    /// Item AABBs in leaf order (parallel to [`Bvh::object_ids`]).
    #[inline]
    pub fn item_aabbs(&self) -> &[Aabb] {
        &self.item_aabbs
    }

    #[inline]
    pub fn object_id(&self, slot: usize) -> Option<ObjectId> {
        self.object_ids.get(slot).copied().map(ObjectId::unpack)
    }

    #[inline]
    pub fn stats(&self) -> BvhStats {
        self.stats
    }

    /// Drops the current tree, keeping buffer capacity.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.object_ids.clear();
        self.item_aabbs.clear();
        self.stats = BvhStats::default();
    }

    /// Checks the structural invariants of the current tree.
    ///
    /// - every internal node's AABB is the union of its two children's AABBs
    /// - every leaf's AABB is the union of its items' AABBs
    /// - leaves cover every slot of the object-ID array exactly once
    /// - no node is left with an unresolved child link
    pub fn validate(&self) -> Result<(), &'static str> {
        let n = self.object_ids.len();
        if self.item_aabbs.len() != n {
            return Err("item AABBs and object IDs differ in length");
        }
        if self.nodes.is_empty() {
            return if n == 0 { Ok(()) } else { Err("items without nodes") };
        }

        let mut seen = vec![false; n];
        for (index, node) in self.nodes.iter().enumerate() {
            if node.is_pending() {
                return Err("unresolved child link");
            }
            if let Some(items) = node.items() {
                if items.end > n {
                    return Err("leaf range out of bounds");
                }
                let Some(union) = Aabb::union_of(&self.item_aabbs[items.clone()]) else {
                    return Err("empty leaf");
                };
                if union != node.aabb {
                    return Err("leaf AABB is not the union of its items");
                }
                for slot in items {
                    if std::mem::replace(&mut seen[slot], true) {
                        return Err("object slot referenced twice");
                    }
                }
            } else if let Some((left, right)) = node.children(index as u32) {
                let (Some(l), Some(r)) = (self.nodes.get(left as usize), self.nodes.get(right as usize))
                else {
                    return Err("child index out of bounds");
                };
                if right <= left {
                    return Err("right child precedes left child");
                }
                if l.aabb.merged(&r.aabb) != node.aabb {
                    return Err("internal AABB is not the union of its children");
                }
            }
        }

        if seen.iter().all(|&s| s) {
            Ok(())
        } else {
            Err("object slot not referenced by any leaf")
        }
    }
}

impl Default for Bvh {
    fn default() -> Self {
        Self::new(BvhConfig::default())
    }
}
