use super::{BuildTask, Bvh, BvhNode, BvhStats};
use crate::{
    aabb::Aabb,
    error::{PhysicsError, Resource},
    object_id::ObjectId,
};

impl Bvh {
    /// Rebuilds the tree over `aabbs`.
    ///
    /// `fill_ids` is invoked once with a buffer of `aabbs.len()` entries and
    /// must write the [`ObjectId`] of input item `i` into slot `i`. Slots it
    /// leaves alone read back as [`crate::ObjectKind::Unassigned`].
    ///
    /// Fails with [`PhysicsError::CapacityExceeded`] when `aabbs` holds more
    /// than `max_item_count` boxes. The previous tree is left untouched in
    /// that case and still answers queries, but it describes a stale frame.
    ///
    /// Algorithm (iterative, no recursion):
    /// - Cache each item's AABB center once.
    /// - Pop a `[start, end)` range; its node AABB is the union of member
    ///   AABBs, the split is chosen from the union of member *centers*.
    /// - Ranges of at most `max_items_per_leaf` items become leaves.
    /// - Otherwise split at the midpoint of the centers' longest axis with a
    ///   single-pass in-place partition; if every item lands on one side,
    ///   split at the middle index instead.
    /// - Push right then left so the left child is emitted at `parent + 1`.
    pub fn update<F>(&mut self, aabbs: &[Aabb], fill_ids: F) -> Result<BvhStats, PhysicsError>
    where
        F: FnOnce(&mut [ObjectId]),
    {
        let count = aabbs.len();
        if count > self.config.max_item_count {
            return Err(PhysicsError::capacity(
                Resource::BvhItems,
                count,
                self.config.max_item_count,
            ));
        }

        self.scratch_ids.clear();
        self.scratch_ids.resize(count, ObjectId::default());
        fill_ids(&mut self.scratch_ids);

        self.item_aabbs.clear();
        self.item_aabbs.extend_from_slice(aabbs);
        self.centers.clear();
        self.centers.extend(aabbs.iter().map(Aabb::center));

        self.nodes.clear();
        let stats = self.build();

        self.object_ids.clear();
        self.object_ids
            .extend(self.scratch_ids.iter().map(|id| id.pack()));
        self.stats = stats;

        debug_assert_eq!(self.validate(), Ok(()));
        log::debug!(
            "bvh rebuilt: {} items, {} nodes, {} leaves, depth {}",
            stats.item_count,
            stats.node_count,
            stats.leaf_count,
            stats.max_depth
        );
        Ok(stats)
    }

    fn build(&mut self) -> BvhStats {
        let count = self.item_aabbs.len();
        let mut stats = BvhStats {
            item_count: count,
            ..BvhStats::default()
        };
        if count == 0 {
            return stats;
        }

        let max_per_leaf = self.config.max_items_per_leaf.max(1);
        let mut stack = std::mem::take(&mut self.build_stack);
        stack.clear();
        stack.push(BuildTask {
            start: 0,
            end: count,
            parent: None,
            depth: 0,
        });

        while let Some(task) = stack.pop() {
            let node_index = self.nodes.len() as u32;
            if let Some(parent) = task.parent {
                self.nodes[parent as usize].record_child(node_index);
            }
            stats.max_depth = stats.max_depth.max(task.depth);

            let (bounds, center_bounds) = self.range_bounds(task.start, task.end);
            let len = task.end - task.start;

            if len <= max_per_leaf {
                self.nodes
                    .push(BvhNode::leaf(bounds, task.start as u32, len as u32));
                stats.leaf_count += 1;
                continue;
            }

            let mid = self.partition(task.start, task.end, &center_bounds);
            self.nodes.push(BvhNode::pending(bounds));

            stack.push(BuildTask {
                start: mid,
                end: task.end,
                parent: Some(node_index),
                depth: task.depth + 1,
            });
            stack.push(BuildTask {
                start: task.start,
                end: mid,
                parent: Some(node_index),
                depth: task.depth + 1,
            });
        }

        self.build_stack = stack;
        stats.node_count = self.nodes.len();
        stats
    }

    /// Union of item AABBs and union of item centers over `[start, end)`.
    fn range_bounds(&self, start: usize, end: usize) -> (Aabb, Aabb) {
        let mut bounds = Aabb::inverted();
        let mut center_bounds = Aabb::inverted();
        for (aabb, center) in self.item_aabbs[start..end]
            .iter()
            .zip(&self.centers[start..end])
        {
            bounds = bounds.merged(aabb);
            center_bounds.grow(center);
        }
        (bounds, center_bounds)
    }

    /// Partitions `[start, end)` around the midpoint of the centers' longest
    /// axis and returns the first index of the upper half.
    fn partition(&mut self, start: usize, end: usize, center_bounds: &Aabb) -> usize {
        let axis = center_bounds.largest_axis();
        let split = (center_bounds.min[axis] + center_bounds.max[axis]) * 0.5;

        let mut i = start;
        let mut j = end;
        while i < j {
            if self.centers[i][axis] < split {
                i += 1;
            } else {
                j -= 1;
                self.swap_items(i, j);
            }
        }

        if i == start || i == end {
            start + (end - start) / 2
        } else {
            i
        }
    }

    #[inline]
    fn swap_items(&mut self, a: usize, b: usize) {
        self.item_aabbs.swap(a, b);
        self.centers.swap(a, b);
        self.scratch_ids.swap(a, b);
    }
}
