use super::Bvh;
use crate::{
    Vec3,
    aabb::Aabb,
    frustum::{Containment, Frustum},
    lod::{LodLevel, lod_from_distance_sq},
    object_id::ObjectId,
    ray::Ray,
};

/// An object that survived frustum culling, with its LOD bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleObject {
    pub id: ObjectId,
    pub lod: LodLevel,
}

/// Closest object hit by [`Bvh::cast_ray`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub object: ObjectId,
    /// Distance from the ray origin to where the ray enters the object's AABB.
    pub distance: f32,
    /// Index of the leaf node that referenced the object.
    pub leaf: u32,
}

impl Bvh {
    #[inline]
    fn traversal_stack<T>(&self) -> Vec<T> {
        Vec::with_capacity(self.config.stack_capacity)
    }

    #[inline]
    fn unpacked(&self, slot: usize) -> ObjectId {
        ObjectId::unpack(self.object_ids[slot])
    }

    /// Objects whose AABB is at least partially inside `frustum`, tagged with
    /// an LOD level from their squared distance to `eye`.
    ///
    /// A node classified fully inside adds every object below it without
    /// further plane tests. Output order follows traversal order.
    pub fn gather_in_frustum(&self, frustum: &Frustum, eye: &Vec3) -> Vec<VisibleObject> {
        let mut out = Vec::new();
        self.gather_in_frustum_into(frustum, eye, &mut out);
        out
    }

    /// Same as [`Bvh::gather_in_frustum`], appending to `out`.
    pub fn gather_in_frustum_into(&self, frustum: &Frustum, eye: &Vec3, out: &mut Vec<VisibleObject>) {
        if self.nodes.is_empty() {
            return;
        }
        let thresholds = self.config.lod.thresholds_sq();
        let mut stack: Vec<(u32, bool)> = self.traversal_stack();
        stack.push((0, false));

        while let Some((index, parent_inside)) = stack.pop() {
            let node = &self.nodes[index as usize];
            let inside = parent_inside
                || match frustum.classify(&node.aabb) {
                    Containment::Outside => continue,
                    Containment::Inside => true,
                    Containment::Intersects => false,
                };

            if let Some(items) = node.items() {
                for slot in items {
                    let aabb = &self.item_aabbs[slot];
                    if inside || frustum.classify(aabb) != Containment::Outside {
                        out.push(VisibleObject {
                            id: self.unpacked(slot),
                            lod: lod_from_distance_sq(aabb.center_distance_sq(eye), &thresholds),
                        });
                    }
                }
            } else if let Some((left, right)) = node.children(index) {
                stack.push((right, inside));
                stack.push((left, inside));
            }
        }
    }

    /// Objects whose AABB overlaps `query` (inclusive on faces).
    pub fn gather_in_aabb(&self, query: &Aabb) -> Vec<ObjectId> {
        let mut out = Vec::new();
        self.gather_in_aabb_into(query, &mut out);
        out
    }

    /// Same as [`Bvh::gather_in_aabb`], appending to `out`.
    pub fn gather_in_aabb_into(&self, query: &Aabb, out: &mut Vec<ObjectId>) {
        if self.nodes.is_empty() {
            return;
        }
        let mut stack: Vec<u32> = self.traversal_stack();
        stack.push(0);

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if !node.aabb.overlaps(query) {
                continue;
            }
            if let Some(items) = node.items() {
                out.extend(
                    items
                        .filter(|&slot| self.item_aabbs[slot].overlaps(query))
                        .map(|slot| self.unpacked(slot)),
                );
            } else if let Some((left, right)) = node.children(index) {
                stack.push(right);
                stack.push(left);
            }
        }
    }

    /// Some object whose AABB contains `point`, or `None`.
    ///
    /// When several objects contain the point, which one is returned depends
    /// on traversal order; it is not the closest or smallest.
    pub fn point_containment(&self, point: &Vec3) -> Option<ObjectId> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut stack: Vec<u32> = self.traversal_stack();
        stack.push(0);

        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if !node.aabb.contains_point(point) {
                continue;
            }
            if let Some(mut items) = node.items() {
                if let Some(slot) = items.find(|&slot| self.item_aabbs[slot].contains_point(point)) {
                    return Some(self.unpacked(slot));
                }
            } else if let Some((left, right)) = node.children(index) {
                stack.push(right);
                stack.push(left);
            }
        }
        None
    }

    /// Nearest object whose AABB the ray enters within `max_distance`.
    ///
    /// Children are visited nearest-entry first and any node whose entry
    /// distance exceeds the best hit so far is skipped, so the result is the
    /// object with the smallest AABB entry distance. Pass `f32::INFINITY` for
    /// an unbounded ray.
    pub fn cast_ray(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        let root = self.nodes.first()?;
        let root_t = root.aabb.ray_entry(ray, max_distance)?;

        let mut best: Option<RayHit> = None;
        let mut best_t = max_distance;
        let mut stack: Vec<(u32, f32)> = self.traversal_stack();
        stack.push((0, root_t));

        while let Some((index, t_near)) = stack.pop() {
            if t_near > best_t {
                continue;
            }
            let node = &self.nodes[index as usize];

            if let Some(items) = node.items() {
                for slot in items {
                    let Some(t) = self.item_aabbs[slot].ray_entry(ray, best_t) else {
                        continue;
                    };
                    if best.is_none_or(|hit| t < hit.distance) {
                        best_t = t;
                        best = Some(RayHit {
                            object: self.unpacked(slot),
                            distance: t,
                            leaf: index,
                        });
                    }
                }
            } else if let Some((left, right)) = node.children(index) {
                let t_left = self.nodes[left as usize].aabb.ray_entry(ray, best_t);
                let t_right = self.nodes[right as usize].aabb.ray_entry(ray, best_t);
                // Farther child first so the nearer one pops next.
                match (t_left, t_right) {
                    (Some(tl), Some(tr)) if tl <= tr => {
                        stack.push((right, tr));
                        stack.push((left, tl));
                    }
                    (Some(tl), Some(tr)) => {
                        stack.push((left, tl));
                        stack.push((right, tr));
                    }
                    (Some(tl), None) => stack.push((left, tl)),
                    (None, Some(tr)) => stack.push((right, tr)),
                    (None, None) => {}
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::BvhConfig,
        frustum::Plane,
        lod::LodBands,
        object_id::ObjectKind,
    };

    fn cube(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::from_half_extents(Vec3::new(x, y, z), Vec3::repeat(0.5))
    }

    fn build(aabbs: &[Aabb], per_leaf: usize) -> Bvh {
        let mut bvh = Bvh::new(BvhConfig {
            max_items_per_leaf: per_leaf,
            lod: LodBands {
                distances: [10.0, 20.0, 40.0],
            },
            ..BvhConfig::default()
        });
        bvh.update(aabbs, |ids| {
            for (i, id) in ids.iter_mut().enumerate() {
                *id = ObjectId::new(ObjectKind::Ship, i as u32);
            }
        })
        .unwrap();
        bvh
    }

    fn indices(ids: impl IntoIterator<Item = ObjectId>) -> Vec<u32> {
        let mut v: Vec<u32> = ids.into_iter().map(|id| id.index).collect();
        v.sort_unstable();
        v
    }

    fn line_of_cubes(n: usize, spacing: f32) -> Vec<Aabb> {
        (0..n).map(|i| cube(i as f32 * spacing, 0.0, 0.0)).collect()
    }

    #[test]
    fn queries_on_empty_tree_return_nothing() {
        let bvh = Bvh::default();
        let everything = Aabb::new(Vec3::repeat(-1.0e6), Vec3::repeat(1.0e6));
        assert!(bvh.gather_in_aabb(&everything).is_empty());
        assert!(bvh.point_containment(&Vec3::zeros()).is_none());
        assert!(bvh.cast_ray(&Ray::new(Vec3::zeros(), Vec3::x()), f32::INFINITY).is_none());
    }

    #[test]
    fn gather_in_aabb_tests_items_not_just_leaves() {
        // Two items per leaf: the leaf bounds span both, the query touches one.
        let bvh = build(&[cube(0.0, 0.0, 0.0), cube(4.0, 0.0, 0.0)], 2);
        let q = Aabb::new(Vec3::new(1.0, -1.0, -1.0), Vec3::new(3.6, 1.0, 1.0));
        assert_eq!(indices(bvh.gather_in_aabb(&q)), vec![1]);
        let gap = Aabb::new(Vec3::new(1.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0));
        assert!(bvh.gather_in_aabb(&gap).is_empty());
    }

    #[test]
    fn gather_in_aabb_finds_ranges() {
        let bvh = build(&line_of_cubes(20, 2.0), 1);
        let q = Aabb::new(Vec3::new(3.9, -1.0, -1.0), Vec3::new(10.1, 1.0, 1.0));
        // Cubes at x = 4, 6, 8, 10.
        assert_eq!(indices(bvh.gather_in_aabb(&q)), vec![2, 3, 4, 5]);
    }

    #[test]
    fn point_containment_hits_and_misses() {
        let bvh = build(&line_of_cubes(10, 3.0), 2);
        assert_eq!(bvh.point_containment(&Vec3::new(9.2, 0.1, -0.3)).map(|id| id.index), Some(3));
        assert_eq!(bvh.point_containment(&Vec3::new(1.5, 0.0, 0.0)), None);
    }

    #[test]
    fn cast_ray_returns_nearest_object() {
        let bvh = build(&line_of_cubes(16, 5.0), 1);
        let from_left = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::x());
        let hit = bvh.cast_ray(&from_left, f32::INFINITY).unwrap();
        assert_eq!(hit.object.index, 0);
        assert!((hit.distance - 9.5).abs() < 1.0e-4);
        assert!(bvh.nodes()[hit.leaf as usize].is_leaf());

        let from_right = Ray::new(Vec3::new(100.0, 0.0, 0.0), -Vec3::x());
        assert_eq!(bvh.cast_ray(&from_right, f32::INFINITY).unwrap().object.index, 15);
    }

    #[test]
    fn cast_ray_prefers_nearest_even_when_boxes_overlap_in_depth() {
        // A large box around the ray's far part and a small box close by,
        // sharing a leaf so leaf order cannot decide the answer.
        let big = Aabb::new(Vec3::new(5.0, -5.0, -5.0), Vec3::new(50.0, 5.0, 5.0));
        let small = cube(2.0, 0.0, 0.0);
        let bvh = build(&[big, small], 2);
        let hit = bvh
            .cast_ray(&Ray::new(Vec3::zeros(), Vec3::x()), f32::INFINITY)
            .unwrap();
        assert_eq!(hit.object.index, 1);
    }

    #[test]
    fn cast_ray_respects_max_distance_and_misses() {
        let bvh = build(&line_of_cubes(4, 10.0), 1);
        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::x());
        assert!(bvh.cast_ray(&ray, 5.0).is_none());
        let above = Ray::new(Vec3::new(-10.0, 5.0, 0.0), Vec3::x());
        assert!(bvh.cast_ray(&above, f32::INFINITY).is_none());
    }

    #[test]
    fn zero_direction_ray_hits_only_boxes_around_its_origin() {
        let bvh = build(&[cube(0.0, 0.0, 0.0)], 1);
        let outside = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::zeros());
        assert!(bvh.cast_ray(&outside, f32::INFINITY).is_none());

        let inside = Ray::new(Vec3::new(0.1, 0.2, 0.0), Vec3::zeros());
        let hit = bvh.cast_ray(&inside, f32::INFINITY).unwrap();
        assert_eq!(hit.object, ObjectId::new(ObjectKind::Ship, 0));
        assert_eq!(hit.distance, 0.0);
    }

    #[test]
    fn frustum_culls_and_assigns_lod() {
        // Box frustum [-100, 100] on x, [-10, 10] on y and z.
        let frustum = Frustum::from_planes([
            Plane::new(Vec3::x(), 100.0),
            Plane::new(-Vec3::x(), 100.0),
            Plane::new(Vec3::y(), 10.0),
            Plane::new(-Vec3::y(), 10.0),
            Plane::new(Vec3::z(), 10.0),
            Plane::new(-Vec3::z(), 10.0),
        ]);
        let aabbs = [
            cube(5.0, 0.0, 0.0),
            cube(15.0, 0.0, 0.0),
            cube(30.0, 0.0, 0.0),
            cube(90.0, 0.0, 0.0),
            cube(0.0, 50.0, 0.0),
        ];
        let bvh = build(&aabbs, 1);
        let mut visible = bvh.gather_in_frustum(&frustum, &Vec3::zeros());
        visible.sort_unstable_by_key(|v| v.id.index);

        let got: Vec<(u32, LodLevel)> = visible.iter().map(|v| (v.id.index, v.lod)).collect();
        assert_eq!(got, vec![(0, 0), (1, 1), (2, 2), (3, 3)]);
    }
}
