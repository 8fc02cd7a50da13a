/*!
Axis-aligned bounding boxes in world or shape-local space.

Notes
- Overlap and containment are inclusive on faces: touching boxes overlap.
- The "inverted" box (`min = +inf`, `max = -inf`) is the identity for
  [`Aabb::merged`] and is only used as an accumulator while building bounds.
*/

use crate::{Point3, Quat, Vec3, ray::Ray};

/// Axis-aligned bounding box.
///
/// Invariant: `min <= max` componentwise for every box handed to the BVH or
/// stored in the shape registry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Builds a box from its corners.
    ///
    /// Inverted corners are a caller bug; they are caught in debug builds.
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(
            min.x <= max.x && min.y <= max.y && min.z <= max.z,
            "invalid AABB: min > max"
        );
        Self { min, max }
    }

    /// Builds a box from its corners, rejecting inverted or non-finite input.
    pub fn try_new(min: Vec3, max: Vec3) -> Option<Self> {
        let finite = min.iter().chain(max.iter()).all(|v| v.is_finite());
        let ordered = min.x <= max.x && min.y <= max.y && min.z <= max.z;
        (finite && ordered).then_some(Self { min, max })
    }

    /// Builds a box centered at `center` with non-negative `half_extents`.
    #[inline]
    pub fn from_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// A degenerate box containing exactly one point.
    #[inline]
    pub fn from_point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// Accumulator identity: merging anything into it yields that thing.
    #[inline]
    pub(crate) fn inverted() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Union of a set of boxes, or `None` for an empty set.
    pub fn union_of<'a>(boxes: impl IntoIterator<Item = &'a Aabb>) -> Option<Aabb> {
        let mut iter = boxes.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, b| acc.merged(b)))
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    #[inline]
    pub fn extents(&self) -> Vec3 {
        self.max - self.min
    }

    /// Index (0 = x, 1 = y, 2 = z) of the longest side. Ties pick the lower axis.
    #[inline]
    pub fn largest_axis(&self) -> usize {
        let e = self.extents();
        if e.x >= e.y && e.x >= e.z {
            0
        } else if e.y >= e.z {
            1
        } else {
            2
        }
    }

    /// Smallest box containing both `self` and `other`.
    #[inline]
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Grows the box in place to include `p`.
    #[inline]
    pub fn grow(&mut self, p: &Vec3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    /// Inflates the box by `margin` on all sides.
    pub fn inflated(&self, margin: f32) -> Aabb {
        if margin <= 0.0 {
            return *self;
        }
        let delta = Vec3::repeat(margin);
        Aabb {
            min: self.min - delta,
            max: self.max + delta,
        }
    }

    /// Test two boxes for intersection (inclusive on faces).
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y
            || self.max.z < other.min.z
            || self.min.z > other.max.z)
    }

    /// Point containment (inclusive on faces).
    #[inline]
    pub fn contains_point(&self, p: &Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns `true` if `other` lies entirely inside `self`.
    #[inline]
    pub fn contains(&self, other: &Aabb) -> bool {
        self.contains_point(&other.min) && self.contains_point(&other.max)
    }

    /// Squared distance from `p` to the box center.
    #[inline]
    pub fn center_distance_sq(&self, p: &Vec3) -> f32 {
        (self.center() - p).norm_squared()
    }

    /// World box of a local box placed by `translation` and `rotation` (no scale).
    ///
    /// Uses the center/half-extent form: the rotated half extents are
    /// `|R| * h`, which is exact for the rotated box's bounds.
    pub fn transformed(&self, translation: &Vec3, rotation: &Quat) -> Aabb {
        let center = rotation.transform_point(&Point3::from(self.center())).coords + translation;
        let abs_rot = rotation.to_rotation_matrix().into_inner().abs();
        let half = abs_rot * self.half_extents();
        Aabb {
            min: center - half,
            max: center + half,
        }
    }

    /// Slab test. Returns the entry distance along `ray` (0 when the origin is
    /// inside) if the ray meets the box within `[0, max_t]`.
    pub fn ray_entry(&self, ray: &Ray, max_t: f32) -> Option<f32> {
        let origin = ray.origin;
        let inv = ray.inv_dir();
        let mut t_near = 0.0f32;
        let mut t_far = max_t;

        for axis in 0..3 {
            let mut t0 = (self.min[axis] - origin[axis]) * inv[axis];
            let mut t1 = (self.max[axis] - origin[axis]) * inv[axis];
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            // 0 * inf is NaN for an origin on a slab plane with a parallel
            // direction; f32::max/min drop the NaN and keep the slab open.
            t_near = t_near.max(t0);
            t_far = t_far.min(t1);
            if t_near > t_far {
                return None;
            }
        }

        // A zero direction pushes every outside slab to +inf.
        t_near.is_finite().then_some(t_near)
    }
}
