/*!
View frustum for culling.

A frustum is six inward-facing planes. Each plane carries a sign mask
computed once at construction that picks, per axis, which AABB corner lies
farthest along the plane normal (the "p-vertex") and which lies nearest (the
"n-vertex"). Classifying a box is then two dot products per plane.
*/

use crate::{Mat4, Vec3, aabb::Aabb};

/// A plane `normal . x + d = 0`; points with positive signed distance are inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vec3,
    pub d: f32,
}

impl Plane {
    /// Builds a plane and normalizes it so signed distances are in meters.
    ///
    /// A zero normal is kept as-is; such a plane accepts every point with `d >= 0`.
    pub fn new(normal: Vec3, d: f32) -> Self {
        let len = normal.norm();
        if len > f32::EPSILON {
            Self {
                normal: normal / len,
                d: d / len,
            }
        } else {
            Self { normal, d }
        }
    }

    /// Plane through `point` facing along `normal`.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let n = normal.try_normalize(f32::EPSILON).unwrap_or(normal);
        Self {
            normal: n,
            d: -n.dot(&point),
        }
    }

    #[inline]
    pub fn signed_distance(&self, p: &Vec3) -> f32 {
        self.normal.dot(p) + self.d
    }
}

/// Result of classifying a box against a frustum.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Containment {
    /// Fully inside every plane.
    Inside,
    /// Fully outside at least one plane.
    Outside,
    /// Straddles at least one plane.
    Intersects,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    planes: [Plane; 6],
    /// Per plane and axis: `true` when the normal component is non-negative.
    signs: [[bool; 3]; 6],
}

impl Frustum {
    /// Order is not significant; all six planes must face inward.
    pub fn from_planes(planes: [Plane; 6]) -> Self {
        let signs = planes.map(|p| [p.normal.x >= 0.0, p.normal.y >= 0.0, p.normal.z >= 0.0]);
        Self { planes, signs }
    }

    /// Extracts the planes of a combined view-projection matrix
    /// (Gribb/Hartmann, OpenGL clip space `-w <= x, y, z <= w`).
    pub fn from_view_projection(view_proj: &Mat4) -> Self {
        let r0 = view_proj.row(0).clone_owned();
        let r1 = view_proj.row(1).clone_owned();
        let r2 = view_proj.row(2).clone_owned();
        let r3 = view_proj.row(3).clone_owned();

        let plane =
            |row: nalgebra::RowVector4<f32>| Plane::new(Vec3::new(row[0], row[1], row[2]), row[3]);

        Self::from_planes([
            plane(r3 + r0), // left
            plane(r3 - r0), // right
            plane(r3 + r1), // bottom
            plane(r3 - r1), // top
            plane(r3 + r2), // near
            plane(r3 - r2), // far
        ])
    }

    #[inline]
    pub fn planes(&self) -> &[Plane; 6] {
        &self.planes
    }

    #[inline]
    pub fn contains_point(&self, p: &Vec3) -> bool {
        self.planes.iter().all(|plane| plane.signed_distance(p) >= 0.0)
    }

    /// Classifies `aabb` as inside, outside, or straddling the frustum.
    ///
    /// Conservative: a box near a frustum corner may report `Intersects`
    /// while being outside, never the reverse.
    pub fn classify(&self, aabb: &Aabb) -> Containment {
        let mut result = Containment::Inside;

        for (plane, sign) in self.planes.iter().zip(&self.signs) {
            let p_vertex = Vec3::new(
                if sign[0] { aabb.max.x } else { aabb.min.x },
                if sign[1] { aabb.max.y } else { aabb.min.y },
                if sign[2] { aabb.max.z } else { aabb.min.z },
            );
            if plane.signed_distance(&p_vertex) < 0.0 {
                return Containment::Outside;
            }

            let n_vertex = Vec3::new(
                if sign[0] { aabb.min.x } else { aabb.max.x },
                if sign[1] { aabb.min.y } else { aabb.max.y },
                if sign[2] { aabb.min.z } else { aabb.max.z },
            );
            if plane.signed_distance(&n_vertex) < 0.0 {
                result = Containment::Intersects;
            }
        }

        result
    }
}
