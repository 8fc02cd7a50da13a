use crate::Vec3;

/// A half-line used for crosshair picking and weapon hit-testing.
///
/// The direction is normalized on construction so hit distances are in
/// meters. The reciprocal direction is cached for the slab test; zero
/// components become infinities, which the slab test handles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    dir: Vec3,
    inv_dir: Vec3,
}

impl Ray {
    /// Builds a ray from `origin` along `direction`.
    ///
    /// A zero `direction` yields a degenerate ray that only hits boxes
    /// containing `origin`.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let dir = direction
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::zeros);
        Self {
            origin,
            dir,
            inv_dir: dir.map(|d| 1.0 / d),
        }
    }

    #[inline]
    pub fn dir(&self) -> Vec3 {
        self.dir
    }

    #[inline]
    pub fn inv_dir(&self) -> Vec3 {
        self.inv_dir
    }

    /// Point reached after travelling `t` meters along the ray.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}
