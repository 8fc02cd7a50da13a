/*!
Capacities, thresholds and axis conventions used as configuration defaults.

Notes
- Distances are in meters, time in seconds, angles in radians.
- These are defaults only. Everything that is tunable per game lives in
  [`crate::config::PhysicsConfig`] and falls back to the values below.
*/

/// Maximum number of AABBs a single BVH rebuild accepts.
pub const DEFAULT_MAX_BVH_ITEMS: usize = 4096;

/// Maximum number of objects referenced by a single BVH leaf.
///
/// Typical values: 1 .. 4. Larger leaves build faster and cull worse.
pub const DEFAULT_MAX_ITEMS_PER_LEAF: usize = 2;

/// Upper bound on `max_items_per_leaf` accepted by config validation.
pub const MAX_ITEMS_PER_LEAF_LIMIT: usize = 16;

/// Initial capacity of the explicit build and traversal stacks.
///
/// A balanced tree over `DEFAULT_MAX_BVH_ITEMS` is far shallower than this.
pub const DEFAULT_STACK_CAPACITY: usize = 128;

/// Maximum number of live rigid bodies.
pub const DEFAULT_MAX_RIGID_BODIES: usize = 4096;

/// Maximum number of registered collision shapes.
///
/// Shapes are shared per game-object type, so this stays small.
pub const DEFAULT_MAX_COLLISION_SHAPES: usize = 64;

/// Rotation angle per step (radians) above which orientation integration uses
/// the exact axis-angle quaternion instead of the first-order approximation.
pub const DEFAULT_SMALL_ANGLE_THRESHOLD: f32 = 0.05;

/// Distances (meters) from the eye separating LOD 0|1, 1|2 and 2|3.
pub const DEFAULT_LOD_DISTANCES: [f32; 3] = [60.0, 180.0, 500.0];

/// Number of bodies handed to one worker job by the parallel scheduler.
pub const DEFAULT_BATCH_SIZE: usize = 256;

/// Squared length under which a direction vector is treated as zero.
pub const DIRECTION_EPS_SQ: f32 = 1.0e-12;

/// Body-local forward axis (right-handed, camera style).
#[inline]
pub fn local_forward() -> crate::Vec3 {
    crate::Vec3::new(0.0, 0.0, -1.0)
}

/// Body-local up axis.
#[inline]
pub fn local_up() -> crate::Vec3 {
    crate::Vec3::new(0.0, 1.0, 0.0)
}
