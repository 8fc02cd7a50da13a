/*!
Dense store of dynamic rigid bodies.

Notes
- Live bodies always occupy dense indices `[0, len)`. Deleting a body moves
  the last one into its index (swap-remove) and reports the move through
  [`Removal`], so callers keeping index-keyed side tables can patch them.
- Handles are generation-tagged and survive those moves.
- Kinematic state is stored as one [`BodyKinematics`] per body so renderers
  can read it through [`InstancesView`] without copying. Everything else
  (inverse mass, shape, user tag) lives in parallel arrays.
- Batch operations take disjoint index ranges, which is what lets the
  scheduler split them across workers.
*/

mod handle;
mod integrate;
mod shape;
mod store;
mod view;

pub use handle::{RigidBodyHandle, ShapeHandle};
pub use integrate::{damping_factor, half_life_damping, integrate_orientation};
pub use shape::ShapeRegistry;
pub use store::RigidBodyStore;
pub use view::InstancesView;

use crate::{Quat, Vec3, object_id::ObjectKind};

/// Pose and velocities of one body, laid out for direct instance upload.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct BodyKinematics {
    /// World position (meters).
    pub position: Vec3,
    pub orientation: Quat,
    /// Meters per second.
    pub linear_velocity: Vec3,
    /// World-space axis scaled by radians per second.
    pub angular_velocity: Vec3,
}

impl Default for BodyKinematics {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            orientation: Quat::identity(),
            linear_velocity: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
        }
    }
}

/// Spawn parameters for [`RigidBodyStore::create`].
#[derive(Clone, Copy, Debug)]
pub struct RigidBodyDesc {
    pub shape: ShapeHandle,
    /// Game-object type, reported back through BVH object IDs.
    pub tag: ObjectKind,
    /// Index of the owning game object in its own table. At most
    /// [`ObjectId::MAX_INDEX`](crate::ObjectId::MAX_INDEX) so it survives packing.
    pub user_index: u32,
    /// Kilograms; must be finite and positive.
    pub mass: f32,
    pub position: Vec3,
}

/// Snapshot of one body returned by [`RigidBodyStore::get`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBodyState {
    pub kinematics: BodyKinematics,
    pub inverse_mass: f32,
    pub shape: ShapeHandle,
    pub tag: ObjectKind,
    pub user_index: u32,
    /// Current dense index. Only valid until the next delete.
    pub index: usize,
}

/// A body that changed dense index during a delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexMove {
    pub from: usize,
    pub to: usize,
}

/// What [`RigidBodyStore::delete`] did to the dense arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Removal {
    /// Dense index the deleted body occupied.
    pub removed_index: usize,
    /// The former last body, now living at `removed_index`. `None` when the
    /// deleted body was the last one.
    pub moved: Option<IndexMove>,
}
