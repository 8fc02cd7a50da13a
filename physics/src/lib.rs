pub mod aabb;
pub mod bvh;
pub mod config;
pub mod constants;
pub mod driver;
pub mod error;
pub mod frustum;
pub mod lod;
pub mod object_id;
pub mod ray;
pub mod rigid_body;
pub mod scheduler;
pub mod types;

pub use aabb::Aabb;
pub use bvh::{Bvh, BvhNode, BvhStats, DebugBox, RayHit, VisibleObject};
pub use config::{BvhConfig, PhysicsConfig, SchedulerConfig, StoreConfig};
pub use driver::{FrameParams, FrameReport, SpatialIndexFrameDriver};
pub use error::{ConfigError, PhysicsError, Resource};
pub use frustum::{Containment, Frustum, Plane};
pub use lod::{LodBands, LodLevel, MAX_LOD, lod_from_distance_sq};
pub use object_id::{ObjectId, ObjectKind, PackedObjectId};
pub use ray::Ray;
pub use rigid_body::{
    BodyKinematics, IndexMove, InstancesView, Removal, RigidBodyDesc, RigidBodyHandle,
    RigidBodyState, RigidBodyStore, ShapeHandle, ShapeRegistry, damping_factor,
    half_life_damping,
};
pub use scheduler::Scheduler;
pub use types::{Mat4, Point3, Quat, Vec3};
