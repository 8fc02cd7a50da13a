use std::fmt;

use thiserror::Error;

use crate::{
    object_id::ObjectId,
    rigid_body::{RigidBodyHandle, ShapeHandle},
};

/// Bounded resource a capacity error refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Resource {
    /// AABBs handed to a single BVH rebuild.
    BvhItems,
    /// Live rigid bodies in the store.
    RigidBodies,
    /// Registered collision shapes.
    CollisionShapes,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::BvhItems => "BVH item",
            Resource::RigidBodies => "rigid body",
            Resource::CollisionShapes => "collision shape",
        };
        f.write_str(name)
    }
}

/// Errors reported by the BVH and the rigid-body store.
///
/// Capacity errors are configuration bugs: the game is expected to cap spawn
/// counts below the configured maximum, so callers should abort the operation
/// rather than retry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PhysicsError {
    /// A bounded table or buffer is full.
    #[error("{resource} capacity exceeded: requested {requested}, capacity {capacity}")]
    CapacityExceeded {
        resource: Resource,
        requested: usize,
        capacity: usize,
    },
    /// The handle was never minted or its body has been deleted.
    #[error("invalid rigid body handle {0:?}")]
    InvalidHandle(RigidBodyHandle),
    /// The collision shape handle is not registered.
    #[error("unknown collision shape {0:?}")]
    UnknownShape(ShapeHandle),
    /// Only dynamic bodies are modeled; mass must be finite and positive.
    #[error("mass must be finite and positive, got {0}")]
    InvalidMass(f32),
    /// The user index does not fit the 24-bit index of a packed object ID.
    #[error("user index {0} exceeds the packed object ID limit {max}", max = ObjectId::MAX_INDEX)]
    InvalidUserIndex(u32),
    /// A batch range does not lie inside the live body range.
    #[error("index range {start}..{end} out of bounds for {len} bodies")]
    InvalidRange { start: usize, end: usize, len: usize },
}

impl PhysicsError {
    pub(crate) fn capacity(resource: Resource, requested: usize, capacity: usize) -> Self {
        log::warn!("{resource} capacity exceeded: requested {requested}, capacity {capacity}");
        PhysicsError::CapacityExceeded {
            resource,
            requested,
            capacity,
        }
    }
}

/// Errors produced while loading or validating [`crate::PhysicsConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
