use std::fmt;

/// Stable reference to a rigid body.
///
/// The dense index of a body changes when another body is deleted; its handle
/// does not. `generation` is bumped every time a slot is freed, so a handle
/// kept past its body's deletion resolves to
/// [`crate::PhysicsError::InvalidHandle`] instead of aliasing whichever body
/// reuses the slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RigidBodyHandle {
    pub(crate) slot: u32,
    pub(crate) generation: u32,
}

impl RigidBodyHandle {
    #[inline]
    pub fn slot(&self) -> u32 {
        self.slot
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for RigidBodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.slot, self.generation)
    }
}

/// Index of a collision shape in the [`super::ShapeRegistry`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShapeHandle(pub(crate) u32);

impl ShapeHandle {
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}
