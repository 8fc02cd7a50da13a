use super::ShapeHandle;
use crate::{
    aabb::Aabb,
    error::{PhysicsError, Resource},
};

/// Small append-only table of local-space collision AABBs.
///
/// Shapes are registered once per game-object type at startup and shared by
/// every body of that type; they are never mutated or removed.
#[derive(Clone, Debug)]
pub struct ShapeRegistry {
    shapes: Vec<Aabb>,
    capacity: usize,
}

impl ShapeRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            shapes: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn register(&mut self, local_aabb: Aabb) -> Result<ShapeHandle, PhysicsError> {
        if self.shapes.len() >= self.capacity {
            return Err(PhysicsError::capacity(
                Resource::CollisionShapes,
                self.shapes.len() + 1,
                self.capacity,
            ));
        }
        let handle = ShapeHandle(self.shapes.len() as u32);
        self.shapes.push(local_aabb);
        Ok(handle)
    }

    #[inline]
    pub fn get(&self, handle: ShapeHandle) -> Option<&Aabb> {
        self.shapes.get(handle.index())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
