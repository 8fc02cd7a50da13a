use std::mem;

use super::BodyKinematics;
use crate::Vec3;

/// Read-only view over the kinematic state of every live body, indexed by
/// dense index.
#[derive(Clone, Copy, Debug)]
pub struct InstancesView<'a> {
    bodies: &'a [BodyKinematics],
}

impl<'a> InstancesView<'a> {
    pub(crate) fn new(bodies: &'a [BodyKinematics]) -> Self {
        Self { bodies }
    }

    /// Byte distance between consecutive records, for GPU instance buffers.
    #[inline]
    pub const fn stride() -> usize {
        mem::size_of::<BodyKinematics>()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&'a BodyKinematics> {
        self.bodies.get(index)
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [BodyKinematics] {
        self.bodies
    }

    pub fn iter(&self) -> std::slice::Iter<'a, BodyKinematics> {
        self.bodies.iter()
    }

    pub fn positions(&self) -> impl Iterator<Item = &'a Vec3> + 'a {
        self.bodies.iter().map(|b| &b.position)
    }
}

impl<'a> IntoIterator for InstancesView<'a> {
    type Item = &'a BodyKinematics;
    type IntoIter = std::slice::Iter<'a, BodyKinematics>;

    fn into_iter(self) -> Self::IntoIter {
        self.bodies.iter()
    }
}
