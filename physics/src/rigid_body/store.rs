use std::{f32::consts::PI, ops::Range};

use nalgebra::Unit;

use super::{
    BodyKinematics, IndexMove, InstancesView, RigidBodyDesc, RigidBodyHandle, RigidBodyState,
    Removal, ShapeHandle, ShapeRegistry,
    integrate::{integrate_bodies, refresh_aabbs},
};
use crate::{
    Quat, Vec3,
    aabb::Aabb,
    config::StoreConfig,
    constants::{DIRECTION_EPS_SQ, local_forward, local_up},
    error::{PhysicsError, Resource},
    object_id::{ObjectId, ObjectKind},
    scheduler::Scheduler,
};

#[derive(Clone, Copy, Debug)]
struct Slot {
    generation: u32,
    /// Dense index of the body holding this slot, `None` while free.
    dense: Option<u32>,
}

/// Dense array of dynamic bodies plus the shape table they reference.
///
/// All per-body arrays are parallel and indexed by dense index.
#[derive(Debug)]
pub struct RigidBodyStore {
    max_bodies: usize,
    small_angle_threshold: f32,
    shapes: ShapeRegistry,

    kinematics: Vec<BodyKinematics>,
    inverse_masses: Vec<f32>,
    shape_ids: Vec<ShapeHandle>,
    /// Copy of each body's shape AABB so refreshes never touch the registry.
    local_aabbs: Vec<Aabb>,
    tags: Vec<ObjectKind>,
    user_indices: Vec<u32>,
    handles: Vec<RigidBodyHandle>,
    world_aabbs: Vec<Aabb>,

    slots: Vec<Slot>,
    free_slots: Vec<u32>,
}

impl RigidBodyStore {
    pub fn new(config: &StoreConfig) -> Self {
        let n = config.max_bodies;
        Self {
            max_bodies: n,
            small_angle_threshold: config.small_angle_threshold,
            shapes: ShapeRegistry::new(config.max_shapes),
            kinematics: Vec::with_capacity(n),
            inverse_masses: Vec::with_capacity(n),
            shape_ids: Vec::with_capacity(n),
            local_aabbs: Vec::with_capacity(n),
            tags: Vec::with_capacity(n),
            user_indices: Vec::with_capacity(n),
            handles: Vec::with_capacity(n),
            world_aabbs: Vec::with_capacity(n),
            slots: Vec::with_capacity(n),
            free_slots: Vec::new(),
        }
    }

    #[inline]
    pub fn shapes(&self) -> &ShapeRegistry {
        &self.shapes
    }

    #[inline]
    pub fn shapes_mut(&mut self) -> &mut ShapeRegistry {
        &mut self.shapes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.kinematics.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.kinematics.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_bodies
    }

    /// Adds a body at rest with identity orientation and returns its handle.
    pub fn create(&mut self, desc: RigidBodyDesc) -> Result<RigidBodyHandle, PhysicsError> {
        if self.len() >= self.max_bodies {
            return Err(PhysicsError::capacity(
                Resource::RigidBodies,
                self.len() + 1,
                self.max_bodies,
            ));
        }
        if !(desc.mass.is_finite() && desc.mass > 0.0) {
            return Err(PhysicsError::InvalidMass(desc.mass));
        }
        if desc.user_index > ObjectId::MAX_INDEX {
            return Err(PhysicsError::InvalidUserIndex(desc.user_index));
        }
        let local = *self
            .shapes
            .get(desc.shape)
            .ok_or(PhysicsError::UnknownShape(desc.shape))?;

        let dense = self.len() as u32;
        let handle = match self.free_slots.pop() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                entry.dense = Some(dense);
                RigidBodyHandle {
                    slot,
                    generation: entry.generation,
                }
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    dense: Some(dense),
                });
                RigidBodyHandle {
                    slot,
                    generation: 0,
                }
            }
        };

        let kinematics = BodyKinematics {
            position: desc.position,
            ..BodyKinematics::default()
        };
        self.world_aabbs
            .push(local.transformed(&kinematics.position, &kinematics.orientation));
        self.kinematics.push(kinematics);
        self.inverse_masses.push(1.0 / desc.mass);
        self.shape_ids.push(desc.shape);
        self.local_aabbs.push(local);
        self.tags.push(desc.tag);
        self.user_indices.push(desc.user_index);
        self.handles.push(handle);

        log::debug!("created rigid body {handle} at index {dense} ({:?})", desc.tag);
        Ok(handle)
    }

    /// Removes a body by moving the last body into its dense index.
    ///
    /// The returned [`Removal`] names the index that changed owner; any table
    /// keyed by dense index must apply the same move.
    pub fn delete(&mut self, handle: RigidBodyHandle) -> Result<Removal, PhysicsError> {
        let index = self.index_of(handle)?;
        let last = self.len() - 1;

        self.kinematics.swap_remove(index);
        self.inverse_masses.swap_remove(index);
        self.shape_ids.swap_remove(index);
        self.local_aabbs.swap_remove(index);
        self.tags.swap_remove(index);
        self.user_indices.swap_remove(index);
        self.world_aabbs.swap_remove(index);
        self.handles.swap_remove(index);

        let moved = if index != last {
            let moved_handle = self.handles[index];
            self.slots[moved_handle.slot as usize].dense = Some(index as u32);
            Some(IndexMove {
                from: last,
                to: index,
            })
        } else {
            None
        };

        let slot = &mut self.slots[handle.slot as usize];
        slot.dense = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(handle.slot);

        log::debug!("deleted rigid body {handle} from index {index}, moved {moved:?}");
        Ok(Removal {
            removed_index: index,
            moved,
        })
    }

    /// Removes every body. Outstanding handles become invalid.
    pub fn clear(&mut self) {
        for handle in &self.handles {
            let slot = &mut self.slots[handle.slot as usize];
            slot.dense = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_slots.push(handle.slot);
        }
        self.kinematics.clear();
        self.inverse_masses.clear();
        self.shape_ids.clear();
        self.local_aabbs.clear();
        self.tags.clear();
        self.user_indices.clear();
        self.handles.clear();
        self.world_aabbs.clear();
    }

    /// Current dense index of `handle`.
    pub fn index_of(&self, handle: RigidBodyHandle) -> Result<usize, PhysicsError> {
        self.slots
            .get(handle.slot as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.dense)
            .map(|dense| dense as usize)
            .ok_or(PhysicsError::InvalidHandle(handle))
    }

    #[inline]
    pub fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.index_of(handle).is_ok()
    }

    #[inline]
    pub fn handle_at(&self, index: usize) -> Option<RigidBodyHandle> {
        self.handles.get(index).copied()
    }

    pub fn get(&self, handle: RigidBodyHandle) -> Result<RigidBodyState, PhysicsError> {
        let index = self.index_of(handle)?;
        Ok(RigidBodyState {
            kinematics: self.kinematics[index],
            inverse_mass: self.inverse_masses[index],
            shape: self.shape_ids[index],
            tag: self.tags[index],
            user_index: self.user_indices[index],
            index,
        })
    }

    /// Read-only view of every live body's kinematic state.
    #[inline]
    pub fn instances(&self) -> InstancesView<'_> {
        InstancesView::new(&self.kinematics)
    }

    /// World AABBs from the last refresh, indexed by dense index.
    #[inline]
    pub fn world_aabbs(&self) -> &[Aabb] {
        &self.world_aabbs
    }

    pub fn world_aabb(&self, handle: RigidBodyHandle) -> Result<Aabb, PhysicsError> {
        Ok(self.world_aabbs[self.index_of(handle)?])
    }

    /// BVH object ID of the body at `index`.
    #[inline]
    pub fn object_id_at(&self, index: usize) -> Option<ObjectId> {
        Some(ObjectId::new(
            *self.tags.get(index)?,
            *self.user_indices.get(index)?,
        ))
    }

    /// Writes the object ID of body `i` into `ids[i]` for every `i` both cover.
    pub fn fill_object_ids(&self, ids: &mut [ObjectId]) {
        for ((id, &tag), &user_index) in ids.iter_mut().zip(&self.tags).zip(&self.user_indices) {
            *id = ObjectId::new(tag, user_index);
        }
    }

    fn body_mut(&mut self, handle: RigidBodyHandle) -> Result<&mut BodyKinematics, PhysicsError> {
        let index = self.index_of(handle)?;
        Ok(&mut self.kinematics[index])
    }

    pub fn set_position(&mut self, handle: RigidBodyHandle, position: Vec3) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.position = position;
        Ok(())
    }

    pub fn set_orientation(&mut self, handle: RigidBodyHandle, orientation: Quat) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.orientation = orientation;
        Ok(())
    }

    pub fn set_linear_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.linear_velocity = velocity;
        Ok(())
    }

    pub fn set_angular_velocity(&mut self, handle: RigidBodyHandle, velocity: Vec3) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.angular_velocity = velocity;
        Ok(())
    }

    /// World-space forward axis of the body (local `-Z`).
    pub fn forward(&self, handle: RigidBodyHandle) -> Result<Vec3, PhysicsError> {
        let index = self.index_of(handle)?;
        Ok(self.kinematics[index].orientation * local_forward())
    }

    /// `v += impulse / mass`.
    pub fn apply_central_impulse(&mut self, handle: RigidBodyHandle, impulse: Vec3) -> Result<(), PhysicsError> {
        let index = self.index_of(handle)?;
        self.kinematics[index].linear_velocity += impulse * self.inverse_masses[index];
        Ok(())
    }

    /// Scales linear velocity down to `max_speed` if it is faster.
    pub fn clamp_linear_velocity_to(&mut self, handle: RigidBodyHandle, max_speed: f32) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        let max_speed = max_speed.max(0.0);
        let speed_sq = body.linear_velocity.norm_squared();
        if speed_sq > max_speed * max_speed {
            body.linear_velocity *= max_speed / speed_sq.sqrt();
        }
        Ok(())
    }

    /// Points linear velocity along `direction`, keeping the current speed.
    ///
    /// A zero `direction` leaves the velocity unchanged.
    pub fn set_linear_velocity_direction(
        &mut self,
        handle: RigidBodyHandle,
        direction: Vec3,
    ) -> Result<(), PhysicsError> {
        let body = self.body_mut(handle)?;
        if direction.norm_squared() > DIRECTION_EPS_SQ {
            body.linear_velocity = direction.normalize() * body.linear_velocity.norm();
        }
        Ok(())
    }

    /// Adds angular velocity that turns the body's forward axis toward `direction`.
    ///
    /// The shortest-arc rotation from forward to `direction` is converted to a
    /// scaled axis and multiplied by `turn_speed * inverse_mass`. The result
    /// accumulates across calls, so pair this with angular damping. An exactly
    /// opposite `direction` turns about the body's up axis.
    pub fn change_angular_velocity_to_face_direction(
        &mut self,
        handle: RigidBodyHandle,
        direction: Vec3,
        turn_speed: f32,
    ) -> Result<(), PhysicsError> {
        let index = self.index_of(handle)?;
        if direction.norm_squared() <= DIRECTION_EPS_SQ {
            return Ok(());
        }
        let body = &mut self.kinematics[index];
        let forward = body.orientation * local_forward();
        let target = direction.normalize();

        let turn = Quat::rotation_between(&forward, &target).unwrap_or_else(|| {
            let up = Unit::new_normalize(body.orientation * local_up());
            Quat::from_axis_angle(&up, PI)
        });
        body.angular_velocity += turn.scaled_axis() * (turn_speed * self.inverse_masses[index]);
        Ok(())
    }

    /// Multiplies angular velocity by `factor`, clamped to `[0, 1]`.
    pub fn damp_angular_velocity(&mut self, handle: RigidBodyHandle, factor: f32) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.angular_velocity *= factor.clamp(0.0, 1.0);
        Ok(())
    }

    /// Multiplies linear velocity by `factor`, clamped to `[0, 1]`.
    pub fn damp_linear_velocity(&mut self, handle: RigidBodyHandle, factor: f32) -> Result<(), PhysicsError> {
        self.body_mut(handle)?.linear_velocity *= factor.clamp(0.0, 1.0);
        Ok(())
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), PhysicsError> {
        if range.start <= range.end && range.end <= self.len() {
            Ok(())
        } else {
            Err(PhysicsError::InvalidRange {
                start: range.start,
                end: range.end,
                len: self.len(),
            })
        }
    }

    /// Advances the bodies in `range` by `dt` under `gravity`.
    ///
    /// Explicit Euler with velocity updated first; no collision response.
    pub fn integrate_transforms(
        &mut self,
        range: Range<usize>,
        dt: f32,
        gravity: &Vec3,
    ) -> Result<(), PhysicsError> {
        self.check_range(&range)?;
        integrate_bodies(&mut self.kinematics[range], dt, gravity, self.small_angle_threshold);
        Ok(())
    }

    /// [`Self::integrate_transforms`] over every body, split by `scheduler`.
    pub fn integrate_all(&mut self, scheduler: &Scheduler, dt: f32, gravity: &Vec3) {
        let threshold = self.small_angle_threshold;
        scheduler.for_each_batch(&mut self.kinematics, |_, bodies| {
            integrate_bodies(bodies, dt, gravity, threshold)
        });
    }

    /// Recomputes the world AABBs of the bodies in `range` from their current pose.
    pub fn refresh_world_aabbs(&mut self, range: Range<usize>) -> Result<(), PhysicsError> {
        self.check_range(&range)?;
        refresh_aabbs(
            &mut self.world_aabbs[range.clone()],
            &self.kinematics[range.clone()],
            &self.local_aabbs[range],
        );
        Ok(())
    }

    /// [`Self::refresh_world_aabbs`] over every body, split by `scheduler`.
    pub fn refresh_all_world_aabbs(&mut self, scheduler: &Scheduler) {
        let bodies = &self.kinematics;
        let local = &self.local_aabbs;
        scheduler.for_each_batch(&mut self.world_aabbs, |start, out| {
            let end = start + out.len();
            refresh_aabbs(out, &bodies[start..end], &local[start..end]);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn store_with_cube(max_bodies: usize) -> (RigidBodyStore, ShapeHandle) {
        let mut store = RigidBodyStore::new(&StoreConfig {
            max_bodies,
            ..StoreConfig::default()
        });
        let cube = store
            .shapes_mut()
            .register(Aabb::from_half_extents(Vec3::zeros(), Vec3::repeat(0.5)))
            .unwrap();
        (store, cube)
    }

    fn desc(shape: ShapeHandle, user_index: u32, x: f32) -> RigidBodyDesc {
        RigidBodyDesc {
            shape,
            tag: ObjectKind::Ship,
            user_index,
            mass: 1.0,
            position: Vec3::new(x, 0.0, 0.0),
        }
    }

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).norm() < 1.0e-5
    }

    #[test]
    fn create_starts_at_rest() {
        let (mut store, cube) = store_with_cube(4);
        let h = store
            .create(RigidBodyDesc {
                mass: 4.0,
                ..desc(cube, 7, 3.0)
            })
            .unwrap();
        let state = store.get(h).unwrap();
        assert_eq!(state.kinematics.position, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(state.kinematics.orientation, Quat::identity());
        assert_eq!(state.kinematics.linear_velocity, Vec3::zeros());
        assert_eq!(state.inverse_mass, 0.25);
        assert_eq!(state.user_index, 7);
        assert_eq!(state.index, 0);
        assert_eq!(
            store.world_aabb(h).unwrap(),
            Aabb::new(Vec3::new(2.5, -0.5, -0.5), Vec3::new(3.5, 0.5, 0.5))
        );
    }

    #[test]
    fn create_rejects_bad_input() {
        let (mut store, cube) = store_with_cube(1);
        let zero_mass = RigidBodyDesc {
            mass: 0.0,
            ..desc(cube, 0, 0.0)
        };
        assert_eq!(store.create(zero_mass), Err(PhysicsError::InvalidMass(0.0)));
        let too_big = ObjectId::MAX_INDEX + 1;
        assert_eq!(
            store.create(desc(cube, too_big, 0.0)),
            Err(PhysicsError::InvalidUserIndex(too_big))
        );
        assert!(store.is_empty());
        let bogus = ShapeHandle(9);
        assert_eq!(
            store.create(desc(bogus, 0, 0.0)),
            Err(PhysicsError::UnknownShape(bogus))
        );

        store.create(desc(cube, 0, 0.0)).unwrap();
        assert!(matches!(
            store.create(desc(cube, 1, 0.0)),
            Err(PhysicsError::CapacityExceeded {
                resource: Resource::RigidBodies,
                requested: 2,
                capacity: 1
            })
        ));
    }

    #[test]
    fn handles_survive_unrelated_deletes() {
        let (mut store, cube) = store_with_cube(8);
        let a = store.create(desc(cube, 0, 0.0)).unwrap();
        let b = store.create(desc(cube, 1, 10.0)).unwrap();
        let c = store.create(desc(cube, 2, 20.0)).unwrap();
        let a_before = store.get(a).unwrap();

        let removal = store.delete(b).unwrap();
        assert_eq!(
            removal,
            Removal {
                removed_index: 1,
                moved: Some(IndexMove { from: 2, to: 1 })
            }
        );

        assert_eq!(store.get(a).unwrap(), a_before);
        let c_state = store.get(c).unwrap();
        assert_eq!(c_state.index, 1);
        assert_eq!(c_state.user_index, 2);
        assert_eq!(c_state.kinematics.position.x, 20.0);
        assert_eq!(store.handle_at(1), Some(c));
        assert_eq!(store.world_aabbs()[1], store.world_aabb(c).unwrap());

        assert_eq!(store.get(b), Err(PhysicsError::InvalidHandle(b)));
        assert_eq!(store.delete(b), Err(PhysicsError::InvalidHandle(b)));
    }

    #[test]
    fn deleting_last_moves_nothing() {
        let (mut store, cube) = store_with_cube(8);
        store.create(desc(cube, 0, 0.0)).unwrap();
        let last = store.create(desc(cube, 1, 0.0)).unwrap();
        assert_eq!(
            store.delete(last).unwrap(),
            Removal {
                removed_index: 1,
                moved: None
            }
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn reused_slot_does_not_revive_stale_handle() {
        let (mut store, cube) = store_with_cube(8);
        let old = store.create(desc(cube, 0, 0.0)).unwrap();
        store.delete(old).unwrap();
        let new = store.create(desc(cube, 1, 5.0)).unwrap();
        assert_eq!(new.slot(), old.slot());
        assert_ne!(new.generation(), old.generation());
        assert!(!store.contains(old));
        assert_eq!(store.get(new).unwrap().user_index, 1);
    }

    #[test]
    fn clear_invalidates_everything() {
        let (mut store, cube) = store_with_cube(8);
        let hs: Vec<_> = (0..3).map(|i| store.create(desc(cube, i, 0.0)).unwrap()).collect();
        store.clear();
        assert!(store.is_empty());
        assert!(hs.iter().all(|&h| !store.contains(h)));
        assert!(store.world_aabbs().is_empty());
        store.create(desc(cube, 0, 0.0)).unwrap();
    }

    #[test]
    fn integration_moves_by_velocity_times_dt() {
        let (mut store, cube) = store_with_cube(8);
        let h = store.create(desc(cube, 0, 1.0)).unwrap();
        let v = Vec3::new(3.0, -2.0, 0.5);
        store.set_linear_velocity(h, v).unwrap();
        let before = store.get(h).unwrap().kinematics;

        store.integrate_transforms(0..1, 0.25, &Vec3::zeros()).unwrap();
        let after = store.get(h).unwrap().kinematics;
        assert_eq!(after.position, before.position + v * 0.25);
        assert_eq!(after.orientation, before.orientation);
        assert_eq!(after.linear_velocity, v);
    }

    #[test]
    fn batch_ranges_are_checked() {
        let (mut store, cube) = store_with_cube(8);
        store.create(desc(cube, 0, 0.0)).unwrap();
        assert_eq!(
            store.integrate_transforms(0..2, 0.1, &Vec3::zeros()),
            Err(PhysicsError::InvalidRange {
                start: 0,
                end: 2,
                len: 1
            })
        );
        #[allow(clippy::reversed_empty_ranges)]
        let backwards = 1..0;
        assert!(store.refresh_world_aabbs(backwards).is_err());
        store.refresh_world_aabbs(1..1).unwrap();
    }

    #[test]
    fn instances_view_walks_dense_order() {
        let (mut store, cube) = store_with_cube(4);
        let a = store.create(desc(cube, 0, 1.0)).unwrap();
        store.create(desc(cube, 1, 2.0)).unwrap();
        store.create(desc(cube, 2, 3.0)).unwrap();
        store.delete(a).unwrap();

        let view = store.instances();
        assert_eq!(view.len(), 2);
        let xs: Vec<f32> = view.positions().map(|p| p.x).collect();
        assert_eq!(xs, vec![3.0, 2.0]);
        assert_eq!(view.iter().count(), view.as_slice().len());
    }

    #[test]
    fn scheduled_and_ranged_batches_agree() {
        let (mut serial, cube) = store_with_cube(64);
        for i in 0..40u32 {
            let h = serial.create(desc(cube, i, i as f32)).unwrap();
            serial
                .set_linear_velocity(h, Vec3::new(0.0, i as f32, 1.0))
                .unwrap();
            serial
                .set_angular_velocity(h, Vec3::new(0.1 * i as f32, 0.0, 0.3))
                .unwrap();
        }
        let mut parallel = RigidBodyStore::new(&StoreConfig {
            max_bodies: 64,
            ..StoreConfig::default()
        });
        parallel.shapes_mut().register(*serial.shapes().get(cube).unwrap()).unwrap();
        for i in 0..serial.len() {
            let h = parallel.create(desc(cube, i as u32, 0.0)).unwrap();
            let k = serial.instances().get(i).copied().unwrap();
            parallel.set_position(h, k.position).unwrap();
            parallel.set_linear_velocity(h, k.linear_velocity).unwrap();
            parallel.set_angular_velocity(h, k.angular_velocity).unwrap();
        }

        let gravity = Vec3::new(0.0, -9.8, 0.0);
        serial.integrate_transforms(0..20, 0.1, &gravity).unwrap();
        serial.integrate_transforms(20..40, 0.1, &gravity).unwrap();
        serial.refresh_world_aabbs(0..40).unwrap();

        let scheduler = Scheduler::Parallel { batch_size: 7 };
        parallel.integrate_all(&scheduler, 0.1, &gravity);
        parallel.refresh_all_world_aabbs(&scheduler);

        assert_eq!(serial.instances().as_slice(), parallel.instances().as_slice());
        assert_eq!(serial.world_aabbs(), parallel.world_aabbs());
    }

    #[test]
    fn impulse_scales_by_inverse_mass() {
        let (mut store, cube) = store_with_cube(4);
        let h = store
            .create(RigidBodyDesc {
                mass: 2.0,
                ..desc(cube, 0, 0.0)
            })
            .unwrap();
        store.apply_central_impulse(h, Vec3::new(10.0, 0.0, 0.0)).unwrap();
        assert_eq!(store.get(h).unwrap().kinematics.linear_velocity, Vec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn clamp_and_redirect_keep_expected_magnitudes() {
        let (mut store, cube) = store_with_cube(4);
        let h = store.create(desc(cube, 0, 0.0)).unwrap();
        store.set_linear_velocity(h, Vec3::new(30.0, 40.0, 0.0)).unwrap();

        store.clamp_linear_velocity_to(h, 10.0).unwrap();
        let v = store.get(h).unwrap().kinematics.linear_velocity;
        assert!(approx(v, Vec3::new(6.0, 8.0, 0.0)));

        store.clamp_linear_velocity_to(h, 100.0).unwrap();
        assert_eq!(store.get(h).unwrap().kinematics.linear_velocity, v);

        store.set_linear_velocity_direction(h, Vec3::new(0.0, 0.0, -3.0)).unwrap();
        assert!(approx(
            store.get(h).unwrap().kinematics.linear_velocity,
            Vec3::new(0.0, 0.0, -10.0)
        ));

        store.set_linear_velocity_direction(h, Vec3::zeros()).unwrap();
        assert!(approx(
            store.get(h).unwrap().kinematics.linear_velocity,
            Vec3::new(0.0, 0.0, -10.0)
        ));
    }

    #[test]
    fn face_direction_turns_forward_onto_target() {
        let (mut store, cube) = store_with_cube(4);
        let h = store.create(desc(cube, 0, 0.0)).unwrap();
        assert!(approx(store.forward(h).unwrap(), Vec3::new(0.0, 0.0, -1.0)));

        // Quarter turn; angular velocity of pi/2 * 2 rad/s for half a second.
        store
            .change_angular_velocity_to_face_direction(h, Vec3::new(5.0, 0.0, 0.0), 2.0)
            .unwrap();
        let w = store.get(h).unwrap().kinematics.angular_velocity;
        assert!(approx(w, Vec3::new(0.0, -FRAC_PI_2 * 2.0, 0.0)));

        store.integrate_transforms(0..1, 0.5, &Vec3::zeros()).unwrap();
        assert!(approx(store.forward(h).unwrap(), Vec3::x()));
    }

    #[test]
    fn face_direction_accumulates_and_handles_opposite() {
        let (mut store, cube) = store_with_cube(4);
        let h = store.create(desc(cube, 0, 0.0)).unwrap();

        store
            .change_angular_velocity_to_face_direction(h, Vec3::new(0.0, 0.0, 1.0), 1.0)
            .unwrap();
        // Half turn about up; either sense is a shortest arc.
        let w = store.get(h).unwrap().kinematics.angular_velocity;
        assert!(w.x.abs() < 1.0e-5 && w.z.abs() < 1.0e-5);
        assert!((w.y.abs() - PI).abs() < 1.0e-4);

        store
            .change_angular_velocity_to_face_direction(h, Vec3::new(0.0, 0.0, 1.0), 1.0)
            .unwrap();
        let w2 = store.get(h).unwrap().kinematics.angular_velocity;
        assert!(approx(w2, w * 2.0));

        store
            .change_angular_velocity_to_face_direction(h, Vec3::zeros(), 1.0)
            .unwrap();
        assert_eq!(store.get(h).unwrap().kinematics.angular_velocity, w2);
    }

    #[test]
    fn damping_scales_velocities() {
        let (mut store, cube) = store_with_cube(4);
        let h = store.create(desc(cube, 0, 0.0)).unwrap();
        store.set_linear_velocity(h, Vec3::new(8.0, 0.0, 0.0)).unwrap();
        store.set_angular_velocity(h, Vec3::new(0.0, 4.0, 0.0)).unwrap();

        store.damp_linear_velocity(h, 0.5).unwrap();
        store.damp_angular_velocity(h, 0.25).unwrap();
        let k = store.get(h).unwrap().kinematics;
        assert_eq!(k.linear_velocity, Vec3::new(4.0, 0.0, 0.0));
        assert_eq!(k.angular_velocity, Vec3::new(0.0, 1.0, 0.0));

        store.damp_linear_velocity(h, 3.0).unwrap();
        assert_eq!(store.get(h).unwrap().kinematics.linear_velocity, Vec3::new(4.0, 0.0, 0.0));
    }
}
