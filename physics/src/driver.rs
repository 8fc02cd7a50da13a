/*!
Per-frame composition of the rigid-body store and the BVH.

One [`SpatialIndexFrameDriver::step`] runs, in order:
1. integrate every body (skipped while paused)
2. refresh world AABBs
3. rebuild the BVH from those AABBs

Steps 1 and 2 go through the frame's [`Scheduler`], which returns only once
every batch has finished; step 3 reads the finished AABB array. Queries on
[`SpatialIndexFrameDriver::bvh`] are valid until the next `step`.
*/

use crate::{
    Vec3,
    bvh::{Bvh, BvhStats},
    config::PhysicsConfig,
    error::{ConfigError, PhysicsError},
    rigid_body::{RigidBodyStore, ShapeRegistry},
    scheduler::Scheduler,
};

/// Frame inputs supplied by the game loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    /// Seconds since the previous frame.
    pub dt: f32,
    pub gravity: Vec3,
    /// Skip integration; the index is still rebuilt.
    pub paused: bool,
    /// Run batch steps on the worker pool.
    pub parallel: bool,
}

impl FrameParams {
    /// Serial frame with no gravity. Prefer
    /// [`SpatialIndexFrameDriver::frame_params`] to follow the loaded config.
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            gravity: Vec3::zeros(),
            paused: false,
            parallel: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameReport {
    /// Number of completed steps, this one included.
    pub frame: u64,
    /// Whether bodies were integrated this frame.
    pub integrated: bool,
    /// Whether batch steps ran on the worker pool.
    pub parallel: bool,
    pub bodies: usize,
    pub nodes: usize,
}

/// Owns the body store and the BVH and sequences their per-frame updates.
pub struct SpatialIndexFrameDriver {
    config: PhysicsConfig,
    store: RigidBodyStore,
    bvh: Bvh,
    frame: u64,
}

impl SpatialIndexFrameDriver {
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "spatial index: {} bodies, {} BVH items, {} per leaf",
            config.store.max_bodies,
            config.bvh.max_item_count,
            config.bvh.max_items_per_leaf
        );
        Ok(Self {
            store: RigidBodyStore::new(&config.store),
            bvh: Bvh::new(config.bvh),
            frame: 0,
            config,
        })
    }

    #[inline]
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn store(&self) -> &RigidBodyStore {
        &self.store
    }

    /// Mutable store for spawning, deleting and steering bodies between steps.
    #[inline]
    pub fn store_mut(&mut self) -> &mut RigidBodyStore {
        &mut self.store
    }

    #[inline]
    pub fn shapes_mut(&mut self) -> &mut ShapeRegistry {
        self.store.shapes_mut()
    }

    /// The index built by the last successful step or rebuild.
    #[inline]
    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Frame inputs for `dt` using the configured backend.
    pub fn frame_params(&self, dt: f32) -> FrameParams {
        FrameParams {
            parallel: self.config.scheduler.parallel,
            ..FrameParams::new(dt)
        }
    }

    /// Backend for a frame, honoring the configured batch size.
    pub fn scheduler(&self, parallel: bool) -> Scheduler {
        self.config.scheduler.scheduler(parallel)
    }

    /// Runs one frame. On error the BVH keeps the previous frame's tree while
    /// bodies have already been integrated and refreshed.
    pub fn step(&mut self, params: &FrameParams) -> Result<FrameReport, PhysicsError> {
        let scheduler = self.scheduler(params.parallel);
        let dt = if params.dt.is_finite() {
            params.dt.max(0.0)
        } else {
            0.0
        };

        let integrated = !params.paused;
        if integrated {
            self.store.integrate_all(&scheduler, dt, &params.gravity);
        }
        let stats = self.rebuild_index(&scheduler)?;

        self.frame += 1;
        log::trace!(
            "frame {}: dt {dt}, {} bodies, {} nodes, integrated {integrated}",
            self.frame,
            self.store.len(),
            stats.node_count
        );
        Ok(FrameReport {
            frame: self.frame,
            integrated,
            parallel: scheduler.is_parallel(),
            bodies: self.store.len(),
            nodes: stats.node_count,
        })
    }

    /// Refreshes world AABBs and rebuilds the BVH without integrating.
    ///
    /// Use after spawning or teleporting bodies mid-frame.
    pub fn rebuild_index(&mut self, scheduler: &Scheduler) -> Result<BvhStats, PhysicsError> {
        self.store.refresh_all_world_aabbs(scheduler);
        let store = &self.store;
        self.bvh
            .update(store.world_aabbs(), |ids| store.fill_object_ids(ids))
    }
}
