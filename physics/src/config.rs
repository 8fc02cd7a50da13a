/*!
Tunables for the BVH, the rigid-body store and the batch scheduler.

Every struct derives serde with `#[serde(default)]`, so a game can ship a
partial JSON file and inherit the remaining values from [`crate::constants`].
Call [`PhysicsConfig::validate`] (or load through
[`PhysicsConfig::from_json_str`], which does) before handing a config to the
driver.
*/

use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        DEFAULT_BATCH_SIZE, DEFAULT_MAX_BVH_ITEMS, DEFAULT_MAX_COLLISION_SHAPES,
        DEFAULT_MAX_ITEMS_PER_LEAF, DEFAULT_MAX_RIGID_BODIES, DEFAULT_SMALL_ANGLE_THRESHOLD,
        DEFAULT_STACK_CAPACITY, MAX_ITEMS_PER_LEAF_LIMIT,
    },
    error::ConfigError,
    lod::LodBands,
    scheduler::Scheduler,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhConfig {
    /// Largest AABB span a single rebuild accepts.
    pub max_item_count: usize,
    /// Ranges of at most this many items become leaves.
    pub max_items_per_leaf: usize,
    /// Initial capacity of the build and traversal stacks. Not a hard limit.
    pub stack_capacity: usize,
    pub lod: LodBands,
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            max_item_count: DEFAULT_MAX_BVH_ITEMS,
            max_items_per_leaf: DEFAULT_MAX_ITEMS_PER_LEAF,
            stack_capacity: DEFAULT_STACK_CAPACITY,
            lod: LodBands::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub max_bodies: usize,
    pub max_shapes: usize,
    /// Per-step rotation angle (radians) above which the exact quaternion
    /// exponential replaces the first-order update.
    pub small_angle_threshold: f32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_bodies: DEFAULT_MAX_RIGID_BODIES,
            max_shapes: DEFAULT_MAX_COLLISION_SHAPES,
            small_angle_threshold: DEFAULT_SMALL_ANGLE_THRESHOLD,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Backend used by frames built with
    /// [`SpatialIndexFrameDriver::frame_params`](crate::SpatialIndexFrameDriver::frame_params).
    pub parallel: bool,
    pub batch_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            parallel: cfg!(feature = "parallel"),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SchedulerConfig {
    /// Scheduler selected by the stored toggle.
    pub fn configured(&self) -> Scheduler {
        self.scheduler(self.parallel)
    }

    /// Scheduler with the configured batch size and an explicit backend choice.
    pub fn scheduler(&self, parallel: bool) -> Scheduler {
        if parallel {
            Scheduler::Parallel {
                batch_size: self.batch_size,
            }
        } else {
            Scheduler::Serial
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub bvh: BvhConfig,
    pub store: StoreConfig,
    pub scheduler: SchedulerConfig,
}

impl PhysicsConfig {
    /// Parses a (possibly partial) JSON document and validates it.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: PhysicsConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bvh = &self.bvh;
        if bvh.max_item_count == 0 {
            return Err(ConfigError::Invalid("bvh.max_item_count must be > 0"));
        }
        if bvh.max_items_per_leaf == 0 || bvh.max_items_per_leaf > MAX_ITEMS_PER_LEAF_LIMIT {
            return Err(ConfigError::Invalid("bvh.max_items_per_leaf must be in 1..=16"));
        }
        if bvh.stack_capacity == 0 {
            return Err(ConfigError::Invalid("bvh.stack_capacity must be > 0"));
        }
        if !bvh.lod.is_valid() {
            return Err(ConfigError::Invalid(
                "bvh.lod.distances must be finite, non-negative and strictly increasing",
            ));
        }

        let store = &self.store;
        if store.max_bodies == 0 {
            return Err(ConfigError::Invalid("store.max_bodies must be > 0"));
        }
        if store.max_shapes == 0 {
            return Err(ConfigError::Invalid("store.max_shapes must be > 0"));
        }
        if !(store.small_angle_threshold.is_finite() && store.small_angle_threshold > 0.0) {
            return Err(ConfigError::Invalid("store.small_angle_threshold must be > 0"));
        }

        if self.scheduler.batch_size == 0 {
            return Err(ConfigError::Invalid("scheduler.batch_size must be > 0"));
        }
        Ok(())
    }
}
