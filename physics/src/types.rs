/*!
Math aliases shared by every module of the crate.

This module intentionally contains no algorithms. Everything is `f32` and
expressed with nalgebra so the renderer and gameplay code can hand their own
vectors straight through without conversion.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point3 = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Mat4 = na::Matrix4<f32>;
