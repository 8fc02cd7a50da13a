//! Per-body kernels run over dense slices by the store's batch operations.
//!
//! Each kernel only touches the elements of the slices it is given, so the
//! store can hand disjoint chunks of the same arrays to different workers.

use crate::{Quat, Vec3, aabb::Aabb};

use super::BodyKinematics;

/// Semi-implicit Euler step over `bodies`:
/// `v += g * dt`, `p += v * dt`, then orientation advances by `w * dt`.
pub(crate) fn integrate_bodies(
    bodies: &mut [BodyKinematics],
    dt: f32,
    gravity: &Vec3,
    small_angle_threshold: f32,
) {
    let dv = gravity * dt;
    for body in bodies {
        body.linear_velocity += dv;
        body.position += body.linear_velocity * dt;
        body.orientation =
            integrate_orientation(&body.orientation, &body.angular_velocity, dt, small_angle_threshold);
    }
}

/// Rotates `q` by the world-space angular velocity `w` over `dt`.
///
/// Rotation angles up to `small_angle_threshold` use the first-order update
/// `q + 0.5 * (0, w dt) * q`, renormalized. Larger angles use the exact
/// axis-angle exponential.
pub fn integrate_orientation(q: &Quat, w: &Vec3, dt: f32, small_angle_threshold: f32) -> Quat {
    if *w == Vec3::zeros() {
        return *q;
    }
    let rotation = w * dt;
    let angle = rotation.norm();

    if angle <= small_angle_threshold {
        let q0 = *q.quaternion();
        let spin = nalgebra::Quaternion::from_imag(rotation * 0.5) * q0;
        Quat::new_normalize(q0 + spin)
    } else {
        Quat::from_scaled_axis(rotation) * q
    }
}

/// Writes each body's shape AABB moved to its current pose into `out`.
pub(crate) fn refresh_aabbs(out: &mut [Aabb], bodies: &[BodyKinematics], local: &[Aabb]) {
    for ((world, body), shape) in out.iter_mut().zip(bodies).zip(local) {
        *world = shape.transformed(&body.position, &body.orientation);
    }
}

/// Per-frame multiplier for a velocity that should keep `base` of itself per second.
///
/// `damping_factor(0.5, dt)` halves the velocity every second regardless of
/// frame rate.
#[inline]
pub fn damping_factor(base: f32, dt: f32) -> f32 {
    base.clamp(0.0, 1.0).powf(dt.max(0.0))
}

/// Per-frame multiplier that halves a velocity every `half_life` seconds.
///
/// A non-positive half-life stops the body immediately.
#[inline]
pub fn half_life_damping(half_life: f32, dt: f32) -> f32 {
    if half_life <= 0.0 {
        return 0.0;
    }
    0.5f32.powf(dt.max(0.0) / half_life)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    const THRESHOLD: f32 = 0.05;

    fn body(position: Vec3, linear: Vec3, angular: Vec3) -> BodyKinematics {
        BodyKinematics {
            position,
            linear_velocity: linear,
            angular_velocity: angular,
            ..BodyKinematics::default()
        }
    }

    #[test]
    fn zero_spin_leaves_orientation_untouched() {
        let q = Quat::from_euler_angles(0.3, -1.2, 0.7);
        assert_eq!(integrate_orientation(&q, &Vec3::zeros(), 0.016, THRESHOLD), q);
    }

    #[test]
    fn large_angle_matches_axis_angle() {
        // Quarter turn per second around +Y for one second.
        let q = integrate_orientation(&Quat::identity(), &Vec3::new(0.0, PI / 2.0, 0.0), 1.0, THRESHOLD);
        let expected = Quat::from_axis_angle(&Vec3::y_axis(), PI / 2.0);
        assert!(q.angle_to(&expected) < 1.0e-5);
    }

    #[test]
    fn small_steps_track_exact_rotation() {
        let w = Vec3::new(0.0, 0.0, 1.0);
        let mut q = Quat::identity();
        for _ in 0..100 {
            q = integrate_orientation(&q, &w, 0.01, THRESHOLD);
        }
        let expected = Quat::from_axis_angle(&Vec3::z_axis(), 1.0);
        assert!((q.quaternion().norm() - 1.0).abs() < 1.0e-5);
        assert!(q.angle_to(&expected) < 1.0e-3);
    }

    #[test]
    fn gravity_feeds_velocity_before_position() {
        let mut bodies = [body(Vec3::zeros(), Vec3::zeros(), Vec3::zeros())];
        integrate_bodies(&mut bodies, 0.5, &Vec3::new(0.0, -10.0, 0.0), THRESHOLD);
        assert_eq!(bodies[0].linear_velocity, Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(bodies[0].position, Vec3::new(0.0, -2.5, 0.0));
    }

    #[test]
    fn refresh_translates_and_rotates_shapes() {
        let shape = Aabb::new(Vec3::new(-2.0, -0.5, -0.5), Vec3::new(2.0, 0.5, 0.5));
        let mut spun = body(Vec3::new(10.0, 0.0, 0.0), Vec3::zeros(), Vec3::zeros());
        spun.orientation = Quat::from_axis_angle(&Vec3::y_axis(), PI / 2.0);
        let bodies = [body(Vec3::new(1.0, 2.0, 3.0), Vec3::zeros(), Vec3::zeros()), spun];

        let mut out = [Aabb::from_point(Vec3::zeros()); 2];
        refresh_aabbs(&mut out, &bodies, &[shape, shape]);

        assert_eq!(out[0], Aabb::new(Vec3::new(-1.0, 1.5, 2.5), Vec3::new(3.0, 2.5, 3.5)));
        // Long axis swung from X onto Z.
        let half = out[1].half_extents();
        assert!((half.x - 0.5).abs() < 1.0e-5);
        assert!((half.z - 2.0).abs() < 1.0e-5);
        assert!((out[1].center() - Vec3::new(10.0, 0.0, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn damping_helpers() {
        assert!((damping_factor(0.25, 0.5) - 0.5).abs() < 1.0e-6);
        assert_eq!(damping_factor(0.25, 0.0), 1.0);
        assert!((half_life_damping(2.0, 2.0) - 0.5).abs() < 1.0e-6);
        assert_eq!(half_life_damping(0.0, 0.1), 0.0);
    }
}
