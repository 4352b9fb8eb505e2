//! Scalar easing and Euler helpers shared by the controller and director
//!
//! Angles are in degrees. Rotations follow the yaw-pitch-roll order
//! `R = Ry(yaw) * Rx(pitch) * Rz(roll)`, so a positive pitch tilts the view
//! down and places the camera above its target.

use bevy_math::{EulerRot, Quat, Vec3};

/// Interpolate with the weight clamped to `[0, 1]`, so a single step never overshoots
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Vector counterpart of [`lerp`]
pub fn lerp_vec3(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Per-frame smoothing weight for a rate, clamped to `[0, 1]`
pub fn smoothing(dt: f32, rate: f32) -> f32 {
    (dt * rate).clamp(0.0, 1.0)
}

/// Clamp without asserting `min <= max`.
///
/// With an inverted range, a value below `min` yields `min`; otherwise a value above `max`
/// yields `max`.
pub fn clamp_range(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Clamp to a limit pair, where exactly `(0, 0)` means "no limit"
pub fn clamp_limited(value: f32, min: f32, max: f32) -> f32 {
    if min == 0.0 && max == 0.0 {
        value
    } else {
        clamp_range(value, min, max)
    }
}

/// Wrap an angle into `(-180, 180]`
pub fn normalize_angle(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Build a rotation from `(pitch, yaw, roll)` degrees
pub fn rotation_from_euler(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        degrees.y.to_radians(),
        degrees.x.to_radians(),
        degrees.z.to_radians(),
    )
}

/// Decompose a rotation into normalized `(pitch, yaw, roll)` degrees
pub fn euler_from_rotation(rotation: Quat) -> Vec3 {
    let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(
        normalize_angle(pitch.to_degrees()),
        normalize_angle(yaw.to_degrees()),
        normalize_angle(roll.to_degrees()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_pair_is_unlimited() {
        assert_eq!(clamp_limited(120.0, 0.0, 0.0), 120.0);
        assert_eq!(clamp_limited(120.0, -20.0, 80.0), 80.0);
        assert_eq!(clamp_limited(-45.0, -20.0, 0.0), -20.0);
    }

    #[test]
    fn test_inverted_range_does_not_panic() {
        assert_eq!(clamp_range(5.0, 30.0, 0.0), 30.0);
        assert_eq!(clamp_range(50.0, 30.0, 0.0), 0.0);
        assert_eq!(clamp_range(-5.0, 30.0, 0.0), 30.0);
    }

    #[test]
    fn test_normalize_angle() {
        assert_eq!(normalize_angle(350.0), -10.0);
        assert_eq!(normalize_angle(-190.0), 170.0);
        assert_eq!(normalize_angle(180.0), 180.0);
        assert_eq!(normalize_angle(45.0), 45.0);
    }

    #[test]
    fn test_euler_round_trip_keeps_pitch_and_yaw() {
        let euler = euler_from_rotation(rotation_from_euler(Vec3::new(30.0, 45.0, 0.0)));
        assert!((euler.x - 30.0).abs() < 1e-3);
        assert!((euler.y - 45.0).abs() < 1e-3);
        assert!(euler.z.abs() < 1e-3);
    }

    #[test]
    fn test_positive_pitch_places_camera_above() {
        let rotation = rotation_from_euler(Vec3::new(30.0, 0.0, 0.0));
        let offset = rotation * Vec3::new(0.0, 0.0, -5.0);
        assert!(offset.y > 0.0);
        assert!(offset.z < 0.0);
    }

    #[test]
    fn test_smoothing_weight_is_clamped() {
        assert_eq!(smoothing(1.0, 5.0), 1.0);
        assert_eq!(smoothing(0.5, -1.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 3.0), 10.0);
    }
}
