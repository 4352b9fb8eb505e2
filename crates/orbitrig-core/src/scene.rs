//! Scene queries the rig depends on
//!
//! The host engine owns geometry and object positions; the rig only asks
//! three questions of it through [`SceneQuery`].

use bevy_math::Vec3;

/// Opaque handle to an object the rig can orbit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(pub u64);

/// First geometry hit along a cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Hit position in world space
    pub point: Vec3,
    /// Distance from the cast origin
    pub distance: f32,
}

/// Host-provided scene access
pub trait SceneQuery {
    /// World position of a target, `None` when it no longer exists
    fn target_position(&mut self, target: TargetId) -> Option<Vec3>;

    /// First hit on the segment `from -> to`
    fn linecast(&mut self, from: Vec3, to: Vec3) -> Option<RayHit>;

    /// First hit along an unbounded ray; `direction` is normalized
    fn raycast(&mut self, origin: Vec3, direction: Vec3) -> Option<RayHit>;
}
