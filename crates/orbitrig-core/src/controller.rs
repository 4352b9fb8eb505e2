//! Orbit camera controller
//!
//! Turns per-frame input into a rig pose: orbit velocities are integrated
//! into yaw/pitch, zoom and pan are eased toward their targets, and optional
//! obstruction and ground checks pull the camera out of geometry.

use crate::config::{OrbitConfig, Trigger};
use crate::input::{FrameInput, InputBackend, TouchSample};
use crate::math::{
    clamp_limited, clamp_range, euler_from_rotation, lerp, lerp_vec3, rotation_from_euler,
    smoothing,
};
use crate::scene::{SceneQuery, TargetId};
use bevy_math::{Quat, Vec2, Vec3};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

/// Pointer axis deltas are scaled by this before being applied
const POINTER_IMPULSE: f32 = 0.2;
/// Wheel units to distance units
const WHEEL_ZOOM_GAIN: f32 = 5.0;
/// Single-finger orbit impulse
const TOUCH_ORBIT_IMPULSE: f32 = 0.01;
/// Touch pan impulse
const TOUCH_PAN_IMPULSE: f32 = 0.05;
/// Pinch distance change to zoom distance
const PINCH_ZOOM_GAIN: f32 = 100_000.0;
/// Guards the touch delta-time division
const TOUCH_DT_EPSILON: f32 = 0.001;
/// Pan offsets are `velocity * distance / PAN_DISTANCE_DIVISOR`
const PAN_DISTANCE_DIVISOR: f32 = 10.0;

static NEXT_RIG_ID: AtomicU64 = AtomicU64::new(1);

/// What the rig orbits around
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrbitTarget {
    /// A scene object, resolved every frame
    Tracked(TargetId),
    /// A free-floating point steered by the view transition director
    Transient(Vec3),
}

/// Rig transform in world space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for RigPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Result of one rig update, for the host to write back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigOutput {
    /// Rig transform
    pub pose: RigPose,
    /// Local position of the pan camera under the rig
    pub pan_local: Vec3,
}

/// Proof that the holder, not the controller, currently owns the rig state.
///
/// Issued by [`OrbitController::suspend`] and handed back through
/// [`OrbitController::resume`]. While it is out the controller ignores input
/// and only decays its velocities. A lease only unlocks the controller that
/// issued it.
#[derive(Debug)]
pub struct ControlLease {
    owner: u64,
}

/// Remembers the configured pitch minimum while ground hover overrides it
#[derive(Debug, Clone, Copy)]
struct GroundClamp {
    stored_min: f32,
    engaged: bool,
}

/// Smoothed orbit camera controller
#[derive(Debug)]
pub struct OrbitController {
    id: u64,
    config: OrbitConfig,
    backend: InputBackend,
    target: Option<OrbitTarget>,
    active: bool,

    yaw: f32,
    pitch: f32,
    pitch_min: f32,
    rotation: Quat,

    distance: f32,
    smoothed_distance: f32,

    velocity: Vec2,
    pan_velocity: Vec2,
    pan_offset: Vec3,
    pan_local: Vec3,

    ground: GroundClamp,
    pose: RigPose,
}

impl OrbitController {
    /// Create a controller seeded from the rig's current transform
    pub fn new(config: OrbitConfig, initial: RigPose, backend: InputBackend) -> Self {
        let angles = euler_from_rotation(initial.rotation);
        let distance = clamp_range(
            config.zoom.distance,
            config.zoom.distance_min,
            config.zoom.distance_max,
        );
        let pitch_min = config.orbit.pitch_limits.x;

        Self {
            id: NEXT_RIG_ID.fetch_add(1, Ordering::Relaxed),
            backend,
            target: None,
            active: true,
            yaw: angles.y,
            pitch: angles.x,
            pitch_min,
            rotation: initial.rotation,
            distance,
            smoothed_distance: distance,
            velocity: Vec2::ZERO,
            pan_velocity: Vec2::ZERO,
            pan_offset: Vec3::ZERO,
            pan_local: Vec3::ZERO,
            ground: GroundClamp {
                stored_min: pitch_min,
                engaged: false,
            },
            pose: initial,
            config,
        }
    }

    /// Builder-style target assignment
    pub fn with_target(mut self, target: TargetId) -> Self {
        self.target = Some(OrbitTarget::Tracked(target));
        self
    }

    pub fn config(&self) -> &OrbitConfig {
        &self.config
    }

    pub fn backend(&self) -> InputBackend {
        self.backend
    }

    pub fn target(&self) -> Option<OrbitTarget> {
        self.target
    }

    /// Point the rig at another object, or at nothing
    pub fn set_target(&mut self, target: Option<OrbitTarget>) {
        self.target = target;
    }

    /// Last pose produced by [`update`](Self::update)
    pub fn pose(&self) -> RigPose {
        self.pose
    }

    pub fn pan_local(&self) -> Vec3 {
        self.pan_local
    }

    pub fn pan_offset(&self) -> Vec3 {
        self.pan_offset
    }

    pub fn distance(&self) -> f32 {
        self.distance
    }

    pub fn smoothed_distance(&self) -> f32 {
        self.smoothed_distance
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Current pitch limits, including any ground-hover override
    pub fn pitch_limits(&self) -> Vec2 {
        Vec2::new(self.pitch_min, self.config.orbit.pitch_limits.y)
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn pan_velocity(&self) -> Vec2 {
        self.pan_velocity
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// World position of the current target, if it resolves
    pub fn resolve_target<S: SceneQuery + ?Sized>(&self, scene: &mut S) -> Option<Vec3> {
        match self.target? {
            OrbitTarget::Tracked(id) => scene.target_position(id),
            OrbitTarget::Transient(point) => Some(point),
        }
    }

    /// Hand rig ownership to an external driver; `None` if it is already out
    pub fn suspend(&mut self) -> Option<ControlLease> {
        if !self.active {
            return None;
        }
        self.active = false;
        Some(ControlLease { owner: self.id })
    }

    /// Whether `lease` was issued by this controller
    pub fn holds(&self, lease: &ControlLease) -> bool {
        lease.owner == self.id
    }

    /// Take ownership back, adopting the driver's pan offset and orientation.
    ///
    /// A lease issued by another controller is handed back untouched.
    pub fn resume(&mut self, lease: ControlLease, pan_offset: Vec2) -> Result<(), ControlLease> {
        if !self.holds(&lease) {
            warn!(rig = self.id, owner = lease.owner, "Refusing lease issued by another rig");
            return Err(lease);
        }
        self.active = true;
        self.pan_offset = pan_offset.extend(0.0);
        self.reset_values();
        Ok(())
    }

    /// Re-derive yaw/pitch from the current orientation and pan velocities from the pan offset
    pub fn reset_values(&mut self) {
        let angles = euler_from_rotation(self.rotation);
        self.yaw = angles.y;
        self.pitch = angles.x;
        self.velocity = Vec2::ZERO;

        let scale = self.distance / PAN_DISTANCE_DIVISOR;
        if scale.abs() > f32::EPSILON {
            self.pan_velocity = Vec2::new(-self.pan_offset.x / scale, -self.pan_offset.y / scale);
        }
    }

    // Writes through a foreign lease are ignored

    pub fn lease_set_target(&mut self, lease: &ControlLease, target: Option<OrbitTarget>) {
        if self.holds(lease) {
            self.target = target;
        }
    }

    pub fn lease_set_rotation(&mut self, lease: &ControlLease, rotation: Quat) {
        if self.holds(lease) {
            self.rotation = rotation;
        }
    }

    pub fn lease_set_distance(&mut self, lease: &ControlLease, distance: f32) {
        if self.holds(lease) {
            self.distance = distance;
        }
    }

    pub fn lease_set_pan_local(&mut self, lease: &ControlLease, pan_local: Vec3) {
        if self.holds(lease) {
            self.pan_local = pan_local;
        }
    }

    /// Advance the rig by one frame.
    ///
    /// Returns `None` without touching any state when the target is missing.
    pub fn update<S: SceneQuery + ?Sized>(
        &mut self,
        input: &FrameInput,
        scene: &mut S,
        dt: f32,
    ) -> Option<RigOutput> {
        let Some(target_position) = self.resolve_target(scene) else {
            trace!("Orbit target unresolved, skipping frame");
            return None;
        };

        let smooth_time = self.config.orbit.smooth_time;
        let blocked = self.config.misc.ui_blocks_interaction && input.ui_blocked;

        if self.active {
            match self.backend {
                InputBackend::Pointer => {
                    if !blocked {
                        self.accumulate_pointer(input);
                    }
                    // Wheel zoom is not subject to UI blocking
                    self.apply_wheel_zoom(input);
                }
                InputBackend::Touch if !blocked => self.accumulate_touch(input, dt),
                InputBackend::Touch => {}
            }
        }

        if self.active {
            self.yaw += self.velocity.x;
            self.pitch -= self.velocity.y;

            let yaw_limits = self.config.orbit.yaw_limits;
            self.pitch = clamp_limited(
                self.pitch,
                self.pitch_min,
                self.config.orbit.pitch_limits.y,
            );
            self.yaw = clamp_limited(self.yaw, yaw_limits.x, yaw_limits.y);

            if self.config.avoidance.ground_hover {
                self.hover_above_ground(scene);
            }
            if self.config.avoidance.obstructions {
                self.avoid_obstructions(scene, target_position, dt);
            }
            if self.config.orbit.enabled {
                self.rotation = rotation_from_euler(Vec3::new(self.pitch, self.yaw, 0.0));
            }
        }

        self.smoothed_distance = lerp(
            self.smoothed_distance,
            self.distance,
            smoothing(dt, smooth_time),
        );
        let position = self.rotation * Vec3::new(0.0, 0.0, -self.smoothed_distance)
            + target_position
            + Vec3::new(self.config.misc.x_offset, self.config.misc.y_offset, 0.0);
        self.pose = RigPose {
            position,
            rotation: self.rotation,
        };

        if self.config.orbit.automatic {
            self.velocity.x = lerp(
                self.velocity.x,
                self.config.orbit.automatic_speed,
                smoothing(dt, smooth_time),
            );
        }
        let decay = smoothing(dt, smooth_time);
        self.velocity.x = lerp(self.velocity.x, 0.0, decay);
        self.velocity.y = lerp(self.velocity.y, 0.0, decay);

        self.pan_offset = Vec3::new(
            -self.pan_velocity.x * self.distance / PAN_DISTANCE_DIVISOR,
            -self.pan_velocity.y * self.distance / PAN_DISTANCE_DIVISOR,
            0.0,
        );
        if self.active && self.config.pan.enabled {
            self.pan_local = lerp_vec3(
                self.pan_local,
                self.pan_offset,
                smoothing(dt, smooth_time * 1.5),
            );
            if self.config.pan.limit {
                let horizontal = self.config.pan.limits_left_right;
                let vertical = self.config.pan.limits_up_down;
                self.pan_local.x = clamp_range(self.pan_local.x, horizontal.x, horizontal.y);
                self.pan_local.y = clamp_range(self.pan_local.y, vertical.x, vertical.y);
            }
        }

        Some(RigOutput {
            pose: self.pose,
            pan_local: self.pan_local,
        })
    }

    fn accumulate_pointer(&mut self, input: &FrameInput) {
        let orbit = &self.config.orbit;
        if input.orbit_held {
            if !orbit.lock_x_axis {
                self.velocity.x += orbit.x_speed * input.pointer_delta.x * POINTER_IMPULSE;
            }
            if !orbit.lock_y_axis {
                self.velocity.y += orbit.y_speed * input.pointer_delta.y * POINTER_IMPULSE;
            }
        }

        let pan = &self.config.pan;
        if pan.enabled && input.pan_held {
            self.pan_velocity += input.pointer_delta * pan.speed * POINTER_IMPULSE;
        }
    }

    fn apply_wheel_zoom(&mut self, input: &FrameInput) {
        let zoom = &self.config.zoom;
        if zoom.enabled {
            self.distance = clamp_range(
                self.distance - input.scroll_delta * zoom.speed * WHEEL_ZOOM_GAIN,
                zoom.distance_min,
                zoom.distance_max,
            );
        }
    }

    fn accumulate_touch(&mut self, input: &FrameInput, dt: f32) {
        let pan_on_primary = self.config.pan.enabled && self.config.pan.trigger == Trigger::Primary;

        match input.touches.as_slice() {
            [touch] => {
                let scaled = touch.delta * frame_rate_scale(touch, dt);
                if pan_on_primary {
                    self.pan_velocity += scaled * self.config.pan.speed * TOUCH_PAN_IMPULSE;
                } else {
                    let orbit = &self.config.orbit;
                    if !orbit.lock_x_axis {
                        self.velocity.x += orbit.x_speed * scaled.x * TOUCH_ORBIT_IMPULSE;
                    }
                    if !orbit.lock_y_axis {
                        self.velocity.y += orbit.y_speed * scaled.y * TOUCH_ORBIT_IMPULSE;
                    }
                }
            }
            [first, second] => {
                let previous = first.previous_position().distance(second.previous_position());
                let current = first.position.distance(second.position);
                let pinch = previous - current;

                let zoom = &self.config.zoom;
                if zoom.enabled {
                    let goal = clamp_range(
                        self.distance + pinch * PINCH_ZOOM_GAIN * zoom.speed,
                        zoom.distance_min,
                        zoom.distance_max,
                    );
                    self.distance = lerp(
                        self.distance,
                        goal,
                        dt * self.config.orbit.smooth_time * 0.1 * zoom.speed,
                    );
                }

                if self.config.pan.enabled && !pan_on_primary {
                    // Both fingers are normalized by the first finger's sample time
                    let scale = frame_rate_scale(first, dt);
                    let average = (first.delta + second.delta) * 0.5;
                    self.pan_velocity += average * scale * self.config.pan.speed * TOUCH_PAN_IMPULSE;
                }
            }
            _ => {}
        }
    }

    fn hover_above_ground<S: SceneQuery + ?Sized>(&mut self, scene: &mut S) {
        let Some(hit) = scene.raycast(self.pose.position, Vec3::NEG_Y) else {
            return;
        };
        let threshold = self.config.avoidance.ground_hover_distance;
        let frozen = self.pitch;

        if hit.distance > threshold {
            if self.ground.engaged {
                debug!(ground = hit.distance, "Ground hover released");
                self.ground.engaged = false;
            }
            self.pitch_min = self.ground.stored_min;
        }
        if hit.distance < threshold {
            if !self.ground.engaged {
                debug!(ground = hit.distance, pitch = frozen, "Ground hover engaged");
                self.ground.engaged = true;
            }
            self.pitch_min = frozen;
            self.pitch = frozen;
        }
    }

    fn avoid_obstructions<S: SceneQuery + ?Sized>(
        &mut self,
        scene: &mut S,
        target_position: Vec3,
        dt: f32,
    ) {
        let Some(hit) = scene.linecast(target_position, self.pose.position) else {
            return;
        };
        let shrunk = (self.distance - hit.distance).max(self.config.zoom.distance_min);
        self.distance = lerp(
            self.distance,
            shrunk,
            dt * self.config.orbit.smooth_time * 0.5,
        );
    }
}

/// `dt / touch_dt`, so touch impulses do not depend on the touch sampling rate
fn frame_rate_scale(touch: &TouchSample, dt: f32) -> f32 {
    dt / (touch.delta_time + TOUCH_DT_EPSILON)
}
