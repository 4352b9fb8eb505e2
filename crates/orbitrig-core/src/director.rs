//! View transition director
//!
//! Takes the rig away from the user for a fixed time, eases it toward a
//! preset orientation/distance/pan around an anchor object, then hands it
//! back. Transitions cannot be cancelled once started, and a request made
//! while any transition is running is dropped.

use crate::controller::{ControlLease, OrbitController, OrbitTarget};
use crate::math::{euler_from_rotation, lerp, lerp_vec3, rotation_from_euler};
use crate::scene::{SceneQuery, TargetId};
use bevy_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Maximum gap between two pointer releases that counts as a double trigger
pub const DOUBLE_TRIGGER_WINDOW: f64 = 0.2;

/// Where a view change takes the rig
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewPreset {
    /// Target `(pitch, yaw, roll)` in degrees; roll is always flattened to zero
    #[serde(default)]
    pub rotation: Vec3,
    /// Target zoom distance
    #[serde(default = "default_preset_distance")]
    pub distance: f32,
    /// Target pan camera offset
    #[serde(default)]
    pub pan: Vec2,
    /// Per-frame easing is `moving_speed / 10`
    #[serde(default = "default_moving_speed")]
    pub moving_speed: f32,
    /// Seconds before control is handed back
    #[serde(default = "default_duration")]
    pub duration: f32,
}

impl Default for ViewPreset {
    fn default() -> Self {
        Self {
            rotation: Vec3::ZERO,
            distance: default_preset_distance(),
            pan: Vec2::ZERO,
            moving_speed: default_moving_speed(),
            duration: default_duration(),
        }
    }
}

fn default_preset_distance() -> f32 {
    5.0
}

fn default_moving_speed() -> f32 {
    1.0
}

fn default_duration() -> f32 {
    1.2
}

impl ViewPreset {
    fn step_factor(&self) -> f32 {
        (self.moving_speed / 10.0).clamp(0.0, 1.0)
    }
}

/// Double-trigger detector state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerState {
    Idle,
    /// A first release happened at `at` seconds
    Armed { at: f64 },
}

/// Detects two pointer releases within a short window
#[derive(Debug, Clone)]
pub struct DoubleTrigger {
    window: f64,
    state: TriggerState,
}

impl Default for DoubleTrigger {
    fn default() -> Self {
        Self::new(DOUBLE_TRIGGER_WINDOW)
    }
}

impl DoubleTrigger {
    pub fn new(window: f64) -> Self {
        Self {
            window,
            state: TriggerState::Idle,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Drop an armed first release once the window has passed
    pub fn poll(&mut self, now: f64) {
        if let TriggerState::Armed { at } = self.state {
            if now - at >= self.window {
                self.state = TriggerState::Idle;
            }
        }
    }

    /// Record a release; returns true when it completes a double trigger
    pub fn register_release(&mut self, now: f64) -> bool {
        match self.state {
            TriggerState::Armed { at } if now - at < self.window => {
                self.state = TriggerState::Idle;
                true
            }
            _ => {
                self.state = TriggerState::Armed { at: now };
                false
            }
        }
    }
}

/// In-flight transition
#[derive(Debug)]
struct Transition {
    lease: ControlLease,
    /// Synthetic focus point the rig orbits while moving
    focus: Vec3,
    elapsed: f32,
}

/// Drives one preset view change for an anchor object
#[derive(Debug)]
pub struct ViewTransitionDirector {
    anchor: TargetId,
    preset: ViewPreset,
    trigger: DoubleTrigger,
    transition: Option<Transition>,
}

impl ViewTransitionDirector {
    /// `anchor` becomes the rig's target once the transition completes
    pub fn new(anchor: TargetId, preset: ViewPreset) -> Self {
        Self {
            anchor,
            preset,
            trigger: DoubleTrigger::default(),
            transition: None,
        }
    }

    pub fn anchor(&self) -> TargetId {
        self.anchor
    }

    pub fn preset(&self) -> &ViewPreset {
        &self.preset
    }

    pub fn trigger(&self) -> &DoubleTrigger {
        &self.trigger
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Fraction of the transition elapsed, `None` when idle
    pub fn progress(&self) -> Option<f32> {
        self.transition.as_ref().map(|transition| {
            if self.preset.duration > 0.0 {
                (transition.elapsed / self.preset.duration).min(1.0)
            } else {
                1.0
            }
        })
    }

    /// Feed a pointer release on the anchor object; starts a view change on a double trigger
    pub fn pointer_released<S: SceneQuery + ?Sized>(
        &mut self,
        now: f64,
        ui_blocked: bool,
        controller: &mut OrbitController,
        scene: &mut S,
    ) -> bool {
        if !self.trigger.register_release(now) {
            return false;
        }
        if controller.config().misc.ui_blocks_interaction && ui_blocked {
            debug!(anchor = self.anchor.0, "View change trigger blocked by UI");
            return false;
        }
        self.request_view_change(controller, scene)
    }

    /// Expire a pending first release
    pub fn poll_trigger(&mut self, now: f64) {
        self.trigger.poll(now);
    }

    /// Start a transition; returns false if it could not start
    pub fn request_view_change<S: SceneQuery + ?Sized>(
        &mut self,
        controller: &mut OrbitController,
        scene: &mut S,
    ) -> bool {
        if self.transition.is_some() {
            debug!(anchor = self.anchor.0, "View change already running, request dropped");
            return false;
        }
        let Some(start) = controller.resolve_target(scene) else {
            debug!(anchor = self.anchor.0, "Rig has no resolvable target, view change not started");
            return false;
        };
        if scene.target_position(self.anchor).is_none() {
            debug!(anchor = self.anchor.0, "View change anchor missing, view change not started");
            return false;
        }
        let Some(lease) = controller.suspend() else {
            debug!(anchor = self.anchor.0, "Rig already driven by another view change, request dropped");
            return false;
        };

        controller.lease_set_target(&lease, Some(OrbitTarget::Transient(start)));
        info!(
            anchor = self.anchor.0,
            distance = self.preset.distance,
            duration = self.preset.duration,
            "View change started"
        );
        self.transition = Some(Transition {
            lease,
            focus: start,
            elapsed: 0.0,
        });
        true
    }

    /// Advance a running transition by one frame; call before the controller's update
    pub fn tick<S: SceneQuery + ?Sized>(
        &mut self,
        controller: &mut OrbitController,
        scene: &mut S,
        dt: f32,
    ) {
        let Some(transition) = self.transition.as_mut() else {
            return;
        };
        let t = self.preset.step_factor();

        if let Some(anchor) = scene.target_position(self.anchor) {
            transition.focus = lerp_vec3(transition.focus, anchor, t);
        }
        controller.lease_set_target(
            &transition.lease,
            Some(OrbitTarget::Transient(transition.focus)),
        );

        let goal = rotation_from_euler(self.preset.rotation);
        let eased = controller.pose().rotation.lerp(goal, t);
        let angles = euler_from_rotation(eased);
        controller.lease_set_rotation(
            &transition.lease,
            rotation_from_euler(Vec3::new(angles.x, angles.y, 0.0)),
        );

        let distance = lerp(controller.distance(), self.preset.distance, t);
        controller.lease_set_distance(&transition.lease, distance);

        let pan = lerp_vec3(controller.pan_local(), self.preset.pan.extend(0.0), t);
        controller.lease_set_pan_local(&transition.lease, pan);

        transition.elapsed += dt;
        if transition.elapsed >= self.preset.duration {
            self.finish(controller);
        }
    }

    /// Give the rig back before the transition completes.
    ///
    /// For a director that is going away mid-transition: the rig keeps orbiting
    /// the focus point it was moving through and keeps its current pan. Returns
    /// false when no transition was running.
    pub fn hand_back(&mut self, controller: &mut OrbitController) -> bool {
        let Some(transition) = self.transition.take() else {
            return false;
        };
        controller.lease_set_target(
            &transition.lease,
            Some(OrbitTarget::Transient(transition.focus)),
        );
        let pan = controller.pan_local().truncate();
        match controller.resume(transition.lease, pan) {
            Ok(()) => {
                info!(
                    anchor = self.anchor.0,
                    elapsed = transition.elapsed,
                    "View change abandoned, rig handed back"
                );
                true
            }
            Err(lease) => {
                self.transition = Some(Transition { lease, ..transition });
                false
            }
        }
    }

    fn finish(&mut self, controller: &mut OrbitController) {
        let Some(transition) = self.transition.take() else {
            return;
        };
        controller.lease_set_target(&transition.lease, Some(OrbitTarget::Tracked(self.anchor)));
        if let Err(lease) = controller.resume(transition.lease, self.preset.pan) {
            warn!(anchor = self.anchor.0, "View change ticked against a rig it does not hold");
            self.transition = Some(Transition { lease, ..transition });
            return;
        }
        info!(
            anchor = self.anchor.0,
            elapsed = transition.elapsed,
            "View change finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OrbitConfig;
    use crate::controller::RigPose;
    use crate::input::{FrameInput, InputBackend};
    use crate::scene::testing::ScriptedScene;

    const DT: f32 = 1.0 / 60.0;
    const TARGET: TargetId = TargetId(1);

    fn rig() -> OrbitController {
        OrbitController::new(OrbitConfig::default(), RigPose::default(), InputBackend::Pointer)
            .with_target(TARGET)
    }

    fn preset() -> ViewPreset {
        ViewPreset {
            rotation: Vec3::new(30.0, 45.0, 0.0),
            distance: 10.0,
            ..ViewPreset::default()
        }
    }

    fn frame(
        director: &mut ViewTransitionDirector,
        controller: &mut OrbitController,
        scene: &mut ScriptedScene,
    ) {
        director.tick(controller, scene, DT);
        controller.update(&FrameInput::idle(), scene, DT);
    }

    #[test]
    fn test_view_change_reaches_preset() {
        let mut controller = rig();
        let mut scene = ScriptedScene::with_target(TARGET, Vec3::ZERO);
        let mut director = ViewTransitionDirector::new(TARGET, preset());
        controller.update(&FrameInput::idle(), &mut scene, DT);

        assert!(director.request_view_change(&mut controller, &mut scene));
        assert!(!controller.is_active());

        let mut frames = 0;
        while director.is_transitioning() && frames < 200 {
            frame(&mut director, &mut controller, &mut scene);
            frames += 1;
        }

        assert!((72..=73).contains(&frames), "took {frames} frames");
        assert!(controller.is_active());
        assert!((controller.distance() - 10.0).abs() < 0.01);
        assert_eq!(controller.target(), Some(OrbitTarget::Tracked(TARGET)));

        controller.update(&FrameInput::idle(), &mut scene, DT);
        let angles = euler_from_rotation(controller.rotation());
        assert!((angles.x - 30.0).abs() < 0.1, "pitch {}", angles.x);
        assert!((angles.y - 45.0).abs() < 0.1, "yaw {}", angles.y);
        assert!(angles.z.abs() < 0.1);
        assert!((controller.pitch() - angles.x).abs() < 1e-3);
        assert!((controller.yaw() - angles.y).abs() < 1e-3);
    }

    #[test]
    fn test_second_request_mid_transition_is_dropped() {
        let mut controller = rig();
        let mut scene = ScriptedScene::with_target(TARGET, Vec3::ZERO);
        let mut director = ViewTransitionDirector::new(TARGET, preset());

        assert!(director.request_view_change(&mut controller, &mut scene));
        for _ in 0..10 {
            frame(&mut director, &mut controller, &mut scene);
        }

        let progress = director.progress();
        let distance = controller.distance();
        let target = controller.target();
        assert!(!director.request_view_change(&mut controller, &mut scene));
        assert_eq!(director.progress(), progress);
        assert_eq!(controller.distance(), distance);
        assert_eq!(controller.target(), target);

        // A different director is blocked by the same running transition
        let mut other = ViewTransitionDirector::new(TARGET, ViewPreset::default());
        assert!(!other.request_view_change(&mut controller, &mut scene));
        assert!(!other.is_transitioning());
    }

    #[test]
    fn test_transient_focus_moves_to_anchor() {
        let anchor = TargetId(2);
        let mut controller = rig();
        let mut scene = ScriptedScene::with_target(TARGET, Vec3::ZERO);
        scene.targets.insert(anchor, Vec3::new(10.0, 0.0, 0.0));
        let mut director = ViewTransitionDirector::new(anchor, preset());

        assert!(director.request_view_change(&mut controller, &mut scene));
        assert_eq!(
            controller.target(),
            Some(OrbitTarget::Transient(Vec3::ZERO))
        );

        frame(&mut director, &mut controller, &mut scene);
        match controller.target() {
            Some(OrbitTarget::Transient(focus)) => assert!((focus.x - 1.0).abs() < 1e-5),
            other => panic!("unexpected target {other:?}"),
        }

        while director.is_transitioning() {
            frame(&mut director, &mut controller, &mut scene);
        }
        assert_eq!(controller.target(), Some(OrbitTarget::Tracked(anchor)));
    }

    #[test]
    fn test_pan_handed_back_without_snap() {
        let mut config = OrbitConfig::default();
        config.pan.enabled = true;
        let mut controller = OrbitController::new(config, RigPose::default(), InputBackend::Pointer)
            .with_target(TARGET);
        let mut scene = ScriptedScene::with_target(TARGET, Vec3::ZERO);
        let mut director = ViewTransitionDirector::new(
            TARGET,
            ViewPreset {
                pan: Vec2::new(0.5, -0.25),
                ..preset()
            },
        );

        assert!(director.request_view_change(&mut controller, &mut scene));
        while director.is_transitioning() {
            frame(&mut director, &mut controller, &mut scene);
        }
        let handed_back = controller.pan_local();
        controller.update(&FrameInput::idle(), &mut scene, DT);

        assert!((controller.pan_offset().x - 0.5).abs() < 1e-4);
        assert!((controller.pan_offset().y + 0.25).abs() < 1e-4);
        assert!(controller.pan_local().distance(handed_back) < 1e-2);
    }

    #[test]
    fn test_request_without_target_does_not_start() {
        let mut controller =
            OrbitController::new(OrbitConfig::default(), RigPose::default(), InputBackend::Pointer);
        let mut scene = ScriptedScene::with_target(TARGET, Vec3::ZERO);
        let mut director = ViewTransitionDirector::new(TARGET, preset());

        assert!(!director.request_view_change(&mut controller, &mut scene));
        assert!(controller.is_active());
        assert!(!director.is_transitioning());

        let mut controller = rig();
        let mut director = ViewTransitionDirector::new(TargetId(7), preset());
        assert!(!director.request_view_change(&mut controller, &mut scene));
        assert!(controller.is_active());
    }

    #[test]
    fn test_double_trigger_state_machine() {
        let mut trigger = DoubleTrigger::default();
        assert!(!trigger.register_release(1.0));
        assert_eq!(trigger.state(), TriggerState::Armed { at: 1.0 });
        assert!(trigger.register_release(1.1));
        assert_eq!(trigger.state(), TriggerState::Idle);

        assert!(!trigger.register_release(2.0));
        assert!(!trigger.register_release(2.5));
        assert_eq!(trigger.state(), TriggerState::Armed { at: 2.5 });

        trigger.poll(2.6);
        assert_eq!(trigger.state(), TriggerState::Armed { at: 2.5 });
        trigger.poll(2.8);
        assert_eq!(trigger.state(), TriggerState::Idle);
    }

    #[test]
    fn test_double_release_starts_view_change() {
        let mut controller = rig();
        let mut scene = ScriptedScene::with_target(TARGET, Vec3::ZERO);
        let mut director = ViewTransitionDirector::new(TARGET, preset());

        assert!(!director.pointer_released(0.0, false, &mut controller, &mut scene));
        assert!(director.pointer_released(0.15, false, &mut controller, &mut scene));
        assert!(director.is_transitioning());
    }

    #[test]
    fn test_double_release_honours_ui_blocking() {
        let mut config = OrbitConfig::default();
        config.misc.ui_blocks_interaction = true;
        let mut controller = OrbitController::new(config, RigPose::default(), InputBackend::Pointer)
            .with_target(TARGET);
        let mut scene = ScriptedScene::with_target(TARGET, Vec3::ZERO);
        let mut director = ViewTransitionDirector::new(TARGET, preset());

        assert!(!director.pointer_released(0.0, true, &mut controller, &mut scene));
        assert!(!director.pointer_released(0.1, true, &mut controller, &mut scene));
        assert!(!director.is_transitioning());
        assert!(controller.is_active());
    }

    #[test]
    fn test_hand_back_mid_transition_restores_control() {
        let anchor = TargetId(2);
        let mut controller = rig();
        let mut scene = ScriptedScene::with_target(TARGET, Vec3::ZERO);
        scene.targets.insert(anchor, Vec3::new(10.0, 0.0, 0.0));
        let mut director = ViewTransitionDirector::new(anchor, preset());

        assert!(director.request_view_change(&mut controller, &mut scene));
        frame(&mut director, &mut controller, &mut scene);
        let rotation = controller.rotation();

        assert!(director.hand_back(&mut controller));
        assert!(!director.is_transitioning());
        assert!(!director.hand_back(&mut controller));

        assert!(controller.is_active());
        match controller.target() {
            Some(OrbitTarget::Transient(focus)) => assert!((focus.x - 1.0).abs() < 1e-5),
            other => panic!("unexpected target {other:?}"),
        }
        // No jump back to the pre-transition orientation
        controller.update(&FrameInput::idle(), &mut scene, DT);
        assert!(controller.rotation().angle_between(rotation) < 1e-4);

        let drag = FrameInput {
            pointer_delta: Vec2::new(1.0, 0.0),
            orbit_held: true,
            ..FrameInput::idle()
        };
        let yaw = controller.yaw();
        for _ in 0..10 {
            controller.update(&drag, &mut scene, DT);
        }
        assert!(controller.yaw() > yaw);

        let mut next = ViewTransitionDirector::new(TARGET, ViewPreset::default());
        assert!(next.request_view_change(&mut controller, &mut scene));
    }

    #[test]
    fn test_transition_ignores_foreign_rig() {
        let mut controller = rig();
        let mut stranger = rig();
        let mut scene = ScriptedScene::with_target(TARGET, Vec3::ZERO);
        let mut director = ViewTransitionDirector::new(TARGET, preset());

        assert!(director.request_view_change(&mut controller, &mut scene));
        for _ in 0..100 {
            director.tick(&mut stranger, &mut scene, DT);
        }
        assert!(stranger.is_active());
        assert_eq!(stranger.distance(), 5.0);
        assert!(director.is_transitioning());

        director.tick(&mut controller, &mut scene, DT);
        assert!(!director.is_transitioning());
        assert!(controller.is_active());
    }
}
