//! Input collection from Bevy resources

use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::input::touch::Touches;
use bevy::prelude::*;
use orbitrig_core::{FrameInput, OrbitConfig, TouchSample, Trigger};

use crate::ui::UiPointerState;
use crate::RigSystems;

/// Pixels of mouse motion to rig axis units
const POINTER_AXIS_SCALE: f32 = 0.1;
/// Wheel lines to rig zoom units
const WHEEL_LINE_SCALE: f32 = 0.1;
/// Wheel pixels (trackpads) to rig zoom units
const WHEEL_PIXEL_SCALE: f32 = 0.005;

/// Input snapshot for the current frame, before trigger bindings are applied
#[derive(Debug, Clone, Default, Resource)]
pub struct RigInput {
    pub pointer_delta: Vec2,
    pub scroll_delta: f32,
    pub primary: bool,
    pub secondary: bool,
    pub middle: bool,
    pub touches: Vec<TouchSample>,
    pub ui_blocked: bool,
}

impl RigInput {
    pub fn held(&self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Primary => self.primary,
            Trigger::Secondary => self.secondary,
            Trigger::Middle => self.middle,
        }
    }

    /// Resolve trigger bindings for one rig
    pub fn for_rig(&self, config: &OrbitConfig) -> FrameInput {
        FrameInput {
            pointer_delta: self.pointer_delta,
            scroll_delta: self.scroll_delta,
            orbit_held: self.held(config.orbit.trigger),
            pan_held: self.held(config.pan.trigger),
            touches: self.touches.clone(),
            ui_blocked: self.ui_blocked,
        }
    }
}

/// Plugin that snapshots input for the rig
pub struct RigInputPlugin;

impl Plugin for RigInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RigInput>()
            .init_resource::<UiPointerState>()
            .add_systems(PostUpdate, gather_rig_input.in_set(RigSystems::Input));
    }
}

fn gather_rig_input(
    mut rig_input: ResMut<RigInput>,
    mouse_button: Option<Res<ButtonInput<MouseButton>>>,
    mouse_motion: Option<Res<AccumulatedMouseMotion>>,
    mouse_scroll: Option<Res<AccumulatedMouseScroll>>,
    touch_input: Option<Res<Touches>>,
    ui_pointer: Res<UiPointerState>,
    time: Res<Time>,
) {
    // Screen space is y-down, the rig expects y-up
    let pointer_delta = mouse_motion
        .map(|motion| Vec2::new(motion.delta.x, -motion.delta.y) * POINTER_AXIS_SCALE)
        .unwrap_or(Vec2::ZERO);

    let scroll_delta = mouse_scroll
        .map(|scroll| match scroll.unit {
            MouseScrollUnit::Line => scroll.delta.y * WHEEL_LINE_SCALE,
            MouseScrollUnit::Pixel => scroll.delta.y * WHEEL_PIXEL_SCALE,
        })
        .unwrap_or(0.0);

    let (primary, secondary, middle) = mouse_button
        .map(|buttons| {
            (
                buttons.pressed(MouseButton::Left),
                buttons.pressed(MouseButton::Right),
                buttons.pressed(MouseButton::Middle),
            )
        })
        .unwrap_or_default();

    // Bevy has no per-touch timing, so every sample spans one frame
    let dt = time.delta_secs();
    let mut touches: Vec<(u64, TouchSample)> = touch_input
        .map(|touches| {
            touches
                .iter()
                .map(|touch| {
                    let position = touch.position();
                    let delta = touch.delta();
                    (
                        touch.id(),
                        TouchSample {
                            position: Vec2::new(position.x, -position.y),
                            delta: Vec2::new(delta.x, -delta.y),
                            delta_time: dt,
                        },
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    touches.sort_by_key(|(id, _)| *id);

    *rig_input = RigInput {
        pointer_delta,
        scroll_delta,
        primary,
        secondary,
        middle,
        touches: touches.into_iter().map(|(_, sample)| sample).collect(),
        ui_blocked: ui_pointer.blocked,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_follow_config() {
        let input = RigInput {
            pointer_delta: Vec2::new(1.0, 2.0),
            secondary: true,
            ..Default::default()
        };

        let mut config = OrbitConfig::default();
        let frame = input.for_rig(&config);
        assert!(frame.orbit_held);
        assert!(!frame.pan_held);
        assert_eq!(frame.pointer_delta, Vec2::new(1.0, 2.0));

        config.orbit.trigger = Trigger::Primary;
        config.pan.trigger = Trigger::Secondary;
        let frame = input.for_rig(&config);
        assert!(!frame.orbit_held);
        assert!(frame.pan_held);
    }
}
