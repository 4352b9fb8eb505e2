//! Camera rig spawning and the per-frame orbit update

use bevy::prelude::*;
use orbitrig_core::{InputMode, OrbitConfig, OrbitController, RigPose};
use std::f32::consts::PI;
use tracing::debug;

use crate::input::RigInput;
use crate::raycast::RigSceneParams;
use crate::types::{target_id, OrbitFocus, OrbitRig, PanCamera};
use crate::RigSystems;

/// Plugin for the orbit update
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PostUpdate, update_orbit_rigs.in_set(RigSystems::Orbit));
    }
}

/// Whether automatic input selection should pick touch on this platform
pub fn is_touch_platform() -> bool {
    cfg!(any(target_os = "android", target_os = "ios"))
}

/// Spawn a rig orbiting `target`, with its pan camera as a child.
///
/// The rig itself faces away from the target (its local -Z points along the
/// orbit radius), so the child camera is turned around to look back at it.
pub fn spawn_orbit_rig(
    commands: &mut Commands,
    config: OrbitConfig,
    target: Entity,
    initial: Transform,
) -> Entity {
    let backend = config.input.mode.resolve(is_touch_platform());
    if config.input.mode == InputMode::Automatic {
        debug!(?backend, "Resolved automatic rig input");
    }

    let controller = OrbitController::new(
        config,
        RigPose {
            position: initial.translation,
            rotation: initial.rotation,
        },
        backend,
    )
    .with_target(target_id(target));

    commands.entity(target).insert(OrbitFocus);
    commands
        .spawn((
            Name::new("Orbit Rig"),
            initial,
            Visibility::default(),
            OrbitRig::new(controller),
        ))
        .with_children(|rig| {
            rig.spawn((
                Name::new("Pan Camera"),
                Camera3d::default(),
                PanCamera,
                Transform::from_rotation(Quat::from_rotation_y(PI)),
            ));
        })
        .id()
}

fn update_orbit_rigs(
    mut rigs: Query<(Entity, &mut OrbitRig, &mut Transform, Option<&Children>), Without<PanCamera>>,
    mut pan_cameras: Query<&mut Transform, (With<PanCamera>, Without<OrbitRig>)>,
    focuses: Query<Entity, With<OrbitFocus>>,
    rig_input: Res<RigInput>,
    time: Res<Time>,
    mut scene: RigSceneParams,
) {
    let dt = time.delta_secs();
    let focus_entities: Vec<Entity> = focuses.iter().collect();

    for (entity, mut rig, mut transform, children) in rigs.iter_mut() {
        let mut rig_parts = vec![entity];
        if let Some(children) = children {
            rig_parts.extend(children.iter());
        }
        let mut ignored = rig_parts.clone();
        ignored.extend(focus_entities.iter().copied());

        let input = rig_input.for_rig(rig.controller.config());
        let output = {
            let mut query = scene.query(&ignored);
            rig.controller.update(&input, &mut query, dt)
        };
        let Some(output) = output else {
            continue;
        };

        transform.translation = output.pose.position;
        transform.rotation = output.pose.rotation;

        for child in rig_parts.iter().skip(1) {
            if let Ok(mut pan_transform) = pan_cameras.get_mut(*child) {
                pan_transform.translation = output.pan_local;
            }
        }
    }
}
