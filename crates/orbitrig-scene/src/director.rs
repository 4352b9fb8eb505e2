//! View changer objects: double-click hotspots and scripted view changes

use bevy::input::touch::Touches;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use orbitrig_core::{ViewPreset, ViewTransitionDirector};
use tracing::{info, warn};

use crate::raycast::RigSceneParams;
use crate::types::{target_id, OrbitFocus, OrbitRig, PanCamera};
use crate::ui::UiPointerState;
use crate::RigSystems;

/// An object that refocuses the rig on itself with a preset view.
///
/// Double-clicking (or double-tapping) its mesh starts the view change, as
/// does a [`RequestViewChange`] naming it.
#[derive(Component, Debug)]
#[require(OrbitFocus)]
pub struct ViewChanger {
    pub director: ViewTransitionDirector,
}

impl ViewChanger {
    /// `anchor` is normally the entity this component is inserted on
    pub fn new(anchor: Entity, preset: ViewPreset) -> Self {
        Self {
            director: ViewTransitionDirector::new(target_id(anchor), preset),
        }
    }
}

/// Start the view change of a [`ViewChanger`] from code or UI
#[derive(Message, Debug, Clone, Copy)]
pub struct RequestViewChange {
    pub changer: Entity,
}

/// A pointer release landed on a view changer
#[derive(Message, Debug, Clone, Copy)]
struct ViewChangerReleased {
    changer: Entity,
    at: f64,
}

/// Plugin for view changers
pub struct ViewChangePlugin;

impl Plugin for ViewChangePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<RequestViewChange>()
            .add_message::<ViewChangerReleased>()
            .add_observer(hand_back_on_removal)
            .add_systems(
                PostUpdate,
                (detect_view_changer_releases, drive_view_changes)
                    .chain()
                    .in_set(RigSystems::Direct),
            );
    }
}

fn detect_view_changer_releases(
    mouse_button: Option<Res<ButtonInput<MouseButton>>>,
    touch_input: Option<Res<Touches>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<PanCamera>>,
    changers: Query<(), With<ViewChanger>>,
    parents: Query<&ChildOf>,
    real_time: Res<Time<Real>>,
    mut scene: RigSceneParams,
    mut released: MessageWriter<ViewChangerReleased>,
) {
    let mut release_positions: Vec<Vec2> = Vec::new();

    if mouse_button.is_some_and(|buttons| buttons.just_released(MouseButton::Left)) {
        if let Some(cursor) = windows.single().ok().and_then(Window::cursor_position) {
            release_positions.push(cursor);
        }
    }
    if let Some(touches) = touch_input {
        release_positions.extend(touches.iter_just_released().map(|touch| touch.position()));
    }
    if release_positions.is_empty() {
        return;
    }

    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let now = real_time.elapsed_secs_f64();

    for position in release_positions {
        let Ok(ray) = camera.viewport_to_world(camera_transform, position) else {
            continue;
        };
        let Some((hit, _, _)) = scene.first_hit(ray, &[]) else {
            continue;
        };
        if let Some(changer) = find_changer(hit, &changers, &parents) {
            released.write(ViewChangerReleased { changer, at: now });
        }
    }
}

/// Walk up the hierarchy from a hit mesh to the owning view changer
fn find_changer(
    mut entity: Entity,
    changers: &Query<(), With<ViewChanger>>,
    parents: &Query<&ChildOf>,
) -> Option<Entity> {
    loop {
        if changers.contains(entity) {
            return Some(entity);
        }
        entity = parents.get(entity).ok()?.parent();
    }
}

fn drive_view_changes(
    mut changers: Query<&mut ViewChanger>,
    mut rigs: Query<&mut OrbitRig>,
    mut requests: MessageReader<RequestViewChange>,
    mut released: MessageReader<ViewChangerReleased>,
    ui_pointer: Res<UiPointerState>,
    real_time: Res<Time<Real>>,
    time: Res<Time>,
    mut scene: RigSceneParams,
) {
    let Ok(mut rig) = rigs.single_mut() else {
        requests.clear();
        released.clear();
        return;
    };
    let now = real_time.elapsed_secs_f64();
    let dt = time.delta_secs();
    let mut query = scene.query(&[]);

    for release in released.read() {
        if let Ok(mut changer) = changers.get_mut(release.changer) {
            changer.director.pointer_released(
                release.at,
                ui_pointer.blocked,
                &mut rig.controller,
                &mut query,
            );
        }
    }

    for request in requests.read() {
        match changers.get_mut(request.changer) {
            Ok(mut changer) => {
                changer
                    .director
                    .request_view_change(&mut rig.controller, &mut query);
            }
            Err(_) => warn!(entity = ?request.changer, "View change requested for unknown changer"),
        }
    }

    for mut changer in changers.iter_mut() {
        changer.director.poll_trigger(now);
        changer.director.tick(&mut rig.controller, &mut query, dt);
    }
}

/// A changer removed mid-transition hands the rig back instead of stranding it
fn hand_back_on_removal(
    remove: On<Remove, ViewChanger>,
    mut changers: Query<&mut ViewChanger>,
    mut rigs: Query<&mut OrbitRig>,
) {
    let Ok(mut changer) = changers.get_mut(remove.entity) else {
        return;
    };
    if !changer.director.is_transitioning() {
        return;
    }
    for mut rig in rigs.iter_mut() {
        if changer.director.hand_back(&mut rig.controller) {
            info!(entity = ?remove.entity, "View changer removed mid-transition");
            return;
        }
    }
    warn!(entity = ?remove.entity, "View changer removed but its rig was not found");
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitrig_core::{
        InputBackend, OrbitConfig, OrbitController, OrbitTarget, RayHit, RigPose, SceneQuery,
        TargetId,
    };

    /// Every target sits at the origin and nothing is ever hit
    struct OpenScene;

    impl SceneQuery for OpenScene {
        fn target_position(&mut self, _target: TargetId) -> Option<Vec3> {
            Some(Vec3::ZERO)
        }

        fn linecast(&mut self, _from: Vec3, _to: Vec3) -> Option<RayHit> {
            None
        }

        fn raycast(&mut self, _origin: Vec3, _direction: Vec3) -> Option<RayHit> {
            None
        }
    }

    #[test]
    fn test_despawned_changer_hands_rig_back() {
        let mut world = World::new();
        world.add_observer(hand_back_on_removal);

        let target = world.spawn_empty().id();
        let hotspot = world.spawn_empty().id();
        let mut controller = OrbitController::new(
            OrbitConfig::default(),
            RigPose::default(),
            InputBackend::Pointer,
        )
        .with_target(target_id(target));

        let mut changer = ViewChanger::new(hotspot, ViewPreset::default());
        assert!(changer
            .director
            .request_view_change(&mut controller, &mut OpenScene));
        changer.director.tick(&mut controller, &mut OpenScene, 1.0 / 60.0);
        assert!(!controller.is_active());

        let rig = world.spawn(OrbitRig::new(controller)).id();
        world.entity_mut(hotspot).insert(changer);
        world.despawn(hotspot);

        let controller = &world.get::<OrbitRig>(rig).unwrap().controller;
        assert!(controller.is_active());
        assert!(matches!(
            controller.target(),
            Some(OrbitTarget::Transient(_))
        ));
    }

    #[test]
    fn test_idle_changer_removal_leaves_rig_alone() {
        let mut world = World::new();
        world.add_observer(hand_back_on_removal);

        let target = world.spawn_empty().id();
        let controller = OrbitController::new(
            OrbitConfig::default(),
            RigPose::default(),
            InputBackend::Pointer,
        )
        .with_target(target_id(target));
        let rig = world.spawn(OrbitRig::new(controller)).id();

        let hotspot = world.spawn_empty().id();
        world
            .entity_mut(hotspot)
            .insert(ViewChanger::new(hotspot, ViewPreset::default()));
        world.entity_mut(hotspot).remove::<ViewChanger>();

        let rig = world.get::<OrbitRig>(rig).unwrap();
        assert!(rig.controller.is_active());
        assert_eq!(rig.target_entity(), Some(target));
    }
}
