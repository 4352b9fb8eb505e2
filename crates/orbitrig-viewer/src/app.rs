//! Bevy application setup and the demo scene

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_picking::{prelude::MeshPickingPlugin, DefaultPickingPlugins};
use orbitrig_core::math::rotation_from_euler;
use orbitrig_scene::camera::spawn_orbit_rig;
use orbitrig_scene::{EguiBlockingPlugin, OrbitRigScenePlugin, ViewChanger};

use crate::config::ViewerConfig;
use crate::ui::UiPlugin;

/// Configuration the demo scene is built from
#[derive(Debug, Clone, Resource)]
pub struct ViewerSettings(pub ViewerConfig);

/// Obstacles scattered around the target: (position, size)
const OBSTACLES: [(Vec3, Vec3); 4] = [
    (Vec3::new(3.0, 1.5, -2.0), Vec3::new(1.0, 3.0, 1.0)),
    (Vec3::new(-2.5, 1.0, 3.0), Vec3::new(2.0, 2.0, 0.5)),
    (Vec3::new(0.0, 2.5, -6.0), Vec3::new(4.0, 5.0, 1.0)),
    (Vec3::new(-6.0, 0.75, 0.0), Vec3::new(1.5, 1.5, 1.5)),
];

/// Initial rig orientation as (pitch, yaw, roll) degrees
const START_ROTATION: Vec3 = Vec3::new(20.0, 30.0, 0.0);

pub fn run(config: ViewerConfig) {
    let title = config.viewer.title.clone();

    App::new()
        .insert_resource(ClearColor(Color::srgb(0.1, 0.1, 0.15)))
        .insert_resource(ViewerSettings(config))
        // Logging is installed by main with tracing-subscriber
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title,
                        ..default()
                    }),
                    ..default()
                })
                .disable::<LogPlugin>(),
        )
        // Picking must be added before EguiPlugin so it can detect PickingPlugin
        .add_plugins(DefaultPickingPlugins)
        .add_plugins(MeshPickingPlugin)
        .add_plugins(EguiPlugin::default())
        .add_plugins(EguiBlockingPlugin)
        .add_plugins(OrbitRigScenePlugin)
        .add_plugins(UiPlugin)
        .add_systems(Startup, setup_scene)
        .run();
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<ViewerSettings>,
) {
    let config = &settings.0;

    commands.spawn((
        Name::new("Ground"),
        Mesh3d(meshes.add(Plane3d::default().mesh().size(60.0, 60.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.25, 0.3, 0.25))),
        Transform::default(),
    ));

    let obstacle_material = materials.add(Color::srgb(0.55, 0.5, 0.45));
    for (index, (position, size)) in OBSTACLES.iter().enumerate() {
        commands.spawn((
            Name::new(format!("Obstacle {}", index)),
            Mesh3d(meshes.add(Cuboid::from_size(*size))),
            MeshMaterial3d(obstacle_material.clone()),
            Transform::from_translation(*position),
        ));
    }

    let target_position = config.viewer.target_position;
    let target = commands
        .spawn((
            Name::new("Target"),
            Mesh3d(meshes.add(Sphere::new(0.5))),
            MeshMaterial3d(materials.add(Color::srgb(0.9, 0.45, 0.1))),
            Transform::from_translation(target_position),
        ))
        .id();

    let hotspot_mesh = meshes.add(Cuboid::new(0.6, 0.6, 0.6));
    let hotspot_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.6, 0.95),
        emissive: LinearRgba::rgb(0.05, 0.2, 0.4),
        ..default()
    });
    for view in &config.views {
        let hotspot = commands
            .spawn((
                Name::new(view.name.clone()),
                Mesh3d(hotspot_mesh.clone()),
                MeshMaterial3d(hotspot_material.clone()),
                Transform::from_translation(view.position),
            ))
            .id();
        commands
            .entity(hotspot)
            .insert(ViewChanger::new(hotspot, view.preset.clone()));
    }

    commands.spawn((
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(8.0, 12.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let rotation = rotation_from_euler(START_ROTATION);
    let start = Transform {
        translation: target_position + rotation * Vec3::new(0.0, 0.0, -config.rig.zoom.distance),
        rotation,
        ..default()
    };
    spawn_orbit_rig(&mut commands, config.rig.clone(), target, start);

    info!(views = config.views.len(), "Demo scene ready");
}
