//! Rig state overlay using bevy_egui

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use orbitrig_scene::{OrbitRig, RequestViewChange, ViewChanger};

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // Runs in EguiPrimaryContextPass for proper input handling (bevy_egui 0.38+)
        app.add_systems(EguiPrimaryContextPass, rig_overlay);
    }
}

fn rig_overlay(
    mut contexts: EguiContexts,
    rigs: Query<&OrbitRig>,
    changers: Query<(Entity, &Name, &ViewChanger)>,
    mut requests: MessageWriter<RequestViewChange>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };
    let Ok(rig) = rigs.single() else {
        return;
    };
    let controller = &rig.controller;

    egui::Window::new("Orbit Rig")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            egui::Grid::new("rig_state")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui| {
                    ui.label("Control");
                    ui.label(if controller.is_active() {
                        "user"
                    } else {
                        "view change"
                    });
                    ui.end_row();

                    ui.label("Yaw / pitch");
                    ui.label(format!("{:.1}° / {:.1}°", controller.yaw(), controller.pitch()));
                    ui.end_row();

                    let limits = controller.pitch_limits();
                    ui.label("Pitch limits");
                    ui.label(format!("{:.1}° .. {:.1}°", limits.x, limits.y));
                    ui.end_row();

                    ui.label("Distance");
                    ui.label(format!(
                        "{:.2} (smoothed {:.2})",
                        controller.distance(),
                        controller.smoothed_distance()
                    ));
                    ui.end_row();

                    let velocity = controller.velocity();
                    ui.label("Velocity");
                    ui.label(format!("{:.2}, {:.2}", velocity.x, velocity.y));
                    ui.end_row();

                    let pan = controller.pan_local();
                    ui.label("Pan");
                    ui.label(format!("{:.2}, {:.2}", pan.x, pan.y));
                    ui.end_row();
                });

            ui.separator();
            ui.label("Views");
            for (entity, name, changer) in changers.iter() {
                let label = match changer.director.progress() {
                    Some(progress) => format!("{} ({:.0}%)", name.as_str(), progress * 100.0),
                    None => name.as_str().to_string(),
                };
                let button = ui.add_enabled(controller.is_active(), egui::Button::new(label));
                if button.clicked() {
                    requests.write(RequestViewChange { changer: entity });
                }
            }
            ui.small("Double-click a blue marker to change view");
        });
}
