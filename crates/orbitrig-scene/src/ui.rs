//! UI occlusion tracking

use bevy::prelude::*;
use bevy_egui::EguiContexts;

/// Whether the pointer is currently over UI
#[derive(Debug, Clone, Copy, Default, Resource)]
pub struct UiPointerState {
    pub blocked: bool,
}

/// Plugin that feeds [`UiPointerState`] from egui.
///
/// Add it after `EguiPlugin`; without it the rig never sees the pointer as blocked.
pub struct EguiBlockingPlugin;

impl Plugin for EguiBlockingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiPointerState>()
            .add_systems(PreUpdate, sample_egui_pointer);
    }
}

fn sample_egui_pointer(mut contexts: EguiContexts, mut state: ResMut<UiPointerState>) {
    let blocked = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);

    if state.blocked != blocked {
        state.blocked = blocked;
    }
}
