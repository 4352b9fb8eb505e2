//! Orbitrig Scene - Bevy integration for the orbit camera rig
//!
//! This crate wires `orbitrig-core` into a Bevy app: it gathers mouse and
//! touch input, answers the rig's scene queries with mesh ray casts, and runs
//! view changers and the rig in `PostUpdate`, ahead of transform propagation.

pub mod camera;
pub mod director;
pub mod input;
pub mod raycast;
pub mod types;
pub mod ui;

use bevy::prelude::*;
use bevy::transform::TransformSystems;

/// Ordering of the rig systems within `PostUpdate`
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum RigSystems {
    /// Snapshot this frame's input
    Input,
    /// Advance view changers while they hold the rig
    Direct,
    /// Run the orbit controllers and write transforms
    Orbit,
}

/// Plugin that sets up the rig, its input and the view changers
pub struct OrbitRigScenePlugin;

impl Plugin for OrbitRigScenePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            PostUpdate,
            (RigSystems::Input, RigSystems::Direct, RigSystems::Orbit)
                .chain()
                .before(TransformSystems::Propagate),
        )
        .add_plugins(input::RigInputPlugin)
        .add_plugins(director::ViewChangePlugin)
        .add_plugins(camera::CameraPlugin);
    }
}

// Re-export commonly used types
pub use types::*;
pub use director::{RequestViewChange, ViewChanger};
pub use ui::{EguiBlockingPlugin, UiPointerState};
