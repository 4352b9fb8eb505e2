//! Per-frame input snapshot consumed by the rig

use crate::config::InputMode;
use bevy_math::Vec2;

/// Concrete input backend, chosen once when the rig is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputBackend {
    Pointer,
    Touch,
}

impl InputMode {
    /// Resolve the configured mode; `touch_platform` drives the automatic choice
    pub fn resolve(self, touch_platform: bool) -> InputBackend {
        match self {
            InputMode::Automatic if touch_platform => InputBackend::Touch,
            InputMode::Automatic => InputBackend::Pointer,
            InputMode::Pointer => InputBackend::Pointer,
            InputMode::Touch => InputBackend::Touch,
        }
    }
}

/// One active touch
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TouchSample {
    /// Screen position this frame (y up)
    pub position: Vec2,
    /// Movement since the previous sample (y up)
    pub delta: Vec2,
    /// Seconds between this sample and the previous one
    pub delta_time: f32,
}

impl TouchSample {
    pub fn previous_position(&self) -> Vec2 {
        self.position - self.delta
    }
}

/// Everything the rig reads from the host in a single frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Pointer movement in axis units (y up)
    pub pointer_delta: Vec2,
    /// Wheel movement; positive zooms in
    pub scroll_delta: f32,
    /// The configured orbit trigger is held
    pub orbit_held: bool,
    /// The configured pan trigger is held
    pub pan_held: bool,
    /// Active touches, ordered by touch id
    pub touches: Vec<TouchSample>,
    /// The pointer is over a UI element
    pub ui_blocked: bool,
}

impl FrameInput {
    /// Input with nothing pressed and nothing moving
    pub fn idle() -> Self {
        Self::default()
    }
}
