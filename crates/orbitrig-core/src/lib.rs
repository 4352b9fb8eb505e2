//! Orbitrig Core - Engine-agnostic orbit camera rig
//!
//! This crate holds everything that decides where the camera goes:
//! - Rig configuration (TOML loadable, every field defaulted)
//! - Per-frame input snapshot consumed by the rig
//! - The scene query seam used for obstruction and ground checks
//! - The orbit controller itself and the view transition director

pub mod config;
pub mod controller;
pub mod director;
pub mod input;
pub mod math;
pub mod scene;

pub use config::{ConfigError, InputMode, OrbitConfig, Trigger};
pub use controller::{ControlLease, OrbitController, OrbitTarget, RigOutput, RigPose};
pub use director::{DoubleTrigger, ViewPreset, ViewTransitionDirector};
pub use input::{FrameInput, InputBackend, TouchSample};
pub use scene::{RayHit, SceneQuery, TargetId};
