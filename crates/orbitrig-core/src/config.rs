//! Rig configuration loading and validation

use bevy_math::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read rig config: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse rig config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize rig config: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("Invalid rig config: {0}")]
    Invalid(String),
}

/// Input that starts an orbit or pan drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Left mouse button, or a single finger on touch screens
    Primary,
    /// Right mouse button
    Secondary,
    /// Middle mouse button
    Middle,
}

/// Which input backend the rig reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Pick pointer or touch from the platform
    #[default]
    Automatic,
    Pointer,
    Touch,
}

impl std::str::FromStr for InputMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "automatic" | "auto" => Ok(Self::Automatic),
            "pointer" | "mouse" => Ok(Self::Pointer),
            "touch" => Ok(Self::Touch),
            other => Err(ConfigError::Invalid(format!("unknown input mode '{}'", other))),
        }
    }
}

/// Main rig configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrbitConfig {
    #[serde(default)]
    pub orbit: OrbitSettings,
    #[serde(default)]
    pub zoom: ZoomSettings,
    #[serde(default)]
    pub pan: PanSettings,
    #[serde(default)]
    pub avoidance: AvoidanceSettings,
    #[serde(default)]
    pub misc: MiscSettings,
    #[serde(default)]
    pub input: InputSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrbitSettings {
    /// Disable for a pan-only camera
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_orbit_trigger")]
    pub trigger: Trigger,
    /// Horizontal orbit speed
    #[serde(default = "default_orbit_speed")]
    pub x_speed: f32,
    /// Vertical orbit speed
    #[serde(default = "default_orbit_speed")]
    pub y_speed: f32,
    /// Ignore horizontal input (only pitch changes)
    #[serde(default)]
    pub lock_x_axis: bool,
    /// Ignore vertical input (only yaw changes)
    #[serde(default)]
    pub lock_y_axis: bool,
    /// Yaw limits in degrees; `[0, 0]` means unlimited
    #[serde(default = "default_yaw_limits")]
    pub yaw_limits: Vec2,
    /// Pitch limits in degrees; `[0, 0]` means unlimited
    #[serde(default = "default_pitch_limits")]
    pub pitch_limits: Vec2,
    /// Smoothing rate shared by velocity decay, zoom and pan easing
    #[serde(default = "default_smooth_time")]
    pub smooth_time: f32,
    /// Idle auto-rotation
    #[serde(default)]
    pub automatic: bool,
    /// Auto-rotation speed; negative values orbit the other way
    #[serde(default = "default_automatic_speed")]
    pub automatic_speed: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            trigger: default_orbit_trigger(),
            x_speed: default_orbit_speed(),
            y_speed: default_orbit_speed(),
            lock_x_axis: false,
            lock_y_axis: false,
            yaw_limits: default_yaw_limits(),
            pitch_limits: default_pitch_limits(),
            smooth_time: default_smooth_time(),
            automatic: false,
            automatic_speed: default_automatic_speed(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_orbit_trigger() -> Trigger {
    Trigger::Secondary
}

fn default_orbit_speed() -> f32 {
    10.0
}

fn default_yaw_limits() -> Vec2 {
    Vec2::new(-360.0, 360.0)
}

fn default_pitch_limits() -> Vec2 {
    Vec2::new(-20.0, 80.0)
}

fn default_smooth_time() -> f32 {
    2.0
}

fn default_automatic_speed() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoomSettings {
    /// Mouse wheel on desktop, two-finger pinch on touch
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_zoom_speed")]
    pub speed: f32,
    /// Starting distance to the target
    #[serde(default = "default_distance")]
    pub distance: f32,
    #[serde(default = "default_distance_min")]
    pub distance_min: f32,
    #[serde(default = "default_distance_max")]
    pub distance_max: f32,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: default_zoom_speed(),
            distance: default_distance(),
            distance_min: default_distance_min(),
            distance_max: default_distance_max(),
        }
    }
}

fn default_zoom_speed() -> f32 {
    1.0
}

fn default_distance() -> f32 {
    5.0
}

fn default_distance_min() -> f32 {
    3.0
}

fn default_distance_max() -> f32 {
    15.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanSettings {
    /// Panning moves the child pan camera, not the orbit center
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_pan_trigger")]
    pub trigger: Trigger,
    #[serde(default = "default_pan_speed")]
    pub speed: f32,
    /// Clamp the pan camera to the rectangle below
    #[serde(default)]
    pub limit: bool,
    /// Horizontal bounds `[left, right]` in local units
    #[serde(default)]
    pub limits_left_right: Vec2,
    /// Vertical bounds `[down, up]` in local units
    #[serde(default)]
    pub limits_up_down: Vec2,
}

impl Default for PanSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            trigger: default_pan_trigger(),
            speed: default_pan_speed(),
            limit: false,
            limits_left_right: Vec2::ZERO,
            limits_up_down: Vec2::ZERO,
        }
    }
}

fn default_pan_trigger() -> Trigger {
    Trigger::Middle
}

fn default_pan_speed() -> f32 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvoidanceSettings {
    /// Pull the camera in front of geometry between it and the target
    #[serde(default)]
    pub obstructions: bool,
    /// Keep the camera above detected ground
    #[serde(default = "default_true")]
    pub ground_hover: bool,
    /// Minimum clearance above the ground
    #[serde(default = "default_ground_hover_distance")]
    pub ground_hover_distance: f32,
}

impl Default for AvoidanceSettings {
    fn default() -> Self {
        Self {
            obstructions: false,
            ground_hover: true,
            ground_hover_distance: default_ground_hover_distance(),
        }
    }
}

fn default_ground_hover_distance() -> f32 {
    5.0
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MiscSettings {
    /// Offset added to the camera position (useful for off-center pivots)
    #[serde(default)]
    pub x_offset: f32,
    #[serde(default)]
    pub y_offset: f32,
    /// Ignore rig input while the pointer is over UI
    #[serde(default)]
    pub ui_blocks_interaction: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputSettings {
    #[serde(default)]
    pub mode: InputMode,
}

impl OrbitConfig {
    /// Parse from a TOML string and validate
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values the per-frame update cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("orbit.x_speed", self.orbit.x_speed),
            ("orbit.y_speed", self.orbit.y_speed),
            ("orbit.smooth_time", self.orbit.smooth_time),
            ("orbit.automatic_speed", self.orbit.automatic_speed),
            ("zoom.speed", self.zoom.speed),
            ("zoom.distance", self.zoom.distance),
            ("zoom.distance_min", self.zoom.distance_min),
            ("zoom.distance_max", self.zoom.distance_max),
            ("pan.speed", self.pan.speed),
            ("avoidance.ground_hover_distance", self.avoidance.ground_hover_distance),
            ("misc.x_offset", self.misc.x_offset),
            ("misc.y_offset", self.misc.y_offset),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(format!("{name} must be finite")));
            }
        }

        if self.zoom.distance_min > self.zoom.distance_max {
            return Err(ConfigError::Invalid(format!(
                "zoom.distance_min ({}) exceeds zoom.distance_max ({})",
                self.zoom.distance_min, self.zoom.distance_max
            )));
        }
        if self.orbit.smooth_time < 0.0 {
            return Err(ConfigError::Invalid(
                "orbit.smooth_time must not be negative".to_string(),
            ));
        }
        if self.avoidance.ground_hover_distance < 0.0 {
            return Err(ConfigError::Invalid(
                "avoidance.ground_hover_distance must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from file, falling back to defaults when it does not exist
pub fn load_config(path: &Path) -> Result<OrbitConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config = OrbitConfig::from_toml(&content)?;
        info!(path = %path.display(), "Loaded rig configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Rig configuration not found, using defaults"
        );
        Ok(OrbitConfig::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = OrbitConfig::default().to_toml()?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[orbit]
x_speed = 4.0
pitch_limits = [0.0, 0.0]

[pan]
enabled = true
trigger = "primary"

[input]
mode = "touch"
"#;

        let config = OrbitConfig::from_toml(toml).unwrap();
        assert_eq!(config.orbit.x_speed, 4.0);
        assert_eq!(config.orbit.y_speed, 10.0);
        assert_eq!(config.orbit.pitch_limits, Vec2::ZERO);
        assert_eq!(config.orbit.trigger, Trigger::Secondary);
        assert!(config.pan.enabled);
        assert_eq!(config.pan.trigger, Trigger::Primary);
        assert_eq!(config.input.mode, InputMode::Touch);
        assert_eq!(config.zoom.distance, 5.0);
        assert!(config.avoidance.ground_hover);
    }

    #[test]
    fn test_inverted_distance_range_rejected() {
        let toml = r#"
[zoom]
distance_min = 20.0
distance_max = 10.0
"#;

        let err = OrbitConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_negative_smoothing_rejected() {
        let mut config = OrbitConfig::default();
        config.orbit.smooth_time = -1.0;
        assert!(config.validate().is_err());

        config.orbit.smooth_time = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.zoom.distance_max, 15.0);
    }

    #[test]
    fn test_saved_defaults_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rig.toml");
        save_default_config(&path).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.orbit.pitch_limits, Vec2::new(-20.0, 80.0));
        assert_eq!(config.pan.trigger, Trigger::Middle);
        assert_eq!(config.input.mode, InputMode::Automatic);
    }

    #[test]
    fn test_input_mode_from_str() {
        assert_eq!("touch".parse::<InputMode>().unwrap(), InputMode::Touch);
        assert_eq!("Mouse".parse::<InputMode>().unwrap(), InputMode::Pointer);
        assert!("gamepad".parse::<InputMode>().is_err());
    }
}
