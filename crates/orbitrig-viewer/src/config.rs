//! Viewer configuration

use anyhow::{Context, Result};
use bevy::math::Vec3;
use orbitrig_core::{OrbitConfig, ViewPreset};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Viewer configuration: the rig settings plus the demo scene's view hotspots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub viewer: WindowSettings,
    #[serde(flatten)]
    pub rig: OrbitConfig,
    #[serde(default = "default_views", rename = "view")]
    pub views: Vec<ViewConfig>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            viewer: WindowSettings::default(),
            rig: OrbitConfig::default(),
            views: default_views(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowSettings {
    #[serde(default = "default_title")]
    pub title: String,
    /// Where the orbit target sphere sits
    #[serde(default = "default_target_position")]
    pub target_position: Vec3,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            target_position: default_target_position(),
        }
    }
}

fn default_title() -> String {
    "Orbitrig Viewer".to_string()
}

fn default_target_position() -> Vec3 {
    Vec3::new(0.0, 1.0, 0.0)
}

/// A clickable hotspot and the view it switches to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    pub name: String,
    pub position: Vec3,
    #[serde(flatten)]
    pub preset: ViewPreset,
}

fn default_views() -> Vec<ViewConfig> {
    vec![
        ViewConfig {
            name: "Tower".to_string(),
            position: Vec3::new(6.0, 0.5, 4.0),
            preset: ViewPreset {
                rotation: Vec3::new(30.0, 45.0, 0.0),
                distance: 10.0,
                ..Default::default()
            },
        },
        ViewConfig {
            name: "Crate".to_string(),
            position: Vec3::new(-5.0, 0.5, -3.0),
            preset: ViewPreset {
                rotation: Vec3::new(15.0, -120.0, 0.0),
                distance: 4.0,
                moving_speed: 2.0,
                duration: 0.8,
                ..Default::default()
            },
        },
    ]
}

impl ViewerConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.rig.validate()?;
        Ok(config)
    }
}

/// Load configuration from file, falling back to defaults when it does not exist
pub fn load_config(path: &Path) -> Result<ViewerConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = ViewerConfig::from_toml(&content)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        info!(path = %path.display(), views = config.views.len(), "Loaded configuration");
        Ok(config)
    } else {
        info!(path = %path.display(), "Configuration not found, using defaults");
        Ok(ViewerConfig::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(&ViewerConfig::default())?;
    std::fs::write(path, content)?;
    info!(path = %path.display(), "Wrote default configuration");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitrig_core::Trigger;

    #[test]
    fn test_views_and_rig_sections_parse() {
        let toml = r#"
[orbit]
trigger = "primary"

[zoom]
distance_max = 20.0

[[view]]
name = "Gate"
position = [1.0, 0.0, 2.0]
rotation = [10.0, 90.0, 0.0]
distance = 8.0
"#;

        let config = ViewerConfig::from_toml(toml).unwrap();
        assert_eq!(config.rig.orbit.trigger, Trigger::Primary);
        assert_eq!(config.rig.zoom.distance_max, 20.0);
        assert_eq!(config.views.len(), 1);
        assert_eq!(config.views[0].name, "Gate");
        assert_eq!(config.views[0].preset.distance, 8.0);
        assert_eq!(config.views[0].preset.duration, 1.2);
        assert_eq!(config.viewer.title, "Orbitrig Viewer");
    }

    #[test]
    fn test_missing_views_use_demo_hotspots() {
        let config = ViewerConfig::from_toml("").unwrap();
        assert_eq!(config.views.len(), 2);
    }

    #[test]
    fn test_invalid_rig_rejected() {
        let toml = r#"
[zoom]
distance_min = 10.0
distance_max = 2.0
"#;
        assert!(ViewerConfig::from_toml(toml).is_err());
    }
}
