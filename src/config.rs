//! Demo configuration.
//!
//! Loaded from `config/wonderland.json`; a file with the defaults is written
//! when none exists. Every section is optional in the file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/wonderland.json";

/// Which iteration of the demo to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DemoVariant {
    /// Skybox, infinite ground, shadow-mapped block, terrain and lamp post.
    #[default]
    Wonderland,
    /// Cornell room with the two blocks, mouse-driven light, fixed camera.
    CornellWindow,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WonderlandConfig {
    pub variant: DemoVariant,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub light: LightConfig,
    pub shadow: ShadowConfig,
    pub skybox: SkyboxConfig,
    pub ground: GroundConfig,
    pub heightmap: HeightmapConfig,
    pub lamp_post: LampPostConfig,
    pub cornell: CornellConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub clear_color: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub start_position: [f32; 3],
    pub reset_position: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// World units per second while a movement key is held
    pub move_speed: f32,
    /// Degrees per pixel of mouse motion
    pub mouse_sensitivity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: [f32; 3],
    /// Up vector of the light's view, must not be parallel to -Y
    pub up: [f32; 3],
    /// Scales irradiance before tone mapping
    pub exposure: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowConfig {
    pub enabled: bool,
    pub map_size: u32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub bias: f32,
    pub depth_dump_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyboxConfig {
    pub scale: f32,
    pub texture: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub tile_size: f32,
    /// Tiles on each side of the camera's tile, 1 gives a 3x3 grid
    pub radius: i32,
    pub texture: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightmapConfig {
    pub enabled: bool,
    pub position: [f32; 3],
    /// Vertices per side
    pub resolution: usize,
    pub size: f32,
    pub deform_interval_secs: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    pub min_amplitude: f32,
    pub max_amplitude: f32,
    pub max_height: f32,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LampPostConfig {
    pub enabled: bool,
    pub model: String,
    pub position: [f32; 3],
    pub height: f32,
    pub color: [f32; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CornellConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub light_position: [f32; 3],
    pub show_room: bool,
    pub step: f32,
    pub cursor_scale: f32,
    pub cursor_origin: [f32; 2],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            title: "Wonderland".to_string(),
            clear_color: [0.2, 0.2, 0.25],
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            start_position: [100.0, 50.0, 100.0],
            reset_position: [150.0, 50.0, 150.0],
            fov_degrees: 45.0,
            near: 0.1,
            far: 2500.0,
            move_speed: 300.0,
            mouse_sensitivity: 0.1,
        }
    }
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: [-100.0, 200.0, -200.0],
            up: [0.0, 0.0, 1.0],
            exposure: 100.0,
        }
    }
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            map_size: 2048,
            fov_degrees: 100.0,
            near: 0.1,
            // Only has to reach past the ground
            far: 1000.0,
            bias: 0.0005,
            depth_dump_path: "depth_camera.png".to_string(),
        }
    }
}

impl Default for SkyboxConfig {
    fn default() -> Self {
        Self {
            scale: 500.0,
            texture: "assets/textures/skybox.png".to_string(),
        }
    }
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            tile_size: 500.0,
            radius: 1,
            texture: "assets/textures/ground.png".to_string(),
        }
    }
}

impl Default for HeightmapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position: [350.0, 0.5, -350.0],
            resolution: 129,
            size: 400.0,
            deform_interval_secs: 0.75,
            min_radius: 30.0,
            max_radius: 110.0,
            min_amplitude: -8.0,
            max_amplitude: 20.0,
            max_height: 90.0,
            seed: None,
        }
    }
}

impl Default for LampPostConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "assets/models/lamp_post.gltf".to_string(),
            position: [-20.0, 0.0, -40.0],
            height: 60.0,
            color: [0.25, 0.25, 0.28],
        }
    }
}

impl Default for CornellConfig {
    fn default() -> Self {
        Self {
            eye: [-278.0, 273.0, 800.0],
            target: [-278.0, 273.0, 0.0],
            fov_degrees: 45.0,
            near: 600.0,
            far: 1500.0,
            light_position: [-275.0, 500.0, -275.0],
            show_room: true,
            step: 20.0,
            cursor_scale: 250.0,
            cursor_origin: [-278.0, 278.0],
        }
    }
}

impl WonderlandConfig {
    /// Load configuration from `path`, or write and return the defaults if it
    /// does not exist.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = Self::from_json(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;

            log::info!("Loaded configuration from {}", path.display());
            Ok(config)
        } else {
            log::warn!(
                "No config file found, creating default at {}",
                path.display()
            );
            let config = Self::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory {}", parent.display())
            })?;
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        log::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }
}

pub fn vec3(values: [f32; 3]) -> Vec3 {
    Vec3::from_array(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_wonderland_scene() {
        let config = WonderlandConfig::default();
        assert_eq!(config.variant, DemoVariant::Wonderland);
        assert_eq!(config.window.width, 1024);
        assert_eq!(config.window.height, 768);
        assert_eq!(config.camera.start_position, [100.0, 50.0, 100.0]);
        assert_eq!(config.shadow.map_size, 2048);
        assert_eq!(config.ground.tile_size, 500.0);
        assert_eq!(config.ground.radius, 1);
        assert_eq!(config.cornell.near, 600.0);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config = WonderlandConfig::from_json(
            r#"{ "variant": "CornellWindow", "shadow": { "map_size": 1024 } }"#,
        )
        .unwrap();

        assert_eq!(config.variant, DemoVariant::CornellWindow);
        assert_eq!(config.shadow.map_size, 1024);
        assert_eq!(config.shadow.fov_degrees, 100.0);
        assert_eq!(config.window.title, "Wonderland");
    }

    #[test]
    fn serialize_deserialize() {
        let config = WonderlandConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized = WonderlandConfig::from_json(&json).unwrap();
        assert_eq!(config.camera.far, deserialized.camera.far);
        assert_eq!(config.heightmap.resolution, deserialized.heightmap.resolution);
        assert_eq!(config.lamp_post.model, deserialized.lamp_post.model);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(WonderlandConfig::from_json("{ not json").is_err());
        assert!(WonderlandConfig::from_json(r#"{ "variant": "Nope" }"#).is_err());
    }
}
