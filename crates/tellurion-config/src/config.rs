//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Orbit camera settings.
    pub camera: CameraConfig,
    /// Starfield settings.
    pub sky: SkyConfig,
    /// Texture source URLs.
    pub textures: TextureConfig,
    /// Rendering settings.
    pub render: RenderConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Orbit camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    /// Initial camera distance from the origin.
    pub distance: f32,
    /// Minimum zoom distance.
    pub min_distance: f32,
    /// Maximum zoom distance.
    pub max_distance: f32,
    /// Drag-to-rotate speed multiplier.
    pub rotate_speed: f32,
    /// Per-frame inertial damping factor in `(0, 1)`.
    pub damping: f32,
}

/// Starfield configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkyConfig {
    /// Number of stars generated at startup.
    pub star_count: u32,
    /// RNG seed for deterministic star placement.
    pub seed: u64,
    /// Half-extent of the cube volume stars are scattered in.
    pub extent: f32,
    /// Lower bound of the star hue band (HSL hue, `[0, 1]`).
    pub hue_min: f32,
    /// Upper bound of the star hue band.
    pub hue_max: f32,
    /// Star color saturation.
    pub saturation: f32,
}

/// Texture source URLs for the celestial bodies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextureConfig {
    /// Earth surface color map.
    pub earth_color: String,
    /// Earth normal map.
    pub earth_normal: String,
    /// Earth specular (ocean reflectivity) map.
    pub earth_specular: String,
    /// Cloud layer color map (with alpha).
    pub clouds: String,
    /// Moon color map (doubles as its bump source).
    pub moon: String,
    /// Skip all network fetches and render with fallback materials.
    pub offline: bool,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Tone-mapping exposure multiplier.
    pub exposure: f32,
    /// Upper bound for the render scale; display scale factors above this are
    /// clamped so high-DPI screens don't quadruple the pixel load.
    pub max_pixel_ratio: f64,
    /// Anisotropic filtering sample count (1 disables).
    pub anisotropy: u16,
    /// Sun shadow map resolution (square).
    pub shadow_map_size: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            vsync: true,
            title: "Tellurion".to_string(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
            distance: 50.0,
            min_distance: 20.0,
            max_distance: 100.0,
            rotate_speed: 0.5,
            damping: 0.05,
        }
    }
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            star_count: 20_000,
            seed: 42,
            extent: 1000.0,
            hue_min: 0.8,
            hue_max: 1.0,
            saturation: 0.8,
        }
    }
}

const PLANET_TEXTURE_BASE: &str =
    "https://raw.githubusercontent.com/mrdoob/three.js/dev/examples/textures/planets";

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            earth_color: format!("{PLANET_TEXTURE_BASE}/earth_atmos_2048.jpg"),
            earth_normal: format!("{PLANET_TEXTURE_BASE}/earth_normal_2048.jpg"),
            earth_specular: format!("{PLANET_TEXTURE_BASE}/earth_specular_2048.jpg"),
            clouds: format!("{PLANET_TEXTURE_BASE}/earth_clouds_1024.png"),
            moon: format!("{PLANET_TEXTURE_BASE}/moon_1024.jpg"),
            offline: false,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            exposure: 0.5,
            max_pixel_ratio: 2.0,
            anisotropy: 16,
            shadow_map_size: 2048,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("width: 1280"));
        assert!(ron_str.contains("star_count: 20000"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_field_uses_default() {
        // Config missing the `sky` section entirely
        let ron_str = "(window: (), camera: (), textures: (), render: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.sky, SkyConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<Config, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_default_camera_matches_scene_scale() {
        let camera = CameraConfig::default();
        assert_eq!(camera.fov_y_degrees, 75.0);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 2000.0);
        assert!(camera.min_distance < camera.distance);
        assert!(camera.distance < camera.max_distance);
    }

    #[test]
    fn test_default_texture_urls_are_https() {
        let textures = TextureConfig::default();
        for url in [
            &textures.earth_color,
            &textures.earth_normal,
            &textures.earth_specular,
            &textures.clouds,
            &textures.moon,
        ] {
            assert!(url.starts_with("https://"), "unexpected URL: {url}");
        }
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.window.width = 1920;
        config.window.height = 1080;
        config.sky.seed = 7;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.sky.star_count = 5000;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_some());
        assert_eq!(result.unwrap().sky.star_count, 5000);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
