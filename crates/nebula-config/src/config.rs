//! Sky configuration with sensible defaults and RON persistence.

use std::path::Path;

use nebula_atmosphere::{AtmosphereParameters, LutSettings};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name the configuration is persisted under.
pub const CONFIG_FILE_NAME: &str = "sky.ron";

/// Top-level sky configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkyConfig {
    /// Physical constants of the atmosphere.
    pub atmosphere: AtmosphereParameters,
    /// Lookup table resolutions and step counts.
    pub luts: LutSettings,
    /// Output image and camera.
    pub view: ViewConfig,
    /// Day/night cycle.
    pub time: TimeConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Output image and camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewConfig {
    /// Panorama width in pixels.
    pub width: u32,
    /// Panorama height in pixels.
    pub height: u32,
    /// Camera altitude above the ground in kilometres.
    pub camera_altitude_km: f32,
    /// Draw the sun disc.
    pub sun_disc: bool,
    /// Illuminance of the sun outside the atmosphere.
    pub sun_intensity: f32,
    /// Where the rendered image is written.
    pub output: String,
}

/// Day/night cycle configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeConfig {
    /// Time of day, `[0.0, 1.0)`. 0.0 = midnight, 0.5 = noon.
    pub time_of_day: f64,
    /// Duration of one full day in real-time seconds.
    pub day_duration_seconds: f64,
    /// Highest sun elevation of the day, in degrees.
    pub noon_elevation_degrees: f32,
    /// Number of frames to render; the clock advances between frames.
    pub frames: u32,
    /// Real-time seconds the clock advances between consecutive frames.
    pub frame_interval_seconds: f64,
    /// Freeze the clock so every frame shows `time_of_day`.
    pub paused: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn"). Empty keeps the default filter.
    pub log_level: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 512,
            camera_altitude_km: 0.2,
            sun_disc: true,
            sun_intensity: 20.0,
            output: "sky.hdr".to_string(),
        }
    }
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_of_day: 0.3,
            day_duration_seconds: 1200.0,
            noon_elevation_degrees: 60.0,
            frames: 1,
            frame_interval_seconds: 10.0,
            paused: false,
        }
    }
}

// --- Load / Save / Reload ---

impl SkyConfig {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: SkyConfig = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded sky config from {}", config_path.display());
            Ok(config)
        } else {
            let config = SkyConfig::default();
            config.save(config_dir)?;
            log::info!("Created default sky config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `sky.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
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
    ///
    /// Callers pass the new `atmosphere` and `luts` sections to `Sky::update`,
    /// which rebuilds the tables only when they actually differ.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: SkyConfig = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Sky config reloaded with changes");
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
        let config = SkyConfig::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("width: 1024"));
        assert!(ron_str.contains("ground_radius: 6360.0"));
        assert!(ron_str.contains("evaluate_steps: 32"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = SkyConfig::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: SkyConfig = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_default_atmosphere_is_earth() {
        assert_eq!(SkyConfig::default().atmosphere, AtmosphereParameters::earth());
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(view: (width: 64), debug: ())";
        let config: SkyConfig = ron::from_str(ron_str).unwrap();
        assert_eq!(config.view.width, 64);
        assert_eq!(config.view.height, ViewConfig::default().height);
        assert_eq!(config.luts, LutSettings::default());
        assert_eq!(config.time, TimeConfig::default());
    }

    #[test]
    fn test_partial_atmosphere_keeps_earth_constants() {
        let ron_str = "(atmosphere: (mie_asymmetry: 0.7))";
        let config: SkyConfig = ron::from_str(ron_str).unwrap();
        assert_eq!(config.atmosphere.mie_asymmetry, 0.7);
        assert_eq!(config.atmosphere.ground_radius, 6360.0);
    }

    #[test]
    fn test_extra_field_ignored() {
        let ron_str = "(future_setting: true)";
        let result: Result<SkyConfig, _> = ron::from_str(ron_str);
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SkyConfig::default();
        config.view.width = 2048;
        config.time.time_of_day = 0.74;
        config.luts.multiscatter_directions_per_axis = 4;

        config.save(dir.path()).unwrap();
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
        let loaded = SkyConfig::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nebula");
        let config = SkyConfig::load_or_create(&nested).unwrap();
        assert_eq!(config, SkyConfig::default());
        assert!(nested.join(CONFIG_FILE_NAME).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = SkyConfig::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.atmosphere.ground_albedo = glam::Vec3::splat(0.1);
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(
            result.unwrap().atmosphere.ground_albedo,
            glam::Vec3::splat(0.1)
        );
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = SkyConfig::default();
        config.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "{{not valid}}").unwrap();
        let result = SkyConfig::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_ron_comments_accepted() {
        let ron_str = "// Sky settings\n(\n  // nothing overridden\n)";
        let config: SkyConfig = ron::from_str(ron_str).unwrap();
        assert_eq!(config, SkyConfig::default());
    }
}
