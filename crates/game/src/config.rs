use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

/// Runtime settings read from `overworld.json` at the project root.
/// Every field is optional in the file; a missing or malformed file
/// falls back to defaults so the game always starts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub map_width: u32,
    pub map_height: u32,
    pub enemy_count: u32,
    pub camera_spacing: f32,
    pub camera_dampening: f32,
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            target_fps: 60,
            map_width: 100,
            map_height: 100,
            enemy_count: 200,
            camera_spacing: 10.0,
            camera_dampening: 20.0,
            rng_seed: None,
        }
    }
}

impl Config {
    pub fn load_or_default(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "config_missing_using_defaults");
                return Self::default();
            }
            Err(error) => {
                warn!(path = %path.display(), error = %error, "config_read_failed_using_defaults");
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&contents) {
            Ok(config) => config.sanitized(),
            Err(error) => {
                warn!(path = %path.display(), error = %error, "config_parse_failed_using_defaults");
                Self::default()
            }
        }
    }

    /// Clamps values the simulation cannot run with.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.camera_dampening <= 0.0 {
            warn!(
                camera_dampening = self.camera_dampening,
                "camera_dampening_must_be_positive_using_default"
            );
            self.camera_dampening = defaults.camera_dampening;
        }
        if self.target_fps == 0 {
            warn!("target_fps_must_be_positive_using_default");
            self.target_fps = defaults.target_fps;
        }
        if self.map_width == 0 || self.map_height == 0 {
            warn!(
                map_width = self.map_width,
                map_height = self.map_height,
                "map_dimensions_must_be_positive_using_defaults"
            );
            self.map_width = defaults.map_width;
            self.map_height = defaults.map_height;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let config = Config::load_or_default(&dir.path().join("overworld.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_overrides_only_what_it_names() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("overworld.json");
        fs::write(&path, r#"{"enemy_count": 12, "rng_seed": 99}"#).expect("write");

        let config = Config::load_or_default(&path);
        assert_eq!(config.enemy_count, 12);
        assert_eq!(config.rng_seed, Some(99));
        assert_eq!(config.map_width, 100);
        assert_eq!(config.target_fps, 60);
    }

    #[test]
    fn malformed_file_yields_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("overworld.json");
        fs::write(&path, "{not json").expect("write");

        assert_eq!(Config::load_or_default(&path), Config::default());
    }

    #[test]
    fn non_positive_dampening_is_replaced() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("overworld.json");
        fs::write(&path, r#"{"camera_dampening": 0.0}"#).expect("write");

        let config = Config::load_or_default(&path);
        assert_eq!(config.camera_dampening, 20.0);
    }

    #[test]
    fn zero_map_dimensions_are_replaced() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("overworld.json");
        fs::write(&path, r#"{"map_width": 0, "map_height": 40}"#).expect("write");

        let config = Config::load_or_default(&path);
        assert_eq!(config.map_width, 100);
        assert_eq!(config.map_height, 100);
    }
}
