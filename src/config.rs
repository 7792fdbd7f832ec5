use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use tracing::info;

use crate::input::DEFAULT_DEADZONE;
use crate::player::{MotionConfig, DEFAULT_ANIM_SPEED, DEFAULT_STEP_DURATION};
use crate::spatial::TileCoord;

pub const DEFAULT_CONFIG_PATH: &str = "game.json";

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 5.0;
pub const ZOOM_STEP: f32 = 0.1;

/// Game settings. Every field has a default, so a partial (or missing)
/// `game.json` is fine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub window_title: String,
    pub window_width: i32,
    pub window_height: i32,
    /// Map loaded at startup; also its identifier for teleporters.
    pub start_map: String,
    /// Collision layers and rectangle teleporters, shared by every map.
    pub descriptor: PathBuf,
    /// Coordinate-set zones appended to every map's teleporters, if present.
    pub zones: Option<PathBuf>,
    pub sprites: PathBuf,
    pub preferred_spawn: (i32, i32),
    pub zoom: f32,
    pub sprite_scale: f32,
    pub step_duration: f64,
    pub anim_speed: f64,
    pub deadzone: f32,
    pub center_sprite_vertically: bool,
    pub show_collision_tiles: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_title: "Les échos de Xerath".to_owned(),
            window_width: 1280,
            window_height: 720,
            start_map: "assets/maps/mapv2.json".to_owned(),
            descriptor: PathBuf::from("collidable_layers.json"),
            zones: Some(PathBuf::from("teleport-zones.json")),
            sprites: PathBuf::from("assets/sprites"),
            preferred_spawn: (22, 58),
            zoom: 4.0,
            sprite_scale: 2.0,
            step_duration: DEFAULT_STEP_DURATION,
            anim_speed: DEFAULT_ANIM_SPEED,
            deadzone: DEFAULT_DEADZONE,
            center_sprite_vertically: false,
            show_collision_tiles: false,
        }
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let txt = std::fs::read_to_string(path)
            .with_context(|| format!("Reading config file {}", path.display()))?;
        let mut cfg: GameConfig = serde_json::from_str(&txt)
            .with_context(|| format!("Parsing config file {}", path.display()))?;
        cfg.zoom = clamp_zoom(cfg.zoom);
        Ok(cfg)
    }

    /// Reads `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            info!(path = %path.display(), "loading config");
            Self::load(path)
        } else {
            info!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn motion(&self) -> MotionConfig {
        MotionConfig {
            step_duration: self.step_duration,
            anim_speed: self.anim_speed,
        }
    }

    pub fn spawn(&self) -> TileCoord {
        TileCoord::from(self.preferred_spawn)
    }
}

/// Clamps to the zoom range and rounds to the zoom step, so repeated
/// steps never accumulate float error.
pub fn clamp_zoom(zoom: f32) -> f32 {
    let snapped = (zoom / ZOOM_STEP).round() * ZOOM_STEP;
    snapped.clamp(MIN_ZOOM, MAX_ZOOM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("game.json");
        std::fs::write(&path, r#"{ "start_map": "maps/a.json", "zoom": 9.0, "zones": null }"#)
            .expect("write config");

        let cfg = GameConfig::load_or_default(&path).expect("config");
        assert_eq!(cfg.start_map, "maps/a.json");
        assert_eq!(cfg.zoom, MAX_ZOOM);
        assert_eq!(cfg.zones, None);
        assert_eq!(cfg.spawn(), TileCoord::new(22, 58));
        assert_eq!(cfg.motion(), MotionConfig::default());
    }

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = GameConfig::load_or_default(&dir.path().join("absent.json")).expect("config");
        assert_eq!(cfg.zoom, 4.0);
        assert_eq!(cfg.window_width, 1280);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("game.json");
        std::fs::write(&path, "{ zoom: ").expect("write config");
        assert!(GameConfig::load_or_default(&path).is_err());
    }

    #[test]
    fn zoom_is_clamped_and_snapped() {
        assert_eq!(clamp_zoom(0.0), MIN_ZOOM);
        assert_eq!(clamp_zoom(7.3), MAX_ZOOM);
        assert!((clamp_zoom(4.0 + 0.1) - 4.1).abs() < 1e-6);
        assert!((clamp_zoom(4.1000004) - clamp_zoom(4.0999994)).abs() < f32::EPSILON);
    }
}
