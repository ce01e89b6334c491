use std::path::Path;

use lge_common::ScreenSize;
use lge_damage::DamageStrategy;
use lge_scene::Camera;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Engine construction parameters. Missing JSON fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,
    pub damage: DamageStrategy,
    /// Initial camera; scripts replace it with `set_3d_camera`.
    pub camera: Camera,
    /// Presents between timing log lines. Zero disables them.
    pub profile_interval: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 320,
            damage: DamageStrategy::default(),
            camera: Camera::default(),
            profile_interval: 100,
        }
    }
}

impl EngineConfig {
    pub fn screen(&self) -> ScreenSize {
        ScreenSize::new(self.width, self.height)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "config loaded");
        Ok(config)
    }

    /// Save as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}
