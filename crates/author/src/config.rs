use raylevel_render::RenderConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config: {0}")]
    Json(#[from] serde_json::Error),
}

/// How far one preview tick moves and turns the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Tiles advanced per tick while moving.
    pub move_step: f32,
    /// Angle units turned per tick.
    pub turn_step: i32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            move_step: 0.08,
            turn_step: 4,
        }
    }
}

/// Everything the preview pane needs: frame size, raycast tunables and
/// camera motion. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub width: u32,
    pub height: u32,
    pub render: RenderConfig,
    pub motion: MotionConfig,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
            render: RenderConfig::default(),
            motion: MotionConfig::default(),
        }
    }
}

impl PreviewConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = PreviewConfig::from_json(r#"{"width": 160, "motion": {"turn_step": 8}}"#).unwrap();
        assert_eq!(cfg.width, 160);
        assert_eq!(cfg.height, 200);
        assert_eq!(cfg.motion.turn_step, 8);
        assert!((cfg.motion.move_step - 0.08).abs() < 1e-6);
        assert_eq!(cfg.render, RenderConfig::default());
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.json");
        std::fs::write(&path, r#"{"render": {"fov_degrees": 90.0}}"#).unwrap();
        let cfg = PreviewConfig::load(&path).unwrap();
        assert!((cfg.render.fov_degrees - 90.0).abs() < 1e-6);

        let missing = PreviewConfig::load(dir.path().join("nope.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(PreviewConfig::from_json("{width:"), Err(ConfigError::Json(_))));
    }
}
