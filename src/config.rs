//! Converter configuration.

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Options shared by every converter front end.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Target block schema version, e.g. "1.16". Selects the block registry.
    pub schema_version: String,
    /// Chunk radius around the scene centre. `None` keeps every block.
    pub view_distance: Option<u32>,
    /// Output canvas width, used for the camera aspect ratio.
    pub canvas_width: u32,
    /// Output canvas height, used for the camera aspect ratio.
    pub canvas_height: u32,
    /// Wait between building the scene and exporting it.
    ///
    /// The scene builder is synchronous and finished once it returns, so this
    /// defaults to zero. It is kept for renderers that need time to settle.
    #[serde(with = "millis")]
    pub settle_delay: Duration,
    /// Root of the block registry data: `<data_dir>/<schema_version>/blocks.json`.
    pub data_dir: Option<PathBuf>,
    /// Skip faces shared between two occupied cells.
    pub cull_hidden_faces: bool,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            schema_version: "1.16".to_string(),
            view_distance: None,
            canvas_width: 512,
            canvas_height: 512,
            settle_delay: Duration::ZERO,
            data_dir: None,
            cull_hidden_faces: true,
        }
    }
}

impl ConverterConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            schema_version: env::var("SCHEMA_VERSION").unwrap_or(defaults.schema_version),
            view_distance: env::var("VIEW_DISTANCE").ok().and_then(|v| v.parse().ok()),
            canvas_width: parse_var("CANVAS_WIDTH").unwrap_or(defaults.canvas_width),
            canvas_height: parse_var("CANVAS_HEIGHT").unwrap_or(defaults.canvas_height),
            settle_delay: parse_var("RENDER_SETTLE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.settle_delay),
            data_dir: env::var_os("DATA_DIR").map(PathBuf::from),
            cull_hidden_faces: defaults.cull_hidden_faces,
        }
    }

    /// Path of the block registry file for the configured schema version.
    pub fn registry_path(&self) -> Option<PathBuf> {
        self.data_dir
            .as_ref()
            .map(|dir| dir.join(&self.schema_version).join("blocks.json"))
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
