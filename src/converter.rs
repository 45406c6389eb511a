//! The conversion pipeline: NBT bytes to model document.

use crate::config::ConverterConfig;
use crate::error::Result;
use crate::export::ModelFormat;
use crate::registry::{BlockRegistry, BlockTable};
use crate::scene::{build_scene, Scene, SceneConfig};
use crate::schematic::{decode_schematic, DecodeReport, DecodedSchematic};
use std::sync::Arc;

/// Result of converting one schematic.
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The exported model document.
    pub bytes: Vec<u8>,
    pub format: ModelFormat,
    pub report: DecodeReport,
    /// Blocks in the decoded world.
    pub block_count: usize,
    /// Blocks that made it into the scene (after view-distance filtering).
    pub rendered_count: usize,
}

/// Runs decode, scene construction and export.
///
/// A converter holds only read-only state. Each call builds its own palette,
/// world and scene, so one converter can serve concurrent requests.
#[derive(Clone)]
pub struct Converter {
    registry: Arc<dyn BlockRegistry + Send + Sync>,
    config: ConverterConfig,
}

impl Converter {
    pub fn new(registry: Arc<dyn BlockRegistry + Send + Sync>, config: ConverterConfig) -> Self {
        Self { registry, config }
    }

    /// Create a converter, loading the registry from the configured data dir.
    ///
    /// Without a data dir every block maps to the unknown id.
    pub fn from_config(config: ConverterConfig) -> Result<Self> {
        let registry = match &config.data_dir {
            Some(dir) => BlockTable::load(dir, &config.schema_version)?,
            None => {
                tracing::warn!("no block registry data dir configured, all block ids will be unknown");
                BlockTable::default()
            }
        };
        Ok(Self::new(Arc::new(registry), config))
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Decode a schematic into a voxel world.
    pub fn decode(&self, data: &[u8]) -> Result<DecodedSchematic> {
        decode_schematic(data, self.registry.as_ref())
    }

    /// Build the scene for a decoded schematic.
    pub fn scene(&self, decoded: &DecodedSchematic) -> Scene {
        build_scene(&decoded.world, &SceneConfig::from(&self.config))
    }

    /// Decode, build the scene and export it.
    pub fn convert(&self, data: &[u8], format: ModelFormat) -> Result<Conversion> {
        let decoded = self.decode(data)?;
        let scene = self.scene(&decoded);
        let bytes = format.export(&scene)?;

        tracing::info!(
            blocks = decoded.world.len(),
            rendered = scene.block_count,
            unknown = decoded.report.unknown_block_count(),
            bytes = bytes.len(),
            "converted schematic"
        );

        Ok(Conversion {
            bytes,
            format,
            block_count: decoded.world.len(),
            rendered_count: scene.block_count,
            report: decoded.report,
        })
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter").field("config", &self.config).finish_non_exhaustive()
    }
}
