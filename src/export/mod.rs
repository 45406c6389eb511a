//! Model export formats.

pub mod gltf;

pub use gltf::{export_glb, export_gltf};

use crate::error::Result;
use crate::scene::Scene;
use serde::Deserialize;

/// Output model format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ModelFormat {
    /// glTF JSON with an embedded buffer
    #[default]
    Gltf,
    /// Binary glTF
    Glb,
}

impl ModelFormat {
    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ModelFormat::Gltf => "gltf",
            ModelFormat::Glb => "glb",
        }
    }

    /// MIME type of the exported document.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ModelFormat::Gltf => "model/gltf+json",
            ModelFormat::Glb => "model/gltf-binary",
        }
    }

    /// Export a scene in this format.
    pub fn export(&self, scene: &Scene) -> Result<Vec<u8>> {
        match self {
            ModelFormat::Gltf => export_gltf(scene).map(String::into_bytes),
            ModelFormat::Glb => export_glb(scene),
        }
    }
}
