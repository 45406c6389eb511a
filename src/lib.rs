//! # Schematic Converter
//!
//! A Rust library for turning Minecraft structure schematics into glTF models.
//!
//! ## Overview
//!
//! A structure file (gzip-compressed or raw NBT) holds a palette of block
//! states and a list of blocks that reference the palette by index. The
//! decoder resolves the palette, coerces block-state properties into typed
//! values, maps block types to registry ids and places every non-air block
//! into a sparse voxel world. The world is then turned into a scene of
//! colored cubes and exported as glTF or GLB.
//!
//! ## Quick Start
//!
//! ```ignore
//! use schematic_converter::{Converter, ConverterConfig, ModelFormat};
//!
//! // Load the block registry from DATA_DIR and friends
//! let converter = Converter::from_config(ConverterConfig::from_env())?;
//!
//! // Convert a structure file
//! let data = std::fs::read("house.nbt")?;
//! let conversion = converter.convert(&data, ModelFormat::Gltf)?;
//! std::fs::write("model.gltf", &conversion.bytes)?;
//! ```
//!
//! ## Library Integration
//!
//! The decode stages are usable on their own, for example to feed an
//! existing renderer from a tag tree you already parsed:
//!
//! ```ignore
//! use schematic_converter::{decode_tag_tree, BlockTable};
//!
//! let registry = BlockTable::load("data", "1.16")?;
//! let decoded = decode_tag_tree(&tree, &registry)?;
//! for (pos, block) in decoded.world.iter() {
//!     println!("{pos}: {} ({})", block.name, block.type_id);
//! }
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod export;
pub mod nbt;
pub mod registry;
pub mod scene;
pub mod schematic;
pub mod types;
pub mod world;

// Re-export main types for convenience
pub use config::ConverterConfig;
pub use converter::{Conversion, Converter};
pub use error::{ConverterError, Result};
pub use export::{export_glb, export_gltf, ModelFormat};
pub use registry::{BlockRecord, BlockRegistry, BlockTable, UNKNOWN_BLOCK_ID};
pub use scene::{build_scene, Camera, Mesh, Scene, SceneConfig, Vertex};
pub use schematic::{
    decode_schematic, decode_tag_tree, DecodeReport, DecodedSchematic, PaletteEntry, PaletteTable,
    Properties, PropertyValue,
};
pub use types::{BlockPosition, BlockSource, BoundingBox, Direction};
pub use world::{Block, VoxelWorld};

#[cfg(feature = "server")]
pub mod server;

#[cfg(feature = "wasm")]
pub mod wasm;
