//! Sparse voxel world produced by decoding.

use crate::registry::UNKNOWN_BLOCK_ID;
use crate::schematic::properties::Properties;
use crate::types::{BlockPosition, BlockSource, BoundingBox};
use std::collections::HashMap;

/// Metadata value stamped on every decoded block.
pub const BLOCK_METADATA: u8 = 1;

/// A placed block instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Numeric id from the block registry, [`UNKNOWN_BLOCK_ID`] when unmapped.
    pub type_id: u32,
    /// Namespaced type name from the palette.
    pub name: String,
    /// Coerced block properties.
    pub properties: Properties,
    /// Always [`BLOCK_METADATA`].
    pub metadata: u8,
}

impl Block {
    pub fn new(type_id: u32, name: impl Into<String>, properties: Properties) -> Self {
        Self {
            type_id,
            name: name.into(),
            properties,
            metadata: BLOCK_METADATA,
        }
    }

    /// Whether the registry had no id for this block.
    pub fn is_unknown(&self) -> bool {
        self.type_id == UNKNOWN_BLOCK_ID
    }

    /// Get the block ID without namespace (e.g., "stone").
    pub fn block_id(&self) -> &str {
        crate::registry::strip_namespace(&self.name)
    }
}

/// Sparse mapping from cell coordinates to blocks. Absent cells are air.
#[derive(Debug, Clone, Default)]
pub struct VoxelWorld {
    blocks: HashMap<BlockPosition, Block>,
}

impl VoxelWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a block, returning the previous occupant of the cell.
    pub fn set_block(&mut self, pos: BlockPosition, block: Block) -> Option<Block> {
        self.blocks.insert(pos, block)
    }

    pub fn get_block(&self, pos: BlockPosition) -> Option<&Block> {
        self.blocks.get(&pos)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BlockPosition, &Block)> {
        self.blocks.iter()
    }

    /// Bounding box of all occupied cells.
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_cells(self.blocks.keys().copied())
    }
}

impl BlockSource for VoxelWorld {
    type Block = Block;

    fn get_block(&self, pos: BlockPosition) -> Option<&Block> {
        self.blocks.get(&pos)
    }

    fn iter_blocks(&self) -> Box<dyn Iterator<Item = (BlockPosition, &Block)> + '_> {
        Box::new(self.blocks.iter().map(|(k, v)| (*k, v)))
    }

    fn bounds(&self) -> Option<BoundingBox> {
        VoxelWorld::bounds(self)
    }
}
