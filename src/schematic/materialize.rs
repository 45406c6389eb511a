//! Placement of palette states into a voxel world.

use super::palette::PaletteTable;
use crate::error::{ConverterError, Result};
use crate::nbt::{as_compound, as_int, as_list, child, tag_name};
use crate::registry::{lookup_type_id, BlockRegistry, UNKNOWN_BLOCK_ID};
use crate::types::BlockPosition;
use crate::world::{Block, VoxelWorld};
use fastnbt::Value;
use std::collections::BTreeMap;

/// What happened while materializing, beyond the world itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Block entries skipped because their state is air.
    pub air_skipped: usize,
    /// Type names the registry had no id for, with how many blocks used them.
    pub unknown_types: BTreeMap<String, usize>,
    /// Blocks that replaced an earlier block at the same position.
    pub overwritten: usize,
}

impl DecodeReport {
    /// Number of placed blocks that fell back to [`UNKNOWN_BLOCK_ID`].
    pub fn unknown_block_count(&self) -> usize {
        self.unknown_types.values().sum()
    }
}

/// Place every non-air block entry of the tag tree into a new world.
pub fn materialize<R: BlockRegistry + ?Sized>(
    tree: &Value,
    palette: &PaletteTable,
    registry: &R,
) -> Result<VoxelWorld> {
    materialize_with_report(tree, palette, registry).map(|(world, _)| world)
}

/// [`materialize`], also returning the [`DecodeReport`].
///
/// The world is only returned when every entry was valid.
pub fn materialize_with_report<R: BlockRegistry + ?Sized>(
    tree: &Value,
    palette: &PaletteTable,
    registry: &R,
) -> Result<(VoxelWorld, DecodeReport)> {
    let root = as_compound(tree, "schematic root")?;
    let entries = as_list(child(root, "blocks", "schematic root")?, "blocks")?;

    let mut world = VoxelWorld::new();
    let mut report = DecodeReport::default();

    for (i, entry) in entries.iter().enumerate() {
        let what = format!("blocks[{}]", i);
        let compound = as_compound(entry, &what)?;

        let state = read_state(child(compound, "state", &what)?, &what)?;
        let resolved = palette.get(state).ok_or_else(|| {
            ConverterError::malformed(format!(
                "{} references state {} but the palette has {} entries",
                what,
                state,
                palette.len()
            ))
        })?;
        let pos = read_position(child(compound, "pos", &what)?, &what)?;

        if resolved.is_air() {
            report.air_skipped += 1;
            continue;
        }

        let type_id = match lookup_type_id(&resolved.type_name, registry) {
            Some(id) => id,
            None => {
                *report.unknown_types.entry(resolved.type_name.clone()).or_insert(0) += 1;
                UNKNOWN_BLOCK_ID
            }
        };

        let block = Block::new(type_id, resolved.type_name.clone(), resolved.properties.clone());
        if world.set_block(pos, block).is_some() {
            report.overwritten += 1;
        }
    }

    for (name, count) in &report.unknown_types {
        tracing::debug!(name = %name, count, "block type not in registry");
    }
    if !report.unknown_types.is_empty() {
        tracing::warn!(
            types = report.unknown_types.len(),
            blocks = report.unknown_block_count(),
            "unknown block types mapped to id {}",
            UNKNOWN_BLOCK_ID
        );
    }

    Ok((world, report))
}

fn read_state(value: &Value, what: &str) -> Result<usize> {
    let state = as_int(value).ok_or_else(|| {
        ConverterError::malformed(format!("{}.state is a {}, expected an integer", what, tag_name(value)))
    })?;
    usize::try_from(state)
        .map_err(|_| ConverterError::malformed(format!("{}.state is negative ({})", what, state)))
}

fn read_position(value: &Value, what: &str) -> Result<BlockPosition> {
    let coords: Vec<Option<i64>> = match value {
        Value::List(items) => items.iter().map(as_int).collect(),
        Value::IntArray(items) => items.iter().map(|v| Some(*v as i64)).collect(),
        other => {
            return Err(ConverterError::malformed(format!(
                "{}.pos is a {}, expected a list of 3 integers",
                what,
                tag_name(other)
            )))
        }
    };

    if coords.len() != 3 {
        return Err(ConverterError::malformed(format!(
            "{}.pos has {} coordinates, expected 3",
            what,
            coords.len()
        )));
    }

    let mut xyz = [0i32; 3];
    for (axis, coord) in coords.into_iter().enumerate() {
        xyz[axis] = coord
            .and_then(|c| i32::try_from(c).ok())
            .ok_or_else(|| ConverterError::malformed(format!("{}.pos[{}] is not a 32-bit integer", what, axis)))?;
    }

    Ok(BlockPosition::from(xyz))
}
