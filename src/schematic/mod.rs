//! Structure schematic decoding.
//!
//! Decoding turns a parsed NBT tag tree into a [`VoxelWorld`]:
//!
//! 1. [`resolve_palette`] builds the state table, coercing block properties.
//! 2. [`materialize`] places every non-air block entry, mapping type names to
//!    registry ids.
//!
//! Every call builds its own palette and world; nothing is shared between decodes.

pub mod materialize;
pub mod palette;
pub mod properties;

pub use materialize::{materialize, materialize_with_report, DecodeReport};
pub use palette::{resolve_palette, PaletteEntry, PaletteTable};
pub use properties::{coerce_properties, coerce_value, Properties, PropertyValue};

use crate::error::Result;
use crate::nbt::{as_int, read_tag_tree};
use crate::registry::BlockRegistry;
use crate::world::VoxelWorld;
use fastnbt::Value;

/// A fully decoded schematic.
#[derive(Debug, Clone)]
pub struct DecodedSchematic {
    pub world: VoxelWorld,
    pub palette: PaletteTable,
    pub report: DecodeReport,
    /// `DataVersion` of the file, when present.
    pub data_version: Option<i32>,
    /// Declared `size` of the structure, when present.
    pub size: Option<[i32; 3]>,
}

/// Parse and decode a structure file buffer (gzip-compressed or raw NBT).
pub fn decode_schematic<R: BlockRegistry + ?Sized>(data: &[u8], registry: &R) -> Result<DecodedSchematic> {
    let tree = read_tag_tree(data)?;
    decode_tag_tree(&tree, registry)
}

/// Decode an already parsed tag tree.
pub fn decode_tag_tree<R: BlockRegistry + ?Sized>(tree: &Value, registry: &R) -> Result<DecodedSchematic> {
    let palette = resolve_palette(tree)?;
    let (world, report) = materialize_with_report(tree, &palette, registry)?;

    let (data_version, size) = read_header(tree);
    tracing::debug!(
        palette = palette.len(),
        blocks = world.len(),
        air_skipped = report.air_skipped,
        data_version = ?data_version,
        "decoded schematic"
    );

    Ok(DecodedSchematic {
        world,
        palette,
        report,
        data_version,
        size,
    })
}

/// Optional header tags. Malformed values are ignored, they carry no placement data.
fn read_header(tree: &Value) -> (Option<i32>, Option<[i32; 3]>) {
    let Value::Compound(root) = tree else {
        return (None, None);
    };

    let data_version = root
        .get("DataVersion")
        .and_then(as_int)
        .and_then(|v| i32::try_from(v).ok());

    let size = match root.get("size") {
        Some(Value::List(items)) if items.len() == 3 => {
            let dims: Option<Vec<i32>> = items
                .iter()
                .map(|v| as_int(v).and_then(|v| i32::try_from(v).ok()))
                .collect();
            dims.map(|d| [d[0], d[1], d[2]])
        }
        Some(Value::IntArray(items)) if items.len() == 3 => Some([items[0], items[1], items[2]]),
        _ => None,
    };

    (data_version, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BlockTable;
    use crate::types::BlockPosition;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use serde::Serialize;
    use std::collections::HashMap;
    use std::io::Write;

    #[derive(Serialize)]
    struct PaletteState {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Properties", skip_serializing_if = "Option::is_none")]
        properties: Option<HashMap<String, String>>,
    }

    #[derive(Serialize)]
    struct StructureBlock {
        state: i32,
        pos: Vec<i32>,
    }

    #[derive(Serialize)]
    struct Structure {
        #[serde(rename = "DataVersion")]
        data_version: i32,
        size: Vec<i32>,
        palette: Vec<PaletteState>,
        blocks: Vec<StructureBlock>,
    }

    fn sample_structure() -> Structure {
        Structure {
            data_version: 2586,
            size: vec![3, 1, 1],
            palette: vec![
                PaletteState { name: "minecraft:air".into(), properties: None },
                PaletteState { name: "minecraft:stone".into(), properties: None },
                PaletteState {
                    name: "minecraft:wool".into(),
                    properties: Some(HashMap::from([
                        ("color".to_string(), "red".to_string()),
                        ("waterlogged".to_string(), "false".to_string()),
                    ])),
                },
            ],
            blocks: vec![
                StructureBlock { state: 0, pos: vec![0, 0, 0] },
                StructureBlock { state: 1, pos: vec![1, 0, 0] },
                StructureBlock { state: 2, pos: vec![2, 0, 0] },
            ],
        }
    }

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn test_decode_gzipped_structure_file() {
        let bytes = gzip(&fastnbt::to_bytes(&sample_structure()).unwrap());
        let registry = BlockTable::from_json(r#"[{"id": 1, "name": "stone"}]"#).unwrap();

        let decoded = decode_schematic(&bytes, &registry).unwrap();
        assert_eq!(decoded.data_version, Some(2586));
        assert_eq!(decoded.size, Some([3, 1, 1]));
        assert_eq!(decoded.palette.len(), 3);
        assert_eq!(decoded.world.len(), 2);
        assert_eq!(decoded.world.get_block(BlockPosition::new(1, 0, 0)).unwrap().type_id, 1);
        assert_eq!(
            decoded.world.get_block(BlockPosition::new(2, 0, 0)).unwrap().properties["waterlogged"],
            PropertyValue::Bool(false)
        );
        assert_eq!(decoded.report.unknown_block_count(), 1);
    }

    #[test]
    fn test_out_of_range_yields_no_world() {
        let mut structure = sample_structure();
        structure.blocks.push(StructureBlock { state: 3, pos: vec![4, 0, 0] });
        let bytes = fastnbt::to_bytes(&structure).unwrap();

        let result = decode_schematic(&bytes, &BlockTable::default());
        assert!(result.unwrap_err().is_malformed());
    }

    #[test]
    fn test_unparseable_input_is_not_malformed() {
        let err = decode_schematic(b"not nbt at all", &BlockTable::default()).unwrap_err();
        assert!(!err.is_malformed());
    }
}
