//! Block type registry and name-to-id mapping.
//!
//! Registry data uses the minecraft-data `blocks.json` layout: a JSON array of
//! objects with at least `id` and `name` (un-namespaced) fields.

use crate::error::{ConverterError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Id used for block types the registry does not know.
pub const UNKNOWN_BLOCK_ID: u32 = 0;

/// Lookup of numeric block ids by un-namespaced name.
pub trait BlockRegistry {
    /// Get the id for a block name such as "stone".
    fn block_id(&self, name: &str) -> Option<u32>;
}

/// A single registry record. Other fields in the file are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockRecord {
    pub id: u32,
    pub name: String,
}

/// In-memory block registry for one schema version.
#[derive(Debug, Clone, Default)]
pub struct BlockTable {
    by_name: HashMap<String, u32>,
}

impl BlockTable {
    /// Build a table from registry records. Later duplicates replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = BlockRecord>) -> Self {
        Self {
            by_name: entries.into_iter().map(|r| (r.name, r.id)).collect(),
        }
    }

    /// Parse a minecraft-data style `blocks.json` document.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<BlockRecord> = serde_json::from_str(json)?;
        Ok(Self::from_entries(records))
    }

    /// Load `<data_dir>/<version>/blocks.json`.
    pub fn load<P: AsRef<Path>>(data_dir: P, version: &str) -> Result<Self> {
        let path = data_dir.as_ref().join(version).join("blocks.json");
        let json = std::fs::read_to_string(&path).map_err(|e| {
            ConverterError::Registry(format!("cannot read {}: {}", path.display(), e))
        })?;
        let table = Self::from_json(&json)?;
        tracing::debug!(version, blocks = table.len(), "loaded block registry");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl BlockRegistry for BlockTable {
    fn block_id(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }
}

impl<R: BlockRegistry + ?Sized> BlockRegistry for &R {
    fn block_id(&self, name: &str) -> Option<u32> {
        (**self).block_id(name)
    }
}

impl<R: BlockRegistry + ?Sized> BlockRegistry for std::sync::Arc<R> {
    fn block_id(&self, name: &str) -> Option<u32> {
        (**self).block_id(name)
    }
}

/// Drop the namespace prefix, up to and including the first `:`.
pub fn strip_namespace(type_name: &str) -> &str {
    match type_name.split_once(':') {
        Some((_, rest)) => rest,
        None => type_name,
    }
}

/// Resolve a namespaced type name to a block id, falling back to [`UNKNOWN_BLOCK_ID`].
pub fn resolve_type_id<R: BlockRegistry + ?Sized>(type_name: &str, registry: &R) -> u32 {
    lookup_type_id(type_name, registry).unwrap_or(UNKNOWN_BLOCK_ID)
}

/// Like [`resolve_type_id`] but reports whether the name was known.
pub(crate) fn lookup_type_id<R: BlockRegistry + ?Sized>(type_name: &str, registry: &R) -> Option<u32> {
    registry.block_id(strip_namespace(type_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const BLOCKS_JSON: &str = r#"[
        {"id": 0, "displayName": "Air", "name": "air", "hardness": 0},
        {"id": 1, "displayName": "Stone", "name": "stone", "hardness": 1.5},
        {"id": 95, "displayName": "White Wool", "name": "white_wool"}
    ]"#;

    #[test]
    fn test_strip_namespace() {
        assert_eq!(strip_namespace("minecraft:stone"), "stone");
        assert_eq!(strip_namespace("stone"), "stone");
        assert_eq!(strip_namespace("mod:block:variant"), "block:variant");
        assert_eq!(strip_namespace(":x"), "x");
    }

    #[test]
    fn test_resolve_known_and_unknown() {
        let table = BlockTable::from_json(BLOCKS_JSON).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(resolve_type_id("minecraft:stone", &table), 1);
        assert_eq!(resolve_type_id("minecraft:white_wool", &table), 95);
        assert_eq!(resolve_type_id("minecraft:wool", &table), UNKNOWN_BLOCK_ID);
        assert_eq!(resolve_type_id("create:cogwheel", &table), UNKNOWN_BLOCK_ID);
        assert_eq!(lookup_type_id("minecraft:wool", &table), None);
    }

    #[test]
    fn test_empty_table_falls_back() {
        let table = BlockTable::default();
        assert!(table.is_empty());
        assert_eq!(resolve_type_id("minecraft:stone", &table), UNKNOWN_BLOCK_ID);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            BlockTable::from_json("{\"id\": 1}"),
            Err(ConverterError::Json(_))
        ));
    }

    #[test]
    fn test_load_from_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("1.16")).unwrap();
        fs::write(dir.path().join("1.16").join("blocks.json"), BLOCKS_JSON).unwrap();

        let table = BlockTable::load(dir.path(), "1.16").unwrap();
        assert_eq!(table.block_id("stone"), Some(1));

        let missing = BlockTable::load(dir.path(), "1.17").unwrap_err();
        assert!(matches!(missing, ConverterError::Registry(_)));
    }
}
