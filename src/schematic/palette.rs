//! Palette resolution.

use super::properties::{coerce_properties, Properties};
use crate::error::{ConverterError, Result};
use crate::nbt::{as_compound, as_list, child, scalar_to_string, tag_name};
use fastnbt::Value;
use std::collections::HashMap;

/// Type names that denote an empty cell.
const AIR_TYPES: [&str; 4] = ["minecraft:air", "minecraft:cave_air", "minecraft:void_air", "air"];

/// One resolved palette state.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    /// Position in the palette list, referenced by block `state` tags.
    pub index: usize,
    /// Namespaced type name, e.g. "minecraft:stone".
    pub type_name: String,
    /// Coerced block properties.
    pub properties: Properties,
}

impl PaletteEntry {
    /// Check if this entry is an air state.
    pub fn is_air(&self) -> bool {
        AIR_TYPES.contains(&self.type_name.as_str())
    }
}

/// Dense, zero-based palette lookup table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaletteTable {
    entries: Vec<PaletteEntry>,
}

impl PaletteTable {
    pub fn get(&self, index: usize) -> Option<&PaletteEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }

    /// All valid state indices, `0..len`.
    pub fn indices(&self) -> std::ops::Range<usize> {
        0..self.entries.len()
    }
}

/// Build the palette table from a structure tag tree.
///
/// Uses the `palette` list. Structures saved with several random palettes
/// carry a `palettes` list of lists instead; the first one is used.
pub fn resolve_palette(tree: &Value) -> Result<PaletteTable> {
    let root = as_compound(tree, "schematic root")?;

    let raw_palette = match (root.get("palette"), root.get("palettes")) {
        (Some(palette), _) => as_list(palette, "palette")?,
        (None, Some(palettes)) => {
            let palettes = as_list(palettes, "palettes")?;
            let first = palettes
                .first()
                .ok_or_else(|| ConverterError::malformed("palettes list is empty"))?;
            as_list(first, "palettes[0]")?
        }
        (None, None) => return Err(ConverterError::malformed("schematic has no palette")),
    };

    let entries = raw_palette
        .iter()
        .enumerate()
        .map(|(index, element)| resolve_entry(index, element))
        .collect::<Result<Vec<_>>>()?;

    Ok(PaletteTable { entries })
}

fn resolve_entry(index: usize, element: &Value) -> Result<PaletteEntry> {
    let what = format!("palette[{}]", index);
    let compound = as_compound(element, &what)?;

    let type_name = match child(compound, "Name", &what)? {
        Value::String(name) => name.clone(),
        other => {
            return Err(ConverterError::malformed(format!(
                "{}.Name is a {}, expected a string",
                what,
                tag_name(other)
            )))
        }
    };

    let properties = match compound.get("Properties") {
        Some(props) => coerce_properties(&flatten_properties(props, &what)?),
        None => Properties::new(),
    };

    Ok(PaletteEntry {
        index,
        type_name,
        properties,
    })
}

/// Flatten a `Properties` compound into plain strings.
fn flatten_properties(value: &Value, what: &str) -> Result<HashMap<String, String>> {
    let compound = as_compound(value, &format!("{}.Properties", what))?;
    compound
        .iter()
        .map(|(key, value)| {
            scalar_to_string(value)
                .map(|s| (key.clone(), s))
                .ok_or_else(|| {
                    ConverterError::malformed(format!(
                        "{}.Properties.{} is a {}, expected a scalar",
                        what,
                        key,
                        tag_name(value)
                    ))
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::properties::PropertyValue;

    fn state(name: &str, props: &[(&str, &str)]) -> Value {
        let mut compound = HashMap::new();
        compound.insert("Name".to_string(), Value::String(name.to_string()));
        if !props.is_empty() {
            let props = props
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            compound.insert("Properties".to_string(), Value::Compound(props));
        }
        Value::Compound(compound)
    }

    fn root(entries: Vec<(&str, Value)>) -> Value {
        Value::Compound(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }

    #[test]
    fn test_palette_is_dense() {
        let tree = root(vec![(
            "palette",
            Value::List(vec![
                state("minecraft:air", &[]),
                state("minecraft:stone", &[]),
                state("minecraft:oak_log", &[("axis", "y")]),
                state("minecraft:stone", &[]),
            ]),
        )]);

        let palette = resolve_palette(&tree).unwrap();
        assert_eq!(palette.len(), 4);
        assert_eq!(palette.indices(), 0..4);
        for (i, entry) in palette.iter().enumerate() {
            assert_eq!(entry.index, i);
        }
        assert!(palette.get(0).unwrap().is_air());
        assert_eq!(palette.get(3).unwrap().type_name, "minecraft:stone");
        assert!(palette.get(4).is_none());
    }

    #[test]
    fn test_air_states() {
        let names = [
            "minecraft:air",
            "minecraft:cave_air",
            "minecraft:void_air",
            "air",
            "minecraft:stone",
            "minecraft:air_block",
            "other:air",
            "minecraft:AIR",
        ];
        let tree = root(vec![(
            "palette",
            Value::List(names.iter().map(|n| state(n, &[])).collect()),
        )]);

        let palette = resolve_palette(&tree).unwrap();
        let air: Vec<bool> = palette.iter().map(|e| e.is_air()).collect();
        assert_eq!(air, [true, true, true, true, false, false, false, false]);
    }

    #[test]
    fn test_properties_are_coerced() {
        let tree = root(vec![(
            "palette",
            Value::List(vec![state(
                "minecraft:repeater",
                &[("delay", "2"), ("powered", "false"), ("facing", "west")],
            )]),
        )]);

        let palette = resolve_palette(&tree).unwrap();
        let props = &palette.get(0).unwrap().properties;
        assert_eq!(props["delay"], PropertyValue::Int(2));
        assert_eq!(props["powered"], PropertyValue::Bool(false));
        assert_eq!(props["facing"], PropertyValue::String("west".to_string()));
    }

    #[test]
    fn test_numeric_property_tags_are_flattened() {
        let mut props = HashMap::new();
        props.insert("level".to_string(), Value::Int(7));
        let mut entry = HashMap::new();
        entry.insert("Name".to_string(), Value::String("minecraft:water".to_string()));
        entry.insert("Properties".to_string(), Value::Compound(props));
        let tree = root(vec![("palette", Value::List(vec![Value::Compound(entry)]))]);

        let palette = resolve_palette(&tree).unwrap();
        assert_eq!(palette.get(0).unwrap().properties["level"], PropertyValue::Int(7));
    }

    #[test]
    fn test_first_of_multiple_palettes() {
        let tree = root(vec![(
            "palettes",
            Value::List(vec![
                Value::List(vec![state("minecraft:dirt", &[])]),
                Value::List(vec![state("minecraft:sand", &[])]),
            ]),
        )]);

        let palette = resolve_palette(&tree).unwrap();
        assert_eq!(palette.len(), 1);
        assert_eq!(palette.get(0).unwrap().type_name, "minecraft:dirt");
    }

    #[test]
    fn test_empty_palette_list() {
        let tree = root(vec![("palette", Value::List(vec![]))]);
        let palette = resolve_palette(&tree).unwrap();
        assert!(palette.is_empty());
    }

    #[test]
    fn test_malformed_palettes() {
        let missing = root(vec![("blocks", Value::List(vec![]))]);
        assert!(resolve_palette(&missing).unwrap_err().is_malformed());

        let not_a_list = root(vec![("palette", Value::Int(3))]);
        assert!(resolve_palette(&not_a_list).unwrap_err().is_malformed());

        let no_name = root(vec![(
            "palette",
            Value::List(vec![Value::Compound(HashMap::new())]),
        )]);
        assert!(resolve_palette(&no_name).unwrap_err().is_malformed());

        let numeric_name = root(vec![(
            "palette",
            Value::List(vec![root(vec![("Name", Value::Int(1))])]),
        )]);
        assert!(resolve_palette(&numeric_name).unwrap_err().is_malformed());

        let nested_property = root(vec![(
            "palette",
            Value::List(vec![root(vec![
                ("Name", Value::String("minecraft:chest".to_string())),
                ("Properties", root(vec![("inner", Value::List(vec![]))])),
            ])]),
        )]);
        assert!(resolve_palette(&nested_property).unwrap_err().is_malformed());

        assert!(resolve_palette(&Value::Int(0)).unwrap_err().is_malformed());
    }
}
