//! Flat block colors.
//!
//! The scene carries no textures, so each block gets one RGBA color:
//! dyed blocks use their dye color, common materials use a fixed table and
//! everything else gets a stable color derived from its name.

use crate::world::Block;

/// The sixteen dye colors, by name.
const DYE_COLORS: [(&str, [f32; 4]); 16] = [
    ("white", [0.92, 0.93, 0.93, 1.0]),
    ("orange", [0.94, 0.46, 0.08, 1.0]),
    ("magenta", [0.74, 0.27, 0.71, 1.0]),
    ("light_blue", [0.23, 0.69, 0.85, 1.0]),
    ("yellow", [0.97, 0.78, 0.15, 1.0]),
    ("lime", [0.44, 0.73, 0.10, 1.0]),
    ("pink", [0.93, 0.55, 0.67, 1.0]),
    ("gray", [0.24, 0.27, 0.28, 1.0]),
    ("light_gray", [0.56, 0.56, 0.53, 1.0]),
    ("cyan", [0.08, 0.54, 0.57, 1.0]),
    ("purple", [0.48, 0.16, 0.67, 1.0]),
    ("blue", [0.21, 0.22, 0.62, 1.0]),
    ("brown", [0.45, 0.28, 0.16, 1.0]),
    ("green", [0.33, 0.43, 0.11, 1.0]),
    ("red", [0.63, 0.15, 0.13, 1.0]),
    ("black", [0.08, 0.08, 0.10, 1.0]),
];

/// Colors for common materials, matched against the un-namespaced block id.
const MATERIAL_COLORS: [(&str, [f32; 4]); 14] = [
    ("stone", [0.49, 0.49, 0.49, 1.0]),
    ("cobblestone", [0.45, 0.45, 0.45, 1.0]),
    ("dirt", [0.53, 0.38, 0.26, 1.0]),
    ("grass_block", [0.37, 0.62, 0.21, 1.0]),
    ("sand", [0.86, 0.81, 0.64, 1.0]),
    ("gravel", [0.51, 0.48, 0.47, 1.0]),
    ("water", [0.25, 0.46, 0.89, 0.7]),
    ("lava", [0.91, 0.42, 0.05, 1.0]),
    ("glass", [0.75, 0.86, 0.90, 0.4]),
    ("oak_planks", [0.64, 0.51, 0.31, 1.0]),
    ("oak_log", [0.43, 0.34, 0.20, 1.0]),
    ("oak_leaves", [0.28, 0.52, 0.14, 1.0]),
    ("bricks", [0.59, 0.38, 0.33, 1.0]),
    ("snow_block", [0.97, 0.99, 0.99, 1.0]),
];

/// Pick the display color for a block.
pub fn block_color(block: &Block) -> [f32; 4] {
    if let Some(color) = block
        .properties
        .get("color")
        .and_then(|c| c.as_str())
        .and_then(dye_color)
    {
        return color;
    }

    let id = block.block_id();
    if let Some((_, color)) = MATERIAL_COLORS.iter().find(|(name, _)| *name == id) {
        return *color;
    }

    // "red_wool", "light_blue_stained_glass", ... The longest dye prefix wins
    // so "light_gray_" is not read as "light_".
    if let Some((_, color)) = DYE_COLORS
        .iter()
        .filter(|(dye, _)| id.strip_prefix(dye).is_some_and(|rest| rest.starts_with('_')))
        .max_by_key(|(dye, _)| dye.len())
    {
        return *color;
    }

    hashed_color(&block.name)
}

fn dye_color(name: &str) -> Option<[f32; 4]> {
    DYE_COLORS.iter().find(|(dye, _)| *dye == name).map(|(_, c)| *c)
}

/// A stable, fairly saturated color from a name (FNV-1a hash to hue).
fn hashed_color(name: &str) -> [f32; 4] {
    let hash = name
        .bytes()
        .fold(0x811c_9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
    let hue = (hash % 360) as f32;
    let [r, g, b] = hsv_to_rgb(hue, 0.55, 0.8);
    [r, g, b, 1.0]
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> [f32; 3] {
    let c = value * saturation;
    let h = hue / 60.0;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = value - c;
    [r + m, g + m, b + m]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::{coerce_value, Properties};

    fn block(name: &str, props: &[(&str, &str)]) -> Block {
        let properties: Properties = props
            .iter()
            .map(|(k, v)| (k.to_string(), coerce_value(v)))
            .collect();
        Block::new(0, name, properties)
    }

    #[test]
    fn test_color_property_wins() {
        let red = dye_color("red").unwrap();
        assert_eq!(block_color(&block("minecraft:wool", &[("color", "red")])), red);
        assert_eq!(block_color(&block("minecraft:red_wool", &[])), red);
    }

    #[test]
    fn test_longest_dye_prefix() {
        let light_gray = dye_color("light_gray").unwrap();
        assert_eq!(block_color(&block("minecraft:light_gray_concrete", &[])), light_gray);
        assert_ne!(block_color(&block("minecraft:gray_concrete", &[])), light_gray);
    }

    #[test]
    fn test_material_table() {
        assert_eq!(block_color(&block("minecraft:stone", &[])), [0.49, 0.49, 0.49, 1.0]);
    }

    #[test]
    fn test_hashed_colors_are_stable() {
        let a = block_color(&block("create:cogwheel", &[]));
        let b = block_color(&block("create:cogwheel", &[]));
        assert_eq!(a, b);
        for channel in a {
            assert!((0.0..=1.0).contains(&channel));
        }
    }
}
