//! Shared types used throughout the library.

mod direction;

pub use direction::Direction;

/// A block position in 3D space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockPosition {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPosition {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Get the neighboring position in the given direction, `None` past the edge of `i32` space.
    pub fn neighbor(&self, direction: Direction) -> Option<Self> {
        let (dx, dy, dz) = direction.offset();
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            z: self.z.checked_add(dz)?,
        })
    }

    /// Chunk column coordinates (16x16 columns on the XZ plane).
    pub fn chunk(&self) -> (i32, i32) {
        (self.x.div_euclid(16), self.z.div_euclid(16))
    }

    pub fn as_f32(&self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

impl From<[i32; 3]> for BlockPosition {
    fn from([x, y, z]: [i32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl std::fmt::Display for BlockPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingBox {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Box covering every unit cell at the given positions.
    pub fn from_cells(cells: impl Iterator<Item = BlockPosition>) -> Option<Self> {
        let mut min = [i32::MAX; 3];
        let mut max = [i32::MIN; 3];
        let mut has_cells = false;

        for pos in cells {
            has_cells = true;
            let p = [pos.x, pos.y, pos.z];
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }

        if has_cells {
            Some(Self {
                min: [min[0] as f32, min[1] as f32, min[2] as f32],
                max: [max[0] as f32 + 1.0, max[1] as f32 + 1.0, max[2] as f32 + 1.0],
            })
        } else {
            None
        }
    }

    pub fn dimensions(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) * 0.5,
            (self.min[1] + self.max[1]) * 0.5,
            (self.min[2] + self.max[2]) * 0.5,
        ]
    }
}

/// Trait for sources of placed blocks, consumed by the scene builder.
pub trait BlockSource {
    /// The block type this source hands out.
    type Block;

    /// Get the block at a position.
    fn get_block(&self, pos: BlockPosition) -> Option<&Self::Block>;

    /// Iterate over all placed blocks.
    fn iter_blocks(&self) -> Box<dyn Iterator<Item = (BlockPosition, &Self::Block)> + '_>;

    /// Get the bounding box of all blocks, `None` when there are none.
    fn bounds(&self) -> Option<BoundingBox>;

    /// Whether a cell is occupied.
    fn is_occupied(&self, pos: BlockPosition) -> bool {
        self.get_block(pos).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_of_negative_coordinates() {
        assert_eq!(BlockPosition::new(0, 0, 0).chunk(), (0, 0));
        assert_eq!(BlockPosition::new(15, 64, 16).chunk(), (0, 1));
        assert_eq!(BlockPosition::new(-1, 0, -17).chunk(), (-1, -2));
    }

    #[test]
    fn test_bounds_from_cells() {
        let cells = [BlockPosition::new(1, 0, 0), BlockPosition::new(-2, 3, 4)];
        let bounds = BoundingBox::from_cells(cells.into_iter()).unwrap();
        assert_eq!(bounds.min, [-2.0, 0.0, 0.0]);
        assert_eq!(bounds.max, [2.0, 4.0, 5.0]);
        assert_eq!(bounds.dimensions(), [4.0, 4.0, 5.0]);
        assert_eq!(bounds.center(), [0.0, 2.0, 2.5]);

        assert!(BoundingBox::from_cells(std::iter::empty()).is_none());
    }

    #[test]
    fn test_extreme_coordinates() {
        let far = BlockPosition::new(i32::MAX, 0, i32::MIN);
        assert_eq!(far.neighbor(Direction::East), None);
        assert_eq!(far.neighbor(Direction::North), None);
        assert_eq!(far.neighbor(Direction::West), Some(BlockPosition::new(i32::MAX - 1, 0, i32::MIN)));

        let bounds = BoundingBox::from_cells([far].into_iter()).unwrap();
        assert_eq!(bounds.min[2], i32::MIN as f32);
        assert!(bounds.max[0] >= i32::MAX as f32);
    }
}
