//! Scene construction from a voxel world.
//!
//! Each block becomes a flat-colored unit cube. Faces between two occupied
//! cells are culled when enabled, and a perspective camera framing the
//! blocks is added for viewers that honour it.

pub mod color;
pub mod geometry;

pub use color::block_color;
pub use geometry::{Mesh, Vertex};

use crate::config::ConverterConfig;
use crate::types::{BlockPosition, BlockSource, BoundingBox, Direction};
use crate::world::Block;
use glam::{Mat4, Vec3};

/// Vertical field of view of the scene camera, in degrees.
pub const CAMERA_FOV_DEGREES: f32 = 75.0;

/// Scene construction options.
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Chunk radius around `center`; blocks in chunks further away are left out.
    pub view_distance: Option<u32>,
    /// Centre for the view distance. Defaults to the centre of the world bounds.
    pub center: Option<BlockPosition>,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Skip faces shared with an occupied neighbour.
    pub cull_hidden_faces: bool,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::from(&ConverterConfig::default())
    }
}

impl From<&ConverterConfig> for SceneConfig {
    fn from(config: &ConverterConfig) -> Self {
        Self {
            view_distance: config.view_distance,
            center: None,
            canvas_width: config.canvas_width,
            canvas_height: config.canvas_height,
            cull_hidden_faces: config.cull_hidden_faces,
        }
    }
}

/// A perspective camera.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub translation: [f32; 3],
    /// Rotation quaternion (x, y, z, w).
    pub rotation: [f32; 4],
    /// Vertical field of view in radians.
    pub yfov: f32,
    pub aspect_ratio: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    /// Camera at `eye` looking at `target`, Y up.
    pub fn looking_at(eye: [f32; 3], target: [f32; 3], aspect_ratio: f32) -> Self {
        let view = Mat4::look_at_rh(Vec3::from(eye), Vec3::from(target), Vec3::Y);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        Self {
            translation: eye,
            rotation: rotation.to_array(),
            yfov: CAMERA_FOV_DEGREES.to_radians(),
            aspect_ratio,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

/// The renderable scene.
#[derive(Debug, Clone)]
pub struct Scene {
    /// Geometry of fully opaque blocks.
    pub opaque_mesh: Mesh,
    /// Geometry of see-through blocks (color alpha below 1).
    pub transparent_mesh: Mesh,
    pub camera: Camera,
    /// Bounds of the blocks in the scene.
    pub bounds: Option<BoundingBox>,
    /// Number of blocks turned into geometry.
    pub block_count: usize,
}

/// Build a scene from placed blocks.
pub fn build_scene<S>(source: &S, config: &SceneConfig) -> Scene
where
    S: BlockSource<Block = Block> + ?Sized,
{
    let center = config.center.or_else(|| {
        source.bounds().map(|b| {
            let c = b.center();
            BlockPosition::new(c[0].floor() as i32, c[1].floor() as i32, c[2].floor() as i32)
        })
    });
    let in_view = |pos: &BlockPosition| match (config.view_distance, center) {
        (Some(radius), Some(center)) => {
            let (cx, cz) = center.chunk();
            let (x, z) = pos.chunk();
            (x - cx).unsigned_abs() <= radius && (z - cz).unsigned_abs() <= radius
        }
        _ => true,
    };

    let mut opaque_mesh = Mesh::new();
    let mut transparent_mesh = Mesh::new();
    let mut placed = Vec::new();

    for (pos, block) in source.iter_blocks() {
        if !in_view(&pos) {
            continue;
        }
        placed.push(pos);

        let color = block_color(block);
        let mesh = if color[3] < 1.0 {
            &mut transparent_mesh
        } else {
            &mut opaque_mesh
        };
        let origin = pos.as_f32();
        for direction in Direction::ALL {
            let hidden = pos
                .neighbor(direction)
                .is_some_and(|n| source.is_occupied(n) && in_view(&n));
            if config.cull_hidden_faces && hidden {
                continue;
            }
            add_face(mesh, origin, direction, color);
        }
    }

    let bounds = BoundingBox::from_cells(placed.iter().copied());
    let aspect_ratio = config.canvas_width.max(1) as f32 / config.canvas_height.max(1) as f32;
    let camera = frame_camera(bounds.as_ref(), aspect_ratio);

    tracing::debug!(
        blocks = placed.len(),
        opaque_triangles = opaque_mesh.triangle_count(),
        transparent_triangles = transparent_mesh.triangle_count(),
        "built scene"
    );

    Scene {
        opaque_mesh,
        transparent_mesh,
        camera,
        bounds,
        block_count: placed.len(),
    }
}

impl Scene {
    /// Whether the scene has no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.opaque_mesh.is_empty() && self.transparent_mesh.is_empty()
    }

    pub fn total_vertices(&self) -> usize {
        self.opaque_mesh.vertex_count() + self.transparent_mesh.vertex_count()
    }

    pub fn total_triangles(&self) -> usize {
        self.opaque_mesh.triangle_count() + self.transparent_mesh.triangle_count()
    }
}

fn add_face(mesh: &mut Mesh, origin: [f32; 3], direction: Direction, color: [f32; 4]) {
    let normal = direction.normal();
    let [i0, i1, i2, i3] = direction.face_corners().map(|corner| {
        let position = [origin[0] + corner[0], origin[1] + corner[1], origin[2] + corner[2]];
        mesh.add_vertex(Vertex::new(position, normal).with_color(color))
    });
    mesh.add_quad(i0, i1, i2, i3);
}

/// Place the camera diagonally above the bounds, far enough to fit them.
fn frame_camera(bounds: Option<&BoundingBox>, aspect_ratio: f32) -> Camera {
    let Some(bounds) = bounds else {
        return Camera::looking_at([0.0, 0.0, 5.0], [0.0, 0.0, 0.0], aspect_ratio);
    };

    let target = Vec3::from(bounds.center());
    let radius = Vec3::from(bounds.dimensions()).length() * 0.5;
    let fov = CAMERA_FOV_DEGREES.to_radians().min(CAMERA_FOV_DEGREES.to_radians() * aspect_ratio);
    let distance = (radius / (fov * 0.5).tan()).max(5.0);
    let eye = target + Vec3::new(1.0, 0.8, 1.0).normalize() * distance;

    Camera::looking_at(eye.to_array(), target.to_array(), aspect_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schematic::Properties;
    use crate::world::VoxelWorld;

    fn world(cells: &[[i32; 3]]) -> VoxelWorld {
        let mut world = VoxelWorld::new();
        for cell in cells {
            world.set_block(BlockPosition::from(*cell), Block::new(1, "minecraft:stone", Properties::new()));
        }
        world
    }

    #[test]
    fn test_single_cube() {
        let scene = build_scene(&world(&[[0, 0, 0]]), &SceneConfig::default());
        assert_eq!(scene.block_count, 1);
        assert_eq!(scene.opaque_mesh.vertex_count(), 24);
        assert_eq!(scene.total_triangles(), 12);
        assert!(scene.transparent_mesh.is_empty());
        assert_eq!(scene.opaque_mesh.position_bounds(), Some(([0.0; 3], [1.0; 3])));
    }

    #[test]
    fn test_shared_faces_culled() {
        let cells = [[0, 0, 0], [1, 0, 0]];
        let culled = build_scene(&world(&cells), &SceneConfig::default());
        assert_eq!(culled.total_triangles(), 20);

        let config = SceneConfig {
            cull_hidden_faces: false,
            ..Default::default()
        };
        let unculled = build_scene(&world(&cells), &config);
        assert_eq!(unculled.total_triangles(), 24);
    }

    #[test]
    fn test_view_distance_filters_chunks() {
        let cells = [[0, 0, 0], [17, 0, 0], [40, 0, 0]];
        let config = SceneConfig {
            view_distance: Some(1),
            center: Some(BlockPosition::new(0, 0, 0)),
            ..Default::default()
        };
        let scene = build_scene(&world(&cells), &config);
        assert_eq!(scene.block_count, 2);
        assert_eq!(scene.bounds.unwrap().max, [18.0, 1.0, 1.0]);
    }

    #[test]
    fn test_see_through_blocks_go_to_transparent_mesh() {
        let mut world = world(&[[0, 0, 0]]);
        world.set_block(BlockPosition::new(0, 1, 0), Block::new(0, "minecraft:glass", Properties::new()));

        let scene = build_scene(&world, &SceneConfig::default());
        assert_eq!(scene.block_count, 2);
        assert_eq!(scene.opaque_mesh.triangle_count(), 10);
        assert_eq!(scene.transparent_mesh.triangle_count(), 10);
    }

    #[test]
    fn test_empty_world() {
        let scene = build_scene(&VoxelWorld::new(), &SceneConfig::default());
        assert!(scene.is_empty());
        assert!(scene.bounds.is_none());
        assert_eq!(scene.camera.translation, [0.0, 0.0, 5.0]);
    }

    #[test]
    fn test_camera_aspect_and_position() {
        let config = SceneConfig {
            canvas_width: 640,
            canvas_height: 480,
            ..Default::default()
        };
        let scene = build_scene(&world(&[[0, 0, 0], [9, 9, 9]]), &config);
        assert!((scene.camera.aspect_ratio - 640.0 / 480.0).abs() < 1e-6);

        let bounds = scene.bounds.unwrap();
        let eye = scene.camera.translation;
        assert!(eye[1] > bounds.max[1]);

        let q = scene.camera.rotation;
        let norm = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
