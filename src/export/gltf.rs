//! glTF/GLB export.

use crate::error::{ConverterError, Result};
use crate::scene::{Mesh, Scene};
use base64::Engine;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;

const GENERATOR: &str = concat!("schematic-converter ", env!("CARGO_PKG_VERSION"));

/// Export a scene as a glTF JSON document with the geometry buffer embedded
/// as a base64 data URI.
pub fn export_gltf(scene: &Scene) -> Result<String> {
    let (mut root, buffer_data) = build_document(scene);
    if let Some(buffer) = root.buffers.first_mut() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&buffer_data);
        buffer.uri = Some(format!("data:application/octet-stream;base64,{}", encoded));
    }

    json::serialize::to_string(&root)
        .map_err(|e| ConverterError::Export(format!("Failed to serialize glTF JSON: {}", e)))
}

/// Export a scene as binary glTF (GLB).
pub fn export_glb(scene: &Scene) -> Result<Vec<u8>> {
    let (root, buffer_data) = build_document(scene);

    let json_string = json::serialize::to_string(&root)
        .map_err(|e| ConverterError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;
    let json_bytes = json_string.as_bytes();

    // Pad JSON to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;

    // Pad buffer to 4-byte alignment
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    // The BIN chunk is omitted when the scene has no geometry
    let bin_chunk_len = if buffer_data.is_empty() { 0 } else { 8 + padded_buffer_len };
    let total_size = 12 + 8 + padded_json_len + bin_chunk_len;

    let mut glb = Vec::with_capacity(total_size);

    // GLB Header
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total_size as u32).to_le_bytes());

    // JSON Chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes());
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.extend(std::iter::repeat(0x20u8).take(json_padding));

    // BIN Chunk
    if !buffer_data.is_empty() {
        glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes());
        glb.extend_from_slice(&0x004E4942u32.to_le_bytes());
        glb.extend_from_slice(&buffer_data);
        glb.extend(std::iter::repeat(0u8).take(buffer_padding));
    }

    Ok(glb)
}

/// Byte ranges of one mesh inside the shared buffer.
struct MeshOffsets {
    pos: (usize, usize),
    norm: (usize, usize),
    color: (usize, usize),
    idx: (usize, usize),
    vertex_count: usize,
    index_count: usize,
    bounds: ([f32; 3], [f32; 3]),
}

fn write_mesh(buffer: &mut Vec<u8>, mesh: &Mesh) -> Option<MeshOffsets> {
    let bounds = mesh.position_bounds()?;

    let mut append = |bytes: &[u8]| {
        let start = buffer.len();
        buffer.extend_from_slice(bytes);
        (start, bytes.len())
    };

    let pos = append(cast_slice(&mesh.positions_flat()));
    let norm = append(cast_slice(&mesh.normals_flat()));
    let color = append(cast_slice(&mesh.colors_flat()));
    let idx = append(cast_slice(&mesh.indices));

    Some(MeshOffsets {
        pos,
        norm,
        color,
        idx,
        vertex_count: mesh.vertex_count(),
        index_count: mesh.indices.len(),
        bounds,
    })
}

/// Build the glTF document and its binary buffer. The buffer URI is left unset.
fn build_document(scene: &Scene) -> (json::Root, Vec<u8>) {
    let mut buffer_data: Vec<u8> = Vec::new();
    let opaque = write_mesh(&mut buffer_data, &scene.opaque_mesh);
    let transparent = write_mesh(&mut buffer_data, &scene.transparent_mesh);

    let mut accessors = Vec::new();
    let mut buffer_views = Vec::new();
    let mut primitives = Vec::new();

    // Material 0: opaque, material 1: blended
    let materials = vec![
        create_material(json::material::AlphaMode::Opaque),
        create_material(json::material::AlphaMode::Blend),
    ];

    for (offsets, material) in [(opaque, 0u32), (transparent, 1u32)] {
        if let Some(offsets) = offsets {
            add_mesh_primitive(&offsets, material, &mut buffer_views, &mut accessors, &mut primitives);
        }
    }

    let camera = &scene.camera;
    let mut nodes = vec![json::Node {
        camera: Some(json::Index::new(0)),
        children: None,
        extensions: Default::default(),
        extras: Default::default(),
        matrix: None,
        mesh: None,
        rotation: Some(json::scene::UnitQuaternion(camera.rotation)),
        scale: None,
        translation: Some(camera.translation),
        skin: None,
        weights: None,
    }];

    let mut meshes = Vec::new();
    if !primitives.is_empty() {
        meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            primitives,
            weights: None,
        });
        nodes.push(json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(0)),
            rotation: None,
            scale: None,
            translation: None,
            skin: None,
            weights: None,
        });
    }

    let buffers = if buffer_data.is_empty() {
        Vec::new()
    } else {
        vec![json::Buffer {
            byte_length: USize64(buffer_data.len() as u64),
            extensions: Default::default(),
            extras: Default::default(),
            uri: None,
        }]
    };

    let scene_nodes = (0..nodes.len() as u32).map(json::Index::new).collect();

    let root = json::Root {
        asset: json::Asset {
            generator: Some(GENERATOR.to_string()),
            ..Default::default()
        },
        accessors,
        buffers,
        buffer_views,
        cameras: vec![json::Camera {
            type_: Valid(json::camera::Type::Perspective),
            orthographic: None,
            perspective: Some(json::camera::Perspective {
                aspect_ratio: Some(camera.aspect_ratio),
                yfov: camera.yfov,
                zfar: Some(camera.zfar),
                znear: camera.znear,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            extensions: Default::default(),
            extras: Default::default(),
        }],
        materials,
        meshes,
        nodes,
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            nodes: scene_nodes,
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    (root, buffer_data)
}

/// Add buffer views, accessors, and a primitive for one mesh.
fn add_mesh_primitive(
    offsets: &MeshOffsets,
    material: u32,
    buffer_views: &mut Vec<json::buffer::View>,
    accessors: &mut Vec<json::Accessor>,
    primitives: &mut Vec<json::mesh::Primitive>,
) {
    use json::accessor::{ComponentType, Type};
    use json::buffer::Target;

    let accessor_start = accessors.len() as u32;
    let attributes = [
        (offsets.pos, Type::Vec3, offsets.vertex_count, Some(offsets.bounds)),
        (offsets.norm, Type::Vec3, offsets.vertex_count, None),
        (offsets.color, Type::Vec4, offsets.vertex_count, None),
    ];

    for ((offset, len), type_, count, bounds) in attributes {
        let view = buffer_views.len() as u32;
        buffer_views.push(create_buffer_view(offset, len, Target::ArrayBuffer));
        accessors.push(create_accessor(view, count, type_, ComponentType::F32, bounds));
    }

    let view = buffer_views.len() as u32;
    buffer_views.push(create_buffer_view(offsets.idx.0, offsets.idx.1, Target::ElementArrayBuffer));
    accessors.push(create_accessor(view, offsets.index_count, Type::Scalar, ComponentType::U32, None));

    primitives.push(create_primitive(accessor_start, accessor_start + 3, material));
}

/// Create a buffer view.
fn create_buffer_view(offset: usize, size: usize, target: json::buffer::Target) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        target: Some(Valid(target)),
    }
}

/// Create an accessor.
fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    bounds: Option<([f32; 3], [f32; 3])>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: bounds.map(|(min, _)| json::Value::from(min.to_vec())),
        max: bounds.map(|(_, max)| json::Value::from(max.to_vec())),
        normalized: false,
        sparse: None,
    }
}

/// Create a primitive. Attribute accessors follow `positions_accessor` in
/// position, normal, color order.
fn create_primitive(positions_accessor: u32, indices_accessor: u32, material: u32) -> json::mesh::Primitive {
    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(positions_accessor),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Normals),
        json::Index::new(positions_accessor + 1),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Colors(0)),
        json::Index::new(positions_accessor + 2),
    );

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(indices_accessor)),
        material: Some(json::Index::new(material)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

/// Untextured material; the block colors come from the vertex colors.
fn create_material(alpha_mode: json::material::AlphaMode) -> json::Material {
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: None,
            base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, 1.0]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(alpha_mode),
        alpha_cutoff: None,
        double_sided: false,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}

/// Cast a slice of plain numbers to its bytes.
fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    let ptr = slice.as_ptr() as *const u8;
    let len = std::mem::size_of_val(slice);
    // SAFETY: only called with f32/u32 slices, which have no padding or invalid bit patterns.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{build_scene, SceneConfig};
    use crate::schematic::Properties;
    use crate::types::BlockPosition;
    use crate::world::{Block, VoxelWorld};

    fn scene(blocks: &[([i32; 3], &str)]) -> Scene {
        let mut world = VoxelWorld::new();
        for (pos, name) in blocks {
            world.set_block(BlockPosition::from(*pos), Block::new(1, *name, Properties::new()));
        }
        build_scene(&world, &SceneConfig::default())
    }

    #[test]
    fn test_gltf_document_structure() {
        let scene = scene(&[([0, 0, 0], "minecraft:stone"), ([0, 1, 0], "minecraft:glass")]);
        let text = export_gltf(&scene).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(doc["asset"]["version"], "2.0");
        assert_eq!(doc["meshes"][0]["primitives"].as_array().unwrap().len(), 2);
        assert_eq!(doc["cameras"][0]["type"], "perspective");
        assert_eq!(doc["scenes"][0]["nodes"].as_array().unwrap().len(), 2);

        let uri = doc["buffers"][0]["uri"].as_str().unwrap();
        let payload = uri.strip_prefix("data:application/octet-stream;base64,").unwrap();
        let bytes = base64::engine::general_purpose::STANDARD.decode(payload).unwrap();
        assert_eq!(bytes.len() as u64, doc["buffers"][0]["byteLength"].as_u64().unwrap());

        // opaque cube: 5 visible faces -> 20 vertices
        assert_eq!(doc["accessors"][0]["count"], 20);
        assert_eq!(doc["accessors"][0]["min"], serde_json::json!([0.0, 0.0, 0.0]));
        assert_eq!(doc["accessors"][0]["max"], serde_json::json!([1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_glb_header() {
        let glb = export_glb(&scene(&[([0, 0, 0], "minecraft:stone")])).unwrap();

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(u32::from_le_bytes([glb[4], glb[5], glb[6], glb[7]]), 2);
        assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize, glb.len());
        assert_eq!(glb.len() % 4, 0);
    }

    #[test]
    fn test_empty_scene_exports_camera_only() {
        let empty = scene(&[]);

        let doc: serde_json::Value = serde_json::from_str(&export_gltf(&empty).unwrap()).unwrap();
        assert!(doc.get("buffers").map_or(true, |b| b.as_array().unwrap().is_empty()));
        assert!(doc.get("meshes").map_or(true, |m| m.as_array().unwrap().is_empty()));
        assert_eq!(doc["nodes"].as_array().unwrap().len(), 1);

        let glb = export_glb(&empty).unwrap();
        assert_eq!(u32::from_le_bytes([glb[8], glb[9], glb[10], glb[11]]) as usize, glb.len());
    }
}
