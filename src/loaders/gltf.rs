use anyhow::{Context, Result};
use glam::{Mat3, Mat4, Vec3};
use log::{debug, info, warn};
use std::path::Path;

use crate::math::AABB;
use crate::types::Vertex;

/// CPU-side model: every mesh primitive flattened into model space
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    pub textures: Vec<TextureData>,
}

/// One glTF primitive with the node hierarchy transform baked in
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: Option<String>,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: MaterialData,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    /// Linear RGBA base color factor
    pub base_color: [f32; 4],
    /// Index into `ModelData::textures`
    pub texture: Option<usize>,
    pub double_sided: bool,
    pub blend: bool,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            texture: None,
            double_sided: false,
            blend: false,
        }
    }
}

/// Texture data loaded from glTF
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGBA8
}

impl MeshData {
    /// Bounds of the mesh vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<AABB> {
        AABB::from_points(self.vertices.iter().map(|v| Vec3::from_array(v.position)))
    }
}

impl ModelData {
    /// Union of every mesh's bounds, `None` when the model has no geometry
    pub fn bounds(&self) -> Option<AABB> {
        self.meshes
            .iter()
            .filter_map(MeshData::bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.indices.len() / 3).sum()
    }
}

/// Loads `file` from `dir`, the way a loader with a base path resolves assets
pub fn load_model(dir: impl AsRef<Path>, file: impl AsRef<Path>) -> Result<ModelData> {
    let path = dir.as_ref().join(file.as_ref());
    load_model_file(&path)
}

/// Loads a glTF file and flattens its default scene into meshes
pub fn load_model_file(path: impl AsRef<Path>) -> Result<ModelData> {
    let path = path.as_ref();
    info!("Loading glTF file: {:?}", path);

    let (gltf, buffers, images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;

    debug!(
        "glTF contents: {} scenes, {} nodes, {} meshes, {} materials, {} images",
        gltf.scenes().count(),
        gltf.nodes().count(),
        gltf.meshes().count(),
        gltf.materials().count(),
        images.len()
    );

    let textures: Vec<TextureData> = images.iter().map(convert_image).collect();

    let mut meshes = Vec::new();
    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .context("glTF file contains no scenes")?;

    for node in scene.nodes() {
        process_node(&node, &buffers, &Mat4::IDENTITY, &mut meshes)?;
    }

    let model = ModelData { meshes, textures };
    info!(
        "Model loaded: {} meshes, {} vertices, {} triangles, {} textures",
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count(),
        model.textures.len()
    );

    Ok(model)
}

/// Converts any 8-bit glTF image to RGBA8
fn convert_image(image: &gltf::image::Data) -> TextureData {
    let rgba = match image.format {
        gltf::image::Format::R8G8B8A8 => image.pixels.clone(),
        gltf::image::Format::R8G8B8 => image
            .pixels
            .chunks(3)
            .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
            .collect(),
        gltf::image::Format::R8G8 => image
            .pixels
            .chunks(2)
            .flat_map(|rg| [rg[0], rg[1], 0, 255])
            .collect(),
        gltf::image::Format::R8 => image
            .pixels
            .iter()
            .flat_map(|&l| [l, l, l, 255])
            .collect(),
        other => {
            warn!("Unsupported texture format {:?}, using white", other);
            vec![255; (image.width * image.height * 4) as usize]
        }
    };

    TextureData {
        width: image.width,
        height: image.height,
        data: rgba,
    }
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    meshes: &mut Vec<MeshData>,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, meshes)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, meshes)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    meshes: &mut Vec<MeshData>,
) -> Result<()> {
    let normal_matrix = Mat3::from_mat4(*transform).inverse().transpose();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            debug!("Skipping non-triangle primitive in mesh {:?}", mesh.name());
            continue;
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(|p| transform.transform_point3(Vec3::from_array(p)))
            .collect();

        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let normals: Vec<Vec3> = match reader.read_normals() {
            Some(normals) => normals
                .map(|n| (normal_matrix * Vec3::from_array(n)).normalize_or_zero())
                .collect(),
            None => flat_normals(&positions, &indices),
        };

        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        let vertices = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                Vertex::new(
                    p.to_array(),
                    normals.get(i).copied().unwrap_or(Vec3::Y).to_array(),
                    uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                )
            })
            .collect();

        meshes.push(MeshData {
            name: mesh.name().map(str::to_string),
            vertices,
            indices: whole_triangles(indices, positions.len()),
            material: material_data(&primitive.material()),
        });
    }

    Ok(())
}

fn material_data(material: &gltf::Material) -> MaterialData {
    let pbr = material.pbr_metallic_roughness();

    MaterialData {
        base_color: pbr.base_color_factor(),
        texture: pbr.base_color_texture().map(|info| info.texture().source().index()),
        double_sided: material.double_sided(),
        blend: material.alpha_mode() == gltf::material::AlphaMode::Blend,
    }
}

/// Drops trailing indices and triangles that reference missing vertices
fn whole_triangles(indices: Vec<u32>, vertex_count: usize) -> Vec<u32> {
    indices
        .chunks_exact(3)
        .filter(|tri| tri.iter().all(|&i| (i as usize) < vertex_count))
        .flatten()
        .copied()
        .collect()
}

/// Area-weighted face normals accumulated per vertex
pub fn flat_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals.iter().map(|n| n.normalize_or(Vec3::Y)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_normals_single_triangle() {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let normals = flat_normals(&positions, &[0, 1, 2]);
        for n in normals {
            assert!((n - Vec3::Z).length() < 1e-6);
        }
    }

    #[test]
    fn test_flat_normals_unused_vertex_defaults_up() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(5.0, 5.0, 5.0)];
        let normals = flat_normals(&positions, &[0, 1, 2]);
        assert_eq!(normals[3], Vec3::Y);
    }

    #[test]
    fn test_whole_triangles_drops_partial_and_out_of_range() {
        let indices = whole_triangles(vec![0, 1, 2, 2, 1, 9, 0, 1], 3);
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_model_bounds() {
        let model = ModelData {
            meshes: vec![MeshData {
                name: None,
                vertices: vec![
                    Vertex::new([-1.0, 0.0, 2.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
                    Vertex::new([3.0, 4.0, -2.0], [0.0, 1.0, 0.0], [0.0, 0.0]),
                ],
                indices: vec![],
                material: MaterialData::default(),
            }],
            textures: vec![],
        };

        let bounds = model.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, -2.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 4.0, 2.0));
    }

    #[test]
    fn test_model_bounds_span_every_mesh() {
        let mesh = |a: [f32; 3], b: [f32; 3]| MeshData {
            name: None,
            vertices: vec![
                Vertex::new(a, [0.0, 1.0, 0.0], [0.0, 0.0]),
                Vertex::new(b, [0.0, 1.0, 0.0], [0.0, 0.0]),
            ],
            indices: vec![],
            material: MaterialData::default(),
        };
        let model = ModelData {
            meshes: vec![
                mesh([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]),
                mesh([-5.0, 2.0, 0.5], [-4.0, 3.0, 6.0]),
            ],
            textures: vec![],
        };

        assert_eq!(model.meshes[1].bounds().unwrap().center(), Vec3::new(-4.5, 2.5, 3.25));

        let bounds = model.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-5.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 3.0, 6.0));
    }

    #[test]
    fn test_empty_model_has_no_bounds() {
        assert!(ModelData::default().bounds().is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_model("definitely/not/here", "scene.gltf");
        assert!(result.is_err());
    }
}
