use glam::{Mat4, Vec3};

use crate::loaders::ModelData;
use crate::math::AABB;

/// Uniform scale applied to the loaded model
pub const MODEL_SCALE: f32 = 1.155;

/// Depth state forced onto every model mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshState {
    pub depth_test: bool,
    pub depth_write: bool,
    pub render_order: i32,
}

impl Default for MeshState {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            render_order: 0,
        }
    }
}

/// Loaded model, scaled and translated so its bounds are centered on the origin
#[derive(Debug, Clone)]
pub struct Model {
    pub data: ModelData,
    pub scale: f32,
    /// Translation applied after scaling
    pub offset: Vec3,
    pub mesh_states: Vec<MeshState>,
    /// Per-mesh bounds centers in model space
    pub mesh_centers: Vec<Vec3>,
}

impl Model {
    /// Scale, force depth state, and center on the bounding box
    pub fn prepare(data: ModelData) -> Self {
        let scale = MODEL_SCALE;
        let scale_matrix = Mat4::from_scale(Vec3::splat(scale));

        let offset = data
            .bounds()
            .map(|bounds| -bounds.transform(&scale_matrix).center())
            .unwrap_or(Vec3::ZERO);

        let mesh_states = vec![MeshState::default(); data.meshes.len()];
        let mesh_centers = data
            .meshes
            .iter()
            .map(|mesh| mesh.bounds().map(|b| b.center()).unwrap_or(Vec3::ZERO))
            .collect();

        Self {
            data,
            scale,
            offset,
            mesh_states,
            mesh_centers,
        }
    }

    /// Model space to pivot space: translate * scale
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.offset) * Mat4::from_scale(Vec3::splat(self.scale))
    }

    /// Bounds after scaling and centering
    pub fn bounds(&self) -> Option<AABB> {
        self.data.bounds().map(|b| b.transform(&self.local_matrix()))
    }
}

/// Transform node owning the centered model; only its rotation changes
#[derive(Debug, Clone)]
pub struct Pivot {
    /// Euler angles applied in XYZ order
    pub rotation: Vec3,
    model: Model,
}

impl Pivot {
    pub fn new(model: Model) -> Self {
        Self {
            rotation: Vec3::ZERO,
            model,
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    /// The pivot sits at the world origin
    pub fn position(&self) -> Vec3 {
        Vec3::ZERO
    }

    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z)
    }

    /// Full transform for the model meshes
    pub fn model_matrix(&self) -> Mat4 {
        self.world_matrix() * self.model.local_matrix()
    }
}
