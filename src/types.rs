use glam::Mat4;

/// Per-frame scene data for the GPU: camera and lights
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalsUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_position: [f32; 3],
    pub _pad1: f32,
    pub ambient: [f32; 3], // color * intensity
    pub _pad2: f32,
    pub light_position: [f32; 3],
    pub light_range: f32,
    pub light_color: [f32; 3], // color * intensity
    pub _pad3: f32,
}

/// Per-draw data for the GPU: transform and surface color
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub base_color: [f32; 4], // linear rgb, alpha already multiplied by opacity
}

impl ObjectUniform {
    pub fn new(model: Mat4, color: [f32; 3], alpha: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            base_color: [color[0], color[1], color[2], alpha],
        }
    }
}

/// Mesh vertex as uploaded to vertex buffers
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            wgpu::VertexAttribute {
                shader_location: 0,
                offset: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                shader_location: 1,
                offset: 12,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                shader_location: 2,
                offset: 24,
                format: wgpu::VertexFormat::Float32x2,
            },
        ],
    };

    pub const fn new(position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            uv,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<GlobalsUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ObjectUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<GlobalsUniform>(), 128);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 80);
    }

    #[test]
    fn test_vertex_layout_stride() {
        assert_eq!(Vertex::LAYOUT.array_stride, 32);
        assert_eq!(Vertex::LAYOUT.attributes.len(), 3);
    }

    #[test]
    fn test_object_uniform_packs_alpha() {
        let uniform = ObjectUniform::new(Mat4::IDENTITY, [0.1, 0.2, 0.3], 0.9);
        assert_eq!(uniform.base_color, [0.1, 0.2, 0.3, 0.9]);
        assert_eq!(uniform.model, Mat4::IDENTITY.to_cols_array_2d());
    }
}
