use glam::Vec3;

use crate::camera::Camera;
use crate::math::hex_to_linear;
use crate::types::GlobalsUniform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: u32,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: u32,
    pub intensity: f32,
    /// Distance at which the light fades out completely
    pub range: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub ambient: AmbientLight,
    pub point: PointLight,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: 0x404040,
                intensity: 1.5,
            },
            point: PointLight {
                color: 0xffffff,
                intensity: 1.0,
                range: 100.0,
                position: Vec3::new(3.0, 5.0, 3.0),
            },
        }
    }
}

fn radiance(color: u32, intensity: f32) -> [f32; 3] {
    hex_to_linear(color).map(|c| c * intensity)
}

/// Camera and lights packed for the GPU
pub fn globals_uniform(camera: &Camera, lights: &Lights) -> GlobalsUniform {
    GlobalsUniform {
        view_proj: camera.view_proj().to_cols_array_2d(),
        camera_position: camera.position.to_array(),
        _pad1: 0.0,
        ambient: radiance(lights.ambient.color, lights.ambient.intensity),
        _pad2: 0.0,
        light_position: lights.point.position.to_array(),
        light_range: lights.point.range,
        light_color: radiance(lights.point.color, lights.point.intensity),
        _pad3: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lights() {
        let lights = Lights::default();
        assert_eq!(lights.ambient.color, 0x404040);
        assert_eq!(lights.ambient.intensity, 1.5);
        assert_eq!(lights.point.position, Vec3::new(3.0, 5.0, 3.0));
        assert_eq!(lights.point.range, 100.0);
    }

    #[test]
    fn test_globals_scale_by_intensity() {
        let camera = Camera::new(800, 600);
        let globals = globals_uniform(&camera, &Lights::default());

        let grey = hex_to_linear(0x404040)[0];
        for c in globals.ambient {
            assert!((c - grey * 1.5).abs() < 1e-6);
        }
        for c in globals.light_color {
            assert!((c - 1.0).abs() < 1e-6);
        }
        assert_eq!(globals.light_range, 100.0);
        assert_eq!(globals.camera_position, [0.0, 2.0, 15.0]);
    }
}
