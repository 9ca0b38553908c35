use glam::{Mat4, Vec3};

pub const CAMERA_FOV_DEGREES: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 1000.0;
pub const CAMERA_POSITION: Vec3 = Vec3::new(0.0, 2.0, 15.0);

/// Perspective camera with a fixed eye and a look-at target
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// Camera at the default eye, looking down -Z until `look_at` is called
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: CAMERA_POSITION,
            target: CAMERA_POSITION - Vec3::Z,
            fov_y: CAMERA_FOV_DEGREES.to_radians(),
            aspect: aspect_ratio(width, height),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
        }
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Track a new surface size; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = aspect_ratio(width, height);
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Distance along the view direction, used to sort blended draws
    pub fn view_depth(&self, point: Vec3) -> f32 {
        -self.view().transform_point3(point).z
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    if height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}
