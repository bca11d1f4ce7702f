use glam::{Mat4, Vec3};
use palmx_transform::Transform;

/// Perspective camera. Looks down `-Z` of its transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub transform: Transform,
    aspect_ratio: f32,
    fov: f32,
    near: f32,
    far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            transform: Transform::default(),
            aspect_ratio: 4.0 / 3.0,
            fov: 60.0,
            near: 0.1,
            far: 300.0,
        }
    }
}

impl Camera {
    /// `fov` is the vertical field of view in degrees.
    pub fn new(transform: Transform, fov: f32, near: f32, far: f32, aspect_ratio: f32) -> Self {
        Self {
            transform,
            aspect_ratio,
            fov,
            near,
            far,
        }
    }

    pub fn from_transform(transform: Transform) -> Self {
        Self {
            transform,
            ..Default::default()
        }
    }

    pub fn get_fov(&self) -> f32 {
        self.fov
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov;
    }

    pub fn get_near(&self) -> f32 {
        self.near
    }

    pub fn set_near(&mut self, near: f32) {
        self.near = near;
    }

    pub fn get_far(&self) -> f32 {
        self.far
    }

    pub fn set_far(&mut self, far: f32) {
        self.far = far;
    }

    pub fn get_aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Rotates the camera in place so it faces `target`. Does nothing when
    /// `target` is the camera position.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let eye = self.transform.translation();
        if (target - eye).length_squared() <= f32::EPSILON {
            return;
        }

        let (_, rotation, _) = Mat4::look_at_rh(eye, target, up)
            .inverse()
            .to_scale_rotation_translation();
        self.transform.set_rotation(rotation);
    }

    /// World-to-view matrix. Scale on the camera transform is ignored.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.transform.rotation(), self.transform.translation())
            .inverse()
    }

    /// Right-handed perspective projection with a `0..1` depth range.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }
}
