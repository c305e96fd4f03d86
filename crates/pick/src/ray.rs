use glam::{Mat4, Vec2, Vec3};

/// World-space ray with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a ray; `direction` is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Ray from the camera eye through a point in normalized device
    /// coordinates (x right, y up, both in [-1, 1] on screen).
    ///
    /// `view_projection` must map depth to [0, 1] (glam's `perspective_rh`).
    /// Points outside [-1, 1] are valid and give rays outside the frustum.
    pub fn from_ndc(ndc: Vec2, eye: Vec3, view_projection: Mat4) -> Self {
        let far = view_projection
            .inverse()
            .project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Self::new(eye, far - eye)
    }

    /// Point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
