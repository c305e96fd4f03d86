use glam::{Mat4, Vec2, Vec3};
use pickscene_pick::Ray;
use pickscene_scene::CameraConfig;
use std::f32::consts::FRAC_PI_2;

const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;
const SETTLE_EPSILON: f32 = 1e-5;

/// Camera orbiting a target point, with damped rotation.
///
/// Rotation input accumulates as a pending delta; each `update` applies a
/// `damping` fraction of it and keeps the rest, so motion eases out over
/// several frames.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub distance: f32,
    /// Angle around +Y, zero looking down -Z.
    pub yaw: f32,
    /// Elevation above the XZ plane.
    pub pitch: f32,
    /// Vertical field of view, radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_yaw: f32,
    pending_pitch: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 3.0,
            yaw: 0.0,
            pitch: 0.0,
            fov: 75.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 100.0,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            damping: 0.05,
            min_distance: 0.5,
            max_distance: 50.0,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
        }
    }
}

impl OrbitCamera {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            distance: config.distance,
            fov: config.fov_degrees.to_radians(),
            near: config.near,
            far: config.far,
            ..Self::default()
        }
    }

    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target + self.distance * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the eye through `ndc`.
    pub fn pick_ray(&self, ndc: Vec2) -> Ray {
        Ray::from_ndc(ndc, self.eye(), self.view_projection())
    }

    /// Project a world point; z is depth in [0, 1] for visible points.
    pub fn world_to_ndc(&self, point: Vec3) -> Vec3 {
        self.view_projection().project_point3(point)
    }

    /// Resize: only the aspect ratio changes.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
        tracing::debug!(width, height, aspect = self.aspect, "camera viewport");
    }

    /// Queue a rotation from a pointer drag in pixels.
    pub fn orbit(&mut self, dx: f32, dy: f32) {
        self.pending_yaw -= dx * self.rotate_speed;
        self.pending_pitch += dy * self.rotate_speed;
    }

    /// Dolly toward (positive) or away from (negative) the target.
    pub fn zoom(&mut self, delta: f32) {
        let scale = (1.0 - self.zoom_speed).powf(delta);
        let wanted = self.distance * scale;
        self.distance = wanted.clamp(self.min_distance, self.max_distance);
        if wanted != self.distance {
            tracing::debug!(wanted, distance = self.distance, "zoom clamped");
        }
    }

    /// Apply one frame of damped rotation. Returns whether the camera moved.
    pub fn update(&mut self) -> bool {
        if self.is_settled() {
            self.pending_yaw = 0.0;
            self.pending_pitch = 0.0;
            return false;
        }
        self.yaw += self.pending_yaw * self.damping;
        self.pitch = (self.pitch + self.pending_pitch * self.damping).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.pending_yaw *= 1.0 - self.damping;
        self.pending_pitch *= 1.0 - self.damping;
        true
    }

    pub fn is_settled(&self) -> bool {
        self.pending_yaw.abs() < SETTLE_EPSILON && self.pending_pitch.abs() < SETTLE_EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_eye_looks_at_origin_from_positive_z() {
        let cam = OrbitCamera::default();
        assert!((cam.eye() - Vec3::new(0.0, 0.0, 3.0)).length() < 1e-6);
        let ray = cam.pick_ray(Vec2::ZERO);
        assert!((ray.direction - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn pick_ray_matches_projection() {
        let cam = OrbitCamera::default();
        let point = Vec3::new(2.0, 0.4, 0.0);
        let ndc = cam.world_to_ndc(point);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        let ray = cam.pick_ray(ndc.truncate());
        let t = (point - cam.eye()).length();
        assert!(ray.at(t).distance(point) < 1e-3);
    }

    #[test]
    fn from_config_uses_camera_settings() {
        let cam = OrbitCamera::from_config(&CameraConfig {
            fov_degrees: 60.0,
            near: 0.5,
            far: 20.0,
            distance: 6.0,
        });
        assert!((cam.eye().z - 6.0).abs() < 1e-6);
        assert!((cam.fov - 60.0_f32.to_radians()).abs() < 1e-6);
        assert_eq!(cam.near, 0.5);
    }

    #[test]
    fn orbit_is_damped_and_settles() {
        let mut cam = OrbitCamera::default();
        cam.orbit(100.0, 0.0);
        assert!(cam.update());
        let first = cam.yaw;
        assert!((first + 100.0 * 0.005 * 0.05).abs() < 1e-6);

        for _ in 0..1000 {
            cam.update();
        }
        assert!(cam.is_settled());
        assert!(!cam.update());
        assert!((cam.yaw + 0.5).abs() < 1e-3);
        // Distance to the target is unchanged by orbiting.
        assert!((cam.eye().distance(cam.target) - 3.0).abs() < 1e-5);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.orbit(0.0, 100_000.0);
        for _ in 0..2000 {
            cam.update();
        }
        assert!(cam.pitch <= PITCH_LIMIT);
        assert!(cam.view_projection().is_finite());
    }

    #[test]
    fn zoom_clamps_distance() {
        let mut cam = OrbitCamera::default();
        cam.zoom(1.0);
        assert!(cam.distance < 3.0);
        cam.zoom(1000.0);
        assert_eq!(cam.distance, cam.min_distance);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, cam.max_distance);
    }

    #[test]
    fn zoom_within_limits_is_not_clamped() {
        let mut cam = OrbitCamera::default();
        cam.zoom(2.0);
        assert!((cam.distance - 3.0 * 0.9_f32.powi(2)).abs() < 1e-5);
        cam.zoom(-2.0);
        assert!((cam.distance - 3.0).abs() < 1e-5);
    }

    #[test]
    fn zero_viewport_keeps_aspect_finite() {
        let mut cam = OrbitCamera::default();
        cam.set_viewport(0, 0);
        assert_eq!(cam.aspect, 1.0);
        cam.set_viewport(1920, 1080);
        assert!((cam.aspect - 16.0 / 9.0).abs() < 1e-6);
    }
}
