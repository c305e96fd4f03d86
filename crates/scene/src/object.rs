use crate::SceneError;
use glam::Vec3;
use pickscene_common::{Color, ObjectId, PickTag, Transform};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Indexed triangle mesh in local space, with a precomputed bounding sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    positions: Vec<Vec3>,
    indices: Vec<[u32; 3]>,
    bounds_center: Vec3,
    bounds_radius: f32,
}

impl TriangleMesh {
    /// Build a mesh, rejecting indices that point past the vertex list.
    pub fn new(positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Result<Self, SceneError> {
        let vertex_count = positions.len();
        if let Some(&index) = indices
            .iter()
            .flatten()
            .find(|&&i| i as usize >= vertex_count)
        {
            return Err(SceneError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        Ok(Self::build(positions, indices))
    }

    fn build(positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        let (bounds_center, bounds_radius) = if positions.is_empty() {
            (Vec3::ZERO, 0.0)
        } else {
            let min = positions.iter().copied().fold(Vec3::MAX, Vec3::min);
            let max = positions.iter().copied().fold(Vec3::MIN, Vec3::max);
            let center = (min + max) * 0.5;
            let radius = positions
                .iter()
                .map(|p| p.distance(center))
                .fold(0.0_f32, f32::max);
            (center, radius)
        };

        Self {
            positions,
            indices,
            bounds_center,
            bounds_radius,
        }
    }

    /// Axis-aligned box centred on `center`, 12 triangles, outward winding.
    pub fn cuboid(center: Vec3, half_extents: Vec3) -> Self {
        let h = half_extents;
        let positions: Vec<Vec3> = [
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, 1.0],
        ]
        .iter()
        .map(|c| center + Vec3::from_array(*c) * h)
        .collect();
        #[rustfmt::skip]
        let indices = vec![
            [4, 5, 6], [6, 7, 4], // +Z
            [1, 0, 3], [3, 2, 1], // -Z
            [5, 1, 2], [2, 6, 5], // +X
            [0, 4, 7], [7, 3, 0], // -X
            [7, 6, 2], [2, 3, 7], // +Y
            [0, 1, 5], [5, 4, 0], // -Y
        ];
        Self::build(positions, indices)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// Iterate triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.iter().map(|[a, b, c]| {
            [
                self.positions[*a as usize],
                self.positions[*b as usize],
                self.positions[*c as usize],
            ]
        })
    }

    /// Local-space bounding sphere as (center, radius).
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        (self.bounds_center, self.bounds_radius)
    }
}

/// Pickable geometry, in the object's local space.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
    Mesh(Arc<TriangleMesh>),
}

/// Vertical sine bob: `offset = sin(t * speed) * amplitude`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bob {
    pub speed: f32,
    pub amplitude: f32,
}

impl Bob {
    pub fn offset(&self, elapsed_secs: f32) -> f32 {
        (elapsed_secs * self.speed).sin() * self.amplitude
    }
}

/// An object that can be tested against the pointer ray.
#[derive(Debug, Clone)]
pub struct PickableObject {
    pub id: ObjectId,
    pub tag: PickTag,
    pub name: String,
    pub shape: Shape,
    pub transform: Transform,
    /// Color restored at the start of every picking frame.
    pub resting_color: Color,
    /// Color drawn this frame.
    pub color: Color,
    pub bob: Option<Bob>,
    base_position: Vec3,
}

impl PickableObject {
    pub fn new(tag: impl Into<PickTag>, shape: Shape) -> Self {
        let tag = tag.into();
        Self {
            id: ObjectId::new(),
            name: tag.to_string(),
            tag,
            shape,
            transform: Transform::default(),
            resting_color: Color::WHITE,
            color: Color::WHITE,
            bob: None,
            base_position: Vec3::ZERO,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self.base_position = transform.position;
        self
    }

    /// Sets both the resting and the current color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.resting_color = color;
        self.color = color;
        self
    }

    pub fn with_bob(mut self, bob: Bob) -> Self {
        self.bob = Some(bob);
        self
    }

    /// Move the object; the bob animation oscillates around this position.
    pub fn set_position(&mut self, position: Vec3) {
        self.base_position = position;
        self.transform.position = position;
    }

    pub fn base_position(&self) -> Vec3 {
        self.base_position
    }

    pub fn reset_color(&mut self) {
        self.color = self.resting_color;
    }

    pub fn is_highlighted(&self) -> bool {
        self.color != self.resting_color
    }

    pub(crate) fn animate(&mut self, elapsed_secs: f32) {
        if let Some(bob) = self.bob {
            self.transform.position.y = self.base_position.y + bob.offset(elapsed_secs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_rejects_out_of_range_index() {
        let err = TriangleMesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![[0, 1, 3]]);
        assert!(matches!(
            err,
            Err(SceneError::IndexOutOfRange {
                index: 3,
                vertex_count: 3
            })
        ));
    }

    #[test]
    fn cuboid_bounds_enclose_corners() {
        let mesh = TriangleMesh::cuboid(Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 2.0));
        assert_eq!(mesh.triangle_count(), 12);
        let (center, radius) = mesh.bounding_sphere();
        assert_eq!(center, Vec3::new(1.0, 0.0, 0.0));
        assert!((radius - 3.0).abs() < 1e-5);
        for p in mesh.positions() {
            assert!(p.distance(center) <= radius + 1e-5);
        }
    }

    #[test]
    fn bob_follows_sine() {
        let bob = Bob {
            speed: 0.5,
            amplitude: 1.5,
        };
        assert_eq!(bob.offset(0.0), 0.0);
        assert!((bob.offset(std::f32::consts::PI) - 1.5).abs() < 1e-5);
    }

    #[test]
    fn animate_oscillates_around_base() {
        let mut obj = PickableObject::new("a", Shape::Sphere { radius: 0.5 })
            .at(Vec3::new(2.0, 1.0, 0.0))
            .with_bob(Bob {
                speed: 1.0,
                amplitude: 2.0,
            });
        obj.animate(std::f32::consts::FRAC_PI_2);
        assert!((obj.transform.position.y - 3.0).abs() < 1e-5);
        assert_eq!(obj.transform.position.x, 2.0);
        assert_eq!(obj.base_position().y, 1.0);
    }

    #[test]
    fn color_reset_restores_resting() {
        let mut obj = PickableObject::new("a", Shape::Sphere { radius: 0.5 }).with_color(Color::RED);
        obj.color = Color::BLUE;
        assert!(obj.is_highlighted());
        obj.reset_color();
        assert_eq!(obj.color, Color::RED);
        assert!(!obj.is_highlighted());
    }
}
