//! Ray/shape intersection.
//!
//! Shapes are tested in the object's local space: the world ray is carried
//! through the inverse world matrix without renormalizing, so the ray
//! parameter found locally is the world-space distance.

use crate::Ray;
use glam::{Mat4, Vec3};
use pickscene_common::{ObjectId, PickTag};
use pickscene_scene::{PickableObject, Shape};

/// One hit between a ray and a pickable object.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub object: ObjectId,
    pub tag: PickTag,
    /// Distance from the ray origin.
    pub distance: f32,
    /// World-space hit point.
    pub point: Vec3,
}

const TRIANGLE_EPSILON: f32 = 1e-8;

/// Nearest non-negative parameter where `origin + t * dir` meets the
/// sphere. When the origin is inside, this is the exit point.
fn sphere_param(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let a = dir.length_squared();
    let b = 2.0 * dir.dot(oc);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 || a == 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let t0 = (-b - sqrt_disc) / (2.0 * a);
    let t1 = (-b + sqrt_disc) / (2.0 * a);
    if t1 < 0.0 {
        return None;
    }
    Some(if t0 >= 0.0 { t0 } else { t1 })
}

/// Slab test against an axis-aligned box. Faces count as part of the box.
fn aabb_param(origin: Vec3, dir: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    if dir == Vec3::ZERO {
        return None;
    }
    let mut tmin = f32::NEG_INFINITY;
    let mut tmax = f32::INFINITY;

    for axis in 0..3 {
        // Parallel to this slab: 0 * inf would poison the bounds with NaN.
        if dir[axis] == 0.0 {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }
        let inv = dir[axis].recip();
        let t1 = (min[axis] - origin[axis]) * inv;
        let t2 = (max[axis] - origin[axis]) * inv;
        tmin = tmin.max(t1.min(t2));
        tmax = tmax.min(t1.max(t2));
    }

    // Box entirely behind the origin
    if tmax < 0.0 {
        return None;
    }
    if tmin > tmax {
        return None;
    }

    // Origin inside the box
    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Möller–Trumbore, double-sided.
fn triangle_param(origin: Vec3, dir: Vec3, [a, b, c]: [Vec3; 3]) -> Option<f32> {
    let e1 = b - a;
    let e2 = c - a;
    let p = dir.cross(e2);
    let det = e1.dot(p);
    if det.abs() < TRIANGLE_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}

/// Distance along a world-space ray to a sphere.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    sphere_param(ray.origin, ray.direction, center, radius)
}

/// Distance along a world-space ray to an axis-aligned box.
pub fn ray_aabb(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    aabb_param(ray.origin, ray.direction, min, max)
}

/// Distance along a world-space ray to a triangle (either face).
pub fn ray_triangle(ray: &Ray, triangle: [Vec3; 3]) -> Option<f32> {
    triangle_param(ray.origin, ray.direction, triangle)
}

/// Distance along `ray` to `shape` placed by `world` (local-to-world).
///
/// Degenerate transforms (zero scale) never hit.
pub fn intersect_shape(ray: &Ray, shape: &Shape, world: Mat4) -> Option<f32> {
    let inv = world.inverse();
    if !inv.is_finite() {
        return None;
    }
    let origin = inv.transform_point3(ray.origin);
    let dir = inv.transform_vector3(ray.direction);

    match shape {
        Shape::Sphere { radius } => sphere_param(origin, dir, Vec3::ZERO, *radius),
        Shape::Box { half_extents } => aabb_param(origin, dir, -*half_extents, *half_extents),
        Shape::Mesh(mesh) => {
            let (center, radius) = mesh.bounding_sphere();
            sphere_param(origin, dir, center, radius)?;
            mesh.triangles()
                .filter_map(|tri| triangle_param(origin, dir, tri))
                .min_by(f32::total_cmp)
        }
    }
}

/// Test one object. `parent` places the object's own transform in the world
/// (identity for top-level objects, the model root for model parts).
pub fn intersect_object(ray: &Ray, object: &PickableObject, parent: Mat4) -> Option<Intersection> {
    let world = parent * object.transform.matrix();
    let distance = intersect_shape(ray, &object.shape, world)?;
    Some(Intersection {
        object: object.id,
        tag: object.tag.clone(),
        distance,
        point: ray.at(distance),
    })
}

/// Test every candidate; hits come back nearest first.
pub fn intersect_objects(
    ray: &Ray,
    objects: &[PickableObject],
    parent: Mat4,
) -> Vec<Intersection> {
    let mut hits: Vec<Intersection> = objects
        .iter()
        .filter_map(|o| intersect_object(ray, o, parent))
        .collect();
    sort_by_distance(&mut hits);
    hits
}

/// Ascending distance; equal distances fall back to object id so the order
/// never depends on candidate order.
pub fn sort_by_distance(hits: &mut [Intersection]) {
    hits.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| a.object.cmp(&b.object))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;
    use pickscene_common::Transform;
    use pickscene_scene::TriangleMesh;
    use std::sync::Arc;

    fn forward_ray(x: f32, y: f32) -> Ray {
        Ray::new(Vec3::new(x, y, 5.0), Vec3::NEG_Z)
    }

    #[test]
    fn sphere_hit_distance() {
        let t = ray_sphere(&forward_ray(0.0, 0.0), Vec3::ZERO, 1.0).unwrap();
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn sphere_miss() {
        assert!(ray_sphere(&forward_ray(1.5, 0.0), Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn sphere_behind_origin_is_missed() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::NEG_Z);
        assert!(ray_sphere(&ray, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn origin_inside_sphere_hits_exit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = ray_sphere(&ray, Vec3::ZERO, 2.0).unwrap();
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn aabb_ray_intersection() {
        let hit = ray_aabb(&forward_ray(0.0, 0.0), Vec3::splat(-0.5), Vec3::splat(0.5));
        assert!((hit.unwrap() - 4.5).abs() < 0.001);

        let miss = ray_aabb(&forward_ray(2.0, 0.0), Vec3::splat(-0.5), Vec3::splat(0.5));
        assert!(miss.is_none());
    }

    #[test]
    fn ray_in_box_face_plane_touches_the_box() {
        let (min, max) = (Vec3::splat(-0.5), Vec3::splat(0.5));
        let t = ray_aabb(&forward_ray(0.5, 0.0), min, max).unwrap();
        assert!((t - 4.5).abs() < 1e-5);
        assert!(ray_aabb(&forward_ray(0.5, 0.5), min, max).is_some());
        assert!(ray_aabb(&forward_ray(0.5001, 0.0), min, max).is_none());
    }

    #[test]
    fn triangle_hit_from_either_side() {
        let tri = [
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let front = ray_triangle(&forward_ray(0.0, 0.0), tri).unwrap();
        assert!((front - 5.0).abs() < 1e-5);

        let back = Ray::new(Vec3::new(0.0, 0.0, -2.0), Vec3::Z);
        assert!((ray_triangle(&back, tri).unwrap() - 2.0).abs() < 1e-5);

        assert!(ray_triangle(&forward_ray(0.9, 0.9), tri).is_none());
    }

    #[test]
    fn scaled_sphere_uses_world_distance() {
        let world = Transform {
            position: Vec3::new(0.0, 0.0, -1.0),
            scale: Vec3::splat(2.0),
            ..Transform::default()
        }
        .matrix();
        let t = intersect_shape(&forward_ray(0.0, 0.0), &Shape::Sphere { radius: 0.5 }, world)
            .unwrap();
        // Surface at z = 0 after scaling the radius to 1.
        assert!((t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn rotated_box_is_tested_in_local_space() {
        let world = Transform {
            rotation: Quat::from_rotation_z(std::f32::consts::FRAC_PI_4),
            ..Transform::default()
        }
        .matrix();
        let shape = Shape::Box {
            half_extents: Vec3::splat(0.5),
        };
        // The rotated corner reaches sqrt(0.5) along x, past the unrotated 0.5.
        assert!(intersect_shape(&forward_ray(0.6, 0.0), &shape, world).is_some());
        assert!(intersect_shape(&forward_ray(0.75, 0.0), &shape, world).is_none());
    }

    #[test]
    fn mesh_intersection_picks_nearest_triangle() {
        let mesh = Arc::new(TriangleMesh::cuboid(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.1)));
        let t = intersect_shape(&forward_ray(0.2, 0.3), &Shape::Mesh(mesh.clone()), Mat4::IDENTITY)
            .unwrap();
        assert!((t - 4.9).abs() < 1e-4);
        assert!(intersect_shape(&forward_ray(1.2, 0.0), &Shape::Mesh(mesh), Mat4::IDENTITY).is_none());
    }

    #[test]
    fn zero_scale_never_hits() {
        let world = Mat4::from_scale(Vec3::ZERO);
        assert!(intersect_shape(&forward_ray(0.0, 0.0), &Shape::Sphere { radius: 1.0 }, world)
            .is_none());
    }

    #[test]
    fn results_sorted_nearest_first() {
        let near = PickableObject::new("near", Shape::Sphere { radius: 0.5 }).at(Vec3::new(0.0, 0.0, 1.0));
        let far = PickableObject::new("far", Shape::Sphere { radius: 0.5 }).at(Vec3::new(0.0, 0.0, -3.0));
        let off = PickableObject::new("off", Shape::Sphere { radius: 0.5 }).at(Vec3::new(3.0, 0.0, 0.0));
        let hits = intersect_objects(&forward_ray(0.0, 0.0), &[far, off, near], Mat4::IDENTITY);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].tag.as_str(), "near");
        assert_eq!(hits[1].tag.as_str(), "far");
        assert!((hits[0].distance - 3.5).abs() < 1e-5);
        assert!((hits[0].point - Vec3::new(0.0, 0.0, 1.5)).length() < 1e-5);
    }

    #[test]
    fn equal_distances_order_by_object_id() {
        let a = PickableObject::new("a", Shape::Sphere { radius: 0.5 });
        let b = PickableObject::new("b", Shape::Sphere { radius: 0.5 });
        let expected = a.id.min(b.id);
        let ray = forward_ray(0.0, 0.0);

        let forward = intersect_objects(&ray, &[a.clone(), b.clone()], Mat4::IDENTITY);
        let reversed = intersect_objects(&ray, &[b, a], Mat4::IDENTITY);
        assert_eq!(forward.len(), 2);
        assert_eq!(forward[0].distance, forward[1].distance);
        assert_eq!(forward[0].object, expected);
        assert_eq!(reversed[0].object, expected);
        assert_eq!(forward[1].object, reversed[1].object);
    }

    #[test]
    fn parent_matrix_places_parts() {
        let part = PickableObject::new("part", Shape::Sphere { radius: 0.5 });
        let parent = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0));
        assert!(intersect_object(&forward_ray(0.0, 0.0), &part, parent).is_none());
        assert!(intersect_object(&forward_ray(3.0, 0.0), &part, parent).is_some());
    }
}
