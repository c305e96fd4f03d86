use glam::Vec3;
use pickscene_common::Transform;
use pickscene_scene::{Model, PickableObject, Shape, TriangleMesh};
use std::sync::Arc;

// ISO/IEC 7810 ID-1 card, one unit per 50 mm, lying in the XZ plane.
const BODY_HALF_EXTENTS: Vec3 = Vec3::new(0.856, 0.008, 0.54);
const CHIP_HALF_EXTENTS: Vec3 = Vec3::new(0.12, 0.004, 0.09);
const CHIP_CENTER: Vec3 = Vec3::new(-0.52, 0.012, -0.08);

/// Procedural credit card: a thin body with a raised chip on top (+Y).
///
/// Used when no model file is configured. Parts are tagged `model/body`
/// and `model/chip`.
pub fn builtin_card() -> Model {
    let part = |name: &str, center: Vec3, half_extents: Vec3| {
        let mesh = TriangleMesh::cuboid(center, half_extents);
        PickableObject::new(format!("model/{name}"), Shape::Mesh(Arc::new(mesh))).with_name(name)
    };
    Model::new("card", Transform::default())
        .with_part(part("body", Vec3::ZERO, BODY_HALF_EXTENTS))
        .with_part(part("chip", CHIP_CENTER, CHIP_HALF_EXTENTS))
}
