use crate::OrbitCamera;
use pickscene_scene::{PickableObject, Scene, Shape};
use std::fmt::Write;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene and a camera and produces output. Colors are
/// taken as they are; highlighting is the picking session's job.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &Scene, camera: &OrbitCamera) -> Self::Output;
}

/// Human-readable dump of the scene, for the CLI and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

fn shape_label(shape: &Shape) -> String {
    match shape {
        Shape::Sphere { radius } => format!("sphere r={radius:.2}"),
        Shape::Box { half_extents: h } => format!("box {:.2}x{:.2}x{:.2}", h.x * 2.0, h.y * 2.0, h.z * 2.0),
        Shape::Mesh(mesh) => format!("mesh tris={}", mesh.triangle_count()),
    }
}

fn write_object(out: &mut String, object: &PickableObject) {
    let p = object.transform.position;
    let marker = if object.is_highlighted() { '*' } else { ' ' };
    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        " {marker}[{}] {} \"{}\" {} pos=({:.2}, {:.2}, {:.2}) color={}",
        object.id.short(),
        object.tag,
        object.name,
        shape_label(&object.shape),
        p.x,
        p.y,
        p.z,
        object.color,
    );
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, camera: &OrbitCamera) -> String {
        let mut out = String::new();
        let eye = camera.eye();
        let t = camera.target;
        let _ = writeln!(out, "=== Scene (t={:.2}s) ===", scene.elapsed());
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.2}",
            eye.x,
            eye.y,
            eye.z,
            t.x,
            t.y,
            t.z,
            camera.fov.to_degrees(),
            camera.aspect,
        );
        let _ = writeln!(out, "Objects: {}", scene.object_count());
        for object in scene.objects() {
            write_object(&mut out, object);
        }
        match scene.model() {
            Some(model) => {
                let _ = writeln!(out, "Model: {} ({} parts)", model.name, model.part_count());
                for part in model.parts() {
                    write_object(&mut out, part);
                }
            }
            None => {
                let _ = writeln!(out, "Model: not loaded");
            }
        }
        out
    }
}
