use crate::{PickableObject, SceneError};
use glam::Mat4;
use pickscene_common::{PickTag, Transform};
use std::sync::OnceLock;

/// A loaded model: a group of mesh parts under one root transform.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub root: Transform,
    parts: Vec<PickableObject>,
}

impl Model {
    pub fn new(name: impl Into<String>, root: Transform) -> Self {
        Self {
            name: name.into(),
            root,
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: PickableObject) -> Self {
        self.parts.push(part);
        self
    }

    pub fn add_part(&mut self, part: PickableObject) {
        self.parts.push(part);
    }

    pub fn parts(&self) -> &[PickableObject] {
        &self.parts
    }

    pub fn parts_mut(&mut self) -> &mut [PickableObject] {
        &mut self.parts
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn find_part(&self, tag: &PickTag) -> Option<&PickableObject> {
        self.parts.iter().find(|p| &p.tag == tag)
    }

    /// Root matrix; part world matrices are `matrix() * part.transform.matrix()`.
    pub fn matrix(&self) -> Mat4 {
        self.root.matrix()
    }
}

/// Single-assignment slot for the asynchronously loaded model.
///
/// The slot is filled at most once. After that the set of parts is fixed;
/// only per-part colors change from frame to frame.
#[derive(Debug, Default)]
pub struct ModelSlot {
    cell: OnceLock<Model>,
}

impl ModelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, model: Model) -> Result<(), SceneError> {
        self.cell
            .set(model)
            .map_err(|rejected| SceneError::ModelAlreadyInstalled(rejected.name))
    }

    pub fn get(&self) -> Option<&Model> {
        self.cell.get()
    }

    pub fn get_mut(&mut self) -> Option<&mut Model> {
        self.cell.get_mut()
    }

    pub fn is_installed(&self) -> bool {
        self.cell.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Shape, TriangleMesh};
    use glam::Vec3;
    use std::sync::Arc;

    fn card() -> Model {
        let mesh = Arc::new(TriangleMesh::cuboid(Vec3::ZERO, Vec3::new(1.0, 0.6, 0.01)));
        Model::new("card", Transform::default())
            .with_part(PickableObject::new("card/body", Shape::Mesh(mesh)))
    }

    #[test]
    fn slot_starts_empty() {
        let slot = ModelSlot::new();
        assert!(!slot.is_installed());
        assert!(slot.get().is_none());
    }

    #[test]
    fn slot_accepts_exactly_one_model() {
        let slot = ModelSlot::new();
        slot.install(card()).unwrap();
        assert!(slot.is_installed());

        let second = slot.install(card());
        assert!(matches!(second, Err(SceneError::ModelAlreadyInstalled(name)) if name == "card"));
        assert_eq!(slot.get().unwrap().part_count(), 1);
    }

    #[test]
    fn part_colors_mutable_after_install() {
        let mut slot = ModelSlot::new();
        slot.install(card()).unwrap();
        let model = slot.get_mut().unwrap();
        model.parts_mut()[0].color = pickscene_common::Color::BLUE;
        assert!(slot.get().unwrap().parts()[0].is_highlighted());
    }

    #[test]
    fn find_part_by_tag() {
        let model = card();
        assert!(model.find_part(&PickTag::from("card/body")).is_some());
        assert!(model.find_part(&PickTag::from("card/chip")).is_none());
    }
}
