use crate::config::{SceneConfig, ShapeConfig};
use crate::{Model, ModelSlot, PickableObject, SceneError, Shape};
use glam::Vec3;
use pickscene_common::{ObjectId, PickTag};

/// The pickable scene: a fixed primary candidate set plus an optional model.
///
/// Primary objects keep insertion order. Tags are unique across the primary
/// set so click dispatch by tag is unambiguous.
#[derive(Debug, Default)]
pub struct Scene {
    objects: Vec<PickableObject>,
    model: ModelSlot,
    elapsed: f32,
}

impl Scene {
    /// Create an empty scene with no model.
    pub fn new() -> Self {
        Self::default()
    }

    /// The three bobbing spheres of the default configuration.
    pub fn demo() -> Self {
        match Self::from_config(&SceneConfig::default()) {
            Ok(scene) => scene,
            Err(err) => {
                tracing::warn!(%err, "default scene config rejected");
                Self::new()
            }
        }
    }

    /// Build the primary candidate set from configuration. The model is
    /// loaded separately and installed later.
    pub fn from_config(config: &SceneConfig) -> Result<Self, SceneError> {
        config.camera.validate()?;
        let mut scene = Self::new();
        for object in &config.objects {
            let shape = match object.shape {
                ShapeConfig::Sphere { radius } => {
                    if radius.is_nan() || radius <= 0.0 {
                        return Err(SceneError::InvalidShape {
                            tag: object.tag.clone(),
                            reason: format!("sphere radius must be positive, got {radius}"),
                        });
                    }
                    Shape::Sphere { radius }
                }
                ShapeConfig::Box { half_extents } => {
                    if half_extents.iter().any(|h| h.is_nan() || *h <= 0.0) {
                        return Err(SceneError::InvalidShape {
                            tag: object.tag.clone(),
                            reason: format!("box half extents must be positive, got {half_extents:?}"),
                        });
                    }
                    Shape::Box {
                        half_extents: Vec3::from_array(half_extents),
                    }
                }
            };
            let mut pickable = PickableObject::new(object.tag.clone(), shape)
                .with_name(object.display_name())
                .at(object.position())
                .with_color(object.color);
            if let Some(bob) = object.bob {
                pickable = pickable.with_bob(bob);
            }
            scene.add_object(pickable)?;
        }
        Ok(scene)
    }

    /// Add a primary object. Returns its id.
    pub fn add_object(&mut self, object: PickableObject) -> Result<ObjectId, SceneError> {
        if self.find_by_tag(&object.tag).is_some() {
            return Err(SceneError::DuplicateTag(object.tag));
        }
        let id = object.id;
        tracing::debug!(tag = %object.tag, id = %id.short(), "added pickable object");
        self.objects.push(object);
        Ok(id)
    }

    pub fn objects(&self) -> &[PickableObject] {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut [PickableObject] {
        &mut self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn get(&self, id: ObjectId) -> Option<&PickableObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn find_by_tag(&self, tag: &PickTag) -> Option<&PickableObject> {
        self.objects.iter().find(|o| &o.tag == tag)
    }

    /// Install the loaded model. Succeeds at most once.
    pub fn install_model(&self, model: Model) -> Result<(), SceneError> {
        let name = model.name.clone();
        let parts = model.part_count();
        self.model.install(model)?;
        tracing::info!(model = %name, parts, "model installed");
        Ok(())
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.get()
    }

    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.model.get_mut()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_installed()
    }

    /// Seconds of animation time applied by the last `animate` call.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance bob animations to `elapsed_secs` since start.
    pub fn animate(&mut self, elapsed_secs: f32) {
        self.elapsed = elapsed_secs;
        for object in &mut self.objects {
            object.animate(elapsed_secs);
        }
    }
}
