//! YAML scene configuration.
//!
//! Every field has a default that reproduces the three-sphere demo, so an
//! empty document (or no file at all) yields a usable scene.

use crate::{Bob, SceneError};
use glam::{Quat, Vec3};
use pickscene_common::{Color, PickTag, Transform};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub picking: PickingConfig,
    pub objects: Vec<ObjectConfig>,
    /// `None` disables the model entirely.
    pub model: Option<ModelConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        let sphere = |n: usize, x: f32, speed: f32| ObjectConfig {
            tag: PickTag::new(format!("object-{n}")),
            name: Some(format!("Object {n}")),
            shape: ShapeConfig::Sphere { radius: 0.5 },
            position: [x, 0.0, 0.0],
            color: Color::RED,
            bob: Some(Bob {
                speed,
                amplitude: 1.5,
            }),
            click_label: Some(format!("click on object {n}")),
        };
        Self {
            camera: CameraConfig::default(),
            picking: PickingConfig::default(),
            objects: vec![sphere(1, -2.0, 0.3), sphere(2, 0.0, 0.6), sphere(3, 2.0, 0.9)],
            model: Some(ModelConfig::default()),
        }
    }
}

impl SceneConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SceneError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!(path = %path.display(), objects = config.objects.len(), "loaded scene config");
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SceneError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn to_yaml(&self) -> Result<String, SceneError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// (tag, label) pairs for click dispatch. Objects without an explicit
    /// label get "click on <name>".
    pub fn click_bindings(&self) -> impl Iterator<Item = (PickTag, String)> + '_ {
        self.objects.iter().map(|o| {
            let label = o
                .click_label
                .clone()
                .unwrap_or_else(|| format!("click on {}", o.display_name()));
            (o.tag.clone(), label)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the orbit target (the origin).
    pub distance: f32,
}

impl CameraConfig {
    /// Reject settings that would give a degenerate projection.
    pub fn validate(&self) -> Result<(), SceneError> {
        let Self {
            fov_degrees,
            near,
            far,
            distance,
        } = *self;
        if !(fov_degrees > 0.0 && fov_degrees < 180.0) {
            return Err(SceneError::InvalidCamera(format!(
                "fov_degrees must be in (0, 180), got {fov_degrees}"
            )));
        }
        if !(near > 0.0) {
            return Err(SceneError::InvalidCamera(format!(
                "near must be positive, got {near}"
            )));
        }
        if !(far > near) || !far.is_finite() {
            return Err(SceneError::InvalidCamera(format!(
                "far must be finite and beyond near ({near}), got {far}"
            )));
        }
        if !(distance > 0.0) || !distance.is_finite() {
            return Err(SceneError::InvalidCamera(format!(
                "distance must be positive, got {distance}"
            )));
        }
        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            distance: 3.0,
        }
    }
}

/// How the model reacts to being hovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelHighlight {
    /// Track hover edges only.
    Off,
    /// Recolor the hovered part.
    #[default]
    Part,
    /// Recolor every part of the model.
    Whole,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Color of the hovered primary object.
    pub highlight: Color,
    pub model_highlight: ModelHighlight,
    pub model_highlight_color: Color,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            highlight: Color::BLUE,
            model_highlight: ModelHighlight::Part,
            model_highlight_color: Color::rgb(0.667, 0.667, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeConfig {
    Sphere { radius: f32 },
    Box { half_extents: [f32; 3] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectConfig {
    pub tag: PickTag,
    #[serde(default)]
    pub name: Option<String>,
    pub shape: ShapeConfig,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "default_object_color")]
    pub color: Color,
    #[serde(default)]
    pub bob: Option<Bob>,
    #[serde(default)]
    pub click_label: Option<String>,
}

fn default_object_color() -> Color {
    Color::RED
}

impl ObjectConfig {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.tag.as_str())
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Wavefront OBJ file. `None` selects the built-in card.
    pub path: Option<PathBuf>,
    pub rotation_x_degrees: f32,
    pub scale: f32,
    pub resting_color: Color,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: None,
            rotation_x_degrees: 90.0,
            scale: 0.5,
            resting_color: Color::WHITE,
        }
    }
}

impl ModelConfig {
    pub fn root_transform(&self) -> Transform {
        Transform {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_x(self.rotation_x_degrees.to_radians()),
            scale: Vec3::splat(self.scale),
        }
    }
}
