//! Scene: the pickable objects, the optional loaded model, and scene
//! configuration.
//!
//! # Invariants
//! - The primary candidate set is fixed after construction.
//! - The model slot is filled at most once; afterwards only colors change.
//! - Tags are unique within the primary set.

pub mod config;
mod model;
mod object;
mod scene;

pub use config::{
    CameraConfig, ModelConfig, ModelHighlight, ObjectConfig, PickingConfig, SceneConfig,
    ShapeConfig,
};
pub use model::{Model, ModelSlot};
pub use object::{Bob, PickableObject, Shape, TriangleMesh};
pub use scene::Scene;

use pickscene_common::PickTag;

/// Errors from scene construction and configuration.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("duplicate pick tag: {0}")]
    DuplicateTag(PickTag),
    #[error("invalid camera: {0}")]
    InvalidCamera(String),
    #[error("invalid shape for {tag}: {reason}")]
    InvalidShape { tag: PickTag, reason: String },
    #[error("mesh index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("a model is already installed (rejected {0:?})")]
    ModelAlreadyInstalled(String),
}
