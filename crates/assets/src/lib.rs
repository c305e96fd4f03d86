//! Model assets: Wavefront OBJ import, the built-in card, and a background
//! loader that hands the finished model to the frame loop.
//!
//! # Invariants
//! - A loader yields at most one model; afterwards it reports `Finished`.
//! - Load failures are values, never panics. The frame loop logs them and
//!   carries on without a model.

mod card;
mod loader;
mod obj;

pub use card::builtin_card;
pub use loader::{load_model, LoadStatus, ModelLoader};
pub use obj::load_obj;

use pickscene_scene::SceneError;
use std::path::PathBuf;

/// Errors from model loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("OBJ error: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("model {0} contains no triangles")]
    EmptyModel(PathBuf),
    #[error("invalid mesh: {0}")]
    Scene(#[from] SceneError),
    #[error("model loader thread exited without a result")]
    Disconnected,
}

pub fn crate_info() -> &'static str {
    concat!("pickscene-assets v", env!("CARGO_PKG_VERSION"))
}
