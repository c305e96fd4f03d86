//! wgpu render backend for the picking scene.
//!
//! Primary objects are drawn unlit so the highlight color shows exactly;
//! model parts are lit by an ambient and a directional light.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - Model geometry is uploaded once, after the model is installed.

mod gpu;
mod mesh;
mod shaders;

pub use gpu::WgpuRenderer;
pub use mesh::{box_mesh, flat_mesh, sphere_mesh, Vertex};
