//! Rendering adapter: renderer-agnostic interface and the orbit camera.
//!
//! # Invariants
//! - Renderers read the scene; they never change it.
//! - The camera that draws the scene is the camera that builds pick rays.

mod camera;
mod renderer;

pub use camera::OrbitCamera;
pub use renderer::{DebugTextRenderer, Renderer};

pub fn crate_info() -> &'static str {
    concat!("pickscene-render v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
