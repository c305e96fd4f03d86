use glam::Vec2;

/// Drawable area in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Zero dimensions (a minimized window) clamp to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Pixel position of an NDC point; inverse of the pointer mapping.
    pub fn ndc_to_pixels(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) / 2.0 * self.width as f32,
            (1.0 - ndc.y) / 2.0 * self.height as f32,
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

/// Last known pointer position in normalized device coordinates.
///
/// Starts at the centre of the screen, before any pointer event arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    ndc: Vec2,
}

impl PointerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a pixel position (origin top-left, y down) to NDC (y up).
    /// Positions outside the viewport map outside [-1, 1].
    pub fn set_from_pixels(&mut self, x: f64, y: f64, viewport: Viewport) {
        let w = f64::from(viewport.width.max(1));
        let h = f64::from(viewport.height.max(1));
        self.ndc = Vec2::new((x / w * 2.0 - 1.0) as f32, -(y / h * 2.0 - 1.0) as f32);
    }

    pub fn set_ndc(&mut self, ndc: Vec2) {
        self.ndc = ndc;
    }

    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }
}
