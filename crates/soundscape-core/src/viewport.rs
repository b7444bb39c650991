//! Pan / zoom transform between canvas pixels and world units
//!
//! `screen = world * scale + offset`. The soundscape itself only ever sees
//! world coordinates; a front end keeps one [`Viewport`] per canvas.

use crate::types::Vec2;

/// Multiplicative zoom step per wheel notch
pub const ZOOM_STEP: f32 = 1.1;
pub const MIN_SCALE: f32 = 0.2;
pub const MAX_SCALE: f32 = 3.0;

/// Round a world position to the nearest grid intersection
///
/// A non-positive grid size disables snapping.
pub fn snap_to_grid(world: Vec2, grid_size: f32) -> Vec2 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return world;
    }
    Vec2::new(
        (world.x / grid_size).round() * grid_size,
        (world.y / grid_size).round() * grid_size,
    )
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Screen position of the world origin, in pixels
    pub offset: Vec2,
    scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x - self.offset.x) / self.scale,
            (screen.y - self.offset.y) / self.scale,
        )
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.offset
    }

    /// Zoom one step in or out, keeping the world point under `anchor` in place
    pub fn zoom(&mut self, step_in: bool, anchor: Vec2) {
        let factor = if step_in { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
        let pinned = self.screen_to_world(anchor);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.offset = anchor - pinned * self.scale;
    }

    /// Drag the view by a screen-space delta
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Center `world` in a canvas of `canvas_size` pixels
    pub fn focus_on(&mut self, world: Vec2, canvas_size: Vec2) {
        self.offset = canvas_size * 0.5 - world * self.scale;
    }

    /// Screen position to world, snapped when `grid_size` is given
    pub fn place(&self, screen: Vec2, grid_size: Option<f32>) -> Vec2 {
        let world = self.screen_to_world(screen);
        match grid_size {
            Some(grid) => snap_to_grid(world, grid),
            None => world,
        }
    }
}
