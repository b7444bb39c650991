//! Listener cursor motion
//!
//! The listener is the point every node's distance is measured from. It
//! glides toward the position the user last pointed at, once per tick:
//!
//! - `Snap`: jumps straight to the target
//! - `Linear`: constant speed, lands exactly on the target
//! - `EaseOut`: covers a fixed fraction of the remaining distance per second

use serde::{Deserialize, Serialize};

use crate::types::{GlideMode, Vec2, DEFAULT_CURSOR};

/// Default linear glide speed (world units per second)
pub const DEFAULT_LINEAR_SPEED: f32 = 400.0;

/// Default ease-out rate (1/s); about 1.66% of the remaining distance per 16ms frame
pub const DEFAULT_EASE_SPEED: f32 = 1.0375;

/// Glide speeds, shared by the cursor and the options file
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlideSpeeds {
    pub linear_speed: f32,
    pub ease_speed: f32,
}

impl Default for GlideSpeeds {
    fn default() -> Self {
        Self {
            linear_speed: DEFAULT_LINEAR_SPEED,
            ease_speed: DEFAULT_EASE_SPEED,
        }
    }
}

/// Current and target listener position
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerCursor {
    position: Vec2,
    target: Vec2,
    mode: GlideMode,
    speeds: GlideSpeeds,
}

impl ListenerCursor {
    pub fn new(position: Vec2, mode: GlideMode, speeds: GlideSpeeds) -> Self {
        Self {
            position,
            target: position,
            mode,
            speeds,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn mode(&self) -> GlideMode {
        self.mode
    }

    pub fn speeds(&self) -> GlideSpeeds {
        self.speeds
    }

    pub fn set_speeds(&mut self, speeds: GlideSpeeds) {
        self.speeds = speeds;
    }

    /// Point the cursor somewhere new; `Snap` moves there immediately
    pub fn set_target(&mut self, target: Vec2) {
        if !target.is_finite() {
            log::warn!("ListenerCursor: ignoring non-finite target {:?}", target);
            return;
        }
        self.target = target;
        if self.mode == GlideMode::Snap {
            self.position = target;
        }
    }

    /// Switch glide mode; switching to `Snap` lands on the target at once
    pub fn set_mode(&mut self, mode: GlideMode) {
        self.mode = mode;
        if mode == GlideMode::Snap {
            self.position = self.target;
        }
    }

    /// Place the cursor without gliding
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
        self.target = position;
    }

    /// Move toward the target by one tick of `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        match self.mode {
            GlideMode::Snap => self.position = self.target,
            GlideMode::Linear => {
                let delta = self.target - self.position;
                let remaining = delta.length();
                let step = self.speeds.linear_speed.max(0.0) * dt;
                if remaining <= step {
                    self.position = self.target;
                } else {
                    self.position += delta * (step / remaining);
                }
            }
            GlideMode::EaseOut => {
                let factor = (dt * self.speeds.ease_speed.max(0.0)).min(1.0);
                if factor >= 1.0 {
                    self.position = self.target;
                } else {
                    self.position += (self.target - self.position) * factor;
                }
            }
        }
    }

    /// Whether the cursor has reached its target
    pub fn is_settled(&self) -> bool {
        self.position == self.target
    }
}

impl Default for ListenerCursor {
    fn default() -> Self {
        Self::new(DEFAULT_CURSOR, GlideMode::default(), GlideSpeeds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(mode: GlideMode) -> ListenerCursor {
        ListenerCursor::new(Vec2::ZERO, mode, GlideSpeeds::default())
    }

    #[test]
    fn test_snap_follows_target_exactly() {
        let mut c = cursor(GlideMode::Snap);
        c.set_target(Vec2::new(300.0, -40.0));
        assert_eq!(c.position(), Vec2::new(300.0, -40.0));
        c.advance(0.016);
        assert!(c.is_settled());
    }

    #[test]
    fn test_linear_steps_and_never_overshoots() {
        let mut c = cursor(GlideMode::Linear);
        c.set_target(Vec2::new(100.0, 0.0));

        c.advance(0.1); // 40 units
        assert!((c.position().x - 40.0).abs() < 1e-4);

        let mut last = c.position().distance(c.target());
        for _ in 0..20 {
            c.advance(0.1);
            let remaining = c.position().distance(c.target());
            assert!(remaining <= last);
            assert!(c.position().x <= 100.0);
            last = remaining;
        }
        assert_eq!(c.position(), Vec2::new(100.0, 0.0));
    }

    #[test]
    fn test_ease_out_decays() {
        let mut c = cursor(GlideMode::EaseOut);
        c.set_target(Vec2::new(1000.0, 0.0));
        c.advance(0.016);
        let expected = 1000.0 * 0.016 * DEFAULT_EASE_SPEED;
        assert!((c.position().x - expected).abs() < 1e-3);

        // Huge dt clamps the factor to 1
        c.advance(10.0);
        assert!(c.is_settled());
    }

    #[test]
    fn test_switching_to_snap_lands_on_target() {
        let mut c = cursor(GlideMode::Linear);
        c.set_target(Vec2::new(500.0, 500.0));
        assert_eq!(c.position(), Vec2::ZERO);

        c.set_mode(GlideMode::Snap);
        assert_eq!(c.position(), Vec2::new(500.0, 500.0));
    }

    #[test]
    fn test_teleport_and_bad_input() {
        let mut c = cursor(GlideMode::Linear);
        c.teleport(Vec2::new(7.0, 8.0));
        assert!(c.is_settled());

        c.set_target(Vec2::new(f32::NAN, 0.0));
        assert_eq!(c.target(), Vec2::new(7.0, 8.0));

        c.set_target(Vec2::new(10.0, 8.0));
        c.advance(-1.0);
        assert_eq!(c.position(), Vec2::new(7.0, 8.0));
    }
}
