//! Common types for Soundscape
//!
//! This module contains the fundamental geometry and identity types used
//! throughout the soundscape editor core, along with the shared defaults.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Influence radius given to nodes that don't specify one (world units)
pub const DEFAULT_RADIUS: f32 = 120.0;

/// Where the listener cursor starts on a fresh map (world units)
pub const DEFAULT_CURSOR: Vec2 = Vec2 { x: 200.0, y: 200.0 };

/// Loop count meaning "repeat forever"
pub const LOOP_INFINITE: i32 = -1;

/// Number of playback channels a backend offers by default
pub const DEFAULT_CHANNEL_COUNT: usize = 32;

/// Grid spacing used when snapping nodes (world units)
pub const DEFAULT_GRID_SIZE: f32 = 40.0;

/// A point or offset in 2D world space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length
    #[inline]
    pub fn length(&self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point
    #[inline]
    pub fn distance(&self, other: Vec2) -> f32 {
        (*self - other).length()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    #[inline]
    fn mul(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Stable identity of a placed node
///
/// Ids are handed out in increasing order by the owning `Soundscape` and are
/// never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a node's audio loops unconditionally or only while the listener is inside it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayStyle {
    /// Started once when the sound becomes available, then runs continuously
    #[default]
    #[serde(rename = "loop_forever")]
    LoopForever,
    /// Started when the cursor enters the radius, stopped when it leaves
    #[serde(rename = "cursor_enter")]
    PlayOnCursorEnter,
}

impl PlayStyle {
    /// Get the display name of this play style
    pub fn name(&self) -> &'static str {
        match self {
            PlayStyle::LoopForever => "Loop Forever",
            PlayStyle::PlayOnCursorEnter => "Play On Cursor Enter",
        }
    }
}

/// Interpolation policy for the listener cursor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlideMode {
    /// Position always equals the latest input
    Snap,
    /// Constant-speed movement toward the input
    #[default]
    Linear,
    /// Exponential approach toward the input
    EaseOut,
}

impl GlideMode {
    pub const ALL: [GlideMode; 3] = [GlideMode::Snap, GlideMode::Linear, GlideMode::EaseOut];

    /// Get the display name of this glide mode
    pub fn name(&self) -> &'static str {
        match self {
            GlideMode::Snap => "Snap",
            GlideMode::Linear => "Linear",
            GlideMode::EaseOut => "Ease Out",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(b.distance(a), 5.0);
    }

    #[test]
    fn test_play_style_serde_names() {
        assert_eq!(
            serde_json::to_string(&PlayStyle::LoopForever).unwrap(),
            "\"loop_forever\""
        );
        assert_eq!(
            serde_json::from_str::<PlayStyle>("\"cursor_enter\"").unwrap(),
            PlayStyle::PlayOnCursorEnter
        );
    }

    #[test]
    fn test_glide_mode_names() {
        let names: Vec<_> = GlideMode::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["Snap", "Linear", "Ease Out"]);
        assert_eq!(
            serde_json::from_str::<GlideMode>("\"ease_out\"").unwrap(),
            GlideMode::EaseOut
        );
    }
}
