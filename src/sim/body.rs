//! Kinematic bodies: axis-aligned boxes with a velocity

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle whose bottom edge is centred on `(cx, bottom)`
    pub fn from_midbottom(cx: f32, bottom: f32, w: f32, h: f32) -> Self {
        Self::new(cx - w * 0.5, bottom - h, w, h)
    }

    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w * 0.5, center.y - h * 0.5, w, h)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.w * 0.5
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.h * 0.5
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.center_y())
    }

    /// Strict overlap: rectangles that only share an edge do not intersect
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Resize vertically keeping the bottom edge in place
    pub fn set_height_keep_bottom(&mut self, h: f32) {
        let bottom = self.bottom();
        self.h = h;
        self.y = bottom - h;
    }

    pub fn translated(&self, offset: Vec2) -> Rect {
        Rect::new(self.x + offset.x, self.y + offset.y, self.w, self.h)
    }
}

/// Horizontal facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1.0 for left, 1.0 for right
    #[inline]
    pub fn dir(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing that looks from `from_x` toward `to_x` (right when equal)
    pub fn toward(from_x: f32, to_x: f32) -> Self {
        if to_x < from_x { Facing::Left } else { Facing::Right }
    }
}

/// Position, size and velocity of anything that moves
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub rect: Rect,
    /// Pixels per second
    pub vel: Vec2,
    /// Set by the collision resolver each frame
    pub grounded: bool,
}

impl Body {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            vel: Vec2::ZERO,
            grounded: false,
        }
    }

    /// Accelerate downward, clamped at terminal velocity
    pub fn apply_gravity(&mut self, gravity: f32, max_fall: f32, dt: f32) {
        self.vel.y = (self.vel.y + gravity * dt).min(max_fall);
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }
}
