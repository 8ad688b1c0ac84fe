//! Integer rectangles used for filter regions and change rects.
//!
//! Semantics follow the usual raster-editor conventions: `right()` and
//! `bottom()` are inclusive, an empty rectangle contains nothing and is
//! contained by nothing.

use serde::{Deserialize, Serialize};

/// Axis-aligned integer rectangle (x, y, width, height).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    /// Inclusive right edge.
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width - 1
    }

    /// Inclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height - 1
    }

    /// Move the edges: `dx1`/`dy1` shift the top-left corner, `dx2`/`dy2`
    /// the bottom-right one.
    pub fn adjusted(&self, dx1: i32, dy1: i32, dx2: i32, dy2: i32) -> Self {
        Self::new(
            self.x + dx1,
            self.y + dy1,
            self.width - dx1 + dx2,
            self.height - dy1 + dy2,
        )
    }

    #[inline]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        !self.is_empty() && x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// True when `other` lies fully inside `self`. Empty rectangles are never
    /// contained.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn intersected(&self, other: &Rect) -> Rect {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 < x1 || y2 < y1 {
            return Rect::default();
        }
        Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1)
    }

    pub fn united(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.right().max(other.right());
        let y2 = self.bottom().max(other.bottom());
        Rect::new(x1, y1, x2 - x1 + 1, y2 - y1 + 1)
    }
}
