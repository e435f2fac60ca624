//! Collision detection between axis-aligned squares
//!
//! Overlap uses half-open intervals: squares that only share an edge do not
//! collide.

use glam::IVec2;

use super::geometry::Rect;

/// Whether two squares (top-left corner, side) overlap
#[inline]
pub fn squares_overlap(a_pos: IVec2, a_size: i32, b_pos: IVec2, b_size: i32) -> bool {
    rects_overlap(&Rect::square(a_pos, a_size), &Rect::square(b_pos, b_size))
}

/// Axis-aligned rectangle overlap test
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}
