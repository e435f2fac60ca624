//! Display-relative geometry
//!
//! Every spatial quantity in the game (margins, play area, entity sizes,
//! speed) is derived from the display dimensions here:
//! - margin: 5% of each display dimension
//! - square side: 8% of play area height
//! - target side: 5% of play area height
//! - speed: 0.625% of play area width, in pixels per tick

use glam::IVec2;

use crate::consts::{MARGIN_PERCENT, SPEED_PERCENT, SQUARE_PERCENT, TARGET_PERCENT};
use crate::round_px;

/// Raw display (window or screen) size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMetrics {
    pub width: u32,
    pub height: u32,
}

impl DisplayMetrics {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Scale both dimensions by `factor`, keeping each at least one pixel
    pub fn scaled(self, factor: f32) -> Self {
        let scale = |v: u32| ((v as f32 * factor).round() as u32).max(1);
        Self::new(scale(self.width), scale(self.height))
    }

    /// Size as a signed pixel vector
    #[inline]
    pub fn extent(&self) -> IVec2 {
        let to_i32 = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        IVec2::new(to_i32(self.width), to_i32(self.height))
    }
}

/// Axis-aligned pixel rectangle (top-left origin, y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub pos: IVec2,
    pub size: IVec2,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            pos: IVec2::new(x, y),
            size: IVec2::new(width, height),
        }
    }

    /// Square of side `size` with its top-left corner at `pos`
    pub const fn square(pos: IVec2, size: i32) -> Self {
        Self {
            pos,
            size: IVec2::new(size, size),
        }
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.pos.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.pos.y
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> IVec2 {
        self.pos + self.size / 2
    }

    /// Point-in-rectangle test (left/top inclusive, right/bottom exclusive)
    pub fn contains(&self, point: IVec2) -> bool {
        point.x >= self.left()
            && point.x < self.right()
            && point.y >= self.top()
            && point.y < self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle
    pub fn encloses(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Clamp the top-left corner of a square of side `size` so the square
    /// stays inside this rectangle.
    ///
    /// This is the only bounds enforcement for entities: movement, resize
    /// and spawning all go through it.
    pub fn clamp_square(&self, pos: IVec2, size: i32) -> IVec2 {
        IVec2::new(
            clamp_axis(pos.x, self.left(), self.right(), size),
            clamp_axis(pos.y, self.top(), self.bottom(), size),
        )
    }

    /// Largest valid top-left corner for a square of side `size`
    pub fn max_square_origin(&self, size: i32) -> IVec2 {
        IVec2::new(
            (self.right() - size).max(self.left()),
            (self.bottom() - size).max(self.top()),
        )
    }
}

/// `lo` wins when the square is wider than the span
#[inline]
fn clamp_axis(value: i32, lo: i32, hi: i32, size: i32) -> i32 {
    value.min(hi - size).max(lo)
}

/// Geometry derived from the current display metrics.
///
/// Always rebuilt as a whole value, so sizes and speed never mix metrics
/// from different resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub metrics: DisplayMetrics,
    /// Horizontal and vertical margin in pixels
    pub margin: IVec2,
    /// Rectangle entities are confined to
    pub play_area: Rect,
    /// Player square side
    pub square_size: i32,
    /// Target square side
    pub target_size: i32,
    /// Pixels moved per tick at full deflection
    pub speed: i32,
}

impl Geometry {
    /// Derive geometry for a display
    pub fn new(metrics: DisplayMetrics) -> Self {
        let extent = metrics.extent();
        let margin = IVec2::new(
            round_px(extent.x as f32 * MARGIN_PERCENT),
            round_px(extent.y as f32 * MARGIN_PERCENT),
        );
        let area_size = (extent - margin * 2).max(IVec2::ZERO);

        Self::with_play_area(metrics, Rect { pos: margin, size: area_size })
    }

    /// Derive entity sizes and speed from an explicit play area
    pub fn with_play_area(metrics: DisplayMetrics, play_area: Rect) -> Self {
        let area_w = play_area.size.x as f32;
        let area_h = play_area.size.y as f32;

        Self {
            metrics,
            margin: play_area.pos,
            play_area,
            square_size: round_px(area_h * SQUARE_PERCENT).max(0),
            target_size: round_px(area_h * TARGET_PERCENT).max(0),
            speed: round_px(area_w * SPEED_PERCENT).max(0),
        }
    }

    /// Player starting positions: 1/4 and 3/4 across, halfway down
    pub fn player_starts(&self) -> [IVec2; 2] {
        let area = self.play_area;
        let y = area.top() + area.size.y / 2;
        [
            IVec2::new(area.left() + area.size.x / 4, y),
            IVec2::new(area.left() + area.size.x * 3 / 4, y),
        ]
        .map(|pos| area.clamp_square(pos, self.square_size))
    }

    /// Clamp a player square into the play area
    #[inline]
    pub fn clamp_player(&self, pos: IVec2) -> IVec2 {
        self.play_area.clamp_square(pos, self.square_size)
    }

    /// Clamp the target square into the play area
    #[inline]
    pub fn clamp_target(&self, pos: IVec2) -> IVec2 {
        self.play_area.clamp_square(pos, self.target_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_geometry_from_display() {
        let geo = Geometry::new(DisplayMetrics::new(1000, 800));
        assert_eq!(geo.margin, IVec2::new(50, 40));
        assert_eq!(geo.play_area, Rect::new(50, 40, 900, 720));
        // 720 * 0.08 = 57.6
        assert_eq!(geo.square_size, 58);
        // 720 * 0.05 = 36
        assert_eq!(geo.target_size, 36);
        // 900 * 0.00625 = 5.625
        assert_eq!(geo.speed, 6);
    }

    #[test]
    fn test_margin_rounds_half_away_from_zero() {
        // 1010 * 0.05 = 50.5, 730 * 0.05 = 36.5
        let geo = Geometry::new(DisplayMetrics::new(1010, 730));
        assert_eq!(geo.margin, IVec2::new(51, 37));
        assert_eq!(geo.play_area.size, IVec2::new(1010 - 102, 730 - 74));
    }

    #[test]
    fn test_with_play_area_example_sizes() {
        let geo = Geometry::with_play_area(DisplayMetrics::new(900, 600), Rect::new(0, 0, 900, 600));
        assert_eq!(geo.square_size, 48);
        assert_eq!(geo.target_size, 30);
        assert_eq!(geo.speed, 6);
    }

    #[test]
    fn test_clamp_square() {
        let area = Rect::new(10, 20, 100, 50);

        // Already inside: unchanged
        assert_eq!(area.clamp_square(IVec2::new(30, 30), 10), IVec2::new(30, 30));
        // Past the right/bottom edges: pulled back by the square size
        assert_eq!(area.clamp_square(IVec2::new(500, 500), 10), IVec2::new(100, 60));
        // Past the left/top edges
        assert_eq!(area.clamp_square(IVec2::new(-5, 0), 10), IVec2::new(10, 20));
    }

    #[test]
    fn test_clamp_square_larger_than_area_pins_to_origin() {
        let area = Rect::new(10, 20, 5, 5);
        assert_eq!(area.clamp_square(IVec2::new(40, 40), 8), IVec2::new(10, 20));
    }

    #[test]
    fn test_contains_is_half_open() {
        let rect = Rect::new(0, 0, 10, 10);
        assert!(rect.contains(IVec2::new(0, 0)));
        assert!(rect.contains(IVec2::new(9, 9)));
        assert!(!rect.contains(IVec2::new(10, 5)));
        assert!(!rect.contains(IVec2::new(5, 10)));
    }

    #[test]
    fn test_player_starts() {
        let geo = Geometry::with_play_area(DisplayMetrics::new(900, 600), Rect::new(0, 0, 900, 600));
        let [p1, p2] = geo.player_starts();
        assert_eq!(p1, IVec2::new(225, 300));
        assert_eq!(p2, IVec2::new(675, 300));
    }

    #[test]
    fn test_scaled_metrics() {
        let m = DisplayMetrics::new(1920, 1080).scaled(0.8);
        assert_eq!(m, DisplayMetrics::new(1536, 864));
        assert_eq!(DisplayMetrics::new(1, 1).scaled(0.1), DisplayMetrics::new(1, 1));
    }

    proptest! {
        #[test]
        fn prop_geometry_within_display(w in 1u32..8000, h in 1u32..8000) {
            let geo = Geometry::new(DisplayMetrics::new(w, h));
            let display = Rect::new(0, 0, w as i32, h as i32);

            prop_assert!(geo.square_size >= 0);
            prop_assert!(geo.target_size >= 0);
            prop_assert!(geo.speed >= 0);
            prop_assert!(display.encloses(&geo.play_area));
        }

        #[test]
        fn prop_geometry_is_deterministic(w in 1u32..8000, h in 1u32..8000) {
            let m = DisplayMetrics::new(w, h);
            prop_assert_eq!(Geometry::new(m), Geometry::new(m));
        }

        #[test]
        fn prop_clamp_keeps_square_inside(
            w in 100u32..4000,
            h in 100u32..4000,
            x in -10_000i32..10_000,
            y in -10_000i32..10_000,
        ) {
            let geo = Geometry::new(DisplayMetrics::new(w, h));
            prop_assume!(geo.square_size <= geo.play_area.size.x);

            let pos = geo.clamp_player(IVec2::new(x, y));
            prop_assert!(geo.play_area.encloses(&Rect::square(pos, geo.square_size)));
            // Clamping a valid position is a no-op
            prop_assert_eq!(geo.clamp_player(pos), pos);
        }
    }
}
