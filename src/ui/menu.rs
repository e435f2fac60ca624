//! Options menu shown while paused
//!
//! Button rectangles are a pure function of the display metrics, so hover
//! highlighting and click dispatch always test against the same layout.

use glam::IVec2;

use crate::round_px;
use crate::sim::{DisplayMetrics, Rect};

/// Button width relative to display width
const BUTTON_WIDTH_PERCENT: f32 = 0.30;
/// Button height relative to display height
const BUTTON_HEIGHT_PERCENT: f32 = 0.08;
/// Vertical gap between buttons relative to display height
const BUTTON_GAP_PERCENT: f32 = 0.03;

/// Fixed menu entries, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Resume,
    ToggleFullscreen,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 3] = [MenuItem::Resume, MenuItem::ToggleFullscreen, MenuItem::Quit];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Resume => "Resume",
            MenuItem::ToggleFullscreen => "Toggle Fullscreen",
            MenuItem::Quit => "Quit",
        }
    }
}

/// A laid-out menu button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuButton {
    pub item: MenuItem,
    pub rect: Rect,
}

/// Lay out the buttons: equal size, stacked and centered on the display
pub fn layout(metrics: DisplayMetrics) -> [MenuButton; 3] {
    let extent = metrics.extent();
    let width = round_px(extent.x as f32 * BUTTON_WIDTH_PERCENT);
    let height = round_px(extent.y as f32 * BUTTON_HEIGHT_PERCENT);
    let gap = round_px(extent.y as f32 * BUTTON_GAP_PERCENT);

    let count = MenuItem::ALL.len() as i32;
    let stack_height = count * height + (count - 1) * gap;
    let left = (extent.x - width) / 2;
    let top = (extent.y - stack_height) / 2;

    let mut index = 0;
    MenuItem::ALL.map(|item| {
        let rect = Rect::new(left, top + index * (height + gap), width, height);
        index += 1;
        MenuButton { item, rect }
    })
}

/// Anchor for the "Options" title: centered one button height above the stack
pub fn title_anchor(metrics: DisplayMetrics) -> IVec2 {
    let first = layout(metrics)[0].rect;
    IVec2::new(first.center().x, first.top() - first.size.y)
}

/// Menu entry under `point`, if any
pub fn hit_test(metrics: DisplayMetrics, point: IVec2) -> Option<MenuItem> {
    layout(metrics)
        .into_iter()
        .find(|button| button.rect.contains(point))
        .map(|button| button.item)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: DisplayMetrics = DisplayMetrics::new(1000, 800);

    #[test]
    fn test_layout_is_centered_stack() {
        let buttons = layout(METRICS);
        // 300x64 buttons, 24 px gaps, stack of 240 centered in 800
        assert_eq!(buttons[0].rect, Rect::new(350, 280, 300, 64));
        assert_eq!(buttons[1].rect, Rect::new(350, 368, 300, 64));
        assert_eq!(buttons[2].rect, Rect::new(350, 456, 300, 64));
        assert_eq!(
            buttons.map(|b| b.item),
            [MenuItem::Resume, MenuItem::ToggleFullscreen, MenuItem::Quit]
        );
    }

    #[test]
    fn test_hit_test() {
        assert_eq!(hit_test(METRICS, IVec2::new(500, 300)), Some(MenuItem::Resume));
        assert_eq!(hit_test(METRICS, IVec2::new(351, 400)), Some(MenuItem::ToggleFullscreen));
        assert_eq!(hit_test(METRICS, IVec2::new(649, 519)), Some(MenuItem::Quit));
        // Gap between buttons
        assert_eq!(hit_test(METRICS, IVec2::new(500, 350)), None);
        // Right edge is exclusive
        assert_eq!(hit_test(METRICS, IVec2::new(650, 300)), None);
    }

    #[test]
    fn test_layout_follows_metrics() {
        let small = layout(METRICS);
        let large = layout(DisplayMetrics::new(1920, 1080));
        assert_ne!(small[0].rect, large[0].rect);
        // The same screen point can hit different buttons after a resize
        let point = small[0].rect.center();
        assert_eq!(hit_test(METRICS, point), Some(MenuItem::Resume));
        assert_ne!(hit_test(DisplayMetrics::new(1920, 1080), point), Some(MenuItem::Resume));
    }

    #[test]
    fn test_title_above_first_button() {
        assert_eq!(title_anchor(METRICS), IVec2::new(500, 216));
    }
}
