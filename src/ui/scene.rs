//! Per-frame scene layout
//!
//! Decides what to draw and where; backends only rasterize the result.

use glam::IVec2;

use super::colors;
use super::menu;
use crate::platform::{DrawCall, Text, TextAnchor};
use crate::round_px;
use crate::sim::{GameState, Rect, SessionMode};

/// Score font size relative to display height
const SCORE_FONT_PERCENT: f32 = 0.06;
/// Score inset relative to display width
const SCORE_INSET_PERCENT: f32 = 0.0125;
/// FPS counter font size relative to display height
const FPS_FONT_PERCENT: f32 = 0.03;
/// FPS counter inset from the top-right corner, in pixels
const FPS_INSET: i32 = 10;
/// Menu label size relative to button height
const LABEL_FONT_RATIO: f32 = 0.5;

/// Inputs to the scene besides the game state
#[derive(Debug, Clone, Copy, Default)]
pub struct Overlay {
    /// Last known pointer position, for menu hover
    pub pointer: Option<IVec2>,
    /// Measured frame rate for the FPS counter
    pub measured_fps: u32,
}

/// Build the draw list for the current state, back to front
pub fn build(state: &GameState, overlay: Overlay) -> Vec<DrawCall> {
    let geometry = state.geometry();
    let extent = geometry.metrics.extent();
    let mut calls = Vec::with_capacity(16);

    let rect = |color, rect| DrawCall::Rect { color, rect };

    // Board
    calls.push(rect(colors::MARGIN, Rect::new(0, 0, extent.x, extent.y)));
    calls.push(rect(colors::PLAY_AREA, geometry.play_area));
    calls.push(rect(colors::PLAYER_ONE, state.player_rect(0)));
    calls.push(rect(colors::PLAYER_TWO, state.player_rect(1)));
    calls.push(rect(colors::TARGET, state.target_rect()));

    // HUD
    let inset = round_px(extent.x as f32 * SCORE_INSET_PERCENT);
    calls.push(DrawCall::Text(Text {
        content: format!(
            "Player 1 Score: {}  Player 2 Score: {}",
            state.scores[0], state.scores[1]
        ),
        pos: IVec2::new(inset, inset),
        size_px: font_px(extent.y, SCORE_FONT_PERCENT),
        color: colors::TEXT,
        anchor: TextAnchor::TopLeft,
    }));

    if state.show_fps {
        calls.push(DrawCall::Text(Text {
            content: format!("FPS: {}", overlay.measured_fps),
            pos: IVec2::new(extent.x - FPS_INSET, FPS_INSET),
            size_px: font_px(extent.y, FPS_FONT_PERCENT),
            color: colors::TEXT,
            anchor: TextAnchor::TopRight,
        }));
    }

    if state.mode == SessionMode::Paused {
        push_menu(&mut calls, state, overlay.pointer);
    }

    calls
}

fn push_menu(calls: &mut Vec<DrawCall>, state: &GameState, pointer: Option<IVec2>) {
    let metrics = state.metrics();
    let extent = metrics.extent();
    let buttons = menu::layout(metrics);
    let hovered = pointer.and_then(|p| menu::hit_test(metrics, p));
    let label_px = (buttons[0].rect.size.y as f32 * LABEL_FONT_RATIO).round().max(1.0) as u32;

    calls.push(DrawCall::Rect {
        color: colors::OVERLAY,
        rect: Rect::new(0, 0, extent.x, extent.y),
    });
    calls.push(DrawCall::Text(Text {
        content: "Options".to_string(),
        pos: menu::title_anchor(metrics),
        size_px: label_px * 2,
        color: colors::MENU_TEXT,
        anchor: TextAnchor::Center,
    }));

    for button in buttons {
        let color = if hovered == Some(button.item) {
            colors::BUTTON_HOVER
        } else {
            colors::BUTTON
        };
        calls.push(DrawCall::Rect {
            color,
            rect: button.rect,
        });
        calls.push(DrawCall::Text(Text {
            content: button.item.label().to_string(),
            pos: button.rect.center(),
            size_px: label_px,
            color: colors::MENU_TEXT,
            anchor: TextAnchor::Center,
        }));
    }
}

fn font_px(display_height: i32, percent: f32) -> u32 {
    round_px(display_height as f32 * percent).max(1) as u32
}
