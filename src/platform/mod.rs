//! Platform abstraction layer
//!
//! The game talks to the outside world only through [`Backend`]:
//! - Window creation and fullscreen/resize
//! - Gamepad enumeration, axes and buttons
//! - Discrete events (keys, pointer, window close/resize)
//! - Drawing filled rectangles and text, presenting frames

use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::sim::{DisplayMetrics, Rect};

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use headless::HeadlessBackend;
#[cfg(target_arch = "wasm32")]
pub use web::WebBackend;

/// RGBA color, components in [0, 1]
pub type Color = [f32; 4];

/// Opaque handle for an input device, in discovery order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceId(pub u32);

/// Window presentation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    #[default]
    Windowed,
    Fullscreen,
}

/// Named keyboard keys the game can bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    /// Function key F1..F24
    F(u8),
    Escape,
    Pause,
    Enter,
    Space,
    /// Printable character, stored lowercase
    Char(char),
}

impl Key {
    /// Parse a key name ("F11", "Escape", "Space", "p", ...)
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Escape" | "Esc" => return Some(Key::Escape),
            "Pause" => return Some(Key::Pause),
            "Enter" | "Return" => return Some(Key::Enter),
            "Space" | " " => return Some(Key::Space),
            _ => {}
        }

        if let Some(n) = name.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
            return (1..=24).contains(&n).then_some(Key::F(n));
        }

        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if !c.is_control() => Some(Key::Char(c.to_ascii_lowercase())),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::F(n) => write!(f, "F{n}"),
            Key::Escape => f.write_str("Escape"),
            Key::Pause => f.write_str("Pause"),
            Key::Enter => f.write_str("Enter"),
            Key::Space => f.write_str("Space"),
            Key::Char(c) => write!(f, "{c}"),
        }
    }
}

impl TryFrom<String> for Key {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Key::from_name(&name).ok_or_else(|| format!("unknown key name: {name:?}"))
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

/// Raw event reported by a backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawEvent {
    /// Window close requested
    Quit,
    KeyDown(Key),
    /// Pointer moved to a position in display pixels
    PointerMove(IVec2),
    /// Primary pointer button pressed at a position
    PointerDown(IVec2),
    DeviceButtonDown { device: DeviceId, button: u32 },
    /// Window size changed outside of a requested resize
    Resized(DisplayMetrics),
    /// Host entered or left fullscreen (or refused a request)
    ModeChanged(WindowMode),
}

/// Where a text position sits relative to the rendered string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    TopLeft,
    TopRight,
    Center,
}

/// A string to draw
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub content: String,
    pub pos: IVec2,
    /// Font size in pixels
    pub size_px: u32,
    pub color: Color,
    pub anchor: TextAnchor,
}

/// One drawing operation
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    Rect { color: Color, rect: Rect },
    Text(Text),
}

/// Display/input collaborator the session runs against
pub trait Backend {
    /// Handle for the created window
    type Window;

    /// Full size of the physical display (used for fullscreen)
    fn display_bounds(&self) -> DisplayMetrics;

    fn create_window(&mut self, metrics: DisplayMetrics, mode: WindowMode) -> Self::Window;

    fn resize(&mut self, window: &Self::Window, metrics: DisplayMetrics, mode: WindowMode);

    /// Connected input devices in discovery order
    fn enumerate_devices(&mut self) -> Vec<DeviceId>;

    /// Axis reading in [-1, 1]; unknown devices or axes read 0
    fn axis_value(&self, device: DeviceId, axis: usize) -> f32;

    /// Next pending button press for a device, if any
    fn button_pressed_event(&mut self, device: DeviceId) -> Option<u32>;

    /// Drain discrete events since the last call
    fn poll_events(&mut self) -> Vec<RawEvent>;

    fn draw_filled_rect(&mut self, color: Color, rect: Rect);

    fn draw_text(&mut self, text: &Text);

    /// Show everything drawn since the previous present
    fn present_frame(&mut self);

    /// Release the window; called once when the session quits
    fn close(&mut self) {}
}
