//! Game settings
//!
//! Supplied by the host (JSON) or defaulted; never persisted. Out-of-range
//! values are clamped by [`Settings::validated`] rather than rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{DEFAULT_FPS, DEFAULT_WINDOWED_SCALE, MAX_FPS, MIN_FPS};
use crate::platform::Key;

/// Largest accepted stick dead zone
pub const MAX_DEADZONE: f32 = 0.9;

/// Settings parse failure
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Keyboard bindings for the global commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub toggle_fullscreen: Key,
    pub toggle_fps_display: Key,
    pub decrease_fps: Key,
    pub increase_fps: Key,
    pub pause: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            toggle_fullscreen: Key::F(11),
            toggle_fps_display: Key::F(3),
            decrease_fps: Key::F(6),
            increase_fps: Key::F(7),
            pause: Key::Escape,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Initial tick rate
    pub target_fps: u32,
    /// Show the FPS counter from the start
    pub show_fps: bool,
    /// Windowed size relative to the display bounds
    pub windowed_scale: f32,
    /// Stick deflection below this reads as zero
    pub axis_deadzone: f32,
    /// Gamepad buttons that toggle pause (Start/Options on common pads)
    pub pause_buttons: Vec<u32>,
    pub keys: KeyBindings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_fps: DEFAULT_FPS,
            show_fps: false,
            windowed_scale: DEFAULT_WINDOWED_SCALE,
            axis_deadzone: 0.0,
            pause_buttons: vec![7, 9],
            keys: KeyBindings::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    /// Parse settings, falling back to defaults on error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => {
                log::info!("Loaded settings");
                settings
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    /// Clamp every value into its valid range
    pub fn validated(mut self) -> Self {
        self.target_fps = self.target_fps.clamp(MIN_FPS, MAX_FPS);
        self.windowed_scale = if self.windowed_scale.is_finite() {
            self.windowed_scale.clamp(0.1, 1.0)
        } else {
            DEFAULT_WINDOWED_SCALE
        };
        self.axis_deadzone = if self.axis_deadzone.is_finite() {
            self.axis_deadzone.clamp(0.0, MAX_DEADZONE)
        } else {
            0.0
        };
        self
    }
}
