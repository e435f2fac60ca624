//! Input routing
//!
//! Raw backend events become [`Command`]s through one dispatch function, and
//! stick positions become per-tick movement deltas.

use glam::{IVec2, Vec2};

use crate::consts::FPS_STEP;
use crate::platform::{Backend, DeviceId, RawEvent, WindowMode};
use crate::settings::Settings;
use crate::sim::{DisplayMetrics, SessionMode};

/// Normalized action derived from raw input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    ToggleFullscreen,
    ToggleFpsOverlay,
    /// Change the tick rate by this many frames per second
    AdjustFps(i32),
    TogglePause,
    /// Pointer click while the options menu is open
    MenuClick(IVec2),
    /// Pointer position update, for menu hover
    PointerMoved(IVec2),
    /// Display size changed
    Resize(DisplayMetrics),
    /// Host changed the window mode by itself
    WindowModeChanged(WindowMode),
    Quit,
}

/// Map a raw event to a command.
///
/// Returns `None` for events with no binding in the current mode; those are
/// ignored, not errors.
pub fn dispatch(event: &RawEvent, mode: SessionMode, settings: &Settings) -> Option<Command> {
    match *event {
        RawEvent::Quit => Some(Command::Quit),
        RawEvent::KeyDown(key) => {
            let keys = &settings.keys;
            if key == keys.toggle_fullscreen {
                Some(Command::ToggleFullscreen)
            } else if key == keys.toggle_fps_display {
                Some(Command::ToggleFpsOverlay)
            } else if key == keys.decrease_fps {
                Some(Command::AdjustFps(-FPS_STEP))
            } else if key == keys.increase_fps {
                Some(Command::AdjustFps(FPS_STEP))
            } else if key == keys.pause {
                Some(Command::TogglePause)
            } else {
                None
            }
        }
        RawEvent::DeviceButtonDown { button, .. } => settings
            .pause_buttons
            .contains(&button)
            .then_some(Command::TogglePause),
        RawEvent::PointerDown(pos) => {
            (mode == SessionMode::Paused).then_some(Command::MenuClick(pos))
        }
        RawEvent::PointerMove(pos) => Some(Command::PointerMoved(pos)),
        RawEvent::Resized(metrics) => Some(Command::Resize(metrics)),
        RawEvent::ModeChanged(mode) => Some(Command::WindowModeChanged(mode)),
    }
}

/// Read a device's stick as a movement delta.
///
/// Each axis is clamped to [-1, 1]; components inside the dead zone read
/// as zero.
pub fn sample_axes<B: Backend>(backend: &B, device: DeviceId, deadzone: f32) -> Vec2 {
    let read = |axis: usize| {
        let value = backend.axis_value(device, axis);
        if !value.is_finite() {
            return 0.0;
        }
        let value = value.clamp(-1.0, 1.0);
        if value.abs() < deadzone { 0.0 } else { value }
    };
    Vec2::new(read(0), read(1))
}
