//! Pixel Pursuit - A two-player target-chasing minigame
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, movement, collisions, game state)
//! - `input`: Raw device/key events to commands
//! - `ui`: Options menu and per-frame scene layout
//! - `session`: Owned top-level loop tying a backend to the simulation
//! - `platform`: Display/input backend contract and implementations
//! - `renderer`: WebGPU rectangle pipeline
//! - `settings`: Data-driven configuration

pub mod input;
pub mod pacing;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod ui;

pub use session::{Flow, Session, StartupError};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Number of players (and bound input devices)
    pub const PLAYER_COUNT: usize = 2;

    /// Margin around the play area, as a fraction of each display dimension
    pub const MARGIN_PERCENT: f32 = 0.05;
    /// Player square side, as a fraction of play area height
    pub const SQUARE_PERCENT: f32 = 0.08;
    /// Target square side, as a fraction of play area height
    pub const TARGET_PERCENT: f32 = 0.05;
    /// Pixels per tick at full stick deflection, as a fraction of play area width
    pub const SPEED_PERCENT: f32 = 0.00625;

    /// Frame rate bounds
    pub const MIN_FPS: u32 = 1;
    pub const MAX_FPS: u32 = 144;
    pub const DEFAULT_FPS: u32 = 60;
    /// Step used by the FPS adjust keys
    pub const FPS_STEP: i32 = 10;

    /// Windowed mode size relative to the display bounds
    pub const DEFAULT_WINDOWED_SCALE: f32 = 0.8;
}

/// Round half away from zero and saturate into `i32`.
#[inline]
pub fn round_px(value: f32) -> i32 {
    value.round() as i32
}
