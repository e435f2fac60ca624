//! What the player sees: the options menu and the per-frame scene

pub mod menu;
pub mod scene;

pub use menu::{MenuButton, MenuItem};
pub use scene::{Overlay, build};

/// Colors for game elements
pub mod colors {
    use crate::platform::Color;

    pub const MARGIN: Color = [240.0 / 255.0, 240.0 / 255.0, 240.0 / 255.0, 1.0];
    pub const PLAY_AREA: Color = [220.0 / 255.0, 220.0 / 255.0, 220.0 / 255.0, 1.0];
    pub const PLAYER_ONE: Color = [1.0, 0.0, 0.0, 1.0];
    pub const PLAYER_TWO: Color = [0.0, 0.0, 1.0, 1.0];
    pub const TARGET: Color = [0.0, 1.0, 0.0, 1.0];
    pub const TEXT: Color = [0.0, 0.0, 0.0, 1.0];
    /// Dims the board behind the options menu
    pub const OVERLAY: Color = [0.0, 0.0, 0.0, 0.5];
    pub const BUTTON: Color = [0.25, 0.25, 0.3, 1.0];
    pub const BUTTON_HOVER: Color = [0.4, 0.4, 0.55, 1.0];
    pub const MENU_TEXT: Color = [1.0, 1.0, 1.0, 1.0];
}
