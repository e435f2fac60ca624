//! Running/Paused mode state machine
//!
//! The mode gates the simulation step and decides where pointer clicks go.
//! Commands that don't concern the mode pass through unchanged.

use super::geometry::DisplayMetrics;
use crate::input::Command;
use crate::ui::menu::{self, MenuItem};

/// Current session mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Simulation active
    #[default]
    Running,
    /// Options overlay shown, simulation frozen
    Paused,
}

impl SessionMode {
    pub fn is_running(self) -> bool {
        self == SessionMode::Running
    }

    pub fn toggled(self) -> Self {
        match self {
            SessionMode::Running => SessionMode::Paused,
            SessionMode::Paused => SessionMode::Running,
        }
    }
}

/// Side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    ToggleFullscreen,
    Quit,
}

/// Result of feeding one command to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub mode: SessionMode,
    pub effect: Effect,
}

impl Transition {
    fn stay(mode: SessionMode) -> Self {
        Self {
            mode,
            effect: Effect::None,
        }
    }
}

/// Feed a command to the state machine.
///
/// Menu clicks are hit-tested against button rectangles derived from
/// `metrics` at the time of the click.
pub fn transition(mode: SessionMode, command: &Command, metrics: DisplayMetrics) -> Transition {
    match *command {
        Command::TogglePause => Transition::stay(mode.toggled()),
        Command::ToggleFullscreen => Transition {
            mode,
            effect: Effect::ToggleFullscreen,
        },
        Command::Quit => Transition {
            mode,
            effect: Effect::Quit,
        },
        Command::MenuClick(pos) if mode == SessionMode::Paused => {
            match menu::hit_test(metrics, pos) {
                Some(item) => select(item),
                None => Transition::stay(mode),
            }
        }
        _ => Transition::stay(mode),
    }
}

/// Transition for an activated menu entry (only reachable while paused)
fn select(item: MenuItem) -> Transition {
    match item {
        MenuItem::Resume => Transition::stay(SessionMode::Running),
        MenuItem::ToggleFullscreen => Transition {
            mode: SessionMode::Paused,
            effect: Effect::ToggleFullscreen,
        },
        MenuItem::Quit => Transition {
            mode: SessionMode::Paused,
            effect: Effect::Quit,
        },
    }
}
