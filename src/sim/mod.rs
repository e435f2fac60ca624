//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable player order (player 0 before player 1)
//! - Geometry derived from display metrics in one place
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod mode;
pub mod state;
pub mod tick;

pub use collision::{rects_overlap, squares_overlap};
pub use geometry::{DisplayMetrics, Geometry, Rect};
pub use mode::{Effect, SessionMode, Transition, transition};
pub use state::{Entities, GameEvent, GameState};
pub use tick::{TickInput, tick};
