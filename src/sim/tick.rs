//! Simulation tick
//!
//! Advances the board by one step: move, clamp, collide, score, respawn.

use glam::{IVec2, Vec2};

use super::collision::rects_overlap;
use super::state::{GameEvent, GameState};
use crate::consts::PLAYER_COUNT;
use crate::round_px;

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Stick deflection per player, each axis in [-1, 1].
    /// `None` when the player has no bound device.
    pub moves: [Option<Vec2>; PLAYER_COUNT],
}

impl TickInput {
    /// Input with the same deflection for every player
    pub fn all(delta: Vec2) -> Self {
        Self {
            moves: [Some(delta); PLAYER_COUNT],
        }
    }
}

/// Advance the game state by one tick.
///
/// Does nothing while paused. Players are processed in index order and both
/// are always processed, even when the first one captures the target.
pub fn tick(state: &mut GameState, input: &TickInput) {
    if !state.mode.is_running() {
        return;
    }

    state.time_ticks += 1;

    for player in 0..PLAYER_COUNT {
        let Some(delta) = input.moves[player] else {
            continue;
        };

        move_player(state, player, delta);

        if rects_overlap(&state.player_rect(player), &state.target_rect()) {
            state.scores[player] += 1;
            state.events.push(GameEvent::TargetCaptured {
                player,
                score: state.scores[player],
            });
            state.respawn_target();
        }
    }
}

/// Displace a player by `delta × speed` and clamp into the play area
fn move_player(state: &mut GameState, player: usize, delta: Vec2) {
    let speed = state.geometry().speed as f32;
    let step = IVec2::new(round_px(delta.x * speed), round_px(delta.y * speed));
    let pos = state.entities.players[player] + step;
    state.entities.players[player] = state.geometry().clamp_player(pos);
}
