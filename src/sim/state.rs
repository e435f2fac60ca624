//! Game state and core simulation types
//!
//! One owned record holds the geometry, the entities, the scores and the
//! session flags. Geometry and entity positions are only ever changed
//! together (see [`GameState::resize`]).

use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::geometry::{DisplayMetrics, Geometry, Rect};
use super::mode::SessionMode;
use crate::consts::{DEFAULT_FPS, MAX_FPS, MIN_FPS, PLAYER_COUNT};

/// Gameplay events produced by the simulation, drained by the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A player touched the target; `score` is the new total
    TargetCaptured { player: usize, score: u32 },
}

/// Positions of everything on the board (top-left corners)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entities {
    pub players: [IVec2; PLAYER_COUNT],
    pub target: IVec2,
}

/// Complete game state (deterministic for a given seed and input)
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    rng: Pcg32,
    /// Current derived geometry
    geometry: Geometry,
    /// Entity positions, always inside `geometry.play_area`
    pub entities: Entities,
    /// Per-player score
    pub scores: [u32; PLAYER_COUNT],
    /// Running or paused
    pub mode: SessionMode,
    /// Show the FPS overlay
    pub show_fps: bool,
    /// Tick rate, always within [MIN_FPS, MAX_FPS]
    target_fps: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh session state for a display
    pub fn new(metrics: DisplayMetrics, seed: u64) -> Self {
        Self::with_geometry(Geometry::new(metrics), seed)
    }

    /// Create a fresh session state from explicit geometry
    pub fn with_geometry(geometry: Geometry, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let target = random_target(&geometry, &mut rng);

        Self {
            seed,
            rng,
            geometry,
            entities: Entities {
                players: geometry.player_starts(),
                target,
            },
            scores: [0; PLAYER_COUNT],
            mode: SessionMode::Running,
            show_fps: false,
            target_fps: DEFAULT_FPS,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    #[inline]
    pub fn metrics(&self) -> DisplayMetrics {
        self.geometry.metrics
    }

    /// Adopt new display metrics.
    ///
    /// Geometry is rebuilt and every entity is clamped into the new play
    /// area; positions that are still valid don't move. Scores and flags are
    /// untouched.
    pub fn resize(&mut self, metrics: DisplayMetrics) {
        let geometry = Geometry::new(metrics);
        for player in &mut self.entities.players {
            *player = geometry.clamp_player(*player);
        }
        self.entities.target = geometry.clamp_target(self.entities.target);
        self.geometry = geometry;
    }

    /// Move the target to a fresh random spot inside the play area
    pub fn respawn_target(&mut self) {
        self.entities.target = random_target(&self.geometry, &mut self.rng);
    }

    /// Square occupied by a player
    pub fn player_rect(&self, player: usize) -> Rect {
        Rect::square(self.entities.players[player], self.geometry.square_size)
    }

    /// Square occupied by the target
    pub fn target_rect(&self) -> Rect {
        Rect::square(self.entities.target, self.geometry.target_size)
    }

    #[inline]
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Change the tick rate, saturating into [MIN_FPS, MAX_FPS]
    pub fn set_fps(&mut self, fps: i64) {
        self.target_fps = fps.clamp(MIN_FPS as i64, MAX_FPS as i64) as u32;
    }

    /// Shift the tick rate by `delta`, saturating
    pub fn adjust_fps(&mut self, delta: i32) {
        self.set_fps(self.target_fps as i64 + delta as i64);
    }

    pub fn toggle_fps_display(&mut self) {
        self.show_fps = !self.show_fps;
    }

    /// Take all pending gameplay events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Uniform target position with independent x and y draws, fully inside
/// the play area
fn random_target(geometry: &Geometry, rng: &mut Pcg32) -> IVec2 {
    let area = geometry.play_area;
    let max = area.max_square_origin(geometry.target_size);
    IVec2::new(
        rng.random_range(area.left()..=max.x),
        rng.random_range(area.top()..=max.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = GameState::new(DisplayMetrics::new(1000, 800), 7);
        assert_eq!(state.scores, [0, 0]);
        assert_eq!(state.mode, SessionMode::Running);
        assert!(!state.show_fps);
        assert_eq!(state.target_fps(), 60);

        let area = state.geometry().play_area;
        assert!(area.encloses(&state.target_rect()));
        assert!(area.encloses(&state.player_rect(0)));
        assert!(area.encloses(&state.player_rect(1)));
    }

    #[test]
    fn test_same_seed_same_target() {
        let a = GameState::new(DisplayMetrics::new(1000, 800), 42);
        let b = GameState::new(DisplayMetrics::new(1000, 800), 42);
        assert_eq!(a.entities, b.entities);
    }

    #[test]
    fn test_set_fps_clamps() {
        let mut state = GameState::new(DisplayMetrics::new(800, 600), 1);
        state.set_fps(500);
        assert_eq!(state.target_fps(), 144);
        state.set_fps(0);
        assert_eq!(state.target_fps(), 1);
        state.set_fps(90);
        assert_eq!(state.target_fps(), 90);
    }

    #[test]
    fn test_adjust_fps_saturates() {
        let mut state = GameState::new(DisplayMetrics::new(800, 600), 1);
        for _ in 0..20 {
            state.adjust_fps(10);
        }
        assert_eq!(state.target_fps(), 144);
        for _ in 0..20 {
            state.adjust_fps(-10);
        }
        assert_eq!(state.target_fps(), 1);
        state.adjust_fps(10);
        assert_eq!(state.target_fps(), 11);
    }

    #[test]
    fn test_resize_shrink_clamps_entities() {
        let mut state = GameState::new(DisplayMetrics::new(1920, 1080), 3);
        state.entities.players[1] = state.geometry().play_area.max_square_origin(state.geometry().square_size);
        state.scores = [4, 2];

        state.resize(DisplayMetrics::new(640, 480));

        let area = state.geometry().play_area;
        assert_eq!(area, Rect::new(32, 24, 576, 432));
        for player in 0..PLAYER_COUNT {
            assert!(area.encloses(&state.player_rect(player)));
        }
        assert!(area.encloses(&state.target_rect()));
        assert_eq!(state.scores, [4, 2]);
    }

    #[test]
    fn test_resize_same_metrics_is_idempotent() {
        let metrics = DisplayMetrics::new(1280, 720);
        let mut state = GameState::new(metrics, 9);
        let geometry = *state.geometry();
        let entities = state.entities.clone();

        state.resize(metrics);
        state.resize(metrics);

        assert_eq!(*state.geometry(), geometry);
        assert_eq!(state.entities, entities);
    }

    #[test]
    fn test_resize_grow_keeps_valid_positions() {
        let mut state = GameState::new(DisplayMetrics::new(640, 480), 11);
        let players = state.entities.players;
        state.resize(DisplayMetrics::new(1920, 1080));
        // Start positions are still inside the larger play area
        assert_eq!(state.entities.players, players);
        assert!(state.geometry().play_area.encloses(&state.target_rect()));
    }

    #[test]
    fn test_respawn_target_stays_in_bounds() {
        let mut state = GameState::new(DisplayMetrics::new(320, 240), 5);
        for _ in 0..1000 {
            state.respawn_target();
            assert!(state.geometry().play_area.encloses(&state.target_rect()));
        }
    }
}
