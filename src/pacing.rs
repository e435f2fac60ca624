//! Tick pacing and frame rate measurement
//!
//! The host calls [`FramePacer::ticks_due`] once per display frame (e.g. every
//! `requestAnimationFrame`) and runs as many ticks as it returns, so the tick
//! rate follows the target rate rather than the display refresh rate.

/// Number of tick timestamps kept for the FPS counter
const FPS_WINDOW: usize = 60;
/// Early-arrival tolerance so vsync jitter doesn't drop ticks (ms)
const JITTER_TOLERANCE_MS: f64 = 1.0;
/// Most ticks run for a single frame; older backlog is dropped
pub const MAX_TICKS_PER_FRAME: u32 = 4;

/// Fixed-rate pacer with an FPS counter
#[derive(Debug, Clone)]
pub struct FramePacer {
    last_frame_ms: Option<f64>,
    accumulator: f64,
    tick_times: [f64; FPS_WINDOW],
    tick_index: usize,
    ticks_recorded: usize,
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new()
    }
}

impl FramePacer {
    pub fn new() -> Self {
        Self {
            last_frame_ms: None,
            accumulator: 0.0,
            tick_times: [0.0; FPS_WINDOW],
            tick_index: 0,
            ticks_recorded: 0,
        }
    }

    /// Tick interval for a rate, in milliseconds
    pub fn interval_ms(target_fps: u32) -> f64 {
        1000.0 / f64::from(target_fps.max(1))
    }

    /// Number of ticks owed at `now_ms` (0 to [`MAX_TICKS_PER_FRAME`]).
    /// Records them for the FPS counter.
    ///
    /// The very first frame owes one tick. Time beyond
    /// `MAX_TICKS_PER_FRAME` intervals (a stalled tab) is dropped instead of
    /// replayed.
    pub fn ticks_due(&mut self, now_ms: f64, target_fps: u32) -> u32 {
        let interval = Self::interval_ms(target_fps);

        let Some(last) = self.last_frame_ms else {
            self.last_frame_ms = Some(now_ms);
            self.record(now_ms);
            return 1;
        };

        let backlog_cap = interval * f64::from(MAX_TICKS_PER_FRAME);
        self.accumulator = (self.accumulator + (now_ms - last).max(0.0)).min(backlog_cap);
        self.last_frame_ms = Some(now_ms);

        let mut ticks = 0;
        while ticks < MAX_TICKS_PER_FRAME && self.accumulator + JITTER_TOLERANCE_MS >= interval {
            // May dip below zero by the tolerance; the next frame pays it back
            self.accumulator = (self.accumulator - interval).max(-JITTER_TOLERANCE_MS);
            self.record(now_ms);
            ticks += 1;
        }
        ticks
    }

    fn record(&mut self, now_ms: f64) {
        self.tick_times[self.tick_index] = now_ms;
        self.tick_index = (self.tick_index + 1) % FPS_WINDOW;
        self.ticks_recorded = (self.ticks_recorded + 1).min(FPS_WINDOW);
    }

    /// Ticks per second over the recent window (0 until two ticks ran)
    pub fn measured_fps(&self) -> u32 {
        if self.ticks_recorded < 2 {
            return 0;
        }

        let newest = self.tick_times[(self.tick_index + FPS_WINDOW - 1) % FPS_WINDOW];
        let oldest = if self.ticks_recorded < FPS_WINDOW {
            self.tick_times[0]
        } else {
            self.tick_times[self.tick_index]
        };

        let elapsed = newest - oldest;
        if elapsed <= 0.0 {
            return 0;
        }
        ((self.ticks_recorded - 1) as f64 * 1000.0 / elapsed).round() as u32
    }
}
