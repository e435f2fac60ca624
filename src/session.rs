//! Game session
//!
//! Owns the backend, the bound devices and the game state. One call to
//! [`Session::tick`] is one pass of the cooperative loop:
//! events → commands → simulation → scene → present.

use glam::IVec2;
use thiserror::Error;

use crate::consts::PLAYER_COUNT;
use crate::input::{self, Command};
use crate::pacing::FramePacer;
use crate::platform::{Backend, DeviceId, DrawCall, RawEvent, WindowMode};
use crate::settings::Settings;
use crate::sim::{self, DisplayMetrics, Effect, GameEvent, GameState, TickInput};
use crate::ui::{self, Overlay};

/// Fatal problems that prevent a session from starting
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("no input devices found; connect a gamepad and restart")]
    NoInputDevices,
    #[error("graphics initialization failed: {0}")]
    Graphics(String),
}

/// Whether the loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A running game bound to a backend
pub struct Session<B: Backend> {
    backend: B,
    window: B::Window,
    settings: Settings,
    /// Bound devices, player 0 first
    devices: Vec<DeviceId>,
    state: GameState,
    fullscreen: bool,
    /// Last pointer position, for menu hover
    pointer: Option<IVec2>,
    pacer: FramePacer,
    finished: bool,
}

impl<B: Backend> Session<B> {
    /// Bind devices, open a window and create a fresh game.
    ///
    /// Fails if the backend reports no input devices. At most two devices
    /// are bound, in discovery order.
    pub fn start(mut backend: B, settings: Settings, seed: u64) -> Result<Self, StartupError> {
        let settings = settings.validated();

        let found = backend.enumerate_devices();
        if found.is_empty() {
            log::error!("No input devices found");
            return Err(StartupError::NoInputDevices);
        }
        let devices: Vec<DeviceId> = found.into_iter().take(PLAYER_COUNT).collect();
        log::info!("Bound {} input device(s): {:?}", devices.len(), devices);

        let metrics = backend.display_bounds().scaled(settings.windowed_scale);
        let window = backend.create_window(metrics, WindowMode::Windowed);

        let mut state = GameState::new(metrics, seed);
        state.set_fps(i64::from(settings.target_fps));
        state.show_fps = settings.show_fps;

        log::info!(
            "Session started at {}x{} with seed {}",
            metrics.width,
            metrics.height,
            seed
        );

        Ok(Self {
            backend,
            window,
            settings,
            devices,
            state,
            fullscreen: false,
            pointer: None,
            pacer: FramePacer::new(),
            finished: false,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn devices(&self) -> &[DeviceId] {
        &self.devices
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Run every tick owed at `now_ms` for the current target rate, then
    /// present the last one.
    ///
    /// Several ticks can run for one display frame, so target rates above
    /// the host's refresh rate still change ticks per second.
    pub fn update(&mut self, now_ms: f64) -> Flow {
        if self.finished {
            return Flow::Quit;
        }
        let ticks = self.pacer.ticks_due(now_ms, self.state.target_fps());
        for _ in 0..ticks {
            if self.step() == Flow::Quit {
                return Flow::Quit;
            }
        }
        if ticks > 0 {
            self.render();
        }
        Flow::Continue
    }

    /// Run one tick now and present it, ignoring pacing
    pub fn tick(&mut self) -> Flow {
        if self.finished {
            return Flow::Quit;
        }
        let flow = self.step();
        if flow == Flow::Continue {
            self.render();
        }
        flow
    }

    /// Events, commands and one simulation step.
    ///
    /// A quit request stops the step before the simulation runs; nothing is
    /// simulated or drawn afterwards.
    fn step(&mut self) -> Flow {
        for event in self.drain_raw_events() {
            // Dispatch against the current mode: an earlier event in the
            // same batch may have paused or resumed the game.
            let Some(command) = input::dispatch(&event, self.state.mode, &self.settings) else {
                continue;
            };
            if self.apply(command) == Flow::Quit {
                self.shutdown();
                return Flow::Quit;
            }
        }

        let input = self.sample_input();
        sim::tick(&mut self.state, &input);

        for event in self.state.drain_events() {
            match event {
                GameEvent::TargetCaptured { player, score } => {
                    log::debug!("Player {} captured the target (score {})", player + 1, score);
                }
            }
        }

        Flow::Continue
    }

    /// Backend events followed by per-device button presses
    fn drain_raw_events(&mut self) -> Vec<RawEvent> {
        let mut events = self.backend.poll_events();
        for &device in &self.devices {
            while let Some(button) = self.backend.button_pressed_event(device) {
                events.push(RawEvent::DeviceButtonDown { device, button });
            }
        }
        events
    }

    fn apply(&mut self, command: Command) -> Flow {
        let transition = sim::transition(self.state.mode, &command, self.state.metrics());
        if transition.mode != self.state.mode {
            log::debug!("Mode {:?} -> {:?}", self.state.mode, transition.mode);
            self.state.mode = transition.mode;
        }

        match transition.effect {
            Effect::Quit => return Flow::Quit,
            Effect::ToggleFullscreen => self.toggle_fullscreen(),
            Effect::None => {}
        }

        match command {
            Command::ToggleFpsOverlay => self.state.toggle_fps_display(),
            Command::AdjustFps(delta) => {
                self.state.adjust_fps(delta);
                log::debug!("Target FPS: {}", self.state.target_fps());
            }
            Command::PointerMoved(pos) | Command::MenuClick(pos) => self.pointer = Some(pos),
            Command::Resize(metrics) => self.resize(metrics),
            Command::WindowModeChanged(mode) => self.sync_window_mode(mode),
            Command::ToggleFullscreen | Command::TogglePause | Command::Quit => {}
        }

        Flow::Continue
    }

    /// Window size and mode for the current fullscreen flag
    fn window_target(&self) -> (DisplayMetrics, WindowMode) {
        let bounds = self.backend.display_bounds();
        if self.fullscreen {
            (bounds, WindowMode::Fullscreen)
        } else {
            (bounds.scaled(self.settings.windowed_scale), WindowMode::Windowed)
        }
    }

    fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
        let (metrics, mode) = self.window_target();
        self.backend.resize(&self.window, metrics, mode);
        self.state.resize(metrics);
        log::info!("{:?} at {}x{}", mode, metrics.width, metrics.height);
    }

    /// Follow a fullscreen change the host made on its own (e.g. the
    /// browser leaving fullscreen on Escape)
    fn sync_window_mode(&mut self, mode: WindowMode) {
        let fullscreen = mode == WindowMode::Fullscreen;
        if fullscreen != self.fullscreen {
            log::info!("Host switched to {:?}", mode);
            self.toggle_fullscreen();
        }
    }

    /// Adopt a size change reported by the backend
    fn resize(&mut self, metrics: DisplayMetrics) {
        if metrics.width == 0 || metrics.height == 0 {
            log::warn!("Ignoring degenerate resize to {}x{}", metrics.width, metrics.height);
            return;
        }
        if metrics != self.state.metrics() {
            self.state.resize(metrics);
            log::debug!("Resized to {}x{}", metrics.width, metrics.height);
        }
    }

    /// Stick deltas for bound devices; empty while paused
    fn sample_input(&self) -> TickInput {
        let mut input = TickInput::default();
        if !self.state.mode.is_running() {
            return input;
        }
        for (player, &device) in self.devices.iter().enumerate() {
            input.moves[player] = Some(input::sample_axes(
                &self.backend,
                device,
                self.settings.axis_deadzone,
            ));
        }
        input
    }

    fn render(&mut self) {
        let overlay = Overlay {
            pointer: self.pointer,
            measured_fps: self.pacer.measured_fps(),
        };
        for call in ui::build(&self.state, overlay) {
            match call {
                DrawCall::Rect { color, rect } => self.backend.draw_filled_rect(color, rect),
                DrawCall::Text(text) => self.backend.draw_text(&text),
            }
        }
        self.backend.present_frame();
    }

    fn shutdown(&mut self) {
        let [p1, p2] = self.state.scores;
        log::info!("Quit with final score {p1} - {p2}");
        self.backend.close();
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{HeadlessBackend, Key};
    use crate::sim::SessionMode;
    use crate::ui::{MenuItem, colors, menu};
    use glam::Vec2;

    const DISPLAY: DisplayMetrics = DisplayMetrics::new(1000, 800);

    fn session(devices: usize) -> Session<HeadlessBackend> {
        let backend = HeadlessBackend::new(DISPLAY).with_devices(devices);
        Session::start(backend, Settings::default(), 42).expect("session starts")
    }

    fn press(session: &mut Session<HeadlessBackend>, key: Key) {
        session.backend_mut().push_event(RawEvent::KeyDown(key));
    }

    fn click_menu(session: &mut Session<HeadlessBackend>, item: MenuItem) {
        let metrics = session.state().metrics();
        let rect = menu::layout(metrics)
            .into_iter()
            .find(|b| b.item == item)
            .map(|b| b.rect)
            .unwrap();
        session
            .backend_mut()
            .push_event(RawEvent::PointerDown(rect.center()));
    }

    #[test]
    fn test_start_requires_a_device() {
        let backend = HeadlessBackend::new(DISPLAY);
        let result = Session::start(backend, Settings::default(), 1);
        assert!(matches!(result, Err(StartupError::NoInputDevices)));
    }

    #[test]
    fn test_start_binds_at_most_two_devices() {
        let session = session(3);
        assert_eq!(session.devices(), &[DeviceId(0), DeviceId(1)]);
        assert_eq!(
            session.backend().window(),
            Some((DisplayMetrics::new(800, 640), WindowMode::Windowed))
        );
        assert_eq!(session.state().metrics(), DisplayMetrics::new(800, 640));
        assert_eq!(session.state().scores, [0, 0]);
    }

    #[test]
    fn test_single_device_session_moves_only_player_one() {
        let mut session = session(1);
        session.backend_mut().set_axes(0, Vec2::new(1.0, 0.0));
        let before = session.state().entities.players;

        session.tick();

        let after = session.state().entities.players;
        let speed = session.state().geometry().speed;
        assert_eq!(after[0], before[0] + IVec2::new(speed, 0));
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn test_pause_freezes_and_resume_moves() {
        let mut session = session(2);
        session.backend_mut().set_axes(0, Vec2::new(0.0, 1.0));
        let speed = session.state().geometry().speed;
        let start = session.state().entities.players[0];

        press(&mut session, Key::Escape);
        session.tick();
        assert_eq!(session.state().mode, SessionMode::Paused);
        assert_eq!(session.state().entities.players[0], start);

        session.tick();
        assert_eq!(session.state().entities.players[0], start);

        press(&mut session, Key::Escape);
        session.tick();
        assert_eq!(session.state().mode, SessionMode::Running);
        assert_eq!(session.state().entities.players[0], start + IVec2::new(0, speed));
    }

    #[test]
    fn test_pause_button_on_second_pad() {
        let mut session = session(2);
        session.backend_mut().press_button(1, 9);
        session.tick();
        assert_eq!(session.state().mode, SessionMode::Paused);

        session.backend_mut().press_button(0, 7);
        session.tick();
        assert_eq!(session.state().mode, SessionMode::Running);
    }

    #[test]
    fn test_quit_stops_before_simulation() {
        let mut session = session(2);
        session.backend_mut().set_axes(0, Vec2::new(1.0, 1.0));
        let entities = session.state().entities.clone();

        session.backend_mut().push_event(RawEvent::Quit);
        assert_eq!(session.tick(), Flow::Quit);

        assert_eq!(session.state().entities, entities);
        assert_eq!(session.backend().frames_presented(), 0);
        assert!(session.backend().is_closed());
        assert_eq!(session.update(1000.0), Flow::Quit);
    }

    #[test]
    fn test_fps_keys_and_overlay() {
        let mut session = session(1);
        press(&mut session, Key::F(7));
        press(&mut session, Key::F(3));
        session.tick();
        assert_eq!(session.state().target_fps(), 70);
        assert!(session.state().show_fps);
        assert!(
            session
                .backend()
                .last_frame_text()
                .iter()
                .any(|t| t.starts_with("FPS: "))
        );

        press(&mut session, Key::F(6));
        press(&mut session, Key::F(6));
        press(&mut session, Key::F(3));
        session.tick();
        assert_eq!(session.state().target_fps(), 50);
        assert!(
            !session
                .backend()
                .last_frame_text()
                .iter()
                .any(|t| t.starts_with("FPS: "))
        );
    }

    #[test]
    fn test_menu_resume() {
        let mut session = session(1);
        press(&mut session, Key::Escape);
        session.tick();

        click_menu(&mut session, MenuItem::Resume);
        session.tick();
        assert_eq!(session.state().mode, SessionMode::Running);
    }

    #[test]
    fn test_click_while_running_is_ignored() {
        let mut session = session(1);
        click_menu(&mut session, MenuItem::Quit);
        assert_eq!(session.tick(), Flow::Continue);
        assert_eq!(session.state().mode, SessionMode::Running);
    }

    #[test]
    fn test_menu_fullscreen_round_trip_keeps_scores() {
        let mut session = session(2);
        press(&mut session, Key::Escape);
        session.tick();

        click_menu(&mut session, MenuItem::ToggleFullscreen);
        session.tick();
        assert!(session.is_fullscreen());
        assert_eq!(session.state().mode, SessionMode::Paused);
        assert_eq!(session.backend().window(), Some((DISPLAY, WindowMode::Fullscreen)));
        assert_eq!(session.state().metrics(), DISPLAY);

        let area = session.state().geometry().play_area;
        assert!(area.encloses(&session.state().player_rect(0)));
        assert!(area.encloses(&session.state().player_rect(1)));
        assert!(area.encloses(&session.state().target_rect()));

        // Layout follows the new metrics, so clicking the button again works
        click_menu(&mut session, MenuItem::ToggleFullscreen);
        session.tick();
        assert!(!session.is_fullscreen());
        assert_eq!(session.state().metrics(), DisplayMetrics::new(800, 640));
        assert_eq!(session.state().scores, [0, 0]);
    }

    #[test]
    fn test_menu_quit() {
        let mut session = session(1);
        press(&mut session, Key::Escape);
        session.tick();

        click_menu(&mut session, MenuItem::Quit);
        assert_eq!(session.tick(), Flow::Quit);
        assert!(session.backend().is_closed());
    }

    #[test]
    fn test_pause_then_click_in_same_batch() {
        let mut session = session(1);
        press(&mut session, Key::Escape);
        click_menu(&mut session, MenuItem::Quit);
        assert_eq!(session.tick(), Flow::Quit);
    }

    #[test]
    fn test_fullscreen_key_while_running() {
        let mut session = session(1);
        press(&mut session, Key::F(11));
        session.tick();
        assert!(session.is_fullscreen());
        assert_eq!(session.state().mode, SessionMode::Running);
        assert_eq!(session.state().metrics(), DISPLAY);
    }

    #[test]
    fn test_backend_resize_reclamps() {
        let mut session = session(2);
        session.backend_mut().set_axes(1, Vec2::new(1.0, 1.0));
        for _ in 0..500 {
            session.tick();
        }

        let small = DisplayMetrics::new(400, 300);
        session.backend_mut().push_event(RawEvent::Resized(small));
        session.tick();

        assert_eq!(session.state().metrics(), small);
        let area = session.state().geometry().play_area;
        assert!(area.encloses(&session.state().player_rect(1)));
        assert!(area.encloses(&session.state().target_rect()));

        session
            .backend_mut()
            .push_event(RawEvent::Resized(DisplayMetrics::new(0, 300)));
        session.tick();
        assert_eq!(session.state().metrics(), small);
    }

    #[test]
    fn test_hover_highlight_in_frame() {
        let mut session = session(1);
        press(&mut session, Key::Escape);
        let quit = menu::layout(session.state().metrics())[2].rect;
        session
            .backend_mut()
            .push_event(RawEvent::PointerMove(quit.center()));
        session.tick();

        let hovered: Vec<_> = session
            .backend()
            .last_frame()
            .iter()
            .filter_map(|call| match call {
                DrawCall::Rect { color, rect } if *color == colors::BUTTON_HOVER => Some(*rect),
                _ => None,
            })
            .collect();
        assert_eq!(hovered, vec![quit]);
    }

    #[test]
    fn test_update_is_paced() {
        let mut session = session(1);
        assert_eq!(session.update(0.0), Flow::Continue);
        assert_eq!(session.backend().frames_presented(), 1);

        assert_eq!(session.update(5.0), Flow::Continue);
        assert_eq!(session.backend().frames_presented(), 1);

        session.update(17.0);
        assert_eq!(session.backend().frames_presented(), 2);
    }

    #[test]
    fn test_update_runs_owed_ticks_and_presents_once() {
        let settings = Settings {
            target_fps: 144,
            ..Settings::default()
        };
        let backend = HeadlessBackend::new(DISPLAY).with_devices(1);
        let mut session = Session::start(backend, settings, 7).unwrap();

        session.update(0.0);
        assert_eq!(session.state().time_ticks, 1);
        assert_eq!(session.backend().frames_presented(), 1);

        // One 60 Hz frame owes two 144 Hz ticks
        session.update(1000.0 / 60.0);
        assert_eq!(session.state().time_ticks, 3);
        assert_eq!(session.backend().frames_presented(), 2);
    }

    #[test]
    fn test_144_fps_on_60_hz_display() {
        let settings = Settings {
            target_fps: 144,
            ..Settings::default()
        };
        let backend = HeadlessBackend::new(DISPLAY).with_devices(1);
        let mut session = Session::start(backend, settings, 7).unwrap();

        for frame in 0..=600u32 {
            session.update(f64::from(frame) * 1000.0 / 60.0);
        }

        let ticks = session.state().time_ticks;
        assert!((1437..=1443).contains(&ticks), "ran {ticks} ticks in 10 s");
        assert_eq!(session.backend().frames_presented(), 601);
    }

    #[test]
    fn test_small_deflection_moves_by_rounded_speed() {
        let settings = Settings {
            windowed_scale: 1.0,
            ..Settings::default()
        };
        let backend = HeadlessBackend::new(DISPLAY).with_devices(1);
        let mut session = Session::start(backend, settings, 42).unwrap();
        let speed = session.state().geometry().speed;
        assert_eq!(speed, 6);

        session.backend_mut().set_axes(0, Vec2::new(0.09, 0.0));
        let before = session.state().entities.players[0];
        session.tick();

        let moved = session.state().entities.players[0] - before;
        assert_eq!(moved, IVec2::new(crate::round_px(0.09 * speed as f32), 0));
        assert_eq!(moved.x, 1);
    }

    #[test]
    fn test_host_leaving_fullscreen_is_reconciled() {
        let mut session = session(1);
        press(&mut session, Key::F(11));
        session.tick();
        assert!(session.is_fullscreen());

        // Already fullscreen: nothing to do
        session
            .backend_mut()
            .push_event(RawEvent::ModeChanged(WindowMode::Fullscreen));
        session.tick();
        assert!(session.is_fullscreen());
        assert_eq!(session.state().metrics(), DISPLAY);

        // Browser Esc
        session
            .backend_mut()
            .push_event(RawEvent::ModeChanged(WindowMode::Windowed));
        session.tick();
        assert!(!session.is_fullscreen());
        assert_eq!(session.state().metrics(), DisplayMetrics::new(800, 640));
        assert_eq!(
            session.backend().window(),
            Some((DisplayMetrics::new(800, 640), WindowMode::Windowed))
        );
    }

    #[test]
    fn test_settings_apply_at_start() {
        let settings = Settings {
            target_fps: 500,
            show_fps: true,
            windowed_scale: 0.5,
            ..Settings::default()
        };
        let backend = HeadlessBackend::new(DISPLAY).with_devices(1);
        let session = Session::start(backend, settings, 3).unwrap();
        assert_eq!(session.state().target_fps(), 144);
        assert!(session.state().show_fps);
        assert_eq!(session.state().metrics(), DisplayMetrics::new(500, 400));
    }
}
