//! Scripted in-memory backend
//!
//! Has no window and no real devices: tests (and the native binary) drive it
//! by queueing events, setting stick positions and inspecting the recorded
//! draw calls of the last presented frame.

use std::collections::VecDeque;

use glam::Vec2;

use super::{Backend, Color, DeviceId, DrawCall, RawEvent, Text, WindowMode};
use crate::sim::{DisplayMetrics, Rect};

#[derive(Debug, Clone, Default)]
struct VirtualPad {
    axes: Vec2,
    pressed: VecDeque<u32>,
}

/// Backend with virtual gamepads and a recorded frame buffer
#[derive(Debug, Clone)]
pub struct HeadlessBackend {
    display: DisplayMetrics,
    pads: Vec<VirtualPad>,
    events: VecDeque<RawEvent>,
    window: Option<(DisplayMetrics, WindowMode)>,
    pending: Vec<DrawCall>,
    last_frame: Vec<DrawCall>,
    frames_presented: u64,
    closed: bool,
}

impl HeadlessBackend {
    /// Backend for a display of the given size with no devices attached
    pub fn new(display: DisplayMetrics) -> Self {
        Self {
            display,
            pads: Vec::new(),
            events: VecDeque::new(),
            window: None,
            pending: Vec::new(),
            last_frame: Vec::new(),
            frames_presented: 0,
            closed: false,
        }
    }

    /// Attach `count` virtual gamepads
    pub fn with_devices(mut self, count: usize) -> Self {
        self.pads.resize_with(count, VirtualPad::default);
        self
    }

    /// Hold a virtual stick at `axes`; unknown devices are ignored
    pub fn set_axes(&mut self, device: usize, axes: Vec2) {
        if let Some(pad) = self.pads.get_mut(device) {
            pad.axes = axes;
        }
    }

    /// Queue a button press on a virtual gamepad
    pub fn press_button(&mut self, device: usize, button: u32) {
        if let Some(pad) = self.pads.get_mut(device) {
            pad.pressed.push_back(button);
        }
    }

    /// Queue a discrete event for the next poll
    pub fn push_event(&mut self, event: RawEvent) {
        self.events.push_back(event);
    }

    /// Current window size and mode, if a window was created
    pub fn window(&self) -> Option<(DisplayMetrics, WindowMode)> {
        self.window
    }

    /// Draw calls of the most recently presented frame
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.last_frame
    }

    /// Text strings of the most recently presented frame
    pub fn last_frame_text(&self) -> Vec<&str> {
        self.last_frame
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text(text) => Some(text.content.as_str()),
                DrawCall::Rect { .. } => None,
            })
            .collect()
    }

    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Backend for HeadlessBackend {
    type Window = ();

    fn display_bounds(&self) -> DisplayMetrics {
        self.display
    }

    fn create_window(&mut self, metrics: DisplayMetrics, mode: WindowMode) {
        self.window = Some((metrics, mode));
    }

    fn resize(&mut self, _window: &(), metrics: DisplayMetrics, mode: WindowMode) {
        self.window = Some((metrics, mode));
    }

    fn enumerate_devices(&mut self) -> Vec<DeviceId> {
        (0..self.pads.len() as u32).map(DeviceId).collect()
    }

    fn axis_value(&self, device: DeviceId, axis: usize) -> f32 {
        let Some(pad) = self.pads.get(device.0 as usize) else {
            return 0.0;
        };
        match axis {
            0 => pad.axes.x,
            1 => pad.axes.y,
            _ => 0.0,
        }
    }

    fn button_pressed_event(&mut self, device: DeviceId) -> Option<u32> {
        self.pads.get_mut(device.0 as usize)?.pressed.pop_front()
    }

    fn poll_events(&mut self) -> Vec<RawEvent> {
        self.events.drain(..).collect()
    }

    fn draw_filled_rect(&mut self, color: Color, rect: Rect) {
        self.pending.push(DrawCall::Rect { color, rect });
    }

    fn draw_text(&mut self, text: &Text) {
        self.pending.push(DrawCall::Text(text.clone()));
    }

    fn present_frame(&mut self) {
        self.last_frame = std::mem::take(&mut self.pending);
        self.frames_presented += 1;
    }

    fn close(&mut self) {
        self.closed = true;
        self.window = None;
    }
}
