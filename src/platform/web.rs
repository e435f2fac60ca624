//! Browser backend
//!
//! Rectangles go through the wgpu pipeline on the game canvas; text is drawn
//! on a transparent 2D canvas stacked on top of it. Event listeners only
//! push [`RawEvent`]s into a shared queue that the session drains each tick.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use glam::IVec2;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, Gamepad, GamepadButton, HtmlCanvasElement, KeyboardEvent,
    MouseEvent,
};

use super::{Backend, Color, DeviceId, Key, RawEvent, Text, TextAnchor, WindowMode};
use crate::renderer::{RenderState, Vertex, rect_vertices};
use crate::session::StartupError;
use crate::sim::{DisplayMetrics, Rect};
use crate::ui::colors;

type EventQueue = Rc<RefCell<VecDeque<RawEvent>>>;

/// Backend for a page with a `<canvas>` element
pub struct WebBackend {
    window: web_sys::Window,
    document: Document,
    canvas: HtmlCanvasElement,
    overlay: HtmlCanvasElement,
    text: CanvasRenderingContext2d,
    render_state: RenderState,
    events: EventQueue,
    /// Last seen pressed state per gamepad button, for edge detection
    buttons_down: HashMap<u32, Vec<bool>>,
    /// Button presses found but not yet reported
    pending_buttons: HashMap<u32, VecDeque<u32>>,
    vertices: Vec<Vertex>,
    texts: Vec<Text>,
}

impl WebBackend {
    /// Set up WebGPU on `canvas`, create the text overlay and install listeners
    pub async fn new(canvas: HtmlCanvasElement) -> Result<Self, StartupError> {
        let window = web_sys::window().ok_or_else(|| graphics("no window"))?;
        let document = window.document().ok_or_else(|| graphics("no document"))?;

        let overlay: HtmlCanvasElement = document
            .create_element("canvas")
            .map_err(js_graphics)?
            .dyn_into()
            .map_err(|_| graphics("overlay is not a canvas"))?;
        overlay.set_id("text-overlay");
        let body = document.body().ok_or_else(|| graphics("no body"))?;
        body.append_child(&overlay).map_err(js_graphics)?;

        for (element, z) in [(&canvas, 0), (&overlay, 1)] {
            let style = element.style();
            let _ = style.set_property("position", "absolute");
            let _ = style.set_property("left", "0");
            let _ = style.set_property("top", "0");
            let _ = style.set_property("z-index", &z.to_string());
        }

        let text: CanvasRenderingContext2d = overlay
            .get_context("2d")
            .map_err(js_graphics)?
            .ok_or_else(|| graphics("2d context unavailable"))?
            .dyn_into()
            .map_err(|_| graphics("unexpected 2d context type"))?;

        let width = canvas.width().max(1);
        let height = canvas.height().max(1);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(graphics)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(graphics)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state = RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(graphics)?;

        let events: EventQueue = Rc::new(RefCell::new(VecDeque::new()));
        install_listeners(&window, &document, &overlay, &events);

        Ok(Self {
            window,
            document,
            canvas,
            overlay,
            text,
            render_state,
            events,
            buttons_down: HashMap::new(),
            pending_buttons: HashMap::new(),
            vertices: Vec::new(),
            texts: Vec::new(),
        })
    }

    fn gamepads(&self) -> Vec<Gamepad> {
        let Ok(list) = self.window.navigator().get_gamepads() else {
            return Vec::new();
        };
        list.iter()
            .filter_map(|pad| pad.dyn_into::<Gamepad>().ok())
            .filter(Gamepad::connected)
            .collect()
    }

    fn gamepad(&self, device: DeviceId) -> Option<Gamepad> {
        self.gamepads().into_iter().find(|pad| pad.index() == device.0)
    }

    /// Queue buttons that went down since the last poll of this device
    fn poll_buttons(&mut self, device: DeviceId) {
        let Some(pad) = self.gamepad(device) else {
            self.buttons_down.remove(&device.0);
            return;
        };
        let now: Vec<bool> = pad
            .buttons()
            .iter()
            .map(|b| b.dyn_into::<GamepadButton>().is_ok_and(|b| b.pressed()))
            .collect();

        let before = self.buttons_down.entry(device.0).or_default();
        let pending = self.pending_buttons.entry(device.0).or_default();
        for (index, &down) in now.iter().enumerate() {
            if down && !before.get(index).copied().unwrap_or(false) {
                pending.push_back(index as u32);
            }
        }
        *before = now;
    }

    fn size_canvases(&mut self, metrics: DisplayMetrics) {
        for canvas in [&self.canvas, &self.overlay] {
            canvas.set_width(metrics.width);
            canvas.set_height(metrics.height);
            let style = canvas.style();
            let _ = style.set_property("width", &format!("{}px", metrics.width));
            let _ = style.set_property("height", &format!("{}px", metrics.height));
        }
        self.render_state.resize(metrics.width, metrics.height);
    }

    fn apply_mode(&mut self, mode: WindowMode) {
        let is_fullscreen = self.document.fullscreen_element().is_some();
        let result = match mode {
            WindowMode::Fullscreen if !is_fullscreen => self
                .document
                .document_element()
                .map(|root| root.request_fullscreen())
                .unwrap_or(Ok(())),
            WindowMode::Windowed if is_fullscreen => {
                self.document.exit_fullscreen();
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            log::warn!("Fullscreen request rejected: {:?}", e);
        }
    }

    fn draw_overlay_text(&self) {
        let (w, h) = (f64::from(self.overlay.width()), f64::from(self.overlay.height()));
        self.text.clear_rect(0.0, 0.0, w, h);

        for text in &self.texts {
            let (align, baseline) = match text.anchor {
                TextAnchor::TopLeft => ("left", "top"),
                TextAnchor::TopRight => ("right", "top"),
                TextAnchor::Center => ("center", "middle"),
            };
            self.text.set_font(&format!("{}px sans-serif", text.size_px));
            self.text.set_text_align(align);
            self.text.set_text_baseline(baseline);
            self.text.set_fill_style_str(&css_color(text.color));
            let _ = self.text.fill_text(
                &text.content,
                f64::from(text.pos.x),
                f64::from(text.pos.y),
            );
        }
    }
}

impl Backend for WebBackend {
    type Window = HtmlCanvasElement;

    fn display_bounds(&self) -> DisplayMetrics {
        let screen = self.window.screen().ok();
        let width = screen.as_ref().and_then(|s| s.width().ok());
        let height = screen.as_ref().and_then(|s| s.height().ok());
        match (width, height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => DisplayMetrics::new(w as u32, h as u32),
            _ => viewport_metrics(&self.window),
        }
    }

    fn create_window(&mut self, metrics: DisplayMetrics, mode: WindowMode) -> HtmlCanvasElement {
        self.size_canvases(metrics);
        self.apply_mode(mode);
        self.canvas.clone()
    }

    fn resize(&mut self, _window: &HtmlCanvasElement, metrics: DisplayMetrics, mode: WindowMode) {
        self.apply_mode(mode);
        self.size_canvases(metrics);
    }

    fn enumerate_devices(&mut self) -> Vec<DeviceId> {
        let devices: Vec<DeviceId> = self
            .gamepads()
            .iter()
            .map(|pad| DeviceId(pad.index()))
            .collect();
        for device in &devices {
            // Buttons held at startup don't count as presses
            self.poll_buttons(*device);
            self.pending_buttons.remove(&device.0);
        }
        devices
    }

    fn axis_value(&self, device: DeviceId, axis: usize) -> f32 {
        self.gamepad(device)
            .and_then(|pad| pad.axes().get(axis as u32).as_f64())
            .map_or(0.0, |v| v as f32)
    }

    fn button_pressed_event(&mut self, device: DeviceId) -> Option<u32> {
        let queued = self
            .pending_buttons
            .get(&device.0)
            .is_some_and(|q| !q.is_empty());
        if !queued {
            self.poll_buttons(device);
        }
        self.pending_buttons.get_mut(&device.0)?.pop_front()
    }

    fn poll_events(&mut self) -> Vec<RawEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    fn draw_filled_rect(&mut self, color: Color, rect: Rect) {
        self.vertices.extend(rect_vertices(rect, color));
    }

    fn draw_text(&mut self, text: &Text) {
        self.texts.push(text.clone());
    }

    fn present_frame(&mut self) {
        self.draw_overlay_text();
        self.texts.clear();

        match self.render_state.render(&self.vertices, colors::MARGIN) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.render_state.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of memory!");
            }
            Err(e) => log::warn!("Render error: {:?}", e),
        }
        self.vertices.clear();
    }

    fn close(&mut self) {
        if self.document.fullscreen_element().is_some() {
            self.document.exit_fullscreen();
        }
        let (w, h) = (f64::from(self.overlay.width()), f64::from(self.overlay.height()));
        self.text.clear_rect(0.0, 0.0, w, h);
        for canvas in [&self.canvas, &self.overlay] {
            let _ = canvas.style().set_property("display", "none");
        }
        log::info!("Window closed");
    }
}

fn install_listeners(
    window: &web_sys::Window,
    document: &Document,
    overlay: &HtmlCanvasElement,
    events: &EventQueue,
) {
    // Keyboard
    {
        let events = events.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if event.repeat() {
                return;
            }
            if let Some(key) = Key::from_name(&event.key()) {
                // Keep the browser from acting on F-keys and Escape itself
                if matches!(key, Key::F(_) | Key::Escape) {
                    event.prevent_default();
                }
                events.borrow_mut().push_back(RawEvent::KeyDown(key));
            }
        });
        let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Mouse move
    {
        let events = events.clone();
        let overlay_clone = overlay.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let pos = canvas_position(&overlay_clone, &event);
            events.borrow_mut().push_back(RawEvent::PointerMove(pos));
        });
        let _ = overlay
            .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Mouse down
    {
        let events = events.clone();
        let overlay_clone = overlay.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            if event.button() != 0 {
                return;
            }
            let pos = canvas_position(&overlay_clone, &event);
            events.borrow_mut().push_back(RawEvent::PointerDown(pos));
        });
        let _ = overlay
            .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Fullscreen entered or left, including through the browser's own UI
    {
        let events = events.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mode = if document_clone.fullscreen_element().is_some() {
                WindowMode::Fullscreen
            } else {
                WindowMode::Windowed
            };
            events.borrow_mut().push_back(RawEvent::ModeChanged(mode));
        });
        let _ = document
            .add_event_listener_with_callback("fullscreenchange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Fullscreen request refused
    {
        let events = events.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            log::warn!("Fullscreen request failed");
            events
                .borrow_mut()
                .push_back(RawEvent::ModeChanged(WindowMode::Windowed));
        });
        let _ = document
            .add_event_listener_with_callback("fullscreenerror", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Viewport resized; only the fullscreen canvas tracks the viewport
    {
        let events = events.clone();
        let window_clone = window.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.fullscreen_element().is_some() {
                let metrics = viewport_metrics(&window_clone);
                events.borrow_mut().push_back(RawEvent::Resized(metrics));
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Page going away
    {
        let events = events.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            events.borrow_mut().push_back(RawEvent::Quit);
        });
        let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// Mouse position in canvas pixels (CSS size may differ from backing size)
fn canvas_position(canvas: &HtmlCanvasElement, event: &MouseEvent) -> IVec2 {
    let sx = f64::from(canvas.width()) / f64::from(canvas.client_width().max(1));
    let sy = f64::from(canvas.height()) / f64::from(canvas.client_height().max(1));
    IVec2::new(
        (f64::from(event.offset_x()) * sx).round() as i32,
        (f64::from(event.offset_y()) * sy).round() as i32,
    )
}

/// Inner size of the browser window in CSS pixels
fn viewport_metrics(window: &web_sys::Window) -> DisplayMetrics {
    let px = |v: Result<JsValue, JsValue>| {
        v.ok().and_then(|v| v.as_f64()).unwrap_or(1.0).max(1.0) as u32
    };
    DisplayMetrics::new(px(window.inner_width()), px(window.inner_height()))
}

fn css_color(color: Color) -> String {
    let [r, g, b, a] = color;
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("rgba({}, {}, {}, {})", channel(r), channel(g), channel(b), a.clamp(0.0, 1.0))
}

fn graphics(reason: impl ToString) -> StartupError {
    StartupError::Graphics(reason.to_string())
}

fn js_graphics(value: JsValue) -> StartupError {
    StartupError::Graphics(format!("{value:?}"))
}
