//! Pixel Pursuit entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::HtmlCanvasElement;

    use pixel_pursuit::platform::WebBackend;
    use pixel_pursuit::{Flow, Session, Settings, StartupError};

    type WebSession = Session<WebBackend>;

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Pixel Pursuit starting...");

        if let Err(e) = start().await {
            log::error!("{e}");
            show_message(&e.to_string());
        }
    }

    async fn start() -> Result<(), StartupError> {
        let missing = |what: &str| StartupError::Graphics(format!("no {what}"));

        let window = web_sys::window().ok_or_else(|| missing("window"))?;
        let document = window.document().ok_or_else(|| missing("document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into().ok())
            .ok_or_else(|| missing("#canvas element"))?;

        let settings = canvas
            .get_attribute("data-settings")
            .map(|json| Settings::from_json_or_default(&json))
            .unwrap_or_default();

        let backend = WebBackend::new(canvas).await?;

        let seed = js_sys::Date::now() as u64;
        let session = Session::start(backend, settings, seed)?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        request_animation_frame(Rc::new(RefCell::new(session)));

        log::info!("Pixel Pursuit running!");
        Ok(())
    }

    /// Put a message where the loading indicator was
    fn show_message(message: &str) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(el) = document.get_element_by_id("loading") {
            el.set_text_content(Some(message));
            let _ = el.set_attribute("class", "");
        } else if let Some(body) = document.body() {
            body.set_text_content(Some(message));
        }
    }

    fn request_animation_frame(session: Rc<RefCell<WebSession>>) {
        let Some(window) = web_sys::window() else {
            log::error!("Lost window; stopping");
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(session, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(session: Rc<RefCell<WebSession>>, time: f64) {
        let flow = session.borrow_mut().update(time);
        match flow {
            Flow::Continue => request_animation_frame(session),
            Flow::Quit => {
                log::info!("Pixel Pursuit stopped");
                show_message("Thanks for playing! Reload the page to start again.");
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::time::{SystemTime, UNIX_EPOCH};

    use pixel_pursuit::platform::HeadlessBackend;
    use pixel_pursuit::sim::DisplayMetrics;
    use pixel_pursuit::{Session, Settings};

    env_logger::init();
    log::info!("Pixel Pursuit (native) starting...");
    log::info!("Native mode has no window or gamepad backend - run with `trunk serve` for the web version");

    let settings = std::env::var("PIXEL_PURSUIT_SETTINGS")
        .map(|json| Settings::from_json_or_default(&json))
        .unwrap_or_default();

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64);

    let backend = HeadlessBackend::new(DisplayMetrics::new(1920, 1080));
    match Session::start(backend, settings, seed) {
        Ok(session) => run_blocking(session),
        Err(e) => {
            log::error!("{e}");
            eprintln!("pixel-pursuit: {e}");
            std::process::exit(1);
        }
    }
}

/// Drive a session from a wall clock until it quits
#[cfg(not(target_arch = "wasm32"))]
fn run_blocking<B: pixel_pursuit::platform::Backend>(mut session: pixel_pursuit::Session<B>) {
    use std::time::{Duration, Instant};

    use pixel_pursuit::Flow;

    let clock = Instant::now();
    while session.update(clock.elapsed().as_secs_f64() * 1000.0) == Flow::Continue {
        std::thread::sleep(Duration::from_millis(1));
    }
    log::info!("Pixel Pursuit stopped");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
