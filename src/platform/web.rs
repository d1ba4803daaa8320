//! Browser bootstrap
//!
//! Finds the canvas, wires window listeners into the shared input state and
//! drives the loop from `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, KeyboardEvent, TouchEvent, Window};

use super::input::InputState;
use super::storage::LocalStorage;
use super::time::{CancelToken, LoopDriver};
use crate::audio::web::HtmlAudioBackend;
use crate::game::{Game, Surface};
use crate::renderer::canvas::CanvasPainter;
use crate::renderer::{Frame, Viewport};
use crate::tuning::Tuning;

/// Canvas element id expected in the page
const CANVAS_ID: &str = "gameCanvas";

/// Canvas-backed surface; the viewport follows the canvas size
pub struct CanvasSurface {
    painter: CanvasPainter,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self {
            painter: CanvasPainter::new(canvas),
        }
    }
}

impl Surface for CanvasSurface {
    fn viewport(&self) -> Viewport {
        let canvas = self.painter.canvas();
        Viewport::new(canvas.width() as f32, canvas.height() as f32)
    }

    fn present(&mut self, frame: &Frame) {
        self.painter.paint(frame);
    }
}

type WebGame = Game<LocalStorage, HtmlAudioBackend, CanvasSurface>;
type WebDriver = LoopDriver<WebGame>;

thread_local! {
    static RUNNING: RefCell<Option<CancelToken>> = const { RefCell::new(None) };
}

/// Stop the running game loop (no further frames are scheduled)
#[wasm_bindgen]
pub fn stop_game() {
    RUNNING.with(|running| {
        if let Some(token) = running.borrow_mut().take() {
            token.cancel();
            log::info!("Stop requested");
        }
    });
}

/// Set up the page and start the loop
pub fn run() -> Result<CancelToken, JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    log::info!("Keepy Uppy starting...");

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let canvas: HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or("no canvas")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("element is not a canvas"))?;

    fit_canvas(&window, &canvas);
    setup_resize(&window, canvas.clone());

    let tuning = Tuning::load();
    let threshold = tuning.frame_threshold;
    let seed = js_sys::Date::now() as u64;
    let game = Game::new(
        tuning,
        seed,
        LocalStorage::open(),
        HtmlAudioBackend,
        CanvasSurface::new(canvas),
    );

    setup_input_handlers(&window, game.input());

    let driver = Rc::new(RefCell::new(LoopDriver::new(game, threshold)));
    let token = driver.borrow().cancel_token();
    RUNNING.with(|running| *running.borrow_mut() = Some(token.clone()));

    request_animation_frame(driver);
    log::info!("Keepy Uppy running!");
    Ok(token)
}

/// Match the canvas to the window
fn fit_canvas(window: &Window, canvas: &HtmlCanvasElement) {
    let width = window
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .unwrap_or(300.0);
    let height = window
        .inner_height()
        .ok()
        .and_then(|h| h.as_f64())
        .unwrap_or(300.0);
    canvas.set_width(width as u32);
    canvas.set_height(height as u32);
}

fn setup_resize(window: &Window, canvas: HtmlCanvasElement) {
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        if let Some(window) = web_sys::window() {
            fit_canvas(&window, &canvas);
        }
    });
    let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn setup_input_handlers(window: &Window, input: Rc<RefCell<InputState>>) {
    // Keyboard
    {
        let input = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            input.borrow_mut().key_down(&event.key());
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }
    {
        let input = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            input.borrow_mut().key_up(&event.key());
        });
        let _ = window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Touch start: steer toward the touched half
    {
        let input = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
            let Some(touch) = event.touches().item(0) else {
                return;
            };
            let width = web_sys::window()
                .and_then(|w| w.inner_width().ok())
                .and_then(|w| w.as_f64())
                .unwrap_or(0.0);
            input
                .borrow_mut()
                .touch_start(touch.client_x() as f32, width as f32);
        });
        let _ =
            window.add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Touch end: release both directions
    {
        let input = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
            input.borrow_mut().touch_end();
        });
        let _ =
            window.add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Window blur: keys released elsewhere never reach us
    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            input.borrow_mut().clear();
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

fn request_animation_frame(driver: Rc<RefCell<WebDriver>>) {
    let Some(window) = web_sys::window() else {
        log::error!("No window - game loop not scheduled");
        return;
    };
    let closure = Closure::once(move |time: f64| {
        game_loop(driver, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn game_loop(driver: Rc<RefCell<WebDriver>>, time: f64) {
    let cancelled = {
        let mut d = driver.borrow_mut();
        d.on_frame(time);
        d.is_cancelled()
    };

    if cancelled {
        log::info!("Game loop stopped");
        return;
    }
    request_animation_frame(driver);
}
