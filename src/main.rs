//! Pickup Pong entry point
//!
//! On wasm32 this wires the page (canvas, buttons, input listeners) to a
//! `Game` and drives it from `requestAnimationFrame`. Natively it runs a
//! headless match against an idle player and prints the final state as JSON.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent};

    use pickup_pong::audio::AudioManager;
    use pickup_pong::config::{GameConfig, arena_size_for_viewport};
    use pickup_pong::renderer::hud::{PAUSE_BUTTON_ID, RESTART_BUTTON_ID, START_BUTTON_ID};
    use pickup_pong::renderer::{CanvasPresenter, Hud};
    use pickup_pong::sim::{Action, Game};

    const CANVAS_ID: &str = "pongCanvas";

    /// Everything the callbacks share
    struct App {
        game: Game,
        presenter: CanvasPresenter,
        canvas: HtmlCanvasElement,
    }

    type Shared = Rc<RefCell<App>>;

    fn viewport_arena() -> (f32, f32) {
        let Some(window) = web_sys::window() else {
            return (pickup_pong::consts::ARENA_WIDTH, pickup_pong::consts::ARENA_HEIGHT);
        };
        let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        arena_size_for_viewport(w as f32, h as f32)
    }

    fn size_canvas(canvas: &HtmlCanvasElement, width: f32, height: f32) {
        canvas.set_width(width as u32);
        canvas.set_height(height as u32);
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Pickup Pong starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let (width, height) = viewport_arena();
        size_canvas(&canvas, width, height);

        let seed = js_sys::Date::now() as u64;
        let game = Game::new(GameConfig::for_viewport(width, height), seed);
        log::info!("Game initialized with seed: {}", seed);

        let presenter = CanvasPresenter::new(ctx, Hud::new(&document), AudioManager::new());
        let app = Rc::new(RefCell::new(App {
            game,
            presenter,
            canvas: canvas.clone(),
        }));

        {
            // Initial DOM state: 0-0, only the start button showing
            let mut guard = app.borrow_mut();
            let App { game, presenter, .. } = &mut *guard;
            use pickup_pong::Presenter;
            presenter.update_score_display(0, 0);
            presenter.set_control_buttons_state(game.control_buttons());
        }

        setup_keyboard(app.clone())?;
        setup_pointer(&document, &canvas, app.clone())?;
        setup_touch(&canvas, app.clone())?;
        setup_buttons(&document, app.clone());
        setup_resize(app.clone())?;

        request_animation_frame(app);

        log::info!("Pickup Pong running!");
        Ok(())
    }

    fn listen<E: wasm_bindgen::convert::FromWasmAbi + 'static>(
        target: &web_sys::EventTarget,
        event: &str,
        handler: impl FnMut(E) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(E)>::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_keyboard(app: Shared) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;

        {
            let app = app.clone();
            listen(&document, "keydown", move |event: KeyboardEvent| {
                let code = event.code();
                if code == "Space" {
                    // Keep the page from scrolling
                    event.prevent_default();
                }
                let mut app = app.borrow_mut();
                app.presenter.unlock_audio();
                app.game.key_down(&code);
            })?;
        }

        listen(&document, "keyup", move |event: KeyboardEvent| {
            app.borrow_mut().game.key_up(&event.code());
        })
    }

    /// Client y to canvas y; works outside the canvas too
    fn canvas_y(canvas: &HtmlCanvasElement, client_y: i32) -> f32 {
        let rect = canvas.get_bounding_client_rect();
        (f64::from(client_y) - rect.top()) as f32
    }

    fn setup_pointer(
        document: &web_sys::Document,
        canvas: &HtmlCanvasElement,
        app: Shared,
    ) -> Result<(), JsValue> {
        {
            // On the document so the paddle keeps following off-canvas
            let app = app.clone();
            let canvas_clone = canvas.clone();
            listen(document, "mousemove", move |event: MouseEvent| {
                let y = canvas_y(&canvas_clone, event.client_y());
                app.borrow_mut().game.pointer_move(y);
            })?;
        }

        listen(canvas, "click", move |_event: MouseEvent| {
            let mut app = app.borrow_mut();
            app.presenter.unlock_audio();
            app.game.click();
        })
    }

    /// Touch y in canvas coordinates
    fn touch_y(canvas: &HtmlCanvasElement, event: &TouchEvent) -> Option<f32> {
        let touch = event.touches().get(0)?;
        Some(canvas_y(canvas, touch.client_y()))
    }

    fn setup_touch(canvas: &HtmlCanvasElement, app: Shared) -> Result<(), JsValue> {
        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            listen(canvas, "touchstart", move |event: TouchEvent| {
                event.prevent_default();
                let mut app = app.borrow_mut();
                app.presenter.unlock_audio();
                if let Some(y) = touch_y(&canvas_clone, &event) {
                    app.game.touch_start(y);
                }
            })?;
        }

        {
            let app = app.clone();
            let canvas_clone = canvas.clone();
            listen(canvas, "touchmove", move |event: TouchEvent| {
                event.prevent_default();
                if let Some(y) = touch_y(&canvas_clone, &event) {
                    app.borrow_mut().game.touch_move(y);
                }
            })?;
        }

        listen(canvas, "touchend", move |event: TouchEvent| {
            app.borrow_mut().game.touch_end(event.time_stamp());
        })
    }

    fn setup_buttons(document: &web_sys::Document, app: Shared) {
        let buttons = [
            (START_BUTTON_ID, Action::Start),
            (PAUSE_BUTTON_ID, Action::TogglePause),
            (RESTART_BUTTON_ID, Action::Restart),
        ];
        for (id, action) in buttons {
            let Some(button) = document.get_element_by_id(id) else {
                log::warn!("Button #{} missing", id);
                continue;
            };
            let app = app.clone();
            let wired = listen(&button, "click", move |_event: MouseEvent| {
                let mut app = app.borrow_mut();
                app.presenter.unlock_audio();
                app.game.request(action);
            });
            if wired.is_err() {
                log::warn!("Could not wire #{}", id);
            }
        }
    }

    fn setup_resize(app: Shared) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        listen(&window, "resize", move |_event: web_sys::Event| {
            let (width, height) = viewport_arena();
            let mut app = app.borrow_mut();
            size_canvas(&app.canvas, width, height);
            app.game.resize(width, height);
        })
    }

    fn request_animation_frame(app: Shared) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Shared, time: f64) {
        {
            let mut guard = app.borrow_mut();
            let App { game, presenter, .. } = &mut *guard;
            game.frame(time, presenter);
        }

        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(err) = wasm_game::run() {
        log::error!("Startup failed: {:?}", err);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use pickup_pong::presenter::{ControlButtons, Countdown, Presenter, Snapshot, SoundCue};

    /// Presenter that only logs
    pub struct LogPresenter;

    impl Presenter for LogPresenter {
        fn draw(&mut self, _snapshot: &Snapshot<'_>) {}

        fn update_score_display(&mut self, player: u32, computer: u32) {
            log::info!("Score {} - {}", player, computer);
        }

        fn show_transient_message(&mut self, text: &str, _duration_ms: f64) {
            log::info!("{}", text);
        }

        fn hide_transient_message(&mut self) {}

        fn show_countdown(&mut self, countdown: Countdown) {
            if let Some(text) = countdown.text() {
                log::debug!("Countdown {}", text);
            }
        }

        fn set_control_buttons_state(&mut self, buttons: ControlButtons) {
            log::debug!("Buttons {:?}", buttons);
        }

        fn play_sound(&mut self, cue: SoundCue) {
            log::trace!("Sound {:?}", cue);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use pickup_pong::sim::{Game, GamePhase};
    use pickup_pong::GameConfig;

    /// 60 frames per second
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after ten simulated minutes
    const MAX_FRAMES: u32 = 60 * 60 * 10;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Pickup Pong (native) starting...");
    log::info!("Native mode runs a headless match - build for wasm32 to play in the browser");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(7);

    let mut presenter = headless::LogPresenter;
    let mut game = Game::new(GameConfig::default(), seed);
    game.start(0.0, &mut presenter);

    let mut now = 0.0;
    for _ in 0..MAX_FRAMES {
        now += FRAME_MS;
        game.frame(now, &mut presenter);
        if game.phase() == GamePhase::GameOver {
            break;
        }
    }

    log::info!(
        "Finished in {:?} after {} ticks ({:.1}s)",
        game.phase(),
        game.state().time_ticks,
        now / 1000.0
    );
    match serde_json::to_string_pretty(game.state()) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Could not serialize final state: {}", err),
    }
}
