//! Heartbeat Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{AddEventListenerOptions, Document, KeyboardEvent, MouseEvent, TouchEvent};

    use heartbeat_runner::audio::web::fetch_sample;
    use heartbeat_runner::audio::{AudioManager, Cue, WebAudioDevice};
    use heartbeat_runner::consts::SCHEDULER_INTERVAL_MS;
    use heartbeat_runner::level::{Level, builtin};
    use heartbeat_runner::sim::{GameState, RunOutcome};
    use heartbeat_runner::{Game, Settings, Tuning, platform};

    /// Decoded samples replace synthesis for these cues
    const SAMPLES: &[(Cue, &str)] = &[(Cue::Jump, "sfx/jump.wav")];

    struct App {
        game: RefCell<Game<WebAudioDevice>>,
        level: Level,
        /// Pending requestAnimationFrame id
        frame_id: Cell<Option<i32>>,
        /// Scheduler interval id and the callback it runs
        scheduler: RefCell<Option<(i32, Closure<dyn FnMut()>)>>,
        samples_requested: Cell<bool>,
    }

    impl App {
        /// Begin a run. Called from a user gesture so the audio context may
        /// start.
        fn start_run(app: &Rc<App>) {
            let seed = platform::run_seed();
            if let Err(e) = app.game.borrow_mut().start(&app.level, seed) {
                log::error!("Cannot start '{}': {e}", app.level.name);
                return;
            }

            request_samples(app);
            start_scheduler(app);
            request_animation_frame(app.clone());
            set_class("prompt", "hidden");
            set_class("result", "hidden");
        }

        /// Cancel every pending callback and silence the drums. Idempotent.
        fn teardown(&self) {
            let window = web_sys::window().unwrap();
            if let Some(id) = self.frame_id.take() {
                let _ = window.cancel_animation_frame(id);
            }
            if let Some((id, _callback)) = self.scheduler.borrow_mut().take() {
                window.clear_interval_with_handle(id);
            }
            self.game.borrow_mut().stop();
        }

        fn on_gesture(app: &Rc<App>) {
            let running = app.game.borrow().is_running();
            if running {
                app.game.borrow_mut().jump();
            } else {
                App::start_run(app);
            }
        }
    }

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn set_class(id: &str, class: &str) {
        if let Some(el) = document().get_element_by_id(id) {
            let _ = el.set_attribute("class", class);
        }
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    /// Update HUD elements in DOM
    fn update_hud(state: &GameState, settings: &Settings) {
        let stats = &state.stats;
        set_text("hud-life", &stats.life.to_string());
        set_text("hud-dist", &format!("{}m", stats.score));

        let elapsed = stats.song_time.max(0.0) as u64;
        set_text("hud-time", &format!("{}:{:02}", elapsed / 60, elapsed % 60));

        // Flash and shake are drawn by the stylesheet
        if let Some(el) = document().get_element_by_id("game") {
            let feedback = state.feedback.presented(settings);
            let [r, g, b] = feedback.flash.map(|f| f.color()).unwrap_or([0.0; 3]);
            let style = format!(
                "--flash-color: rgb({}, {}, {}); --flash: {:.2}; --shake: {:.1}px; --player-y: {:.1}px",
                (r * 255.0) as u8,
                (g * 255.0) as u8,
                (b * 255.0) as u8,
                feedback.flash_intensity.min(1.0),
                feedback.shake,
                state.player.pos.y,
            );
            let _ = el.set_attribute("style", &style);
        }
    }

    fn show_result(outcome: &RunOutcome) {
        set_text("result-score", &outcome.final_score.to_string());
        set_text("result-misses", &outcome.miss_count.to_string());
        set_text("result-rank", outcome.rank().as_str());
        set_text(
            "result-title",
            if outcome.cleared { "STAGE CLEAR" } else { "FLATLINE" },
        );
        set_class("result", "");
        set_class("prompt", "");
    }

    fn request_samples(app: &Rc<App>) {
        if app.samples_requested.replace(true) {
            return;
        }
        let Some(ctx) = app
            .game
            .borrow()
            .audio
            .device()
            .map(|d| d.context().clone())
        else {
            return;
        };

        for &(cue, url) in SAMPLES {
            let app = app.clone();
            let ctx = ctx.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match fetch_sample(ctx, cue, url.to_string()).await {
                    Ok(buffer) => {
                        if let Some(device) = app.game.borrow_mut().audio.device_mut() {
                            device.insert_sample(cue, buffer);
                        }
                    }
                    Err(e) => log::error!("{e} - using synthesized '{}'", cue.as_str()),
                }
            });
        }
    }

    fn start_scheduler(app: &Rc<App>) {
        let window = web_sys::window().unwrap();
        let mut slot = app.scheduler.borrow_mut();
        if slot.is_some() {
            return;
        }

        let tick_app = app.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            tick_app.game.borrow_mut().scheduler_tick();
        });
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            SCHEDULER_INTERVAL_MS,
        ) {
            Ok(id) => *slot = Some((id, callback)),
            Err(e) => log::error!("Failed to start scheduler timer: {e:?}"),
        }
    }

    fn request_animation_frame(app: Rc<App>) {
        let window = web_sys::window().unwrap();
        let frame_app = app.clone();
        let closure = Closure::once(move |_time: f64| {
            game_loop(frame_app);
        });
        if let Ok(id) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            app.frame_id.set(Some(id));
        }
        closure.forget();
    }

    fn game_loop(app: Rc<App>) {
        app.frame_id.set(None);

        let outcome = {
            let mut game = app.game.borrow_mut();
            let outcome = game.frame();
            if let Some(state) = game.state() {
                update_hud(state, &game.settings);
            }
            outcome
        };

        match outcome {
            Some(outcome) => {
                app.teardown();
                show_result(&outcome);
            }
            None => request_animation_frame(app),
        }
    }

    fn setup_input_handlers(app: Rc<App>) {
        let window = web_sys::window().unwrap();

        // Keyboard
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.code() == "Space" {
                    event.prevent_default();
                    if !event.repeat() {
                        App::on_gesture(&app);
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                App::on_gesture(&app);
            });
            let _ = window
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch: non-passive so the emulated mousedown can be suppressed
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                App::on_gesture(&app);
            });
            let options = AddEventListenerOptions::new();
            options.set_passive(false);
            let _ = window.add_event_listener_with_callback_and_add_event_listener_options(
                "touchstart",
                closure.as_ref().unchecked_ref(),
                &options,
            );
            closure.forget();
        }

        // Page hidden: end the run rather than let the clocks drift apart
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.teardown();
                set_class("prompt", "");
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Heartbeat Runner starting...");

        // Hide loading indicator
        set_class("loading", "hidden");

        let settings = Settings::load();
        let audio = AudioManager::new(WebAudioDevice::open);
        let game = Game::new(audio, Tuning::default(), settings);

        let app = Rc::new(App {
            game: RefCell::new(game),
            level: builtin::heartbeat(),
            frame_id: Cell::new(None),
            scheduler: RefCell::new(None),
            samples_requested: Cell::new(false),
        });

        setup_input_handlers(app);
        set_class("prompt", "");

        log::info!("Heartbeat Runner ready - press space or tap to start");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Headless run: the autopilot plays the default level against a simulated
/// clock and the outcome is printed as JSON.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use heartbeat_runner::audio::{AudioManager, Cue, RecordingDevice};
    use heartbeat_runner::level::builtin;
    use heartbeat_runner::sim::Autopilot;
    use heartbeat_runner::{Game, Settings, Tuning, platform};

    env_logger::init();
    log::info!("Heartbeat Runner (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    let name = std::env::args().nth(1).unwrap_or_else(|| "heartbeat".into());
    let Some(level) = builtin::by_name(&name) else {
        eprintln!(
            "unknown level '{name}'; expected one of: {}",
            builtin::all()
                .iter()
                .map(|l| l.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        std::process::exit(2);
    };

    let frame = 1.0 / 60.0;
    let device = RecordingDevice::new();
    let mut game = Game::new(
        AudioManager::with_device(device.clone()),
        Tuning::default(),
        Settings::default(),
    );
    let pilot = Autopilot::new(frame);

    if let Err(e) = game.start(&level, platform::run_seed()) {
        eprintln!("cannot start '{}': {e}", level.name);
        std::process::exit(1);
    }

    let outcome = loop {
        device.advance(frame);
        game.scheduler_tick();
        if game.state().is_some_and(|s| pilot.should_jump(s)) {
            game.jump();
        }
        if let Some(outcome) = game.frame() {
            break outcome;
        }
    };

    log::info!(
        "{} kicks, {} snares, {} jumps scheduled",
        device.count(Cue::Kick),
        device.count(Cue::Snare),
        device.count(Cue::Jump)
    );
    match serde_json::to_string_pretty(&outcome) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to encode outcome: {e}"),
    }
    println!("Rank: {}", outcome.rank().as_str());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
