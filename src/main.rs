//! Keepy Uppy entry point
//!
//! On the web the page bootstrap lives in `platform::web`. Natively there is no
//! window: the binary plays a scripted headless session and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = keepy_uppy::platform::web::run() {
        log::error!("Failed to start: {:?}", e);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use keepy_uppy::Game;
    use keepy_uppy::Tuning;
    use keepy_uppy::audio::SilentBackend;
    use keepy_uppy::game::HeadlessSurface;
    use keepy_uppy::platform::MemoryStore;
    use keepy_uppy::platform::time::{LoopDriver, steady_presentations};
    use keepy_uppy::renderer::Viewport;

    env_logger::init();
    log::info!("Keepy Uppy (native) starting...");
    log::info!("Native mode runs headless - build for wasm32 to play in a browser");

    let tuning = Tuning::load();
    let threshold = tuning.frame_threshold;
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let game = Game::new(
        tuning,
        seed,
        MemoryStore::new(),
        SilentBackend,
        HeadlessSurface::new(Viewport::new(600.0, 600.0)),
    );
    let input = game.input();
    let mut driver = LoopDriver::new(game, threshold);

    // One minute at 60 Hz, chasing the ball with the keyboard signals
    let mut frames = 0u64;
    for time in steady_presentations(1000.0 / 60.0).take(3600) {
        let (ball_x, player_x) = {
            let state = driver.handler().state();
            (state.ball.pos.x, state.player.x)
        };
        {
            let mut held = input.borrow_mut();
            held.clear();
            if ball_x < player_x - 4.0 {
                held.key_down("ArrowLeft");
            } else if ball_x > player_x + 4.0 {
                held.key_down("ArrowRight");
            }
        }
        frames += driver.run(std::iter::once(time));
    }

    let state = driver.handler().state();
    log::info!(
        "Played {} frames: score {}, best {}",
        frames,
        state.scoreboard.score(),
        state.scoreboard.best()
    );
    println!(
        "frames={} score={} best={}",
        frames,
        state.scoreboard.score(),
        state.scoreboard.best()
    );
}
