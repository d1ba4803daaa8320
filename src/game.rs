//! Game wiring
//!
//! Owns the simulation and its collaborators and exposes them to the loop
//! driver as a [`FrameHandler`]. Input is shared with the host's event
//! listeners through an `Rc<RefCell<_>>`; everything else is touched only from
//! the loop.

use std::cell::RefCell;
use std::rc::Rc;

use crate::audio::{ClipBackend, SoundEffect, SoundHandler};
use crate::platform::input::InputState;
use crate::platform::storage::{BestScore, BestScoreStore, KeyValueStore};
use crate::platform::time::FrameHandler;
use crate::renderer::{self, Frame, Viewport};
use crate::sim::{GameEvent, GameState, tick};
use crate::tuning::Tuning;

/// Where rendered frames go
pub trait Surface {
    fn viewport(&self) -> Viewport;
    fn present(&mut self, frame: &Frame);
}

/// Surface that keeps the last frame instead of drawing it (native runs)
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    viewport: Viewport,
    presented: u64,
    last: Option<Frame>,
}

impl HeadlessSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            presented: 0,
            last: None,
        }
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.last.as_ref()
    }
}

impl Surface for HeadlessSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn present(&mut self, frame: &Frame) {
        self.presented += 1;
        self.last = Some(frame.clone());
    }
}

/// Game instance holding all state
pub struct Game<S: KeyValueStore, B: ClipBackend, P: Surface> {
    state: GameState,
    input: Rc<RefCell<InputState>>,
    store: BestScore<S>,
    sounds: SoundHandler<B>,
    surface: P,
}

impl<S: KeyValueStore, B: ClipBackend, P: Surface> Game<S, B, P> {
    /// Build a game; the best score is read from `store` once, here
    pub fn new(tuning: Tuning, seed: u64, store: S, backend: B, surface: P) -> Self {
        let store = BestScore::new(store);
        let best = store.load_best();
        let mut sounds = SoundHandler::with_max_voices(backend, tuning.max_voices_per_clip);
        sounds.add_defaults();
        log::info!("Game initialized with seed {} (best score {})", seed, best);

        Self {
            state: GameState::new(tuning, seed, best),
            input: Rc::new(RefCell::new(InputState::new())),
            store,
            sounds,
            surface,
        }
    }

    /// Handle for event listeners to press and release signals
    pub fn input(&self) -> Rc<RefCell<InputState>> {
        self.input.clone()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn store(&self) -> &BestScore<S> {
        &self.store
    }

    pub fn sounds_mut(&mut self) -> &mut SoundHandler<B> {
        &mut self.sounds
    }

    pub fn surface(&self) -> &P {
        &self.surface
    }

    fn play_event_sounds(&mut self, events: Vec<GameEvent>) {
        for event in &events {
            // Outcome only matters to tests; drops and failures are already logged
            let _ = self.sounds.play(SoundEffect::for_event(event));
        }
    }
}

impl<S: KeyValueStore, B: ClipBackend, P: Surface> FrameHandler for Game<S, B, P> {
    fn update(&mut self, delta_time: f64) {
        {
            let input = self.input.borrow();
            tick(&mut self.state, &*input, delta_time, &mut self.store);
        }
        let events = self.state.drain_events();
        self.play_event_sounds(events);
    }

    fn render(&mut self) {
        let frame = renderer::render(&self.state, self.surface.viewport());
        self.surface.present(&frame);
    }
}
