//! Keepy Uppy - keep the ball in the air
//!
//! Core modules:
//! - `sim`: Simulation (physics step, collisions, game state)
//! - `scoreboard`: Current run score and persisted best score
//! - `platform`: Input signals, storage, frame timing and browser glue
//! - `renderer`: Frame description and Canvas 2D painter
//! - `audio`: Clip playback with per-clip voice limits
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod game;
pub mod platform;
pub mod renderer;
pub mod scoreboard;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use scoreboard::Scoreboard;
pub use tuning::{TimeStep, Tuning};

/// Game configuration constants
pub mod consts {
    /// Minimum interval between accepted frames (host timestamp units)
    pub const FRAME_THRESHOLD: f64 = 60.0 / 1000.0;

    /// Arena side length (world units, centered at origin)
    pub const ARENA_SIZE: f32 = 300.0;

    /// Paddle defaults
    pub const PLAYER_SIZE: f32 = 20.0;
    pub const PLAYER_MAX_SPEED: f32 = 4.0;
    pub const PLAYER_ACCELERATION: f32 = 0.4;
    pub const PLAYER_DECELERATION: f32 = 0.25;
    /// Gap kept between paddle and side walls
    pub const PLAYER_WALL_MARGIN: f32 = 1.0;

    /// Ball defaults
    pub const BALL_SIZE: f32 = 15.0;
    pub const GRAVITY: f32 = 0.01;
    /// Vertical speed given to a freshly served ball (negative = falling)
    pub const BALL_INITIAL_DROP: f32 = -1.0;
    /// Distance the ball is pushed back inside a wall it crossed
    pub const WALL_MARGIN: f32 = 1.0;

    /// Paddle bounce response
    pub const BOUNCE_DAMPING: f32 = -0.33;
    pub const JITTER_FACTOR: f32 = 0.25;

    /// Score wraps back to zero at this value
    pub const SCORE_MODULUS: u32 = 1000;

    /// Divisor used by the time-scaled integration variant
    pub const TIME_SCALE_DIVISOR: f32 = 7.0;

    /// Simultaneous voices allowed per sound clip
    pub const MAX_VOICES_PER_CLIP: usize = 3;
}

/// Sign of a coordinate delta where zero counts as positive
#[inline]
pub fn sign_of(delta: f32) -> f32 {
    if delta < 0.0 { -1.0 } else { 1.0 }
}

/// Clamp a value into `[min, max]`, tolerating `min > max` by collapsing to the midpoint
#[inline]
pub fn clamp_span(value: f32, min: f32, max: f32) -> f32 {
    if min > max {
        return (min + max) / 2.0;
    }
    value.clamp(min, max)
}
