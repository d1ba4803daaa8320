//! Game state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::scoreboard::Scoreboard;
use crate::tuning::Tuning;

/// Something the renderer or sound layer may want to react to.
///
/// Produced by the physics step, drained by the host after each update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Ball bounced off the paddle
    PaddleHit,
    /// Ball bounced off a side wall
    WallHit,
    /// Ball bounced off the ceiling
    CeilingHit,
    /// Ball dropped out of the bottom; carries the run's final score
    GameOver { score: u32 },
    /// The run just committed beat the best score
    NewBest { score: u32 },
}

/// Fixed square play-field centered at the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub size: f32,
    /// Ball reflects off the ceiling when true
    pub ceiling: bool,
}

impl Arena {
    pub fn new(size: f32, ceiling: bool) -> Self {
        Self { size, ceiling }
    }

    #[inline]
    pub fn half(&self) -> f32 {
        self.size / 2.0
    }

    /// Bottom edge; crossing it ends the run
    #[inline]
    pub fn floor(&self) -> f32 {
        -self.half()
    }
}

/// Which way the paddle last moved (drawing only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

/// The player's paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub x: f32,
    /// Resting height, fixed for the session
    pub y: f32,
    /// Radius
    pub size: f32,
    /// Horizontal velocity (vertical is always zero)
    pub velocity_x: f32,
    pub max_speed: f32,
    pub direction: Facing,
}

impl Player {
    pub fn new(arena: &Arena, size: f32, max_speed: f32) -> Self {
        Self {
            x: 0.0,
            y: Self::resting_height(arena, size),
            size,
            velocity_x: 0.0,
            max_speed,
            direction: Facing::default(),
        }
    }

    /// Height the paddle rides at: one diameter above the floor
    pub fn resting_height(arena: &Arena, size: f32) -> f32 {
        arena.floor() + size * 2.0
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Largest `|x|` the paddle may reach
    #[inline]
    pub fn x_limit(&self, arena: &Arena) -> f32 {
        arena.half() - self.size - PLAYER_WALL_MARGIN
    }

    /// Keep the paddle off the walls
    pub fn clamp_to(&mut self, arena: &Arena) {
        let limit = self.x_limit(arena);
        self.x = crate::clamp_span(self.x, -limit, limit);
    }
}

/// The ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Radius
    pub size: f32,
    pub vel: Vec2,
}

impl Ball {
    pub fn new(size: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            size,
            vel: Vec2::ZERO,
        }
    }

    /// Put the ball back in play at a random column, dropping from mid-height
    pub fn serve(&mut self, arena: &Arena, initial_drop: f32, rng: &mut Pcg32) {
        let limit = arena.half() - self.size - WALL_MARGIN;
        let x = if limit > 0.0 {
            rng.random_range(-limit..=limit)
        } else {
            0.0
        };
        self.pos = Vec2::new(x, 0.0);
        self.vel = Vec2::new(0.0, initial_drop);
    }
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub arena: Arena,
    pub player: Player,
    pub ball: Ball,
    pub scoreboard: Scoreboard,
    /// Accepted frames processed so far
    pub frame: u64,
    /// Events raised since the last drain
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game with a freshly served ball.
    ///
    /// `best_score` is whatever the host's store held at start-up.
    pub fn new(tuning: Tuning, seed: u64, best_score: u32) -> Self {
        let arena = Arena::new(tuning.arena_size, tuning.ceiling);
        let player = Player::new(&arena, tuning.player_size, tuning.player_max_speed);
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ball = Ball::new(tuning.ball_size);
        ball.serve(&arena, tuning.initial_drop, &mut rng);

        Self {
            seed,
            rng,
            tuning,
            arena,
            player,
            ball,
            scoreboard: Scoreboard::new(best_score),
            frame: 0,
            events: Vec::new(),
        }
    }

    /// Take all pending events, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
