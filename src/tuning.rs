//! Game balance and loop configuration
//!
//! Defaults come from [`crate::consts`]; hosts may override any field with a
//! JSON document (missing fields keep their defaults).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// How elapsed frame time feeds the physics step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimeStep {
    /// Every accepted frame advances by one fixed step, whatever its duration
    #[default]
    PerFrame,
    /// Steps scale with elapsed time: `delta_time / divisor`
    Scaled { divisor: f32 },
}

impl TimeStep {
    /// The time-scaled variant with its usual divisor
    pub fn scaled() -> Self {
        TimeStep::Scaled {
            divisor: TIME_SCALE_DIVISOR,
        }
    }

    /// Multiplier for every time-dependent quantity in one step.
    ///
    /// Never negative and never NaN.
    pub fn scale(&self, delta_time: f64) -> f32 {
        match *self {
            TimeStep::PerFrame => 1.0,
            TimeStep::Scaled { divisor } => {
                let scale = (delta_time / divisor as f64) as f32;
                if scale.is_finite() && scale > 0.0 {
                    scale
                } else {
                    0.0
                }
            }
        }
    }
}

/// Errors raised while loading tuning overrides
#[derive(Debug)]
pub enum TuningError {
    /// Document is not valid JSON for [`Tuning`]
    Parse(serde_json::Error),
    /// A value is out of its allowed range
    Invalid(&'static str),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "failed to parse tuning: {}", e),
            TuningError::Invalid(what) => write!(f, "invalid tuning: {}", what),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(e) => Some(e),
            TuningError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    /// Side length of the square arena
    pub arena_size: f32,
    /// Reflect the ball off the ceiling (bounded arena)
    pub ceiling: bool,

    // === Paddle ===
    pub player_size: f32,
    pub player_max_speed: f32,
    /// Speed gained per step while a direction is held
    pub player_acceleration: f32,
    /// Speed lost per step while a direction is released
    pub player_deceleration: f32,

    // === Ball ===
    pub ball_size: f32,
    /// Downward speed added per step
    pub gravity: f32,
    /// Vertical speed of a served ball
    pub initial_drop: f32,
    /// Random extra speed on paddle bounces (fraction of current speed)
    pub jitter_factor: f32,

    // === Loop ===
    /// Minimum interval between accepted frames
    pub frame_threshold: f64,
    pub time_step: TimeStep,

    // === Audio ===
    pub max_voices_per_clip: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_size: ARENA_SIZE,
            ceiling: true,

            player_size: PLAYER_SIZE,
            player_max_speed: PLAYER_MAX_SPEED,
            player_acceleration: PLAYER_ACCELERATION,
            player_deceleration: PLAYER_DECELERATION,

            ball_size: BALL_SIZE,
            gravity: GRAVITY,
            initial_drop: BALL_INITIAL_DROP,
            jitter_factor: JITTER_FACTOR,

            frame_threshold: FRAME_THRESHOLD,
            time_step: TimeStep::PerFrame,

            max_voices_per_clip: MAX_VOICES_PER_CLIP,
        }
    }
}

/// Environment variable naming a native tuning file
#[cfg(not(target_arch = "wasm32"))]
pub const TUNING_ENV_VAR: &str = "KEEPY_UPPY_TUNING";

impl Tuning {
    /// Parse overrides from JSON and validate the result
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse overrides, falling back to defaults (and logging) on any error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Err(e) => {
                log::warn!("{} - using default tuning", e);
                Self::default()
            }
        }
    }

    /// Check that the arena can hold the paddle and ball
    pub fn validate(&self) -> Result<(), TuningError> {
        let finite = [
            self.arena_size,
            self.player_size,
            self.player_max_speed,
            self.player_acceleration,
            self.player_deceleration,
            self.ball_size,
            self.gravity,
            self.initial_drop,
            self.jitter_factor,
        ];
        if finite.iter().any(|v| !v.is_finite()) || !self.frame_threshold.is_finite() {
            return Err(TuningError::Invalid("values must be finite"));
        }
        if self.player_size <= 0.0 || self.ball_size <= 0.0 {
            return Err(TuningError::Invalid("sizes must be positive"));
        }
        if self.half_arena() <= self.player_size + PLAYER_WALL_MARGIN
            || self.half_arena() <= self.ball_size + WALL_MARGIN
        {
            return Err(TuningError::Invalid("arena too small for paddle or ball"));
        }
        if self.player_max_speed < 0.0
            || self.player_acceleration < 0.0
            || self.player_deceleration < 0.0
        {
            return Err(TuningError::Invalid("paddle speeds must be non-negative"));
        }
        if self.initial_drop == 0.0 {
            return Err(TuningError::Invalid("served ball needs a non-zero drop"));
        }
        if self.frame_threshold < 0.0 {
            return Err(TuningError::Invalid("frame threshold must be non-negative"));
        }
        if let TimeStep::Scaled { divisor } = self.time_step {
            if !(divisor.is_finite() && divisor > 0.0) {
                return Err(TuningError::Invalid("time scale divisor must be positive"));
            }
        }
        if self.max_voices_per_clip == 0 {
            return Err(TuningError::Invalid("at least one voice per clip"));
        }
        Ok(())
    }

    /// Half the arena side
    #[inline]
    pub fn half_arena(&self) -> f32 {
        self.arena_size / 2.0
    }

    /// Native: overrides from the JSON file named by `KEEPY_UPPY_TUNING`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::load_file(std::env::var(TUNING_ENV_VAR).ok().as_deref())
    }

    /// Overrides from a JSON file; defaults when there is no path or it can't be read
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_file(path: Option<&str>) -> Self {
        let Some(path) = path else {
            log::info!("Using default tuning");
            return Self::default();
        };
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json_or_default(&json),
            Err(e) => {
                log::warn!("Could not read tuning file '{}': {} - using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Web: overrides from an inline `<script id="tuning" type="application/json">`
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("tuning"))
            .and_then(|el| el.text_content());

        match json {
            Some(json) if !json.trim().is_empty() => Self::from_json_or_default(&json),
            _ => {
                log::info!("Using default tuning");
                Self::default()
            }
        }
    }
}
