//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input signals (keyboard, touch)
//! - Storage (LocalStorage on web, in-memory natively)
//! - Frame timing and the presentation-driven loop
//! - Page bootstrap (web only)

pub mod input;
pub mod storage;
pub mod time;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::{InputSource, InputState, KeyBindings, Signal, UnknownSignal};
pub use storage::{BestScore, BestScoreStore, KeyValueStore, MemoryStore, StorageError};
pub use time::{CancelToken, FrameClock, FrameHandler, FrameOutcome, LoopDriver};
