//! Simulation module
//!
//! All gameplay logic lives here:
//! - One step per accepted frame, driven by [`tick`]
//! - Seeded RNG only (bounce jitter, serve column)
//! - No rendering or platform dependencies beyond the input and score store traits

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::{Wall, circles_touch, confine_to_walls, separate_from_player};
pub use state::{Arena, Ball, Facing, GameEvent, GameState, Player};
pub use tick::tick;
