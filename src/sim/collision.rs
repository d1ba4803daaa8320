//! Collision detection and response
//!
//! Paddle and ball are both circles. The walls are the arena's axis-aligned
//! edges; the floor is not a wall (the ball falls through it).

use glam::Vec2;

use super::state::{Arena, Ball, Player};
use crate::consts::{BOUNCE_DAMPING, WALL_MARGIN};
use crate::sign_of;

/// Which boundary a ball was pushed back from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Ceiling,
}

/// Circle/circle overlap test (touching counts)
#[inline]
pub fn circles_touch(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) <= a_radius + b_radius
}

/// Velocity change from a paddle bounce, before jitter.
///
/// Dampens and reverses the incoming velocity, then pushes it away from the
/// paddle in proportion to the offset between centers. The offset is divided by
/// the summed radii, never by the distance, so concentric circles are safe.
pub fn bounce_velocity(ball: &Ball, player: &Player) -> Vec2 {
    let offset = ball.pos - player.pos();
    ball.vel * BOUNCE_DAMPING + offset / (ball.size + player.size)
}

/// Add `roll * v * factor` on each axis; `roll` is a pair of uniform `[0, 1)` draws
#[inline]
pub fn apply_jitter(vel: Vec2, roll: Vec2, factor: f32) -> Vec2 {
    vel + roll * vel * factor
}

/// Place the ball exactly on the paddle's collision circle.
///
/// The angle comes from `atan2(|dy|, |dx|)`, always in the first quadrant, and
/// the quadrant is restored from the signs of `dx` and `dy`. Taking the signed
/// angle straight from `atan2` flips the ball across the vertical axis when
/// `dx` hovers around zero. A zero delta counts as positive.
pub fn separate_from_player(ball_pos: Vec2, ball_size: f32, player: &Player) -> Vec2 {
    let delta = ball_pos - player.pos();
    let angle = delta.y.abs().atan2(delta.x.abs());
    let reach = ball_size + player.size;
    Vec2::new(
        player.x + reach * angle.cos() * sign_of(delta.x),
        player.y + reach * angle.sin() * sign_of(delta.y),
    )
}

/// Push the ball back inside the side walls (and ceiling when present).
///
/// Velocity is pointed away from any wall that was crossed. Returns the walls
/// hit, at most one per axis.
pub fn confine_to_walls(ball: &mut Ball, arena: &Arena) -> Vec<Wall> {
    let mut hits = Vec::new();
    let half = arena.half();
    let inner = half - ball.size;

    if ball.pos.x <= -inner {
        ball.pos.x = -inner + WALL_MARGIN;
        ball.vel.x = ball.vel.x.abs();
        hits.push(Wall::Left);
    } else if ball.pos.x >= inner {
        ball.pos.x = inner - WALL_MARGIN;
        ball.vel.x = -ball.vel.x.abs();
        hits.push(Wall::Right);
    }

    if arena.ceiling && ball.pos.y >= inner {
        ball.pos.y = inner - WALL_MARGIN;
        ball.vel.y = -ball.vel.y.abs();
        hits.push(Wall::Ceiling);
    }

    hits
}

/// Ball center has dropped below the floor
#[inline]
pub fn ball_dropped(ball: &Ball, arena: &Arena) -> bool {
    ball.pos.y < arena.floor()
}
