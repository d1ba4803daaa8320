//! Per-frame simulation step
//!
//! Advances the game by one accepted frame. Sub-step order matters and is fixed:
//! paddle control, paddle move, gravity, ball move, paddle bounce, walls, floor.

use glam::Vec2;
use rand::Rng;

use super::collision::{
    Wall, apply_jitter, ball_dropped, bounce_velocity, circles_touch, confine_to_walls,
    separate_from_player,
};
use super::state::{Facing, GameEvent, GameState, Player};
use crate::platform::input::{InputSource, Signal};
use crate::platform::storage::BestScoreStore;

/// Advance the game state by one frame.
///
/// `delta_time` is the elapsed time the loop measured for this frame; how much
/// of it feeds the physics depends on the tuning's [`crate::TimeStep`]. The only
/// side effect outside `state` is writing an improved best score to `store`.
pub fn tick<I, S>(state: &mut GameState, input: &I, delta_time: f64, store: &mut S)
where
    I: InputSource + ?Sized,
    S: BestScoreStore + ?Sized,
{
    let time_scale = state.tuning.time_step.scale(delta_time);
    state.frame += 1;

    // Paddle control
    steer_player(
        &mut state.player,
        input,
        state.tuning.player_acceleration * time_scale,
        state.tuning.player_deceleration * time_scale,
    );

    // Paddle move, then keep it off the walls
    state.player.x += state.player.velocity_x * time_scale;
    state.player.clamp_to(&state.arena);

    // Gravity
    state.ball.vel.y -= state.tuning.gravity * time_scale;

    // Ball move
    state.ball.pos += state.ball.vel * time_scale;

    // Paddle bounce
    if circles_touch(
        state.ball.pos,
        state.ball.size,
        state.player.pos(),
        state.player.size,
    ) {
        let vel = bounce_velocity(&state.ball, &state.player);
        let roll = Vec2::new(state.rng.random::<f32>(), state.rng.random::<f32>());
        state.ball.vel = apply_jitter(vel, roll, state.tuning.jitter_factor);
        state.ball.pos = separate_from_player(state.ball.pos, state.ball.size, &state.player);
        state.scoreboard.add_point();
        state.events.push(GameEvent::PaddleHit);
    }

    // Walls and ceiling
    for wall in confine_to_walls(&mut state.ball, &state.arena) {
        state.events.push(match wall {
            Wall::Left | Wall::Right => GameEvent::WallHit,
            Wall::Ceiling => GameEvent::CeilingHit,
        });
    }

    // Floor: end the run and serve again
    if ball_dropped(&state.ball, &state.arena) {
        let summary = state.scoreboard.commit_run(store);
        state.events.push(GameEvent::GameOver {
            score: summary.score,
        });
        if summary.new_best {
            state.events.push(GameEvent::NewBest {
                score: summary.score,
            });
        }
        log::info!(
            "Game over at frame {} with score {} (best {})",
            state.frame,
            summary.score,
            state.scoreboard.best()
        );
        state
            .ball
            .serve(&state.arena, state.tuning.initial_drop, &mut state.rng);
    }

    sanitize(state);
}

/// Accelerate toward the held direction, brake any direction that is not held
fn steer_player<I: InputSource + ?Sized>(
    player: &mut Player,
    input: &I,
    acceleration: f32,
    deceleration: f32,
) {
    let right = input.is_active(Signal::MoveRight);
    let left = input.is_active(Signal::MoveLeft);

    if right {
        player.velocity_x = (player.velocity_x + acceleration).min(player.max_speed);
        player.direction = Facing::Right;
    } else if player.velocity_x > 0.0 {
        player.velocity_x = (player.velocity_x - deceleration).max(0.0);
    }

    if left {
        player.velocity_x = (player.velocity_x - acceleration).max(-player.max_speed);
        player.direction = Facing::Left;
    } else if player.velocity_x < 0.0 {
        player.velocity_x = (player.velocity_x + deceleration).min(0.0);
    }
}

/// Replace anything non-finite so the next step starts from a sane state
fn sanitize(state: &mut GameState) {
    let player = &mut state.player;
    if !player.velocity_x.is_finite() {
        player.velocity_x = 0.0;
    }
    if !player.x.is_finite() {
        player.x = 0.0;
    }

    let ball = &mut state.ball;
    if !ball.vel.is_finite() {
        log::warn!("Non-finite ball velocity {:?}, stopping ball", ball.vel);
        ball.vel = Vec2::ZERO;
    }
    if !ball.pos.is_finite() {
        log::warn!("Non-finite ball position {:?}, serving again", ball.pos);
        ball.serve(&state.arena, state.tuning.initial_drop, &mut state.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SCORE_MODULUS;
    use crate::platform::input::InputState;
    use crate::platform::storage::{BestScore, MemoryStore};
    use crate::sim::state::Ball;
    use crate::tuning::{TimeStep, Tuning};

    const NO_INPUT: &[Signal] = &[];
    const DT: f64 = 16.0;

    fn store() -> BestScore<MemoryStore> {
        BestScore::new(MemoryStore::new())
    }

    /// Ball parked far from the paddle with no gravity, so only the paddle moves
    fn quiet_state() -> GameState {
        let tuning = Tuning {
            gravity: 0.0,
            ..Tuning::default()
        };
        let mut state = GameState::new(tuning, 1, 0);
        state.ball.pos = Vec2::new(0.0, 100.0);
        state.ball.vel = Vec2::ZERO;
        state
    }

    #[test]
    fn test_move_right_accelerates_to_max() {
        let mut state = quiet_state();
        let mut store = store();
        tick(&mut state, &[Signal::MoveRight][..], DT, &mut store);
        assert_eq!(state.player.velocity_x, state.tuning.player_acceleration);
        assert_eq!(state.player.direction, Facing::Right);

        for _ in 0..100 {
            tick(&mut state, &[Signal::MoveRight][..], DT, &mut store);
        }
        assert_eq!(state.player.velocity_x, state.player.max_speed);
    }

    #[test]
    fn test_release_decelerates_without_reversing() {
        let mut state = quiet_state();
        let mut store = store();
        state.player.velocity_x = 0.3;
        tick(&mut state, NO_INPUT, DT, &mut store);
        let after_one = state.player.velocity_x;
        assert!(after_one.abs() < 0.3);
        assert!(after_one >= 0.0);

        tick(&mut state, NO_INPUT, DT, &mut store);
        assert_eq!(state.player.velocity_x, 0.0);

        state.player.velocity_x = -2.0;
        tick(&mut state, NO_INPUT, DT, &mut store);
        assert!(state.player.velocity_x < 0.0);
        assert!(state.player.velocity_x > -2.0);
    }

    #[test]
    fn test_both_directions_cancel_out() {
        let mut state = quiet_state();
        let mut store = store();
        tick(
            &mut state,
            &[Signal::MoveLeft, Signal::MoveRight][..],
            DT,
            &mut store,
        );
        assert_eq!(state.player.velocity_x, 0.0);
        assert_eq!(state.player.direction, Facing::Left);
    }

    #[test]
    fn test_player_clamped_at_wall() {
        let mut state = quiet_state();
        let mut store = store();
        state.player.x = 128.5;
        state.player.velocity_x = 4.0;
        tick(&mut state, &[Signal::MoveRight][..], DT, &mut store);
        assert_eq!(state.player.x, 150.0 - 20.0 - 1.0);
    }

    #[test]
    fn test_gravity_per_frame_ignores_delta() {
        let mut a = quiet_state();
        let mut b = quiet_state();
        a.tuning.gravity = 0.01;
        b.tuning.gravity = 0.01;
        tick(&mut a, NO_INPUT, 16.0, &mut store());
        tick(&mut b, NO_INPUT, 500.0, &mut store());
        assert_eq!(a.ball.vel, b.ball.vel);
        assert_eq!(a.ball.pos, b.ball.pos);
    }

    #[test]
    fn test_scaled_time_step_scales_gravity_and_motion() {
        let mut state = quiet_state();
        state.tuning.gravity = 0.01;
        state.tuning.time_step = TimeStep::scaled();
        state.ball.vel = Vec2::new(1.0, 0.0);
        tick(&mut state, NO_INPUT, 14.0, &mut store());
        // time scale 2: gravity applied twice, then velocity moves twice as far
        assert!((state.ball.vel.y + 0.02).abs() < 1e-6);
        assert!((state.ball.pos.x - 2.0).abs() < 1e-5);
        assert!((state.ball.pos.y - (100.0 - 0.04)).abs() < 1e-4);
    }

    #[test]
    fn test_paddle_hit_scores_and_bounces() {
        let mut state = quiet_state();
        let mut store = store();
        state.ball.pos = Vec2::new(0.0, state.player.y + 36.0);
        state.ball.vel = Vec2::new(0.0, -3.0);
        tick(&mut state, NO_INPUT, DT, &mut store);

        assert_eq!(state.scoreboard.score(), 1);
        assert!(state.ball.vel.y > 0.0);
        let gap = state.ball.pos.distance(state.player.pos());
        assert!((gap - 35.0).abs() < 1e-3);
        assert_eq!(state.drain_events(), vec![GameEvent::PaddleHit]);
    }

    #[test]
    fn test_score_rolls_over() {
        let mut state = quiet_state();
        let mut store = store();
        for _ in 0..SCORE_MODULUS {
            state.ball.pos = state.player.pos() + Vec2::new(0.0, 30.0);
            state.ball.vel = Vec2::new(0.0, -1.0);
            tick(&mut state, NO_INPUT, DT, &mut store);
        }
        assert_eq!(state.scoreboard.score(), 0);
        assert_eq!(state.scoreboard.best(), 0);
    }

    #[test]
    fn test_left_wall_reflection() {
        let mut state = quiet_state();
        let mut store = store();
        state.ball.pos = Vec2::new(-133.0, 50.0);
        state.ball.vel = Vec2::new(-3.0, 0.0);
        tick(&mut state, NO_INPUT, DT, &mut store);
        assert!(state.ball.vel.x > 0.0);
        assert_eq!(state.ball.pos.x, -134.0);
        assert_eq!(state.drain_events(), vec![GameEvent::WallHit]);
    }

    #[test]
    fn test_floor_scenario_resets_run() {
        let tuning = Tuning {
            arena_size: 300.0,
            ball_size: 15.0,
            player_size: 20.0,
            gravity: 0.01,
            ..Tuning::default()
        };
        let mut state = GameState::new(tuning, 5, 0);
        let mut store = store();
        state.player.x = 100.0;
        state.ball.pos = Vec2::new(0.0, -150.0);
        state.ball.vel = Vec2::new(0.0, -2.0);
        for _ in 0..4 {
            state.scoreboard.add_point();
        }

        tick(&mut state, NO_INPUT, DT, &mut store);

        assert_eq!(state.scoreboard.score(), 0);
        assert_eq!(state.scoreboard.best(), 4);
        assert_eq!(store.load_best(), 4);
        assert_eq!(state.ball.pos.y, 0.0);
        assert_eq!(state.ball.vel, Vec2::new(0.0, state.tuning.initial_drop));
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::GameOver { score: 4 },
                GameEvent::NewBest { score: 4 }
            ]
        );
    }

    #[test]
    fn test_reset_below_best_keeps_best() {
        let mut state = GameState::new(Tuning::default(), 5, 50);
        let mut store = store();
        state.player.x = 100.0;
        state.ball.pos = Vec2::new(0.0, -149.0);
        state.ball.vel = Vec2::new(0.0, -5.0);
        state.scoreboard.add_point();
        tick(&mut state, NO_INPUT, DT, &mut store);
        assert_eq!(state.scoreboard.best(), 50);
        assert_eq!(store.load_best(), 0);
        assert_eq!(state.drain_events(), vec![GameEvent::GameOver { score: 1 }]);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = GameState::new(Tuning::default(), 99, 0);
        let mut b = GameState::new(Tuning::default(), 99, 0);
        let mut input = InputState::new();
        for i in 0..2_000 {
            if i % 300 == 0 {
                input.key_down("ArrowLeft");
            } else if i % 300 == 150 {
                input.key_up("ArrowLeft");
            }
            tick(&mut a, &input, DT, &mut store());
            tick(&mut b, &input, DT, &mut store());
        }
        assert_eq!(a.ball, b.ball);
        assert_eq!(a.player, b.player);
        assert_eq!(a.scoreboard, b.scoreboard);
    }

    #[test]
    fn test_non_finite_state_recovers() {
        let mut state = quiet_state();
        state.ball.vel = Vec2::new(f32::NAN, 1.0);
        tick(&mut state, NO_INPUT, DT, &mut store());
        assert!(state.ball.vel.is_finite());
        assert!(state.ball.pos.is_finite());
    }

    #[test]
    fn test_ball_size_respected_on_serve() {
        let mut state = quiet_state();
        state.ball = Ball::new(40.0);
        state.ball.pos = Vec2::new(0.0, -200.0);
        tick(&mut state, NO_INPUT, DT, &mut store());
        assert!(state.ball.pos.x.abs() <= 150.0 - 40.0 - 1.0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        fn signals(code: u8) -> Vec<Signal> {
            match code % 4 {
                0 => vec![],
                1 => vec![Signal::MoveLeft],
                2 => vec![Signal::MoveRight],
                _ => vec![Signal::MoveLeft, Signal::MoveRight],
            }
        }

        proptest! {
            #[test]
            fn prop_positions_stay_bounded(
                seed in any::<u64>(),
                scaled in any::<bool>(),
                frames in prop::collection::vec((0u8..4, 0.06f64..400.0), 1..400),
            ) {
                let tuning = Tuning {
                    time_step: if scaled { TimeStep::scaled() } else { TimeStep::PerFrame },
                    ..Tuning::default()
                };
                let mut state = GameState::new(tuning, seed, 0);
                let mut store = store();
                let half = state.arena.half();
                for (code, dt) in frames {
                    let held = signals(code);
                    tick(&mut state, held.as_slice(), dt, &mut store);

                    prop_assert!(state.player.x.abs() <= half - state.player.size);
                    prop_assert!(state.ball.pos.x.abs() <= half - state.ball.size + 1.0);
                    prop_assert!(state.ball.pos.y <= half - state.ball.size + 1.0);
                    prop_assert!(state.ball.pos.y >= -half);
                    prop_assert!(state.ball.vel.is_finite());
                }
            }

            #[test]
            fn prop_best_score_never_decreases(
                seed in any::<u64>(),
                frames in prop::collection::vec(0u8..4, 1..1500),
            ) {
                let mut state = GameState::new(Tuning::default(), seed, 0);
                let mut store = store();
                let mut best = state.scoreboard.best();
                for code in frames {
                    let score_before = state.scoreboard.score();
                    let held = signals(code);
                    tick(&mut state, held.as_slice(), DT, &mut store);

                    prop_assert!(state.scoreboard.best() >= best);
                    for event in state.drain_events() {
                        if let GameEvent::NewBest { score } = event {
                            prop_assert!(score > best);
                            prop_assert_eq!(score, state.scoreboard.best());
                            prop_assert!(score == score_before || score == score_before + 1);
                        }
                    }
                    best = state.scoreboard.best();
                }
                prop_assert_eq!(store.load_best(), best);
            }
        }
    }
}
