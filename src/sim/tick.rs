//! Frame simulation
//!
//! `step` is the physics stepper: it advances every ball through a fixed
//! number of sub-steps and resolves walls, paddles, bricks and goal lines in
//! that order. `tick` wraps it with the match state machine and the bot.

use glam::Vec2;
use rand::Rng;

use super::bot;
use super::collision::{brick_impact, contain_vertical, goal_side, paddle_bounce, wall_bounce};
use super::state::{
    Ball, Brick, EntityIds, GameEvent, GamePhase, GameState, Paddle, Serve, Side,
};
use crate::settings::Settings;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer y for the player paddle (raw, clamped by the core)
    pub player_target: Option<f32>,
    /// Start command (also restarts after game over)
    pub start: bool,
    /// Back to the idle layout
    pub reset: bool,
    /// Demo mode: the player paddle is driven by the pursuit AI
    pub autoplay: bool,
}

/// Result of one physics step
#[derive(Debug, Clone, Default)]
pub struct StepOutcome {
    /// Everything that happened, in simulation order
    pub events: Vec<GameEvent>,
    /// Set when a ball crossed its opponent's goal line
    pub winner: Option<Side>,
}

/// Advance all balls by `dt` seconds
///
/// Brick deaths are written straight into `bricks` (a dead brick is never
/// tested again). A score ends the step immediately; remaining balls and
/// sub-steps are not simulated. Zero, negative or non-finite `dt` does
/// nothing.
pub fn step<R: Rng + ?Sized>(
    balls: &mut [Ball],
    paddles: &mut [Paddle],
    bricks: &mut [Brick],
    settings: &Settings,
    ids: &mut EntityIds,
    rng: &mut R,
    dt: f32,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();
    if !(dt.is_finite() && dt > 0.0) {
        return outcome;
    }

    let sub_dt = dt / settings.substeps as f32;

    for _ in 0..settings.substeps {
        for ball in balls.iter_mut() {
            let prev_pos = ball.pos;
            ball.pos += ball.vel * sub_dt;

            wall_bounce(ball, settings.play_height);

            // --- Paddles ---
            for paddle in paddles.iter() {
                let hit = paddle_bounce(
                    ball,
                    prev_pos,
                    paddle,
                    settings.bounce_angle_max,
                    settings.ball_speed,
                );
                if hit {
                    log::debug!("Ball {} bounced off {:?} paddle", ball.id, paddle.side);
                    outcome.events.push(GameEvent::PaddleHit {
                        side: paddle.side,
                        ball: ball.id,
                    });
                    break;
                }
            }

            // --- Bricks: first alive overlap in wall order ---
            let ball_rect = ball.rect();
            if let Some(brick) = bricks
                .iter_mut()
                .find(|b| b.alive && ball_rect.overlaps(&b.rect))
            {
                let axis = brick_impact(ball, prev_pos, &brick.rect);
                contain_vertical(ball, settings.play_height);
                brick.alive = false;
                log::debug!("Brick {} hit by ball {} on {:?}", brick.id, ball.id, axis);
                outcome.events.push(GameEvent::BrickDestroyed {
                    brick: brick.id,
                    ball: ball.id,
                });
            }

            // --- Goal lines ---
            let Some(side) = goal_side(ball, settings) else {
                continue;
            };
            if side == ball.owner {
                self_miss(ball, side, paddles, settings, ids, rng, &mut outcome.events);
            } else {
                log::info!("{:?} scored with ball {}", ball.owner, ball.id);
                ball.vel = Vec2::ZERO;
                outcome.winner = Some(ball.owner);
                outcome.events.push(GameEvent::Goal { scorer: ball.owner });
                return outcome;
            }
        }
    }

    outcome
}

/// Penalise `side` for letting its own ball through and serve a new one
fn self_miss<R: Rng + ?Sized>(
    ball: &mut Ball,
    side: Side,
    paddles: &mut [Paddle],
    settings: &Settings,
    ids: &mut EntityIds,
    rng: &mut R,
    events: &mut Vec<GameEvent>,
) {
    if let Some(paddle) = paddles.iter_mut().find(|p| p.side == side) {
        let shrunk = paddle.record_miss(settings);
        log::info!("{:?} missed their own ball ({} misses)", side, paddle.misses);
        events.push(GameEvent::SelfMiss {
            side,
            misses: paddle.misses,
        });
        if let Some(height) = shrunk {
            log::info!("{:?} paddle height reduced to {}", side, height);
            events.push(GameEvent::PaddleShrunk { side, height });
        }
    }

    let serve = Serve::random(rng);
    *ball = serve.ball(ids.next_id(), settings);
    events.push(GameEvent::BallServed {
        ball: ball.id,
        owner: serve.owner,
    });
}

/// Advance the match by one frame
///
/// Commands are applied first. While playing, `dt` is capped at
/// `max_frame_dt`, the player paddle follows the input, the stepper runs and
/// the bot chases the ball it fears most.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    if input.reset {
        state.reset();
    }
    if input.start {
        state.start();
    }

    if state.phase != GamePhase::Playing || !(dt.is_finite() && dt > 0.0) {
        return Vec::new();
    }
    let dt = dt.min(state.settings.max_frame_dt);

    if let Some(y) = input.player_target.filter(|_| !input.autoplay) {
        state.set_player_target(y);
    }

    let outcome = step(
        &mut state.balls,
        &mut state.paddles,
        &mut state.bricks,
        &state.settings,
        &mut state.ids,
        &mut state.rng,
        dt,
    );
    state.time_ticks += 1;

    if let Some(winner) = outcome.winner {
        log::info!("Match over after {} ticks, winner: {:?}", state.time_ticks, winner);
        state.phase = GamePhase::GameOver;
        state.winner = Some(winner);
        return outcome.events;
    }

    let settings = &state.settings;
    if settings.bot_enabled {
        bot::drive(
            &mut state.paddles,
            &state.balls,
            Side::Bot,
            settings.bot_speed,
            dt,
            settings.play_height,
        );
    }
    if input.autoplay {
        bot::drive(
            &mut state.paddles,
            &state.balls,
            Side::Player,
            settings.bot_speed,
            dt,
            settings.play_height,
        );
    }

    outcome.events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Variant;
    use crate::sim::geom::Rect;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    fn playing(settings: Settings, seed: u64) -> GameState {
        let mut state = GameState::new(settings, seed).expect("valid settings");
        state.start();
        state
    }

    fn test_ball(id: u32, owner: Side, pos: Vec2, vel: Vec2) -> Ball {
        Ball {
            id,
            owner,
            pos,
            vel,
            radius: 8.0,
            color: owner.color(),
        }
    }

    /// Tick until an event matching `pred` shows up
    fn tick_until(
        state: &mut GameState,
        dt: f32,
        max_ticks: usize,
        pred: impl Fn(&GameEvent) -> bool,
    ) -> Vec<GameEvent> {
        let input = TickInput::default();
        for _ in 0..max_ticks {
            let events = tick(state, &input, dt);
            if events.iter().any(&pred) {
                return events;
            }
        }
        panic!("event not seen within {max_ticks} ticks");
    }

    #[test]
    fn test_idle_does_not_step() {
        let mut state = GameState::new(Settings::default(), 1).expect("valid settings");
        let balls = state.balls.clone();
        let events = tick(&mut state, &TickInput::default(), 1.0 / 60.0);
        assert!(events.is_empty());
        assert_eq!(balls, state.balls);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_start_and_reset_commands() {
        let mut state = GameState::new(Settings::default(), 1).expect("valid settings");
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, 1.0 / 60.0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.time_ticks, 1);

        let reset = TickInput {
            reset: true,
            ..Default::default()
        };
        tick(&mut state, &reset, 1.0 / 60.0);
        assert_eq!(state.phase, GamePhase::Idle);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_stalled_clock_does_nothing() {
        let mut state = playing(Settings::default(), 2);
        let balls = state.balls.clone();
        for dt in [0.0, -0.5, f32::NAN] {
            assert!(tick(&mut state, &TickInput::default(), dt).is_empty());
        }
        assert_eq!(balls, state.balls);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_step_ignores_non_positive_dt() {
        let mut state = playing(Settings::default(), 2);
        let before = state.balls.clone();
        let outcome = step(
            &mut state.balls,
            &mut state.paddles,
            &mut state.bricks,
            &state.settings,
            &mut state.ids,
            &mut state.rng,
            0.0,
        );
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.winner, None);
        assert_eq!(before, state.balls);
    }

    #[test]
    fn test_frame_dt_is_capped() {
        let mut state = playing(Settings::default(), 3);
        state.bricks.clear();
        state.balls[0] = test_ball(0, Side::Player, Vec2::new(400.0, 300.0), Vec2::new(350.0, 0.0));
        tick(&mut state, &TickInput::default(), 5.0);
        let moved = state.balls[0].pos.x - 400.0;
        assert!((moved - 350.0 / 30.0).abs() < 1e-3);
    }

    #[test]
    fn test_player_scores_with_bot_disabled() {
        let settings = Settings {
            bot_enabled: false,
            max_frame_dt: 1.0,
            ..Default::default()
        };
        let mut state = playing(settings, 4);
        state.bricks.clear();
        assert_eq!(state.paddle(Side::Player).map(|p| p.y), Some(250.0));
        state.balls[0] = test_ball(0, Side::Player, Vec2::new(400.0, 300.0), Vec2::new(200.0, 0.0));

        // 1s frames, 4 sub-steps of 50px: reaches 600, then 800
        let events = tick(&mut state, &TickInput::default(), 1.0);
        assert!(events.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);

        let events = tick(&mut state, &TickInput::default(), 1.0);
        assert_eq!(events, vec![GameEvent::Goal { scorer: Side::Player }]);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.winner, Some(Side::Player));
        assert_eq!(state.balls[0].vel, Vec2::ZERO);

        // Game over freezes the simulation
        let frozen = state.balls.clone();
        assert!(tick(&mut state, &TickInput::default(), 1.0).is_empty());
        assert_eq!(frozen, state.balls);
    }

    #[test]
    fn test_score_stops_remaining_balls_and_substeps() {
        let settings = Settings::default();
        let mut balls = vec![
            // Fully past the right line after the first 350/240 px sub-step
            test_ball(0, Side::Player, Vec2::new(797.0, 300.0), Vec2::new(350.0, 0.0)),
            test_ball(1, Side::Bot, Vec2::new(400.0, 300.0), Vec2::new(-300.0, 0.0)),
        ];
        let mut ids = EntityIds::default();
        let mut rng = Pcg32::seed_from_u64(0);

        let outcome = step(
            &mut balls,
            &mut [],
            &mut [],
            &settings,
            &mut ids,
            &mut rng,
            1.0 / 60.0,
        );

        assert_eq!(outcome.winner, Some(Side::Player));
        assert_eq!(
            outcome.events,
            vec![GameEvent::Goal {
                scorer: Side::Player
            }]
        );
        // Scoring ball moved one sub-step only
        assert!((balls[0].pos.x - (797.0 + 350.0 / 240.0)).abs() < 1e-3);
        assert_eq!(balls[0].vel, Vec2::ZERO);
        // Later ball never advanced
        assert_eq!(balls[1].pos, Vec2::new(400.0, 300.0));
        assert_eq!(balls[1].vel, Vec2::new(-300.0, 0.0));
    }

    #[test]
    fn test_bot_ball_past_player_ends_match() {
        let mut state = playing(Settings::default(), 5);
        state.bricks.clear();
        // Above the player paddle (250..350) so nothing blocks it
        state.balls[0] = test_ball(0, Side::Bot, Vec2::new(30.0, 60.0), Vec2::new(-350.0, 0.0));

        let events = tick_until(&mut state, 1.0 / 60.0, 30, |e| {
            matches!(e, GameEvent::Goal { .. })
        });
        assert!(events.contains(&GameEvent::Goal { scorer: Side::Bot }));
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.winner, Some(Side::Bot));
        assert_eq!(state.paddle(Side::Player).map(|p| p.misses), Some(0));
    }

    #[test]
    fn test_self_miss_respawns_and_keeps_playing() {
        let mut state = playing(Settings::default(), 6);
        state.bricks.clear();
        state.balls[0] = test_ball(0, Side::Player, Vec2::new(30.0, 60.0), Vec2::new(-350.0, 0.0));

        // Respawn is the only RNG draw, so replaying the RNG predicts it
        let mut replay = state.rng.clone();
        let expected = Serve::random(&mut replay);

        let events = tick_until(&mut state, 1.0 / 60.0, 30, |e| {
            matches!(e, GameEvent::SelfMiss { .. })
        });
        assert!(events.contains(&GameEvent::SelfMiss {
            side: Side::Player,
            misses: 1
        }));
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.winner, None);
        assert_eq!(state.paddle(Side::Player).map(|p| p.misses), Some(1));

        // Exactly one ball, and it is a new one
        assert_eq!(state.balls.len(), 1);
        let ball = &state.balls[0];
        assert_ne!(ball.id, 0);
        assert!(events.contains(&GameEvent::BallServed {
            ball: ball.id,
            owner: expected.owner
        }));
        assert_eq!(ball.owner, expected.owner);
        assert!((ball.vel - expected.velocity(350.0)).length() < 1e-3);
    }

    #[test]
    fn test_paddle_shrinks_every_third_self_miss() {
        let mut state = playing(Settings::default(), 7);
        state.bricks.clear();

        let mut heights = Vec::new();
        for _ in 0..6 {
            state.balls[0] = test_ball(99, Side::Bot, Vec2::new(795.0, 60.0), Vec2::new(350.0, 0.0));
            let events = tick(&mut state, &TickInput::default(), 1.0 / 60.0);
            assert!(events.iter().any(|e| matches!(e, GameEvent::SelfMiss { side: Side::Bot, .. })));
            heights.push(state.paddle(Side::Bot).map(|p| p.height).unwrap_or_default());
        }

        assert_eq!(heights[0], 100.0);
        assert_eq!(heights[1], 100.0);
        assert!((heights[2] - 90.0).abs() < 1e-4);
        assert!((heights[3] - 90.0).abs() < 1e-4);
        assert!((heights[4] - 90.0).abs() < 1e-4);
        assert!((heights[5] - 81.0).abs() < 1e-3);
        assert_eq!(state.paddle(Side::Player).map(|p| p.height), Some(100.0));
    }

    #[test]
    fn test_self_miss_event_reports_shrink() {
        let mut state = playing(Settings::default(), 8);
        state.bricks.clear();
        if let Some(paddle) = state.paddle_mut(Side::Player) {
            paddle.misses = 2;
        }
        state.balls[0] = test_ball(5, Side::Player, Vec2::new(3.0, 60.0), Vec2::new(-350.0, 0.0));
        let events = tick(&mut state, &TickInput::default(), 1.0 / 60.0);
        assert!(events.contains(&GameEvent::SelfMiss {
            side: Side::Player,
            misses: 3
        }));
        let shrunk = events.iter().find_map(|e| match e {
            GameEvent::PaddleShrunk { side, height } => Some((*side, *height)),
            _ => None,
        });
        let (side, height) = shrunk.expect("paddle shrank");
        assert_eq!(side, Side::Player);
        assert!((height - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_brick_hit_by_one_ball_per_substep() {
        let settings = Settings::default();
        let mut bricks = vec![Brick {
            id: 0,
            row: 0,
            col: 0,
            rect: Rect::new(400.0, 100.0, 30.0, 20.0),
            alive: true,
        }];
        let mut balls = vec![
            test_ball(0, Side::Player, Vec2::new(390.0, 110.0), Vec2::new(300.0, 0.0)),
            test_ball(1, Side::Player, Vec2::new(390.0, 110.0), Vec2::new(300.0, 0.0)),
        ];
        let mut ids = EntityIds::default();
        let mut rng = Pcg32::seed_from_u64(0);

        // Four sub-steps of 4px
        let outcome = step(
            &mut balls,
            &mut [],
            &mut bricks,
            &settings,
            &mut ids,
            &mut rng,
            16.0 / 300.0,
        );

        assert_eq!(
            outcome.events,
            vec![GameEvent::BrickDestroyed { brick: 0, ball: 0 }]
        );
        assert!(!bricks[0].alive);
        assert_eq!(balls[0].vel, Vec2::new(-300.0, 0.0));
        assert_eq!(balls[1].vel, Vec2::new(300.0, 0.0));
        assert!(balls[0].pos.x < 392.0);
        assert!((balls[1].pos.x - 406.0).abs() < 1e-3);
    }

    #[test]
    fn test_paddle_hit_event() {
        let mut state = playing(Settings::default(), 9);
        state.bricks.clear();
        state.balls[0] = test_ball(0, Side::Player, Vec2::new(40.0, 300.0), Vec2::new(-350.0, 0.0));
        let events = tick_until(&mut state, 1.0 / 60.0, 10, |e| {
            matches!(e, GameEvent::PaddleHit { .. })
        });
        assert!(events.contains(&GameEvent::PaddleHit {
            side: Side::Player,
            ball: 0
        }));
        assert!(state.balls[0].vel.x > 0.0);
        assert!((state.balls[0].speed() - 350.0).abs() < 1e-2);
    }

    #[test]
    fn test_bricks_destroyed_once_and_monotonic() {
        let mut state = playing(Settings::from_variant(Variant::TwinServe), 10);
        let total = state.bricks.len();
        let input = TickInput {
            autoplay: true,
            ..Default::default()
        };

        let mut destroyed = HashSet::new();
        let mut alive = state.alive_bricks();
        for _ in 0..3000 {
            for event in tick(&mut state, &input, 1.0 / 60.0) {
                if let GameEvent::BrickDestroyed { brick, .. } = event {
                    assert!(destroyed.insert(brick), "brick {brick} destroyed twice");
                }
            }
            let now = state.alive_bricks();
            assert!(now <= alive);
            alive = now;
            if state.phase == GamePhase::GameOver {
                break;
            }
        }

        assert!(!destroyed.is_empty());
        assert_eq!(alive, total - destroyed.len());

        state.reset();
        assert_eq!(state.alive_bricks(), total);
    }

    #[test]
    fn test_bot_tracks_current_ball() {
        let mut state = playing(Settings::default(), 11);
        state.bricks.clear();
        state.balls[0] = test_ball(0, Side::Player, Vec2::new(400.0, 100.0), Vec2::new(300.0, 0.0));
        tick(&mut state, &TickInput::default(), 1.0 / 30.0);
        let bot = state.paddle(Side::Bot).map(|p| p.y).unwrap_or_default();
        // 280 px/s for 1/30s toward y=100
        assert!((bot - (250.0 - 280.0 / 30.0)).abs() < 1e-3);
    }

    #[test]
    fn test_player_input_applied_before_step() {
        let mut state = playing(Settings::default(), 12);
        let input = TickInput {
            player_target: Some(120.0),
            ..Default::default()
        };
        tick(&mut state, &input, 1.0 / 60.0);
        assert_eq!(state.paddle(Side::Player).map(|p| p.y), Some(70.0));
    }

    #[test]
    fn test_determinism() {
        let mut state1 = playing(Settings::from_variant(Variant::TwinServe), 99999);
        let mut state2 = playing(Settings::from_variant(Variant::TwinServe), 99999);
        let input = TickInput {
            autoplay: true,
            ..Default::default()
        };

        for _ in 0..600 {
            let e1 = tick(&mut state1, &input, 1.0 / 60.0);
            let e2 = tick(&mut state2, &input, 1.0 / 60.0);
            assert_eq!(e1, e2);
        }

        assert_eq!(state1.balls, state2.balls);
        assert_eq!(state1.bricks, state2.bricks);
        assert_eq!(state1.paddles, state2.paddles);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Balls never leave the vertical play area
        #[test]
        fn prop_balls_stay_between_walls(seed in any::<u64>(), twin in any::<bool>()) {
            let variant = if twin { Variant::TwinServe } else { Variant::Classic };
            let mut state = playing(Settings::from_variant(variant), seed);
            let input = TickInput {
                autoplay: true,
                ..Default::default()
            };
            let height = state.settings.play_height;

            for _ in 0..400 {
                tick(&mut state, &input, 1.0 / 60.0);
                for ball in &state.balls {
                    prop_assert!(ball.pos.y.is_finite() && ball.pos.x.is_finite());
                    prop_assert!(ball.pos.y >= ball.radius - 1e-3);
                    prop_assert!(ball.pos.y <= height - ball.radius + 1e-3);
                }
                for paddle in &state.paddles {
                    prop_assert!(paddle.y >= 0.0 && paddle.y <= height - paddle.height);
                    prop_assert!(paddle.height >= state.settings.min_paddle_height);
                }
                if state.phase == GamePhase::GameOver {
                    break;
                }
            }
        }
    }
}
