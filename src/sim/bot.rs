//! Pursuit AI for an automated paddle
//!
//! The bot follows one ball at a bounded speed. It reads the ball positions
//! produced by the current frame's step, never an earlier copy.

use super::state::{Ball, Paddle, Side};

/// Pick the ball a paddle on `chaser`'s side should follow
///
/// Prefers the first ball owned by the opponent (that ball scores if it gets
/// past), falling back to the first ball in play.
pub fn choose_target(balls: &[Ball], chaser: Side) -> Option<&Ball> {
    let threat = chaser.opponent();
    balls
        .iter()
        .find(|b| b.owner == threat)
        .or_else(|| balls.first())
}

/// New top edge for `paddle` after one frame of pursuit toward `target`
pub fn advance(paddle: &Paddle, target: &Ball, max_speed: f32, dt: f32, play_height: f32) -> f32 {
    let mut moved = paddle.clone();
    moved.move_toward(target.pos.y, dt, max_speed, play_height);
    moved.y
}

/// Run one frame of pursuit for the paddle on `side`
///
/// Missing paddle or no balls: nothing happens.
pub fn drive(
    paddles: &mut [Paddle],
    balls: &[Ball],
    side: Side,
    max_speed: f32,
    dt: f32,
    play_height: f32,
) {
    let Some(paddle) = paddles.iter_mut().find(|p| p.side == side) else {
        return;
    };
    let Some(target) = choose_target(balls, side) else {
        return;
    };
    paddle.y = advance(paddle, target, max_speed, dt, play_height);
}
