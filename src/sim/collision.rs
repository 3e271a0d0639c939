//! Collision detection and response
//!
//! Each check works on one ball against one surface and mutates the ball in
//! place. Callers run them in a fixed order every sub-step: walls, paddles,
//! bricks, goal lines.

use glam::Vec2;

use super::geom::{Axis, Rect, face_penetration, impact_axis};
use super::state::{Ball, Paddle, Side};
use crate::consts::BRICK_NUDGE;
use crate::settings::Settings;

/// Bounce off the top or bottom wall
///
/// Perfectly elastic: the ball is clamped inside and the vertical component
/// is pointed back into the court.
pub fn wall_bounce(ball: &mut Ball, play_height: f32) -> bool {
    if ball.pos.y - ball.radius < 0.0 {
        ball.pos.y = ball.radius;
        ball.vel.y = ball.vel.y.abs();
        true
    } else if ball.pos.y + ball.radius > play_height {
        ball.pos.y = play_height - ball.radius;
        ball.vel.y = -ball.vel.y.abs();
        true
    } else {
        false
    }
}

/// Keep the ball center within `[radius, play_height - radius]`
#[inline]
pub fn contain_vertical(ball: &mut Ball, play_height: f32) {
    ball.pos.y = ball.pos.y.clamp(ball.radius, play_height - ball.radius);
}

/// Outgoing velocity for a paddle hit
///
/// `hit_offset` is where the ball struck relative to the paddle center,
/// normalized so the paddle ends are ±1. The result has magnitude `speed` and
/// points away from `side`'s goal.
pub fn bounce_velocity(hit_offset: f32, speed: f32, side: Side, max_angle: f32) -> Vec2 {
    let angle = hit_offset.clamp(-1.0, 1.0) * max_angle;
    Vec2::new(side.serve_direction() * angle.cos(), angle.sin()) * speed
}

/// Bounce off a paddle
///
/// Only accepted if the ball overlaps the paddle, is moving toward the court
/// face, and its leading edge was outside that face before this sub-step.
/// A ball already inside the paddle passes through rather than rattling.
pub fn paddle_bounce(
    ball: &mut Ball,
    prev_pos: Vec2,
    paddle: &Paddle,
    max_angle: f32,
    fallback_speed: f32,
) -> bool {
    if !ball.rect().overlaps(&paddle.rect()) {
        return false;
    }

    let edge = paddle.edge_x();
    let approaching = match paddle.side {
        Side::Player => ball.vel.x < 0.0 && prev_pos.x - ball.radius >= edge,
        Side::Bot => ball.vel.x > 0.0 && prev_pos.x + ball.radius <= edge,
    };
    if !approaching {
        return false;
    }

    ball.pos.x = match paddle.side {
        Side::Player => edge + ball.radius,
        Side::Bot => edge - ball.radius,
    };

    let speed = ball.speed();
    let speed = if speed > f32::EPSILON {
        speed
    } else {
        fallback_speed
    };
    let hit_offset = (ball.pos.y - paddle.center_y()) / (paddle.height / 2.0);
    ball.vel = bounce_velocity(hit_offset, speed, paddle.side, max_angle);
    true
}

/// Bounce off a brick the ball now overlaps
///
/// The struck face is found from the ball's pre-step bounds. Only that axis
/// is reflected, and the ball is pushed just outside the face it came
/// through.
pub fn brick_impact(ball: &mut Ball, prev_pos: Vec2, brick: &Rect) -> Axis {
    let prev = Rect::around_circle(prev_pos, ball.radius);
    let axis = impact_axis(face_penetration(&prev, brick), ball.vel);

    match axis {
        Axis::X => {
            ball.vel.x = -ball.vel.x;
            ball.pos.x = if ball.vel.x < 0.0 {
                brick.left() - ball.radius - BRICK_NUDGE
            } else {
                brick.right() + ball.radius + BRICK_NUDGE
            };
        }
        Axis::Y => {
            ball.vel.y = -ball.vel.y;
            ball.pos.y = if ball.vel.y < 0.0 {
                brick.top() - ball.radius - BRICK_NUDGE
            } else {
                brick.bottom() + ball.radius + BRICK_NUDGE
            };
        }
    }
    axis
}

/// Which goal line the ball has fully crossed, if any
pub fn goal_side(ball: &Ball, settings: &Settings) -> Option<Side> {
    if ball.pos.x + ball.radius < settings.player_goal_x() {
        Some(Side::Player)
    } else if ball.pos.x - ball.radius > settings.bot_goal_x() {
        Some(Side::Bot)
    } else {
        None
    }
}
