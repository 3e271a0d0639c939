//! Pongout - Pong with a Breakout wall in the middle
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, bot, match state)
//! - `settings`: Data-driven game tuning and presets

pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError, Variant};
pub use sim::{GameEvent, GamePhase, GameState, Side, TickInput, tick};

/// Game configuration constants (defaults for [`Settings`])
pub mod consts {
    /// Play area dimensions
    pub const PLAY_WIDTH: f32 = 800.0;
    pub const PLAY_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 15.0;
    pub const PADDLE_HEIGHT: f32 = 100.0;
    pub const MIN_PADDLE_HEIGHT: f32 = 20.0;
    /// Distance from paddle back to the side wall (also the goal line)
    pub const PADDLE_OFFSET: f32 = 10.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Serve speed, pixels per second
    pub const BALL_SPEED: f32 = 350.0;

    /// Brick wall
    pub const BRICK_COLUMNS: u32 = 5;
    pub const BRICK_WIDTH: f32 = 30.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_GAP: f32 = 4.0;
    /// Upper bound on bricks per wall
    pub const MAX_BRICKS: u64 = 10_000;
    /// How far a ball is pushed outside a brick face after an impact
    pub const BRICK_NUDGE: f32 = 0.1;

    /// Own-ball misses before the paddle shrinks
    pub const MISS_THRESHOLD: u32 = 3;
    /// Paddle height lost per shrink (fraction)
    pub const SHRINK_FRACTION: f32 = 0.10;

    /// Max speed of the bot paddle (pixels per second)
    pub const BOT_PADDLE_SPEED: f32 = 280.0;

    /// Maximum paddle deflection (60 degrees)
    pub const BOUNCE_ANGLE_MAX: f32 = std::f32::consts::FRAC_PI_3;
    /// Serve spread either side of horizontal (45 degrees)
    pub const SERVE_ANGLE_MAX: f32 = std::f32::consts::FRAC_PI_4;

    /// Collision sub-steps per frame
    pub const SUBSTEPS: u32 = 4;
    /// Frame dt cap, bounds per-substep displacement after a stall
    pub const MAX_FRAME_DT: f32 = 1.0 / 30.0;
}
