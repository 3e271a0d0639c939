//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame time, split into fixed sub-steps
//! - Seeded RNG only
//! - Stable iteration order (balls and bricks by index)
//! - No rendering or platform dependencies

pub mod bot;
pub mod collision;
pub mod field;
pub mod geom;
pub mod state;
pub mod tick;

pub use field::generate_bricks;
pub use geom::{Axis, Rect};
pub use state::{
    Ball, Brick, EntityIds, GameEvent, GamePhase, GameState, Paddle, Serve, Side, Snapshot,
};
pub use tick::{StepOutcome, TickInput, step, tick};
