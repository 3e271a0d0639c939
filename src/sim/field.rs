//! Brick wall generation
//!
//! The wall is a fixed-column grid centered horizontally that fills the play
//! height with as many whole rows as fit. No randomness: the same settings
//! always give the same wall.

use glam::Vec2;

use super::geom::Rect;
use super::state::Brick;

/// Whole rows of `brick_height` that fit between a `gap` top margin and a
/// `gap` bottom margin
pub fn row_count(play_height: f32, brick_height: f32, gap: f32) -> u32 {
    let pitch = brick_height + gap;
    if pitch <= 0.0 {
        return 0;
    }
    ((play_height - gap) / pitch).floor().max(0.0) as u32
}

/// Generate the brick wall for a fresh match
pub fn generate_bricks(
    play_width: f32,
    play_height: f32,
    columns: u32,
    brick_size: Vec2,
    gap: f32,
) -> Vec<Brick> {
    let rows = row_count(play_height, brick_size.y, gap);

    let total_width = columns as f32 * (brick_size.x + gap) - gap;
    let start_x = play_width / 2.0 - total_width / 2.0;

    let capacity = (rows as usize).saturating_mul(columns as usize);
    let mut bricks = Vec::with_capacity(capacity);
    for row in 0..rows {
        let y = gap + row as f32 * (brick_size.y + gap);
        for col in 0..columns {
            let x = start_x + col as f32 * (brick_size.x + gap);
            bricks.push(Brick {
                id: bricks.len() as u32,
                row,
                col,
                rect: Rect::new(x, y, brick_size.x, brick_size.y),
                alive: true,
            });
        }
    }

    log::info!("Created {} bricks in {} rows", bricks.len(), rows);
    bricks
}
