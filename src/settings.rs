//! Game tuning
//!
//! Every constant that differed between the single-ball and two-ball builds
//! lives here, so there is one simulation core with many configurations.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::field::row_count;

/// Errors raised while building or loading [`Settings`]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{name} must be positive and finite, got {value}")]
    InvalidDimension { name: &'static str, value: f32 },
    #[error("{name} must be at least 1")]
    InvalidCount { name: &'static str },
    #[error("{name} out of range: {value}")]
    OutOfRange { name: &'static str, value: f32 },
    #[error("brick wall is {width} wide, only {available} fits between the paddles")]
    WallTooWide { width: f32, available: f32 },
    #[error("brick wall has {bricks} bricks, limit is {max}")]
    WallTooLarge { bricks: u64, max: u64 },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Built-in game variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// One ball, random first owner
    #[default]
    Classic,
    /// Two balls served symmetrically, one owned by each side
    TwinServe,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::TwinServe => "TwinServe",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" | "single" => Some(Variant::Classic),
            "twinserve" | "twin" | "double" => Some(Variant::TwinServe),
            _ => None,
        }
    }

    /// Balls in play for this variant
    pub fn ball_count(&self) -> u32 {
        match self {
            Variant::Classic => 1,
            Variant::TwinServe => 2,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Play area ===
    pub play_width: f32,
    pub play_height: f32,

    // === Paddles ===
    pub paddle_width: f32,
    /// Starting paddle height
    pub paddle_height: f32,
    /// Paddles never shrink below this
    pub min_paddle_height: f32,
    /// Gap between a paddle's back and its wall; also the goal line
    pub paddle_offset: f32,

    // === Balls ===
    pub ball_radius: f32,
    /// Serve speed (pixels per second)
    pub ball_speed: f32,
    pub ball_count: u32,

    // === Brick wall ===
    pub brick_columns: u32,
    pub brick_width: f32,
    pub brick_height: f32,
    pub brick_gap: f32,

    // === Penalties ===
    /// Self-misses per shrink
    pub miss_threshold: u32,
    /// Fraction of height lost per shrink
    pub shrink_fraction: f32,

    // === Bot ===
    /// With the bot disabled there is no right paddle at all
    pub bot_enabled: bool,
    pub bot_speed: f32,

    // === Physics ===
    /// Max deflection off a paddle edge (radians)
    pub bounce_angle_max: f32,
    pub substeps: u32,
    /// Frame dt cap (seconds)
    pub max_frame_dt: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            play_width: PLAY_WIDTH,
            play_height: PLAY_HEIGHT,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            min_paddle_height: MIN_PADDLE_HEIGHT,
            paddle_offset: PADDLE_OFFSET,

            ball_radius: BALL_RADIUS,
            ball_speed: BALL_SPEED,
            ball_count: Variant::Classic.ball_count(),

            brick_columns: BRICK_COLUMNS,
            brick_width: BRICK_WIDTH,
            brick_height: BRICK_HEIGHT,
            brick_gap: BRICK_GAP,

            miss_threshold: MISS_THRESHOLD,
            shrink_fraction: SHRINK_FRACTION,

            bot_enabled: true,
            bot_speed: BOT_PADDLE_SPEED,

            bounce_angle_max: BOUNCE_ANGLE_MAX,
            substeps: SUBSTEPS,
            max_frame_dt: MAX_FRAME_DT,
        }
    }
}

impl Settings {
    /// Create settings from a variant (applies variant defaults)
    pub fn from_variant(variant: Variant) -> Self {
        let mut settings = Self::default();
        settings.apply_variant(variant);
        settings
    }

    /// Apply a variant (updates variant-dependent settings)
    pub fn apply_variant(&mut self, variant: Variant) {
        self.ball_count = variant.ball_count();
    }

    /// Parse settings from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), SettingsError> {
        let dimensions = [
            ("play_width", self.play_width),
            ("play_height", self.play_height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("min_paddle_height", self.min_paddle_height),
            ("ball_radius", self.ball_radius),
            ("ball_speed", self.ball_speed),
            ("brick_width", self.brick_width),
            ("brick_height", self.brick_height),
            ("bot_speed", self.bot_speed),
            ("bounce_angle_max", self.bounce_angle_max),
            ("max_frame_dt", self.max_frame_dt),
        ];
        for (name, value) in dimensions {
            if !(value.is_finite() && value > 0.0) {
                return Err(SettingsError::InvalidDimension { name, value });
            }
        }

        // Offsets and gaps may be zero
        for (name, value) in [
            ("paddle_offset", self.paddle_offset),
            ("brick_gap", self.brick_gap),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SettingsError::OutOfRange { name, value });
            }
        }

        for (name, value) in [
            ("ball_count", self.ball_count),
            ("brick_columns", self.brick_columns),
            ("miss_threshold", self.miss_threshold),
            ("substeps", self.substeps),
        ] {
            if value == 0 {
                return Err(SettingsError::InvalidCount { name });
            }
        }

        if !(0.0..1.0).contains(&self.shrink_fraction) {
            return Err(SettingsError::OutOfRange {
                name: "shrink_fraction",
                value: self.shrink_fraction,
            });
        }
        if self.bounce_angle_max >= std::f32::consts::FRAC_PI_2 {
            return Err(SettingsError::OutOfRange {
                name: "bounce_angle_max",
                value: self.bounce_angle_max,
            });
        }
        if self.paddle_height > self.play_height || self.min_paddle_height > self.paddle_height {
            return Err(SettingsError::OutOfRange {
                name: "paddle_height",
                value: self.paddle_height,
            });
        }
        if self.ball_radius * 2.0 >= self.play_height {
            return Err(SettingsError::OutOfRange {
                name: "ball_radius",
                value: self.ball_radius,
            });
        }
        if (self.paddle_offset + self.paddle_width) * 2.0 >= self.play_width {
            return Err(SettingsError::OutOfRange {
                name: "paddle_offset",
                value: self.paddle_offset,
            });
        }

        // The wall must sit between the paddle faces
        let width = self.wall_width();
        let available = self.play_width - 2.0 * (self.paddle_offset + self.paddle_width);
        if width > available {
            return Err(SettingsError::WallTooWide { width, available });
        }
        let rows = row_count(self.play_height, self.brick_height, self.brick_gap);
        let bricks = u64::from(rows) * u64::from(self.brick_columns);
        if bricks > MAX_BRICKS {
            return Err(SettingsError::WallTooLarge {
                bricks,
                max: MAX_BRICKS,
            });
        }

        Ok(())
    }

    /// Horizontal extent of the brick wall
    #[inline]
    pub fn wall_width(&self) -> f32 {
        self.brick_columns as f32 * (self.brick_width + self.brick_gap) - self.brick_gap
    }

    /// X of the left goal line
    #[inline]
    pub fn player_goal_x(&self) -> f32 {
        self.paddle_offset
    }

    /// X of the right goal line
    #[inline]
    pub fn bot_goal_x(&self) -> f32 {
        self.play_width - self.paddle_offset
    }

    /// Center of the play area (serve point)
    #[inline]
    pub fn center(&self) -> glam::Vec2 {
        glam::Vec2::new(self.play_width / 2.0, self.play_height / 2.0)
    }
}
