//! Game state and core simulation types
//!
//! `GameState` is the single authoritative match aggregate. Every entity is
//! owned by it and rebuilt from scratch on reset.

use glam::Vec2;
use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::field::generate_bricks;
use super::geom::Rect;
use crate::consts::SERVE_ANGLE_MAX;
use crate::settings::{Settings, SettingsError};

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Initial layout, waiting for start
    Idle,
    /// Active gameplay
    Playing,
    /// Someone scored
    GameOver,
}

/// A side of the court
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Human, left wall
    Player,
    /// Automated, right wall
    Bot,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Bot,
            Side::Bot => Side::Player,
        }
    }

    /// Direction a ball served by this side travels along x
    #[inline]
    pub fn serve_direction(self) -> f32 {
        match self {
            Side::Player => 1.0,
            Side::Bot => -1.0,
        }
    }

    /// Presentation color tag (RGB)
    pub fn color(self) -> u32 {
        match self {
            Side::Player => 0x00bfff,
            Side::Bot => 0xffa500,
        }
    }
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    /// Side penalised if this ball crosses its own goal line
    pub owner: Side,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Presentation color tag (RGB)
    pub color: u32,
}

impl Ball {
    /// Bounding box used for all collision tests
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::around_circle(self.pos, self.radius)
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// A fresh serve: who owns the ball and which way it leaves the center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Serve {
    pub owner: Side,
    /// Angle from horizontal, within ±45°
    pub angle: f32,
}

impl Serve {
    /// Random owner and angle
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let owner = if rng.random_bool(0.5) {
            Side::Player
        } else {
            Side::Bot
        };
        Self::random_for(owner, rng)
    }

    /// Random angle for a fixed owner
    pub fn random_for<R: Rng + ?Sized>(owner: Side, rng: &mut R) -> Self {
        let angle = rng.random_range(-SERVE_ANGLE_MAX..SERVE_ANGLE_MAX);
        Self { owner, angle }
    }

    /// Velocity away from the owner's goal
    pub fn velocity(&self, speed: f32) -> Vec2 {
        Vec2::new(
            self.owner.serve_direction() * self.angle.cos(),
            self.angle.sin(),
        ) * speed
    }

    /// Build a ball at the play-area center
    pub fn ball(&self, id: u32, settings: &Settings) -> Ball {
        Ball {
            id,
            owner: self.owner,
            pos: settings.center(),
            vel: self.velocity(settings.ball_speed),
            radius: settings.ball_radius,
            color: self.owner.color(),
        }
    }
}

/// A paddle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub side: Side,
    /// Left edge (fixed)
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Own-ball misses this match
    pub misses: u32,
}

impl Paddle {
    /// Paddle at its starting layout: vertically centered, full height
    pub fn new(side: Side, settings: &Settings) -> Self {
        let x = match side {
            Side::Player => settings.paddle_offset,
            Side::Bot => settings.play_width - settings.paddle_offset - settings.paddle_width,
        };
        Self {
            side,
            x,
            y: (settings.play_height - settings.paddle_height) / 2.0,
            width: settings.paddle_width,
            height: settings.paddle_height,
            misses: 0,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[inline]
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    /// X of the face balls bounce off (the side facing the court)
    #[inline]
    pub fn edge_x(&self) -> f32 {
        match self.side {
            Side::Player => self.x + self.width,
            Side::Bot => self.x,
        }
    }

    /// Lowest legal top edge
    #[inline]
    pub fn max_y(&self, play_height: f32) -> f32 {
        (play_height - self.height).max(0.0)
    }

    /// Center the paddle on `target_y`, clamped to the play area
    pub fn center_on(&mut self, target_y: f32, play_height: f32) {
        let y = target_y - self.height / 2.0;
        if y.is_finite() {
            self.y = y.clamp(0.0, self.max_y(play_height));
        }
    }

    /// Move the paddle center toward `target_y` at no more than `max_speed`
    pub fn move_toward(&mut self, target_y: f32, dt: f32, max_speed: f32, play_height: f32) {
        let delta = target_y - self.center_y();
        if !delta.is_finite() {
            return;
        }

        // Clamp to max speed; never overshoot the target
        let max_delta = max_speed * dt;
        let clamped_delta = delta.clamp(-max_delta, max_delta);

        self.y = (self.y + clamped_delta).clamp(0.0, self.max_y(play_height));
    }

    /// Record an own-ball miss. Returns the new height when the paddle shrank.
    pub fn record_miss(&mut self, settings: &Settings) -> Option<f32> {
        self.misses += 1;
        if self.misses % settings.miss_threshold != 0 {
            return None;
        }
        let height = (self.height * (1.0 - settings.shrink_fraction))
            .max(settings.min_paddle_height);
        self.height = height;
        Some(height)
    }
}

/// A destructible brick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    /// Row-major index into the wall
    pub id: u32,
    pub row: u32,
    pub col: u32,
    pub rect: Rect,
    pub alive: bool,
}

/// Discrete things that happened during a tick, for presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A ball bounced off a paddle
    PaddleHit { side: Side, ball: u32 },
    /// A brick was destroyed
    BrickDestroyed { brick: u32, ball: u32 },
    /// A side let its own ball through
    SelfMiss { side: Side, misses: u32 },
    /// A paddle lost height after repeated self-misses
    PaddleShrunk { side: Side, height: f32 },
    /// A ball was served from center
    BallServed { ball: u32, owner: Side },
    /// A ball crossed its opponent's goal line; the match is over
    Goal { scorer: Side },
}

/// Monotonic entity ID source for balls
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Read-only view of a match for renderers and transports
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub winner: Option<Side>,
    pub time_ticks: u64,
    pub paddles: &'a [Paddle],
    pub balls: &'a [Ball],
    pub bricks: &'a [Brick],
}

/// The match aggregate
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: Settings,
    /// Seed the current layout was built from
    pub seed: u64,
    pub phase: GamePhase,
    pub winner: Option<Side>,
    /// Stepped frames since the last reset
    pub time_ticks: u64,
    pub paddles: Vec<Paddle>,
    pub balls: Vec<Ball>,
    pub bricks: Vec<Brick>,
    pub(crate) ids: EntityIds,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Validate `settings` and build the idle layout
    pub fn new(settings: Settings, seed: u64) -> Result<Self, SettingsError> {
        settings.validate()?;

        let mut state = Self {
            settings,
            seed,
            phase: GamePhase::Idle,
            winner: None,
            time_ticks: 0,
            paddles: Vec::new(),
            balls: Vec::new(),
            bricks: Vec::new(),
            ids: EntityIds::default(),
            rng: Pcg32::seed_from_u64(seed),
        };
        state.reset();
        Ok(state)
    }

    /// Rebuild bricks, paddles and balls from `seed`, back to idle
    pub fn reset(&mut self) {
        log::info!("Resetting match (seed {})", self.seed);

        let settings = &self.settings;
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.ids = EntityIds::default();
        self.phase = GamePhase::Idle;
        self.winner = None;
        self.time_ticks = 0;

        self.bricks = generate_bricks(
            settings.play_width,
            settings.play_height,
            settings.brick_columns,
            Vec2::new(settings.brick_width, settings.brick_height),
            settings.brick_gap,
        );

        self.paddles = vec![Paddle::new(Side::Player, settings)];
        if settings.bot_enabled {
            self.paddles.push(Paddle::new(Side::Bot, settings));
        }

        self.balls = Vec::with_capacity(settings.ball_count as usize);
        self.serve_initial_balls();
    }

    /// One random serve for a single ball; otherwise pairs of mirrored
    /// serves, one owned by each side
    fn serve_initial_balls(&mut self) {
        if self.settings.ball_count == 1 {
            let serve = Serve::random(&mut self.rng);
            let id = self.ids.next_id();
            self.balls.push(serve.ball(id, &self.settings));
            return;
        }

        let mut pair_serve = None;
        for i in 0..self.settings.ball_count {
            let owner = if i % 2 == 0 { Side::Player } else { Side::Bot };
            let serve = match pair_serve.take() {
                Some(angle) => Serve { owner, angle },
                None => {
                    let serve = Serve::random_for(owner, &mut self.rng);
                    pair_serve = Some(-serve.angle);
                    serve
                }
            };
            let id = self.ids.next_id();
            self.balls.push(serve.ball(id, &self.settings));
        }
    }

    /// Start command: idle → playing, game over → fresh match → playing
    pub fn start(&mut self) {
        match self.phase {
            GamePhase::Idle => {}
            GamePhase::GameOver => {
                // New layout for the rematch
                self.seed = self.rng.next_u64();
                self.reset();
            }
            GamePhase::Playing => {
                log::debug!("Start ignored: match already running");
                return;
            }
        }
        log::info!("Match started with {} balls", self.balls.len());
        self.phase = GamePhase::Playing;
    }

    /// Center the player paddle on a pointer coordinate (playing only)
    pub fn set_player_target(&mut self, y: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let play_height = self.settings.play_height;
        if let Some(paddle) = self.paddle_mut(Side::Player) {
            paddle.center_on(y, play_height);
        }
    }

    pub fn paddle(&self, side: Side) -> Option<&Paddle> {
        self.paddles.iter().find(|p| p.side == side)
    }

    pub fn paddle_mut(&mut self, side: Side) -> Option<&mut Paddle> {
        self.paddles.iter_mut().find(|p| p.side == side)
    }

    pub fn alive_bricks(&self) -> usize {
        self.bricks.iter().filter(|b| b.alive).count()
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            winner: self.winner,
            time_ticks: self.time_ticks,
            paddles: &self.paddles,
            balls: &self.balls,
            bricks: &self.bricks,
        }
    }
}
