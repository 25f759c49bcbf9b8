//! Per-frame game state transition
//!
//! One run of the obstacle course: scoring, speed ramp, obstacle movement,
//! collision, termination. The engine is clock-agnostic; callers pass the
//! frame timestamp in, so the timed airborne reset can never outlive the
//! run that armed it.

use serde::{Deserialize, Serialize};

use super::geometry::{intersects, Rect};
use super::input::Intent;
use super::spawner::{Obstacle, ObstacleKind, ObstacleSpawner};

/// Player anchor on the track
const PLAYER_X: f64 = 50.0;
const PLAYER_WIDTH: f64 = 60.0;
const PLAYER_HEIGHT: f64 = 60.0;
/// Reduced pose height while ducking
const DUCK_HEIGHT: f64 = 30.0;
/// Vertical offset while airborne
const JUMP_RISE: f64 = 100.0;
/// How long a jump keeps the player airborne
pub const JUMP_DURATION_MS: u64 = 500;

const CACTUS_WIDTH: f64 = 30.0;
const CACTUS_HEIGHT: f64 = 60.0;
const BIRD_WIDTH: f64 = 60.0;
const BIRD_HEIGHT: f64 = 40.0;

/// Scroll position at which an obstacle has passed the player
const TRACK_END: f64 = 100.0;

/// Speed ramp: +0.5 at every multiple-of-100 score crossing, capped
const SPEED_STEP: f64 = 0.5;
const SPEED_SCORE_INTERVAL: u64 = 100;
pub const MAX_SPEED: f64 = 20.0;

/// State machine for one run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Idle,
    Active,
    GameOver,
}

/// Point-in-time view of a run, published once per frame
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub phase: RunPhase,
    pub is_playing: bool,
    pub game_over: bool,
    pub score: u64,
    pub high_score: u64,
    pub speed: f64,
    pub obstacles: Vec<Obstacle>,
}

pub struct GameEngine {
    phase: RunPhase,
    score: u64,
    high_score: u64,
    speed: f64,
    initial_speed: f64,
    obstacles: Vec<Obstacle>,
    spawner: ObstacleSpawner,
    ducking: bool,
    /// Frame timestamp at which the current jump ends
    airborne_until_ms: Option<u64>,
}

impl GameEngine {
    pub fn new(initial_speed: f64, spawner: ObstacleSpawner) -> Self {
        Self {
            phase: RunPhase::Idle,
            score: 0,
            high_score: 0,
            speed: initial_speed,
            initial_speed,
            obstacles: Vec::new(),
            spawner,
            ducking: false,
            airborne_until_ms: None,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Begin a fresh run. High score survives; everything else resets.
    pub fn start(&mut self, now_ms: u64) {
        self.phase = RunPhase::Active;
        self.score = 0;
        self.speed = self.initial_speed;
        self.obstacles.clear();
        self.ducking = false;
        self.airborne_until_ms = None;
        self.spawner.reset(now_ms);
    }

    /// Apply one input intent. Debounce rules: jump and duck are mutually
    /// exclusive poses, and neither applies outside an active run.
    pub fn apply(&mut self, intent: Intent, now_ms: u64) {
        match intent {
            Intent::Jump => {
                if self.phase == RunPhase::Active && !self.is_airborne(now_ms) && !self.ducking {
                    self.airborne_until_ms = Some(now_ms + JUMP_DURATION_MS);
                }
            }
            Intent::Duck => {
                if self.phase == RunPhase::Active && !self.is_airborne(now_ms) {
                    self.ducking = true;
                }
            }
            Intent::StopDucking => {
                self.ducking = false;
            }
            Intent::Confirm => {
                if self.phase != RunPhase::Active {
                    self.start(now_ms);
                }
            }
        }
    }

    /// Advance one frame. No-op unless the run is active.
    pub fn advance(&mut self, now_ms: u64) {
        if self.phase != RunPhase::Active {
            return;
        }

        // Expire the jump before the frame's collision geometry is built.
        if let Some(until) = self.airborne_until_ms {
            if now_ms >= until {
                self.airborne_until_ms = None;
            }
        }

        self.score += 1;
        if self.score % SPEED_SCORE_INTERVAL == 0 {
            self.speed = (self.speed + SPEED_STEP).min(MAX_SPEED);
        }

        if let Some(obstacle) = self.spawner.tick(now_ms) {
            self.obstacles.push(obstacle);
        }

        // Scroll, then drop anything at or past the boundary. The same
        // convention (< TRACK_END keeps) governs what collision can see.
        let speed = self.speed;
        for obstacle in &mut self.obstacles {
            obstacle.position += speed;
        }
        self.obstacles.retain(|o| o.position < TRACK_END);

        let player = self.player_rect(now_ms);
        let hit = self
            .obstacles
            .iter()
            .any(|o| intersects(&player, &obstacle_rect(o)));
        if hit {
            self.end();
        }
    }

    /// Terminate the run: no partial credit, no grace period.
    fn end(&mut self) {
        self.high_score = self.high_score.max(self.score);
        self.phase = RunPhase::GameOver;
        self.airborne_until_ms = None;
        self.ducking = false;
    }

    fn is_airborne(&self, now_ms: u64) -> bool {
        self.airborne_until_ms.map_or(false, |until| now_ms < until)
    }

    fn player_rect(&self, now_ms: u64) -> Rect {
        let height = if self.ducking {
            DUCK_HEIGHT
        } else {
            PLAYER_HEIGHT
        };
        let y = if self.is_airborne(now_ms) {
            JUMP_RISE
        } else {
            0.0
        };
        Rect::new(PLAYER_X, y, PLAYER_WIDTH, height)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            phase: self.phase,
            is_playing: self.phase == RunPhase::Active,
            game_over: self.phase == RunPhase::GameOver,
            score: self.score,
            high_score: self.high_score,
            speed: self.speed,
            obstacles: self.obstacles.clone(),
        }
    }
}

/// Convert scroll progress to an absolute rectangle approaching the player
fn obstacle_rect(obstacle: &Obstacle) -> Rect {
    let x = TRACK_END - obstacle.position;
    match obstacle.kind {
        ObstacleKind::Cactus => Rect::new(x, 0.0, CACTUS_WIDTH, CACTUS_HEIGHT),
        ObstacleKind::Bird => Rect::new(
            x,
            obstacle.height.unwrap_or(0.0),
            BIRD_WIDTH,
            BIRD_HEIGHT,
        ),
    }
}
