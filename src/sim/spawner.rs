//! Randomized obstacle generation with time-gated spacing

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Minimum gap between spawns in milliseconds
const MIN_GAP_MS: u64 = 1500;
/// Maximum gap between spawns in milliseconds (exclusive)
const MAX_GAP_MS: u64 = 2500;
/// Probability of a ground obstacle; the rest are birds
const CACTUS_PROBABILITY: f64 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObstacleKind {
    Cactus,
    Bird,
}

/// One live obstacle, owned by a single run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u64,
    pub kind: ObstacleKind,
    /// Scroll progress on the percent scale; 0 is the far edge
    pub position: f64,
    /// Flight altitude, birds only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Emits obstacles once the gap since the last spawn exceeds a randomized
/// threshold. The threshold is re-drawn after every spawn.
pub struct ObstacleSpawner {
    rng: StdRng,
    next_id: u64,
    last_spawn_ms: u64,
    gap_ms: u64,
}

impl ObstacleSpawner {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Seeded construction for deterministic runs
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(mut rng: StdRng) -> Self {
        let gap_ms = rng.gen_range(MIN_GAP_MS..MAX_GAP_MS);
        Self {
            rng,
            next_id: 0,
            last_spawn_ms: 0,
            gap_ms,
        }
    }

    /// Rebase the spawn clock at the start of a run
    pub fn reset(&mut self, now_ms: u64) {
        self.last_spawn_ms = now_ms;
        self.gap_ms = self.rng.gen_range(MIN_GAP_MS..MAX_GAP_MS);
    }

    /// Emit a new obstacle if the randomized gap has elapsed
    pub fn tick(&mut self, now_ms: u64) -> Option<Obstacle> {
        if now_ms.saturating_sub(self.last_spawn_ms) < self.gap_ms {
            return None;
        }

        let kind = if self.rng.gen_bool(CACTUS_PROBABILITY) {
            ObstacleKind::Cactus
        } else {
            ObstacleKind::Bird
        };
        let height = match kind {
            ObstacleKind::Bird => Some(if self.rng.gen_bool(0.5) { 50.0 } else { 100.0 }),
            ObstacleKind::Cactus => None,
        };

        let obstacle = Obstacle {
            id: self.next_id,
            kind,
            position: 0.0,
            height,
        };
        self.next_id += 1;
        self.last_spawn_ms = now_ms;
        self.gap_ms = self.rng.gen_range(MIN_GAP_MS..MAX_GAP_MS);

        Some(obstacle)
    }
}

impl Default for ObstacleSpawner {
    fn default() -> Self {
        Self::new()
    }
}
