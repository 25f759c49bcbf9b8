//! Obstacle-run simulation engine
//!
//! Fixed-role frame simulation: the engine advances one step per scheduled
//! frame, the spawner feeds it obstacles, and the runner drives it on a
//! display-cadence interval.

pub mod engine;
pub mod geometry;
pub mod input;
pub mod runner;
pub mod spawner;

pub use engine::{GameEngine, GameSnapshot, RunPhase};
pub use geometry::{intersects, Rect};
pub use input::{InputController, Intent, Key, RawEvent};
pub use runner::GameRunner;
pub use spawner::{Obstacle, ObstacleKind, ObstacleSpawner};
