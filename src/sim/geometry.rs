//! Axis-aligned bounding-box intersection
//!
//! The only geometry the run needs: half-open AABB overlap between the
//! player and an obstacle.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in track units
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Half-open overlap test: touching edges do not count as a hit
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width
        && a.x + a.width > b.x
        && a.y < b.y + b.height
        && a.y + a.height > b.y
}
