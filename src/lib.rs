//! Grid-world raycasting core.
//!
//! - `player`: camera position/facing and grid collision
//! - `ray`: per-column wall intersection by cell-boundary traversal
//! - `map`: the occupancy query both of them consume, plus a map file loader
//! - `config`: resolved tunables

pub mod config;
pub mod map;
pub mod player;
pub mod ray;

pub use config::Config;
pub use map::{CellRect, Map, Occupancy, Tile};
pub use player::{Intents, PlayerState};
pub use ray::{Cardinal, Quadrant, RayCaster, RayHit, Side};

use std::f32::consts::TAU;

/// Reduce an angle into [0, 2π).
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    let angle = angle.rem_euclid(TAU);
    // rem_euclid rounds tiny negatives up to exactly TAU
    if angle >= TAU {
        0.
    } else {
        angle
    }
}
