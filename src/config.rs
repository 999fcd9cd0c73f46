//! Engine tunables.
//!
//! Everything the player and the caster need arrives here already resolved;
//! malformed values are rejected at load time so the per-frame code can
//! trust them.

use anyhow::Context;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Compile-time defaults
pub mod consts {
    /// World units per grid cell
    pub const CELL_SIZE: f32 = 100.0;
    /// Player speed in grid cells per second
    pub const PLAYER_SPEED: f32 = 4.0;
    /// Player turn rate in radians per second
    pub const PLAYER_ROT_SPEED: f32 = 2.0;
    /// One ray per screen column
    pub const NUM_RAYS: usize = 640;
    /// Field of view in degrees
    pub const FOV: f32 = 60.0;
    /// Cell boundaries a ray may cross before giving up
    pub const MAX_DEPTH: u32 = 24;
    pub const PLAYER_POS: [f32; 2] = [1.5, 5.0];
    pub const PLAYER_ANGLE: f32 = 0.0;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cell_size: f32,
    pub player_speed: f32,
    pub player_rot_speed: f32,
    pub num_rays: usize,
    /// Field of view in degrees
    pub fov: f32,
    pub max_depth: u32,
    /// Initial position in grid units
    pub player_pos: Vec2,
    /// Initial facing in radians
    pub player_angle: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_size: consts::CELL_SIZE,
            player_speed: consts::PLAYER_SPEED,
            player_rot_speed: consts::PLAYER_ROT_SPEED,
            num_rays: consts::NUM_RAYS,
            fov: consts::FOV,
            max_depth: consts::MAX_DEPTH,
            player_pos: Vec2::from_array(consts::PLAYER_POS),
            player_angle: consts::PLAYER_ANGLE,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        log::info!("loading config at {}", path.display());
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("could not read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.) {
            anyhow::bail!("cell_size must be positive, got {}", self.cell_size);
        }
        if self.num_rays == 0 {
            anyhow::bail!("num_rays must be at least 1");
        }
        if !(self.fov.is_finite() && self.fov > 0. && self.fov < 180.) {
            anyhow::bail!("fov must be in (0, 180) degrees, got {}", self.fov);
        }
        if self.max_depth == 0 {
            anyhow::bail!("max_depth must be at least 1");
        }
        if !(self.player_speed.is_finite() && self.player_speed >= 0.) {
            anyhow::bail!("player_speed must be non-negative, got {}", self.player_speed);
        }
        if !(self.player_rot_speed.is_finite() && self.player_rot_speed >= 0.) {
            anyhow::bail!(
                "player_rot_speed must be non-negative, got {}",
                self.player_rot_speed
            );
        }
        if !(self.player_pos.is_finite() && self.player_angle.is_finite()) {
            anyhow::bail!("initial player position and angle must be finite");
        }

        Ok(())
    }

    /// Field of view in radians
    pub fn fov_rad(&self) -> f32 {
        self.fov.to_radians()
    }
}
