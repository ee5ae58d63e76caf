//! Match configuration.
//!
//! All tunable constants of a match live in [`MatchConfig`], inserted into the
//! ECS world as a resource. `Default` reproduces the classic 800x600 duel; a
//! config can also be loaded from JSON, with missing fields falling back to the
//! defaults.

use crate::error::{SimError, SimResult};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Playfield dimensions in screen units (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldConfig {
    /// Number of terrain columns, one per horizontal pixel.
    pub width: usize,
    pub height: f32,
}

impl Default for PlayfieldConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600.0,
        }
    }
}

/// Procedural terrain parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Height of the two endpoint columns.
    pub edge_height: f32,
    pub min_peak_height: u32,
    pub max_peak_height: u32,
    /// Sample point count range, endpoints included.
    pub min_peaks: usize,
    pub max_peaks: usize,
    pub smoothing_passes: usize,
    pub crater_radius: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            edge_height: 20.0,
            min_peak_height: 100,
            max_peak_height: 400,
            min_peaks: 3,
            max_peaks: 6,
            smoothing_passes: 3,
            crater_radius: 15.0,
        }
    }
}

/// Projectile physics, per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallisticsConfig {
    pub gravity: f32,
    /// Velocity multiplier applied to both axes after gravity.
    pub drag: f32,
}

impl Default for BallisticsConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            drag: 0.99,
        }
    }
}

/// Tank placement, limits and hitbox.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankConfig {
    /// Distance of each tank from its edge of the playfield.
    pub edge_margin: f32,
    pub health: i32,
    pub initial_angle: f32,
    pub initial_power: f32,
    pub min_angle: f32,
    pub max_angle: f32,
    pub min_power: f32,
    pub max_power: f32,
    /// Vertical distance from the tank anchor to the muzzle.
    pub muzzle_offset: f32,
    pub barrel_length: f32,
    pub hitbox_half_width: f32,
    pub hitbox_half_height: f32,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            edge_margin: 100.0,
            health: 3,
            initial_angle: 45.0,
            initial_power: 30.0,
            min_angle: 0.0,
            max_angle: 180.0,
            min_power: 10.0,
            max_power: 70.0,
            muzzle_offset: 10.0,
            barrel_length: 30.0,
            hitbox_half_width: 25.0,
            hitbox_half_height: 15.0,
        }
    }
}

/// Cosmetic effect timings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsConfig {
    pub explosion_max_radius: f32,
    pub explosion_growth: f32,
    /// Seconds the turn indicator stays visible after a handoff.
    pub indicator_duration: f32,
    pub indicator_amplitude: f32,
    pub indicator_speed: f32,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            explosion_max_radius: 50.0,
            explosion_growth: 5.0,
            indicator_duration: 3.0,
            indicator_amplitude: 5.0,
            indicator_speed: 0.5,
        }
    }
}

/// Complete configuration for one match.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Nominal seconds per tick (one tick per rendered frame).
    pub fixed_timestep: f32,
    /// Wind is re-rolled when the turn counter is a multiple of this.
    pub wind_cadence: u32,
    pub playfield: PlayfieldConfig,
    pub terrain: TerrainConfig,
    pub ballistics: BallisticsConfig,
    pub tank: TankConfig,
    pub effects: EffectsConfig,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fixed_timestep: 1.0 / 60.0, // 60 Hz
            wind_cadence: 3,
            playfield: PlayfieldConfig::default(),
            terrain: TerrainConfig::default(),
            ballistics: BallisticsConfig::default(),
            tank: TankConfig::default(),
            effects: EffectsConfig::default(),
        }
    }
}

impl MatchConfig {
    /// Parse and validate a config from JSON.
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// X coordinate of the red tank.
    pub fn red_x(&self) -> f32 {
        self.tank.edge_margin
    }

    /// X coordinate of the blue tank.
    pub fn blue_x(&self) -> f32 {
        self.playfield.width as f32 - self.tank.edge_margin
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> SimResult<()> {
        let t = &self.terrain;
        let tank = &self.tank;

        if !(self.fixed_timestep.is_finite() && self.fixed_timestep > 0.0) {
            return Err(SimError::invalid("fixed_timestep must be positive"));
        }
        if self.wind_cadence == 0 {
            return Err(SimError::invalid("wind_cadence must be at least 1"));
        }
        if !(self.playfield.height.is_finite() && self.playfield.height > 0.0) {
            return Err(SimError::invalid("playfield height must be positive"));
        }
        if t.min_peaks < 3 || t.min_peaks > t.max_peaks || t.max_peaks > 6 {
            return Err(SimError::invalid("peak range must satisfy 3 <= min <= max <= 6"));
        }
        if self.playfield.width < t.max_peaks {
            return Err(SimError::invalid("playfield narrower than the peak count"));
        }
        if t.min_peak_height > t.max_peak_height {
            return Err(SimError::invalid("min_peak_height exceeds max_peak_height"));
        }
        if !(t.crater_radius.is_finite() && t.crater_radius >= 0.0) {
            return Err(SimError::invalid("crater_radius must be non-negative"));
        }
        if tank.min_angle > tank.max_angle || tank.min_power > tank.max_power {
            return Err(SimError::invalid("tank limits are inverted"));
        }
        if tank.health <= 0 {
            return Err(SimError::invalid("tank health must be positive"));
        }
        let (red, blue) = (self.red_x(), self.blue_x());
        let width = self.playfield.width as f32;
        if red < 0.0 || blue >= width || red >= blue {
            return Err(SimError::invalid("tank edge_margin does not fit the playfield"));
        }
        if self.effects.explosion_growth <= 0.0 {
            return Err(SimError::invalid("explosion_growth must be positive"));
        }
        Ok(())
    }
}
