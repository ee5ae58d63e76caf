//! Per-tick input commands.

use serde::{Deserialize, Serialize};

/// Commands sampled once per frame for the active tank.
///
/// Held arrow keys map to `aim_delta`/`power_delta` of ±1 per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickInput {
    /// Degrees to rotate the cannon (positive turns toward the left).
    pub aim_delta: f32,
    pub power_delta: f32,
    pub fire: bool,
}

impl TickInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn aim(delta: f32) -> Self {
        Self {
            aim_delta: delta,
            ..Self::default()
        }
    }

    pub fn power(delta: f32) -> Self {
        Self {
            power_delta: delta,
            ..Self::default()
        }
    }

    pub fn fire() -> Self {
        Self {
            fire: true,
            ..Self::default()
        }
    }

    pub fn is_idle(&self) -> bool {
        self.aim_delta == 0.0 && self.power_delta == 0.0 && !self.fire
    }
}
