//! Wind and the difficulty policy that drives it.

use crate::error::SimError;
use bevy_ecs::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Match difficulty, selecting how strong the wind may blow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// No wind at all.
    #[default]
    None,
    /// Wind in [-1, 1].
    Weak,
    /// Wind in [-2, 2].
    Strong,
}

impl Difficulty {
    /// Largest wind magnitude, or `None` for a windless match.
    pub fn wind_limit(self) -> Option<f32> {
        match self {
            Difficulty::None => None,
            Difficulty::Weak => Some(1.0),
            Difficulty::Strong => Some(2.0),
        }
    }
}

impl FromStr for Difficulty {
    type Err = SimError;

    /// Accepts both the policy names and the menu labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "easy" => Ok(Difficulty::None),
            "weak" | "medium" => Ok(Difficulty::Weak),
            "strong" | "hard" => Ok(Difficulty::Strong),
            other => Err(SimError::invalid(format!("unknown difficulty '{other}'"))),
        }
    }
}

/// Current horizontal wind force, added to projectile velocity each tick.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Wind(pub f32);

/// Seeded random source for everything random in a match (terrain, wind).
#[derive(Resource, Debug, Clone)]
pub struct MatchRng(pub ChaCha8Rng);

impl MatchRng {
    pub fn from_seed(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

/// Difficulty plus re-roll cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindPolicy {
    pub difficulty: Difficulty,
    /// Re-roll when the turn counter is a multiple of this.
    pub cadence: u32,
}

impl WindPolicy {
    pub fn new(difficulty: Difficulty, cadence: u32) -> Self {
        Self {
            difficulty,
            cadence: cadence.max(1),
        }
    }

    fn roll<R: Rng>(&self, rng: &mut R) -> f32 {
        match self.difficulty.wind_limit() {
            Some(limit) => rng.random_range(-limit..=limit),
            None => 0.0,
        }
    }

    /// Wind at the start of a match.
    pub fn initial<R: Rng>(&self, rng: &mut R) -> f32 {
        self.roll(rng)
    }

    /// Wind after the handoff that produced `turn_counter`.
    pub fn next<R: Rng>(&self, turn_counter: u32, current: f32, rng: &mut R) -> f32 {
        match self.difficulty {
            Difficulty::None => 0.0,
            _ if turn_counter % self.cadence == 0 => self.roll(rng),
            _ => current,
        }
    }
}
