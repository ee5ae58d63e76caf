//! Snapshot types.
//!
//! The `Snapshot` struct is a serializable view of one tick of a match,
//! everything the presentation layer needs to draw a frame.

use crate::components::*;
use crate::config::MatchConfig;
use crate::systems::clock::SimTick;
use crate::systems::effects::TurnIndicator;
use crate::systems::turn::{MatchOutcome, TurnPhase, TurnState};
use crate::terrain::{Crater, TerrainSnapshot};
use crate::wind::{Difficulty, Wind};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// One tank, as drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankSnapshot {
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub angle: f32,
    pub power: f32,
    pub health: i32,
    pub health_max: i32,
    pub barrel_tip_x: f32,
    pub barrel_tip_y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub owner: Side,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplosionSnapshot {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub alpha: f32,
}

/// Turn arrow above the active tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub side: Side,
    pub x: f32,
    pub y: f32,
    pub offset: f32,
}

/// Complete match state for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Ticks run since the match started.
    pub tick: u64,
    /// Elapsed match time in seconds.
    pub time: f32,
    pub phase: TurnPhase,
    pub active: Side,
    pub turn_counter: u32,
    pub turn_elapsed: f32,
    pub wind: f32,
    pub difficulty: Difficulty,
    pub outcome: MatchOutcome,
    /// Red first.
    pub tanks: Vec<TankSnapshot>,
    pub projectile: Option<ProjectileSnapshot>,
    pub explosions: Vec<ExplosionSnapshot>,
    /// Present while the turn arrow is showing.
    pub indicator: Option<IndicatorSnapshot>,
    pub cannon_moving: bool,
    /// Craters made since the previous snapshot.
    pub new_craters: Vec<Crater>,
    /// Full heightmap, only when `terrain_dirty`.
    pub terrain: Option<TerrainSnapshot>,
    /// Whether the terrain changed since the previous snapshot.
    pub terrain_dirty: bool,
}

impl Snapshot {
    /// Build a snapshot from the ECS world.
    ///
    /// Missing resources fall back to their defaults, so this also works on
    /// a partially built world. Terrain fields are left empty; the owner of
    /// the dirty state fills them in.
    pub fn from_world(world: &mut World, time: f32) -> Self {
        let tick = world.get_resource::<SimTick>().map_or(0, |t| t.0);
        let tank_config = world
            .get_resource::<MatchConfig>()
            .map(|c| c.tank)
            .unwrap_or_default();

        let mut tanks: Vec<TankSnapshot> = world
            .query::<(&Tank, &Position, &Health)>()
            .iter(world)
            .map(|(tank, pos, health)| {
                let tip = tank.barrel_tip(pos, &tank_config);
                TankSnapshot {
                    side: tank.side,
                    x: pos.x,
                    y: pos.y,
                    angle: tank.angle,
                    power: tank.power,
                    health: health.current,
                    health_max: health.max,
                    barrel_tip_x: tip.x,
                    barrel_tip_y: tip.y,
                }
            })
            .collect();
        tanks.sort_by_key(|t| t.side);

        let projectile = world
            .query::<(&Projectile, &Position, &Velocity)>()
            .iter(world)
            .find(|(projectile, _, _)| !projectile.resolved)
            .map(|(projectile, pos, vel)| ProjectileSnapshot {
                owner: projectile.owner,
                x: pos.x,
                y: pos.y,
                vx: vel.vx,
                vy: vel.vy,
                active: projectile.active,
            });

        let explosions = world
            .query::<(&Explosion, &Position)>()
            .iter(world)
            .filter(|(explosion, _)| explosion.active)
            .map(|(explosion, pos)| ExplosionSnapshot {
                x: pos.x,
                y: pos.y,
                radius: explosion.current_radius,
                alpha: explosion.alpha.max(0.0),
            })
            .collect();

        let turn = world.get_resource::<TurnState>().cloned().unwrap_or_default();
        let wind = world.get_resource::<Wind>().copied().unwrap_or_default();
        let indicator = world
            .get_resource::<TurnIndicator>()
            .copied()
            .filter(|indicator| indicator.visible)
            .and_then(|indicator| {
                tanks
                    .iter()
                    .find(|t| t.side == turn.active)
                    .map(|t| IndicatorSnapshot {
                        side: t.side,
                        x: t.x,
                        y: t.y,
                        offset: indicator.offset,
                    })
            });

        Self {
            tick,
            time,
            phase: turn.phase,
            active: turn.active,
            turn_counter: turn.turn_counter,
            turn_elapsed: turn.turn_elapsed,
            wind: wind.0,
            difficulty: turn.difficulty,
            outcome: turn.outcome(),
            tanks,
            projectile,
            explosions,
            indicator,
            cannon_moving: turn.cannon_moving,
            new_craters: Vec::new(),
            terrain: None,
            terrain_dirty: false,
        }
    }

    pub fn tank(&self, side: Side) -> Option<&TankSnapshot> {
        self.tanks.iter().find(|t| t.side == side)
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
