//! Impact resolution.
//!
//! Runs right after projectile motion. For every unresolved shell the tests
//! are, in order:
//!
//! 1. terrain - shell at or below the surface of an in-range column
//! 2. tanks - Red before Blue, first strict box hit takes one damage
//! 3. lost - shell already deactivated by leaving the playfield
//!
//! The first test that passes resolves the shell. The tests also run on the
//! tick the shell leaves the playfield, so a last-moment hit still counts.

use crate::components::*;
use crate::config::MatchConfig;
use crate::events::{EventBuffer, SimEvent};
use crate::systems::tank::is_hit;
use crate::systems::turn::{ShotResolution, TurnState};
use crate::terrain::Terrain;
use bevy_ecs::prelude::*;
use tracing::info;

/// Whether a shell at `pos` is touching the ground.
pub fn hits_terrain(terrain: &Terrain, pos: &Position) -> bool {
    terrain
        .column_at(pos.x)
        .is_some_and(|column| pos.y >= terrain.surface_y(column))
}

pub fn impact_system(
    mut commands: Commands,
    config: Res<MatchConfig>,
    mut terrain: ResMut<Terrain>,
    mut turn: ResMut<TurnState>,
    mut events: ResMut<EventBuffer>,
    mut projectiles: Query<(&mut Projectile, &Position)>,
    mut tanks: Query<(&Tank, &Position, &mut Health), Without<Projectile>>,
) {
    for (mut projectile, pos) in projectiles.iter_mut() {
        if projectile.resolved {
            continue;
        }

        let resolution = if hits_terrain(&terrain, pos) {
            let lowered = terrain.deform(pos.x, config.terrain.crater_radius);
            commands.spawn(ExplosionBundle::new(pos.x, pos.y, &config.effects));
            events.push(SimEvent::TerrainImpact { x: pos.x, y: pos.y });
            info!(
                owner = projectile.owner.as_str(),
                x = pos.x,
                y = pos.y,
                lowered,
                "shell hit terrain"
            );
            ShotResolution::TerrainImpact { x: pos.x, y: pos.y }
        } else if let Some((side, anchor, health)) = hit_tank(&mut tanks, pos, &config) {
            commands.spawn(ExplosionBundle::new(pos.x, pos.y, &config.effects));
            events.push(SimEvent::TankHit {
                side,
                x: anchor.x,
                y: anchor.y,
                health,
            });
            info!(
                owner = projectile.owner.as_str(),
                target = side.as_str(),
                health,
                "shell hit tank"
            );
            ShotResolution::TankHit { side }
        } else if !projectile.active {
            events.push(SimEvent::ProjectileLost {
                side: projectile.owner,
            });
            info!(owner = projectile.owner.as_str(), "shell left the playfield");
            ShotResolution::Miss
        } else {
            continue;
        };

        projectile.active = false;
        projectile.resolved = true;
        turn.resolve(resolution);
    }
}

/// Damage the first tank, in side order, whose box contains `pos`.
/// Returns its side, anchor and remaining health.
fn hit_tank(
    tanks: &mut Query<(&Tank, &Position, &mut Health), Without<Projectile>>,
    pos: &Position,
    config: &MatchConfig,
) -> Option<(Side, Position, i32)> {
    let mut candidates: Vec<_> = tanks.iter_mut().collect();
    candidates.sort_by_key(|(tank, _, _)| tank.side);
    for (tank, anchor, mut health) in candidates {
        if is_hit(anchor, Some(pos), &config.tank) {
            health.damage(1);
            return Some((tank.side, *anchor, health.current));
        }
    }
    None
}
