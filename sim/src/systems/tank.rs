//! Tank placement and hit tests.

use crate::components::*;
use crate::config::TankConfig;
use crate::terrain::Terrain;
use bevy_ecs::prelude::*;

/// Strict box test around a tank anchor. A missing projectile never hits.
pub fn is_hit(anchor: &Position, projectile: Option<&Position>, config: &TankConfig) -> bool {
    let Some(p) = projectile else {
        return false;
    };
    (p.x - anchor.x).abs() < config.hitbox_half_width
        && (p.y - anchor.y).abs() < config.hitbox_half_height
}

/// Keep each tank sitting on the surface of its column, so it drops into
/// craters dug beneath it.
pub fn tank_grounding_system(terrain: Res<Terrain>, mut tanks: Query<&mut Position, With<Tank>>) {
    for mut pos in tanks.iter_mut() {
        if let Some(column) = terrain.column_at(pos.x) {
            let surface = terrain.surface_y(column);
            if pos.y != surface {
                pos.y = surface;
            }
        }
    }
}
