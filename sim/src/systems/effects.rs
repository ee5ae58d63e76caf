//! Visual effects: explosions, the turn indicator and end-of-tick cleanup.

use crate::components::*;
use crate::config::MatchConfig;
use crate::systems::turn::TurnState;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Bobbing arrow above the active tank at the start of its turn.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurnIndicator {
    /// Vertical offset from the rest position.
    pub offset: f32,
    /// +1 or -1.
    pub direction: f32,
    pub visible: bool,
}

impl Default for TurnIndicator {
    fn default() -> Self {
        Self {
            offset: 0.0,
            direction: 1.0,
            visible: true,
        }
    }
}

pub fn explosion_system(mut explosions: Query<&mut Explosion>) {
    for mut explosion in explosions.iter_mut() {
        explosion.update();
    }
}

pub fn turn_indicator_system(
    config: Res<MatchConfig>,
    turn: Res<TurnState>,
    mut indicator: ResMut<TurnIndicator>,
) {
    let effects = &config.effects;
    indicator.visible = !turn.is_over() && turn.turn_elapsed < effects.indicator_duration;
    if !indicator.visible {
        return;
    }
    indicator.offset += indicator.direction * effects.indicator_speed;
    if indicator.offset.abs() > effects.indicator_amplitude {
        indicator.direction = -indicator.direction;
    }
}

/// Despawn resolved shells and finished explosions.
pub fn cleanup_system(
    mut commands: Commands,
    projectiles: Query<(Entity, &Projectile)>,
    explosions: Query<(Entity, &Explosion)>,
) {
    for (entity, projectile) in projectiles.iter() {
        if projectile.resolved {
            commands.entity(entity).despawn();
        }
    }
    for (entity, explosion) in explosions.iter() {
        if !explosion.active {
            commands.entity(entity).despawn();
        }
    }
}
