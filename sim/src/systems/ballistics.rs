//! Ballistics - projectile integration.
//!
//! One step per tick, in this exact order:
//!
//! 1. wind is added to horizontal velocity
//! 2. position advances by velocity
//! 3. gravity is added to vertical velocity
//! 4. drag scales both velocity axes
//! 5. the shell is deactivated once it leaves the playfield
//!
//! Collisions are not handled here; see `impact_system`.

use crate::components::*;
use crate::config::{BallisticsConfig, MatchConfig, PlayfieldConfig};
use crate::wind::Wind;
use bevy_ecs::prelude::*;

/// Whether a point is still inside the playfield. The top is open: shells
/// may fly above the screen and come back down.
#[inline]
pub fn in_playfield(position: &Position, playfield: &PlayfieldConfig) -> bool {
    !(position.x < 0.0 || position.x > playfield.width as f32 || position.y > playfield.height)
}

/// Advance one shell by one tick. Returns `false` once it is out of bounds.
pub fn integrate(
    position: &mut Position,
    velocity: &mut Velocity,
    wind: f32,
    ballistics: &BallisticsConfig,
    playfield: &PlayfieldConfig,
) -> bool {
    velocity.vx += wind;
    position.x += velocity.vx;
    position.y += velocity.vy;
    velocity.vy += ballistics.gravity;
    velocity.vx *= ballistics.drag;
    velocity.vy *= ballistics.drag;
    in_playfield(position, playfield)
}

/// System that moves every live shell.
pub fn projectile_motion_system(
    config: Res<MatchConfig>,
    wind: Res<Wind>,
    mut query: Query<(&mut Projectile, &mut Position, &mut Velocity)>,
) {
    for (mut projectile, mut pos, mut vel) in query.iter_mut() {
        if !projectile.active || projectile.resolved {
            continue;
        }
        if !integrate(&mut pos, &mut vel, wind.0, &config.ballistics, &config.playfield) {
            projectile.active = false;
        }
    }
}
