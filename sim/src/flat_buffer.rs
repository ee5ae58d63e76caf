//! Flat `f32` buffer export of a snapshot.
//!
//! Renderers that cannot take JSON cheaply (a game-engine script, a
//! shader uniform upload) read the match state from a single contiguous
//! `Vec<f32>` instead.
//!
//! # Stable Contract
//!
//! The layout below is versioned. Field order and strides do not change
//! without bumping [`LAYOUT_VERSION`].
//!
//! # Buffer Layout (Version 1)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │ HEADER (HEADER_SIZE = 11 elements)                              │
//! │   [0]  version                                                  │
//! │   [1]  phase           - see PHASE_* constants                  │
//! │   [2]  winner          - side id, or -1.0 while ongoing         │
//! │   [3]  active          - side id of the tank to move            │
//! │   [4]  turn_counter                                             │
//! │   [5]  wind                                                     │
//! │   [6]  indicator_shown - 1.0 while the turn arrow is visible    │
//! │   [7]  indicator_offset                                         │
//! │   [8]  tank_count                                               │
//! │   [9]  projectile_count (0 or 1)                                │
//! │   [10] explosion_count                                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ TANKS (tank_count × TANK_STRIDE), Red first                     │
//! │   [+0] side  [+1] x  [+2] y  [+3] angle  [+4] power             │
//! │   [+5] health  [+6] health_max  [+7] tip_x  [+8] tip_y          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ PROJECTILE (projectile_count × PROJECTILE_STRIDE)               │
//! │   [+0] owner  [+1] x  [+2] y  [+3] vx  [+4] vy  [+5] active     │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ EXPLOSIONS (explosion_count × EXPLOSION_STRIDE)                 │
//! │   [+0] x  [+1] y  [+2] radius  [+3] alpha                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Terrain heights are not part of the buffer; fetch them with
//! `MatchWorld::terrain_snapshot` when `terrain_dirty` is set.
//!
//! # Determinism
//!
//! The same `Snapshot` always produces the same buffer.

use crate::components::Side;
use crate::systems::turn::TurnPhase;
use crate::world::Snapshot;

// ============================================================================
// CONSTANTS - STABLE CONTRACT
// ============================================================================

pub const LAYOUT_VERSION: f32 = 1.0;

pub const HEADER_SIZE: usize = 11;
pub const TANK_STRIDE: usize = 9;
pub const PROJECTILE_STRIDE: usize = 6;
pub const EXPLOSION_STRIDE: usize = 4;

pub const HEADER_VERSION: usize = 0;
pub const HEADER_PHASE: usize = 1;
pub const HEADER_WINNER: usize = 2;
pub const HEADER_ACTIVE: usize = 3;
pub const HEADER_TURN: usize = 4;
pub const HEADER_WIND: usize = 5;
pub const HEADER_INDICATOR_SHOWN: usize = 6;
pub const HEADER_INDICATOR_OFFSET: usize = 7;
pub const HEADER_TANK_COUNT: usize = 8;
pub const HEADER_PROJECTILE_COUNT: usize = 9;
pub const HEADER_EXPLOSION_COUNT: usize = 10;

pub const SIDE_RED: f32 = 0.0;
pub const SIDE_BLUE: f32 = 1.0;
/// Winner slot while the match is still running.
pub const NO_WINNER: f32 = -1.0;

pub const PHASE_AWAITING_SHOT: f32 = 0.0;
pub const PHASE_IN_FLIGHT: f32 = 1.0;
pub const PHASE_RESOLVING: f32 = 2.0;
pub const PHASE_MATCH_OVER: f32 = 3.0;

// Tank fields
pub const TANK_SIDE: usize = 0;
pub const TANK_X: usize = 1;
pub const TANK_Y: usize = 2;
pub const TANK_ANGLE: usize = 3;
pub const TANK_POWER: usize = 4;
pub const TANK_HEALTH: usize = 5;
pub const TANK_HEALTH_MAX: usize = 6;
pub const TANK_TIP_X: usize = 7;
pub const TANK_TIP_Y: usize = 8;

// Projectile fields
pub const PROJECTILE_OWNER: usize = 0;
pub const PROJECTILE_X: usize = 1;
pub const PROJECTILE_Y: usize = 2;
pub const PROJECTILE_VX: usize = 3;
pub const PROJECTILE_VY: usize = 4;
pub const PROJECTILE_ACTIVE: usize = 5;

// Explosion fields
pub const EXPLOSION_X: usize = 0;
pub const EXPLOSION_Y: usize = 1;
pub const EXPLOSION_RADIUS: usize = 2;
pub const EXPLOSION_ALPHA: usize = 3;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

#[inline]
pub fn side_to_id(side: Side) -> f32 {
    match side {
        Side::Red => SIDE_RED,
        Side::Blue => SIDE_BLUE,
    }
}

#[inline]
pub fn phase_to_id(phase: TurnPhase) -> f32 {
    match phase {
        TurnPhase::AwaitingShot => PHASE_AWAITING_SHOT,
        TurnPhase::ProjectileInFlight => PHASE_IN_FLIGHT,
        TurnPhase::Resolving => PHASE_RESOLVING,
        TurnPhase::MatchOver { .. } => PHASE_MATCH_OVER,
    }
}

#[inline]
fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

// ============================================================================
// MAIN SERIALIZATION FUNCTION
// ============================================================================

/// Convert a snapshot to the flat buffer described in the module docs.
pub fn snapshot_to_flatbuffer(snapshot: &Snapshot) -> Vec<f32> {
    let tank_count = snapshot.tanks.len();
    let projectile_count = usize::from(snapshot.projectile.is_some());
    let explosion_count = snapshot.explosions.len();
    let buffer_size = calculate_buffer_size(tank_count, projectile_count, explosion_count);

    let mut buffer = Vec::with_capacity(buffer_size);

    let winner = match snapshot.phase {
        TurnPhase::MatchOver { winner } => side_to_id(winner),
        _ => NO_WINNER,
    };
    buffer.push(LAYOUT_VERSION);
    buffer.push(phase_to_id(snapshot.phase));
    buffer.push(winner);
    buffer.push(side_to_id(snapshot.active));
    buffer.push(snapshot.turn_counter as f32);
    buffer.push(snapshot.wind);
    buffer.push(flag(snapshot.indicator.is_some()));
    buffer.push(snapshot.indicator.as_ref().map_or(0.0, |i| i.offset));
    buffer.push(tank_count as f32);
    buffer.push(projectile_count as f32);
    buffer.push(explosion_count as f32);

    for tank in &snapshot.tanks {
        buffer.extend_from_slice(&[
            side_to_id(tank.side),
            tank.x,
            tank.y,
            tank.angle,
            tank.power,
            tank.health as f32,
            tank.health_max as f32,
            tank.barrel_tip_x,
            tank.barrel_tip_y,
        ]);
    }

    if let Some(projectile) = &snapshot.projectile {
        buffer.extend_from_slice(&[
            side_to_id(projectile.owner),
            projectile.x,
            projectile.y,
            projectile.vx,
            projectile.vy,
            flag(projectile.active),
        ]);
    }

    for explosion in &snapshot.explosions {
        buffer.extend_from_slice(&[explosion.x, explosion.y, explosion.radius, explosion.alpha]);
    }

    debug_assert_eq!(buffer.len(), buffer_size, "Buffer size mismatch");
    buffer
}

/// `HEADER_SIZE + tanks * TANK_STRIDE + projectiles * PROJECTILE_STRIDE + explosions * EXPLOSION_STRIDE`
#[inline]
pub fn calculate_buffer_size(tanks: usize, projectiles: usize, explosions: usize) -> usize {
    HEADER_SIZE + tanks * TANK_STRIDE + projectiles * PROJECTILE_STRIDE + explosions * EXPLOSION_STRIDE
}

/// Entity counts from a buffer header: (tanks, projectiles, explosions).
///
/// Returns `None` if the header is truncated.
pub fn parse_counts(buffer: &[f32]) -> Option<(usize, usize, usize)> {
    if buffer.len() < HEADER_SIZE {
        return None;
    }
    Some((
        buffer[HEADER_TANK_COUNT] as usize,
        buffer[HEADER_PROJECTILE_COUNT] as usize,
        buffer[HEADER_EXPLOSION_COUNT] as usize,
    ))
}

#[inline]
pub const fn tank_offset(index: usize) -> usize {
    HEADER_SIZE + index * TANK_STRIDE
}

#[inline]
pub const fn projectile_offset(tank_count: usize) -> usize {
    HEADER_SIZE + tank_count * TANK_STRIDE
}

#[inline]
pub const fn explosion_offset(tank_count: usize, projectile_count: usize, index: usize) -> usize {
    projectile_offset(tank_count) + projectile_count * PROJECTILE_STRIDE + index * EXPLOSION_STRIDE
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MatchWorld;
    use crate::config::MatchConfig;
    use crate::input::TickInput;
    use crate::terrain::Terrain;
    use crate::wind::Difficulty;

    #[test]
    fn test_fresh_match_buffer() {
        let mut sim = MatchWorld::start_match_seeded(Difficulty::None, 5).unwrap();
        let buffer = snapshot_to_flatbuffer(&sim.snapshot());

        assert_eq!(buffer.len(), calculate_buffer_size(2, 0, 0));
        assert_eq!(buffer[HEADER_VERSION], LAYOUT_VERSION);
        assert_eq!(buffer[HEADER_PHASE], PHASE_AWAITING_SHOT);
        assert_eq!(buffer[HEADER_WINNER], NO_WINNER);
        assert_eq!(buffer[HEADER_ACTIVE], SIDE_RED);
        assert_eq!(parse_counts(&buffer), Some((2, 0, 0)));

        let red = tank_offset(0);
        assert_eq!(buffer[red + TANK_SIDE], SIDE_RED);
        assert_eq!(buffer[red + TANK_X], 100.0);
        assert_eq!(buffer[red + TANK_ANGLE], 45.0);
        assert_eq!(buffer[red + TANK_HEALTH], 3.0);
        let blue = tank_offset(1);
        assert_eq!(buffer[blue + TANK_SIDE], SIDE_BLUE);
        assert_eq!(buffer[blue + TANK_X], 700.0);
    }

    #[test]
    fn test_buffer_with_projectile() {
        let terrain = Terrain::flat(800, 600.0, 200.0).unwrap();
        let mut sim =
            MatchWorld::with_terrain(MatchConfig::default(), Difficulty::None, terrain, 5).unwrap();
        let output = sim.advance(TickInput::fire(), 1.0 / 60.0);
        let buffer = snapshot_to_flatbuffer(&output.snapshot);

        let (tanks, projectiles, explosions) = parse_counts(&buffer).unwrap();
        assert_eq!((tanks, projectiles, explosions), (2, 1, 0));
        assert_eq!(buffer[HEADER_PHASE], PHASE_IN_FLIGHT);

        let p = projectile_offset(tanks);
        assert_eq!(buffer[p + PROJECTILE_OWNER], SIDE_RED);
        assert_eq!(buffer[p + PROJECTILE_ACTIVE], 1.0);
        assert!(buffer[p + PROJECTILE_VX] > 0.0);
        assert_eq!(buffer.len(), explosion_offset(tanks, projectiles, 0));
    }

    #[test]
    fn test_buffer_determinism() {
        let mut a = MatchWorld::start_match_seeded(Difficulty::Strong, 77).unwrap();
        let mut b = MatchWorld::start_match_seeded(Difficulty::Strong, 77).unwrap();
        for _ in 0..30 {
            a.advance(TickInput::fire(), 1.0 / 60.0);
            b.advance(TickInput::fire(), 1.0 / 60.0);
        }
        assert_eq!(
            snapshot_to_flatbuffer(&a.snapshot()),
            snapshot_to_flatbuffer(&b.snapshot())
        );
    }

    #[test]
    fn test_parse_counts_truncated() {
        assert_eq!(parse_counts(&[]), None);
        assert_eq!(parse_counts(&[0.0; HEADER_SIZE - 1]), None);
    }

    #[test]
    fn test_offsets() {
        assert_eq!(tank_offset(0), HEADER_SIZE);
        assert_eq!(projectile_offset(2), HEADER_SIZE + 2 * TANK_STRIDE);
        assert_eq!(
            explosion_offset(2, 1, 3),
            HEADER_SIZE + 2 * TANK_STRIDE + PROJECTILE_STRIDE + 3 * EXPLOSION_STRIDE
        );
    }

    #[test]
    fn test_field_offsets_are_valid() {
        assert_eq!(TANK_STRIDE, TANK_TIP_Y + 1);
        assert_eq!(PROJECTILE_STRIDE, PROJECTILE_ACTIVE + 1);
        assert_eq!(EXPLOSION_STRIDE, EXPLOSION_ALPHA + 1);
        assert_eq!(HEADER_SIZE, HEADER_EXPLOSION_COUNT + 1);
    }
}
