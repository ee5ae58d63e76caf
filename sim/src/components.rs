//! ECS Components for the artillery duel.
//!
//! Components are plain data attached to entities. A match has two tank
//! entities, at most one projectile entity, and any number of short-lived
//! explosion entities.

use crate::config::{EffectsConfig, TankConfig};
use crate::error::{SimError, SimResult};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// Screen-space position (x to the right, y downward).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Velocity in screen units per tick.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

/// Which side a tank (or the projectile it fired) belongs to.
///
/// Ordering matters: `Red < Blue`, and hit tests check tanks in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Red,
    Blue,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Red => Side::Blue,
            Side::Blue => Side::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Red => "Red",
            Side::Blue => "Blue",
        }
    }
}

// ============================================================================
// TANK COMPONENTS
// ============================================================================

/// Cannon state of a tank. The x coordinate lives in `Position` and never
/// changes; y follows the terrain surface every tick.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tank {
    pub side: Side,
    /// Cannon elevation in degrees (0 = right, 90 = up, 180 = left).
    pub angle: f32,
    pub power: f32,
}

impl Tank {
    pub fn new(side: Side, config: &TankConfig) -> Self {
        Self {
            side,
            angle: config.initial_angle,
            power: config.initial_power,
        }
    }

    /// Rotate the cannon by `delta` degrees, clamped to the configured arc.
    pub fn aim(&mut self, delta: f32, config: &TankConfig) -> SimResult<f32> {
        if !delta.is_finite() {
            return Err(SimError::invalid(format!("aim delta {delta} is not finite")));
        }
        self.angle = (self.angle + delta).clamp(config.min_angle, config.max_angle);
        Ok(self.angle)
    }

    /// Change shot power by `delta`, clamped to the configured range.
    pub fn adjust_power(&mut self, delta: f32, config: &TankConfig) -> SimResult<f32> {
        if !delta.is_finite() {
            return Err(SimError::invalid(format!("power delta {delta} is not finite")));
        }
        self.power = (self.power + delta).clamp(config.min_power, config.max_power);
        Ok(self.power)
    }

    /// Unit direction of the cannon in screen space.
    fn direction(&self) -> (f32, f32) {
        let radians = self.angle.to_radians();
        (radians.cos(), -radians.sin())
    }

    /// Muzzle position for a tank anchored at `anchor`.
    pub fn muzzle(&self, anchor: &Position, config: &TankConfig) -> Position {
        Position::new(anchor.x, anchor.y - config.muzzle_offset)
    }

    /// End of the drawn barrel, for the presentation layer.
    pub fn barrel_tip(&self, anchor: &Position, config: &TankConfig) -> Position {
        let (dx, dy) = self.direction();
        let muzzle = self.muzzle(anchor, config);
        Position::new(
            muzzle.x + dx * config.barrel_length,
            muzzle.y + dy * config.barrel_length,
        )
    }

    /// Build a projectile leaving the muzzle at the current angle and power.
    ///
    /// Does not touch the tank; the single-shot rule is enforced by the turn
    /// state.
    pub fn fire(&self, anchor: &Position, config: &TankConfig) -> ProjectileBundle {
        let (dx, dy) = self.direction();
        ProjectileBundle {
            projectile: Projectile::new(self.side),
            position: self.muzzle(anchor, config),
            velocity: Velocity::new(dx * self.power, dy * self.power),
        }
    }
}

/// Hits a tank can take before it is defeated.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Subtract `amount`. Not clamped; defeat is `current <= 0`.
    pub fn damage(&mut self, amount: i32) {
        self.current -= amount;
    }

    pub fn is_defeated(&self) -> bool {
        self.current <= 0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(3)
    }
}

// ============================================================================
// PROJECTILE
// ============================================================================

/// A shell in flight.
///
/// `active` drops when the shell hits something or leaves the playfield;
/// `resolved` is set once the turn system has accounted for it, after which
/// the entity is despawned.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: Side,
    pub active: bool,
    pub resolved: bool,
}

impl Projectile {
    pub fn new(owner: Side) -> Self {
        Self {
            owner,
            active: true,
            resolved: false,
        }
    }
}

// ============================================================================
// EFFECTS
// ============================================================================

/// Expanding, fading blast ring. Gameplay-inert.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Explosion {
    pub current_radius: f32,
    pub max_radius: f32,
    pub growth: f32,
    /// Opacity, 255 at spawn.
    pub alpha: f32,
    pub active: bool,
}

impl Explosion {
    pub fn new(config: &EffectsConfig) -> Self {
        Self {
            current_radius: 0.0,
            max_radius: config.explosion_max_radius,
            growth: config.explosion_growth,
            alpha: 255.0,
            active: true,
        }
    }

    /// Grow one step, or deactivate if already at full size.
    pub fn update(&mut self) {
        if !self.active {
            return;
        }
        if self.current_radius < self.max_radius {
            self.current_radius += self.growth;
            self.alpha -= 255.0 / (self.max_radius / self.growth);
        } else {
            self.active = false;
        }
    }
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning a tank entity.
#[derive(Bundle)]
pub struct TankBundle {
    pub tank: Tank,
    pub health: Health,
    pub position: Position,
}

impl TankBundle {
    pub fn new(side: Side, x: f32, y: f32, config: &TankConfig) -> Self {
        Self {
            tank: Tank::new(side, config),
            health: Health::new(config.health),
            position: Position::new(x, y),
        }
    }
}

/// Bundle for spawning a projectile entity.
#[derive(Bundle)]
pub struct ProjectileBundle {
    pub projectile: Projectile,
    pub position: Position,
    pub velocity: Velocity,
}

/// Bundle for spawning an explosion entity.
#[derive(Bundle)]
pub struct ExplosionBundle {
    pub explosion: Explosion,
    pub position: Position,
}

impl ExplosionBundle {
    pub fn new(x: f32, y: f32, config: &EffectsConfig) -> Self {
        Self {
            explosion: Explosion::new(config),
            position: Position::new(x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_aim_clamps() {
        let config = TankConfig::default();
        let mut tank = Tank::new(Side::Red, &config);
        assert_eq!(tank.aim(200.0, &config).unwrap(), 180.0);
        assert_eq!(tank.aim(-500.0, &config).unwrap(), 0.0);
        assert_eq!(tank.aim(1.0, &config).unwrap(), 1.0);
    }

    #[test]
    fn test_power_clamps() {
        let config = TankConfig::default();
        let mut tank = Tank::new(Side::Blue, &config);
        assert_eq!(tank.power, 30.0);
        assert_eq!(tank.adjust_power(100.0, &config).unwrap(), 70.0);
        assert_eq!(tank.adjust_power(-100.0, &config).unwrap(), 10.0);
    }

    #[test]
    fn test_non_finite_deltas_rejected() {
        let config = TankConfig::default();
        let mut tank = Tank::new(Side::Red, &config);
        assert!(tank.aim(f32::NAN, &config).is_err());
        assert!(tank.adjust_power(f32::INFINITY, &config).is_err());
        assert_eq!(tank.angle, 45.0);
        assert_eq!(tank.power, 30.0);
    }

    #[test]
    fn test_fire_from_muzzle() {
        let config = TankConfig::default();
        let tank = Tank::new(Side::Red, &config);
        let shot = tank.fire(&Position::new(100.0, 400.0), &config);

        assert_eq!(shot.position, Position::new(100.0, 390.0));
        assert!(approx(shot.velocity.vx, 21.2132));
        assert!(approx(shot.velocity.vy, -21.2132));
        assert_eq!(shot.projectile.owner, Side::Red);
        assert!(shot.projectile.active);
    }

    #[test]
    fn test_fire_straight_left() {
        let config = TankConfig::default();
        let mut tank = Tank::new(Side::Blue, &config);
        tank.aim(135.0, &config).unwrap();
        let shot = tank.fire(&Position::new(700.0, 400.0), &config);
        assert!(approx(shot.velocity.vx, -30.0));
        assert!(shot.velocity.vy.abs() < 1e-3);
    }

    #[test]
    fn test_barrel_tip() {
        let config = TankConfig::default();
        let mut tank = Tank::new(Side::Red, &config);
        tank.aim(45.0, &config).unwrap(); // straight up
        let tip = tank.barrel_tip(&Position::new(100.0, 400.0), &config);
        assert!(approx(tip.x, 100.0));
        assert!(approx(tip.y, 360.0));
    }

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(3);
        health.damage(1);
        assert_eq!(health.current, 2);
        assert!(!health.is_defeated());
        health.damage(2);
        assert!(health.is_defeated());
    }

    #[test]
    fn test_explosion_lifecycle() {
        let mut explosion = Explosion::new(&EffectsConfig::default());
        for _ in 0..10 {
            explosion.update();
            assert!(explosion.active);
        }
        assert!(approx(explosion.current_radius, 50.0));
        assert!(explosion.alpha.abs() < 1e-2);

        explosion.update();
        assert!(!explosion.active);
        assert!(approx(explosion.current_radius, 50.0));
    }

    #[test]
    fn test_side_other() {
        assert_eq!(Side::Red.other(), Side::Blue);
        assert_eq!(Side::Blue.other(), Side::Red);
        assert!(Side::Red < Side::Blue);
    }
}
