//! Turn coordinator.
//!
//! Phase machine driven by two systems:
//!
//! - `impact_system` moves `ProjectileInFlight` to `Resolving` and records
//!   how the shot ended.
//! - [`turn_resolution_system`] consumes that record and either hands the
//!   turn to the other side or ends the match.
//!
//! ```text
//! AwaitingShot(active) -> ProjectileInFlight -> Resolving -> AwaitingShot(other)
//!                                                        \-> MatchOver(winner)
//! ```

use crate::components::*;
use crate::config::MatchConfig;
use crate::events::{EventBuffer, SimEvent};
use crate::systems::clock::DeltaTime;
use crate::wind::{Difficulty, MatchRng, Wind, WindPolicy};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Where the match is in the shot cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Active tank may aim and fire.
    AwaitingShot,
    ProjectileInFlight,
    /// Shot ended this tick; handoff pending.
    Resolving,
    MatchOver { winner: Side },
}

/// How a shot ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShotResolution {
    TerrainImpact { x: f32, y: f32 },
    TankHit { side: Side },
    /// Left the playfield without touching anything.
    Miss,
}

/// Result of the match so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Ongoing,
    RedWins,
    BlueWins,
}

impl From<Side> for MatchOutcome {
    fn from(winner: Side) -> Self {
        match winner {
            Side::Red => MatchOutcome::RedWins,
            Side::Blue => MatchOutcome::BlueWins,
        }
    }
}

/// Turn bookkeeping resource.
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct TurnState {
    pub phase: TurnPhase,
    pub active: Side,
    /// Completed handoffs since the match started.
    pub turn_counter: u32,
    /// Seconds since the current turn began.
    pub turn_elapsed: f32,
    pub difficulty: Difficulty,
    /// Set by the impact system, consumed by the resolution system.
    pub pending: Option<ShotResolution>,
    /// True on ticks where the active cannon was rotated.
    pub cannon_moving: bool,
}

impl TurnState {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            phase: TurnPhase::AwaitingShot,
            active: Side::Red,
            turn_counter: 0,
            turn_elapsed: 0.0,
            difficulty,
            pending: None,
            cannon_moving: false,
        }
    }

    pub fn can_fire(&self) -> bool {
        self.phase == TurnPhase::AwaitingShot
    }

    pub fn begin_flight(&mut self) {
        self.phase = TurnPhase::ProjectileInFlight;
    }

    /// Record how the shot ended. Ignored unless a shot is in flight, so a
    /// shell can only resolve once.
    pub fn resolve(&mut self, resolution: ShotResolution) -> bool {
        if self.phase != TurnPhase::ProjectileInFlight {
            return false;
        }
        self.pending = Some(resolution);
        self.phase = TurnPhase::Resolving;
        true
    }

    pub fn winner(&self) -> Option<Side> {
        match self.phase {
            TurnPhase::MatchOver { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn outcome(&self) -> MatchOutcome {
        self.winner().map_or(MatchOutcome::Ongoing, MatchOutcome::from)
    }

    pub fn is_over(&self) -> bool {
        self.winner().is_some()
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

/// Advance the per-turn timer.
pub fn turn_clock_system(dt: Res<DeltaTime>, mut turn: ResMut<TurnState>) {
    if !turn.is_over() {
        turn.turn_elapsed += dt.0;
    }
}

/// Finish a resolved shot: end the match or hand the turn over.
pub fn turn_resolution_system(
    config: Res<MatchConfig>,
    mut turn: ResMut<TurnState>,
    mut wind: ResMut<Wind>,
    mut rng: ResMut<MatchRng>,
    mut events: ResMut<EventBuffer>,
    tanks: Query<(&Tank, &Health)>,
) {
    if turn.phase != TurnPhase::Resolving {
        return;
    }
    let resolution = turn.pending.take();

    let mut defeated: Vec<Side> = tanks
        .iter()
        .filter(|(_, health)| health.is_defeated())
        .map(|(tank, _)| tank.side)
        .collect();
    defeated.sort();

    if let Some(&loser) = defeated.first() {
        let winner = loser.other();
        turn.phase = TurnPhase::MatchOver { winner };
        events.push(SimEvent::MatchOver { winner });
        info!(winner = winner.as_str(), turn = turn.turn_counter, "match over");
        return;
    }

    turn.active = turn.active.other();
    turn.turn_counter += 1;
    turn.turn_elapsed = 0.0;
    turn.phase = TurnPhase::AwaitingShot;

    let policy = WindPolicy::new(turn.difficulty, config.wind_cadence);
    let previous = wind.0;
    wind.0 = policy.next(turn.turn_counter, previous, &mut rng.0);
    if wind.0 != previous {
        debug!(previous, current = wind.0, turn = turn.turn_counter, "wind changed");
        events.push(SimEvent::WindChanged {
            previous,
            current: wind.0,
        });
    }

    events.push(SimEvent::TurnChanged {
        active: turn.active,
        turn: turn.turn_counter,
    });
    info!(
        active = turn.active.as_str(),
        turn = turn.turn_counter,
        ?resolution,
        "turn handed over"
    );
}
