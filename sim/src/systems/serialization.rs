//! Serialization utilities for match state.

use crate::events::SimEvent;
use crate::terrain::TerrainSnapshot;
use crate::world::Snapshot;

/// Serialize a snapshot to JSON bytes.
pub fn snapshot_to_json(snapshot: &Snapshot) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(snapshot)
}

/// Serialize a snapshot to a JSON string.
pub fn snapshot_to_json_string(snapshot: &Snapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

/// Deserialize a snapshot from JSON bytes.
pub fn snapshot_from_json(data: &[u8]) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_slice(data)
}

/// Deserialize a snapshot from a JSON string.
pub fn snapshot_from_json_string(data: &str) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_str(data)
}

pub fn terrain_to_json_string(terrain: &TerrainSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(terrain)
}

/// Serialize a tick's events as a JSON array.
pub fn events_to_json_string(events: &[SimEvent]) -> Result<String, serde_json::Error> {
    serde_json::to_string(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Side;
    use crate::systems::turn::{MatchOutcome, TurnPhase};
    use crate::terrain::Crater;
    use crate::wind::Difficulty;
    use crate::world::{ProjectileSnapshot, TankSnapshot};

    fn sample() -> Snapshot {
        Snapshot {
            tick: 42,
            time: 0.7,
            phase: TurnPhase::ProjectileInFlight,
            active: Side::Red,
            turn_counter: 4,
            turn_elapsed: 1.25,
            wind: -0.5,
            difficulty: Difficulty::Weak,
            outcome: MatchOutcome::Ongoing,
            tanks: vec![TankSnapshot {
                side: Side::Red,
                x: 100.0,
                y: 420.0,
                angle: 60.0,
                power: 42.0,
                health: 2,
                health_max: 3,
                barrel_tip_x: 115.0,
                barrel_tip_y: 384.0,
            }],
            projectile: Some(ProjectileSnapshot {
                owner: Side::Red,
                x: 250.0,
                y: 200.0,
                vx: 12.0,
                vy: -3.0,
                active: true,
            }),
            explosions: Vec::new(),
            indicator: None,
            cannon_moving: false,
            new_craters: vec![Crater {
                x: 1.0,
                y: 450.0,
                radius: 15.0,
                depth: 19.0,
            }],
            terrain: Some(TerrainSnapshot {
                width: 3,
                screen_height: 600.0,
                heights: vec![20.0, 150.0, 20.0],
                craters: Vec::new(),
            }),
            terrain_dirty: true,
        }
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let snapshot = sample();
        let bytes = snapshot_to_json(&snapshot).unwrap();
        assert_eq!(snapshot_from_json(&bytes).unwrap(), snapshot);

        let text = snapshot_to_json_string(&snapshot).unwrap();
        assert!(text.contains(r#""phase":"ProjectileInFlight""#));
        assert_eq!(snapshot_from_json_string(&text).unwrap(), snapshot);
    }

    #[test]
    fn test_match_over_phase_json() {
        let mut snapshot = sample();
        snapshot.phase = TurnPhase::MatchOver { winner: Side::Blue };
        snapshot.outcome = MatchOutcome::BlueWins;
        let text = snapshot_to_json_string(&snapshot).unwrap();
        assert!(text.contains(r#""MatchOver":{"winner":"Blue"}"#));
        assert!(text.contains(r#""outcome":"BlueWins""#));
    }

    #[test]
    fn test_events_array() {
        let json = events_to_json_string(&[
            SimEvent::ShotFired {
                side: Side::Red,
                angle: 45.0,
                power: 30.0,
            },
            SimEvent::ProjectileLost { side: Side::Red },
        ])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert_eq!(value[0]["type"], "ShotFired");
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(snapshot_from_json_string("{\"tick\": 1}").is_err());
    }
}
