//! Simulation events reported to the presentation layer.
//!
//! Systems push into the [`EventBuffer`] resource; `MatchWorld::advance`
//! drains it once per tick. The presentation layer reacts to these (sounds,
//! screen transitions) without inspecting the simulation state.

use crate::components::Side;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Something that happened during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    ShotFired { side: Side, angle: f32, power: f32 },
    /// Shell struck the ground and left a crater.
    TerrainImpact { x: f32, y: f32 },
    TankHit { side: Side, x: f32, y: f32, health: i32 },
    /// Shell left the playfield without hitting anything.
    ProjectileLost { side: Side },
    WindChanged { previous: f32, current: f32 },
    TurnChanged { active: Side, turn: u32 },
    MatchOver { winner: Side },
    /// A command was ignored; the tick ran without it.
    CommandRejected { reason: String },
}

impl SimEvent {
    /// True for events caused by a shell hitting the ground or a tank.
    pub fn is_impact(&self) -> bool {
        matches!(self, SimEvent::TerrainImpact { .. } | SimEvent::TankHit { .. })
    }
}

/// Per-tick event queue.
#[derive(Resource, Debug, Default)]
pub struct EventBuffer {
    events: Vec<SimEvent>,
}

impl EventBuffer {
    pub fn push(&mut self, event: SimEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimEvent> {
        self.events.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_buffer() {
        let mut buffer = EventBuffer::default();
        buffer.push(SimEvent::MatchOver { winner: Side::Red });
        buffer.push(SimEvent::TurnChanged { active: Side::Blue, turn: 1 });
        assert_eq!(buffer.iter().count(), 2);

        let events = buffer.drain();
        assert_eq!(events.len(), 2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_event_json_is_tagged() {
        let json = serde_json::to_string(&SimEvent::TankHit {
            side: Side::Blue,
            x: 700.0,
            y: 400.0,
            health: 2,
        })
        .unwrap();
        assert!(json.contains(r#""type":"TankHit""#));
        assert!(json.contains(r#""side":"Blue""#));
    }

    #[test]
    fn test_is_impact() {
        assert!(SimEvent::TerrainImpact { x: 0.0, y: 0.0 }.is_impact());
        assert!(!SimEvent::ProjectileLost { side: Side::Red }.is_impact());
    }
}
