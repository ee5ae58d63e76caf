//! Over The Top - Simulation Core
//!
//! A deterministic, turn-based artillery duel: two tanks on destructible
//! terrain trade shells under wind until one is destroyed.
//! Uses `bevy_ecs` for the entity-component-system architecture.
//!
//! The crate has no rendering, audio or input handling. A presentation layer
//! drives [`MatchWorld::advance`] once per frame and draws the returned
//! [`Snapshot`].

pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod flat_buffer;
pub mod input;
pub mod systems;
pub mod terrain;
pub mod wind;
pub mod world;

pub use api::{MatchWorld, TickOutput};
pub use components::*;
pub use config::MatchConfig;
pub use error::{SimError, SimResult};
pub use events::SimEvent;
pub use input::TickInput;
pub use systems::*;
pub use terrain::{Crater, Terrain, TerrainSnapshot};
pub use wind::{Difficulty, Wind};
pub use world::Snapshot;
