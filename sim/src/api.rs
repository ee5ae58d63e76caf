//! Public API for the match.
//!
//! [`MatchWorld`] is the only type a presentation layer needs: it owns the
//! ECS world and schedule, applies per-frame input, runs one tick and hands
//! back a snapshot plus the events of that tick.
//!
//! ## Tick
//!
//! `advance(input, dt)` runs exactly one tick regardless of `dt`; `dt` only
//! drives the turn timer and the turn arrow. Shell physics is
//! per tick, matching a renderer that calls `advance` once per frame.

use crate::components::*;
use crate::config::MatchConfig;
use crate::error::{SimError, SimResult};
use crate::events::{EventBuffer, SimEvent};
use crate::input::TickInput;
use crate::systems::*;
use crate::terrain::{Terrain, TerrainSnapshot};
use crate::wind::{Difficulty, MatchRng, Wind, WindPolicy};
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use bevy_ecs::schedule::ExecutorKind;
use rand::Rng;
use tracing::{debug, info};

/// Result of one [`MatchWorld::advance`] call.
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub snapshot: Snapshot,
    pub events: Vec<SimEvent>,
}

/// The match container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Starting, restarting and resetting a match
/// - Advancing one tick with player input
/// - Issuing aim/power/fire commands directly
/// - Extracting state snapshots
pub struct MatchWorld {
    world: World,
    schedule: Schedule,
    config: MatchConfig,
    difficulty: Difficulty,
    seed: u64,
    time: f32,
    /// Set when a crater changed the heightmap since the last snapshot.
    terrain_dirty: bool,
}

impl MatchWorld {
    /// Start a match with default settings and a random seed.
    pub fn start_match(difficulty: Difficulty) -> SimResult<Self> {
        Self::start_match_seeded(difficulty, rand::random())
    }

    /// Start a reproducible match with default settings.
    pub fn start_match_seeded(difficulty: Difficulty, seed: u64) -> SimResult<Self> {
        Self::with_config(MatchConfig::default(), difficulty, seed)
    }

    /// Start a match with custom configuration and generated terrain.
    pub fn with_config(config: MatchConfig, difficulty: Difficulty, seed: u64) -> SimResult<Self> {
        config.validate()?;
        let mut rng = MatchRng::from_seed(seed);
        let terrain = Terrain::generate_random(
            config.playfield.width,
            config.playfield.height,
            &config.terrain,
            &mut rng.0,
        )?;
        Ok(Self::build(config, difficulty, seed, terrain, rng))
    }

    /// Start a match on a given heightmap. The seed still drives wind.
    pub fn with_terrain(
        config: MatchConfig,
        difficulty: Difficulty,
        terrain: Terrain,
        seed: u64,
    ) -> SimResult<Self> {
        config.validate()?;
        if terrain.width() != config.playfield.width {
            return Err(SimError::invalid(format!(
                "terrain has {} columns, playfield is {} wide",
                terrain.width(),
                config.playfield.width
            )));
        }
        if terrain.screen_height() != config.playfield.height {
            return Err(SimError::invalid("terrain height does not match the playfield"));
        }
        Ok(Self::build(config, difficulty, seed, terrain, MatchRng::from_seed(seed)))
    }

    fn build(
        config: MatchConfig,
        difficulty: Difficulty,
        seed: u64,
        terrain: Terrain,
        mut rng: MatchRng,
    ) -> Self {
        let mut world = World::new();

        let wind = WindPolicy::new(difficulty, config.wind_cadence).initial(&mut rng.0);

        for (side, x) in [(Side::Red, config.red_x()), (Side::Blue, config.blue_x())] {
            let y = terrain
                .column_at(x)
                .map(|column| terrain.surface_y(column))
                .unwrap_or(config.playfield.height);
            world.spawn(TankBundle::new(side, x, y, &config.tank));
        }

        // Core resources
        world.insert_resource(DeltaTime(config.fixed_timestep));
        world.insert_resource(SimTick(0));
        world.insert_resource(Wind(wind));
        world.insert_resource(rng);
        world.insert_resource(TurnState::new(difficulty));
        world.insert_resource(TurnIndicator::default());
        world.insert_resource(EventBuffer::default());
        world.insert_resource(terrain);
        world.insert_resource(config.clone());

        // One chained pass; commands are flushed between steps.
        let mut schedule = Schedule::default();
        schedule.set_executor_kind(ExecutorKind::SingleThreaded);
        schedule.add_systems(
            (
                turn_clock_system,
                tank_grounding_system,
                projectile_motion_system,
                impact_system,
                explosion_system,
                turn_resolution_system,
                turn_indicator_system,
                cleanup_system,
            )
                .chain(),
        );

        info!(?difficulty, seed, wind, "match started");

        Self {
            world,
            schedule,
            config,
            difficulty,
            seed,
            time: 0.0,
            terrain_dirty: true, // Initial terrain needs to be sent
        }
    }

    /// Apply `input`, run one tick and report what happened.
    ///
    /// Rejected commands do not stop the tick; they show up as
    /// [`SimEvent::CommandRejected`]. A non-finite or negative `dt` is
    /// replaced by the configured fixed timestep.
    pub fn advance(&mut self, input: TickInput, dt: f32) -> TickOutput {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            self.config.fixed_timestep
        };

        self.apply_input(input);

        if let Some(mut dt_res) = self.world.get_resource_mut::<DeltaTime>() {
            dt_res.0 = dt;
        }
        if let Some(mut tick_res) = self.world.get_resource_mut::<SimTick>() {
            tick_res.increment();
        }

        self.schedule.run(&mut self.world);
        self.time += dt;

        let events = self
            .world
            .get_resource_mut::<EventBuffer>()
            .map(|mut buffer| buffer.drain())
            .unwrap_or_default();

        TickOutput {
            snapshot: self.snapshot(),
            events,
        }
    }

    fn apply_input(&mut self, input: TickInput) {
        if let Some(mut turn) = self.world.get_resource_mut::<TurnState>() {
            turn.cannon_moving = false;
        }
        if input.is_idle() {
            return;
        }
        if input.aim_delta != 0.0 {
            if let Err(err) = self.aim(input.aim_delta) {
                self.reject(err);
            }
        }
        if input.power_delta != 0.0 {
            if let Err(err) = self.adjust_power(input.power_delta) {
                self.reject(err);
            }
        }
        if input.fire {
            if let Err(err) = self.fire() {
                self.reject(err);
            }
        }
    }

    fn reject(&mut self, err: SimError) {
        debug!(%err, "command rejected");
        self.push_event(SimEvent::CommandRejected {
            reason: err.to_string(),
        });
    }

    fn push_event(&mut self, event: SimEvent) {
        if let Some(mut buffer) = self.world.get_resource_mut::<EventBuffer>() {
            buffer.push(event);
        }
    }

    fn ensure_playable(&self) -> SimResult<()> {
        match self.winner() {
            Some(winner) => Err(SimError::MatchOver { winner }),
            None => Ok(()),
        }
    }

    /// Run `f` on the tank whose turn it is.
    fn with_active_tank<T>(
        &mut self,
        f: impl FnOnce(&mut Tank, &Position) -> SimResult<T>,
    ) -> SimResult<T> {
        let active = self.active_side();
        let mut query = self.world.query::<(&mut Tank, &Position)>();
        let (mut tank, pos) = query
            .iter_mut(&mut self.world)
            .find(|(tank, _)| tank.side == active)
            .ok_or_else(|| SimError::invalid(format!("no {} tank in the match", active.as_str())))?;
        f(&mut tank, pos)
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    /// Rotate the active cannon. Returns the new angle.
    pub fn aim(&mut self, delta: f32) -> SimResult<f32> {
        self.ensure_playable()?;
        let config = self.config.tank;
        let angle = self.with_active_tank(|tank, _| tank.aim(delta, &config))?;
        if let Some(mut turn) = self.world.get_resource_mut::<TurnState>() {
            turn.cannon_moving = true;
        }
        Ok(angle)
    }

    /// Change the active tank's power. Returns the new power.
    pub fn adjust_power(&mut self, delta: f32) -> SimResult<f32> {
        self.ensure_playable()?;
        let config = self.config.tank;
        self.with_active_tank(|tank, _| tank.adjust_power(delta, &config))
    }

    /// Fire the active tank. Only one shell may be in flight.
    pub fn fire(&mut self) -> SimResult<()> {
        self.ensure_playable()?;
        if !self.phase_allows_fire() || self.live_projectiles() > 0 {
            return Err(SimError::invalid("a shell is already in flight"));
        }

        let config = self.config.tank;
        let (shot, side, angle, power) =
            self.with_active_tank(|tank, pos| Ok((tank.fire(pos, &config), tank.side, tank.angle, tank.power)))?;
        self.world.spawn(shot);
        if let Some(mut turn) = self.world.get_resource_mut::<TurnState>() {
            turn.begin_flight();
        }
        self.push_event(SimEvent::ShotFired { side, angle, power });
        info!(side = side.as_str(), angle, power, "shot fired");
        Ok(())
    }

    fn phase_allows_fire(&self) -> bool {
        self.world
            .get_resource::<TurnState>()
            .is_some_and(TurnState::can_fire)
    }

    fn live_projectiles(&mut self) -> usize {
        let mut query = self.world.query::<&Projectile>();
        query.iter(&self.world).filter(|p| !p.resolved).count()
    }

    // ------------------------------------------------------------------------
    // Match lifecycle
    // ------------------------------------------------------------------------

    /// New terrain and tanks, same settings. The seed comes from the current
    /// match, so a seeded match replays its rematches too.
    pub fn rematch(&mut self) -> SimResult<()> {
        let seed = self.next_seed();
        *self = Self::with_config(self.config.clone(), self.difficulty, seed)?;
        info!(seed, "rematch");
        Ok(())
    }

    /// Discard the match, in any phase, and start over at `difficulty`.
    pub fn reset(&mut self, difficulty: Difficulty) -> SimResult<()> {
        let seed = self.next_seed();
        *self = Self::with_config(self.config.clone(), difficulty, seed)?;
        Ok(())
    }

    fn next_seed(&mut self) -> u64 {
        match self.world.get_resource_mut::<MatchRng>() {
            Some(mut rng) => rng.0.random(),
            None => self.seed.wrapping_add(1),
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Get a snapshot of the current match state.
    ///
    /// Craters made since the previous snapshot are handed over exactly once.
    /// The full heightmap rides along only when it changed.
    pub fn snapshot(&mut self) -> Snapshot {
        let mut snapshot = Snapshot::from_world(&mut self.world, self.time);
        if let Some(mut terrain) = self.world.get_resource_mut::<Terrain>() {
            snapshot.new_craters = terrain.take_new_craters();
        }
        if !snapshot.new_craters.is_empty() {
            self.terrain_dirty = true;
        }
        if self.terrain_dirty {
            snapshot.terrain = self
                .world
                .get_resource::<Terrain>()
                .map(TerrainSnapshot::from_terrain);
        }
        snapshot.terrain_dirty = self.terrain_dirty;
        self.terrain_dirty = false;
        snapshot
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Full heightmap and crater list.
    pub fn terrain_snapshot(&self) -> TerrainSnapshot {
        self.world
            .get_resource::<Terrain>()
            .map(TerrainSnapshot::from_terrain)
            .unwrap_or_default()
    }

    /// Get terrain snapshot as JSON.
    pub fn terrain_snapshot_json(&self) -> String {
        terrain_to_json_string(&self.terrain_snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn terrain(&self) -> Option<&Terrain> {
        self.world.get_resource::<Terrain>()
    }

    pub fn turn_state(&self) -> Option<&TurnState> {
        self.world.get_resource::<TurnState>()
    }

    pub fn phase(&self) -> TurnPhase {
        self.turn_state()
            .map(|turn| turn.phase)
            .unwrap_or(TurnPhase::AwaitingShot)
    }

    pub fn active_side(&self) -> Side {
        self.turn_state().map(|turn| turn.active).unwrap_or(Side::Red)
    }

    pub fn winner(&self) -> Option<Side> {
        self.turn_state().and_then(TurnState::winner)
    }

    pub fn outcome(&self) -> MatchOutcome {
        self.turn_state()
            .map(TurnState::outcome)
            .unwrap_or(MatchOutcome::Ongoing)
    }

    pub fn wind(&self) -> f32 {
        self.world.get_resource::<Wind>().map(|w| w.0).unwrap_or(0.0)
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Seed this match was started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.world.get_resource::<SimTick>().map_or(0, |t| t.0)
    }

    /// Get the elapsed match time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// Direct access to the ECS world, for tools and tests.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
