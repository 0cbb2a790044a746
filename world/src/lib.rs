#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Chernomap.

mod agent;

use std::time::Duration;

use chernomap_core::{
    AgentId, Command, DeathCause, Event, LifecycleLedger, Position, SimulationConfig, TuningError,
};
use chernomap_system_attrition::{Attrition, Neighbour};
use chernomap_system_movement::Movement;
use chernomap_system_spawning::Spawning;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use self::agent::Agent;

/// Seed used when the configuration leaves the choice to the world.
pub const FALLBACK_SEED: u64 = 0x0c4e_7a0b_1986_0426;

/// Represents the authoritative simulation state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    seed: u64,
    rng: ChaCha8Rng,
    attrition: Attrition,
    movement: Movement,
    spawning: Spawning,
    agents: Vec<Agent>,
    persistent_trails: Vec<Vec<Position>>,
    death_markers: Vec<Position>,
    ledger: LifecycleLedger,
    next_agent_id: u32,
    clock: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a world from `config` and spawns the initial population.
    ///
    /// The initial spawns are only reflected in the ledger; use
    /// [`World::new_with_events`] to observe them as events.
    pub fn new(config: SimulationConfig) -> Result<Self, TuningError> {
        let mut events = Vec::new();
        Self::new_with_events(config, &mut events)
    }

    /// Creates a world from `config`, reporting the initial spawns to `out_events`.
    pub fn new_with_events(
        config: SimulationConfig,
        out_events: &mut Vec<Event>,
    ) -> Result<Self, TuningError> {
        config.validate()?;

        let seed = config.seed.unwrap_or(FALLBACK_SEED);
        let mut world = Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            attrition: Attrition::new(config.attrition.clone()),
            movement: Movement::new(config.movement.clone()),
            spawning: Spawning::new(&config.spawn_areas),
            agents: Vec::with_capacity(config.population),
            persistent_trails: Vec::new(),
            death_markers: Vec::new(),
            ledger: LifecycleLedger::default(),
            next_agent_id: 0,
            clock: Duration::ZERO,
            tick_index: 0,
            config,
        };

        world.replenish(out_events);
        debug!(seed, population = world.agents.len(), "world populated");
        Ok(world)
    }

    fn allocate_id(&mut self) -> AgentId {
        let id = AgentId::new(self.next_agent_id);
        self.next_agent_id = self.next_agent_id.wrapping_add(1);
        id
    }

    fn replenish(&mut self, out_events: &mut Vec<Event>) {
        let deficit = self
            .spawning
            .deficit(self.agents.len(), self.config.population);
        if deficit == 0 {
            return;
        }

        let points = self.spawning.sample_batch(&mut self.rng, deficit);
        for point in points {
            let id = self.allocate_id();
            self.agents.push(Agent::spawn(id, point.position, point.area));
            self.ledger.spawned = self.ledger.spawned.saturating_add(1);
            trace!(agent = id.get(), area = point.area, "agent spawned");
            out_events.push(Event::AgentSpawned {
                agent: id,
                position: point.position,
                area: point.area,
            });
        }
    }

    fn sweep_expired(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        let timeout = self.config.lifecycle.death_timeout();
        let mut discarded = Vec::new();
        self.agents.retain(|agent| {
            if agent.timed_out(now, timeout) {
                discarded.push(agent.id);
                false
            } else {
                true
            }
        });

        for agent in discarded {
            self.ledger.discarded = self.ledger.discarded.saturating_add(1);
            trace!(agent = agent.get(), "agent discarded");
            out_events.push(Event::AgentDiscarded { agent });
        }
    }

    fn judge(&mut self, index: usize) -> Option<DeathCause> {
        let agent = &self.agents[index];
        let neighbours = self
            .agents
            .iter()
            .enumerate()
            .filter(|(other, candidate)| *other != index && candidate.is_alive())
            .map(|(_, candidate)| Neighbour {
                id: candidate.id,
                position: candidate.position,
            });

        self.attrition
            .judge(&mut self.rng, agent.id, agent.position, neighbours)
    }

    fn kill(
        &mut self,
        index: usize,
        cause: DeathCause,
        now: Duration,
        out_events: &mut Vec<Event>,
    ) {
        let agent = &mut self.agents[index];
        let marker = agent.die(now);
        self.persistent_trails.push(agent.trail.clone());
        self.death_markers.push(marker);

        match cause {
            DeathCause::Random => {
                self.ledger.random_deaths = self.ledger.random_deaths.saturating_add(1);
            }
            DeathCause::Collision { .. } => {
                self.ledger.collision_deaths = self.ledger.collision_deaths.saturating_add(1);
            }
        }

        trace!(agent = agent.id.get(), ?cause, "agent died");
        out_events.push(Event::AgentDied {
            agent: agent.id,
            position: marker,
            cause,
        });
    }

    fn advance_agent(&mut self, index: usize, out_events: &mut Vec<Event>) {
        let agent = &mut self.agents[index];
        let outcome = self.movement.step(
            &mut self.rng,
            agent.position,
            &self.config.hotspots,
            self.config.goal,
        );
        agent.move_to(outcome.position);

        for hotspot in outcome.reached {
            out_events.push(Event::HotspotReached {
                agent: agent.id,
                hotspot,
            });
        }
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        let now = self.clock;
        self.sweep_expired(now, out_events);

        for index in 0..self.agents.len() {
            if !self.agents[index].is_alive() {
                continue;
            }

            if let Some(cause) = self.judge(index) {
                self.kill(index, cause, now, out_events);
            }

            // Dead-pending agents stay frozen until discarded, including on their death tick.
            if self.agents[index].is_alive() {
                self.advance_agent(index, out_events);
            }
        }

        self.replenish(out_events);

        debug!(
            tick = self.tick_index,
            alive = self.agents.iter().filter(|agent| agent.is_alive()).count(),
            managed = self.agents.len(),
            deaths = self.ledger.deaths(),
            "tick applied"
        );
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::Populate => world.replenish(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use chernomap_core::{
        AgentView, FrameSnapshot, Goal, Hotspot, LifecycleLedger, Position, SimulationConfig,
    };

    use super::World;

    /// Captures everything a presentation layer needs to draw the current state.
    #[must_use]
    pub fn snapshot(world: &World) -> FrameSnapshot {
        FrameSnapshot {
            tick_index: world.tick_index,
            clock: world.clock,
            agents: agent_view(world),
            persistent_trails: world.persistent_trails.clone(),
            death_markers: world.death_markers.clone(),
            hotspots: world.config.hotspots.clone(),
            goal: world.config.goal,
        }
    }

    /// Captures a read-only view of the managed agents.
    #[must_use]
    pub fn agent_view(world: &World) -> AgentView {
        AgentView::from_snapshots(world.agents.iter().map(|agent| agent.snapshot()).collect())
    }

    /// Number of managed agents, alive or dead-pending.
    #[must_use]
    pub fn population(world: &World) -> usize {
        world.agents.len()
    }

    /// Final positions of every agent that died so far.
    #[must_use]
    pub fn death_markers(world: &World) -> &[Position] {
        &world.death_markers
    }

    /// Frozen trails of every agent that died so far.
    #[must_use]
    pub fn persistent_trails(world: &World) -> &[Vec<Position>] {
        &world.persistent_trails
    }

    /// Running lifecycle counters.
    #[must_use]
    pub fn ledger(world: &World) -> LifecycleLedger {
        world.ledger
    }

    /// Current simulation clock value.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Configured hotspots.
    #[must_use]
    pub fn hotspots(world: &World) -> &[Hotspot] {
        &world.config.hotspots
    }

    /// Configured goal.
    #[must_use]
    pub fn goal(world: &World) -> Goal {
        world.config.goal
    }

    /// Seed the random stream was initialised with.
    #[must_use]
    pub fn seed(world: &World) -> u64 {
        world.seed
    }

    /// Configuration the world was built from.
    #[must_use]
    pub fn config(world: &World) -> &SimulationConfig {
        &world.config
    }
}
