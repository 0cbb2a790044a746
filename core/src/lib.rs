#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Chernomap simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! happened. Presentation layers never touch the world directly; they consume
//! a [`FrameSnapshot`] captured after each tick.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of grid columns overlaid on the background, labelled `0..=15`.
pub const GRID_COLUMNS: u32 = 16;

/// Number of grid rows overlaid on the background, labelled `A..=P`.
pub const GRID_ROWS: u32 = 16;

/// Largest population a [`SimulationConfig`] may request.
pub const MAX_POPULATION: usize = 10_000;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock and runs one agent update pass.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Creates fresh agents until the managed count reaches the population size.
    Populate,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a new agent entered the grid.
    AgentSpawned {
        /// Identifier assigned to the new agent.
        agent: AgentId,
        /// Position the agent was placed at.
        position: Position,
        /// Index of the spawn area the position was drawn from.
        area: usize,
    },
    /// Reports that an agent died and was frozen in place.
    AgentDied {
        /// Identifier of the agent that died.
        agent: AgentId,
        /// Final trail position, recorded as a death marker.
        position: Position,
        /// Trigger that caused the death.
        cause: DeathCause,
    },
    /// Reports that a dead agent outlived its timeout and was removed.
    AgentDiscarded {
        /// Identifier of the removed agent.
        agent: AgentId,
    },
    /// Reports that an agent finished a step within reach of a hotspot.
    HotspotReached {
        /// Identifier of the agent that moved.
        agent: AgentId,
        /// Index of the hotspot within the configured hotspot list.
        hotspot: usize,
    },
}

/// Trigger responsible for an agent's death.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeathCause {
    /// The fixed per-tick attrition roll succeeded.
    Random,
    /// The agent came too close to another live agent and lost the roll.
    Collision {
        /// Neighbour that triggered the collision check.
        with: AgentId,
    },
}

/// Unique identifier assigned to an agent. Identifiers are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Real-valued location expressed in grid units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    /// Creates a new position from grid coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate, increasing toward higher column labels.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate, increasing from row `A` toward row `P`.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Reports whether both coordinates are finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Squared Euclidean distance between two positions.
    #[must_use]
    pub fn distance_squared(self, other: Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance(self, other: Position) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Raises the squared distance to `exponent`.
    ///
    /// An exponent of `0.5` yields the Euclidean distance.
    #[must_use]
    pub fn distance_with_exponent(self, other: Position, exponent: f64) -> f64 {
        self.distance_squared(other).powf(exponent)
    }

    /// Moves `step` units along the straight line toward `target`.
    ///
    /// Returns `self` unchanged when both positions coincide.
    #[must_use]
    pub fn step_toward(self, target: Position, step: f64) -> Self {
        let distance = self.distance(target);
        if distance <= 0.0 {
            return self;
        }

        Self {
            x: self.x + step * (target.x - self.x) / distance,
            y: self.y + step * (target.y - self.y) / distance,
        }
    }
}

/// Fixed point of interest that can divert an agent's movement target.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hotspot {
    position: Position,
}

impl Hotspot {
    /// Creates a hotspot anchored at the provided grid coordinates.
    #[must_use]
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            position: Position::new(x, y),
        }
    }

    /// Location of the hotspot.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }
}

/// Global movement target used when no hotspot detour was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Goal {
    position: Position,
}

impl Goal {
    /// Creates a goal anchored at the provided grid coordinates.
    #[must_use]
    pub const fn at(x: f64, y: f64) -> Self {
        Self {
            position: Position::new(x, y),
        }
    }

    /// Location of the goal.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }
}

/// Region description from which new agents draw their starting position.
///
/// Areas are written as `(edge, low, high)` triples. An `edge` of exactly `1`
/// selects the southern band at `y = 1` and spreads agents along `x`; any
/// other value pins agents to the column `x = edge` and spreads them along
/// `y`. The bounds may be given in either order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnArea {
    edge: f64,
    low: f64,
    high: f64,
}

/// Concrete geometry resolved from a [`SpawnArea`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnLayout {
    /// Agents spawn on a horizontal band.
    Band {
        /// Fixed vertical coordinate of the band.
        y: f64,
        /// Lower and upper bound of the horizontal spread.
        x_range: (f64, f64),
    },
    /// Agents spawn on a vertical column.
    Column {
        /// Fixed horizontal coordinate of the column.
        x: f64,
        /// Lower and upper bound of the vertical spread.
        y_range: (f64, f64),
    },
}

impl SpawnArea {
    const SOUTHERN_EDGE: f64 = 1.0;

    /// Creates a spawn area from its raw triple.
    #[must_use]
    pub const fn new(edge: f64, low: f64, high: f64) -> Self {
        Self { edge, low, high }
    }

    /// Resolves the raw triple into band or column geometry.
    #[must_use]
    pub fn layout(&self) -> SpawnLayout {
        let range = (self.low.min(self.high), self.low.max(self.high));
        if self.edge == Self::SOUTHERN_EDGE {
            SpawnLayout::Band {
                y: self.edge,
                x_range: range,
            }
        } else {
            SpawnLayout::Column {
                x: self.edge,
                y_range: range,
            }
        }
    }

    /// Reports whether every coordinate and the spread between the bounds are
    /// finite, which is what uniform sampling across the area requires.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.edge.is_finite()
            && self.low.is_finite()
            && self.high.is_finite()
            && (self.high - self.low).is_finite()
    }

    /// Reports whether `position` lies on the area.
    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        match self.layout() {
            SpawnLayout::Band { y, x_range } => {
                position.y() == y && position.x() >= x_range.0 && position.x() <= x_range.1
            }
            SpawnLayout::Column { x, y_range } => {
                position.x() == x && position.y() >= y_range.0 && position.y() <= y_range.1
            }
        }
    }
}

/// Tuning for the two death triggers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttritionTuning {
    /// Probability that a live agent dies on any given tick.
    pub random_death_probability: f64,
    /// Neighbour distance strictly below which a collision roll happens.
    pub collision_radius: f64,
    /// Probability that a single in-range neighbour kills the agent.
    pub collision_death_probability: f64,
}

impl Default for AttritionTuning {
    fn default() -> Self {
        Self {
            random_death_probability: 0.03,
            collision_radius: 0.2,
            collision_death_probability: 0.5,
        }
    }
}

/// Tuning for goal-seeking motion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Probability that each detour iteration offers another hotspot.
    pub detour_probability: f64,
    /// Lower bound of the uniformly drawn step length.
    pub step_min: f64,
    /// Upper bound of the uniformly drawn step length.
    pub step_max: f64,
    /// Proximity (inclusive) at which a hotspot counts as reached after a step.
    pub hotspot_radius: f64,
    /// Exponent applied to the squared distance in the proximity check.
    ///
    /// `0.7` reproduces the observed reference behaviour; `0.5` is Euclidean.
    pub hotspot_distance_exponent: f64,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            detour_probability: 0.6,
            step_min: 0.5,
            step_max: 0.5,
            hotspot_radius: 0.7,
            hotspot_distance_exponent: 0.7,
        }
    }
}

/// Timing of the dead-pending window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleTuning {
    /// Milliseconds a dead agent is retained, frozen and hidden, before being discarded.
    pub death_timeout_ms: u64,
}

impl LifecycleTuning {
    /// Death timeout as a [`Duration`].
    #[must_use]
    pub const fn death_timeout(&self) -> Duration {
        Duration::from_millis(self.death_timeout_ms)
    }
}

impl Default for LifecycleTuning {
    fn default() -> Self {
        Self {
            death_timeout_ms: 25_000,
        }
    }
}

/// Complete description of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for the world's random stream. `None` asks the caller to pick one.
    pub seed: Option<u64>,
    /// Number of managed agents (alive plus dead-pending) kept at all times.
    pub population: usize,
    /// Points of interest that may divert agents.
    pub hotspots: Vec<Hotspot>,
    /// Areas new agents are placed on.
    pub spawn_areas: Vec<SpawnArea>,
    /// Default movement target.
    pub goal: Goal,
    /// Death trigger tuning.
    pub attrition: AttritionTuning,
    /// Motion tuning.
    pub movement: MovementTuning,
    /// Dead-pending timing.
    pub lifecycle: LifecycleTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            population: 60,
            hotspots: vec![
                Hotspot::at(5.0, 10.0),
                Hotspot::at(9.0, 5.0),
                Hotspot::at(8.0, 9.0),
                Hotspot::at(10.0, 2.0),
                Hotspot::at(8.0, 7.0),
                Hotspot::at(10.0, 15.0),
                Hotspot::at(1.0, 13.0),
                Hotspot::at(1.0, 8.0),
                Hotspot::at(2.0, 10.0),
                Hotspot::at(7.0, 13.0),
            ],
            spawn_areas: vec![
                SpawnArea::new(1.0, 1.0, 7.0),
                SpawnArea::new(12.0, 3.0, 14.0),
                SpawnArea::new(1.0, 9.0, 3.0),
            ],
            goal: Goal::at(1.0, 15.0),
            attrition: AttritionTuning::default(),
            movement: MovementTuning::default(),
            lifecycle: LifecycleTuning::default(),
        }
    }
}

impl SimulationConfig {
    /// Returns a copy of the configuration pinned to `seed`.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks that every tuning value describes a runnable simulation.
    ///
    /// A validated configuration only ever hands finite bounds to the random
    /// stream, so ticking it cannot panic.
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.population == 0 {
            return Err(TuningError::EmptyPopulation);
        }
        if self.population > MAX_POPULATION {
            return Err(TuningError::PopulationTooLarge {
                population: self.population,
                max: MAX_POPULATION,
            });
        }
        if self.spawn_areas.is_empty() {
            return Err(TuningError::NoSpawnAreas);
        }
        if self.hotspots.is_empty() {
            return Err(TuningError::NoHotspots);
        }

        for (index, area) in self.spawn_areas.iter().enumerate() {
            if !area.is_finite() {
                return Err(TuningError::NonFiniteSpawnArea {
                    index,
                    edge: area.edge,
                    low: area.low,
                    high: area.high,
                });
            }
        }
        for (index, hotspot) in self.hotspots.iter().enumerate() {
            let position = hotspot.position();
            if !position.is_finite() {
                return Err(TuningError::NonFiniteHotspot {
                    index,
                    x: position.x(),
                    y: position.y(),
                });
            }
        }
        let goal = self.goal.position();
        if !goal.is_finite() {
            return Err(TuningError::NonFiniteGoal {
                x: goal.x(),
                y: goal.y(),
            });
        }

        check_probability(
            "random_death_probability",
            self.attrition.random_death_probability,
        )?;
        check_probability(
            "collision_death_probability",
            self.attrition.collision_death_probability,
        )?;
        check_probability("detour_probability", self.movement.detour_probability)?;
        check_distance("collision_radius", self.attrition.collision_radius)?;
        check_distance("hotspot_radius", self.movement.hotspot_radius)?;
        check_distance("step_min", self.movement.step_min)?;
        check_distance("step_max", self.movement.step_max)?;
        check_distance(
            "hotspot_distance_exponent",
            self.movement.hotspot_distance_exponent,
        )?;

        if !(self.movement.step_max >= self.movement.step_min) {
            return Err(TuningError::InvertedStepRange {
                min: self.movement.step_min,
                max: self.movement.step_max,
            });
        }

        Ok(())
    }
}

fn check_probability(name: &'static str, value: f64) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::ProbabilityOutOfRange { name, value })
    }
}

fn check_distance(name: &'static str, value: f64) -> Result<(), TuningError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(TuningError::NegativeDistance { name, value })
    }
}

/// Reasons a [`SimulationConfig`] may be rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum TuningError {
    /// The population must contain at least one agent.
    #[error("population must be positive")]
    EmptyPopulation,
    /// At least one spawn area is required to place agents.
    #[error("at least one spawn area is required")]
    NoSpawnAreas,
    /// At least one hotspot is required for detours.
    #[error("at least one hotspot is required")]
    NoHotspots,
    /// A probability fell outside `0.0..=1.0`.
    #[error("{name} must lie within 0.0..=1.0 (received {value})")]
    ProbabilityOutOfRange {
        /// Name of the offending field.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A distance or exponent was negative or not finite.
    #[error("{name} must be a finite, non-negative number (received {value})")]
    NegativeDistance {
        /// Name of the offending field.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// The population exceeds what a single world is allowed to manage.
    #[error("population must not exceed {max} (received {population})")]
    PopulationTooLarge {
        /// Requested population.
        population: usize,
        /// Largest accepted population.
        max: usize,
    },
    /// A spawn area coordinate, or the spread between its bounds, is not finite.
    #[error("spawn area {index} ({edge}, {low}, {high}) must use finite coordinates")]
    NonFiniteSpawnArea {
        /// Position of the area in the configured list.
        index: usize,
        /// Configured edge value.
        edge: f64,
        /// Configured first bound.
        low: f64,
        /// Configured second bound.
        high: f64,
    },
    /// A hotspot coordinate is not finite.
    #[error("hotspot {index} ({x}, {y}) must use finite coordinates")]
    NonFiniteHotspot {
        /// Position of the hotspot in the configured list.
        index: usize,
        /// Configured x coordinate.
        x: f64,
        /// Configured y coordinate.
        y: f64,
    },
    /// A goal coordinate is not finite.
    #[error("goal ({x}, {y}) must use finite coordinates")]
    NonFiniteGoal {
        /// Configured x coordinate.
        x: f64,
        /// Configured y coordinate.
        y: f64,
    },
    /// The step range upper bound lies below its lower bound.
    #[error("step_max ({max}) must not be below step_min ({min})")]
    InvertedStepRange {
        /// Configured lower bound.
        min: f64,
        /// Configured upper bound.
        max: f64,
    },
}

/// Lifecycle stage of an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AgentState {
    /// The agent moves and is drawn.
    Alive,
    /// The agent is frozen and hidden until its timeout elapses.
    DeadPending {
        /// Simulation clock value captured at death.
        since: Duration,
    },
}

/// Immutable representation of a single agent's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentSnapshot {
    /// Unique identifier assigned to the agent.
    pub id: AgentId,
    /// Current position.
    pub position: Position,
    /// Positions visited since spawning, oldest first.
    pub trail: Vec<Position>,
    /// Lifecycle stage.
    pub state: AgentState,
    /// Position recorded at the most recent death, if any.
    pub last_death: Option<Position>,
    /// Index of the spawn area the agent started on.
    pub spawn_area: usize,
}

impl AgentSnapshot {
    /// Reports whether the agent is alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        matches!(self.state, AgentState::Alive)
    }

    /// Simulation clock value captured at death, if the agent died.
    #[must_use]
    pub fn death_time(&self) -> Option<Duration> {
        match self.state {
            AgentState::Alive => None,
            AgentState::DeadPending { since } => Some(since),
        }
    }
}

/// Read-only snapshot describing all managed agents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AgentView {
    snapshots: Vec<AgentSnapshot>,
}

impl AgentView {
    /// Creates a new agent view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AgentSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the agents that may be drawn and moved.
    pub fn alive(&self) -> impl Iterator<Item = &AgentSnapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.is_alive())
    }

    /// Number of managed agents, alive or dead-pending.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no agents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AgentSnapshot> {
        self.snapshots
    }
}

/// Running totals of agent lifecycle transitions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LifecycleLedger {
    /// Agents created since the world was built.
    pub spawned: u64,
    /// Dead agents removed after their timeout.
    pub discarded: u64,
    /// Deaths caused by the random attrition roll.
    pub random_deaths: u64,
    /// Deaths caused by collision rolls.
    pub collision_deaths: u64,
}

impl LifecycleLedger {
    /// Total deaths across both triggers.
    #[must_use]
    pub const fn deaths(&self) -> u64 {
        self.random_deaths + self.collision_deaths
    }
}

/// Everything a presentation layer needs to draw one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    /// Number of ticks applied so far.
    pub tick_index: u64,
    /// Simulation clock value.
    pub clock: Duration,
    /// Managed agents.
    pub agents: AgentView,
    /// Frozen trails of every agent that died during the run.
    pub persistent_trails: Vec<Vec<Position>>,
    /// Final positions of every agent that died during the run.
    pub death_markers: Vec<Position>,
    /// Configured hotspots.
    pub hotspots: Vec<Hotspot>,
    /// Configured goal.
    pub goal: Goal,
}
