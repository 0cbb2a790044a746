#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Attrition system deciding whether a live agent dies on the current tick.
//!
//! Two triggers exist. The random trigger rolls once per tick for every live
//! agent. The collision trigger walks the other live agents in order and
//! rolls once for each neighbour strictly inside the collision radius; the
//! first successful roll kills the agent and stops the walk.

use chernomap_core::{AgentId, AttritionTuning, DeathCause, Position};
use rand::Rng;

/// Live agent considered during the collision walk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    /// Identifier of the neighbouring agent.
    pub id: AgentId,
    /// Current position of the neighbouring agent.
    pub position: Position,
}

/// Pure system that rolls the death triggers.
#[derive(Clone, Debug)]
pub struct Attrition {
    tuning: AttritionTuning,
}

impl Attrition {
    /// Creates a new attrition system using the supplied tuning.
    #[must_use]
    pub fn new(tuning: AttritionTuning) -> Self {
        Self { tuning }
    }

    /// Runs both triggers for one agent, random first.
    ///
    /// `neighbours` must contain only live agents other than `agent`.
    pub fn judge<R, I>(
        &self,
        rng: &mut R,
        agent: AgentId,
        position: Position,
        neighbours: I,
    ) -> Option<DeathCause>
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = Neighbour>,
    {
        if self.roll_random(rng) {
            return Some(DeathCause::Random);
        }

        self.roll_collision(rng, agent, position, neighbours)
            .map(|with| DeathCause::Collision { with })
    }

    /// Rolls the fixed per-tick attrition probability.
    pub fn roll_random<R>(&self, rng: &mut R) -> bool
    where
        R: Rng + ?Sized,
    {
        rng.gen::<f64>() < self.tuning.random_death_probability
    }

    /// Walks the neighbours and returns the one whose roll killed the agent.
    ///
    /// Randomness is only consumed for neighbours inside the radius.
    pub fn roll_collision<R, I>(
        &self,
        rng: &mut R,
        agent: AgentId,
        position: Position,
        neighbours: I,
    ) -> Option<AgentId>
    where
        R: Rng + ?Sized,
        I: IntoIterator<Item = Neighbour>,
    {
        neighbours
            .into_iter()
            .filter(|neighbour| neighbour.id != agent)
            .filter(|neighbour| self.is_close(position, neighbour.position))
            .find(|_| rng.gen::<f64>() < self.tuning.collision_death_probability)
            .map(|neighbour| neighbour.id)
    }

    /// Reports whether two positions are strictly inside the collision radius.
    #[must_use]
    pub fn is_close(&self, a: Position, b: Position) -> bool {
        a.distance(b) < self.tuning.collision_radius
    }
}
