//! Per-agent record owned by the world.

use std::time::Duration;

use chernomap_core::{AgentId, AgentSnapshot, AgentState, Position};

/// Mutable agent record. Identity never changes; respawning creates a new record.
#[derive(Clone, Debug)]
pub(crate) struct Agent {
    pub(crate) id: AgentId,
    pub(crate) position: Position,
    pub(crate) trail: Vec<Position>,
    death_time: Option<Duration>,
    last_death: Option<Position>,
    spawn_area: usize,
}

impl Agent {
    pub(crate) fn spawn(id: AgentId, position: Position, spawn_area: usize) -> Self {
        Self {
            id,
            position,
            trail: vec![position],
            death_time: None,
            last_death: None,
            spawn_area,
        }
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.death_time.is_none()
    }

    pub(crate) fn timed_out(&self, now: Duration, timeout: Duration) -> bool {
        self.death_time
            .map_or(false, |death| now.saturating_sub(death) >= timeout)
    }

    pub(crate) fn move_to(&mut self, position: Position) {
        debug_assert!(self.is_alive(), "dead agents are frozen");
        self.position = position;
        self.trail.push(position);
    }

    /// Freezes the agent and returns its death marker.
    pub(crate) fn die(&mut self, now: Duration) -> Position {
        debug_assert!(self.is_alive(), "agents die once");
        self.death_time = Some(now);
        self.last_death = Some(self.position);
        self.trail.last().copied().unwrap_or(self.position)
    }

    pub(crate) fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            position: self.position,
            trail: self.trail.clone(),
            state: match self.death_time {
                None => AgentState::Alive,
                Some(since) => AgentState::DeadPending { since },
            },
            last_death: self.last_death,
            spawn_area: self.spawn_area,
        }
    }
}
