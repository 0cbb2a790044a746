use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    time::Duration,
};

use chernomap_core::{
    AgentId, AgentSnapshot, AgentState, Command, DeathCause, Event, Position, SimulationConfig,
};
use chernomap_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_outcome() {
    let first = replay(0x0c4e_0001, scripted_commands());
    let second = replay(0x0c4e_0001, scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[test]
fn different_seeds_diverge() {
    let first = replay(1, scripted_commands());
    let second = replay(2, scripted_commands());

    assert_ne!(first.fingerprint(), second.fingerprint());
}

#[test]
fn initial_spawns_open_the_event_log() {
    let outcome = replay(9, scripted_commands());

    for (index, record) in outcome.events.iter().take(60).enumerate() {
        match record {
            EventRecord::AgentSpawned { agent, .. } => {
                assert_eq!(*agent, AgentId::new(index as u32));
            }
            other => panic!("unexpected opening event {other:?}"),
        }
    }
    assert!(matches!(outcome.events[60], EventRecord::TimeAdvanced { .. }));
}

#[test]
fn variable_frame_deltas_do_not_break_determinism() {
    let jittery = || {
        (0..150)
            .map(|index| Command::Tick {
                dt: Duration::from_millis(250 + (index % 7) * 20),
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(replay(42, jittery()), replay(42, jittery()));
}

fn replay(seed: u64, commands: Vec<Command>) -> ReplayOutcome {
    let config = SimulationConfig::default().with_seed(seed);
    let mut events = Vec::new();
    let mut world = World::new_with_events(config, &mut events).expect("valid");
    let mut log: Vec<EventRecord> = events.iter().map(EventRecord::from).collect();

    for command in commands {
        let mut events = Vec::new();
        world::apply(&mut world, command, &mut events);
        log.extend(events.iter().map(EventRecord::from));
    }

    let agents = query::agent_view(&world)
        .into_vec()
        .into_iter()
        .map(AgentRecord::from)
        .collect();
    let markers = query::death_markers(&world)
        .iter()
        .map(|position| bits(*position))
        .collect();

    ReplayOutcome {
        agents,
        markers,
        events: log,
    }
}

fn scripted_commands() -> Vec<Command> {
    (0..200)
        .map(|_| Command::Tick {
            dt: Duration::from_millis(300),
        })
        .collect()
}

fn bits(position: Position) -> (u64, u64) {
    (position.x().to_bits(), position.y().to_bits())
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ReplayOutcome {
    agents: Vec<AgentRecord>,
    markers: Vec<(u64, u64)>,
    events: Vec<EventRecord>,
}

impl ReplayOutcome {
    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct AgentRecord {
    id: AgentId,
    position: (u64, u64),
    trail: Vec<(u64, u64)>,
    death_micros: Option<u128>,
}

impl From<AgentSnapshot> for AgentRecord {
    fn from(snapshot: AgentSnapshot) -> Self {
        Self {
            id: snapshot.id,
            position: bits(snapshot.position),
            trail: snapshot.trail.into_iter().map(bits).collect(),
            death_micros: match snapshot.state {
                AgentState::Alive => None,
                AgentState::DeadPending { since } => Some(since.as_micros()),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
enum EventRecord {
    TimeAdvanced { dt_micros: u128 },
    AgentSpawned {
        agent: AgentId,
        position: (u64, u64),
        area: usize,
    },
    AgentDied {
        agent: AgentId,
        position: (u64, u64),
        collision_with: Option<AgentId>,
    },
    AgentDiscarded { agent: AgentId },
    HotspotReached {
        agent: AgentId,
        hotspot: usize,
    },
}

impl From<&Event> for EventRecord {
    fn from(event: &Event) -> Self {
        match event {
            Event::TimeAdvanced { dt } => Self::TimeAdvanced {
                dt_micros: dt.as_micros(),
            },
            Event::AgentSpawned {
                agent,
                position,
                area,
            } => Self::AgentSpawned {
                agent: *agent,
                position: bits(*position),
                area: *area,
            },
            Event::AgentDied {
                agent,
                position,
                cause,
            } => Self::AgentDied {
                agent: *agent,
                position: bits(*position),
                collision_with: match cause {
                    DeathCause::Random => None,
                    DeathCause::Collision { with } => Some(*with),
                },
            },
            Event::AgentDiscarded { agent } => Self::AgentDiscarded { agent: *agent },
            Event::HotspotReached { agent, hotspot } => Self::HotspotReached {
                agent: *agent,
                hotspot: *hotspot,
            },
        }
    }
}
