use std::{collections::HashMap, time::Duration};

use chernomap_core::{AgentId, AgentState, Command, Event, SimulationConfig};
use chernomap_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(300);
const POPULATION: usize = 60;

fn tick(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: FRAME }, &mut events);
    events
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Observed {
    trail_len: usize,
    death_time: Option<Duration>,
}

#[test]
fn population_stays_constant_every_tick() {
    let mut world = World::new(SimulationConfig::default().with_seed(0xa11ce)).expect("valid");
    assert_eq!(query::population(&world), POPULATION);

    for _ in 0..400 {
        let _ = tick(&mut world);
        assert_eq!(query::population(&world), POPULATION);
        assert_eq!(query::agent_view(&world).len(), POPULATION);
    }
}

#[test]
fn trails_grow_while_alive_and_freeze_once_dead() {
    let mut world = World::new(SimulationConfig::default().with_seed(0xb0b)).expect("valid");
    let mut observed: HashMap<AgentId, Observed> = HashMap::new();

    for _ in 0..300 {
        let _ = tick(&mut world);
        for agent in query::agent_view(&world).iter() {
            let current = Observed {
                trail_len: agent.trail.len(),
                death_time: agent.death_time(),
            };
            assert!(current.trail_len >= 1, "trail keeps the spawn point");
            assert_eq!(agent.trail.last(), Some(&agent.position));

            if let Some(previous) = observed.get(&agent.id) {
                match previous.death_time {
                    None => assert!(current.trail_len >= previous.trail_len),
                    Some(since) => {
                        assert_eq!(current.trail_len, previous.trail_len, "dead trail changed");
                        assert_eq!(current.death_time, Some(since), "death time changed");
                    }
                }
            }
            let _ = observed.insert(agent.id, current);
        }
    }
}

#[test]
fn dead_agents_stay_hidden_until_their_timeout() {
    let config = SimulationConfig::default().with_seed(0xdead);
    let timeout = config.lifecycle.death_timeout();
    let mut world = World::new(config).expect("valid");

    for _ in 0..300 {
        let _ = tick(&mut world);
        let snapshot = query::snapshot(&world);
        for agent in snapshot.agents.iter() {
            if let AgentState::DeadPending { since } = agent.state {
                assert!(snapshot.clock - since < timeout);
                assert!(snapshot.agents.alive().all(|alive| alive.id != agent.id));
            }
        }
    }
}

#[test]
fn agent_is_replaced_once_its_timeout_elapses() {
    let mut config = SimulationConfig::default().with_seed(9);
    config.population = 1;
    config.attrition.random_death_probability = 1.0;
    let mut world = World::new(config).expect("valid");

    let events = tick(&mut world);
    assert!(events.iter().any(|event| matches!(
        event,
        Event::AgentDied { agent, .. } if *agent == AgentId::new(0)
    )));

    // Death at 0.3 s; 25 s later falls on tick 85 at 25.5 s.
    for tick_index in 2..=84 {
        let _ = tick(&mut world);
        let agents = query::agent_view(&world).into_vec();
        assert_eq!(agents.len(), 1, "tick {tick_index}");
        assert_eq!(agents[0].id, AgentId::new(0), "tick {tick_index}");
        assert!(!agents[0].is_alive());
        assert_eq!(agents[0].trail.len(), 1);
    }

    let events = tick(&mut world);
    assert!(events.contains(&Event::AgentDiscarded {
        agent: AgentId::new(0)
    }));
    let agents = query::agent_view(&world).into_vec();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].id, AgentId::new(1));
    assert!(agents[0].is_alive());
    assert_eq!(agents[0].death_time(), None);
    assert_eq!(query::ledger(&world).discarded, 1);
}

#[test]
fn two_hundred_ticks_reconcile_every_agent() {
    let config = SimulationConfig::default().with_seed(0x2000);
    let areas = config.spawn_areas.clone();
    let mut world = World::new(config).expect("valid");

    let initial = query::agent_view(&world);
    assert_eq!(initial.len(), POPULATION);
    for agent in initial.iter() {
        assert!(areas[agent.spawn_area].contains(agent.trail[0]));
    }
    for area in 0..areas.len() {
        assert!(
            initial.iter().any(|agent| agent.spawn_area == area),
            "spawn area {area} unused"
        );
    }

    let mut spawned_events = 0_u64;
    let mut died_events = 0_u64;
    let mut discarded_events = 0_u64;
    for _ in 0..200 {
        for event in tick(&mut world) {
            match event {
                Event::AgentSpawned { .. } => spawned_events += 1,
                Event::AgentDied { .. } => died_events += 1,
                Event::AgentDiscarded { .. } => discarded_events += 1,
                _ => {}
            }
        }
    }

    let snapshot = query::snapshot(&world);
    let ledger = query::ledger(&world);
    let alive = snapshot.agents.alive().count() as u64;
    let pending = snapshot.agents.len() as u64 - alive;

    assert_eq!(snapshot.tick_index, 200);
    assert_eq!(ledger.spawned, POPULATION as u64 + spawned_events);
    assert_eq!(ledger.discarded, discarded_events);
    assert_eq!(ledger.deaths(), died_events);
    assert_eq!(ledger.spawned, alive + pending + ledger.discarded);
    assert_eq!(snapshot.death_markers.len() as u64, pending + ledger.discarded);
    assert_eq!(snapshot.persistent_trails.len(), snapshot.death_markers.len());
    assert!(ledger.deaths() > 0, "a 60 s run should see attrition");
}
