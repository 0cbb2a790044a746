use std::time::Duration;

use chernomap_core::{Command, SimulationConfig};
use chernomap_rendering::{compose_scene, ScenePalette};
use chernomap_world::{self as world, query, World};

#[test]
fn composed_layers_track_the_world_snapshot() {
    let mut world = World::new(SimulationConfig::default().with_seed(0x5ce9e)).expect("valid");
    let palette = ScenePalette::default();

    for _ in 0..120 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(300),
            },
            &mut events,
        );

        let snapshot = query::snapshot(&world);
        let layers = compose_scene(&snapshot, &palette);
        let alive = snapshot.agents.alive().count();

        assert_eq!(layers.live_agents.len(), alive);
        assert_eq!(layers.live_trails.len(), alive);
        assert_eq!(layers.death_markers.len(), snapshot.death_markers.len());
        assert_eq!(
            layers.persistent_trails.len(),
            snapshot.persistent_trails.len()
        );
        for (trail, marker) in layers.live_trails.iter().zip(&layers.live_agents) {
            assert_eq!(trail.points.last(), Some(&marker.position));
        }
    }
}

#[test]
fn archived_layers_only_grow() {
    let mut world = World::new(SimulationConfig::default().with_seed(71)).expect("valid");
    let palette = ScenePalette::default();
    let mut previous = compose_scene(&query::snapshot(&world), &palette);

    for _ in 0..150 {
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(300),
            },
            &mut events,
        );
        let current = compose_scene(&query::snapshot(&world), &palette);

        assert!(current.death_markers.starts_with(&previous.death_markers));
        assert!(current
            .persistent_trails
            .starts_with(&previous.persistent_trails));
        previous = current;
    }
}
