use std::time::Duration;

use chernomap_core::{Command, Event};
use chernomap_rendering::{compose_scene, Banner, GridPresentation, Scene, ScenePalette};
use chernomap_world::{self as world, query, World};
use tracing::{debug, info};

use crate::config::PresentationConfig;

/// Drives the world from frame callbacks and keeps the scene in sync.
///
/// At most one tick runs per frame, once at least one frame interval has
/// elapsed since the previous tick. The tick receives the full elapsed time so
/// the world clock follows the wall clock.
#[derive(Debug)]
pub(crate) struct SimulationDriver {
    world: World,
    palette: ScenePalette,
    frame_interval: Duration,
    frame_limit: u64,
    since_last_tick: Duration,
    frames: u64,
    events: Vec<Event>,
}

impl SimulationDriver {
    pub(crate) fn new(world: World, presentation: &PresentationConfig) -> Self {
        Self {
            world,
            palette: ScenePalette::default(),
            frame_interval: presentation.frame_interval(),
            frame_limit: presentation.frame_limit,
            since_last_tick: Duration::ZERO,
            frames: 0,
            events: Vec::new(),
        }
    }

    /// Scene showing the world before the first tick.
    pub(crate) fn initial_scene(&self) -> Scene {
        let mut scene = Scene::new(GridPresentation::simulation(&self.palette));
        scene.layers = compose_scene(&query::snapshot(&self.world), &self.palette);
        scene
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.frames >= self.frame_limit
    }

    /// Advances the frame clock by `dt`, ticking the world when due.
    ///
    /// Returns `true` when a tick ran this frame.
    pub(crate) fn advance(&mut self, dt: Duration, scene: &mut Scene) -> bool {
        if self.is_finished() {
            return false;
        }

        self.since_last_tick = self.since_last_tick.saturating_add(dt);
        if self.since_last_tick < self.frame_interval {
            return false;
        }

        let elapsed = std::mem::take(&mut self.since_last_tick);
        self.events.clear();
        world::apply(
            &mut self.world,
            Command::Tick { dt: elapsed },
            &mut self.events,
        );
        self.frames += 1;

        let reached = self
            .events
            .iter()
            .filter(|event| matches!(event, Event::HotspotReached { .. }))
            .count();
        debug!(frame = self.frames, reached, "frame advanced");

        scene.layers = compose_scene(&query::snapshot(&self.world), &self.palette);
        if self.is_finished() {
            scene.banner = Some(Banner::finished(&self.palette));
            let ledger = query::ledger(&self.world);
            info!(
                frames = self.frames,
                spawned = ledger.spawned,
                deaths = ledger.deaths(),
                discarded = ledger.discarded,
                "simulation finished"
            );
        }

        true
    }

    #[cfg(test)]
    pub(crate) fn world(&self) -> &World {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chernomap_core::SimulationConfig;

    const FRAME: Duration = Duration::from_millis(300);

    fn driver(frame_limit: u64) -> SimulationDriver {
        let world = World::new(SimulationConfig::default().with_seed(5)).expect("valid config");
        let presentation = PresentationConfig {
            frame_limit,
            ..PresentationConfig::default()
        };
        SimulationDriver::new(world, &presentation)
    }

    #[test]
    fn initial_scene_shows_the_full_population() {
        let driver = driver(200);
        let scene = driver.initial_scene();
        assert_eq!(scene.layers.live_agents.len(), 60);
        assert!(scene.banner.is_none());
        assert_eq!(scene.grid.columns, 16);
    }

    #[test]
    fn short_frames_accumulate_until_the_interval() {
        let mut driver = driver(200);
        let mut scene = driver.initial_scene();

        assert!(!driver.advance(Duration::from_millis(100), &mut scene));
        assert!(!driver.advance(Duration::from_millis(150), &mut scene));
        assert_eq!(query::tick_index(driver.world()), 0);

        assert!(driver.advance(Duration::from_millis(100), &mut scene));
        assert_eq!(query::tick_index(driver.world()), 1);
        assert_eq!(query::clock(driver.world()), Duration::from_millis(350));
    }

    #[test]
    fn long_frames_tick_once() {
        let mut driver = driver(200);
        let mut scene = driver.initial_scene();

        assert!(driver.advance(Duration::from_secs(2), &mut scene));
        assert_eq!(query::tick_index(driver.world()), 1);
        assert_eq!(query::clock(driver.world()), Duration::from_secs(2));
    }

    #[test]
    fn ticking_stops_at_the_frame_limit() {
        let mut driver = driver(200);
        let mut scene = driver.initial_scene();

        for frame in 1..=200 {
            assert!(driver.advance(FRAME, &mut scene));
            assert_eq!(scene.banner.is_some(), frame == 200, "frame {frame}");
        }
        assert!(driver.is_finished());

        let before = query::snapshot(driver.world());
        for _ in 0..10 {
            assert!(!driver.advance(FRAME, &mut scene));
        }
        assert_eq!(query::snapshot(driver.world()), before);
        assert_eq!(query::tick_index(driver.world()), 200);
        assert_eq!(
            scene.banner.as_ref().map(|banner| banner.text.as_str()),
            Some("Sim Finished")
        );
    }

    #[test]
    fn scene_layers_follow_the_latest_tick() {
        let mut driver = driver(200);
        let mut scene = driver.initial_scene();

        for _ in 0..40 {
            let _ = driver.advance(FRAME, &mut scene);
        }
        let snapshot = query::snapshot(driver.world());
        assert_eq!(
            scene.layers.live_agents.len(),
            snapshot.agents.alive().count()
        );
        assert_eq!(scene.layers.death_markers.len(), snapshot.death_markers.len());
    }
}
