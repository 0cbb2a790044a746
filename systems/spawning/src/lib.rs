#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system that places new agents on the configured spawn areas.

use chernomap_core::{Position, SpawnArea, SpawnLayout};
use rand::Rng;

/// Location drawn for a new agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnPoint {
    /// Index of the spawn area the point was drawn from.
    pub area: usize,
    /// Starting position of the agent.
    pub position: Position,
}

/// Pure system that samples spawn points and sizes replenishment batches.
#[derive(Clone, Debug)]
pub struct Spawning {
    areas: Vec<SpawnArea>,
}

impl Spawning {
    /// Creates a new spawning system over the provided areas.
    #[must_use]
    pub fn new(areas: &[SpawnArea]) -> Self {
        Self {
            areas: areas.to_vec(),
        }
    }

    /// Number of agents that must be created to restore the population.
    #[must_use]
    pub fn deficit(&self, managed: usize, population: usize) -> usize {
        population.saturating_sub(managed)
    }

    /// Picks a uniformly random area and a uniformly random point on it.
    ///
    /// Returns `None` when no areas are configured.
    pub fn sample<R>(&self, rng: &mut R) -> Option<SpawnPoint>
    where
        R: Rng + ?Sized,
    {
        if self.areas.is_empty() {
            return None;
        }

        let area = rng.gen_range(0..self.areas.len());
        let position = match self.areas[area].layout() {
            SpawnLayout::Band { y, x_range } => {
                Position::new(rng.gen_range(x_range.0..=x_range.1), y)
            }
            SpawnLayout::Column { x, y_range } => {
                Position::new(x, rng.gen_range(y_range.0..=y_range.1))
            }
        };

        Some(SpawnPoint { area, position })
    }

    /// Samples `count` points, stopping early when no areas are configured.
    pub fn sample_batch<R>(&self, rng: &mut R, count: usize) -> Vec<SpawnPoint>
    where
        R: Rng + ?Sized,
    {
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(point) = self.sample(rng) else {
                break;
            };
            points.push(point);
        }
        points
    }
}
