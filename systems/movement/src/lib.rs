#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Goal-seeking movement system that picks a step target and advances agents.
//!
//! Every step starts with a detour phase: while a fresh roll succeeds and not
//! every hotspot has been offered, a random hotspot is appended to the tick's
//! visited list. The last visited hotspot becomes the target, falling back to
//! the goal. The agent then moves a fixed length along the straight line to
//! the target. Hotspots within reach after the move are appended to the
//! visited list as well; that bookkeeping never changes the chosen target.

use chernomap_core::{Goal, Hotspot, MovementTuning, Position};
use rand::Rng;

/// Result of advancing one agent by one step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepOutcome {
    /// Point the agent moved toward.
    pub target: Position,
    /// Position after the step.
    pub position: Position,
    /// Hotspot indices visited this tick, detours first.
    pub visited: Vec<usize>,
    /// Hotspot indices appended after the move because they were within reach.
    pub reached: Vec<usize>,
}

/// Pure system that computes goal-seeking steps.
#[derive(Clone, Debug)]
pub struct Movement {
    tuning: MovementTuning,
}

impl Movement {
    /// Creates a new movement system using the supplied tuning.
    #[must_use]
    pub fn new(tuning: MovementTuning) -> Self {
        Self { tuning }
    }

    /// Advances an agent at `position` by one step.
    pub fn step<R>(
        &self,
        rng: &mut R,
        position: Position,
        hotspots: &[Hotspot],
        goal: Goal,
    ) -> StepOutcome
    where
        R: Rng + ?Sized,
    {
        let mut visited = self.choose_detours(rng, hotspots.len());
        let target = visited
            .last()
            .map_or(goal.position(), |&index| hotspots[index].position());

        let next = if position.distance(target) > 0.0 {
            let length = rng.gen_range(self.tuning.step_min..=self.tuning.step_max);
            position.step_toward(target, length)
        } else {
            position
        };

        let reached = self.hotspots_within_reach(next, hotspots, &visited);
        visited.extend_from_slice(&reached);

        StepOutcome {
            target,
            position: next,
            visited,
            reached,
        }
    }

    /// Runs the detour phase and returns the visited hotspot indices.
    pub fn choose_detours<R>(&self, rng: &mut R, hotspot_count: usize) -> Vec<usize>
    where
        R: Rng + ?Sized,
    {
        let mut visited = Vec::new();
        while rng.gen::<f64>() < self.tuning.detour_probability && visited.len() < hotspot_count
        {
            let candidate = rng.gen_range(0..hotspot_count);
            if !visited.contains(&candidate) {
                visited.push(candidate);
            }
        }
        visited
    }

    /// Hotspots within reach of `position` that are not yet in `visited`.
    #[must_use]
    pub fn hotspots_within_reach(
        &self,
        position: Position,
        hotspots: &[Hotspot],
        visited: &[usize],
    ) -> Vec<usize> {
        hotspots
            .iter()
            .enumerate()
            .filter(|(index, _)| !visited.contains(index))
            .filter(|(_, hotspot)| self.is_near(position, hotspot))
            .map(|(index, _)| index)
            .collect()
    }

    /// Proximity check between a position and a hotspot, radius inclusive.
    #[must_use]
    pub fn is_near(&self, position: Position, hotspot: &Hotspot) -> bool {
        position.distance_with_exponent(
            hotspot.position(),
            self.tuning.hotspot_distance_exponent,
        ) <= self.tuning.hotspot_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn no_detours() -> Movement {
        Movement::new(MovementTuning {
            detour_probability: 0.0,
            ..MovementTuning::default()
        })
    }

    #[test]
    fn without_detours_the_goal_is_the_target() {
        let movement = no_detours();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let goal = Goal::at(1.0, 15.0);
        let outcome = movement.step(
            &mut rng,
            Position::new(1.0, 1.0),
            &[Hotspot::at(9.0, 5.0)],
            goal,
        );

        assert_eq!(outcome.target, goal.position());
        assert_eq!(outcome.position, Position::new(1.0, 1.5));
        assert!(outcome.visited.is_empty());
    }

    #[test]
    fn standing_on_target_consumes_no_step() {
        let movement = no_detours();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let goal = Goal::at(1.0, 15.0);
        let outcome = movement.step(&mut rng, goal.position(), &[], goal);
        assert_eq!(outcome.position, goal.position());
    }

    #[test]
    fn literal_exponent_widens_the_reach() {
        let literal = no_detours();
        let euclidean = Movement::new(MovementTuning {
            detour_probability: 0.0,
            hotspot_distance_exponent: 0.5,
            ..MovementTuning::default()
        });
        let hotspot = Hotspot::at(0.0, 0.0);
        let position = Position::new(0.74, 0.0);

        assert!(literal.is_near(position, &hotspot));
        assert!(!euclidean.is_near(position, &hotspot));
    }

    #[test]
    fn certain_detours_offer_every_hotspot_once() {
        let movement = Movement::new(MovementTuning {
            detour_probability: 1.0,
            ..MovementTuning::default()
        });
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let mut visited = movement.choose_detours(&mut rng, 5);
        assert_eq!(visited.len(), 5);
        visited.sort_unstable();
        assert_eq!(visited, vec![0, 1, 2, 3, 4]);
    }
}
