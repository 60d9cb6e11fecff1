//! SA refinement loop.

use super::config::SaConfig;
use crate::error::TspResult;
use crate::geometry::DistanceMatrix;
use crate::random::{create_rng, distinct_pair, entropy_rng};
use crate::tour::Tour;
use rand::Rng;
use tracing::debug;

/// Result of a Simulated Annealing run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SaResult {
    /// Best tour seen during the run. Not necessarily the last one visited.
    pub best: Tour,

    /// Total number of neighbor evaluations.
    pub iterations: usize,

    /// Temperature when the loop stopped.
    pub final_temperature: f64,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of strictly improving moves.
    pub improving_moves: usize,

    /// Best distance after each iteration.
    pub cost_history: Vec<f64>,
}

/// Executes Simulated Annealing on a tour.
pub struct SaRunner;

impl SaRunner {
    /// Refines `start` using the generator derived from `config.seed`.
    pub fn run(start: &Tour, distances: &DistanceMatrix, config: &SaConfig) -> TspResult<SaResult> {
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => entropy_rng(),
        };
        Self::refine(start, distances, config, &mut rng)
    }

    /// Refines `start` with an injected random source.
    ///
    /// Each iteration swaps two distinct positions of the current tour. A
    /// shorter neighbor is always accepted; a longer one is accepted with
    /// probability `exp((current - new) / T)`. The best tour ever seen is
    /// returned, so the result is never longer than `start`.
    pub fn refine<R: Rng>(
        start: &Tour,
        distances: &DistanceMatrix,
        config: &SaConfig,
        rng: &mut R,
    ) -> TspResult<SaResult> {
        config.validate()?;

        let mut current = start.clone();
        let mut best = start.clone();
        let mut temperature = config.initial_temperature;
        let mut iterations = 0usize;
        let mut accepted_moves = 0usize;
        let mut improving_moves = 0usize;
        let mut cost_history = Vec::with_capacity(config.max_iterations);

        if current.len() >= 2 {
            while iterations < config.max_iterations && temperature > config.min_temperature {
                let mut neighbor = current.clone();
                if let Some((i, j)) = distinct_pair(neighbor.len(), rng) {
                    neighbor.cities_mut().swap(i, j);
                }
                neighbor.evaluate(distances);

                let accept = if neighbor.is_better_than(&current) {
                    improving_moves += 1;
                    true
                } else {
                    let delta = current.distance() - neighbor.distance();
                    rng.random::<f64>() < (delta / temperature).exp()
                };

                if accept {
                    current = neighbor;
                    accepted_moves += 1;
                    if current.is_better_than(&best) {
                        best = current.clone();
                    }
                }

                iterations += 1;
                cost_history.push(best.distance());
                temperature *= config.temperature_reduction_rate;
            }
        }

        debug!(
            iterations,
            accepted_moves,
            improving_moves,
            start = start.distance(),
            best = best.distance(),
            "simulated annealing finished"
        );

        Ok(SaResult {
            best,
            iterations,
            final_temperature: temperature,
            accepted_moves,
            improving_moves,
            cost_history,
        })
    }
}
