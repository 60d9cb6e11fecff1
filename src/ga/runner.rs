//! GA generation loop.
//!
//! [`GaRunner`] owns one run's population and advances it one generation per
//! [`step`](GaRunner::step):
//! evaluation → tournament selection → ordered crossover → swap mutation →
//! elitist truncation. [`finish`](GaRunner::finish) chains the final best
//! tour through 2-opt and Simulated Annealing.

use super::config::GaConfig;
use super::operators::{order_crossover, swap_mutation};
use super::selection::select_parents;
use crate::error::{TspError, TspResult};
use crate::geometry::{CityMap, DistanceMatrix};
use crate::local_search::two_opt_improve;
use crate::random::{create_rng, entropy_rng, random_permutation};
use crate::sa::SaRunner;
use crate::tour::{shortest, Tour};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Minimum number of cities the GA accepts.
pub const GA_MIN_CITIES: usize = 3;

/// Snapshot produced by one generation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GenerationStats {
    /// Zero-based index of the generation that just ran.
    pub generation: usize,

    /// Best tour of the population at the start of the generation.
    pub best: Tour,

    /// Number of offspring bred in this generation.
    pub offspring: usize,
}

/// Result of a GA run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GaResult {
    /// Best tour of the randomly initialized population.
    pub initial_best: Tour,

    /// Best tour of the final population, before any local search.
    pub raw_best: Tour,

    /// `raw_best` after 2-opt. `None` if the run was cancelled.
    pub two_opt: Option<Tour>,

    /// `two_opt` after Simulated Annealing. `None` if the run was cancelled.
    pub refined: Option<Tour>,

    /// Number of generations executed.
    pub generations: usize,

    /// Whether the run was cancelled before its last generation.
    pub cancelled: bool,

    /// Best distance of each generation's population.
    pub fitness_history: Vec<f64>,
}

impl GaResult {
    /// The reported answer: the refined tour, or the raw best if the run was
    /// cancelled before refinement.
    pub fn best(&self) -> &Tour {
        self.refined.as_ref().unwrap_or(&self.raw_best)
    }
}

/// Stepwise Genetic Algorithm over one city map.
///
/// # Usage
///
/// ```
/// use u_tsp::geometry::CityMap;
/// use u_tsp::ga::{GaConfig, GaRunner};
/// use u_tsp::random::create_rng;
///
/// let cities = CityMap::demo();
/// let config = GaConfig::default().with_generations(20);
/// let mut rng = create_rng(42);
///
/// let mut runner = GaRunner::new(&cities, config, &mut rng).unwrap();
/// while let Some(stats) = runner.step(&mut rng) {
///     assert_eq!(stats.generation + 1, runner.generation());
/// }
/// let result = runner.finish(&mut rng).unwrap();
/// assert!(result.best().distance() <= result.raw_best.distance());
/// ```
#[derive(Debug, Clone)]
pub struct GaRunner {
    config: GaConfig,
    distances: DistanceMatrix,
    population: Vec<Tour>,
    initial_best: Tour,
    generation: usize,
    fitness_history: Vec<f64>,
}

impl GaRunner {
    /// Validates the inputs and creates the initial random population.
    pub fn new<R: Rng>(cities: &CityMap, config: GaConfig, rng: &mut R) -> TspResult<Self> {
        if cities.len() < GA_MIN_CITIES {
            return Err(TspError::InsufficientCities {
                required: GA_MIN_CITIES,
                actual: cities.len(),
            });
        }
        config.validate()?;

        let distances = cities.distance_matrix();
        let population: Vec<Tour> = (0..config.population_size)
            .map(|_| Tour::new(random_permutation(cities.len(), rng), &distances))
            .collect();
        let initial_best = shortest(&population).cloned().ok_or_else(|| {
            TspError::InvalidParameter("population_size must be at least 1".into())
        })?;

        info!(
            cities = cities.len(),
            population = config.population_size,
            generations = config.generations,
            mutation_rate = config.mutation_rate,
            initial_best = initial_best.distance(),
            "genetic algorithm started"
        );

        Ok(Self {
            fitness_history: Vec::with_capacity(config.generations),
            config,
            distances,
            population,
            initial_best,
            generation: 0,
        })
    }

    /// Runs to completion with the generator derived from `config.seed`.
    pub fn run(cities: &CityMap, config: &GaConfig) -> TspResult<GaResult> {
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => entropy_rng(),
        };
        Self::run_with_cancel(cities, config, &mut rng, None)
    }

    /// Runs to completion, checking `cancel` before every generation.
    ///
    /// A cancelled run returns the best tour found so far without local
    /// search.
    pub fn run_with_cancel<R: Rng>(
        cities: &CityMap,
        config: &GaConfig,
        rng: &mut R,
        cancel: Option<Arc<AtomicBool>>,
    ) -> TspResult<GaResult> {
        let mut runner = Self::new(cities, config.clone(), rng)?;
        while !runner.is_done() {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Ok(runner.cancel());
            }
            runner.step(rng);
        }
        runner.finish(rng)
    }

    /// Advances one generation. Returns `None` once all generations ran.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Option<GenerationStats> {
        if self.is_done() {
            return None;
        }

        // 1. Current best
        let best = self.best().clone();

        // 2. Selection
        let parent_count = self.config.population_size / 2;
        let parents = select_parents(
            &self.population,
            parent_count,
            self.config.tournament_size,
            rng,
        );

        // 3. Crossover over consecutive pairs; an odd leftover breeds nothing
        let mut children: Vec<Vec<usize>> = parents
            .chunks_exact(2)
            .map(|pair| {
                order_crossover(
                    self.population[pair[0]].cities(),
                    self.population[pair[1]].cities(),
                    rng,
                )
            })
            .collect();

        // 4. Mutation
        for child in &mut children {
            if rng.random::<f64>() < self.config.mutation_rate {
                swap_mutation(child, rng);
            }
        }

        // 5. Merge, sort, truncate
        let offspring = evaluate_offspring(children, &self.distances, self.config.parallel);
        let offspring_count = offspring.len();
        self.population.extend(offspring);
        self.population.sort_by(|a, b| a.cmp_by_distance(b));
        self.population.truncate(self.config.population_size);

        // 6. Record
        self.fitness_history.push(best.distance());
        let stats = GenerationStats {
            generation: self.generation,
            best,
            offspring: offspring_count,
        };
        self.generation += 1;

        debug!(
            generation = stats.generation,
            best = stats.best.distance(),
            offspring = offspring_count,
            "generation complete"
        );
        Some(stats)
    }

    /// `true` once every configured generation has run.
    pub fn is_done(&self) -> bool {
        self.generation >= self.config.generations
    }

    /// Number of generations executed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    pub fn population(&self) -> &[Tour] {
        &self.population
    }

    /// Best tour of the current population.
    pub fn best(&self) -> &Tour {
        shortest(&self.population).unwrap_or(&self.initial_best)
    }

    /// Best tour of the initial population.
    pub fn initial_best(&self) -> &Tour {
        &self.initial_best
    }

    pub fn fitness_history(&self) -> &[f64] {
        &self.fitness_history
    }

    /// Finalizes a completed run: best tour → 2-opt → Simulated Annealing.
    pub fn finish<R: Rng>(self, rng: &mut R) -> TspResult<GaResult> {
        let raw_best = self.best().clone();
        let two_opt = two_opt_improve(&raw_best, &self.distances);
        let annealed = SaRunner::refine(&two_opt, &self.distances, &self.config.annealing, rng)?;

        info!(
            generations = self.generation,
            raw_best = raw_best.distance(),
            two_opt = two_opt.distance(),
            refined = annealed.best.distance(),
            "genetic algorithm completed"
        );

        Ok(GaResult {
            initial_best: self.initial_best,
            raw_best,
            two_opt: Some(two_opt),
            refined: Some(annealed.best),
            generations: self.generation,
            cancelled: false,
            fitness_history: self.fitness_history,
        })
    }

    /// Finalizes a cancelled run without local search.
    pub fn cancel(self) -> GaResult {
        let raw_best = self.best().clone();
        info!(
            generations = self.generation,
            best = raw_best.distance(),
            "genetic algorithm cancelled"
        );
        GaResult {
            initial_best: self.initial_best,
            raw_best,
            two_opt: None,
            refined: None,
            generations: self.generation,
            cancelled: true,
            fitness_history: self.fitness_history,
        }
    }
}

/// Turns offspring orders into evaluated tours.
#[cfg(feature = "parallel")]
fn evaluate_offspring(
    children: Vec<Vec<usize>>,
    distances: &DistanceMatrix,
    parallel: bool,
) -> Vec<Tour> {
    use rayon::prelude::*;

    if parallel {
        children
            .into_par_iter()
            .map(|order| Tour::new(order, distances))
            .collect()
    } else {
        children
            .into_iter()
            .map(|order| Tour::new(order, distances))
            .collect()
    }
}

/// Turns offspring orders into evaluated tours.
#[cfg(not(feature = "parallel"))]
fn evaluate_offspring(
    children: Vec<Vec<usize>>,
    distances: &DistanceMatrix,
    _parallel: bool,
) -> Vec<Tour> {
    children
        .into_iter()
        .map(|order| Tour::new(order, distances))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
