//! ACO iteration loop.

use super::config::AcoConfig;
use super::pheromone::PheromoneMatrix;
use crate::error::{TspError, TspResult};
use crate::geometry::{CityMap, DistanceMatrix};
use crate::random::{create_rng, entropy_rng};
use crate::tour::{shortest, Tour};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Minimum number of cities ACO accepts.
pub const ACO_MIN_CITIES: usize = 2;

/// Stand-in for a zero distance in the inverse-distance heuristic.
const ZERO_DISTANCE_EPSILON: f64 = 1e-6;

/// Snapshot produced by one iteration.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IterationStats {
    /// Zero-based index of the iteration that just ran.
    pub iteration: usize,

    /// Shortest tour built by this iteration's ants.
    pub iteration_best: Tour,

    /// Shortest tour seen since the run started.
    pub best: Tour,
}

/// Result of an ACO run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AcoResult {
    /// Shortest tour seen. `None` only if no iteration ran.
    pub best: Option<Tour>,

    /// Number of iterations executed.
    pub iterations: usize,

    /// Whether the run was cancelled before its last iteration.
    pub cancelled: bool,

    /// Running best distance after each iteration. Non-increasing.
    pub best_history: Vec<f64>,
}

/// Stepwise Ant Colony Optimization over one city map.
///
/// # Usage
///
/// ```
/// use u_tsp::aco::{AcoConfig, AcoRunner};
/// use u_tsp::geometry::CityMap;
/// use u_tsp::random::create_rng;
///
/// let cities = CityMap::demo();
/// let config = AcoConfig::default().with_num_ants(10).with_iterations(15);
/// let mut rng = create_rng(42);
///
/// let mut runner = AcoRunner::new(&cities, config).unwrap();
/// while runner.step(&mut rng).is_some() {}
/// let result = runner.finish();
/// assert_eq!(result.best_history.len(), 15);
/// ```
#[derive(Debug, Clone)]
pub struct AcoRunner {
    config: AcoConfig,
    distances: DistanceMatrix,
    pheromone: PheromoneMatrix,
    best: Option<Tour>,
    iteration: usize,
    best_history: Vec<f64>,
}

impl AcoRunner {
    /// Validates the inputs and allocates a fresh pheromone matrix.
    pub fn new(cities: &CityMap, config: AcoConfig) -> TspResult<Self> {
        if cities.len() < ACO_MIN_CITIES {
            return Err(TspError::InsufficientCities {
                required: ACO_MIN_CITIES,
                actual: cities.len(),
            });
        }
        config.validate()?;

        info!(
            cities = cities.len(),
            ants = config.num_ants,
            iterations = config.iterations,
            evaporation_rate = config.evaporation_rate,
            alpha = config.alpha,
            beta = config.beta,
            "ant colony optimization started"
        );

        Ok(Self {
            pheromone: PheromoneMatrix::new(cities.len(), config.pheromone_init),
            distances: cities.distance_matrix(),
            best: None,
            iteration: 0,
            best_history: Vec::with_capacity(config.iterations),
            config,
        })
    }

    /// Runs to completion with the generator derived from `config.seed`.
    pub fn run(cities: &CityMap, config: &AcoConfig) -> TspResult<AcoResult> {
        let mut rng = match config.seed {
            Some(seed) => create_rng(seed),
            None => entropy_rng(),
        };
        Self::run_with_cancel(cities, config, &mut rng, None)
    }

    /// Runs to completion, checking `cancel` before every iteration.
    pub fn run_with_cancel<R: Rng>(
        cities: &CityMap,
        config: &AcoConfig,
        rng: &mut R,
        cancel: Option<Arc<AtomicBool>>,
    ) -> TspResult<AcoResult> {
        let mut runner = Self::new(cities, config.clone())?;
        while !runner.is_done() {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return Ok(runner.cancel());
            }
            runner.step(rng);
        }
        Ok(runner.finish())
    }

    /// Advances one iteration. Returns `None` once all iterations ran.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> Option<IterationStats> {
        if self.is_done() {
            return None;
        }

        // 1. Construct
        let tours: Vec<Tour> = (0..self.config.num_ants)
            .map(|_| {
                construct_tour(
                    &self.pheromone,
                    &self.distances,
                    self.config.alpha,
                    self.config.beta,
                    rng,
                )
            })
            .filter(|order| !order.is_empty())
            .map(|order| Tour::new(order, &self.distances))
            .collect();
        let iteration_best = shortest(&tours)?.clone();

        // 2. Global best
        if self.best.as_ref().map_or(true, |best| iteration_best.is_better_than(best)) {
            self.best = Some(iteration_best.clone());
        }

        // 3. Evaporate
        self.pheromone.evaporate(self.config.evaporation_rate);

        // 4. Deposit
        for tour in tours.iter().filter(|t| t.distance() > 0.0) {
            self.pheromone.deposit(tour, 1.0 / tour.distance());
        }
        if let Some(max) = self.config.pheromone_max {
            self.pheromone.clamp_max(max);
        }

        // 5. Record
        let best = self.best.clone()?;
        self.best_history.push(best.distance());
        let stats = IterationStats {
            iteration: self.iteration,
            iteration_best,
            best,
        };
        self.iteration += 1;

        debug!(
            iteration = stats.iteration,
            iteration_best = stats.iteration_best.distance(),
            best = stats.best.distance(),
            "iteration complete"
        );
        Some(stats)
    }

    /// `true` once every configured iteration has run.
    pub fn is_done(&self) -> bool {
        self.iteration >= self.config.iterations
    }

    /// Number of iterations executed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn config(&self) -> &AcoConfig {
        &self.config
    }

    pub fn pheromone(&self) -> &PheromoneMatrix {
        &self.pheromone
    }

    /// Shortest tour seen so far.
    pub fn best(&self) -> Option<&Tour> {
        self.best.as_ref()
    }

    pub fn best_history(&self) -> &[f64] {
        &self.best_history
    }

    /// Finalizes a completed run.
    pub fn finish(self) -> AcoResult {
        info!(
            iterations = self.iteration,
            best = self.best.as_ref().map(Tour::distance),
            "ant colony optimization completed"
        );
        self.into_result(false)
    }

    /// Finalizes a cancelled run.
    pub fn cancel(self) -> AcoResult {
        info!(
            iterations = self.iteration,
            best = self.best.as_ref().map(Tour::distance),
            "ant colony optimization cancelled"
        );
        self.into_result(true)
    }

    fn into_result(self, cancelled: bool) -> AcoResult {
        AcoResult {
            best: self.best,
            iterations: self.iteration,
            cancelled,
            best_history: self.best_history,
        }
    }
}

/// Builds one ant's tour.
///
/// From the current city, every unvisited candidate `c` gets the weight
/// `pheromone[cur][c]^alpha * (1 / d(cur, c))^beta`, with zero distances
/// replaced by a small epsilon. The next city is drawn proportionally to the
/// weights, or uniformly when they sum to zero or overflow.
pub fn construct_tour<R: Rng>(
    pheromone: &PheromoneMatrix,
    distances: &DistanceMatrix,
    alpha: f64,
    beta: f64,
    rng: &mut R,
) -> Vec<usize> {
    let n = distances.len();
    if n == 0 {
        return Vec::new();
    }

    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n);
    let mut candidates = Vec::with_capacity(n);
    let mut weights = Vec::with_capacity(n);

    let mut current = rng.random_range(0..n);
    visited[current] = true;
    tour.push(current);

    while tour.len() < n {
        candidates.clear();
        weights.clear();
        for next in (0..n).filter(|&c| !visited[c]) {
            let mut d = distances.get(current, next);
            if d == 0.0 {
                d = ZERO_DISTANCE_EPSILON;
            }
            let w = pheromone.get(current, next).powf(alpha) * (1.0 / d).powf(beta);
            candidates.push(next);
            weights.push(w);
        }

        current = candidates[roulette(&weights, rng)];
        visited[current] = true;
        tour.push(current);
    }

    tour
}

/// Picks an index proportionally to `weights`.
///
/// Weights that overflowed to `+inf` take all of the probability mass and are
/// picked uniformly among themselves. A sum that overflows from finite weights
/// is rescaled by the largest weight. A zero or NaN total falls back to a
/// uniform pick over every candidate.
fn roulette<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let infinite: Vec<usize> = weights
        .iter()
        .enumerate()
        .filter(|&(_, &w)| w == f64::INFINITY)
        .map(|(i, _)| i)
        .collect();
    if !infinite.is_empty() {
        return infinite[rng.random_range(0..infinite.len())];
    }

    let mut scale = 1.0;
    let mut total: f64 = weights.iter().sum();
    if total == f64::INFINITY {
        scale = weights.iter().copied().fold(0.0, f64::max);
        total = weights.iter().map(|w| w / scale).sum();
    }
    if !(total > 0.0 && total.is_finite()) {
        return rng.random_range(0..weights.len());
    }

    let threshold = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += w / scale;
        if cumulative > threshold {
            return i;
        }
    }

    // floating-point fallback: last candidate with a non-zero weight
    weights
        .iter()
        .rposition(|&w| w > 0.0)
        .unwrap_or(weights.len() - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(n: usize) -> CityMap {
        let mut cities = CityMap::new();
        for i in 0..n {
            let a = i as f64 / n as f64 * std::f64::consts::TAU;
            cities.insert(format!("C{i}"), 100.0 * a.cos(), 100.0 * a.sin()).unwrap();
        }
        cities
    }

    #[test]
    fn test_insufficient_cities() {
        let one = CityMap::from_pairs([("A", 0.0, 0.0)]).unwrap();
        assert_eq!(
            AcoRunner::new(&one, AcoConfig::default()).unwrap_err(),
            TspError::InsufficientCities { required: 2, actual: 1 }
        );
        assert!(AcoRunner::new(&CityMap::new(), AcoConfig::default()).is_err());
    }

    #[test]
    fn test_two_cities_work() {
        let cities = CityMap::from_pairs([("A", 0.0, 0.0), ("B", 3.0, 4.0)]).unwrap();
        let config = AcoConfig::default().with_num_ants(3).with_iterations(2).with_seed(1);
        let result = AcoRunner::run(&cities, &config).unwrap();
        let best = result.best.unwrap();
        assert!(best.is_permutation_of(2));
        assert!((best.distance() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_constructed_tours_are_permutations() {
        let cities = ring(12);
        let dm = cities.distance_matrix();
        let pheromone = PheromoneMatrix::new(12, 0.1);
        let mut rng = create_rng(42);
        for _ in 0..50 {
            let tour = construct_tour(&pheromone, &dm, 1.0, 2.0, &mut rng);
            assert!(Tour::with_distance(tour, 0.0).is_permutation_of(12));
        }
    }

    #[test]
    fn test_coincident_cities_use_epsilon() {
        let cities =
            CityMap::from_pairs([("A", 1.0, 1.0), ("B", 1.0, 1.0), ("C", 1.0, 1.0)]).unwrap();
        let config = AcoConfig::default()
            .with_num_ants(4)
            .with_iterations(3)
            .with_seed(9);
        let result = AcoRunner::run(&cities, &config).unwrap();
        let best = result.best.unwrap();
        assert!(best.is_permutation_of(3));
        assert_eq!(best.distance(), 0.0);
    }

    #[test]
    fn test_best_history_non_increasing() {
        let config = AcoConfig::default().with_num_ants(10).with_iterations(40).with_seed(3);
        let result = AcoRunner::run(&CityMap::demo(), &config).unwrap();
        assert_eq!(result.best_history.len(), 40);
        for w in result.best_history.windows(2) {
            assert!(w[1] <= w[0]);
        }
        let best = result.best.unwrap();
        assert_eq!(best.distance(), *result.best_history.last().unwrap());
    }

    #[test]
    fn test_full_evaporation_zeroes_matrix_and_falls_back_to_uniform() {
        let cities = ring(6);
        let config = AcoConfig::default()
            .with_num_ants(1)
            .with_iterations(5)
            .with_evaporation_rate(1.0);
        let mut rng = create_rng(11);
        let mut runner = AcoRunner::new(&cities, config).unwrap();
        runner.step(&mut rng).unwrap();

        // Only the single ant's deposit survives a full evaporation.
        let zero_cells = runner.pheromone().cells().iter().filter(|&&c| c == 0.0).count();
        assert_eq!(zero_cells, 36 - 12);

        let mut zeroed = runner.pheromone().clone();
        zeroed.evaporate(1.0);
        assert!(zeroed.cells().iter().all(|&c| c == 0.0));

        // With every weight zero, the start city's successor is uniform.
        let dm = cities.distance_matrix();
        let mut counts = [0u32; 6];
        for _ in 0..6000 {
            let tour = construct_tour(&zeroed, &dm, 1.0, 2.0, &mut rng);
            assert!(Tour::with_distance(tour.clone(), 0.0).is_permutation_of(6));
            let start = tour.iter().position(|&c| c == 0).unwrap();
            counts[tour[(start + 1) % 6]] += 1;
        }
        for (city, &c) in counts.iter().enumerate().skip(1) {
            assert!(c > 800, "city {city} chosen {c} times: {counts:?}");
        }
    }

    #[test]
    fn test_strong_heuristic_follows_nearest_neighbor() {
        // With beta large and alpha zero, the next city is almost always the
        // nearest unvisited one.
        let cities = CityMap::from_pairs([
            ("A", 0.0, 0.0),
            ("B", 1.0, 0.0),
            ("C", 2.0, 0.0),
            ("D", 50.0, 0.0),
        ])
        .unwrap();
        let dm = cities.distance_matrix();
        let pheromone = PheromoneMatrix::new(4, 1.0);
        let mut rng = create_rng(5);
        for _ in 0..100 {
            let tour = construct_tour(&pheromone, &dm, 0.0, 20.0, &mut rng);
            if tour[0] == 0 {
                assert_eq!(&tour[1..], &[1, 2, 3]);
            }
        }
    }

    #[test]
    fn test_pheromone_ceiling() {
        let config = AcoConfig::default()
            .with_num_ants(20)
            .with_iterations(30)
            .with_evaporation_rate(0.0)
            .with_pheromone_max(0.5);
        let mut rng = create_rng(8);
        let mut runner = AcoRunner::new(&ring(8), config).unwrap();
        while runner.step(&mut rng).is_some() {}
        assert!(runner.pheromone().cells().iter().all(|&c| c <= 0.5));
    }

    #[test]
    fn test_finds_ring_optimum() {
        let cities = ring(10);
        let optimal = cities.distance_matrix().tour_length(&(0..10).collect::<Vec<_>>());
        let config = AcoConfig::default().with_num_ants(20).with_iterations(50).with_seed(42);
        let result = AcoRunner::run(&cities, &config).unwrap();
        let best = result.best.unwrap();
        assert!(
            best.distance() <= optimal * 1.05,
            "expected near-optimal ring tour: {} vs {optimal}",
            best.distance()
        );
    }

    #[test]
    fn test_cancel_before_first_iteration() {
        let mut rng = create_rng(1);
        let cancel = Arc::new(AtomicBool::new(true));
        let result =
            AcoRunner::run_with_cancel(&ring(5), &AcoConfig::default(), &mut rng, Some(cancel))
                .unwrap();
        assert!(result.cancelled);
        assert!(result.best.is_none());
        assert!(result.best_history.is_empty());
    }

    #[test]
    fn test_roulette_uniform_fallback() {
        let mut rng = create_rng(2);
        let mut counts = [0u32; 3];
        for _ in 0..3000 {
            counts[roulette(&[0.0, 0.0, 0.0], &mut rng)] += 1;
        }
        assert!(counts.iter().all(|&c| c > 800), "{counts:?}");
        for _ in 0..100 {
            assert_eq!(roulette(&[0.0, 1.0, 0.0], &mut rng), 1);
        }
    }

    #[test]
    fn test_roulette_infinite_weights_take_all_mass() {
        let mut rng = create_rng(3);
        let mut counts = [0u32; 4];
        for _ in 0..2000 {
            counts[roulette(&[f64::INFINITY, 5.0, f64::INFINITY, 0.0], &mut rng)] += 1;
        }
        assert_eq!(counts[1] + counts[3], 0, "{counts:?}");
        assert!(counts[0] > 800 && counts[2] > 800, "{counts:?}");
    }

    #[test]
    fn test_roulette_rescales_overflowing_sum() {
        let mut rng = create_rng(4);
        let weights = [f64::MAX, f64::MAX, 0.0];
        assert_eq!(weights.iter().sum::<f64>(), f64::INFINITY);
        let mut counts = [0u32; 3];
        for _ in 0..2000 {
            counts[roulette(&weights, &mut rng)] += 1;
        }
        assert_eq!(counts[2], 0);
        assert!(counts[0] > 800 && counts[1] > 800, "{counts:?}");
    }

    #[test]
    fn test_coincident_cities_with_steep_beta_stay_together() {
        // (1 / 1e-6)^60 overflows, so the coincident partner must win outright.
        let cities =
            CityMap::from_pairs([("A", 0.0, 0.0), ("B", 0.0, 0.0), ("C", 500.0, 0.0)]).unwrap();
        let dm = cities.distance_matrix();
        let pheromone = PheromoneMatrix::new(3, 0.1);
        let mut rng = create_rng(6);
        for _ in 0..500 {
            let tour = construct_tour(&pheromone, &dm, 1.0, 60.0, &mut rng);
            match tour[0] {
                0 => assert_eq!(tour[1], 1),
                1 => assert_eq!(tour[1], 0),
                _ => {}
            }
        }
    }
}
