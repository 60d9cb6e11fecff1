//! GA configuration.
//!
//! [`GaConfig`] holds the evolutionary loop parameters and the settings of
//! the refiners chained after the last generation.

use crate::error::{TspError, TspResult};
use crate::sa::SaConfig;

/// Configuration for the tour Genetic Algorithm.
///
/// # Defaults
///
/// ```
/// use u_tsp::ga::GaConfig;
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 100);
/// assert_eq!(config.generations, 150);
/// assert_eq!(config.tournament_size, 5);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_tsp::ga::GaConfig;
/// use u_tsp::sa::SaConfig;
///
/// let config = GaConfig::default()
///     .with_population_size(200)
///     .with_generations(400)
///     .with_mutation_rate(0.05)
///     .with_annealing(SaConfig::default().with_max_iterations(1_000));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GaConfig {
    /// Number of tours kept after every generation.
    pub population_size: usize,

    /// Number of generations to run.
    pub generations: usize,

    /// Probability that an offspring receives one swap mutation (0.0–1.0).
    pub mutation_rate: f64,

    /// Contestants per tournament. Clamped to the population size when
    /// selecting.
    pub tournament_size: usize,

    /// Annealing applied after 2-opt once the last generation completes.
    pub annealing: SaConfig,

    /// Evaluate offspring in parallel with rayon.
    ///
    /// Only effective with the `parallel` feature. Evaluation consumes no
    /// random draws, so seeded runs give identical results either way.
    pub parallel: bool,

    /// Seed for [`GaRunner::run`](super::GaRunner::run). `None` draws one.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            generations: 150,
            mutation_rate: 0.2,
            tournament_size: 5,
            annealing: SaConfig::default(),
            parallel: false,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the annealing refiner configuration.
    pub fn with_annealing(mut self, annealing: SaConfig) -> Self {
        self.annealing = annealing;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration, including the chained annealing settings.
    pub fn validate(&self) -> TspResult<()> {
        if self.population_size == 0 {
            return Err(TspError::InvalidParameter(
                "population_size must be at least 1".into(),
            ));
        }
        if self.generations == 0 {
            return Err(TspError::InvalidParameter(
                "generations must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(TspError::InvalidParameter(format!(
                "mutation_rate must be in [0, 1], got {}",
                self.mutation_rate
            )));
        }
        if self.tournament_size == 0 {
            return Err(TspError::InvalidParameter(
                "tournament_size must be at least 1".into(),
            ));
        }
        self.annealing.validate()
    }
}
