//! ACO configuration.

use crate::error::{TspError, TspResult};

/// Configuration for Ant Colony Optimization.
///
/// # Examples
///
/// ```
/// use u_tsp::aco::AcoConfig;
///
/// let config = AcoConfig::default()
///     .with_num_ants(30)
///     .with_iterations(200)
///     .with_evaporation_rate(0.2)
///     .with_beta(3.0);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AcoConfig {
    /// Tours constructed per iteration.
    pub num_ants: usize,

    /// Number of iterations to run.
    pub iterations: usize,

    /// Value every pheromone cell starts with. Must be positive.
    pub pheromone_init: f64,

    /// Fraction of pheromone removed each iteration (0.0–1.0).
    pub evaporation_rate: f64,

    /// Pheromone exponent. Higher values follow learned trails more closely.
    pub alpha: f64,

    /// Inverse-distance exponent. Higher values favor near cities.
    pub beta: f64,

    /// Optional ceiling applied after each deposit. `None` leaves pheromone
    /// uncapped.
    pub pheromone_max: Option<f64>,

    /// Seed for [`AcoRunner::run`](super::AcoRunner::run). `None` draws one.
    pub seed: Option<u64>,
}

impl Default for AcoConfig {
    fn default() -> Self {
        Self {
            num_ants: 50,
            iterations: 100,
            pheromone_init: 0.1,
            evaporation_rate: 0.1,
            alpha: 1.0,
            beta: 2.0,
            pheromone_max: None,
            seed: None,
        }
    }
}

impl AcoConfig {
    pub fn with_num_ants(mut self, n: usize) -> Self {
        self.num_ants = n;
        self
    }

    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_pheromone_init(mut self, value: f64) -> Self {
        self.pheromone_init = value;
        self
    }

    pub fn with_evaporation_rate(mut self, rate: f64) -> Self {
        self.evaporation_rate = rate;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    pub fn with_pheromone_max(mut self, max: f64) -> Self {
        self.pheromone_max = Some(max);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TspResult<()> {
        if self.num_ants == 0 {
            return Err(TspError::InvalidParameter("num_ants must be at least 1".into()));
        }
        if self.iterations == 0 {
            return Err(TspError::InvalidParameter("iterations must be at least 1".into()));
        }
        if !(self.pheromone_init > 0.0 && self.pheromone_init.is_finite()) {
            return Err(TspError::InvalidParameter(format!(
                "pheromone_init must be positive and finite, got {}",
                self.pheromone_init
            )));
        }
        if !(0.0..=1.0).contains(&self.evaporation_rate) {
            return Err(TspError::InvalidParameter(format!(
                "evaporation_rate must be in [0, 1], got {}",
                self.evaporation_rate
            )));
        }
        if !(self.alpha >= 0.0 && self.alpha.is_finite()) {
            return Err(TspError::InvalidParameter(format!(
                "alpha must be non-negative, got {}",
                self.alpha
            )));
        }
        if !(self.beta >= 0.0 && self.beta.is_finite()) {
            return Err(TspError::InvalidParameter(format!(
                "beta must be non-negative, got {}",
                self.beta
            )));
        }
        if let Some(max) = self.pheromone_max {
            if !(max > 0.0) {
                return Err(TspError::InvalidParameter(format!(
                    "pheromone_max must be positive, got {max}"
                )));
            }
        }
        Ok(())
    }
}
