//! SA configuration.

use crate::error::{TspError, TspResult};

/// Temperature at or below which annealing stops.
pub const DEFAULT_MIN_TEMPERATURE: f64 = 1e-6;

/// Configuration for the Simulated Annealing refiner.
///
/// Cooling is geometric: after every iteration
/// `T = T * temperature_reduction_rate`.
///
/// # Examples
///
/// ```
/// use u_tsp::sa::SaConfig;
///
/// let config = SaConfig::default()
///     .with_initial_temperature(50.0)
///     .with_temperature_reduction_rate(0.99)
///     .with_max_iterations(5_000);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SaConfig {
    /// Starting temperature. Higher values accept more uphill moves early on.
    pub initial_temperature: f64,

    /// Geometric cooling factor in `(0, 1]`.
    pub temperature_reduction_rate: f64,

    /// Hard iteration budget (neighbor evaluations).
    pub max_iterations: usize,

    /// Near-zero floor: annealing stops once the temperature reaches it, and
    /// no worsening move is ever accepted at or below it. Must be finite and
    /// below `initial_temperature`.
    pub min_temperature: f64,

    /// Seed for [`SaRunner::run`](super::SaRunner::run). `None` draws one.
    pub seed: Option<u64>,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 100.0,
            temperature_reduction_rate: 0.95,
            max_iterations: 100,
            min_temperature: DEFAULT_MIN_TEMPERATURE,
            seed: None,
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_temperature_reduction_rate(mut self, rate: f64) -> Self {
        self.temperature_reduction_rate = rate;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn with_min_temperature(mut self, t: f64) -> Self {
        self.min_temperature = t;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> TspResult<()> {
        if !(self.initial_temperature > 0.0 && self.initial_temperature.is_finite()) {
            return Err(TspError::InvalidParameter(format!(
                "initial_temperature must be positive and finite, got {}",
                self.initial_temperature
            )));
        }
        let rate = self.temperature_reduction_rate;
        if !(rate > 0.0 && rate <= 1.0) {
            return Err(TspError::InvalidParameter(format!(
                "temperature_reduction_rate must be in (0, 1], got {rate}"
            )));
        }
        if self.max_iterations == 0 {
            return Err(TspError::InvalidParameter(
                "max_iterations must be at least 1".into(),
            ));
        }
        let floor = self.min_temperature;
        if !(floor >= 0.0 && floor < self.initial_temperature) {
            return Err(TspError::InvalidParameter(format!(
                "min_temperature must be in [0, initial_temperature), got {floor}"
            )));
        }
        Ok(())
    }
}
