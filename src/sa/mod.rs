//! Simulated Annealing (SA) tour refiner.
//!
//! Starts from a given tour and explores swap neighbors, accepting worsening
//! moves with a probability that shrinks as the temperature cools
//! geometrically. Returns the best tour seen, not the last one visited.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"

mod config;
mod runner;

pub use config::{SaConfig, DEFAULT_MIN_TEMPERATURE};
pub use runner::{SaResult, SaRunner};
