//! Genetic Algorithm for closed tours.
//!
//! Individuals are city-index permutations. Each generation draws parents by
//! tournament, breeds them pairwise with ordered crossover, applies swap
//! mutation, and keeps the best `population_size` tours of parents and
//! offspring combined. A completed run polishes its best tour with 2-opt
//! and Simulated Annealing.
//!
//! # Key Types
//!
//! - [`GaConfig`]: population size, generations, mutation rate, SA settings
//! - [`GaRunner`]: stepwise state machine
//! - [`GaResult`]: raw, 2-opt and refined tours plus the fitness history
//!
//! # Submodules
//!
//! - [`operators`]: ordered crossover and swap mutation
//! - [`selection`]: tournament selection
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains" (OX)

mod config;
pub mod operators;
mod runner;
pub mod selection;

pub use config::GaConfig;
pub use runner::{GaResult, GaRunner, GenerationStats, GA_MIN_CITIES};
