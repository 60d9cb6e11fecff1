//! Ant Colony Optimization (ACO) for closed tours.
//!
//! Each iteration, every ant builds a tour by walking from a random city and
//! choosing the next unvisited city with probability proportional to
//! `pheromone^alpha * (1/distance)^beta`. Trails then evaporate and every
//! ant deposits `1/length` on the edges it used. The run reports the best
//! tour seen; there is no local search afterwards.
//!
//! # Key Types
//!
//! - [`AcoConfig`]: colony size, iteration budget, trail parameters
//! - [`AcoRunner`]: stepwise state machine
//! - [`PheromoneMatrix`]: symmetric trail levels
//!
//! # References
//!
//! - Dorigo, Maniezzo & Colorni (1996), "Ant System: Optimization by a
//!   Colony of Cooperating Agents"

mod config;
mod pheromone;
mod runner;

pub use config::AcoConfig;
pub use pheromone::PheromoneMatrix;
pub use runner::{construct_tour, AcoResult, AcoRunner, IterationStats, ACO_MIN_CITIES};
