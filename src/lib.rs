//! Heuristic solvers for the symmetric Euclidean Traveling Salesman Problem.
//!
//! Cities are named points in the plane. A [`Tour`] visits every city once
//! and returns to its start; its length is the quantity every solver
//! minimizes.
//!
//! - **Genetic Algorithm (GA)**: tournament selection, ordered crossover and
//!   swap mutation with elitist truncation. The final best tour is chained
//!   through 2-opt and Simulated Annealing.
//! - **Ant Colony Optimization (ACO)**: probabilistic construction guided by
//!   evaporating pheromone trails.
//! - **2-opt**: first-improvement segment reversal until a local optimum.
//! - **Simulated Annealing (SA)**: swap-neighborhood annealing with
//!   geometric cooling that returns the best tour visited.
//!
//! [`controller::RunController`] drives GA or ACO one step at a time so a
//! caller can observe progress and cancel between steps.
//!
//! # Example
//!
//! ```
//! use u_tsp::controller::{Algorithm, RunController, RunState};
//! use u_tsp::ga::GaConfig;
//! use u_tsp::geometry::CityMap;
//!
//! let cities = CityMap::demo();
//! let mut controller = RunController::seeded(7);
//! controller
//!     .start(Algorithm::Genetic(GaConfig::default().with_generations(30)), &cities)
//!     .unwrap();
//!
//! let outcome = controller.run_to_end(|_| {}).unwrap();
//! assert_eq!(outcome.state, RunState::Completed);
//! assert_eq!(outcome.series.len(), 30);
//! ```

pub mod aco;
pub mod controller;
pub mod error;
pub mod ga;
pub mod geometry;
pub mod local_search;
pub mod random;
pub mod sa;
pub mod tour;

pub use error::{TspError, TspResult};
pub use geometry::{CityMap, DistanceMatrix, Point};
pub use tour::Tour;
