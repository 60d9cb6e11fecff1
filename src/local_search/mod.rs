//! Deterministic local search over complete tours.
//!
//! - [`two_opt_improve`]: first-improvement 2-opt hill climbing
//!
//! The stochastic refiner lives in [`crate::sa`].

mod two_opt;

pub use two_opt::two_opt_improve;
