//! Tournament selection over a tour population.
//!
//! Each tournament samples its contestants uniformly *without replacement*
//! from the full population, so a tournament never contains the same tour
//! twice. Separate tournaments are independent: a tour can win more than once.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use crate::tour::Tour;
use rand::seq::index;
use rand::Rng;

/// Runs one tournament and returns the winner's index.
///
/// The effective size is `k` clamped to `1..=population.len()`. Ties keep the
/// contestant drawn first.
///
/// # Panics
/// Panics if `population` is empty.
pub fn tournament<R: Rng>(population: &[Tour], k: usize, rng: &mut R) -> usize {
    assert!(!population.is_empty(), "cannot select from empty population");

    let k = k.clamp(1, population.len());
    index::sample(rng, population.len(), k)
        .into_iter()
        .reduce(|best, idx| {
            if population[idx].is_better_than(&population[best]) {
                idx
            } else {
                best
            }
        })
        .unwrap_or(0)
}

/// Draws `count` parents by independent tournaments of size `k`.
pub fn select_parents<R: Rng>(
    population: &[Tour],
    count: usize,
    k: usize,
    rng: &mut R,
) -> Vec<usize> {
    if population.is_empty() {
        return Vec::new();
    }
    (0..count).map(|_| tournament(population, k, rng)).collect()
}
