//! Tour representation and fitness.
//!
//! A [`Tour`] is a permutation of city indices together with its cached
//! cyclic length. Fitness is the length itself: lower is better.

use crate::error::{TspError, TspResult};
use crate::geometry::{CityMap, DistanceMatrix};
use std::cmp::Ordering;

/// A Hamiltonian cycle over city indices with its cached length.
///
/// With the `serde` feature a tour serializes but does not deserialize; the
/// cached length is only trusted when computed here. Rebuild stored orders
/// with [`Tour::from_order`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Tour {
    cities: Vec<usize>,
    distance: f64,
}

impl Tour {
    /// Builds a tour from an index order and computes its length.
    ///
    /// The order is not validated; use [`Tour::from_order`] for untrusted input.
    pub(crate) fn new(cities: Vec<usize>, distances: &DistanceMatrix) -> Self {
        let distance = distances.tour_length(&cities);
        Self { cities, distance }
    }

    /// Builds a tour whose length is already known.
    pub(crate) fn with_distance(cities: Vec<usize>, distance: f64) -> Self {
        Self { cities, distance }
    }

    /// Validates that `order` is a permutation of `0..distances.len()` and
    /// evaluates it.
    pub fn from_order(order: Vec<usize>, distances: &DistanceMatrix) -> TspResult<Self> {
        let n = distances.len();
        if order.len() != n {
            return Err(TspError::InvalidTour(format!(
                "expected {n} cities, got {}",
                order.len()
            )));
        }
        let mut seen = vec![false; n];
        for &c in &order {
            if c >= n {
                return Err(TspError::UnknownCity(format!("#{c}")));
            }
            if std::mem::replace(&mut seen[c], true) {
                return Err(TspError::InvalidTour(format!("city #{c} appears twice")));
            }
        }
        Ok(Self::new(order, distances))
    }

    /// City indices in visiting order.
    pub fn cities(&self) -> &[usize] {
        &self.cities
    }

    /// Total cyclic length.
    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn into_cities(self) -> Vec<usize> {
        self.cities
    }

    /// City ids in visiting order.
    pub fn names<'a>(&self, cities: &'a CityMap) -> Vec<&'a str> {
        self.cities.iter().map(|&i| cities.id(i)).collect()
    }

    /// Recomputes the cached length after the order was changed in place.
    pub(crate) fn evaluate(&mut self, distances: &DistanceMatrix) {
        self.distance = distances.tour_length(&self.cities);
    }

    pub(crate) fn cities_mut(&mut self) -> &mut [usize] {
        &mut self.cities
    }

    /// `true` if this tour is strictly shorter than `other`.
    pub fn is_better_than(&self, other: &Tour) -> bool {
        self.distance < other.distance
    }

    /// Total ordering by distance, shortest first.
    pub fn cmp_by_distance(&self, other: &Tour) -> Ordering {
        self.distance.total_cmp(&other.distance)
    }

    /// `true` if the tour visits every index in `0..n` exactly once.
    pub fn is_permutation_of(&self, n: usize) -> bool {
        if self.cities.len() != n {
            return false;
        }
        let mut seen = vec![false; n];
        self.cities
            .iter()
            .all(|&c| c < n && !std::mem::replace(&mut seen[c], true))
    }
}

/// Returns the shortest tour, keeping the first one on ties.
pub fn shortest(tours: &[Tour]) -> Option<&Tour> {
    tours.iter().reduce(|best, t| if t.is_better_than(best) { t } else { best })
}
