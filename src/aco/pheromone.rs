//! Pheromone trail matrix.

use crate::tour::Tour;

/// Square matrix of pheromone levels between city indices.
///
/// Deposits always update `[i][j]` and `[j][i]` together, so the matrix
/// stays symmetric.
#[derive(Debug, Clone, PartialEq)]
pub struct PheromoneMatrix {
    n: usize,
    data: Vec<f64>,
}

impl PheromoneMatrix {
    /// Creates an `n x n` matrix with every cell set to `init`.
    pub fn new(n: usize, init: f64) -> Self {
        Self {
            n,
            data: vec![init; n * n],
        }
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[f64] {
        &self.data
    }

    /// Multiplies every cell by `1 - rate`.
    pub fn evaporate(&mut self, rate: f64) {
        let keep = 1.0 - rate;
        for cell in &mut self.data {
            *cell *= keep;
        }
    }

    /// Adds `amount` to both directions of every edge of the closed tour.
    pub fn deposit(&mut self, tour: &Tour, amount: f64) {
        let order = tour.cities();
        if order.len() < 2 {
            return;
        }
        let closing = (order[order.len() - 1], order[0]);
        for (a, b) in order.windows(2).map(|w| (w[0], w[1])).chain(std::iter::once(closing)) {
            self.data[a * self.n + b] += amount;
            self.data[b * self.n + a] += amount;
        }
    }

    /// Caps every cell at `max`.
    pub fn clamp_max(&mut self, max: f64) {
        for cell in &mut self.data {
            *cell = cell.min(max);
        }
    }
}
