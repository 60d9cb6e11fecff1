//! Permutation operators for the tour GA.
//!
//! Both operators work on `&[usize]` city-index permutations and never
//! produce an invalid permutation from valid input.
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Cicirello (2023), "Genetic Operators for Permutation Representation"

use crate::random::distinct_pair;
use rand::Rng;

// ============================================================================
// Crossover
// ============================================================================

/// Order Crossover (OX) producing a single child.
///
/// 1. Pick two distinct cut points `start < end`
/// 2. Copy `parent1[start..=end]` into the child at the same positions
/// 3. Fill the remaining positions left to right with `parent2`'s cities in
///    `parent2`'s order, skipping cities already placed
///
/// Parents shorter than two cities are returned as a copy of `parent1`.
///
/// # Complexity
/// O(n) time, O(n) space
///
/// # Panics
/// Panics if the parents have different lengths.
pub fn order_crossover<R: Rng>(parent1: &[usize], parent2: &[usize], rng: &mut R) -> Vec<usize> {
    assert_eq!(parent1.len(), parent2.len(), "parents must have equal length");
    match distinct_pair(parent1.len(), rng) {
        Some((a, b)) => order_crossover_at(parent1, parent2, a.min(b), a.max(b)),
        None => parent1.to_vec(),
    }
}

/// OX with fixed cut points `[start, end]` (inclusive).
///
/// # Panics
/// Panics if `start > end`, `end` is out of range, or the parents differ in
/// length.
pub fn order_crossover_at(
    parent1: &[usize],
    parent2: &[usize],
    start: usize,
    end: usize,
) -> Vec<usize> {
    let n = parent1.len();
    assert_eq!(n, parent2.len(), "parents must have equal length");
    assert!(start <= end && end < n, "invalid cut points {start}..={end} for length {n}");

    let mut child = vec![usize::MAX; n];
    let mut placed = vec![false; n];

    for i in start..=end {
        child[i] = parent1[i];
        placed[parent1[i]] = true;
    }

    let mut donor = parent2.iter().copied().filter(|&c| !placed[c]);
    for slot in child.iter_mut().filter(|slot| **slot == usize::MAX) {
        // Both parents hold the same cities, so the donor fills every gap.
        if let Some(c) = donor.next() {
            *slot = c;
        }
    }

    child
}

// ============================================================================
// Mutation
// ============================================================================

/// Swaps two distinct random positions. No-op for fewer than two cities.
///
/// # Complexity
/// O(1)
pub fn swap_mutation<R: Rng>(perm: &mut [usize], rng: &mut R) {
    if let Some((i, j)) = distinct_pair(perm.len(), rng) {
        perm.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use std::collections::HashSet;

    fn is_valid_permutation(perm: &[usize], n: usize) -> bool {
        if perm.len() != n {
            return false;
        }
        let set: HashSet<usize> = perm.iter().copied().collect();
        set.len() == n && perm.iter().all(|&v| v < n)
    }

    #[test]
    fn test_ox_produces_valid_permutations() {
        let mut rng = create_rng(42);
        let p1 = vec![0, 1, 2, 3, 4, 5, 6, 7];
        let p2 = vec![7, 6, 5, 4, 3, 2, 1, 0];

        for _ in 0..100 {
            let child = order_crossover(&p1, &p2, &mut rng);
            assert!(is_valid_permutation(&child, 8), "OX child not valid: {child:?}");
        }
    }

    #[test]
    fn test_ox_fixed_cut_points() {
        let p1 = vec![0, 1, 2, 3, 4, 5];
        let p2 = vec![5, 3, 1, 0, 4, 2];
        let child = order_crossover_at(&p1, &p2, 2, 3);
        // segment [2, 3] kept in place, gaps filled with 5, 1, 0, 4 from p2
        assert_eq!(child, vec![5, 1, 2, 3, 0, 4]);
    }

    #[test]
    fn test_ox_full_segment_copies_parent1() {
        let p1 = vec![3, 1, 0, 2];
        let p2 = vec![0, 1, 2, 3];
        assert_eq!(order_crossover_at(&p1, &p2, 0, 3), p1);
    }

    #[test]
    fn test_ox_identical_parents() {
        let mut rng = create_rng(9);
        let p = vec![4, 2, 0, 3, 1];
        for _ in 0..20 {
            assert_eq!(order_crossover(&p, &p, &mut rng), p);
        }
    }

    #[test]
    fn test_ox_single_element() {
        let mut rng = create_rng(42);
        assert_eq!(order_crossover(&[0], &[0], &mut rng), vec![0]);
    }

    #[test]
    #[should_panic(expected = "parents must have equal length")]
    fn test_ox_length_mismatch_panics() {
        let mut rng = create_rng(42);
        order_crossover(&[0, 1, 2], &[0, 1], &mut rng);
    }

    #[test]
    fn test_swap_changes_exactly_two_positions() {
        let mut rng = create_rng(42);
        let original: Vec<usize> = (0..10).collect();
        for _ in 0..100 {
            let mut perm = original.clone();
            swap_mutation(&mut perm, &mut rng);
            let diff = perm.iter().zip(&original).filter(|(a, b)| a != b).count();
            assert_eq!(diff, 2);
            assert!(is_valid_permutation(&perm, 10));
        }
    }

    #[test]
    fn test_swap_single_element() {
        let mut rng = create_rng(42);
        let mut perm = vec![0];
        swap_mutation(&mut perm, &mut rng);
        assert_eq!(perm, vec![0]);
    }
}
