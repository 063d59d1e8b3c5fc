//! Row-vector categories shared by the kappa and alpha coefficients.

use crate::matrix::CoderMatrix;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Every position of every coder, recoded as a category id.
///
/// Categories are the distinct label-set rows observed across all coders,
/// sorted column-wise (column 0 most significant, absent before present) and
/// numbered from 0. The all-zero row, when observed, is always category 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCategories {
    codes: Vec<Vec<usize>>,
    n_categories: usize,
}

impl RowCategories {
    /// Recode a set of equally shaped matrices.
    #[must_use]
    pub fn from_matrices(matrices: &[CoderMatrix]) -> Self {
        let distinct: HashSet<&[u64]> = matrices.iter().flat_map(|m| m.rows()).collect();
        let mut ordered: Vec<&[u64]> = distinct.into_iter().collect();
        ordered.sort_by(|a, b| compare_rows(a, b));

        let ids: HashMap<&[u64], usize> = ordered
            .iter()
            .enumerate()
            .map(|(id, &row)| (row, id))
            .collect();

        let codes = matrices
            .iter()
            .map(|m| m.rows().map(|row| ids[row]).collect())
            .collect();

        Self {
            codes,
            n_categories: ordered.len(),
        }
    }

    /// Number of distinct categories.
    #[must_use]
    pub fn n_categories(&self) -> usize {
        self.n_categories
    }

    /// Number of coders.
    #[must_use]
    pub fn n_coders(&self) -> usize {
        self.codes.len()
    }

    /// Number of positions.
    #[must_use]
    pub fn n_cases(&self) -> usize {
        self.codes.first().map_or(0, Vec::len)
    }

    /// Category of each position for one coder.
    #[must_use]
    pub fn codes(&self, coder: usize) -> &[usize] {
        &self.codes[coder]
    }

    /// How often `coder` used each category.
    #[must_use]
    pub fn counts(&self, coder: usize) -> Vec<usize> {
        let mut counts = vec![0; self.n_categories];
        for &c in self.codes(coder) {
            counts[c] += 1;
        }
        counts
    }
}

/// Column-wise lexicographic order of packed rows.
fn compare_rows(a: &[u64], b: &[u64]) -> Ordering {
    for (&x, &y) in a.iter().zip(b) {
        let diff = x ^ y;
        if diff != 0 {
            let lowest = diff & diff.wrapping_neg();
            return if x & lowest != 0 {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }
    }
    Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_puts_empty_row_first() {
        // columns: [L1, L2]
        let a = CoderMatrix::from_dense("a", 2, &[vec![true, false], vec![false, false]]);
        let b = CoderMatrix::from_dense("b", 2, &[vec![false, false], vec![false, true]]);
        let cats = RowCategories::from_matrices(&[a, b]);

        assert_eq!(cats.n_categories(), 3);
        // {} = 0, {L2} = 1, {L1} = 2
        assert_eq!(cats.codes(0), &[2, 0]);
        assert_eq!(cats.codes(1), &[0, 1]);
        assert_eq!(cats.counts(0), vec![1, 0, 1]);
    }

    #[test]
    fn test_pooled_across_coders() {
        let a = CoderMatrix::from_dense("a", 1, &[vec![true], vec![true]]);
        let b = CoderMatrix::from_dense("b", 1, &[vec![false], vec![true]]);
        let cats = RowCategories::from_matrices(&[a, b]);
        assert_eq!(cats.n_categories(), 2);
        assert_eq!(cats.codes(0), &[1, 1]);
        assert_eq!(cats.codes(1), &[0, 1]);
        assert_eq!(cats.n_cases(), 2);
        assert_eq!(cats.n_coders(), 2);
    }

    #[test]
    fn test_multi_label_rows_are_distinct_categories() {
        let a = CoderMatrix::from_dense("a", 2, &[vec![true, true]]);
        let b = CoderMatrix::from_dense("b", 2, &[vec![true, false]]);
        let cats = RowCategories::from_matrices(&[a, b]);
        assert_eq!(cats.n_categories(), 2);
        assert_ne!(cats.codes(0)[0], cats.codes(1)[0]);
    }

    #[test]
    fn test_compare_rows() {
        assert_eq!(compare_rows(&[0b01], &[0b10]), Ordering::Greater);
        assert_eq!(compare_rows(&[0b00], &[0b10]), Ordering::Less);
        assert_eq!(compare_rows(&[0, 1], &[0, 1]), Ordering::Equal);
        assert_eq!(compare_rows(&[0, 1], &[0, 2]), Ordering::Greater);
    }
}
