//! Pairwise Cohen's kappa.
//!
//! ```text
//! κ = (Po − Pe) / (1 − Pe)
//!
//! Po = share of positions where both coders chose the same category
//! Pe = Σ_c P_i(c) · P_j(c)     (product of each coder's own marginals)
//! ```
//!
//! Categories are the distinct label-set rows (see [`RowCategories`]). The
//! overall value is the mean over all coder pairs.

use super::{chance_corrected, check_matrices, map_pairs, mean, pair_label, RowCategories};
use crate::matrix::CoderMatrix;
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Kappa of one coder pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairKappa {
    /// Zero-based coder indices `(i, j)`, `i < j`
    pub coders: (usize, usize),
    /// Report key, e.g. `"cols 1 & 2"`
    pub label: String,
    /// Cohen's kappa
    pub kappa: f64,
    /// Observed agreement `Po`
    pub observed: f64,
    /// Chance agreement `Pe`
    pub expected: f64,
}

/// Per-pair breakdown of Cohen's kappa.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseKappa {
    /// One entry per unordered coder pair
    pub pairs: Vec<PairKappa>,
    /// Number of distinct categories pooled across coders
    pub n_categories: usize,
}

impl PairwiseKappa {
    /// Kappa keyed by pair label.
    #[must_use]
    pub fn by_pair(&self) -> BTreeMap<String, f64> {
        self.pairs.iter().map(|p| (p.label.clone(), p.kappa)).collect()
    }
}

/// `(kappa, Po, Pe)` for coders `i` and `j`.
fn pair_kappa(categories: &RowCategories, i: usize, j: usize) -> (f64, f64, f64) {
    let a = categories.codes(i);
    let b = categories.codes(j);
    let n = a.len() as f64;

    let agreed = a.iter().zip(b).filter(|(x, y)| x == y).count();
    let po = agreed as f64 / n;

    let pe: f64 = categories
        .counts(i)
        .iter()
        .zip(categories.counts(j))
        .map(|(&ci, cj)| (ci as f64 / n) * (cj as f64 / n))
        .sum();

    (chance_corrected(po, pe), po, pe)
}

pub(crate) fn compute(matrices: &[CoderMatrix], parallel: bool) -> Result<(f64, PairwiseKappa)> {
    check_matrices(matrices)?;
    let categories = RowCategories::from_matrices(matrices);

    let pairs = map_pairs(matrices.len(), parallel, |i, j| {
        let (kappa, observed, expected) = pair_kappa(&categories, i, j);
        PairKappa {
            coders: (i, j),
            label: pair_label(i, j),
            kappa,
            observed,
            expected,
        }
    });

    let overall = mean(pairs.iter().map(|p| p.kappa));
    Ok((
        overall,
        PairwiseKappa {
            pairs,
            n_categories: categories.n_categories(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_label(id: &str, cells: &[bool]) -> CoderMatrix {
        let rows: Vec<Vec<bool>> = cells.iter().map(|&c| vec![c]).collect();
        CoderMatrix::from_dense(id, 1, &rows)
    }

    #[test]
    fn test_identical_coders() {
        let a = single_label("a", &[true, false, true, false]);
        let (value, details) = compute(&[a.clone(), a], false).unwrap();
        assert_eq!(value, 1.0);
        assert_eq!(details.pairs[0].observed, 1.0);
        assert!((details.pairs[0].expected - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_constant_coders_hit_degenerate_rule() {
        // Both coders used one category everywhere: Pe = 1, Po = 1.
        let a = single_label("a", &[false, false, false]);
        let (value, details) = compute(&[a.clone(), a], false).unwrap();
        assert_eq!(value, 1.0);
        assert_eq!(details.pairs[0].expected, 1.0);
    }

    #[test]
    fn test_textbook_example() {
        // 10 items, 2 categories:
        //            b=yes  b=no
        //   a=yes      4      2
        //   a=no       1      3
        // Po = 0.7, Pe = 0.6*0.5 + 0.4*0.5 = 0.5, κ = 0.4
        let a = single_label(
            "a",
            &[true, true, true, true, true, true, false, false, false, false],
        );
        let b = single_label(
            "b",
            &[true, true, true, true, false, false, true, false, false, false],
        );
        let (value, details) = compute(&[a, b], false).unwrap();
        assert!((details.pairs[0].observed - 0.7).abs() < 1e-12);
        assert!((details.pairs[0].expected - 0.5).abs() < 1e-12);
        assert!((value - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_coverage_is_below_chance() {
        // a: [L1, L1, -, -], b: [-, -, L2, L2]
        let a = CoderMatrix::from_dense(
            "a",
            2,
            &[vec![true, false], vec![true, false], vec![], vec![]],
        );
        let b = CoderMatrix::from_dense(
            "b",
            2,
            &[vec![], vec![], vec![false, true], vec![false, true]],
        );
        let (value, details) = compute(&[a, b], false).unwrap();
        assert_eq!(details.n_categories, 3);
        assert!((details.pairs[0].expected - 0.25).abs() < 1e-12);
        assert!((value + 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_pair_order_is_symmetric() {
        let a = single_label("a", &[true, false, true, true]);
        let b = single_label("b", &[true, true, false, true]);
        let (ab, _) = compute(&[a.clone(), b.clone()], false).unwrap();
        let (ba, _) = compute(&[b, a], false).unwrap();
        assert!((ab - ba).abs() < 1e-12);
    }
}
