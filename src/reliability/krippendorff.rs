//! Krippendorff's alpha at nominal, ordinal, interval and ratio levels.
//!
//! Each position is a unit rated by every coder. Within a unit of `m_u`
//! ratings, every ordered pair of distinct coders adds `1 / (m_u − 1)` to the
//! coincidence cell of their two categories, so a unit contributes exactly
//! `m_u` to the matrix total.
//!
//! ```text
//! n_c = Σ_k o[c][k]            n = Σ_c n_c
//! Do  = Σ o[c][k] · δ(c,k) / n
//! De  = Σ n_c · n_k · δ(c,k) / (n(n − 1))
//! α   = 1 − Do / De
//! ```
//!
//! | Level | δ(c, k) |
//! |-------|---------|
//! | nominal | 0 if c = k, else 1 |
//! | ordinal | (Σ_{g=min..=max} n_g − (n_c + n_k)/2)² |
//! | interval | (c − k)² |
//! | ratio | ((c − k)/(c + k))², 0 when c + k = 0 |
//!
//! Category ids come from [`RowCategories`], so interval and ratio distances
//! follow the column-wise ordering of label-set rows.

use super::{check_matrices, RowCategories, DEGENERATE_EPS};
use crate::matrix::CoderMatrix;
use crate::{LevelOfMeasurement, Result};
use serde::Serialize;

/// Square matrix of weighted category co-occurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct CoincidenceMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl CoincidenceMatrix {
    /// Accumulate coincidences for every position of every coder.
    #[must_use]
    pub fn from_categories(categories: &RowCategories) -> Self {
        let size = categories.n_categories();
        let n_coders = categories.n_coders();
        let mut matrix = Self {
            size,
            cells: vec![0.0; size * size],
        };
        if n_coders < 2 {
            return matrix;
        }

        let weight = 1.0 / (n_coders as f64 - 1.0);
        let mut counts = vec![0usize; size];
        let mut present: Vec<usize> = Vec::with_capacity(n_coders);

        for case in 0..categories.n_cases() {
            for coder in 0..n_coders {
                let c = categories.codes(coder)[case];
                if counts[c] == 0 {
                    present.push(c);
                }
                counts[c] += 1;
            }

            for &c in &present {
                for &k in &present {
                    let pairs = if c == k {
                        counts[c] * (counts[c] - 1)
                    } else {
                        counts[c] * counts[k]
                    };
                    matrix.cells[c * size + k] += pairs as f64 * weight;
                }
            }

            for &c in &present {
                counts[c] = 0;
            }
            present.clear();
        }
        matrix
    }

    /// Number of categories.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cell `o[c][k]`.
    #[must_use]
    pub fn get(&self, c: usize, k: usize) -> f64 {
        self.cells[c * self.size + k]
    }

    /// Row sums `n_c`.
    #[must_use]
    pub fn marginals(&self) -> Vec<f64> {
        self.cells
            .chunks(self.size.max(1))
            .take(self.size)
            .map(|row| row.iter().sum())
            .collect()
    }

    /// Sum of all cells `n`.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cells.iter().sum()
    }
}

/// Breakdown of Krippendorff's alpha.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlphaDetails {
    /// Level of measurement used
    pub level: LevelOfMeasurement,
    /// Total pairable values `n`
    pub n_decisions: usize,
    /// Number of categories
    pub n_categories: usize,
    /// Observed disagreement `Do`
    pub observed_disagreement: f64,
    /// Expected disagreement `De`
    pub expected_disagreement: f64,
    /// `Σ o[c][k] · δ(c,k)` (= `Do · n`)
    pub sigma_observed: f64,
    /// `Σ n_c · n_k · δ(c,k)` (= `De · n(n − 1)`)
    pub sigma_expected: f64,
}

/// Squared difference between categories `c` and `k`.
///
/// `cumulative[g]` must hold `Σ_{h<g} n_h` for the ordinal metric.
fn delta(level: LevelOfMeasurement, c: usize, k: usize, marginals: &[f64], cumulative: &[f64]) -> f64 {
    if c == k {
        return 0.0;
    }
    match level {
        LevelOfMeasurement::Nominal => 1.0,
        LevelOfMeasurement::Ordinal => {
            let (lo, hi) = if c < k { (c, k) } else { (k, c) };
            let span = cumulative[hi + 1] - cumulative[lo];
            let d = span - (marginals[c] + marginals[k]) / 2.0;
            d * d
        }
        LevelOfMeasurement::Interval => {
            let d = c as f64 - k as f64;
            d * d
        }
        LevelOfMeasurement::Ratio => {
            let sum = (c + k) as f64;
            if sum == 0.0 {
                0.0
            } else {
                let d = (c as f64 - k as f64) / sum;
                d * d
            }
        }
    }
}

pub(crate) fn compute(matrices: &[CoderMatrix], level: LevelOfMeasurement) -> Result<(f64, AlphaDetails)> {
    check_matrices(matrices)?;
    let categories = RowCategories::from_matrices(matrices);
    let coincidence = CoincidenceMatrix::from_categories(&categories);
    let size = coincidence.size();

    let marginals = coincidence.marginals();
    let n = coincidence.total();
    let mut cumulative = Vec::with_capacity(size + 1);
    cumulative.push(0.0);
    for &m in &marginals {
        let last = cumulative.last().copied().unwrap_or(0.0);
        cumulative.push(last + m);
    }

    let mut sigma_observed = 0.0;
    let mut sigma_expected = 0.0;
    for c in 0..size {
        for k in 0..size {
            let d = delta(level, c, k, &marginals, &cumulative);
            if d == 0.0 {
                continue;
            }
            sigma_observed += coincidence.get(c, k) * d;
            sigma_expected += marginals[c] * marginals[k] * d;
        }
    }

    let observed = if n > 0.0 { sigma_observed / n } else { 0.0 };
    let expected = if n > 1.0 {
        sigma_expected / (n * (n - 1.0))
    } else {
        0.0
    };

    let alpha = if expected.abs() < DEGENERATE_EPS {
        if observed.abs() < DEGENERATE_EPS {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - observed / expected
    };

    Ok((
        alpha,
        AlphaDetails {
            level,
            n_decisions: n.round() as usize,
            n_categories: size,
            observed_disagreement: observed,
            expected_disagreement: expected,
            sigma_observed,
            sigma_expected,
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

    fn disjoint_pair() -> Vec<CoderMatrix> {
        // a: [L1, L1, -, -], b: [-, -, L2, L2]  → categories {}=0, {L2}=1, {L1}=2
        vec![
            CoderMatrix::from_dense("a", 2, &[vec![true, false], vec![true, false], vec![], vec![]]),
            CoderMatrix::from_dense("b", 2, &[vec![], vec![], vec![false, true], vec![false, true]]),
        ]
    }

    #[test]
    fn test_coincidence_totals() {
        let matrices = disjoint_pair();
        let cats = RowCategories::from_matrices(&matrices);
        let o = CoincidenceMatrix::from_categories(&cats);
        assert_eq!(o.total(), 8.0);
        assert_eq!(o.get(0, 2), 2.0);
        assert_eq!(o.get(2, 0), 2.0);
        assert_eq!(o.get(0, 1), 2.0);
        assert_eq!(o.get(1, 1), 0.0);
        assert_eq!(o.marginals(), vec![4.0, 2.0, 2.0]);
    }

    #[test]
    fn test_nominal_disjoint() {
        let (alpha, details) = compute(&disjoint_pair(), LevelOfMeasurement::Nominal).unwrap();
        assert_eq!(details.n_decisions, 8);
        assert!((details.sigma_observed - 8.0).abs() < 1e-12);
        assert!((details.sigma_expected - 40.0).abs() < 1e-12);
        assert!((alpha + 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_interval() {
        // δ(0,1) = 1, δ(0,2) = 4, δ(1,2) = 1
        let (alpha, details) = compute(&disjoint_pair(), LevelOfMeasurement::Interval).unwrap();
        assert!((details.sigma_observed - 20.0).abs() < 1e-12);
        assert!((details.sigma_expected - 88.0).abs() < 1e-12);
        assert!((alpha - (1.0 - 2.5 * 56.0 / 88.0)).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_ordinal() {
        // δ(0,1) = 9, δ(0,2) = 25, δ(1,2) = 4
        let (alpha, details) = compute(&disjoint_pair(), LevelOfMeasurement::Ordinal).unwrap();
        assert!((details.sigma_observed - 136.0).abs() < 1e-12);
        assert!((details.sigma_expected - 576.0).abs() < 1e-12);
        assert!((alpha - (1.0 - 17.0 * 56.0 / 576.0)).abs() < 1e-12);
    }

    #[test]
    fn test_disjoint_ratio() {
        // δ(0,1) = δ(0,2) = 1, δ(1,2) = 1/9
        let (alpha, details) = compute(&disjoint_pair(), LevelOfMeasurement::Ratio).unwrap();
        assert!((details.sigma_observed - 8.0).abs() < 1e-12);
        assert!((details.sigma_expected - (32.0 + 8.0 / 9.0)).abs() < 1e-12);
        assert!((alpha + 0.7027027027027).abs() < 1e-9);
    }

    #[test]
    fn test_identical_coders_all_levels() {
        let a = CoderMatrix::from_dense(
            "a",
            2,
            &[vec![true, false], vec![false, true], vec![], vec![true, true]],
        );
        for level in [
            LevelOfMeasurement::Nominal,
            LevelOfMeasurement::Ordinal,
            LevelOfMeasurement::Interval,
            LevelOfMeasurement::Ratio,
        ] {
            let (alpha, details) = compute(&[a.clone(), a.clone()], level).unwrap();
            assert_eq!(alpha, 1.0, "level {level}");
            assert_eq!(details.sigma_observed, 0.0);
        }
    }

    #[test]
    fn test_single_category_is_degenerate() {
        let a = single_label("a", &[false, false, false]);
        let (alpha, details) = compute(&[a.clone(), a], LevelOfMeasurement::Nominal).unwrap();
        assert_eq!(alpha, 1.0);
        assert_eq!(details.expected_disagreement, 0.0);
    }

    #[test]
    fn test_textbook_binary_nominal() {
        // Two coders, 10 units, binary:
        //   a = 1 1 1 1 1 1 0 0 0 0
        //   b = 1 1 1 1 0 0 1 0 0 0
        // o[0][1] = o[1][0] = 3, o[0][0] = 6, o[1][1] = 8; n0 = 9, n1 = 11, n = 20
        // Do = 6/20, De = 2*9*11/(20*19), α = 1 − 0.3/0.5210526 ≈ 0.42424
        let a = single_label(
            "a",
            &[true, true, true, true, true, true, false, false, false, false],
        );
        let b = single_label(
            "b",
            &[true, true, true, true, false, false, true, false, false, false],
        );
        let (alpha, details) = compute(&[a, b], LevelOfMeasurement::Nominal).unwrap();
        assert!((details.observed_disagreement - 0.3).abs() < 1e-12);
        assert!((details.expected_disagreement - 198.0 / 380.0).abs() < 1e-12);
        assert!((alpha - (1.0 - 0.3 * 380.0 / 198.0)).abs() < 1e-12);
    }

    #[test]
    fn test_two_categories_levels_coincide_for_interval() {
        // With ids 0 and 1, interval δ = 1 = nominal δ.
        let a = single_label("a", &[true, false, true, false]);
        let b = single_label("b", &[true, true, false, false]);
        let (nominal, _) = compute(&[a.clone(), b.clone()], LevelOfMeasurement::Nominal).unwrap();
        let (interval, _) = compute(&[a, b], LevelOfMeasurement::Interval).unwrap();
        assert!((nominal - interval).abs() < 1e-12);
    }

    #[test]
    fn test_ordinal_delta() {
        let marginals = vec![4.0, 2.0, 2.0];
        let cumulative = vec![0.0, 4.0, 6.0, 8.0];
        // δ(0,2) = (4 + 2 + 2 − (4 + 2)/2)² = 25
        let d = delta(LevelOfMeasurement::Ordinal, 0, 2, &marginals, &cumulative);
        assert!((d - 25.0).abs() < 1e-12);
        // δ(1,2) = (2 + 2 − 2)² = 4
        let d = delta(LevelOfMeasurement::Ordinal, 2, 1, &marginals, &cumulative);
        assert!((d - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_ratio_delta() {
        assert_eq!(delta(LevelOfMeasurement::Ratio, 0, 0, &[], &[]), 0.0);
        assert_eq!(delta(LevelOfMeasurement::Ratio, 0, 3, &[], &[]), 1.0);
        let d = delta(LevelOfMeasurement::Ratio, 1, 3, &[], &[]);
        assert!((d - 0.25).abs() < 1e-12);
    }
}
