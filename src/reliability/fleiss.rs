//! Fleiss' kappa over all coders jointly.
//!
//! With `m` coders and `count[i][c]` = coders that chose category `c` at
//! position `i`:
//!
//! ```text
//! P_i = (Σ_c count[i][c]² − m) / (m(m − 1))     per-position agreement
//! P̄   = mean_i P_i
//! p_c = Σ_i count[i][c] / (N · m)               pooled marginal
//! P_e = Σ_c p_c²
//! κ   = (P̄ − P_e) / (1 − P_e)
//! ```

use super::{chance_corrected, check_matrices, RowCategories};
use crate::matrix::CoderMatrix;
use crate::Result;
use serde::Serialize;

/// Breakdown of Fleiss' kappa.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FleissDetails {
    /// Mean per-position agreement `P̄`
    pub observed_agreement: f64,
    /// Chance agreement `P_e`
    pub expected_agreement: f64,
    /// Number of positions
    pub n_cases: usize,
    /// Number of coders
    pub n_coders: usize,
    /// Number of distinct categories pooled across coders
    pub n_categories: usize,
}

pub(crate) fn compute(matrices: &[CoderMatrix]) -> Result<(f64, FleissDetails)> {
    let n_cases = check_matrices(matrices)?;
    let categories = RowCategories::from_matrices(matrices);
    let n_coders = matrices.len();
    let n_categories = categories.n_categories();
    let m = n_coders as f64;

    let mut totals = vec![0usize; n_categories];
    let mut counts = vec![0usize; n_categories];
    let mut touched: Vec<usize> = Vec::with_capacity(n_coders);
    let mut p_sum = 0.0;

    for case in 0..n_cases {
        for coder in 0..n_coders {
            let c = categories.codes(coder)[case];
            if counts[c] == 0 {
                touched.push(c);
            }
            counts[c] += 1;
        }

        let mut sum_squared = 0usize;
        for &c in &touched {
            sum_squared += counts[c] * counts[c];
            totals[c] += counts[c];
            counts[c] = 0;
        }
        touched.clear();

        p_sum += (sum_squared as f64 - m) / (m * (m - 1.0));
    }

    let p_bar = p_sum / n_cases as f64;
    let n_ratings = (n_cases * n_coders) as f64;
    let p_e: f64 = totals
        .iter()
        .map(|&t| {
            let p = t as f64 / n_ratings;
            p * p
        })
        .sum();

    let kappa = chance_corrected(p_bar, p_e);
    Ok((
        kappa,
        FleissDetails {
            observed_agreement: p_bar,
            expected_agreement: p_e,
            n_cases,
            n_coders,
            n_categories,
        },
    ))
}
