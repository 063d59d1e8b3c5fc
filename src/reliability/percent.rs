//! Pairwise percent agreement.
//!
//! For a coder pair, the share of positions where both assigned exactly the
//! same label set. Positions neither coder annotated count as agreement.

use super::{check_matrices, map_pairs, mean, pair_label};
use crate::matrix::CoderMatrix;
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Agreement of one coder pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairAgreement {
    /// Zero-based coder indices `(i, j)`, `i < j`
    pub coders: (usize, usize),
    /// Report key, e.g. `"cols 1 & 2"`
    pub label: String,
    /// Share of agreeing positions
    pub agreement: f64,
    /// Number of agreeing positions
    pub agreed: usize,
    /// Number of positions compared
    pub n_cases: usize,
}

/// Per-pair breakdown of percent agreement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseAgreement {
    /// One entry per unordered coder pair
    pub pairs: Vec<PairAgreement>,
}

impl PairwiseAgreement {
    /// Agreement keyed by pair label.
    #[must_use]
    pub fn by_pair(&self) -> BTreeMap<String, f64> {
        self.pairs
            .iter()
            .map(|p| (p.label.clone(), p.agreement))
            .collect()
    }
}

/// Share of positions where two matrices hold identical rows.
///
/// Symmetric in its arguments. Returns 0.0 for an empty text.
#[must_use]
pub fn pair_agreement(a: &CoderMatrix, b: &CoderMatrix) -> f64 {
    let n = a.n_cases().min(b.n_cases());
    if n == 0 {
        return 0.0;
    }
    count_agreed(a, b, n) as f64 / n as f64
}

fn count_agreed(a: &CoderMatrix, b: &CoderMatrix, n: usize) -> usize {
    (0..n).filter(|&case| a.row(case) == b.row(case)).count()
}

pub(crate) fn compute(matrices: &[CoderMatrix], parallel: bool) -> Result<(f64, PairwiseAgreement)> {
    let n_cases = check_matrices(matrices)?;

    let pairs = map_pairs(matrices.len(), parallel, |i, j| {
        let agreed = count_agreed(&matrices[i], &matrices[j], n_cases);
        PairAgreement {
            coders: (i, j),
            label: pair_label(i, j),
            agreement: agreed as f64 / n_cases as f64,
            agreed,
            n_cases,
        }
    });

    let overall = mean(pairs.iter().map(|p| p.agreement));
    Ok((overall, PairwiseAgreement { pairs }))
}
