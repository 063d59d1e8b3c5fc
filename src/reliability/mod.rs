//! Inter-coder reliability coefficients (CoefficientEngine).
//!
//! All coefficients consume the per-coder [`CoderMatrix`] set built by
//! [`MatrixBuilder`](crate::MatrixBuilder). The unit of comparison is the
//! *exact label set* a coder assigned at a position: two rows agree only if
//! they are identical bit-for-bit, and each distinct row is one category.
//!
//! | Coefficient | Scope | Chance-corrected |
//! |-------------|-------|------------------|
//! | Percent agreement | pairwise, averaged | no |
//! | Cohen's kappa | pairwise, averaged | yes (per-coder marginals) |
//! | Fleiss' kappa | all coders jointly | yes (pooled marginals) |
//! | Krippendorff's alpha | all coders jointly | yes (coincidences, level-aware) |
//!
//! Insufficient data is an expected outcome, not a failure: every coefficient
//! returns a [`CoefficientResult`], and one coefficient reporting
//! `NotCalculated` never affects another.

mod categories;
pub mod cohen;
pub mod fleiss;
pub mod interpret;
pub mod krippendorff;
pub mod percent;

pub use categories::RowCategories;
pub use cohen::{PairKappa, PairwiseKappa};
pub use fleiss::FleissDetails;
pub use interpret::{agreement_grade, alpha_interpretation, f1_rating, kappa_interpretation};
pub use krippendorff::{AlphaDetails, CoincidenceMatrix};
pub use percent::{pair_agreement, PairAgreement, PairwiseAgreement};

use crate::matrix::CoderMatrix;
use crate::{Error, LevelOfMeasurement, Result};
use serde::Serialize;

/// Tolerance for treating a chance-agreement or disagreement term as degenerate.
pub(crate) const DEGENERATE_EPS: f64 = 1e-10;

// =============================================================================
// Coefficient Result
// =============================================================================

/// Outcome of one statistic: a value, or the reason there is none.
///
/// Callers cannot read a number out of a failed computation by accident.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CoefficientResult<D> {
    /// The statistic was computed.
    Calculated {
        /// Headline value
        value: f64,
        /// Qualitative reading of `value`
        interpretation: String,
        /// Statistic-specific breakdown
        details: D,
    },
    /// The statistic could not be computed from the given data.
    NotCalculated {
        /// Why not
        reason: Error,
    },
}

impl<D> CoefficientResult<D> {
    /// Wrap a computed `(value, details)` pair, or the error that prevented it.
    pub(crate) fn from_result(
        name: &str,
        result: Result<(f64, D)>,
        interpret: fn(f64) -> &'static str,
    ) -> Self {
        match result {
            Ok((value, details)) => {
                log::debug!("{name}: {value:.4}");
                CoefficientResult::Calculated {
                    value,
                    interpretation: interpret(value).to_string(),
                    details,
                }
            }
            Err(reason) => {
                log::debug!("{name} not calculated: {reason}");
                CoefficientResult::NotCalculated { reason }
            }
        }
    }

    /// Headline value, if calculated.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        match self {
            CoefficientResult::Calculated { value, .. } => Some(*value),
            CoefficientResult::NotCalculated { .. } => None,
        }
    }

    /// Interpretation, if calculated.
    #[must_use]
    pub fn interpretation(&self) -> Option<&str> {
        match self {
            CoefficientResult::Calculated { interpretation, .. } => Some(interpretation),
            CoefficientResult::NotCalculated { .. } => None,
        }
    }

    /// Breakdown, if calculated.
    #[must_use]
    pub fn details(&self) -> Option<&D> {
        match self {
            CoefficientResult::Calculated { details, .. } => Some(details),
            CoefficientResult::NotCalculated { .. } => None,
        }
    }

    /// Failure reason, if not calculated.
    #[must_use]
    pub fn reason(&self) -> Option<&Error> {
        match self {
            CoefficientResult::Calculated { .. } => None,
            CoefficientResult::NotCalculated { reason } => Some(reason),
        }
    }

    /// True if a value is available.
    #[must_use]
    pub fn is_calculated(&self) -> bool {
        matches!(self, CoefficientResult::Calculated { .. })
    }
}

// =============================================================================
// Coefficient Engine
// =============================================================================

/// Stateless calculator for the four coefficient families.
///
/// Holds no mutable state, so one value can be shared freely across threads
/// and requests.
///
/// ```
/// use accord::{CoefficientEngine, MatrixBuilder};
/// use accord_core::CoderAnnotation;
///
/// let a = CoderAnnotation::new("a", "a.json").with_span("X", 0, 2)?;
/// let b = CoderAnnotation::new("b", "b.json").with_span("X", 0, 2)?;
/// let built = MatrixBuilder::build(&[a, b], 4);
///
/// let engine = CoefficientEngine::new();
/// assert_eq!(engine.percent_agreement(&built.matrices).value(), Some(1.0));
/// assert_eq!(engine.cohens_kappa(&built.matrices).value(), Some(1.0));
/// # Ok::<(), accord_core::Error>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CoefficientEngine {
    parallel: bool,
}

impl Default for CoefficientEngine {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl CoefficientEngine {
    /// Engine that evaluates coder pairs concurrently when the `parallel`
    /// feature is enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable concurrent pair evaluation.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Whether pairs are evaluated concurrently.
    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Mean pairwise percent agreement.
    #[must_use]
    pub fn percent_agreement(&self, matrices: &[CoderMatrix]) -> CoefficientResult<PairwiseAgreement> {
        CoefficientResult::from_result(
            "percent agreement",
            percent::compute(matrices, self.parallel),
            agreement_grade,
        )
    }

    /// Mean pairwise Cohen's kappa.
    #[must_use]
    pub fn cohens_kappa(&self, matrices: &[CoderMatrix]) -> CoefficientResult<PairwiseKappa> {
        CoefficientResult::from_result(
            "Cohen's kappa",
            cohen::compute(matrices, self.parallel),
            kappa_interpretation,
        )
    }

    /// Fleiss' kappa over all coders.
    #[must_use]
    pub fn fleiss_kappa(&self, matrices: &[CoderMatrix]) -> CoefficientResult<FleissDetails> {
        CoefficientResult::from_result("Fleiss' kappa", fleiss::compute(matrices), kappa_interpretation)
    }

    /// Krippendorff's alpha at the given level of measurement.
    #[must_use]
    pub fn krippendorffs_alpha(
        &self,
        matrices: &[CoderMatrix],
        level: LevelOfMeasurement,
    ) -> CoefficientResult<AlphaDetails> {
        CoefficientResult::from_result(
            "Krippendorff's alpha",
            krippendorff::compute(matrices, level),
            alpha_interpretation,
        )
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Validate a matrix set and return its number of cases.
///
/// Requires at least two coders, one shared shape, and a non-empty text.
pub(crate) fn check_matrices(matrices: &[CoderMatrix]) -> Result<usize> {
    if matrices.len() < 2 {
        return Err(Error::insufficient_coders(matrices.len()));
    }
    let expected = matrices[0].shape();
    if let Some(other) = matrices.iter().find(|m| m.shape() != expected) {
        return Err(Error::ShapeMismatch {
            expected,
            found: other.shape(),
        });
    }
    if expected.0 == 0 {
        return Err(Error::EmptyText);
    }
    Ok(expected.0)
}

/// Chance-corrected agreement `(po - pe) / (1 - pe)`.
///
/// When chance agreement is total (`pe >= 1`) the ratio is undefined: perfect
/// observed agreement scores 1.0, anything else 0.0.
#[must_use]
pub fn chance_corrected(po: f64, pe: f64) -> f64 {
    if pe >= 1.0 - DEGENERATE_EPS {
        if po >= 1.0 - DEGENERATE_EPS {
            1.0
        } else {
            0.0
        }
    } else {
        (po - pe) / (1.0 - pe)
    }
}

/// Report key of a coder pair, 1-based: `"cols 1 & 2"`.
#[must_use]
pub fn pair_label(i: usize, j: usize) -> String {
    format!("cols {} & {}", i + 1, j + 1)
}

/// Unordered coder pairs `(i, j)` with `i < j`, in row-major order.
pub(crate) fn coder_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
        .collect()
}

/// Evaluate `f` for every coder pair, concurrently if requested.
///
/// Output order matches [`coder_pairs`] either way.
pub(crate) fn map_pairs<T, F>(n: usize, parallel: bool, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize, usize) -> T + Sync + Send,
{
    let pairs = coder_pairs(n);

    #[cfg(feature = "parallel")]
    {
        if parallel {
            use rayon::prelude::*;
            return pairs.par_iter().map(|&(i, j)| f(i, j)).collect();
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    pairs.iter().map(|&(i, j)| f(i, j)).collect()
}

/// Arithmetic mean; 0.0 for an empty slice.
pub(crate) fn mean(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    values.sum::<f64>() / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chance_corrected_boundaries() {
        assert_eq!(chance_corrected(1.0, 1.0), 1.0);
        assert_eq!(chance_corrected(0.5, 1.0), 0.0);
        assert!((chance_corrected(0.75, 0.5) - 0.5).abs() < 1e-12);
        assert!(chance_corrected(0.0, 0.5) < 0.0);
    }

    #[test]
    fn test_coder_pairs() {
        assert_eq!(coder_pairs(3), vec![(0, 1), (0, 2), (1, 2)]);
        assert!(coder_pairs(1).is_empty());
    }

    #[test]
    fn test_pair_label_is_one_based() {
        assert_eq!(pair_label(0, 2), "cols 1 & 3");
    }

    #[test]
    fn test_map_pairs_order_independent_of_parallelism() {
        let seq = map_pairs(5, false, |i, j| i * 10 + j);
        let par = map_pairs(5, true, |i, j| i * 10 + j);
        assert_eq!(seq, par);
        assert_eq!(seq.len(), 10);
    }

    #[test]
    fn test_check_matrices() {
        let one = vec![CoderMatrix::from_dense("a", 1, &[vec![true]])];
        assert_eq!(check_matrices(&one), Err(Error::InsufficientCoders { found: 1 }));

        let empty = vec![
            CoderMatrix::from_dense("a", 1, &[]),
            CoderMatrix::from_dense("b", 1, &[]),
        ];
        assert_eq!(check_matrices(&empty), Err(Error::EmptyText));

        let ragged = vec![
            CoderMatrix::from_dense("a", 1, &[vec![true]]),
            CoderMatrix::from_dense("b", 1, &[vec![true], vec![false]]),
        ];
        assert!(matches!(check_matrices(&ragged), Err(Error::ShapeMismatch { .. })));
    }

    #[test]
    fn test_result_accessors() {
        let ok: CoefficientResult<()> =
            CoefficientResult::from_result("x", Ok((0.9, ())), kappa_interpretation);
        assert_eq!(ok.value(), Some(0.9));
        assert_eq!(ok.interpretation(), Some("Almost perfect agreement"));
        assert!(ok.reason().is_none());

        let err: CoefficientResult<()> = CoefficientResult::from_result(
            "x",
            Err(Error::insufficient_coders(0)),
            kappa_interpretation,
        );
        assert!(!err.is_calculated());
        assert!(err.value().is_none());
        assert!(err.details().is_none());
    }
}
