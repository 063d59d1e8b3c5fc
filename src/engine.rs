//! Per-request orchestration.
//!
//! [`ReliabilityEngine`] runs the statistics selected in a
//! [`ReliabilityConfig`] over one set of coder annotations. Each statistic is
//! independent: one reporting `NotCalculated` never stops the others.

use crate::gold::GoldStandardScorer;
use crate::index::{SpanIndex, SpanIndexer};
use crate::matrix::MatrixBuilder;
use crate::reliability::CoefficientEngine;
use crate::report::ReliabilityReport;
use crate::ReliabilityConfig;
use accord_core::CoderAnnotation;

/// Runs a configured reliability computation.
///
/// Holds only its configuration, so one engine can serve any number of
/// requests, from any thread.
///
/// ```
/// use accord::{ReliabilityConfig, ReliabilityEngine};
/// use accord_core::CoderAnnotation;
///
/// let gold = CoderAnnotation::new("gold", "g.json").with_span("A", 0, 2)?;
/// let coder = CoderAnnotation::new("c", "c.json")
///     .with_span("A", 0, 2)?
///     .with_span("B", 2, 4)?;
///
/// let engine = ReliabilityEngine::new(ReliabilityConfig::default().with_gold_index(0));
/// let report = engine.compute(&[gold, coder], 4);
///
/// let gold_result = report.gold_standard.as_ref().unwrap();
/// assert_eq!(gold_result.details().unwrap().precision, 0.5);
/// assert_eq!(report.records().len(), 5);
/// # Ok::<(), accord_core::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReliabilityEngine {
    config: ReliabilityConfig,
}

impl ReliabilityEngine {
    /// Create an engine for `config`.
    #[must_use]
    pub fn new(config: ReliabilityConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &ReliabilityConfig {
        &self.config
    }

    /// Run every requested statistic over `annotations`.
    ///
    /// Gold-standard scoring only runs when it is requested *and* a gold
    /// index is configured.
    #[must_use]
    pub fn compute(&self, annotations: &[CoderAnnotation], text_length: usize) -> ReliabilityReport {
        let config = &self.config;
        let wanted = config.statistics;
        let parallel = config.parallel;
        let level = config.level;

        let built = MatrixBuilder::build(annotations, text_length);
        let matrices = built.matrices.as_slice();
        let coefficients = CoefficientEngine::new().with_parallel(parallel);

        log::debug!(
            "reliability request: {} coders, {} positions, level {}",
            annotations.len(),
            text_length,
            level
        );

        let ((percent_agreement, cohens_kappa), ((fleiss_kappa, krippendorffs_alpha), gold_standard)) =
            join(
                parallel,
                || {
                    join(
                        parallel,
                        || wanted.percent_agreement.then(|| coefficients.percent_agreement(matrices)),
                        || wanted.cohens_kappa.then(|| coefficients.cohens_kappa(matrices)),
                    )
                },
                || {
                    join(
                        parallel,
                        || {
                            join(
                                parallel,
                                || wanted.fleiss_kappa.then(|| coefficients.fleiss_kappa(matrices)),
                                || {
                                    wanted
                                        .krippendorffs_alpha
                                        .then(|| coefficients.krippendorffs_alpha(matrices, level))
                                },
                            )
                        },
                        || {
                            config
                                .gold_index
                                .filter(|_| wanted.gold_standard)
                                .map(|index| GoldStandardScorer::new().score(annotations, index))
                        },
                    )
                },
            );

        ReliabilityReport {
            stats: built.stats,
            level,
            percent_agreement,
            cohens_kappa,
            fleiss_kappa,
            krippendorffs_alpha,
            gold_standard,
        }
    }

    /// Build the review index with the configured context width.
    #[must_use]
    pub fn index<'a>(&self, annotations: &'a [CoderAnnotation], text: &'a str) -> SpanIndex<'a> {
        SpanIndexer::new(self.config.context_width).index(annotations, text)
    }
}

/// Run `a` and `b`, concurrently when enabled.
fn join<A, B, RA, RB>(parallel: bool, a: A, b: B) -> (RA, RB)
where
    A: FnOnce() -> RA + Send,
    B: FnOnce() -> RB + Send,
    RA: Send,
    RB: Send,
{
    #[cfg(feature = "parallel")]
    {
        if parallel {
            return rayon::join(a, b);
        }
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    (a(), b())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, StatisticKind, StatisticSet};

    fn coders() -> Vec<CoderAnnotation> {
        vec![
            CoderAnnotation::new("a", "a.json").with_span("L1", 0, 2).unwrap(),
            CoderAnnotation::new("b", "b.json").with_span("L2", 2, 4).unwrap(),
        ]
    }

    #[test]
    fn test_all_statistics_without_gold() {
        let report = ReliabilityEngine::default().compute(&coders(), 4);
        assert_eq!(report.percent_agreement.as_ref().unwrap().value(), Some(0.0));
        assert!(report.cohens_kappa.is_some());
        assert!(report.fleiss_kappa.is_some());
        assert!(report.krippendorffs_alpha.is_some());
        assert!(report.gold_standard.is_none());
        assert_eq!(report.stats.n_decisions, 4);
    }

    #[test]
    fn test_selected_statistics_only() {
        let config = ReliabilityConfig::default()
            .with_statistics(StatisticSet::only(&[StatisticKind::FleissKappa]));
        let report = ReliabilityEngine::new(config).compute(&coders(), 4);
        assert!(report.percent_agreement.is_none());
        assert!(report.fleiss_kappa.is_some());
        assert_eq!(report.records().len(), 1);
    }

    #[test]
    fn test_invalid_gold_index_isolated() {
        let config = ReliabilityConfig::default().with_gold_index(7);
        let report = ReliabilityEngine::new(config).compute(&coders(), 4);
        let gold = report.gold_standard.as_ref().unwrap();
        assert!(matches!(gold.reason(), Some(Error::InvalidGoldIndex { .. })));
        assert!(report.cohens_kappa.as_ref().unwrap().is_calculated());
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let annotations = coders();
        let par = ReliabilityEngine::new(ReliabilityConfig::default().with_parallel(true))
            .compute(&annotations, 4);
        let seq = ReliabilityEngine::new(ReliabilityConfig::default().with_parallel(false))
            .compute(&annotations, 4);
        assert_eq!(par, seq);
    }

    #[test]
    fn test_empty_text() {
        let report = ReliabilityEngine::default().compute(&coders(), 0);
        assert_eq!(report.stats.n_cases, 0);
        for record in report.records() {
            assert!(!record.calculated);
            assert!(record.error.is_some());
        }
    }

    #[test]
    fn test_index_uses_context_width() {
        let annotations = coders();
        let engine = ReliabilityEngine::new(ReliabilityConfig::default().with_context_width(1));
        let index = engine.index(&annotations, "abcd");
        assert_eq!(index.regions()[0].right_context, "c");
    }
}
