//! Gold-standard scoring (GoldStandardScorer).
//!
//! One coder is designated ground truth; every other coder is scored against
//! it with precision, recall and F1.
//!
//! # Identity
//!
//! Unlike the coefficients in [`reliability`](crate::reliability), which
//! compare positional *coverage*, gold scoring compares discrete annotation
//! *decisions*: a span counts as a match only when `(start, end, label)` is
//! identical. A span one character shorter than the gold span is both a false
//! positive and a false negative.
//!
//! ```text
//! TP = |gold ∩ coder|   FP = |coder − gold|   FN = |gold − coder|
//! precision = TP / |coder|   recall = TP / |gold|   F1 = 2PR / (P + R)
//! ```

use crate::reliability::{f1_rating, CoefficientResult};
use crate::{Error, Result};
use accord_core::{CoderAnnotation, SpanKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// True/false positive and false negative counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCounts {
    /// Spans in both coder and gold sets
    #[serde(rename = "tp")]
    pub true_positives: usize,
    /// Spans only in the coder set
    #[serde(rename = "fp")]
    pub false_positives: usize,
    /// Spans only in the gold set
    #[serde(rename = "fn")]
    pub false_negatives: usize,
}

impl MatchCounts {
    /// `TP / (TP + FP)`, 0.0 when the coder made no decisions.
    #[must_use]
    pub fn precision(&self) -> f64 {
        let actual = self.true_positives + self.false_positives;
        if actual == 0 {
            return 0.0;
        }
        self.true_positives as f64 / actual as f64
    }

    /// `TP / (TP + FN)`, 0.0 when the gold set is empty.
    #[must_use]
    pub fn recall(&self) -> f64 {
        let possible = self.true_positives + self.false_negatives;
        if possible == 0 {
            return 0.0;
        }
        self.true_positives as f64 / possible as f64
    }

    /// Harmonic mean of precision and recall, 0.0 when both are zero.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    /// Add counts from another set.
    pub fn merge(&mut self, other: &MatchCounts) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }
}

/// Precision/recall/F1 together with the counts behind them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Score {
    /// Recall
    pub recall: f64,
    /// Precision
    pub precision: f64,
    /// F1
    pub f1: f64,
    /// Underlying counts
    #[serde(flatten)]
    pub counts: MatchCounts,
}

impl From<MatchCounts> for Score {
    fn from(counts: MatchCounts) -> Self {
        Self {
            recall: counts.recall(),
            precision: counts.precision(),
            f1: counts.f1(),
            counts,
        }
    }
}

/// Breakdown of a gold-standard comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoldStandardDetails {
    /// Coder used as ground truth
    pub gold_coder: String,
    /// Mean recall over non-gold coders
    pub recall: f64,
    /// Mean precision over non-gold coders
    pub precision: f64,
    /// Mean F1 over non-gold coders
    pub f1_score: f64,
    /// Counts pooled over all non-gold coders, per label
    pub by_label: BTreeMap<String, Score>,
    /// Score of each non-gold coder
    pub coder_details: BTreeMap<String, Score>,
}

/// Scores coders against a designated gold coder by exact span identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoldStandardScorer;

impl GoldStandardScorer {
    /// Create a scorer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Score every coder except `gold_index` against the gold coder.
    ///
    /// The headline value is the mean F1 over non-gold coders.
    ///
    /// ```
    /// use accord::GoldStandardScorer;
    /// use accord_core::CoderAnnotation;
    ///
    /// let gold = CoderAnnotation::new("gold", "g.json").with_span("A", 0, 2)?;
    /// let coder = CoderAnnotation::new("c", "c.json")
    ///     .with_span("A", 0, 2)?
    ///     .with_span("B", 2, 4)?;
    ///
    /// let result = GoldStandardScorer::new().score(&[gold, coder], 0);
    /// let details = result.details().unwrap();
    /// assert_eq!(details.recall, 1.0);
    /// assert_eq!(details.precision, 0.5);
    /// # Ok::<(), accord_core::Error>(())
    /// ```
    #[must_use]
    pub fn score(
        &self,
        annotations: &[CoderAnnotation],
        gold_index: usize,
    ) -> CoefficientResult<GoldStandardDetails> {
        CoefficientResult::from_result(
            "gold standard F1",
            Self::try_score(annotations, gold_index),
            f1_rating,
        )
    }

    fn try_score(
        annotations: &[CoderAnnotation],
        gold_index: usize,
    ) -> Result<(f64, GoldStandardDetails)> {
        if annotations.len() < 2 {
            return Err(Error::insufficient_coders(annotations.len()));
        }
        let Some(gold) = annotations.get(gold_index) else {
            return Err(Error::invalid_gold_index(gold_index, annotations.len()));
        };

        let gold_set = decision_set(gold);
        let mut by_label: BTreeMap<String, MatchCounts> = BTreeMap::new();
        let mut coder_details: BTreeMap<String, Score> = BTreeMap::new();

        for (idx, annotation) in annotations.iter().enumerate() {
            if idx == gold_index {
                continue;
            }
            let coder_set = decision_set(annotation);
            let mut counts = MatchCounts::default();

            for key in &coder_set {
                let entry = by_label.entry(key.label.clone()).or_default();
                if gold_set.contains(key) {
                    counts.true_positives += 1;
                    entry.true_positives += 1;
                } else {
                    counts.false_positives += 1;
                    entry.false_positives += 1;
                }
            }
            for key in gold_set.difference(&coder_set) {
                counts.false_negatives += 1;
                by_label.entry(key.label.clone()).or_default().false_negatives += 1;
            }

            let name = if coder_details.contains_key(&annotation.coder_id) {
                format!("{} ({})", annotation.coder_id, annotation.filename)
            } else {
                annotation.coder_id.clone()
            };
            coder_details.insert(name, Score::from(counts));
        }

        let n = coder_details.len() as f64;
        let recall = coder_details.values().map(|s| s.recall).sum::<f64>() / n;
        let precision = coder_details.values().map(|s| s.precision).sum::<f64>() / n;
        let f1_score = coder_details.values().map(|s| s.f1).sum::<f64>() / n;

        Ok((
            f1_score,
            GoldStandardDetails {
                gold_coder: gold.coder_id.clone(),
                recall,
                precision,
                f1_score,
                by_label: by_label
                    .into_iter()
                    .map(|(label, counts)| (label, Score::from(counts)))
                    .collect(),
                coder_details,
            },
        ))
    }
}

/// Distinct labelled `(start, end, label)` decisions of one coder.
fn decision_set(annotation: &CoderAnnotation) -> HashSet<SpanKey> {
    annotation
        .spans()
        .iter()
        .filter(|s| !s.is_unlabelled())
        .map(|s| s.key())
        .collect()
}
