//! Reliability report and its flat per-statistic records.
//!
//! [`ReliabilityReport`] keeps each statistic's typed [`CoefficientResult`].
//! [`ReliabilityReport::records`] flattens them into [`StatisticRecord`]s, one
//! per requested statistic, with only the fields that statistic produces:
//!
//! | Statistic | Extra fields |
//! |-----------|--------------|
//! | percent agreement, Cohen's kappa | `pairwise_details` |
//! | Fleiss' kappa | `observed_agreement`, `expected_agreement` |
//! | Krippendorff's alpha | `level_of_measurement`, `n_decisions`, `sigma_observed`, `sigma_expected` |
//! | gold standard | `recall`, `precision`, `f1_score`, `by_label`, `coder_details` |

use crate::gold::{GoldStandardDetails, Score};
use crate::matrix::MatrixStats;
use crate::reliability::{
    AlphaDetails, CoefficientResult, FleissDetails, PairwiseAgreement, PairwiseKappa,
};
use crate::{Error, LevelOfMeasurement, Result, StatisticKind};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// Statistic Record
// =============================================================================

/// One statistic in the flat output shape consumed by report renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticRecord {
    /// Which statistic
    pub statistic: StatisticKind,
    /// Whether a value was computed
    pub calculated: bool,
    /// Headline value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Human-readable statistic name
    pub display_name: String,
    /// Qualitative reading of `value`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interpretation: Option<String>,
    /// Why the statistic was not computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-pair values keyed `"cols i & j"`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairwise_details: Option<BTreeMap<String, f64>>,
    /// Observed agreement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_agreement: Option<f64>,
    /// Chance agreement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_agreement: Option<f64>,
    /// Level of measurement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_of_measurement: Option<LevelOfMeasurement>,
    /// Pairable values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_decisions: Option<usize>,
    /// Weighted observed disagreement sum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigma_observed: Option<f64>,
    /// Weighted expected disagreement sum
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigma_expected: Option<f64>,
    /// Mean recall against the gold coder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recall: Option<f64>,
    /// Mean precision against the gold coder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
    /// Mean F1 against the gold coder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f1_score: Option<f64>,
    /// Gold scores per label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_label: Option<BTreeMap<String, Score>>,
    /// Gold scores per coder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coder_details: Option<BTreeMap<String, Score>>,
}

impl StatisticRecord {
    fn from_result<D: RecordDetails>(kind: StatisticKind, result: &CoefficientResult<D>) -> Self {
        let mut record = Self {
            statistic: kind,
            calculated: result.is_calculated(),
            value: result.value(),
            display_name: kind.display_name().to_string(),
            interpretation: result.interpretation().map(str::to_string),
            error: result.reason().map(Error::to_string),
            pairwise_details: None,
            observed_agreement: None,
            expected_agreement: None,
            level_of_measurement: None,
            n_decisions: None,
            sigma_observed: None,
            sigma_expected: None,
            recall: None,
            precision: None,
            f1_score: None,
            by_label: None,
            coder_details: None,
        };
        if let Some(details) = result.details() {
            details.fill(&mut record);
        }
        record
    }
}

/// Copies statistic-specific fields into a [`StatisticRecord`].
trait RecordDetails {
    fn fill(&self, record: &mut StatisticRecord);
}

impl RecordDetails for PairwiseAgreement {
    fn fill(&self, record: &mut StatisticRecord) {
        record.pairwise_details = Some(self.by_pair());
    }
}

impl RecordDetails for PairwiseKappa {
    fn fill(&self, record: &mut StatisticRecord) {
        record.pairwise_details = Some(self.by_pair());
    }
}

impl RecordDetails for FleissDetails {
    fn fill(&self, record: &mut StatisticRecord) {
        record.observed_agreement = Some(self.observed_agreement);
        record.expected_agreement = Some(self.expected_agreement);
    }
}

impl RecordDetails for AlphaDetails {
    fn fill(&self, record: &mut StatisticRecord) {
        record.level_of_measurement = Some(self.level);
        record.n_decisions = Some(self.n_decisions);
        record.sigma_observed = Some(self.sigma_observed);
        record.sigma_expected = Some(self.sigma_expected);
    }
}

impl RecordDetails for GoldStandardDetails {
    fn fill(&self, record: &mut StatisticRecord) {
        record.recall = Some(self.recall);
        record.precision = Some(self.precision);
        record.f1_score = Some(self.f1_score);
        record.by_label = Some(self.by_label.clone());
        record.coder_details = Some(self.coder_details.clone());
    }
}

// =============================================================================
// Reliability Report
// =============================================================================

/// Everything one reliability request produced.
///
/// A statistic is `None` when it was not requested (or, for gold scoring, when
/// no gold coder was designated).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReliabilityReport {
    /// Incidence matrix summary
    pub stats: MatrixStats,
    /// Level of measurement used for Krippendorff's alpha
    pub level: LevelOfMeasurement,
    /// Percent agreement
    pub percent_agreement: Option<CoefficientResult<PairwiseAgreement>>,
    /// Cohen's kappa
    pub cohens_kappa: Option<CoefficientResult<PairwiseKappa>>,
    /// Fleiss' kappa
    pub fleiss_kappa: Option<CoefficientResult<FleissDetails>>,
    /// Krippendorff's alpha
    pub krippendorffs_alpha: Option<CoefficientResult<AlphaDetails>>,
    /// Gold-standard scores
    pub gold_standard: Option<CoefficientResult<GoldStandardDetails>>,
}

impl ReliabilityReport {
    /// Flat records for every statistic that ran, in [`StatisticKind::ALL`] order.
    #[must_use]
    pub fn records(&self) -> Vec<StatisticRecord> {
        let mut records = Vec::new();
        if let Some(r) = &self.percent_agreement {
            records.push(StatisticRecord::from_result(StatisticKind::PercentAgreement, r));
        }
        if let Some(r) = &self.cohens_kappa {
            records.push(StatisticRecord::from_result(StatisticKind::CohensKappa, r));
        }
        if let Some(r) = &self.fleiss_kappa {
            records.push(StatisticRecord::from_result(StatisticKind::FleissKappa, r));
        }
        if let Some(r) = &self.krippendorffs_alpha {
            let mut record = StatisticRecord::from_result(StatisticKind::KrippendorffsAlpha, r);
            record.level_of_measurement = Some(self.level);
            records.push(record);
        }
        if let Some(r) = &self.gold_standard {
            records.push(StatisticRecord::from_result(StatisticKind::GoldStandard, r));
        }
        records
    }

    /// Record for one statistic, if it ran.
    #[must_use]
    pub fn record(&self, kind: StatisticKind) -> Option<StatisticRecord> {
        self.records().into_iter().find(|r| r.statistic == kind)
    }

    /// Plain-text summary, one line per statistic.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "=== Reliability: {} coders, {} positions, {} labels ===\n",
            self.stats.n_coders, self.stats.n_cases, self.stats.n_labels
        ));
        for record in self.records() {
            match (record.value, &record.interpretation, &record.error) {
                (Some(value), Some(interpretation), _) => out.push_str(&format!(
                    "  {:24} {:>7.4}  {}\n",
                    record.display_name, value, interpretation
                )),
                (_, _, Some(error)) => out.push_str(&format!(
                    "  {:24} not calculated: {}\n",
                    record.display_name, error
                )),
                _ => out.push_str(&format!("  {:24} -\n", record.display_name)),
            }
        }
        out
    }

    /// Export the flat records as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.records())
            .map_err(|e| Error::Serialization(format!("JSON serialization failed: {e}")))
    }
}

impl fmt::Display for ReliabilityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
