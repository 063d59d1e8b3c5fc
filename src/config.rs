//! Request configuration for a reliability computation.
//!
//! A [`ReliabilityConfig`] carries everything a caller may choose per request:
//! which statistics to run, the level of measurement for Krippendorff's
//! alpha, the optional gold-standard coder, and SpanIndexer context width.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default number of context characters shown on each side of a region.
pub const DEFAULT_CONTEXT_WIDTH: usize = 20;

// =============================================================================
// Level of Measurement
// =============================================================================

/// Level of measurement; selects the difference function for Krippendorff's alpha.
///
/// Serialises lowercase; parses (including from JSON) case-insensitively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LevelOfMeasurement {
    /// Unordered categories
    #[default]
    Nominal,
    /// Ranked categories
    Ordinal,
    /// Equal-distance numeric categories
    Interval,
    /// Numeric categories with a true zero
    Ratio,
}

impl LevelOfMeasurement {
    /// Lowercase name as used in reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LevelOfMeasurement::Nominal => "nominal",
            LevelOfMeasurement::Ordinal => "ordinal",
            LevelOfMeasurement::Interval => "interval",
            LevelOfMeasurement::Ratio => "ratio",
        }
    }
}

impl fmt::Display for LevelOfMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelOfMeasurement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nominal" => Ok(LevelOfMeasurement::Nominal),
            "ordinal" => Ok(LevelOfMeasurement::Ordinal),
            "interval" => Ok(LevelOfMeasurement::Interval),
            "ratio" => Ok(LevelOfMeasurement::Ratio),
            other => Err(Error::UnknownLevel(other.to_string())),
        }
    }
}

impl TryFrom<String> for LevelOfMeasurement {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

// =============================================================================
// Statistic Selection
// =============================================================================

/// The statistics a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatisticKind {
    /// Pairwise percent agreement
    PercentAgreement,
    /// Pairwise Cohen's kappa
    CohensKappa,
    /// Fleiss' kappa over all coders
    FleissKappa,
    /// Krippendorff's alpha over all coders
    KrippendorffsAlpha,
    /// Precision/recall/F1 against a gold coder
    GoldStandard,
}

impl StatisticKind {
    /// Every statistic, in report order.
    pub const ALL: [StatisticKind; 5] = [
        StatisticKind::PercentAgreement,
        StatisticKind::CohensKappa,
        StatisticKind::FleissKappa,
        StatisticKind::KrippendorffsAlpha,
        StatisticKind::GoldStandard,
    ];

    /// Human-readable name.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            StatisticKind::PercentAgreement => "Percent Agreement",
            StatisticKind::CohensKappa => "Cohen's Kappa",
            StatisticKind::FleissKappa => "Fleiss' Kappa",
            StatisticKind::KrippendorffsAlpha => "Krippendorff's Alpha",
            StatisticKind::GoldStandard => "Gold Standard Agreement",
        }
    }
}

/// Flag set selecting which statistics a request runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticSet {
    /// Run percent agreement
    pub percent_agreement: bool,
    /// Run Cohen's kappa
    pub cohens_kappa: bool,
    /// Run Fleiss' kappa
    pub fleiss_kappa: bool,
    /// Run Krippendorff's alpha
    pub krippendorffs_alpha: bool,
    /// Run gold-standard scoring (also needs a gold index)
    pub gold_standard: bool,
}

impl Default for StatisticSet {
    fn default() -> Self {
        Self::all()
    }
}

impl StatisticSet {
    /// Every statistic enabled.
    #[must_use]
    pub fn all() -> Self {
        Self {
            percent_agreement: true,
            cohens_kappa: true,
            fleiss_kappa: true,
            krippendorffs_alpha: true,
            gold_standard: true,
        }
    }

    /// Nothing enabled.
    #[must_use]
    pub fn none() -> Self {
        Self {
            percent_agreement: false,
            cohens_kappa: false,
            fleiss_kappa: false,
            krippendorffs_alpha: false,
            gold_standard: false,
        }
    }

    /// Build from an explicit list.
    #[must_use]
    pub fn only(kinds: &[StatisticKind]) -> Self {
        kinds.iter().fold(Self::none(), |set, &kind| set.with(kind, true))
    }

    /// Enable or disable one statistic.
    #[must_use]
    pub fn with(mut self, kind: StatisticKind, enabled: bool) -> Self {
        match kind {
            StatisticKind::PercentAgreement => self.percent_agreement = enabled,
            StatisticKind::CohensKappa => self.cohens_kappa = enabled,
            StatisticKind::FleissKappa => self.fleiss_kappa = enabled,
            StatisticKind::KrippendorffsAlpha => self.krippendorffs_alpha = enabled,
            StatisticKind::GoldStandard => self.gold_standard = enabled,
        }
        self
    }

    /// Whether `kind` is requested.
    #[must_use]
    pub fn contains(&self, kind: StatisticKind) -> bool {
        match kind {
            StatisticKind::PercentAgreement => self.percent_agreement,
            StatisticKind::CohensKappa => self.cohens_kappa,
            StatisticKind::FleissKappa => self.fleiss_kappa,
            StatisticKind::KrippendorffsAlpha => self.krippendorffs_alpha,
            StatisticKind::GoldStandard => self.gold_standard,
        }
    }
}

// =============================================================================
// Reliability Config
// =============================================================================

/// Configuration for one reliability request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliabilityConfig {
    /// Level of measurement for Krippendorff's alpha
    pub level: LevelOfMeasurement,
    /// Statistics to compute
    pub statistics: StatisticSet,
    /// Coder treated as ground truth (gold scoring is skipped when `None`)
    pub gold_index: Option<usize>,
    /// Characters of context on each side of an indexed region
    pub context_width: usize,
    /// Evaluate independent statistics and coder pairs concurrently
    pub parallel: bool,
}

impl Default for ReliabilityConfig {
    fn default() -> Self {
        Self {
            level: LevelOfMeasurement::Nominal,
            statistics: StatisticSet::all(),
            gold_index: None,
            context_width: DEFAULT_CONTEXT_WIDTH,
            parallel: true,
        }
    }
}

impl ReliabilityConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from JSON; missing fields take their defaults.
    ///
    /// ```
    /// use accord::{LevelOfMeasurement, ReliabilityConfig};
    ///
    /// let config = ReliabilityConfig::from_json(r#"{"level": "ordinal", "gold_index": 0}"#).unwrap();
    /// assert_eq!(config.level, LevelOfMeasurement::Ordinal);
    /// assert_eq!(config.gold_index, Some(0));
    /// assert!(config.statistics.cohens_kappa);
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(e.to_string()))
    }

    /// Set the level of measurement.
    pub fn with_level(mut self, level: LevelOfMeasurement) -> Self {
        self.level = level;
        self
    }

    /// Set the statistics to run.
    pub fn with_statistics(mut self, statistics: StatisticSet) -> Self {
        self.statistics = statistics;
        self
    }

    /// Designate a gold-standard coder.
    pub fn with_gold_index(mut self, index: usize) -> Self {
        self.gold_index = Some(index);
        self
    }

    /// Set SpanIndexer context width.
    pub fn with_context_width(mut self, width: usize) -> Self {
        self.context_width = width;
        self
    }

    /// Enable or disable concurrent evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!("Interval".parse::<LevelOfMeasurement>().unwrap(), LevelOfMeasurement::Interval);
        assert_eq!(" ratio ".parse::<LevelOfMeasurement>().unwrap(), LevelOfMeasurement::Ratio);
        assert_eq!(
            "nominalish".parse::<LevelOfMeasurement>(),
            Err(Error::UnknownLevel("nominalish".into()))
        );
    }

    #[test]
    fn test_defaults() {
        let config = ReliabilityConfig::default();
        assert_eq!(config.level, LevelOfMeasurement::Nominal);
        assert_eq!(config.context_width, DEFAULT_CONTEXT_WIDTH);
        assert!(config.gold_index.is_none());
        assert!(StatisticKind::ALL.iter().all(|&k| config.statistics.contains(k)));
    }

    #[test]
    fn test_statistic_set_only() {
        let set = StatisticSet::only(&[StatisticKind::FleissKappa]);
        assert!(set.contains(StatisticKind::FleissKappa));
        assert!(!set.contains(StatisticKind::CohensKappa));
        assert!(!set.contains(StatisticKind::GoldStandard));
    }

    #[test]
    fn test_from_json_rejects_bad_level() {
        let err = ReliabilityConfig::from_json(r#"{"level": "loud"}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_json_level_any_case() {
        let config = ReliabilityConfig::from_json(r#"{"level": "Ordinal"}"#).unwrap();
        assert_eq!(config.level, LevelOfMeasurement::Ordinal);
        let config = ReliabilityConfig::from_json(r#"{"level": "RATIO"}"#).unwrap();
        assert_eq!(config.level, LevelOfMeasurement::Ratio);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""level":"ratio""#));
    }

    #[test]
    fn test_from_json_partial_statistics() {
        let config =
            ReliabilityConfig::from_json(r#"{"statistics": {"cohens_kappa": false}}"#).unwrap();
        assert!(!config.statistics.cohens_kappa);
        assert!(config.statistics.fleiss_kappa);
    }
}
