//! # accord
//!
//! Inter-coder reliability for span annotations.
//!
//! Several coders label character ranges of one shared text. accord measures
//! how far they agree:
//!
//! - **Coefficients**: percent agreement, Cohen's kappa (pairwise), Fleiss'
//!   kappa and Krippendorff's alpha (nominal/ordinal/interval/ratio)
//! - **Gold standard**: precision/recall/F1 of each coder against a designated
//!   reference coder
//! - **Review index**: every distinct annotated region with per-coder labels
//!   and surrounding context
//!
//! ## Quick Start
//!
//! ```rust
//! use accord::{LevelOfMeasurement, ReliabilityConfig, ReliabilityEngine};
//! use accord_core::CoderAnnotation;
//!
//! let a = CoderAnnotation::new("alice", "alice.json")
//!     .with_span("Emotion", 0, 5)?
//!     .with_span("Place", 10, 14)?;
//! let b = CoderAnnotation::new("bob", "bob.json")
//!     .with_span("Emotion", 0, 5)?;
//!
//! let config = ReliabilityConfig::default().with_level(LevelOfMeasurement::Nominal);
//! let report = ReliabilityEngine::new(config).compute(&[a, b], 20);
//!
//! let pa = report.percent_agreement.as_ref().unwrap();
//! assert!((pa.value().unwrap() - 0.8).abs() < 1e-12);
//! println!("{report}");
//! # Ok::<(), accord_core::Error>(())
//! ```
//!
//! ## Two identities
//!
//! | Component | An annotation is... |
//! |-----------|---------------------|
//! | [`CoefficientEngine`] | the label set covering each position (coverage) |
//! | [`GoldStandardScorer`] | an exact `(start, end, label)` tuple |
//! | [`SpanIndexer`] | an exact `(start, end)` boundary pair |
//!
//! The coefficients measure agreement on coverage; gold scoring and review
//! measure agreement on discrete decisions. The two are kept separate.
//!
//! ## Feature Flags
//!
//! - `parallel` (default): evaluate statistic families and coder pairs on the
//!   rayon thread pool. Results are identical with it off.

#![warn(missing_docs)]

pub mod config;
pub mod engine;
mod error;
pub mod gold;
pub mod index;
pub mod matrix;
pub mod reliability;
pub mod report;
pub mod text;

pub use config::{LevelOfMeasurement, ReliabilityConfig, StatisticKind, StatisticSet};
pub use engine::ReliabilityEngine;
pub use error::{Error, Result};
pub use gold::{GoldStandardDetails, GoldStandardScorer, MatchCounts, Score};
pub use index::{AnnotationRegion, CoderDetail, RegionDetail, SpanIndex, SpanIndexer};
pub use matrix::{CoderMatrix, IncidenceMatrices, LabelVocabulary, MatrixBuilder, MatrixStats};
pub use reliability::{CoefficientEngine, CoefficientResult};
pub use report::{ReliabilityReport, StatisticRecord};

pub use accord_core::{CoderAnnotation, Span, SpanKey, NO_ANNOTATION};
