//! Per-coder incidence matrices (MatrixBuilder).
//!
//! Every coder gets a binary `(text_length × n_labels)` matrix where cell
//! `(i, j)` is set iff one of the coder's spans covers position `i` with label
//! `j`. Overlapping spans OR into the same row, so a position can carry several
//! labels at once.
//!
//! ```text
//! text:     0 1 2 3 4 5
//! spans:    [A--)          A over [0,2)
//!             [B----)      B over [1,4)
//!
//! row 0:    A=1 B=0
//! row 1:    A=1 B=1
//! row 2:    A=0 B=1
//! row 4:    A=0 B=0        (NO_ANNOTATION)
//! ```
//!
//! Rows are stored as bitsets, one `u64` word per 64 labels, which keeps long
//! texts with large vocabularies compact while exposing the same 0/1 view
//! through [`CoderMatrix::get`].

use accord_core::{CoderAnnotation, NO_ANNOTATION};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

const WORD_BITS: usize = u64::BITS as usize;

// =============================================================================
// Label Vocabulary
// =============================================================================

/// Sorted set of distinct labels across all coders.
///
/// Column order is lexicographic, so identical input always yields identical
/// column assignments. The reserved [`NO_ANNOTATION`] sentinel is never a
/// column: it is the name of the all-zero row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelVocabulary {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelVocabulary {
    /// Collect the vocabulary from every coder's spans.
    #[must_use]
    pub fn from_annotations(annotations: &[CoderAnnotation]) -> Self {
        let labels: BTreeSet<&str> = annotations
            .iter()
            .flat_map(|a| a.spans())
            .filter(|s| !s.is_unlabelled())
            .map(|s| s.label.as_str())
            .collect();
        Self::from_sorted(labels.into_iter().map(String::from).collect())
    }

    fn from_sorted(labels: Vec<String>) -> Self {
        let index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        Self { labels, index }
    }

    /// Labels in column order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of label columns (the sentinel is not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if no coder used any label.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Column of `label`, if known.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Label of column `idx`.
    #[must_use]
    pub fn label(&self, idx: usize) -> Option<&str> {
        self.labels.get(idx).map(String::as_str)
    }

    /// Render the label set at one position, e.g. `"Anger+Joy"` or `"NO_ANNOTATION"`.
    #[must_use]
    pub fn describe_row(&self, matrix: &CoderMatrix, case: usize) -> String {
        let names: Vec<&str> = matrix
            .labels_at(case)
            .filter_map(|j| self.label(j))
            .collect();
        if names.is_empty() {
            NO_ANNOTATION.to_string()
        } else {
            names.join("+")
        }
    }
}

// =============================================================================
// Coder Matrix
// =============================================================================

/// Binary `(n_cases × n_labels)` incidence matrix of one coder.
///
/// Built once by [`MatrixBuilder`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoderMatrix {
    coder_id: String,
    n_cases: usize,
    n_labels: usize,
    words_per_row: usize,
    bits: Vec<u64>,
}

impl CoderMatrix {
    fn zeros(coder_id: impl Into<String>, n_cases: usize, n_labels: usize) -> Self {
        let words_per_row = n_labels.div_ceil(WORD_BITS);
        Self {
            coder_id: coder_id.into(),
            n_cases,
            n_labels,
            words_per_row,
            bits: vec![0; n_cases * words_per_row],
        }
    }

    /// Build directly from a dense 0/1 view (`rows[case][label]`).
    ///
    /// Every row must have `n_labels` entries; shorter rows are zero-padded and
    /// extra entries ignored.
    #[must_use]
    pub fn from_dense(coder_id: impl Into<String>, n_labels: usize, rows: &[Vec<bool>]) -> Self {
        let mut matrix = Self::zeros(coder_id, rows.len(), n_labels);
        for (case, row) in rows.iter().enumerate() {
            for (label, &set) in row.iter().take(n_labels).enumerate() {
                if set {
                    matrix.set(case, label);
                }
            }
        }
        matrix
    }

    fn set(&mut self, case: usize, label: usize) {
        let word = case * self.words_per_row + label / WORD_BITS;
        self.bits[word] |= 1u64 << (label % WORD_BITS);
    }

    /// Coder this matrix belongs to.
    #[must_use]
    pub fn coder_id(&self) -> &str {
        &self.coder_id
    }

    /// Number of positions (rows).
    #[must_use]
    pub fn n_cases(&self) -> usize {
        self.n_cases
    }

    /// Number of label columns.
    #[must_use]
    pub fn n_labels(&self) -> usize {
        self.n_labels
    }

    /// `(n_cases, n_labels)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_cases, self.n_labels)
    }

    /// Packed row for `case`; equal slices mean identical label sets.
    ///
    /// # Panics
    ///
    /// Panics if `case >= n_cases`.
    #[must_use]
    pub fn row(&self, case: usize) -> &[u64] {
        assert!(case < self.n_cases, "case {case} out of range");
        let start = case * self.words_per_row;
        &self.bits[start..start + self.words_per_row]
    }

    /// All rows in position order.
    pub fn rows(&self) -> impl Iterator<Item = &[u64]> + '_ {
        (0..self.n_cases).map(move |case| self.row(case))
    }

    /// Dense view: `1` iff `case` is covered with `label`.
    #[must_use]
    pub fn get(&self, case: usize, label: usize) -> bool {
        if case >= self.n_cases || label >= self.n_labels {
            return false;
        }
        self.row(case)[label / WORD_BITS] & (1u64 << (label % WORD_BITS)) != 0
    }

    /// Label columns set at `case`, ascending.
    pub fn labels_at(&self, case: usize) -> impl Iterator<Item = usize> + '_ {
        let n_labels = if case < self.n_cases { self.n_labels } else { 0 };
        (0..n_labels).filter(move |&label| self.get(case, label))
    }

    /// Total number of set cells (annotation decisions).
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }
}

// =============================================================================
// Matrix Builder
// =============================================================================

/// Summary counts of a matrix build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixStats {
    /// Number of coders
    pub n_coders: usize,
    /// Number of positions (`text_length`)
    pub n_cases: usize,
    /// Set cells across all coders' matrices
    pub n_decisions: usize,
    /// Number of label columns
    pub n_labels: usize,
}

/// Output of [`MatrixBuilder::build`].
#[derive(Debug, Clone)]
pub struct IncidenceMatrices {
    /// One matrix per coder, in input order; all share one shape
    pub matrices: Vec<CoderMatrix>,
    /// Column labels
    pub vocabulary: LabelVocabulary,
    /// Build summary
    pub stats: MatrixStats,
}

/// Turns canonical spans into per-coder incidence matrices.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixBuilder;

impl MatrixBuilder {
    /// Build one matrix per coder over `text_length` positions.
    ///
    /// Spans are clamped to `[0, text_length)`. Spans with an empty or reserved
    /// label, or lying entirely outside the text, contribute nothing. A coder
    /// with no usable spans gets an all-zero matrix.
    ///
    /// ```
    /// use accord::MatrixBuilder;
    /// use accord_core::CoderAnnotation;
    ///
    /// let a = CoderAnnotation::new("a", "a.json").with_span("X", 0, 2)?;
    /// let b = CoderAnnotation::new("b", "b.json").with_span("Y", 1, 3)?;
    /// let built = MatrixBuilder::build(&[a, b], 4);
    /// assert_eq!(built.vocabulary.labels(), ["X", "Y"]);
    /// assert_eq!(built.stats.n_decisions, 4);
    /// assert!(built.matrices[1].get(2, 1));
    /// # Ok::<(), accord_core::Error>(())
    /// ```
    #[must_use]
    pub fn build(annotations: &[CoderAnnotation], text_length: usize) -> IncidenceMatrices {
        let vocabulary = LabelVocabulary::from_annotations(annotations);
        let n_labels = vocabulary.len();

        let matrices: Vec<CoderMatrix> = annotations
            .iter()
            .map(|annotation| Self::build_one(annotation, &vocabulary, text_length))
            .collect();

        let stats = if text_length == 0 {
            MatrixStats::default()
        } else {
            MatrixStats {
                n_coders: matrices.len(),
                n_cases: text_length,
                n_decisions: matrices.iter().map(CoderMatrix::count_ones).sum(),
                n_labels,
            }
        };

        log::debug!(
            "built {} incidence matrices: {} cases x {} labels, {} decisions",
            matrices.len(),
            text_length,
            n_labels,
            stats.n_decisions
        );

        IncidenceMatrices {
            matrices,
            vocabulary,
            stats,
        }
    }

    fn build_one(
        annotation: &CoderAnnotation,
        vocabulary: &LabelVocabulary,
        text_length: usize,
    ) -> CoderMatrix {
        let mut matrix = CoderMatrix::zeros(&annotation.coder_id, text_length, vocabulary.len());
        let mut unlabelled = 0usize;
        let mut outside = 0usize;

        for span in annotation.spans() {
            let Some(column) = vocabulary.index_of(&span.label) else {
                unlabelled += 1;
                continue;
            };
            let start = span.start.min(text_length);
            let end = span.end.min(text_length);
            if start >= end {
                outside += 1;
                continue;
            }
            for case in start..end {
                matrix.set(case, column);
            }
        }

        if unlabelled > 0 || outside > 0 {
            log::warn!(
                "coder '{}' ({}): skipped {} unlabelled and {} out-of-range spans",
                annotation.coder_id,
                annotation.filename,
                unlabelled,
                outside
            );
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coder(id: &str, spans: &[(&str, usize, usize)]) -> CoderAnnotation {
        spans
            .iter()
            .try_fold(CoderAnnotation::new(id, format!("{id}.json")), |ann, &(l, s, e)| {
                ann.with_span(l, s, e)
            })
            .unwrap()
    }

    #[test]
    fn test_vocabulary_sorted_and_excludes_sentinel() {
        let anns = vec![
            coder("a", &[("Zeta", 0, 1), ("", 0, 1)]),
            coder("b", &[("Alpha", 0, 1), (NO_ANNOTATION, 1, 2), ("Zeta", 2, 3)]),
        ];
        let vocab = LabelVocabulary::from_annotations(&anns);
        assert_eq!(vocab.labels(), ["Alpha", "Zeta"]);
        assert_eq!(vocab.index_of("Zeta"), Some(1));
        assert_eq!(vocab.index_of(NO_ANNOTATION), None);
    }

    #[test]
    fn test_overlapping_spans_or_in() {
        let anns = vec![coder("a", &[("A", 0, 2), ("B", 1, 3)])];
        let built = MatrixBuilder::build(&anns, 4);
        let m = &built.matrices[0];
        assert!(m.get(0, 0) && !m.get(0, 1));
        assert!(m.get(1, 0) && m.get(1, 1));
        assert!(!m.get(2, 0) && m.get(2, 1));
        assert_eq!(m.labels_at(3).count(), 0);
        assert_eq!(built.vocabulary.describe_row(m, 1), "A+B");
        assert_eq!(built.vocabulary.describe_row(m, 3), NO_ANNOTATION);
        assert_eq!(built.stats.n_decisions, 4);
    }

    #[test]
    fn test_clamps_to_text_length() {
        let anns = vec![coder("a", &[("A", 2, 10), ("A", 7, 9)])];
        let built = MatrixBuilder::build(&anns, 4);
        assert_eq!(built.matrices[0].shape(), (4, 1));
        assert_eq!(built.matrices[0].count_ones(), 2);
    }

    #[test]
    fn test_coder_without_spans_is_all_zero() {
        let anns = vec![coder("a", &[("A", 0, 2)]), coder("b", &[])];
        let built = MatrixBuilder::build(&anns, 3);
        assert_eq!(built.matrices[1].shape(), (3, 1));
        assert_eq!(built.matrices[1].count_ones(), 0);
        assert_eq!(built.stats.n_coders, 2);
    }

    #[test]
    fn test_empty_text() {
        let anns = vec![coder("a", &[("A", 0, 2)]), coder("b", &[("B", 0, 1)])];
        let built = MatrixBuilder::build(&anns, 0);
        assert_eq!(built.stats, MatrixStats::default());
        assert!(built.matrices.iter().all(|m| m.n_cases() == 0));
        assert_eq!(built.matrices.len(), 2);
    }

    #[test]
    fn test_all_matrices_share_shape() {
        let anns = vec![coder("a", &[("A", 0, 1)]), coder("b", &[("B", 2, 3)]), coder("c", &[])];
        let built = MatrixBuilder::build(&anns, 5);
        assert!(built.matrices.iter().all(|m| m.shape() == (5, 2)));
    }

    #[test]
    fn test_wide_vocabulary_spans_words() {
        let labels: Vec<String> = (0..130).map(|i| format!("L{i:03}")).collect();
        let ann = labels
            .iter()
            .enumerate()
            .try_fold(CoderAnnotation::new("a", "a.json"), |ann, (i, l)| {
                ann.with_span(l.as_str(), i % 3, i % 3 + 1)
            })
            .unwrap();
        let built = MatrixBuilder::build(&[ann], 3);
        let m = &built.matrices[0];
        assert_eq!(m.row(0).len(), 3);
        assert_eq!(m.count_ones(), 130);
        assert!(m.get(1, 127));
        assert!(m.get(0, 129));
    }

    #[test]
    fn test_from_dense_matches_get() {
        let m = CoderMatrix::from_dense("a", 2, &[vec![true, false], vec![false, true], vec![]]);
        assert_eq!(m.shape(), (3, 2));
        assert!(m.get(0, 0) && m.get(1, 1));
        assert_eq!(m.labels_at(2).count(), 0);
    }
}
