//! Deduplicated review index of annotated regions (SpanIndexer).
//!
//! A region is one distinct `(start, end)` boundary pair used by any coder.
//! Regions are matched by exact boundaries, never by overlap: `[0, 5)` and
//! `[0, 4)` are two regions even though they share four characters.
//!
//! ```text
//! coder a:  [0,2) X
//! coder b:  [0,2) X   [3,5) Y
//!
//! regions:  [0,2) labels [X, X]   rate 1.0  agreement true
//!           [3,5) labels [-, Y]   rate 0.5  agreement true
//! ```

use crate::config::DEFAULT_CONTEXT_WIDTH;
use crate::text::TextView;
use accord_core::{CoderAnnotation, Span, NO_ANNOTATION};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

/// One distinct annotated boundary pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationRegion {
    /// Start character offset
    pub start: usize,
    /// End character offset (exclusive)
    pub end: usize,
    /// Text covered by the region
    pub text: String,
    /// Characters before the region
    pub left_context: String,
    /// Characters after the region
    pub right_context: String,
    /// Label each coder gave this exact region, in coder order
    pub labels: Vec<Option<String>>,
    /// Share of coders with a non-empty label here
    pub annotation_rate: f64,
    /// True when at most one distinct non-empty label was used
    pub label_agreement: bool,
}

/// One coder's view of a looked-up region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoderDetail {
    /// Source file of the coder's annotations
    pub filename: String,
    /// Coder identifier
    pub coder_id: String,
    /// Whether the coder has a span with exactly these boundaries
    pub annotated: bool,
    /// The coder's label, if annotated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Region text, if annotated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Code path of the coder's span
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Memo attached to the coder's span
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// Every coder's decision at one exact `(start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDetail {
    /// Start character offset
    pub start: usize,
    /// End character offset (exclusive)
    pub end: usize,
    /// One entry per coder, in coder order
    pub coders: Vec<CoderDetail>,
    /// Share of coders with a non-empty label here
    pub annotation_rate: f64,
    /// True when at most one distinct non-empty label was used
    pub label_agreement: bool,
}

/// Builds a [`SpanIndex`] from all coders' spans and the shared text.
#[derive(Debug, Clone, Copy)]
pub struct SpanIndexer {
    context_width: usize,
}

impl Default for SpanIndexer {
    fn default() -> Self {
        Self::new(DEFAULT_CONTEXT_WIDTH)
    }
}

impl SpanIndexer {
    /// Indexer showing `context_width` characters on each side of a region.
    #[must_use]
    pub fn new(context_width: usize) -> Self {
        Self { context_width }
    }

    /// Context characters per side.
    #[must_use]
    pub fn context_width(&self) -> usize {
        self.context_width
    }

    /// Index every distinct region, sorted by `(start, end)`.
    ///
    /// ```
    /// use accord::SpanIndexer;
    /// use accord_core::CoderAnnotation;
    ///
    /// let a = CoderAnnotation::new("a", "a.json").with_span("X", 0, 2)?;
    /// let b = CoderAnnotation::new("b", "b.json")
    ///     .with_span("X", 0, 2)?
    ///     .with_span("Y", 3, 5)?;
    /// let annotations = [a, b];
    ///
    /// let index = SpanIndexer::default().index(&annotations, "ab cd");
    /// let rates: Vec<f64> = index.regions().iter().map(|r| r.annotation_rate).collect();
    /// assert_eq!(rates, vec![1.0, 0.5]);
    /// assert_eq!(index.regions()[1].text, "cd");
    /// # Ok::<(), accord_core::Error>(())
    /// ```
    #[must_use]
    pub fn index<'a>(&self, annotations: &'a [CoderAnnotation], text: &'a str) -> SpanIndex<'a> {
        let view = TextView::new(text);

        let by_boundary: Vec<BTreeMap<(usize, usize), &'a Span>> = annotations
            .iter()
            .map(|annotation| representative_spans(annotation.spans()))
            .collect();

        let boundaries: BTreeSet<(usize, usize)> = by_boundary
            .iter()
            .flat_map(|m| m.keys().copied())
            .collect();

        let regions: Vec<AnnotationRegion> = boundaries
            .iter()
            .map(|&(start, end)| {
                let labels: Vec<Option<String>> = by_boundary
                    .iter()
                    .map(|m| m.get(&(start, end)).map(|s| s.label.clone()))
                    .collect();
                let (annotation_rate, label_agreement) =
                    summarize(labels.iter().map(Option::as_deref), annotations.len());
                AnnotationRegion {
                    start,
                    end,
                    text: view.slice(start, end).to_string(),
                    left_context: view.left_context(start, self.context_width).to_string(),
                    right_context: view.right_context(end, self.context_width).to_string(),
                    labels,
                    annotation_rate,
                    label_agreement,
                }
            })
            .collect();

        log::debug!(
            "indexed {} regions from {} coders",
            regions.len(),
            annotations.len()
        );

        SpanIndex {
            annotations,
            by_boundary,
            regions,
            view,
        }
    }
}

/// Result of [`SpanIndexer::index`]: the region list plus point lookup.
#[derive(Debug, Clone)]
pub struct SpanIndex<'a> {
    annotations: &'a [CoderAnnotation],
    by_boundary: Vec<BTreeMap<(usize, usize), &'a Span>>,
    regions: Vec<AnnotationRegion>,
    view: TextView<'a>,
}

impl<'a> SpanIndex<'a> {
    /// All regions, sorted by start then end.
    #[must_use]
    pub fn regions(&self) -> &[AnnotationRegion] {
        &self.regions
    }

    /// Number of regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// True if no coder made any annotation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Every coder's decision at exactly `(start, end)`.
    ///
    /// Boundaries no coder used yield a detail with every coder unannotated.
    #[must_use]
    pub fn lookup(&self, start: usize, end: usize) -> RegionDetail {
        let coders: Vec<CoderDetail> = self
            .annotations
            .iter()
            .zip(&self.by_boundary)
            .map(|(annotation, spans)| match spans.get(&(start, end)) {
                Some(span) => CoderDetail {
                    filename: annotation.filename.clone(),
                    coder_id: annotation.coder_id.clone(),
                    annotated: true,
                    label: Some(span.label.clone()),
                    text: Some(self.view.slice(start, end).to_string()),
                    path: span.path.clone(),
                    remark: span.remark.clone(),
                },
                None => CoderDetail {
                    filename: annotation.filename.clone(),
                    coder_id: annotation.coder_id.clone(),
                    annotated: false,
                    label: None,
                    text: None,
                    path: None,
                    remark: None,
                },
            })
            .collect();

        let (annotation_rate, label_agreement) =
            summarize(coders.iter().map(|c| c.label.as_deref()), coders.len());

        RegionDetail {
            start,
            end,
            coders,
            annotation_rate,
            label_agreement,
        }
    }
}

/// One span per boundary: the first labelled one, else the first unlabelled one.
fn representative_spans(spans: &[Span]) -> BTreeMap<(usize, usize), &Span> {
    let mut chosen: BTreeMap<(usize, usize), &Span> = BTreeMap::new();
    for span in spans {
        match chosen.entry(span.boundary()) {
            Entry::Vacant(slot) => {
                slot.insert(span);
            }
            Entry::Occupied(mut slot) => {
                if slot.get().is_unlabelled() && !span.is_unlabelled() {
                    slot.insert(span);
                }
            }
        }
    }
    chosen
}

/// `(annotation_rate, label_agreement)` over per-coder labels.
fn summarize<'l>(labels: impl Iterator<Item = Option<&'l str>>, n_coders: usize) -> (f64, bool) {
    let used: Vec<&str> = labels
        .flatten()
        .filter(|l| !l.is_empty() && *l != NO_ANNOTATION)
        .collect();
    let distinct: BTreeSet<&str> = used.iter().copied().collect();
    let rate = if n_coders == 0 {
        0.0
    } else {
        used.len() as f64 / n_coders as f64
    };
    (rate, distinct.len() <= 1)
}
