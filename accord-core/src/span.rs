//! Labelled spans and per-coder annotation sets.
//!
//! Offsets are character (Unicode scalar) offsets, not bytes, so the same
//! `(start, end)` pair addresses the same region no matter which tool
//! produced it.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Reserved label meaning "this coder assigned nothing here".
///
/// Spans carrying this label never enter the label vocabulary.
pub const NO_ANNOTATION: &str = "NO_ANNOTATION";

/// One labelled `[start, end)` range produced by a single coder.
///
/// Deserialisation runs the same range check as [`Span::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSpan")]
pub struct Span {
    /// Coder that produced the span
    pub coder_id: String,
    /// Category label
    pub label: String,
    /// Start offset (inclusive, characters)
    pub start: usize,
    /// End offset (exclusive, characters)
    pub end: usize,
    /// Hierarchical code path, e.g. `Emotion/Joy`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Free-text memo the coder attached to the span
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// Unchecked wire form of [`Span`].
#[derive(Deserialize)]
struct RawSpan {
    coder_id: String,
    label: String,
    start: usize,
    end: usize,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    remark: Option<String>,
}

impl TryFrom<RawSpan> for Span {
    type Error = Error;

    fn try_from(raw: RawSpan) -> Result<Self> {
        let span = Span::new(raw.coder_id, raw.label, raw.start, raw.end)?;
        Ok(Self {
            path: raw.path,
            remark: raw.remark,
            ..span
        })
    }
}

impl Span {
    /// Create a span, rejecting empty or inverted ranges.
    ///
    /// ```
    /// use accord_core::Span;
    ///
    /// let span = Span::new("alice", "Joy", 0, 4).unwrap();
    /// assert_eq!(span.len(), 4);
    /// assert!(Span::new("alice", "Joy", 4, 4).is_err());
    /// ```
    pub fn new(
        coder_id: impl Into<String>,
        label: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Result<Self> {
        if start >= end {
            return Err(Error::invalid_span(start, end));
        }
        Ok(Self {
            coder_id: coder_id.into(),
            label: label.into(),
            start,
            end,
            path: None,
            remark: None,
        })
    }

    /// Attach a hierarchical code path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach a coder remark.
    #[must_use]
    pub fn with_remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    /// Number of characters covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Always false for a validated span.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Exact `(start, end)` boundary pair.
    #[must_use]
    pub fn boundary(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Exact-tuple identity used for gold-standard scoring.
    #[must_use]
    pub fn key(&self) -> SpanKey {
        SpanKey {
            start: self.start,
            end: self.end,
            label: self.label.clone(),
        }
    }

    /// True if the label is empty or the reserved [`NO_ANNOTATION`] sentinel.
    #[must_use]
    pub fn is_unlabelled(&self) -> bool {
        self.label.is_empty() || self.label == NO_ANNOTATION
    }
}

/// Exact `(start, end, label)` identity of an annotation decision.
///
/// Two spans with the same key are the same decision, regardless of which
/// coder made them. This is deliberately stricter than positional coverage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpanKey {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
    /// Category label
    pub label: String,
}

/// All spans one coder produced for the shared text (one uploaded file).
///
/// Deserialisation enforces the same ownership and range checks as
/// [`CoderAnnotation::with_spans`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCoderAnnotation")]
pub struct CoderAnnotation {
    /// Coder identifier
    pub coder_id: String,
    /// Source file the spans were read from
    pub filename: String,
    spans: Vec<Span>,
}

#[derive(Deserialize)]
struct RawCoderAnnotation {
    coder_id: String,
    filename: String,
    #[serde(default)]
    spans: Vec<Span>,
}

impl TryFrom<RawCoderAnnotation> for CoderAnnotation {
    type Error = Error;

    fn try_from(raw: RawCoderAnnotation) -> Result<Self> {
        CoderAnnotation::new(raw.coder_id, raw.filename).with_spans(raw.spans)
    }
}

impl CoderAnnotation {
    /// Create an annotation set with no spans.
    #[must_use]
    pub fn new(coder_id: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            coder_id: coder_id.into(),
            filename: filename.into(),
            spans: Vec::new(),
        }
    }

    /// Append a span labelled `label` over `[start, end)`.
    ///
    /// ```
    /// use accord_core::CoderAnnotation;
    ///
    /// let ann = CoderAnnotation::new("bob", "bob.json")
    ///     .with_span("Joy", 0, 3)?
    ///     .with_span("Anger", 5, 9)?;
    /// assert_eq!(ann.spans().len(), 2);
    /// # Ok::<(), accord_core::Error>(())
    /// ```
    pub fn with_span(self, label: impl Into<String>, start: usize, end: usize) -> Result<Self> {
        let span = Span::new(self.coder_id.clone(), label, start, end)?;
        self.with_spans([span])
    }

    /// Append already-built spans; every span must belong to this coder.
    pub fn with_spans(mut self, spans: impl IntoIterator<Item = Span>) -> Result<Self> {
        for span in spans {
            if span.coder_id != self.coder_id {
                return Err(Error::coder_mismatch(&self.coder_id, span.coder_id));
            }
            if span.is_empty() {
                return Err(Error::invalid_span(span.start, span.end));
            }
            self.spans.push(span);
        }
        Ok(self)
    }

    /// Spans in upload order.
    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// True if the coder produced no spans.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}
