//! # accord-core
//!
//! Canonical annotation types shared by every crate in the accord workspace.
//!
//! Upstream normalisation (archive parsing, field-name reconciliation) is
//! expected to happen before data reaches these types: a [`Span`] is always a
//! labelled, non-empty `[start, end)` range of character offsets over one
//! shared text, and a [`CoderAnnotation`] groups the spans of one coder.

pub mod error;
pub mod span;

pub use error::{Error, Result};
pub use span::{CoderAnnotation, Span, SpanKey, NO_ANNOTATION};
