//! Span model, PII scrubber, trace ingest, and trace statistics.
//!
//! This crate is the leaf of the MindOps observability control plane: every
//! other crate in the workspace consumes its [`span::Span`] and
//! [`stats::TraceStats`] types.

pub mod error;
pub mod ingest;
pub mod scrubber;
pub mod span;
pub mod stats;

pub use error::{MindopsError, MindopsResult};
pub use ingest::ingest_spans;
pub use scrubber::{PatternRule, PiiScrubber, RedactionMatch, RedactionResult, ScrubReport, ScrubberConfig};
pub use span::{AttributeValue, Span};
pub use stats::{compute_trace_stats, extract_observed_signals, ServiceStats, TraceStats};
