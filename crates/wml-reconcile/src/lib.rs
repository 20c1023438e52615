//! Paragraph ingestion, Markdown-aware diff/patch text pipeline, and
//! tracked-change serialization (spec.md §4.1, §4.4, §4.5).

pub mod clock;
pub mod context;
pub mod error;
pub mod format;
pub mod ingest;
pub mod pipeline;
pub mod serialize;
pub mod split;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{NeverYield, ReconcileContext, ThresholdYieldPolicy, YieldPolicy};
pub use error::{Error, Result};
pub use format::{build_runs_from_preprocessed, flags_from_rpr, rpr_xml_with_flags};
pub use ingest::{ingest_paragraph, IngestedParagraph};
pub use pipeline::{reconcile_paragraph_text, ReconciledParagraph};
pub use serialize::{serialize_paragraph, wrap_document_fragment, DocumentFragment, WrapMode};
pub use split::{patch, split_at_boundaries, PatchOutcome};
