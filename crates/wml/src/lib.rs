//! `wml-redline`: the document-reconciliation core (spec.md §§1–9).
//!
//! This crate is the facade named in spec.md §6 — the seven External
//! Interfaces, the error taxonomy of §7, and the part-merge wiring a host
//! adapter (out of scope, §1) links against. Everything it does is built on
//! the leaf crates in this workspace; this crate owns no XML-walking logic
//! of its own beyond dispatch.
//!
//! The facade does not install a `tracing` subscriber — that, like the
//! host word-processor automation surface and file-container I/O, is the
//! host's responsibility.

pub mod error;
pub mod interfaces;
pub mod parts;

pub use error::{RedlineError, Result};
pub use interfaces::{
    apply_redline_to_paragraph_fragment, generate_list_fragment, generate_table_fragment,
    inject_comments_into_document_fragment, plan_route, resolve_target_paragraph, CommentInjectionOutcome,
    ListFragmentOutcome, RedlineOptions, RedlineOutcome, ResolvedBy, RoutePlan, TableFragmentOutcome,
    TargetResolution, ValidationMode,
};
pub use parts::{merge_sibling_parts, PartMergeInput, PartMergeOutcome};

// Re-exported so a host adapter needs only this one crate to construct the
// state every contract in `interfaces` threads through (spec.md §5, §6).
pub use wml_comments::CommentRequest;
pub use wml_numbering::NumberingService;
pub use wml_reconcile::{Clock, FixedClock, NeverYield, ReconcileContext, SystemClock, ThresholdYieldPolicy, YieldPolicy};
pub use wml_route::ExplicitSequenceState;
